//! Document assembly.
//!
//! [`MetadataWalker`] drives a [`JsonWriter`] over the summary returned by a
//! [`MediaAnalyzer`]. One walk moves through
//! `Init → Opening → FormatSection → StreamsSection → Done`, or into
//! `ErrorTerminal` when the container cannot be opened. An error document
//! contains nothing but the `error` key.

use ffmpeg_next::Rational;

use crate::{
    analyzer::MediaAnalyzer,
    buffer::JsonBuffer,
    config::ProbeConfig,
    conversion::{codec_tag_string, display_aspect_ratio, mpeg_timecode_string},
    disposition,
    error::ProbeError,
    summary::{
        AudioParameters, ContainerSummary, DecoderDetails, KindParameters, StreamSummary,
        SubtitleParameters, Tags, VideoParameters,
    },
    value::Unit,
    writer::JsonWriter,
};

/// Container timestamps are in microseconds.
const CONTAINER_TIME_BASE: Rational = Rational(1, 1_000_000);

/// `profile` value FFmpeg uses for "no profile".
const UNKNOWN_PROFILE: i32 = -99;

/// Where a walk currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeState {
    /// Buffer reset, nothing written.
    Init,
    /// Waiting on the analyzer.
    Opening,
    /// Writing the `format` object.
    FormatSection,
    /// Writing the `streams` array.
    StreamsSection,
    /// Document complete.
    Done,
    /// The analyzer failed; only an error document is produced.
    ErrorTerminal,
}

/// Serializes one container per walk.
///
/// # Example
///
/// ```no_run
/// use probejson::{FfmpegAnalyzer, MetadataWalker, ProbeConfig};
///
/// let config = ProbeConfig::new();
/// let mut walker = MetadataWalker::new(&FfmpegAnalyzer, &config);
/// let document = walker.walk("input.mkv");
/// println!("{document}");
/// ```
#[derive(Debug)]
pub struct MetadataWalker<'a, A: ?Sized> {
    analyzer: &'a A,
    config: &'a ProbeConfig,
    state: ProbeState,
}

impl<'a, A: MediaAnalyzer + ?Sized> MetadataWalker<'a, A> {
    /// Create a walker over `analyzer` using `config`.
    pub fn new(analyzer: &'a A, config: &'a ProbeConfig) -> Self {
        Self {
            analyzer,
            config,
            state: ProbeState::Init,
        }
    }

    /// State reached by the last walk.
    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Produce the document for `path`.
    ///
    /// Never fails: when the container cannot be opened the result is
    /// `{"error":"<path>: <message>"}`.
    pub fn walk(&mut self, path: &str) -> JsonBuffer {
        match self.try_walk(path) {
            Ok(document) => document,
            Err(error) => error_document(path, &error, self.config),
        }
    }

    /// Produce the document for `path`, returning open and configuration
    /// failures to the caller instead of writing an error document.
    ///
    /// # Errors
    ///
    /// Whatever the analyzer returns; see [`MediaAnalyzer::analyze`].
    pub fn try_walk(&mut self, path: &str) -> Result<JsonBuffer, ProbeError> {
        self.transition(ProbeState::Init);
        let mut writer = JsonWriter::new(*self.config.presentation(), self.config.missing_value());
        writer.begin_object(None);

        self.transition(ProbeState::Opening);
        let container = match self.analyzer.analyze(path, self.config) {
            Ok(container) => container,
            Err(error) => {
                self.transition(ProbeState::ErrorTerminal);
                return Err(error);
            }
        };

        self.transition(ProbeState::FormatSection);
        write_format(&mut writer, &container);

        self.transition(ProbeState::StreamsSection);
        let selected = match self.config.stream_specifier() {
            Some(specifier) => specifier.select(&container.streams),
            None => vec![true; container.streams.len()],
        };
        writer.begin_array(Some("streams"));
        for (stream, _) in container
            .streams
            .iter()
            .zip(&selected)
            .filter(|(_, selected)| **selected)
        {
            write_stream(&mut writer, stream, self.config);
        }
        writer.end_array();

        writer.end_object();
        self.transition(ProbeState::Done);
        Ok(writer.finish())
    }

    fn transition(&mut self, next: ProbeState) {
        log::trace!("Probe state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Build `{"error":"<path>: <detail>"}`.
pub fn error_document(path: &str, error: &ProbeError, config: &ProbeConfig) -> JsonBuffer {
    log::debug!("Probe of {path} failed: {error}");
    let mut writer = JsonWriter::new(*config.presentation(), config.missing_value());
    writer.begin_object(None);
    writer.print_str("error", &format!("{path}: {}", error.detail()));
    writer.end_object();
    writer.finish()
}

fn write_tags(writer: &mut JsonWriter, tags: &Tags) {
    writer.begin_object(Some("tags"));
    for (key, value) in tags {
        writer.print_str(key, value);
    }
    writer.end_object();
}

fn write_format(writer: &mut JsonWriter, container: &ContainerSummary) {
    writer.begin_object(Some("format"));
    writer.print_str("filename", &container.filename);
    writer.print_uint("nb_streams", container.stream_count() as u64);
    writer.print_uint("nb_programs", container.program_count as u64);
    writer.print_str("format_name", &container.format_name);
    writer.print_str(
        "format_long_name",
        container.format_long_name.as_deref().unwrap_or("unknown"),
    );
    writer.print_time("start_time", container.start_time, CONTAINER_TIME_BASE);
    writer.print_time("duration", container.duration, CONTAINER_TIME_BASE);
    match container.size {
        Some(size) => writer.print_val("size", size, Unit::Byte),
        None => writer.print_missing("size"),
    }
    match container.bit_rate {
        Some(bit_rate) => writer.print_val("bit_rate", bit_rate, Unit::BitPerSecond),
        None => writer.print_missing("bit_rate"),
    }
    writer.print_int("probe_score", container.probe_score as i64);
    write_tags(writer, &container.tags);
    writer.end_object();
}

fn write_stream(writer: &mut JsonWriter, stream: &StreamSummary, config: &ProbeConfig) {
    writer.begin_object(None);

    writer.print_int("index", stream.index as i64);
    writer.print_str("codec_name", &stream.codec_name);
    if let Some(long_name) = &stream.codec_long_name {
        writer.print_str("codec_long_name", long_name);
    }
    match &stream.profile {
        Some(profile) => writer.print_str("profile", profile),
        None if stream.profile_id != UNKNOWN_PROFILE => {
            writer.print_str("profile", &stream.profile_id.to_string())
        }
        None => writer.print_missing("profile"),
    }
    writer.print_str("codec_type", stream.kind.as_str());
    writer.print_str("codec_tag_string", &codec_tag_string(stream.codec_tag));
    writer.print_str("codec_tag", &format!("0x{:04x}", stream.codec_tag));

    let decoder = stream.decoder.as_ref();
    match &stream.parameters {
        KindParameters::Video(video) => write_video(writer, video, decoder),
        KindParameters::Audio(audio) => write_audio(writer, audio),
        KindParameters::Subtitle(subtitle) => write_subtitle(writer, subtitle),
        KindParameters::None => {}
    }

    if stream.id != 0 {
        writer.print_str("id", &format!("0x{:x}", stream.id));
    }
    writer.print_q("r_frame_rate", stream.real_frame_rate, '/');
    writer.print_q("avg_frame_rate", stream.average_frame_rate, '/');
    writer.print_q("time_base", stream.time_base, '/');
    writer.print_opt_int("start_pts", stream.start_pts);
    writer.print_time("start_time", stream.start_pts, stream.time_base);
    writer.print_opt_int("duration_ts", stream.duration_ts);
    writer.print_time("duration", stream.duration_ts, stream.time_base);
    match stream.bit_rate {
        Some(bit_rate) => writer.print_val("bit_rate", bit_rate, Unit::BitPerSecond),
        None => writer.print_missing("bit_rate"),
    }
    if let Some(decoder) = decoder.filter(|decoder| decoder.bits_per_raw_sample > 0) {
        writer.print_int("bits_per_raw_sample", decoder.bits_per_raw_sample as i64);
    }
    if let Some(frame_count) = stream.frame_count {
        writer.print_int("nb_frames", frame_count);
    }

    if config.show_private_data() {
        if let Some(decoder) = decoder {
            for (name, value) in &decoder.private_options {
                writer.print_str(name, value);
            }
        }
    }

    writer.begin_object(Some("disposition"));
    for (name, set) in disposition::evaluate(stream.disposition) {
        writer.print_flag(name, set);
    }
    writer.end_object();

    write_tags(writer, &stream.tags);
    writer.end_object();
}

fn write_video(writer: &mut JsonWriter, video: &VideoParameters, decoder: Option<&DecoderDetails>) {
    writer.print_int("width", video.width as i64);
    writer.print_int("height", video.height as i64);
    if let Some(decoder) = decoder {
        writer.print_int("coded_width", decoder.coded_width as i64);
        writer.print_int("coded_height", decoder.coded_height as i64);
        writer.print_int("has_b_frames", decoder.has_b_frames as i64);
    }

    if let Some(ratio) = video.sample_aspect_ratio.filter(|ratio| ratio.numerator() != 0) {
        writer.print_q("sample_aspect_ratio", ratio, ':');
        writer.print_q(
            "display_aspect_ratio",
            display_aspect_ratio(video.width, video.height, ratio),
            ':',
        );
    }

    match &video.pixel_format {
        Some(pixel_format) => writer.print_str("pix_fmt", pixel_format),
        None => writer.print_missing("pix_fmt"),
    }
    writer.print_int("level", video.level as i64);

    let color = &video.color;
    for (key, value) in [
        ("color_range", &color.range),
        ("color_space", &color.space),
        ("color_transfer", &color.transfer),
        ("color_primaries", &color.primaries),
        ("chroma_location", &color.chroma_location),
    ] {
        if let Some(value) = value {
            writer.print_str(key, value);
        }
    }

    if let Some(field_order) = video.field_order {
        writer.print_str("field_order", field_order.as_str());
    }

    if let Some(decoder) = decoder {
        if decoder.timecode_frame_start >= 0 {
            writer.print_str(
                "timecode",
                &mpeg_timecode_string(decoder.timecode_frame_start as u32),
            );
        }
        writer.print_int("refs", decoder.refs as i64);
    }
}

fn write_audio(writer: &mut JsonWriter, audio: &AudioParameters) {
    match &audio.sample_format {
        Some(sample_format) => writer.print_str("sample_fmt", sample_format),
        None => writer.print_missing("sample_fmt"),
    }
    writer.print_val("sample_rate", audio.sample_rate as i64, Unit::Hertz);
    writer.print_int("channels", audio.channels as i64);
    if let Some(layout) = &audio.channel_layout {
        writer.print_str("channel_layout", layout);
    }
    writer.print_int("bits_per_sample", audio.bits_per_sample as i64);
}

fn write_subtitle(writer: &mut JsonWriter, subtitle: &SubtitleParameters) {
    if subtitle.width != 0 {
        writer.print_int("width", subtitle.width as i64);
    }
    if subtitle.height != 0 {
        writer.print_int("height", subtitle.height as i64);
    }
}
