//! Container and stream summaries.
//!
//! These records are what a [`MediaAnalyzer`](crate::MediaAnalyzer) hands
//! to the walker. They hold plain owned data and no FFmpeg handles, so the
//! container and its decoders are already closed by the time a document is
//! written.

use std::fmt::{Display, Formatter, Result as FmtResult};

use ffmpeg_next::Rational;

/// Ordered string tags. Iteration order is whatever the container reports.
pub type Tags = Vec<(String, String)>;

/// Container-level metadata.
#[derive(Debug, Clone, Default)]
pub struct ContainerSummary {
    /// Path or URL the container was opened from.
    pub filename: String,
    /// Number of programs (MPEG-TS and similar).
    pub program_count: usize,
    /// Short demuxer name(s), comma separated (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format_name: String,
    /// Long demuxer description, when the demuxer provides one.
    pub format_long_name: Option<String>,
    /// Start time in microseconds.
    pub start_time: Option<i64>,
    /// Duration in microseconds.
    pub duration: Option<i64>,
    /// Size in bytes, if the I/O layer knows it.
    pub size: Option<i64>,
    /// Overall bit rate in bits per second.
    pub bit_rate: Option<i64>,
    /// Demuxer confidence score, 0 to 100.
    pub probe_score: i32,
    /// Container tags.
    pub tags: Tags,
    /// Every stream in index order, selected or not.
    pub streams: Vec<StreamSummary>,
}

impl ContainerSummary {
    /// Number of streams in the container, including discarded ones.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }
}

/// Media kind of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaKind {
    /// Video, including attached pictures.
    Video,
    /// Audio.
    Audio,
    /// Subtitles.
    Subtitle,
    /// Opaque data.
    Data,
    /// Attachments such as fonts.
    Attachment,
    /// Anything else.
    #[default]
    Unknown,
}

impl MediaKind {
    /// Name used for the `codec_type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Subtitle => "subtitle",
            MediaKind::Data => "data",
            MediaKind::Attachment => "attachment",
            MediaKind::Unknown => "unknown",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Field order of interlaced video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldOrder {
    /// Not interlaced.
    Progressive,
    /// Top field coded and displayed first.
    TopFirst,
    /// Bottom field coded and displayed first.
    BottomFirst,
    /// Top coded first, bottom displayed first.
    TopCodedBottomDisplayed,
    /// Bottom coded first, top displayed first.
    BottomCodedTopDisplayed,
}

impl FieldOrder {
    /// Name used for the `field_order` field.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldOrder::Progressive => "progressive",
            FieldOrder::TopFirst => "tt",
            FieldOrder::BottomFirst => "bb",
            FieldOrder::TopCodedBottomDisplayed => "tb",
            FieldOrder::BottomCodedTopDisplayed => "bt",
        }
    }
}

/// Color description of a video stream. `None` means unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorInfo {
    pub range: Option<String>,
    pub space: Option<String>,
    pub transfer: Option<String>,
    pub primaries: Option<String>,
    pub chroma_location: Option<String>,
}

/// Video parameters taken from the stream's codec parameters.
#[derive(Debug, Clone, Default)]
pub struct VideoParameters {
    /// Presentation width in pixels.
    pub width: u32,
    /// Presentation height in pixels.
    pub height: u32,
    /// Sample aspect ratio; numerator 0 when unknown.
    pub sample_aspect_ratio: Option<Rational>,
    /// Pixel format name (e.g. `"yuv420p"`).
    pub pixel_format: Option<String>,
    /// Codec level; negative when unknown.
    pub level: i32,
    /// Color metadata.
    pub color: ColorInfo,
    /// Field order, if one was signalled.
    pub field_order: Option<FieldOrder>,
}

/// Audio parameters taken from the stream's codec parameters.
#[derive(Debug, Clone, Default)]
pub struct AudioParameters {
    /// Sample format name (e.g. `"fltp"`).
    pub sample_format: Option<String>,
    /// Sample rate in hertz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u32,
    /// Layout description (e.g. `"stereo"`), only for bitmask layouts.
    pub channel_layout: Option<String>,
    /// Bits per sample implied by the codec, 0 when variable.
    pub bits_per_sample: u32,
}

/// Subtitle canvas size; zero when not set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtitleParameters {
    pub width: u32,
    pub height: u32,
}

/// Per-kind parameter block.
#[derive(Debug, Clone, Default)]
pub enum KindParameters {
    Video(VideoParameters),
    Audio(AudioParameters),
    Subtitle(SubtitleParameters),
    #[default]
    None,
}

/// Fields only known once a decoder has been bound to the stream.
#[derive(Debug, Clone, Default)]
pub struct DecoderDetails {
    /// Bits per raw sample; 0 when unknown.
    pub bits_per_raw_sample: i32,
    /// Coded width in pixels.
    pub coded_width: u32,
    /// Coded height in pixels.
    pub coded_height: u32,
    /// Decoder reorder delay.
    pub has_b_frames: i32,
    /// Number of reference frames.
    pub refs: i32,
    /// Start timecode in 25-bit MPEG GOP form; negative when absent.
    pub timecode_frame_start: i64,
    /// Readable private decoder options as `(name, value)` pairs.
    pub private_options: Vec<(String, String)>,
}

/// Stream-level metadata.
#[derive(Debug, Clone)]
pub struct StreamSummary {
    /// Position in the container.
    pub index: usize,
    /// Container-specific stream id (e.g. MPEG-TS PID), 0 when unset.
    pub id: i32,
    /// Media kind.
    pub kind: MediaKind,
    /// Short codec name (e.g. `"h264"`).
    pub codec_name: String,
    /// Long codec name, when known.
    pub codec_long_name: Option<String>,
    /// Profile name, when the codec defines one for `profile_id`.
    pub profile: Option<String>,
    /// Numeric profile.
    pub profile_id: i32,
    /// FOURCC codec tag.
    pub codec_tag: u32,
    /// Time base of `start_pts` and `duration_ts`.
    pub time_base: Rational,
    /// Lowest framerate that represents all timestamps accurately.
    pub real_frame_rate: Rational,
    /// Average framerate.
    pub average_frame_rate: Rational,
    /// First presentation timestamp in `time_base` ticks.
    pub start_pts: Option<i64>,
    /// Duration in `time_base` ticks.
    pub duration_ts: Option<i64>,
    /// Bit rate in bits per second.
    pub bit_rate: Option<i64>,
    /// Frame count, if the container records it.
    pub frame_count: Option<i64>,
    /// Parameters specific to the media kind.
    pub parameters: KindParameters,
    /// Present only when a decoder was bound.
    pub decoder: Option<DecoderDetails>,
    /// Raw disposition bitset; see [`crate::disposition`].
    pub disposition: i32,
    /// Stream tags.
    pub tags: Tags,
}

impl StreamSummary {
    /// A stream of `kind` with every optional field empty.
    pub fn new(index: usize, kind: MediaKind, codec_name: impl Into<String>) -> Self {
        Self {
            index,
            id: 0,
            kind,
            codec_name: codec_name.into(),
            codec_long_name: None,
            profile: None,
            profile_id: -99,
            codec_tag: 0,
            time_base: Rational::new(0, 1),
            real_frame_rate: Rational::new(0, 0),
            average_frame_rate: Rational::new(0, 0),
            start_pts: None,
            duration_ts: None,
            bit_rate: None,
            frame_count: None,
            parameters: KindParameters::None,
            decoder: None,
            disposition: 0,
            tags: Tags::new(),
        }
    }

    /// Look up a tag by exact key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}
