//! Media analysis backends.
//!
//! The walker never reads container bytes itself. It asks a
//! [`MediaAnalyzer`] for a [`ContainerSummary`] and serializes that.
//! [`FfmpegAnalyzer`] is the production implementation; tests plug in
//! in-memory analyzers.
//!
//! `ffmpeg-next` does not expose every field the document needs (probe
//! score, codec parameter color fields, decoder private options), so this
//! module reads them through `ffmpeg_sys_next`. All `unsafe` access is kept
//! here.

use std::{
    ffi::{CStr, CString, c_char, c_int, c_void},
    ptr,
};

use ffmpeg_next::{
    Dictionary, DictionaryRef, Rational,
    codec::{Id as CodecId, context::Context as CodecContext},
    format::{Sample, context::Input, stream::Stream},
    media::Type,
};
use ffmpeg_sys_next::{
    AV_DICT_IGNORE_SUFFIX, AV_NOPTS_VALUE, AVChannelOrder, AVChromaLocation, AVCodecContext, AVCodecID,
    AVCodecParameters, AVColorPrimaries, AVColorRange, AVColorSpace,
    AVColorTransferCharacteristic, AVDictionaryEntry, AVFieldOrder, AVFormatContext, AVOption,
    AVOptionType,
};

use crate::{
    config::ProbeConfig,
    error::ProbeError,
    summary::{
        AudioParameters, ColorInfo, ContainerSummary, DecoderDetails, FieldOrder, KindParameters,
        MediaKind, StreamSummary, SubtitleParameters, Tags, VideoParameters,
    },
};

/// Source of container and stream summaries.
pub trait MediaAnalyzer {
    /// Open `path`, read its structure, release every resource, and return
    /// the summary.
    ///
    /// # Errors
    ///
    /// [`ProbeError::FileOpen`] when the container cannot be opened or
    /// recognised, [`ProbeError::OptionNotFound`] when a demuxer option was
    /// not consumed, [`ProbeError::FfmpegError`] when the libraries cannot
    /// be initialised. Per-stream decoder failures are not errors; the
    /// affected stream is returned without [`DecoderDetails`].
    fn analyze(&self, path: &str, config: &ProbeConfig) -> Result<ContainerSummary, ProbeError>;
}

/// [`MediaAnalyzer`] backed by the system FFmpeg libraries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegAnalyzer;

impl MediaAnalyzer for FfmpegAnalyzer {
    fn analyze(&self, path: &str, config: &ProbeConfig) -> Result<ContainerSummary, ProbeError> {
        log::debug!("Probing media file: {path}");

        ffmpeg_next::init()?;

        // Closed on drop, on every return path below.
        let input = open_input(path, config)?;

        // SAFETY: `input` owns a valid, open format context for the rest of
        // this function and is only read through this reference.
        let format_context: &AVFormatContext = unsafe { &*input.as_ptr() };

        let size = if format_context.pb.is_null() {
            None
        } else {
            // SAFETY: `pb` is the open I/O context of `input`.
            let size = unsafe { ffmpeg_sys_next::avio_size(format_context.pb) };
            (size >= 0).then_some(size)
        };

        // SAFETY: `iformat` is set by a successful open and outlives `input`.
        let format_long_name = unsafe {
            format_context
                .iformat
                .as_ref()
                .and_then(|format| owned_c_string(format.long_name))
        };

        let streams: Vec<StreamSummary> = input
            .streams()
            .map(|stream| summarize_stream(&stream, config))
            .collect();

        let summary = ContainerSummary {
            filename: path.to_string(),
            program_count: format_context.nb_programs as usize,
            format_name: input.format().name().to_string(),
            format_long_name,
            start_time: timestamp(format_context.start_time),
            duration: timestamp(input.duration()),
            size,
            bit_rate: (format_context.bit_rate > 0).then_some(format_context.bit_rate),
            probe_score: format_context.probe_score,
            tags: collect_tags(input.metadata()),
            streams,
        };

        log::info!(
            "Opened media file: {} (format={}, streams={}, programs={}, probe_score={})",
            path,
            summary.format_name,
            summary.stream_count(),
            summary.program_count,
            summary.probe_score,
        );

        Ok(summary)
    }
}

/// Open `path` with the configured demuxer options and run the stream-info
/// pass.
fn open_input(path: &str, config: &ProbeConfig) -> Result<Input, ProbeError> {
    let open_error = |reason: String| ProbeError::FileOpen {
        path: path.to_string(),
        reason,
    };

    let c_path = CString::new(path).map_err(|_| open_error("path contains a NUL byte".into()))?;

    let default_scan_all_pmts = !config
        .format_options()
        .iter()
        .any(|(key, _)| key == "scan_all_pmts");

    let mut options = Dictionary::new();
    if default_scan_all_pmts {
        options.set("scan_all_pmts", "1");
    }
    for (key, value) in config.format_options() {
        options.set(key, value);
    }

    // SAFETY: ownership moves to `avformat_open_input` and back below.
    let mut raw_options = unsafe { options.disown() };
    let mut context: *mut AVFormatContext = ptr::null_mut();

    // SAFETY: `context` starts null so FFmpeg allocates it; on failure
    // FFmpeg frees it again. `raw_options` is reclaimed right after.
    let result = unsafe {
        ffmpeg_sys_next::avformat_open_input(
            &mut context,
            c_path.as_ptr(),
            ptr::null(),
            &mut raw_options,
        )
    };

    // SAFETY: whatever the demuxer did not consume is handed back to us.
    let leftover = unsafe { Dictionary::own(raw_options) };

    if result < 0 {
        return Err(open_error(ffmpeg_next::Error::from(result).to_string()));
    }

    // SAFETY: `avformat_open_input` succeeded; `Input` takes ownership and
    // closes the context on drop.
    let mut input = unsafe { Input::wrap(context) };

    if let Some((key, _)) = leftover
        .iter()
        .find(|(key, _)| !(default_scan_all_pmts && *key == "scan_all_pmts"))
    {
        log::error!("Option {key} not found.");
        return Err(ProbeError::OptionNotFound {
            key: key.to_string(),
        });
    }

    if config.find_stream_info() {
        // SAFETY: `input` is open; null options are allowed.
        let result = unsafe {
            ffmpeg_sys_next::avformat_find_stream_info(input.as_mut_ptr(), ptr::null_mut())
        };
        if result < 0 {
            return Err(open_error(ffmpeg_next::Error::from(result).to_string()));
        }
    }

    Ok(input)
}

fn timestamp(value: i64) -> Option<i64> {
    (value != AV_NOPTS_VALUE).then_some(value)
}

/// Copy every entry of an FFmpeg metadata dictionary, in insertion order.
///
/// Keys and values are not guaranteed to be UTF-8; invalid sequences are
/// replaced with U+FFFD.
pub fn collect_tags(metadata: DictionaryRef<'_>) -> Tags {
    let mut tags = Tags::new();
    let mut entry: *const AVDictionaryEntry = ptr::null();
    loop {
        // SAFETY: `metadata` borrows a live dictionary; an empty key with
        // `AV_DICT_IGNORE_SUFFIX` matches every entry after `entry`.
        entry = unsafe {
            ffmpeg_sys_next::av_dict_get(
                metadata.as_ptr(),
                c"".as_ptr(),
                entry,
                AV_DICT_IGNORE_SUFFIX as c_int,
            )
        };
        // SAFETY: non-null entries point into the dictionary.
        let Some(current) = (unsafe { entry.as_ref() }) else {
            break;
        };
        // SAFETY: dictionary keys and values are NUL-terminated.
        let pair = unsafe { (owned_c_string(current.key), owned_c_string(current.value)) };
        if let (Some(key), Some(value)) = pair {
            tags.push((key, value));
        }
    }
    tags
}

/// Copy a C string owned by FFmpeg, `None` for null.
///
/// # Safety
///
/// `text` must be null or point to a NUL-terminated string.
unsafe fn owned_c_string(text: *const c_char) -> Option<String> {
    if text.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned())
}

fn codec_parameters<'a>(stream: &'a Stream<'_>) -> &'a AVCodecParameters {
    // SAFETY: every stream of an open input has non-null codec parameters
    // that live as long as the stream.
    unsafe { &*(*stream.as_ptr()).codecpar }
}

fn media_kind(medium: Type) -> MediaKind {
    match medium {
        Type::Video => MediaKind::Video,
        Type::Audio => MediaKind::Audio,
        Type::Subtitle => MediaKind::Subtitle,
        Type::Data => MediaKind::Data,
        Type::Attachment => MediaKind::Attachment,
        _ => MediaKind::Unknown,
    }
}

fn summarize_stream(stream: &Stream<'_>, config: &ProbeConfig) -> StreamSummary {
    let parameters = codec_parameters(stream);
    let kind = media_kind(stream.parameters().medium());
    let codec_id = CodecId::from(parameters.codec_id);

    let mut summary = StreamSummary::new(stream.index(), kind, codec_id.name());
    summary.id = stream.id();

    // SAFETY: both lookups return null or static strings.
    unsafe {
        summary.codec_long_name = ffmpeg_sys_next::avcodec_descriptor_get(parameters.codec_id)
            .as_ref()
            .and_then(|descriptor| owned_c_string(descriptor.long_name));
        summary.profile = owned_c_string(ffmpeg_sys_next::avcodec_profile_name(
            parameters.codec_id,
            parameters.profile,
        ));
    }
    summary.profile_id = parameters.profile;
    summary.codec_tag = parameters.codec_tag;

    summary.time_base = stream.time_base();
    summary.real_frame_rate = stream.rate();
    summary.average_frame_rate = stream.avg_frame_rate();
    summary.start_pts = timestamp(stream.start_time());
    summary.duration_ts = timestamp(stream.duration());
    summary.bit_rate = (parameters.bit_rate > 0).then_some(parameters.bit_rate);
    summary.frame_count = (stream.frames() > 0).then_some(stream.frames());
    summary.disposition = stream.disposition().bits();
    summary.tags = collect_tags(stream.metadata());

    summary.parameters = match kind {
        MediaKind::Video => KindParameters::Video(video_parameters(stream, parameters)),
        MediaKind::Audio => KindParameters::Audio(audio_parameters(stream, parameters)),
        MediaKind::Subtitle => KindParameters::Subtitle(SubtitleParameters {
            width: parameters.width.max(0) as u32,
            height: parameters.height.max(0) as u32,
        }),
        _ => KindParameters::None,
    };

    match bind_decoder(stream, parameters, config) {
        Ok(details) => summary.decoder = Some(details),
        Err(error) => log::warn!("{error}"),
    }

    summary
}

/// Static name for an FFmpeg enum value, `None` when unspecified.
fn named<T: PartialEq>(
    value: T,
    unspecified: T,
    name: unsafe extern "C" fn(T) -> *const c_char,
) -> Option<String> {
    if value == unspecified {
        return None;
    }
    // SAFETY: the `av_*_name` lookups return null or a static string.
    unsafe { owned_c_string(name(value)) }
}

fn video_parameters(stream: &Stream<'_>, parameters: &AVCodecParameters) -> VideoParameters {
    let pixel_format = CodecContext::from_parameters(stream.parameters())
        .ok()
        .and_then(|context| context.decoder().video().ok())
        .and_then(|video| video.format().descriptor())
        .map(|descriptor| descriptor.name().to_string());

    // Stream-level aspect ratio wins over the codec's, as in
    // `av_guess_sample_aspect_ratio`.
    // SAFETY: the stream pointer is valid for the lifetime of `stream`.
    let stream_ratio = unsafe { (*stream.as_ptr()).sample_aspect_ratio };
    let ratio = if stream_ratio.num > 0 && stream_ratio.den > 0 {
        stream_ratio
    } else {
        parameters.sample_aspect_ratio
    };
    let sample_aspect_ratio = (ratio.num > 0 && ratio.den > 0).then(|| Rational::from(ratio));

    let color = ColorInfo {
        range: named(
            parameters.color_range,
            AVColorRange::AVCOL_RANGE_UNSPECIFIED,
            ffmpeg_sys_next::av_color_range_name,
        ),
        space: named(
            parameters.color_space,
            AVColorSpace::AVCOL_SPC_UNSPECIFIED,
            ffmpeg_sys_next::av_color_space_name,
        ),
        transfer: named(
            parameters.color_trc,
            AVColorTransferCharacteristic::AVCOL_TRC_UNSPECIFIED,
            ffmpeg_sys_next::av_color_transfer_name,
        ),
        primaries: named(
            parameters.color_primaries,
            AVColorPrimaries::AVCOL_PRI_UNSPECIFIED,
            ffmpeg_sys_next::av_color_primaries_name,
        ),
        chroma_location: named(
            parameters.chroma_location,
            AVChromaLocation::AVCHROMA_LOC_UNSPECIFIED,
            ffmpeg_sys_next::av_chroma_location_name,
        ),
    };

    let field_order = match parameters.field_order {
        AVFieldOrder::AV_FIELD_PROGRESSIVE => Some(FieldOrder::Progressive),
        AVFieldOrder::AV_FIELD_TT => Some(FieldOrder::TopFirst),
        AVFieldOrder::AV_FIELD_BB => Some(FieldOrder::BottomFirst),
        AVFieldOrder::AV_FIELD_TB => Some(FieldOrder::TopCodedBottomDisplayed),
        AVFieldOrder::AV_FIELD_BT => Some(FieldOrder::BottomCodedTopDisplayed),
        _ => None,
    };

    VideoParameters {
        width: parameters.width.max(0) as u32,
        height: parameters.height.max(0) as u32,
        sample_aspect_ratio,
        pixel_format,
        level: parameters.level,
        color,
        field_order,
    }
}

fn audio_parameters(stream: &Stream<'_>, parameters: &AVCodecParameters) -> AudioParameters {
    let sample_format = CodecContext::from_parameters(stream.parameters())
        .ok()
        .and_then(|context| context.decoder().audio().ok())
        .map(|audio| audio.format())
        .filter(|format| *format != Sample::None)
        .map(|format| format.name().to_string());

    let layout = &parameters.ch_layout;
    // SAFETY: `mask` is the active union member for native-order layouts.
    let has_mask =
        layout.order == AVChannelOrder::AV_CHANNEL_ORDER_NATIVE && unsafe { layout.u.mask } != 0;
    let channel_layout = if has_mask {
        let mut description = [0 as c_char; 128];
        // SAFETY: `description` is writable for its full length and the
        // result is always NUL-terminated.
        let written = unsafe {
            ffmpeg_sys_next::av_channel_layout_describe(
                layout,
                description.as_mut_ptr(),
                description.len(),
            )
        };
        if written >= 0 {
            // SAFETY: see above.
            unsafe { owned_c_string(description.as_ptr()) }
        } else {
            None
        }
    } else {
        None
    };

    // SAFETY: pure lookup on the codec id.
    let bits_per_sample = unsafe { ffmpeg_sys_next::av_get_bits_per_sample(parameters.codec_id) };

    AudioParameters {
        sample_format,
        sample_rate: parameters.sample_rate.max(0) as u32,
        channels: layout.nb_channels.max(0) as u32,
        channel_layout,
        bits_per_sample: bits_per_sample.max(0) as u32,
    }
}

/// Open a decoder for `stream` and read the fields only a bound decoder
/// knows. The decoder is closed before this returns.
fn bind_decoder(
    stream: &Stream<'_>,
    parameters: &AVCodecParameters,
    config: &ProbeConfig,
) -> Result<DecoderDetails, ProbeError> {
    let stream_index = stream.index();
    let bind_error = |reason: String| ProbeError::DecoderBind {
        stream_index,
        reason,
    };

    if parameters.codec_id == AVCodecID::AV_CODEC_ID_PROBE {
        return Err(bind_error("failed to probe codec".into()));
    }

    let codec_id = CodecId::from(parameters.codec_id);
    let codec = ffmpeg_next::codec::decoder::find(codec_id)
        .ok_or_else(|| bind_error(format!("unsupported codec {}", codec_id.name())))?;

    let mut context = CodecContext::from_parameters(stream.parameters())
        .map_err(|error| bind_error(error.to_string()))?;

    // SAFETY: `context` is a freshly allocated, not yet opened codec context.
    unsafe {
        let raw = context.as_mut_ptr();
        (*raw).pkt_timebase = stream.time_base().into();
        (*raw).framerate = stream.avg_frame_rate().into();
    }

    let decoder = context
        .decoder()
        .open_as(codec)
        .map_err(|error| bind_error(format!("could not open codec: {error}")))?;

    // SAFETY: `decoder` keeps the opened context alive until it is dropped
    // at the end of this function.
    let raw: &AVCodecContext = unsafe { &*decoder.as_ptr() };

    let private_options = if config.show_private_data() {
        // SAFETY: `priv_data` belongs to the open decoder.
        unsafe { private_options(raw.priv_data) }
    } else {
        Vec::new()
    };

    Ok(DecoderDetails {
        bits_per_raw_sample: raw.bits_per_raw_sample,
        coded_width: raw.coded_width.max(0) as u32,
        coded_height: raw.coded_height.max(0) as u32,
        has_b_frames: raw.has_b_frames,
        refs: raw.refs,
        timecode_frame_start: raw.timecode_frame_start,
        private_options,
    })
}

/// Readable private options of a decoder, skipping constants and flag sets.
///
/// # Safety
///
/// `object` must be null or an AVOption-enabled struct.
unsafe fn private_options(object: *mut c_void) -> Vec<(String, String)> {
    let mut options = Vec::new();
    if object.is_null() {
        return options;
    }

    let mut option: *const AVOption = ptr::null();
    loop {
        option = unsafe { ffmpeg_sys_next::av_opt_next(object, option) };
        let Some(entry) = (unsafe { option.as_ref() }) else {
            break;
        };
        if matches!(
            entry.type_,
            AVOptionType::AV_OPT_TYPE_CONST | AVOptionType::AV_OPT_TYPE_FLAGS
        ) {
            continue;
        }
        let Some(name) = (unsafe { owned_c_string(entry.name) }) else {
            continue;
        };

        let mut value: *mut u8 = ptr::null_mut();
        let result = unsafe { ffmpeg_sys_next::av_opt_get(object, entry.name, 0, &mut value) };
        if result >= 0 && !value.is_null() {
            if let Some(text) = unsafe { owned_c_string(value as *const c_char) } {
                options.push((name, text));
            }
            unsafe { ffmpeg_sys_next::av_free(value as *mut c_void) };
        }
    }

    options
}
