//! Document assembly tests driven by in-memory analyzers.

use probejson::{
    AudioParameters, ColorInfo, ContainerSummary, DecoderDetails, FieldOrder, JsonBuffer,
    KindParameters, MediaAnalyzer, MediaKind, MetadataWalker, MissingValue, ProbeConfig,
    ProbeError, ProbeState, Rational, StreamSummary, SubtitleParameters, VideoParameters,
};
use serde_json::Value;

struct FixedAnalyzer(ContainerSummary);

impl MediaAnalyzer for FixedAnalyzer {
    fn analyze(&self, path: &str, _config: &ProbeConfig) -> Result<ContainerSummary, ProbeError> {
        let mut container = self.0.clone();
        container.filename = path.to_string();
        Ok(container)
    }
}

struct FailingAnalyzer;

impl MediaAnalyzer for FailingAnalyzer {
    fn analyze(&self, path: &str, _config: &ProbeConfig) -> Result<ContainerSummary, ProbeError> {
        Err(ProbeError::FileOpen {
            path: path.to_string(),
            reason: "No such file or directory".to_string(),
        })
    }
}

fn video_stream() -> StreamSummary {
    let mut stream = StreamSummary::new(0, MediaKind::Video, "h264");
    stream.codec_long_name = Some("H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10".into());
    stream.profile = Some("High".into());
    stream.profile_id = 100;
    stream.codec_tag = u32::from_le_bytes(*b"avc1");
    stream.time_base = Rational::new(1, 15360);
    stream.real_frame_rate = Rational::new(30, 1);
    stream.average_frame_rate = Rational::new(30, 1);
    stream.start_pts = Some(0);
    stream.duration_ts = Some(76800);
    stream.bit_rate = Some(1_200_000);
    stream.frame_count = Some(150);
    stream.disposition = 0x0001;
    stream.tags.push(("language".into(), "und".into()));
    stream.parameters = KindParameters::Video(VideoParameters {
        width: 1920,
        height: 1080,
        sample_aspect_ratio: Some(Rational::new(1, 1)),
        pixel_format: Some("yuv420p".into()),
        level: 40,
        color: ColorInfo {
            range: Some("tv".into()),
            primaries: Some("bt709".into()),
            ..ColorInfo::default()
        },
        field_order: Some(FieldOrder::Progressive),
    });
    stream.decoder = Some(DecoderDetails {
        bits_per_raw_sample: 8,
        coded_width: 1920,
        coded_height: 1088,
        has_b_frames: 2,
        refs: 1,
        timecode_frame_start: -1,
        private_options: vec![("is_avc".into(), "1".into())],
    });
    stream
}

fn audio_stream() -> StreamSummary {
    let mut stream = StreamSummary::new(1, MediaKind::Audio, "aac");
    stream.profile = Some("LC".into());
    stream.profile_id = 1;
    stream.time_base = Rational::new(1, 48000);
    stream.start_pts = Some(0);
    stream.duration_ts = Some(240_000);
    stream.id = 0x101;
    stream.tags.push(("language".into(), "eng".into()));
    stream.parameters = KindParameters::Audio(AudioParameters {
        sample_format: Some("fltp".into()),
        sample_rate: 48000,
        channels: 2,
        channel_layout: Some("stereo".into()),
        bits_per_sample: 0,
    });
    stream
}

fn subtitle_stream() -> StreamSummary {
    let mut stream = StreamSummary::new(2, MediaKind::Subtitle, "subrip");
    stream.time_base = Rational::new(1, 1000);
    stream.parameters = KindParameters::Subtitle(SubtitleParameters { width: 0, height: 0 });
    stream
}

fn container(streams: Vec<StreamSummary>) -> ContainerSummary {
    ContainerSummary {
        filename: String::new(),
        program_count: 0,
        format_name: "mov,mp4,m4a,3gp,3g2,mj2".into(),
        format_long_name: Some("QuickTime / MOV".into()),
        start_time: Some(0),
        duration: Some(5_000_000),
        size: Some(1_048_576),
        bit_rate: Some(1_677_721),
        probe_score: 100,
        tags: vec![("major_brand".into(), "isom".into())],
        streams,
    }
}

fn walk(analyzer: &dyn MediaAnalyzer, config: &ProbeConfig, path: &str) -> (JsonBuffer, Value) {
    let document = MetadataWalker::new(analyzer, config).walk(path);
    let value = serde_json::from_str(document.as_str())
        .unwrap_or_else(|error| panic!("invalid JSON ({error}): {}", document.as_str()));
    (document, value)
}

#[test]
fn full_document() {
    let analyzer = FixedAnalyzer(container(vec![video_stream(), audio_stream(), subtitle_stream()]));
    let (document, value) = walk(&analyzer, &ProbeConfig::default(), "sample.mp4");

    assert!(document.as_str().starts_with(r#"{"format":{"filename":"sample.mp4","nb_streams":3,"#));
    assert_eq!(document.as_bytes_with_nul().last(), Some(&0));

    let format = &value["format"];
    assert_eq!(format["nb_programs"], 0);
    assert_eq!(format["format_long_name"], "QuickTime / MOV");
    assert_eq!(format["start_time"], "0.000000");
    assert_eq!(format["duration"], "5.000000");
    assert_eq!(format["size"], 1_048_576);
    assert_eq!(format["bit_rate"], 1_677_721);
    assert_eq!(format["probe_score"], 100);
    assert_eq!(format["tags"]["major_brand"], "isom");

    let streams = value["streams"].as_array().expect("streams should be an array");
    assert_eq!(streams.len(), 3);
}

#[test]
fn video_stream_fields() {
    let analyzer = FixedAnalyzer(container(vec![video_stream()]));
    let (_, value) = walk(&analyzer, &ProbeConfig::default(), "video.mp4");
    let video = &value["streams"][0];

    assert_eq!(video["index"], 0);
    assert_eq!(video["codec_name"], "h264");
    assert_eq!(video["profile"], "High");
    assert_eq!(video["codec_type"], "video");
    assert_eq!(video["codec_tag_string"], "avc1");
    assert_eq!(video["codec_tag"], "0x31637661");
    assert_eq!(video["width"], 1920);
    assert_eq!(video["coded_height"], 1088);
    assert_eq!(video["has_b_frames"], 2);
    assert_eq!(video["sample_aspect_ratio"], "1:1");
    assert_eq!(video["display_aspect_ratio"], "16:9");
    assert_eq!(video["pix_fmt"], "yuv420p");
    assert_eq!(video["level"], 40);
    assert_eq!(video["color_range"], "tv");
    assert_eq!(video["color_primaries"], "bt709");
    assert!(video.get("color_space").is_none());
    assert_eq!(video["field_order"], "progressive");
    assert!(video.get("timecode").is_none());
    assert_eq!(video["refs"], 1);
    assert_eq!(video["r_frame_rate"], "30/1");
    assert_eq!(video["time_base"], "1/15360");
    assert_eq!(video["start_pts"], 0);
    assert_eq!(video["duration_ts"], 76800);
    assert_eq!(video["duration"], "5.000000");
    assert_eq!(video["bit_rate"], 1_200_000);
    assert_eq!(video["bits_per_raw_sample"], 8);
    assert_eq!(video["nb_frames"], 150);
    assert_eq!(video["is_avc"], "1");
    assert!(video.get("id").is_none());
    assert_eq!(video["disposition"]["default"], 1);
    assert_eq!(video["disposition"]["attached_pic"], 0);
    assert_eq!(video["tags"]["language"], "und");
}

#[test]
fn audio_stream_fields() {
    let analyzer = FixedAnalyzer(container(vec![audio_stream()]));
    let (_, value) = walk(&analyzer, &ProbeConfig::default(), "audio.m4a");
    let audio = &value["streams"][0];

    assert_eq!(audio["codec_type"], "audio");
    assert_eq!(audio["sample_fmt"], "fltp");
    assert_eq!(audio["sample_rate"], 48000);
    assert_eq!(audio["channels"], 2);
    assert_eq!(audio["channel_layout"], "stereo");
    assert_eq!(audio["bits_per_sample"], 0);
    assert_eq!(audio["id"], "0x101");
    assert_eq!(audio["duration"], "5.000000");
    assert!(audio["bit_rate"].is_null());
    assert!(audio.get("bits_per_raw_sample").is_none());
    assert!(audio.get("nb_frames").is_none());
    assert!(audio.get("width").is_none());
}

#[test]
fn subtitle_dimensions_only_when_set() {
    let mut sized = subtitle_stream();
    sized.index = 1;
    sized.parameters = KindParameters::Subtitle(SubtitleParameters { width: 720, height: 480 });
    let analyzer = FixedAnalyzer(container(vec![subtitle_stream(), sized]));
    let (_, value) = walk(&analyzer, &ProbeConfig::default(), "subs.mkv");

    assert!(value["streams"][0].get("width").is_none());
    assert!(value["streams"][0].get("height").is_none());
    assert_eq!(value["streams"][1]["width"], 720);
    assert_eq!(value["streams"][1]["height"], 480);
}

#[test]
fn disposition_lists_every_flag() {
    let mut stream = audio_stream();
    stream.disposition = 0x0002 | 0x10000;
    let analyzer = FixedAnalyzer(container(vec![stream]));
    let (_, value) = walk(&analyzer, &ProbeConfig::default(), "dub.mkv");

    let disposition = value["streams"][0]["disposition"]
        .as_object()
        .expect("disposition should be an object");
    assert_eq!(disposition.len(), 14);
    assert_eq!(disposition["dub"], 1);
    assert_eq!(disposition["captions"], 1);
    assert_eq!(disposition["descriptions"], 0);
}

#[test]
fn zero_streams_yield_empty_array() {
    let analyzer = FixedAnalyzer(container(Vec::new()));
    let (document, value) = walk(&analyzer, &ProbeConfig::default(), "empty.mp4");

    assert!(document.as_str().contains(r#""streams":[]"#));
    assert_eq!(value["format"]["nb_streams"], 0);
}

#[test]
fn excluded_streams_still_counted() {
    let analyzer = FixedAnalyzer(container(vec![video_stream(), audio_stream(), subtitle_stream()]));
    let config = ProbeConfig::new().with_stream_specifier("a".parse().expect("valid specifier"));
    let (_, value) = walk(&analyzer, &config, "sample.mp4");

    assert_eq!(value["format"]["nb_streams"], 3);
    let streams = value["streams"].as_array().expect("streams should be an array");
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0]["index"], 1);
}

#[test]
fn specifier_matching_nothing() {
    let analyzer = FixedAnalyzer(container(vec![video_stream()]));
    let config = ProbeConfig::new().with_stream_specifier("s".parse().expect("valid specifier"));
    let (document, value) = walk(&analyzer, &config, "sample.mp4");

    assert!(document.as_str().ends_with(r#""streams":[]}"#));
    assert_eq!(value["format"]["nb_streams"], 1);
}

#[test]
fn missing_value_style_applies_everywhere() {
    let mut bare = container(vec![audio_stream()]);
    bare.size = None;
    bare.bit_rate = None;
    bare.duration = None;
    let analyzer = FixedAnalyzer(bare);
    let config = ProbeConfig::new().with_missing_value(MissingValue::NotAvailable);
    let (_, value) = walk(&analyzer, &config, "stream.ts");

    assert_eq!(value["format"]["size"], "N/A");
    assert_eq!(value["format"]["bit_rate"], "N/A");
    assert_eq!(value["format"]["duration"], "N/A");
    assert_eq!(value["streams"][0]["bit_rate"], "N/A");
}

#[test]
fn missing_values_default_to_null() {
    let mut bare = container(Vec::new());
    bare.size = None;
    bare.format_long_name = None;
    let analyzer = FixedAnalyzer(bare);
    let (_, value) = walk(&analyzer, &ProbeConfig::default(), "raw.bin");

    assert!(value["format"]["size"].is_null());
    assert_eq!(value["format"]["format_long_name"], "unknown");
}

#[test]
fn units_and_prefixes() {
    let analyzer = FixedAnalyzer(container(vec![audio_stream()]));
    let config = ProbeConfig::new()
        .with_show_unit(true)
        .with_prefix(true)
        .with_binary_byte_prefix(true)
        .with_sexagesimal(true);
    let (_, value) = walk(&analyzer, &config, "sample.mp4");

    assert_eq!(value["format"]["size"], "1 Mibyte");
    assert_eq!(value["format"]["duration"], "0:00:05.000000");
    assert_eq!(value["streams"][0]["sample_rate"], "48 KHz");
}

#[test]
fn private_data_can_be_hidden() {
    let analyzer = FixedAnalyzer(container(vec![video_stream()]));
    let config = ProbeConfig::new().with_private_data(false);
    let (_, value) = walk(&analyzer, &config, "video.mp4");

    assert!(value["streams"][0].get("is_avc").is_none());
    assert_eq!(value["streams"][0]["refs"], 1);
}

#[test]
fn streams_without_decoder_omit_decoder_fields() {
    let mut stream = video_stream();
    stream.decoder = None;
    let analyzer = FixedAnalyzer(container(vec![stream]));
    let (_, value) = walk(&analyzer, &ProbeConfig::default(), "video.mp4");
    let video = &value["streams"][0];

    assert_eq!(video["width"], 1920);
    for key in ["coded_width", "coded_height", "has_b_frames", "refs", "bits_per_raw_sample", "is_avc"] {
        assert!(video.get(key).is_none(), "{key} should be absent");
    }
}

#[test]
fn timecode_rendered_when_present() {
    let mut stream = video_stream();
    if let Some(decoder) = stream.decoder.as_mut() {
        decoder.timecode_frame_start = (1 << 19) | (1 << 24);
    }
    let analyzer = FixedAnalyzer(container(vec![stream]));
    let (_, value) = walk(&analyzer, &ProbeConfig::default(), "tape.mpg");

    assert_eq!(value["streams"][0]["timecode"], "01:00:00;00");
}

#[test]
fn numeric_profile_fallback() {
    let mut stream = audio_stream();
    stream.profile = None;
    stream.profile_id = 28;
    let mut unknown = subtitle_stream();
    unknown.index = 1;
    let analyzer = FixedAnalyzer(container(vec![stream, unknown]));
    let (_, value) = walk(&analyzer, &ProbeConfig::default(), "sample.mkv");

    assert_eq!(value["streams"][0]["profile"], "28");
    assert!(value["streams"][1]["profile"].is_null());
}

#[test]
fn tags_are_escaped() {
    let mut summary = container(Vec::new());
    summary.tags.push(("title".into(), "A \"quoted\"\nline".into()));
    let analyzer = FixedAnalyzer(summary);
    let (_, value) = walk(&analyzer, &ProbeConfig::default(), "tagged.mp4");

    assert_eq!(value["format"]["tags"]["title"], "A \"quoted\"\nline");
}

#[test]
fn open_failure_produces_error_document() {
    let config = ProbeConfig::default();
    let mut walker = MetadataWalker::new(&FailingAnalyzer, &config);
    let document = walker.walk("missing.mp4");

    assert_eq!(walker.state(), ProbeState::ErrorTerminal);
    assert_eq!(
        document.as_str(),
        r#"{"error":"missing.mp4: No such file or directory"}"#
    );
    assert_eq!(document.as_bytes_with_nul().last(), Some(&0));
}

#[test]
fn try_walk_returns_the_error() {
    let config = ProbeConfig::default();
    let mut walker = MetadataWalker::new(&FailingAnalyzer, &config);
    let result = walker.try_walk("missing.mp4");

    assert!(matches!(result, Err(ProbeError::FileOpen { .. })));
}

#[test]
fn walker_ends_in_done() {
    let analyzer = FixedAnalyzer(container(Vec::new()));
    let config = ProbeConfig::default();
    let mut walker = MetadataWalker::new(&analyzer, &config);
    assert_eq!(walker.state(), ProbeState::Init);

    walker.walk("empty.mp4");
    assert_eq!(walker.state(), ProbeState::Done);
}

#[test]
fn walker_is_reusable_across_paths() {
    let analyzer = FixedAnalyzer(container(vec![audio_stream()]));
    let config = ProbeConfig::default();
    let mut walker = MetadataWalker::new(&analyzer, &config);

    let first = walker.walk("one.mp4");
    let second = walker.walk("two.mp4");
    assert!(first.as_str().contains(r#""filename":"one.mp4""#));
    assert!(second.as_str().contains(r#""filename":"two.mp4""#));
    assert!(!second.as_str().contains("one.mp4"));
}
