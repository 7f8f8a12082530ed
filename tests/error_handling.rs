//! Error handling integration tests.
//!
//! These tests verify that open and option failures become well-formed
//! error documents and meaningful errors.

use probejson::{MediaProbe, ProbeConfig, ProbeError};
use serde_json::Value;

fn parse(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|error| panic!("invalid JSON ({error}): {text}"))
}

#[test]
fn nonexistent_file_yields_error_document() {
    let path = "this_file_does_not_exist.mp4";
    let document = probejson::probe_file_info(path);
    assert_eq!(document.as_bytes_with_nul().last(), Some(&0));

    let value = parse(document.as_str());
    let object = value.as_object().expect("document should be an object");
    assert_eq!(object.len(), 1, "only the error key expected: {value}");

    let message = object["error"].as_str().expect("error should be a string");
    assert!(
        message.starts_with("this_file_does_not_exist.mp4: "),
        "error should name the file: {message}"
    );
}

#[test]
fn try_probe_nonexistent_file() {
    let result = MediaProbe::try_probe("this_file_does_not_exist.mp4", &ProbeConfig::default());
    let error = result.unwrap_err();
    assert!(matches!(error, ProbeError::FileOpen { .. }));

    let error_message = error.to_string();
    assert!(
        error_message.contains("Failed to open media file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn invalid_file_yields_error_document() {
    // Create a temporary file with garbage content.
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");
    let path = invalid_file_path.to_str().expect("temp path should be UTF-8");

    let document = MediaProbe::probe(path);
    let value = parse(document.as_str());
    assert!(value.get("format").is_none());
    assert!(value.get("streams").is_none());
    let message = value["error"].as_str().expect("error should be a string");
    assert!(message.starts_with(path), "error should name the file: {message}");
}

#[test]
fn probe_many_keeps_going_after_failures() {
    let documents = MediaProbe::probe_many(
        &["missing_one.mp4", "missing_two.mkv"],
        &ProbeConfig::default(),
    );
    assert_eq!(documents.len(), 2);
    for (document, name) in documents.iter().zip(["missing_one.mp4", "missing_two.mkv"]) {
        let value = parse(document.as_str());
        let message = value["error"].as_str().expect("error should be a string");
        assert!(message.starts_with(name));
    }
}

#[test]
fn error_display_messages() {
    let error = ProbeError::OptionNotFound { key: "bogus".into() };
    assert_eq!(error.to_string(), "Option bogus not found");
    assert_eq!(error.detail(), "Option bogus not found");

    let error = ProbeError::FileOpen {
        path: "a.mp4".into(),
        reason: "No such file or directory".into(),
    };
    assert_eq!(error.detail(), "No such file or directory");

    let error = ProbeError::DecoderBind {
        stream_index: 2,
        reason: "no decoder".into(),
    };
    assert!(error.to_string().contains("stream 2"));
}

#[test]
fn ffmpeg_errors_convert() {
    let error: ProbeError = ffmpeg_next::Error::InvalidData.into();
    assert!(matches!(error, ProbeError::FfmpegError(_)));
}
