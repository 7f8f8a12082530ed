//! Print the audio streams of a media file with units and binary prefixes.
//!
//! Usage:
//!   cargo run --example probe -- <input_file>

use std::error::Error;

use probejson::{FfmpegLogLevel, MediaProbe, MissingValue, ProbeConfig};
use serde_json::Value;

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "input.mp4".to_string());

    probejson::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    let config = ProbeConfig::new()
        .with_show_unit(true)
        .with_prefix(true)
        .with_binary_byte_prefix(true)
        .with_sexagesimal(true)
        .with_missing_value(MissingValue::NotAvailable)
        .with_stream_specifier("a".parse()?);

    println!("Probing {input_path}...");
    let document = MediaProbe::probe_with_config(&input_path, &config);
    let value: Value = serde_json::from_str(document.as_str())?;

    if let Some(message) = value["error"].as_str() {
        return Err(message.into());
    }

    let format = &value["format"];
    println!();
    println!("=== Container ===");
    println!("Format:   {}", format["format_name"]);
    println!("Duration: {}", format["duration"]);
    println!("Size:     {}", format["size"]);
    println!("Bit rate: {}", format["bit_rate"]);

    let streams = value["streams"].as_array().cloned().unwrap_or_default();
    if streams.is_empty() {
        println!();
        println!("--- No Audio Stream ---");
    }
    for stream in &streams {
        println!();
        println!("--- Audio Stream {} ---", stream["index"]);
        println!("  Codec:       {}", stream["codec_name"]);
        println!("  Sample rate: {}", stream["sample_rate"]);
        println!("  Channels:    {}", stream["channels"]);
        println!("  Layout:      {}", stream["channel_layout"]);
    }

    println!();
    println!("Raw document: {document}");
    Ok(())
}
