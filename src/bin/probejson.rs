use clap::Parser;
use colored::Colorize;
use log::LevelFilter;
use probejson::{FfmpegLogLevel, MediaProbe, MissingValue, ProbeConfig, StreamSpecifier};
use serde_json::Value;

const CLI_AFTER_HELP: &str = "Examples:\n  probejson input.mp4 --pretty\n  probejson input.mkv --unit --prefix --sexagesimal\n  probejson input.ts --select-streams a --missing na\n  probejson input.mp4 --option probesize=5000000 --log-level quiet";

#[derive(Debug, Parser)]
#[command(
    name = "probejson",
    version,
    about = "Print container and stream metadata of a media file as JSON",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input media path or URL.
    input: String,

    /// Append units (s, Hz, byte, bit/s) to values.
    #[arg(long)]
    unit: bool,

    /// Scale values and print SI prefixes.
    #[arg(long)]
    prefix: bool,

    /// Use binary prefixes (Ki, Mi, ...) for byte values.
    #[arg(long)]
    byte_binary_prefix: bool,

    /// Print times as H:MM:SS.ffffff.
    #[arg(long)]
    sexagesimal: bool,

    /// Pretty-print the document.
    #[arg(long)]
    pretty: bool,

    /// Only show streams matching this specifier (e.g. 0, v, a:1, m:language:eng, #0x101).
    #[arg(long)]
    select_streams: Option<String>,

    /// How missing values are written (null, zero, na).
    #[arg(long, default_value = "null")]
    missing: String,

    /// Omit decoder private options from stream objects.
    #[arg(long)]
    no_private_data: bool,

    /// Demuxer option as key=value. May be repeated.
    #[arg(long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Show diagnostic logging on stderr.
    #[arg(long)]
    verbose: bool,
}

fn parse_missing(value: &str) -> Option<MissingValue> {
    match value.to_ascii_lowercase().as_str() {
        "null" => Some(MissingValue::Null),
        "zero" | "0" => Some(MissingValue::Zero),
        "na" | "n/a" => Some(MissingValue::NotAvailable),
        _ => None,
    }
}

fn parse_option(value: &str) -> Option<(&str, &str)> {
    value
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
}

fn build_config(cli: &Cli) -> Result<ProbeConfig, Box<dyn std::error::Error>> {
    let missing = parse_missing(&cli.missing)
        .ok_or_else(|| format!("unknown missing value style '{}'", cli.missing))?;

    let mut config = ProbeConfig::new()
        .with_show_unit(cli.unit)
        .with_prefix(cli.prefix)
        .with_binary_byte_prefix(cli.byte_binary_prefix)
        .with_sexagesimal(cli.sexagesimal)
        .with_missing_value(missing)
        .with_private_data(!cli.no_private_data);

    if let Some(specifier) = &cli.select_streams {
        config = config.with_stream_specifier(specifier.parse::<StreamSpecifier>()?);
    }

    for option in &cli.options {
        let (key, value) =
            parse_option(option).ok_or_else(|| format!("expected KEY=VALUE, got '{option}'"))?;
        config = config.with_format_option(key, value);
    }

    Ok(config)
}

fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    if let Some(level) = &cli.log_level {
        probejson::set_ffmpeg_log_level(level.parse::<FfmpegLogLevel>()?);
    }

    let config = build_config(&cli)?;
    let document = MediaProbe::probe_with_config(&cli.input, &config);
    let payload: Value = serde_json::from_str(document.as_str())?;

    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{document}");
    }

    match payload.get("error").and_then(Value::as_str) {
        Some(message) => {
            eprintln!("{} {}", "error:".red().bold(), message.red());
            Ok(false)
        }
        None => Ok(true),
    }
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
