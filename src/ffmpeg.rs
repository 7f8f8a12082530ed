//! FFmpeg console verbosity.
//!
//! FFmpeg writes its own diagnostics to stderr, independently of the `log`
//! facade used by this crate. Probing a damaged file can be noisy, so the
//! level is exposed here without requiring callers to depend on
//! `ffmpeg-next` directly.
//!
//! ```no_run
//! use probejson::FfmpegLogLevel;
//!
//! probejson::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let document = probejson::probe_file_info("input.ts");
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use ffmpeg_next::util::log::Level;

/// FFmpeg log level, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

const NAMES: [(FfmpegLogLevel, &str); 9] = [
    (FfmpegLogLevel::Quiet, "quiet"),
    (FfmpegLogLevel::Panic, "panic"),
    (FfmpegLogLevel::Fatal, "fatal"),
    (FfmpegLogLevel::Error, "error"),
    (FfmpegLogLevel::Warning, "warning"),
    (FfmpegLogLevel::Info, "info"),
    (FfmpegLogLevel::Verbose, "verbose"),
    (FfmpegLogLevel::Debug, "debug"),
    (FfmpegLogLevel::Trace, "trace"),
];

impl FfmpegLogLevel {
    /// Name accepted by [`FromStr`] and printed by [`Display`].
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(level, _)| *level == self)
            .map_or("warning", |(_, name)| name)
    }
}

impl From<FfmpegLogLevel> for Level {
    fn from(level: FfmpegLogLevel) -> Self {
        match level {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl From<Level> for FfmpegLogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Quiet => FfmpegLogLevel::Quiet,
            Level::Panic => FfmpegLogLevel::Panic,
            Level::Fatal => FfmpegLogLevel::Fatal,
            Level::Error => FfmpegLogLevel::Error,
            Level::Warning => FfmpegLogLevel::Warning,
            Level::Info => FfmpegLogLevel::Info,
            Level::Verbose => FfmpegLogLevel::Verbose,
            Level::Debug => FfmpegLogLevel::Debug,
            Level::Trace => FfmpegLogLevel::Trace,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    /// Case-insensitive; `warn` is accepted for `warning`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let lowered = text.to_ascii_lowercase();
        let wanted = if lowered == "warn" { "warning" } else { lowered.as_str() };
        NAMES
            .iter()
            .find(|(_, name)| *name == wanted)
            .map(|(level, _)| *level)
            .ok_or_else(|| {
                format!(
                    "unknown log level '{text}' (expected one of: {})",
                    NAMES.map(|(_, name)| name).join(", ")
                )
            })
    }
}

impl Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// Set FFmpeg's console log level. Does not affect the `log` facade.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}

/// Current FFmpeg console log level, or `None` if FFmpeg reports a value
/// outside the known levels.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level().ok().map(FfmpegLogLevel::from)
}
