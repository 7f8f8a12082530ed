//! Error types for the `probejson` crate.
//!
//! [`ProbeError`] covers every way a probe can go wrong. Only the open and
//! configuration variants abort a probe; per-stream failures such as
//! [`ProbeError::DecoderBind`] are logged and the affected fields are left
//! out of the document.

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `probejson` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProbeError {
    /// The container could not be opened or its format could not be
    /// detected.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path or URL that was passed to the probe.
        path: String,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// A demuxer option supplied through
    /// [`ProbeConfig::with_format_option`](crate::ProbeConfig::with_format_option)
    /// was not consumed by the demuxer.
    #[error("Option {key} not found")]
    OptionNotFound {
        /// The unrecognised option key.
        key: String,
    },

    /// A stream specifier could not be parsed.
    #[error("Invalid stream specifier '{specifier}': {reason}")]
    InvalidStreamSpecifier {
        /// The specifier text as given.
        specifier: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No decoder could be found or opened for one stream. Never aborts a
    /// probe.
    #[error("Could not bind a decoder for stream {stream_index}: {reason}")]
    DecoderBind {
        /// Index of the stream within the container.
        stream_index: usize,
        /// Underlying reason.
        reason: String,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),
}

impl ProbeError {
    /// The human readable part of the message, without the path prefix.
    ///
    /// Used for the `"error"` field, which is rendered as
    /// `"<filename>: <detail>"`.
    pub fn detail(&self) -> String {
        match self {
            ProbeError::FileOpen { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl From<FfmpegError> for ProbeError {
    fn from(error: FfmpegError) -> Self {
        ProbeError::FfmpegError(error.to_string())
    }
}
