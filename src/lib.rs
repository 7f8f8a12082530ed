//! # probejson
//!
//! Describe a media container as a single JSON document: container format,
//! every stream's codec parameters, dispositions, and tags, powered by
//! FFmpeg via the [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next)
//! crate.
//!
//! The document is written incrementally into a [`JsonBuffer`] by a
//! [`JsonWriter`]; no JSON tree is built in memory. Numeric fields can be
//! rendered with units, SI or binary prefixes, and `H:MM:SS.ffffff` times.
//!
//! ## Quick Start
//!
//! ```no_run
//! let document = probejson::probe_file_info("input.mp4");
//! println!("{document}");
//! ```
//!
//! ### Presentation and selection
//!
//! ```no_run
//! use probejson::{MediaProbe, MissingValue, ProbeConfig};
//!
//! let config = ProbeConfig::new()
//!     .with_show_unit(true)
//!     .with_prefix(true)
//!     .with_binary_byte_prefix(true)
//!     .with_missing_value(MissingValue::NotAvailable)
//!     .with_stream_specifier("a".parse()?);
//! let document = MediaProbe::probe_with_config("input.mkv", &config);
//! # Ok::<(), probejson::ProbeError>(())
//! ```
//!
//! ### Custom metadata sources
//!
//! [`MetadataWalker`] only needs a [`MediaAnalyzer`]; anything that can
//! produce a [`ContainerSummary`] can be serialized the same way.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod analyzer;
pub mod buffer;
pub mod config;
pub mod conversion;
pub mod disposition;
pub mod error;
pub mod ffmpeg;
pub mod probe;
pub mod specifier;
pub mod summary;
pub mod value;
pub mod walker;
pub mod writer;

pub use analyzer::{FfmpegAnalyzer, MediaAnalyzer};
pub use buffer::JsonBuffer;
pub use config::ProbeConfig;
pub use disposition::{DISPOSITION_FLAGS, DispositionFlag};
pub use error::ProbeError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use probe::{MediaProbe, probe_file_info};
pub use specifier::{KindSelector, StreamSpecifier};
pub use summary::{
    AudioParameters, ColorInfo, ContainerSummary, DecoderDetails, FieldOrder, KindParameters,
    MediaKind, StreamSummary, SubtitleParameters, Tags, VideoParameters,
};
pub use value::{PresentationFlags, Unit, UnitValue, format_value};
pub use walker::{MetadataWalker, ProbeState};
pub use writer::{JsonWriter, MissingValue};

/// Re-exported so callers can build [`StreamSummary`] values without a
/// direct `ffmpeg-next` dependency.
pub use ffmpeg_next::Rational;
