//! Probing entry points.
//!
//! [`MediaProbe`] opens a container, walks its metadata, and closes it
//! again before returning. Only the finished JSON document leaves the call,
//! so probing many files keeps no FFmpeg state alive between them.

use crate::{
    analyzer::FfmpegAnalyzer,
    buffer::JsonBuffer,
    config::ProbeConfig,
    error::ProbeError,
    walker::MetadataWalker,
};

/// Probe `path` with the default configuration.
///
/// The result is always a parseable JSON document. When the file cannot be
/// opened it is `{"error":"<path>: <message>"}`.
///
/// # Example
///
/// ```no_run
/// let document = probejson::probe_file_info("input.mp4");
/// println!("{document}");
/// ```
pub fn probe_file_info(path: &str) -> JsonBuffer {
    MediaProbe::probe(path)
}

/// FFmpeg-backed JSON prober.
///
/// # Example
///
/// ```no_run
/// use probejson::{MediaProbe, ProbeConfig};
///
/// let config = ProbeConfig::new().with_show_unit(true);
/// let document = MediaProbe::probe_with_config("input.mkv", &config);
/// println!("{document}");
/// ```
pub struct MediaProbe;

impl MediaProbe {
    /// Probe a media file and return its JSON document.
    pub fn probe(path: &str) -> JsonBuffer {
        Self::probe_with_config(path, &ProbeConfig::default())
    }

    /// Probe a media file with custom settings.
    ///
    /// Open and option failures are written into the document as its only
    /// `error` key rather than returned.
    pub fn probe_with_config(path: &str, config: &ProbeConfig) -> JsonBuffer {
        log::debug!("Probing {path}");
        MetadataWalker::new(&FfmpegAnalyzer, config).walk(path)
    }

    /// Probe a media file, returning open and option failures as errors.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::FileOpen`] if the file cannot be opened or
    /// recognised, and [`ProbeError::OptionNotFound`] if a demuxer option in
    /// `config` was not consumed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use probejson::{MediaProbe, ProbeConfig};
    ///
    /// match MediaProbe::try_probe("input.mp4", &ProbeConfig::default()) {
    ///     Ok(document) => println!("{document}"),
    ///     Err(error) => eprintln!("{error}"),
    /// }
    /// ```
    pub fn try_probe(path: &str, config: &ProbeConfig) -> Result<JsonBuffer, ProbeError> {
        log::debug!("Probing {path}");
        MetadataWalker::new(&FfmpegAnalyzer, config).try_walk(path)
    }

    /// Probe several files with one configuration.
    ///
    /// Files that cannot be opened produce an error document in their slot
    /// rather than aborting the batch.
    pub fn probe_many<P: AsRef<str>>(paths: &[P], config: &ProbeConfig) -> Vec<JsonBuffer> {
        let mut walker = MetadataWalker::new(&FfmpegAnalyzer, config);
        paths
            .iter()
            .map(|path| walker.walk(path.as_ref()))
            .collect()
    }
}
