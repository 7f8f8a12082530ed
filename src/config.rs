//! Probe configuration.
//!
//! [`ProbeConfig`] is a consuming builder that carries presentation flags,
//! the missing-value representation, stream selection, and demuxer options
//! through a probe without widening every function signature.
//!
//! # Example
//!
//! ```
//! use probejson::{MissingValue, ProbeConfig};
//!
//! let config = ProbeConfig::new()
//!     .with_show_unit(true)
//!     .with_sexagesimal(true)
//!     .with_missing_value(MissingValue::Zero)
//!     .with_stream_specifier("a".parse()?);
//! # Ok::<(), probejson::ProbeError>(())
//! ```

use crate::{specifier::StreamSpecifier, value::PresentationFlags, writer::MissingValue};

/// Settings for one probe call.
///
/// A default-constructed config writes bare numbers, uses `null` for
/// missing values, selects every stream, includes decoder private options,
/// and runs the full stream-info pass.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub(crate) presentation: PresentationFlags,
    pub(crate) missing_value: MissingValue,
    pub(crate) stream_specifier: Option<StreamSpecifier>,
    pub(crate) show_private_data: bool,
    pub(crate) find_stream_info: bool,
    pub(crate) format_options: Vec<(String, String)>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            presentation: PresentationFlags::default(),
            missing_value: MissingValue::default(),
            stream_specifier: None,
            show_private_data: true,
            find_stream_info: true,
            format_options: Vec::new(),
        }
    }

    /// Replace all presentation flags at once.
    #[must_use]
    pub fn with_presentation(mut self, flags: PresentationFlags) -> Self {
        self.presentation = flags;
        self
    }

    /// Append unit symbols (`s`, `Hz`, `byte`, `bit/s`) to values.
    #[must_use]
    pub fn with_show_unit(mut self, enabled: bool) -> Self {
        self.presentation.show_unit = enabled;
        self
    }

    /// Scale large values and print SI prefixes.
    #[must_use]
    pub fn with_prefix(mut self, enabled: bool) -> Self {
        self.presentation.use_prefix = enabled;
        self
    }

    /// Use binary prefixes (`Ki`, `Mi`, ...) for byte values.
    #[must_use]
    pub fn with_binary_byte_prefix(mut self, enabled: bool) -> Self {
        self.presentation.use_binary_byte_prefix = enabled;
        self
    }

    /// Render times as `H:MM:SS.ffffff`.
    #[must_use]
    pub fn with_sexagesimal(mut self, enabled: bool) -> Self {
        self.presentation.use_sexagesimal_time = enabled;
        self
    }

    /// Choose how absent values are written.
    #[must_use]
    pub fn with_missing_value(mut self, missing: MissingValue) -> Self {
        self.missing_value = missing;
        self
    }

    /// Only write streams matching `specifier`. Other streams still count
    /// towards `nb_streams`.
    #[must_use]
    pub fn with_stream_specifier(mut self, specifier: StreamSpecifier) -> Self {
        self.stream_specifier = Some(specifier);
        self
    }

    /// Include readable decoder private options in each stream object.
    /// Defaults to `true`.
    #[must_use]
    pub fn with_private_data(mut self, enabled: bool) -> Self {
        self.show_private_data = enabled;
        self
    }

    /// Read packets to fill in parameters the header does not carry.
    /// Defaults to `true`.
    #[must_use]
    pub fn with_find_stream_info(mut self, enabled: bool) -> Self {
        self.find_stream_info = enabled;
        self
    }

    /// Pass an option to the demuxer. Options the demuxer does not consume
    /// end the probe with [`ProbeError::OptionNotFound`](crate::ProbeError::OptionNotFound).
    #[must_use]
    pub fn with_format_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.format_options.push((key.into(), value.into()));
        self
    }

    /// Presentation flags in effect.
    pub fn presentation(&self) -> &PresentationFlags {
        &self.presentation
    }

    /// Missing-value representation in effect.
    pub fn missing_value(&self) -> MissingValue {
        self.missing_value
    }

    /// Stream specifier, if one was set.
    pub fn stream_specifier(&self) -> Option<&StreamSpecifier> {
        self.stream_specifier.as_ref()
    }

    /// Whether decoder private options are collected.
    pub fn show_private_data(&self) -> bool {
        self.show_private_data
    }

    /// Whether the stream-info pass runs.
    pub fn find_stream_info(&self) -> bool {
        self.find_stream_info
    }

    /// Demuxer options in insertion order.
    pub fn format_options(&self) -> &[(String, String)] {
        &self.format_options
    }
}
