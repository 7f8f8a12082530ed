//! Numeric value formatting.
//!
//! [`format_value`] turns a number tagged with a [`Unit`] into display text
//! according to the [`PresentationFlags`] in effect: a plain number, a
//! unit-suffixed number, an SI or binary prefixed number, or an
//! `H:MM:SS.ffffff` duration.
//!
//! # Example
//!
//! ```
//! use probejson::{PresentationFlags, Unit, UnitValue, format_value};
//!
//! let flags = PresentationFlags::default()
//!     .with_prefix(true)
//!     .with_binary_byte_prefix(true)
//!     .with_show_unit(true);
//! assert_eq!(format_value(UnitValue::new(1_048_576.0, Unit::Byte), &flags), "1 Mibyte");
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Unit attached to a formatted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    /// Dimensionless.
    #[default]
    None,
    /// Seconds. Rendered with six fractional digits.
    Second,
    /// Hertz.
    Hertz,
    /// Bytes. The only unit that may use binary prefixes.
    Byte,
    /// Bits per second.
    BitPerSecond,
}

impl Unit {
    /// Suffix printed after the value when units are shown.
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Second => "s",
            Unit::Hertz => "Hz",
            Unit::Byte => "byte",
            Unit::BitPerSecond => "bit/s",
        }
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.symbol())
    }
}

/// A number paired with its unit. Formatting input only.
///
/// Values of every unit other than [`Unit::Second`] are integers; any
/// fractional part is truncated before formatting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitValue {
    /// The raw value.
    pub value: f64,
    /// Unit of `value`.
    pub unit: Unit,
}

impl UnitValue {
    /// Pair `value` with `unit`.
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// A duration in seconds.
    pub fn seconds(value: f64) -> Self {
        Self::new(value, Unit::Second)
    }

    /// An integer quantity.
    pub fn integer(value: i64, unit: Unit) -> Self {
        Self::new(value as f64, unit)
    }
}

/// Process-wide presentation defaults, read-only while a probe runs.
///
/// All flags default to `false`, which renders every value as a bare
/// number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentationFlags {
    /// Append the unit symbol to formatted values.
    pub show_unit: bool,
    /// Scale large values and print an SI prefix.
    pub use_prefix: bool,
    /// Use `Ki`/`Mi`/... (powers of 1024) for byte values.
    pub use_binary_byte_prefix: bool,
    /// Render seconds as `H:MM:SS.ffffff`.
    pub use_sexagesimal_time: bool,
}

impl PresentationFlags {
    /// Set [`show_unit`](Self::show_unit).
    #[must_use]
    pub fn with_show_unit(mut self, enabled: bool) -> Self {
        self.show_unit = enabled;
        self
    }

    /// Set [`use_prefix`](Self::use_prefix).
    #[must_use]
    pub fn with_prefix(mut self, enabled: bool) -> Self {
        self.use_prefix = enabled;
        self
    }

    /// Set [`use_binary_byte_prefix`](Self::use_binary_byte_prefix).
    #[must_use]
    pub fn with_binary_byte_prefix(mut self, enabled: bool) -> Self {
        self.use_binary_byte_prefix = enabled;
        self
    }

    /// Set [`use_sexagesimal_time`](Self::use_sexagesimal_time).
    #[must_use]
    pub fn with_sexagesimal_time(mut self, enabled: bool) -> Self {
        self.use_sexagesimal_time = enabled;
        self
    }

    /// Whether values of `unit` come out of [`format_value`] as a bare
    /// number that can be written to JSON unquoted.
    pub fn renders_bare(&self, unit: Unit) -> bool {
        if unit == Unit::Second && self.use_sexagesimal_time {
            return false;
        }
        !self.show_unit && !self.use_prefix
    }
}

struct Prefix {
    binary_scale: f64,
    decimal_scale: f64,
    binary: &'static str,
    decimal: &'static str,
}

const PREFIXES: [Prefix; 6] = [
    Prefix { binary_scale: 1.0, decimal_scale: 1.0, binary: "", decimal: "" },
    Prefix { binary_scale: 1.024e3, decimal_scale: 1e3, binary: "Ki", decimal: "K" },
    Prefix { binary_scale: 1.048576e6, decimal_scale: 1e6, binary: "Mi", decimal: "M" },
    Prefix { binary_scale: 1.073741824e9, decimal_scale: 1e9, binary: "Gi", decimal: "G" },
    Prefix { binary_scale: 1.099511627776e12, decimal_scale: 1e12, binary: "Ti", decimal: "T" },
    Prefix { binary_scale: 1.125899906842624e15, decimal_scale: 1e15, binary: "Pi", decimal: "P" },
];

fn prefix_index(magnitude: f64, group: i64) -> usize {
    ((magnitude as i64) / group).clamp(0, PREFIXES.len() as i64 - 1) as usize
}

/// Render `seconds` as `H:MM:SS.ffffff`.
///
/// Negative input is the caller's problem; the walker never passes one.
pub fn sexagesimal(seconds: f64) -> String {
    let total_minutes = seconds as i64 / 60;
    let seconds = seconds - (total_minutes * 60) as f64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    format!("{hours}:{minutes:02}:{seconds:09.6}")
}

/// Format `value` for display under `flags`.
///
/// Scale indices that fall outside the prefix table are clamped; there are
/// no error cases.
pub fn format_value(value: UnitValue, flags: &PresentationFlags) -> String {
    if value.unit == Unit::Second && flags.use_sexagesimal_time {
        return sexagesimal(value.value);
    }

    let show_float = value.unit == Unit::Second;
    let (mut float_value, mut integer_value) = if show_float {
        (value.value, value.value as i64)
    } else {
        let integer = value.value as i64;
        (integer as f64, integer)
    };

    let mut prefix = "";
    if flags.use_prefix && float_value > 1.0 {
        if value.unit == Unit::Byte && flags.use_binary_byte_prefix {
            let entry = &PREFIXES[prefix_index(float_value.log2(), 10)];
            float_value /= entry.binary_scale;
            prefix = entry.binary;
        } else {
            let entry = &PREFIXES[prefix_index(float_value.log10(), 3)];
            float_value /= entry.decimal_scale;
            prefix = entry.decimal;
        }
        integer_value = float_value as i64;
    }

    let mut text = if show_float || (flags.use_prefix && float_value.fract() != 0.0) {
        format!("{float_value:.6}")
    } else {
        integer_value.to_string()
    };

    if !prefix.is_empty() || flags.show_unit {
        text.push(' ');
        text.push_str(prefix);
        if flags.show_unit {
            text.push_str(value.unit.symbol());
        }
    }

    text
}
