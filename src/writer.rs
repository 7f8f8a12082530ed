//! Incremental JSON emitter.
//!
//! [`JsonWriter`] appends key/value fragments straight into a
//! [`JsonBuffer`]; no document tree is ever built. Separators are decided
//! from an explicit stack of open objects and arrays, so the first entry
//! after `{` or `[` never carries a comma and every later entry carries
//! exactly one, including at empty container boundaries.
//!
//! # Example
//!
//! ```
//! use probejson::{JsonWriter, MissingValue, PresentationFlags};
//!
//! let mut writer = JsonWriter::new(PresentationFlags::default(), MissingValue::Null);
//! writer.begin_object(None);
//! writer.print_str("codec_name", "h264");
//! writer.print_int("index", 0);
//! writer.begin_array(Some("streams"));
//! writer.end_array();
//! writer.end_object();
//! assert_eq!(writer.finish().as_str(), r#"{"codec_name":"h264","index":0,"streams":[]}"#);
//! ```

use ffmpeg_next::Rational;

use crate::{
    buffer::JsonBuffer,
    conversion::pts_to_seconds,
    value::{PresentationFlags, Unit, UnitValue, format_value},
};

/// How a value that is absent or unknown is written.
///
/// The same representation is used by every emitter for the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MissingValue {
    /// JSON `null`. This is the default.
    #[default]
    Null,
    /// A bare `0`, as older consumers expect for sizes and bit rates.
    Zero,
    /// The string `"N/A"`.
    NotAvailable,
}

impl MissingValue {
    fn literal(self) -> &'static str {
        match self {
            MissingValue::Null => "null",
            MissingValue::Zero => "0",
            MissingValue::NotAvailable => "\"N/A\"",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    in_array: bool,
    fields_emitted: usize,
}

/// Streaming JSON writer over an owned [`JsonBuffer`].
///
/// Structural calls (`begin_*`/`end_*`) must be balanced by the caller;
/// [`finish`](JsonWriter::finish) closes anything left open so the returned
/// buffer always holds balanced JSON.
#[derive(Debug)]
pub struct JsonWriter {
    buffer: JsonBuffer,
    frames: Vec<Frame>,
    flags: PresentationFlags,
    missing: MissingValue,
}

impl JsonWriter {
    /// Create a writer over a fresh buffer.
    pub fn new(flags: PresentationFlags, missing: MissingValue) -> Self {
        Self::with_buffer(JsonBuffer::new(), flags, missing)
    }

    /// Create a writer that reuses `buffer`. The buffer is reset first.
    pub fn with_buffer(
        mut buffer: JsonBuffer,
        flags: PresentationFlags,
        missing: MissingValue,
    ) -> Self {
        buffer.reset();
        Self {
            buffer,
            frames: Vec::new(),
            flags,
            missing,
        }
    }

    /// The text written so far.
    pub fn buffer(&self) -> &JsonBuffer {
        &self.buffer
    }

    /// Close every open object and array and return the buffer.
    pub fn finish(mut self) -> JsonBuffer {
        while let Some(frame) = self.frames.pop() {
            self.buffer.append(if frame.in_array { "]" } else { "}" });
        }
        self.buffer
    }

    /// Open an object, keyed when inside another object.
    pub fn begin_object(&mut self, key: Option<&str>) {
        self.begin_entry(key);
        self.buffer.append("{");
        self.frames.push(Frame {
            in_array: false,
            fields_emitted: 0,
        });
    }

    /// Close the innermost object. Ignored when the innermost frame is not
    /// an object.
    pub fn end_object(&mut self) {
        self.end_frame(false);
    }

    /// Open an array, keyed when inside an object.
    pub fn begin_array(&mut self, key: Option<&str>) {
        self.begin_entry(key);
        self.buffer.append("[");
        self.frames.push(Frame {
            in_array: true,
            fields_emitted: 0,
        });
    }

    /// Close the innermost array. Ignored when the innermost frame is not
    /// an array.
    pub fn end_array(&mut self) {
        self.end_frame(true);
    }

    /// Write `"key":"value"`, escaping both.
    pub fn print_str(&mut self, key: &str, value: &str) {
        self.begin_entry(Some(key));
        self.write_quoted(value);
    }

    /// Write a bare signed integer.
    pub fn print_int(&mut self, key: &str, value: i64) {
        self.begin_entry(Some(key));
        self.buffer.append(&value.to_string());
    }

    /// Write a bare unsigned integer.
    pub fn print_uint(&mut self, key: &str, value: u64) {
        self.begin_entry(Some(key));
        self.buffer.append(&value.to_string());
    }

    /// Write an integer, or the missing representation for `None`.
    pub fn print_opt_int(&mut self, key: &str, value: Option<i64>) {
        match value {
            Some(value) => self.print_int(key, value),
            None => self.print_missing(key),
        }
    }

    /// Write `0` or `1`.
    pub fn print_flag(&mut self, key: &str, value: bool) {
        self.print_int(key, value as i64);
    }

    /// Write the configured missing representation.
    pub fn print_missing(&mut self, key: &str) {
        self.begin_entry(Some(key));
        self.buffer.append(self.missing.literal());
    }

    /// Write a timestamp given in `time_base` ticks as a quoted seconds
    /// string, formatted through [`format_value`].
    ///
    /// `None` (no timestamp) and a zero time base denominator write the
    /// missing representation.
    pub fn print_time(&mut self, key: &str, timestamp: Option<i64>, time_base: Rational) {
        match timestamp {
            Some(ticks) if time_base.denominator() != 0 => {
                let seconds = pts_to_seconds(ticks, time_base);
                let text = format_value(UnitValue::seconds(seconds), &self.flags);
                self.print_str(key, &text);
            }
            _ => self.print_missing(key),
        }
    }

    /// Write a rational as `"numerator<separator>denominator"`.
    pub fn print_q(&mut self, key: &str, value: Rational, separator: char) {
        let text = format!("{}{separator}{}", value.numerator(), value.denominator());
        self.print_str(key, &text);
    }

    /// Write an integer quantity through [`format_value`].
    ///
    /// Negative values write the missing representation. The result is bare
    /// when it is a plain number and quoted when it carries a unit or prefix.
    pub fn print_val(&mut self, key: &str, value: i64, unit: Unit) {
        if value < 0 {
            self.print_missing(key);
            return;
        }

        let text = format_value(UnitValue::integer(value, unit), &self.flags);
        if self.flags.renders_bare(unit) {
            self.begin_entry(Some(key));
            self.buffer.append(&text);
        } else {
            self.print_str(key, &text);
        }
    }

    fn begin_entry(&mut self, key: Option<&str>) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.fields_emitted > 0 {
                self.buffer.append(",");
            }
            frame.fields_emitted += 1;
        }
        if let Some(key) = key {
            self.write_quoted(key);
            self.buffer.append(":");
        }
    }

    fn end_frame(&mut self, in_array: bool) {
        match self.frames.last() {
            Some(frame) if frame.in_array == in_array => {
                self.frames.pop();
                self.buffer.append(if in_array { "]" } else { "}" });
            }
            _ => log::debug!(
                "Ignoring unbalanced close of {}",
                if in_array { "array" } else { "object" }
            ),
        }
    }

    fn write_quoted(&mut self, text: &str) {
        match serde_json::to_string(text) {
            Ok(quoted) => self.buffer.append(&quoted),
            Err(error) => {
                log::error!("Could not escape string: {error}");
                self.buffer.append("\"\"");
            }
        }
    }
}
