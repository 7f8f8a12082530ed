//! Growable, NUL-terminated output buffer.
//!
//! [`JsonBuffer`] is the only allocation primitive used while a document is
//! being written. Its contents always end in a single NUL byte so the
//! finished document can be handed to C callers through
//! [`JsonBuffer::as_c_str`] without copying.
//!
//! Capacity is tracked explicitly and grows by doubling.

use std::{
    ffi::CStr,
    fmt::{Display, Formatter, Result as FmtResult, Write},
};

/// Capacity allocated by [`JsonBuffer::reset`] when the buffer is smaller.
pub const MIN_CAPACITY: usize = 2048;

/// An owned text buffer that doubles its capacity on overflow.
///
/// Invariants held after every operation:
///
/// - `capacity() >= len() + 1`
/// - the byte at offset `len()` is `0`
///
/// # Example
///
/// ```
/// use probejson::JsonBuffer;
///
/// let mut buffer = JsonBuffer::new();
/// buffer.append("{");
/// buffer.append("}");
/// assert_eq!(buffer.as_str(), "{}");
/// assert_eq!(buffer.as_bytes_with_nul(), b"{}\0");
/// ```
#[derive(Debug, Clone)]
pub struct JsonBuffer {
    /// Text followed by exactly one `'\0'`.
    data: String,
    /// Logical capacity; the backing `String` always reserves at least this.
    capacity: usize,
}

impl Default for JsonBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonBuffer {
    /// Create an empty buffer with [`MIN_CAPACITY`] reserved.
    pub fn new() -> Self {
        let mut buffer = Self {
            data: String::new(),
            capacity: 0,
        };
        buffer.reset();
        buffer
    }

    /// Truncate to length 0, making sure at least [`MIN_CAPACITY`] bytes
    /// are reserved. Existing capacity is kept.
    pub fn reset(&mut self) {
        self.data.clear();
        self.capacity = self.capacity.max(MIN_CAPACITY);
        self.data.reserve_exact(self.capacity);
        self.data.push('\0');
    }

    /// Append `text` to the end of the buffer.
    ///
    /// Empty input is a no-op. When `len() + text.len() + 1` exceeds the
    /// current capacity, the capacity is doubled until it fits and the
    /// contents are moved to the larger region.
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let required = self.len() + text.len() + 1;
        if required > self.capacity {
            let mut capacity = self.capacity;
            while capacity < required {
                capacity *= 2;
            }
            self.data.reserve_exact(capacity - self.data.len());
            self.capacity = capacity;
        }

        self.data.pop();
        self.data.push_str(text);
        self.data.push('\0');
    }

    /// Number of text bytes, not counting the terminating NUL.
    pub fn len(&self) -> usize {
        self.data.len() - 1
    }

    /// Returns `true` if no text has been appended since the last reset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical capacity in bytes, including room for the terminating NUL.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The last text byte, or `None` when the buffer is empty.
    pub fn last_byte(&self) -> Option<u8> {
        self.as_str().as_bytes().last().copied()
    }

    /// The buffered text without the terminating NUL.
    pub fn as_str(&self) -> &str {
        &self.data[..self.len()]
    }

    /// The buffered text including the terminating NUL.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Borrow the contents as a C string.
    ///
    /// Returns `None` if raw text containing a NUL byte was appended. Text
    /// written through [`JsonWriter`](crate::JsonWriter) is escaped and
    /// never contains one.
    pub fn as_c_str(&self) -> Option<&CStr> {
        CStr::from_bytes_with_nul(self.data.as_bytes()).ok()
    }

    /// Consume the buffer and return its text without the terminating NUL.
    pub fn into_string(mut self) -> String {
        self.data.pop();
        self.data
    }
}

impl Write for JsonBuffer {
    fn write_str(&mut self, text: &str) -> FmtResult {
        self.append(text);
        Ok(())
    }
}

impl Display for JsonBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
