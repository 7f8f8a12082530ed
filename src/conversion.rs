//! Conversion helpers shared by the analyzer and the walker.
//!
//! Timestamp rescaling, aspect-ratio reduction, codec tag and timecode
//! rendering. The last three defer to libavutil so the text matches what
//! FFmpeg itself prints.

use std::ffi::{CStr, c_char, c_int};

use ffmpeg_next::Rational;
use ffmpeg_sys_next::{AV_FOURCC_MAX_STRING_SIZE, AV_TIMECODE_STR_SIZE};

/// Rescale a tick count from `time_base` to seconds.
pub fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Reduce `numerator / denominator` to lowest terms with `av_reduce`,
/// approximating when either part would exceed `max`.
///
/// `display_aspect_ratio` uses this with a bound of `1024 * 1024`.
pub fn reduce_ratio(numerator: i64, denominator: i64, max: i64) -> (i32, i32) {
    let (mut num, mut den): (c_int, c_int) = (0, 0);
    // SAFETY: both out-pointers refer to live locals.
    unsafe { ffmpeg_sys_next::av_reduce(&mut num, &mut den, numerator, denominator, max) };
    (num, den)
}

/// Display aspect ratio for a frame of `width` x `height` with the given
/// sample aspect ratio.
pub fn display_aspect_ratio(width: u32, height: u32, sample_aspect_ratio: Rational) -> Rational {
    let (num, den) = reduce_ratio(
        width as i64 * sample_aspect_ratio.numerator() as i64,
        height as i64 * sample_aspect_ratio.denominator() as i64,
        1024 * 1024,
    );
    Rational::new(num, den)
}

/// Render a little-endian FOURCC as text.
///
/// Printable characters are kept, everything else becomes `[N]` with the
/// byte's decimal value, so `0x31637661` renders as `avc1` and a zero tag
/// as `[0][0][0][0]`.
pub fn codec_tag_string(tag: u32) -> String {
    let mut text = [0 as c_char; AV_FOURCC_MAX_STRING_SIZE as usize];
    // SAFETY: `text` holds `AV_FOURCC_MAX_STRING_SIZE` bytes, the most the
    // call writes, and it always NUL-terminates.
    unsafe {
        ffmpeg_sys_next::av_fourcc_make_string(text.as_mut_ptr(), tag);
        CStr::from_ptr(text.as_ptr())
    }
    .to_string_lossy()
    .into_owned()
}

/// Render a 25-bit MPEG GOP timecode as `HH:MM:SS:FF`.
///
/// Bit 24 marks drop-frame timecodes, rendered with `;` before the frame
/// count.
pub fn mpeg_timecode_string(timecode: u32) -> String {
    let mut text = [0 as c_char; AV_TIMECODE_STR_SIZE as usize];
    // SAFETY: `text` holds `AV_TIMECODE_STR_SIZE` bytes as the call requires.
    unsafe {
        ffmpeg_sys_next::av_timecode_make_mpeg_tc_string(text.as_mut_ptr(), timecode);
        CStr::from_ptr(text.as_ptr())
    }
    .to_string_lossy()
    .into_owned()
}
