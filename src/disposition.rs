//! Stream disposition flags.
//!
//! The emitted `disposition` object is driven by [`DISPOSITION_FLAGS`], a
//! fixed, ordered table of flag names and the bits they test. The bit
//! values follow libavformat's `AV_DISPOSITION_*` layout, which is what
//! [`FfmpegAnalyzer`](crate::FfmpegAnalyzer) stores in
//! [`StreamSummary::disposition`](crate::StreamSummary::disposition).
//! Another analyzer only needs to produce a bitset in the same layout.

/// One named disposition flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispositionFlag {
    /// Key written into the `disposition` object.
    pub name: &'static str,
    /// Bit tested in the stream's disposition bitset.
    pub mask: i32,
}

impl DispositionFlag {
    /// Whether this flag is set in `bits`.
    pub fn is_set(&self, bits: i32) -> bool {
        bits & self.mask != 0
    }
}

const fn flag(name: &'static str, mask: i32) -> DispositionFlag {
    DispositionFlag { name, mask }
}

/// Every flag written for a stream, in output order.
pub const DISPOSITION_FLAGS: [DispositionFlag; 14] = [
    flag("default", 0x0001),
    flag("dub", 0x0002),
    flag("original", 0x0004),
    flag("comment", 0x0008),
    flag("lyrics", 0x0010),
    flag("karaoke", 0x0020),
    flag("forced", 0x0040),
    flag("hearing_impaired", 0x0080),
    flag("visual_impaired", 0x0100),
    flag("clean_effects", 0x0200),
    flag("attached_pic", 0x0400),
    flag("timed_thumbnails", 0x0800),
    flag("captions", 0x10000),
    flag("descriptions", 0x20000),
];

/// Bit for [`DISPOSITION_FLAGS`]'s `attached_pic` entry.
pub const ATTACHED_PIC: i32 = 0x0400;

/// Evaluate every flag of the table against `bits`, in output order.
pub fn evaluate(bits: i32) -> impl Iterator<Item = (&'static str, bool)> {
    DISPOSITION_FLAGS
        .iter()
        .map(move |flag| (flag.name, flag.is_set(bits)))
}
