//! Stream selection.
//!
//! A [`StreamSpecifier`] decides which streams appear in the `streams`
//! array. It follows the FFmpeg command line syntax for the forms that make
//! sense when only probing:
//!
//! | Form | Selects |
//! |------|---------|
//! | `2` | the stream with index 2 |
//! | `a` | every audio stream (`v`, `V`, `a`, `s`, `d`, `t`) |
//! | `a:1` | the second audio stream |
//! | `V` | video streams that are not attached pictures |
//! | `m:language` | streams with a `language` tag |
//! | `m:language:eng` | streams whose `language` tag is `eng` |
//! | `#0x101`, `i:257` | the stream with container id 257 |
//!
//! # Example
//!
//! ```
//! use probejson::StreamSpecifier;
//!
//! let specifier: StreamSpecifier = "a:0".parse()?;
//! assert_eq!(specifier.to_string(), "a:0");
//! # Ok::<(), probejson::ProbeError>(())
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::{
    disposition::ATTACHED_PIC,
    error::ProbeError,
    summary::{MediaKind, StreamSummary},
};

/// Media type selector used by [`StreamSpecifier::Kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindSelector {
    /// `v`: every video stream.
    Video,
    /// `V`: video streams that are not attached pictures.
    VideoWithoutPictures,
    /// `a`
    Audio,
    /// `s`
    Subtitle,
    /// `d`
    Data,
    /// `t`
    Attachment,
}

impl KindSelector {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'v' => Some(KindSelector::Video),
            'V' => Some(KindSelector::VideoWithoutPictures),
            'a' => Some(KindSelector::Audio),
            's' => Some(KindSelector::Subtitle),
            'd' => Some(KindSelector::Data),
            't' => Some(KindSelector::Attachment),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            KindSelector::Video => 'v',
            KindSelector::VideoWithoutPictures => 'V',
            KindSelector::Audio => 'a',
            KindSelector::Subtitle => 's',
            KindSelector::Data => 'd',
            KindSelector::Attachment => 't',
        }
    }

    fn matches(self, stream: &StreamSummary) -> bool {
        match self {
            KindSelector::Video => stream.kind == MediaKind::Video,
            KindSelector::VideoWithoutPictures => {
                stream.kind == MediaKind::Video && stream.disposition & ATTACHED_PIC == 0
            }
            KindSelector::Audio => stream.kind == MediaKind::Audio,
            KindSelector::Subtitle => stream.kind == MediaKind::Subtitle,
            KindSelector::Data => stream.kind == MediaKind::Data,
            KindSelector::Attachment => stream.kind == MediaKind::Attachment,
        }
    }
}

/// A parsed stream specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSpecifier {
    /// Stream at a container index.
    Index(usize),
    /// Streams of one media type, optionally only the `nth` of them.
    Kind {
        selector: KindSelector,
        nth: Option<usize>,
    },
    /// Streams carrying a tag, optionally with a given value.
    Tag { key: String, value: Option<String> },
    /// Stream with a container-specific id.
    Id(i32),
}

impl StreamSpecifier {
    /// Evaluate the specifier against every stream of a container.
    ///
    /// Returns one flag per stream, in the same order. Positional forms
    /// such as `a:1` need the whole list, which is why this does not work
    /// stream by stream.
    pub fn select(&self, streams: &[StreamSummary]) -> Vec<bool> {
        match self {
            StreamSpecifier::Index(index) => {
                streams.iter().map(|stream| stream.index == *index).collect()
            }
            StreamSpecifier::Kind { selector, nth } => {
                let mut seen = 0;
                streams
                    .iter()
                    .map(|stream| {
                        if !selector.matches(stream) {
                            return false;
                        }
                        let position = seen;
                        seen += 1;
                        nth.is_none_or(|wanted| wanted == position)
                    })
                    .collect()
            }
            StreamSpecifier::Tag { key, value } => streams
                .iter()
                .map(|stream| match (stream.tag(key), value) {
                    (Some(found), Some(wanted)) => found == wanted,
                    (Some(_), None) => true,
                    (None, _) => false,
                })
                .collect(),
            StreamSpecifier::Id(id) => streams.iter().map(|stream| stream.id == *id).collect(),
        }
    }
}

fn invalid(specifier: &str, reason: &str) -> ProbeError {
    ProbeError::InvalidStreamSpecifier {
        specifier: specifier.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_id(specifier: &str, text: &str) -> Result<i32, ProbeError> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => i32::from_str_radix(hex, 16),
        None => text.parse::<i32>(),
    };
    parsed.map_err(|_| invalid(specifier, "stream id is not a number"))
}

impl FromStr for StreamSpecifier {
    type Err = ProbeError;

    fn from_str(specifier: &str) -> Result<Self, Self::Err> {
        if specifier.is_empty() {
            return Err(invalid(specifier, "empty specifier"));
        }

        if specifier.bytes().all(|byte| byte.is_ascii_digit()) {
            return specifier
                .parse()
                .map(StreamSpecifier::Index)
                .map_err(|_| invalid(specifier, "stream index out of range"));
        }

        if let Some(id) = specifier
            .strip_prefix('#')
            .or_else(|| specifier.strip_prefix("i:"))
        {
            return parse_id(specifier, id).map(StreamSpecifier::Id);
        }

        if let Some(tag) = specifier.strip_prefix("m:") {
            let (key, value) = match tag.split_once(':') {
                Some((key, value)) => (key, Some(value.to_string())),
                None => (tag, None),
            };
            if key.is_empty() {
                return Err(invalid(specifier, "missing tag key"));
            }
            return Ok(StreamSpecifier::Tag {
                key: key.to_string(),
                value,
            });
        }

        let mut chars = specifier.chars();
        let selector = chars
            .next()
            .and_then(KindSelector::from_char)
            .ok_or_else(|| invalid(specifier, "unknown stream type"))?;
        let rest = chars.as_str();
        let nth = match rest.strip_prefix(':') {
            None if rest.is_empty() => None,
            Some(nth) => Some(
                nth.parse::<usize>()
                    .map_err(|_| invalid(specifier, "stream position is not a number"))?,
            ),
            None => return Err(invalid(specifier, "unexpected text after stream type")),
        };

        Ok(StreamSpecifier::Kind { selector, nth })
    }
}

impl Display for StreamSpecifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StreamSpecifier::Index(index) => write!(f, "{index}"),
            StreamSpecifier::Kind { selector, nth } => {
                write!(f, "{}", selector.as_char())?;
                if let Some(nth) = nth {
                    write!(f, ":{nth}")?;
                }
                Ok(())
            }
            StreamSpecifier::Tag { key, value } => {
                write!(f, "m:{key}")?;
                if let Some(value) = value {
                    write!(f, ":{value}")?;
                }
                Ok(())
            }
            StreamSpecifier::Id(id) => write!(f, "#{id}"),
        }
    }
}
