use std::sync::Arc;

use crate::entries::Span;
use crate::{Entries, SegmentKind};

/// The separator used by [`PathParser::default`].
pub const DEFAULT_SEPARATOR: char = '.';

// -----------------------------------------------------------------------------
// PathParser

/// Splits path strings into [`Entries`].
///
/// Grammar: `segment (SEPARATOR segment)*`, where a segment is either a
/// bare name or a bracketed `[token]`. Brackets nest, so `[a[0]]` is a single
/// indexed segment with the content `a[0]`. The separator has no meaning
/// inside brackets.
///
/// Parsing never fails. An unclosed bracket marks the last segment
/// [`CORRUPTED`](SegmentKind::CORRUPTED).
///
/// # Examples
///
/// ```
/// use vc_path::{PathParser, SegmentKind};
///
/// let parser = PathParser::new('/');
/// let entries = parser.parse("a/b[c/d]");
///
/// assert_eq!(entries.len(), 3);
/// assert_eq!(entries.get(2), Some("c/d"));
/// assert_eq!(entries.kind(2), SegmentKind::INDEXED);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathParser {
    separator: char,
}

impl Default for PathParser {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl PathParser {
    #[inline]
    pub const fn new(separator: char) -> Self {
        Self { separator }
    }

    #[inline]
    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Parses `input` in a single left to right scan.
    pub fn parse(&self, input: &str) -> Entries {
        let mut spans: Vec<Span> = Vec::new();
        let mut start = 0;
        let mut depth = 0usize;
        let mut stray_close = false;
        // A separator right after `]` does not open an empty segment.
        let mut after_index = false;

        let close = |spans: &mut Vec<Span>, start: usize, end: usize, extra: SegmentKind| {
            let kind = SegmentKind::of_content(&input[start..end]) | extra;
            spans.push(Span { start, end, kind });
        };

        for (offset, c) in input.char_indices() {
            match c {
                '[' => {
                    if depth == 0 {
                        if offset > start {
                            let extra = corrupted_if(stray_close);
                            close(&mut spans, start, offset, extra);
                        }
                        stray_close = false;
                        start = offset + 1;
                    }
                    depth += 1;
                    after_index = false;
                }
                ']' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        close(&mut spans, start, offset, SegmentKind::INDEXED);
                        start = offset + 1;
                        after_index = true;
                    }
                }
                ']' => {
                    stray_close = true;
                    after_index = false;
                }
                c if c == self.separator && depth == 0 => {
                    if !(after_index && offset == start) {
                        let extra = corrupted_if(stray_close);
                        close(&mut spans, start, offset, extra);
                    }
                    stray_close = false;
                    start = offset + c.len_utf8();
                    after_index = false;
                }
                _ => after_index = false,
            }
        }

        if depth > 0 {
            let kind = SegmentKind::INDEXED | SegmentKind::CORRUPTED;
            close(&mut spans, start, input.len(), kind);
        } else if start < input.len() {
            let extra = corrupted_if(stray_close);
            close(&mut spans, start, input.len(), extra);
        }
        // Otherwise the input ended with a separator or `]`, nothing is
        // left to close.

        Entries::from_parts(Arc::from(input), spans, self.separator)
    }
}

#[inline]
fn corrupted_if(flag: bool) -> SegmentKind {
    if flag {
        SegmentKind::CORRUPTED
    } else {
        SegmentKind::empty()
    }
}

// -----------------------------------------------------------------------------
// Tests
