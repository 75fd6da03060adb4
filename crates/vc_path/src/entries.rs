use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Range;
use std::sync::Arc;

use crate::{DEFAULT_SEPARATOR, SegmentKind};

// -----------------------------------------------------------------------------
// Segment

/// Byte range of a segment's content inside the source string.
///
/// For indexed segments the range excludes the brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: SegmentKind,
}

/// One segment of an [`Entries`], borrowed from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment<'a> {
    content: &'a str,
    kind: SegmentKind,
}

impl<'a> Segment<'a> {
    #[inline]
    pub fn new(content: &'a str, kind: SegmentKind) -> Self {
        Self { content, kind }
    }

    /// The segment text, without brackets.
    #[inline]
    pub fn content(&self) -> &'a str {
        self.content
    }

    #[inline]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.kind.contains(SegmentKind::INDEXED)
    }

    /// The segment as a list index, if it is numeric.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        if self.kind.contains(SegmentKind::NUMERIC) {
            self.content.parse().ok()
        } else {
            None
        }
    }
}

// -----------------------------------------------------------------------------
// Entries

/// A parsed path: an immutable sequence of segments.
///
/// Segments are byte ranges into one shared source string, so slicing an
/// `Entries` only narrows a window and never copies text. Two `Entries` are
/// equal when their segments have the same content and kinds, wherever
/// they were sliced from.
///
/// # Examples
///
/// ```
/// use vc_path::{PathParser, SegmentKind};
///
/// let entries = PathParser::default().parse("server.hosts[0].max-size");
///
/// assert_eq!(entries.len(), 4);
/// assert_eq!(entries.get(1), Some("hosts"));
/// assert_eq!(entries.index(2), Some(0));
/// assert!(entries.kind(3).contains(SegmentKind::DASHED));
///
/// let tail = entries.skip(1);
/// assert_eq!(tail.to_original(), "hosts[0].max-size");
/// ```
#[derive(Clone)]
pub struct Entries {
    source: Arc<str>,
    spans: Arc<[Span]>,
    window: Range<usize>,
    separator: char,
}

impl Default for Entries {
    #[inline]
    fn default() -> Self {
        Self::empty(DEFAULT_SEPARATOR)
    }
}

impl Entries {
    /// An empty path using `separator`.
    pub fn empty(separator: char) -> Self {
        Self {
            source: Arc::from(""),
            spans: Arc::new([]),
            window: 0..0,
            separator,
        }
    }

    pub(crate) fn from_parts(source: Arc<str>, spans: Vec<Span>, separator: char) -> Self {
        let len = spans.len();
        Self {
            source,
            spans: spans.into(),
            window: 0..len,
            separator,
        }
    }

    /// Builds an `Entries` from segments, laid out in canonical form.
    pub fn from_segments<'a>(
        separator: char,
        segments: impl IntoIterator<Item = Segment<'a>>,
    ) -> Self {
        let mut source = String::new();
        let mut spans = Vec::new();
        for segment in segments {
            let range = write_segment(&mut source, separator, spans.is_empty(), segment);
            spans.push(Span {
                start: range.start,
                end: range.end,
                kind: segment.kind,
            });
        }
        Self::from_parts(Arc::from(source), spans, separator)
    }

    #[inline]
    fn spans(&self) -> &[Span] {
        &self.spans[self.window.clone()]
    }

    #[inline]
    pub fn separator(&self) -> char {
        self.separator
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// The segment at `index`.
    pub fn segment(&self, index: usize) -> Option<Segment<'_>> {
        self.spans().get(index).map(|span| Segment {
            content: &self.source[span.start..span.end],
            kind: span.kind,
        })
    }

    /// The content of the segment at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.segment(index).map(|s| s.content)
    }

    /// The kind of the segment at `index`, empty when out of range.
    #[inline]
    pub fn kind(&self, index: usize) -> SegmentKind {
        self.spans().get(index).map_or(SegmentKind::empty(), |s| s.kind)
    }

    #[inline]
    pub fn is_indexed(&self, index: usize) -> bool {
        self.kind(index).contains(SegmentKind::INDEXED)
    }

    #[inline]
    pub fn is_numeric(&self, index: usize) -> bool {
        self.kind(index).contains(SegmentKind::NUMERIC)
    }

    #[inline]
    pub fn is_dashed(&self, index: usize) -> bool {
        self.kind(index).contains(SegmentKind::DASHED)
    }

    #[inline]
    pub fn is_underscored(&self, index: usize) -> bool {
        self.kind(index).contains(SegmentKind::UNDERSCORED)
    }

    #[inline]
    pub fn is_corrupted(&self, index: usize) -> bool {
        self.kind(index).contains(SegmentKind::CORRUPTED)
    }

    /// The segment at `index` as a list index, if it is numeric.
    #[inline]
    pub fn index(&self, index: usize) -> Option<usize> {
        self.segment(index).and_then(|s| s.index())
    }

    #[inline]
    pub fn first(&self) -> Option<Segment<'_>> {
        self.segment(0)
    }

    #[inline]
    pub fn last(&self) -> Option<Segment<'_>> {
        self.len().checked_sub(1).and_then(|i| self.segment(i))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Segment<'_>> + '_ {
        self.spans().iter().map(|span| Segment {
            content: &self.source[span.start..span.end],
            kind: span.kind,
        })
    }

    // -------------------------------------------------------------------------
    // Windows

    /// At most `limit` segments starting at `offset`, over the same source.
    ///
    /// Out of range arguments are clamped.
    pub fn slice(&self, offset: usize, limit: usize) -> Self {
        let start = self.window.start + offset.min(self.len());
        let end = start + limit.min(self.window.end - start);
        Self {
            source: self.source.clone(),
            spans: self.spans.clone(),
            window: start..end,
            separator: self.separator,
        }
    }

    /// Drops the first `count` segments.
    #[inline]
    pub fn skip(&self, count: usize) -> Self {
        self.slice(count, usize::MAX)
    }

    /// Keeps the first `count` segments.
    #[inline]
    pub fn limit(&self, count: usize) -> Self {
        self.slice(0, count)
    }

    /// Concatenates two paths into a new source string.
    ///
    /// A separator is placed between them unless one side is empty or
    /// `other` starts with an indexed segment, so `a` merged with `[0]`
    /// gives `a[0]`.
    pub fn merge(&self, other: &Entries) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return Self::from_segments(self.separator, other.iter());
        }
        Self::from_segments(self.separator, self.iter().chain(other.iter()))
    }

    /// Appends one segment.
    #[inline]
    pub fn push(&self, segment: Segment<'_>) -> Self {
        Self::from_segments(self.separator, self.iter().chain([segment]))
    }

    /// Writes the segments back as a path string.
    pub fn to_original(&self) -> String {
        let mut out = String::new();
        for (index, segment) in self.iter().enumerate() {
            write_segment(&mut out, self.separator, index == 0, segment);
        }
        out
    }
}

/// Appends `segment` to `out` and returns the range of its content.
fn write_segment(
    out: &mut String,
    separator: char,
    first: bool,
    segment: Segment<'_>,
) -> Range<usize> {
    if segment.is_indexed() {
        out.push('[');
        let start = out.len();
        out.push_str(segment.content);
        let end = out.len();
        if !segment.kind.contains(SegmentKind::CORRUPTED) {
            out.push(']');
        }
        start..end
    } else {
        if !first {
            out.push(separator);
        }
        let start = out.len();
        out.push_str(segment.content);
        start..out.len()
    }
}

impl PartialEq for Entries {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Entries {}

impl Hash for Entries {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for segment in self.iter() {
            segment.hash(state);
        }
    }
}

impl fmt::Display for Entries {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_original())
    }
}

impl fmt::Debug for Entries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|s| (s.content, s.kind)))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{Entries, PathParser, Segment, SegmentKind};

    fn parse(input: &str) -> Entries {
        PathParser::default().parse(input)
    }

    #[test]
    fn slice_inverse() {
        let entries = parse("a.b[0].c-d[x.y].e");
        for k in 0..=entries.len() + 1 {
            let head = entries.slice(0, k);
            let tail = entries.skip(k);
            assert_eq!(head.len() + tail.len(), entries.len());
            let rebuilt: Vec<_> = head.iter().chain(tail.iter()).collect();
            let original: Vec<_> = entries.iter().collect();
            assert_eq!(rebuilt, original);
        }
    }

    #[test]
    fn slices_share_source() {
        let entries = parse("a.b.c.d");
        let middle = entries.slice(1, 2);
        assert_eq!(middle.len(), 2);
        assert_eq!(middle.get(0), Some("b"));
        assert_eq!(middle.get(2), None);
        assert_eq!(middle, parse("b.c"));
        assert_eq!(middle.to_original(), "b.c");
        assert_eq!(entries.slice(10, 3).len(), 0);
    }

    #[test]
    fn merge_join_points() {
        assert_eq!(parse("a").merge(&parse("[0]")).to_original(), "a[0]");
        assert_eq!(parse("a").merge(&parse("b.c")).to_original(), "a.b.c");
        assert_eq!(parse("").merge(&parse("b")).to_original(), "b");
        assert_eq!(parse("a[1]").merge(&parse("")).to_original(), "a[1]");

        let merged = parse("a.b").skip(1).merge(&parse("[k.x]"));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(1), Some("k.x"));
        assert_eq!(merged.to_original(), "b[k.x]");
    }

    #[test]
    fn merge_is_associative() {
        let (p1, p2, p3) = (parse("a.b"), parse("[0].c"), parse("d[e.f]"));
        let left = p1.merge(&p2).merge(&p3);
        let right = p1.merge(&p2.merge(&p3));
        assert_eq!(left, right);
        assert_eq!(left.len(), 6);
    }

    #[test]
    fn segment_accessors() {
        let entries = parse("list[12].my_name");
        assert_eq!(entries.index(1), Some(12));
        assert_eq!(entries.index(0), None);
        assert!(entries.is_indexed(1));
        assert!(entries.is_numeric(1));
        assert!(entries.is_underscored(2));
        assert_eq!(entries.kind(99), SegmentKind::empty());
        assert_eq!(entries.last().map(|s| s.content()), Some("my_name"));

        let index = Segment::new("3", SegmentKind::INDEXED | SegmentKind::NUMERIC);
        let pushed = entries.limit(1).push(index);
        assert_eq!(pushed.to_original(), "list[3]");
    }
}
