use core::fmt;

use crate::{Entries, PathParser, Segment, SegmentKind};

// -----------------------------------------------------------------------------
// Path

/// A location inside a source tree, as used while binding.
///
/// `Path` wraps [`Entries`] with the operations a binder needs to walk down
/// a target: append a property name, a list index or a map key.
///
/// # Examples
///
/// ```
/// use vc_path::Path;
///
/// let root = Path::parse("server");
/// let path = root.append_name("hosts").append_index(0).append_key("a.b");
///
/// assert_eq!(path.to_string(), "server.hosts[0][a.b]");
/// assert_eq!(path.len(), 4);
/// assert_eq!(path.parent(), Some(root.append_name("hosts").append_index(0)));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    entries: Entries,
}

impl Path {
    /// The empty path, addressing the whole source.
    #[inline]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses with the default separator.
    #[inline]
    pub fn parse(input: &str) -> Self {
        Self::parse_with(&PathParser::default(), input)
    }

    #[inline]
    pub fn parse_with(parser: &PathParser, input: &str) -> Self {
        Self {
            entries: parser.parse(input),
        }
    }

    #[inline]
    pub fn entries(&self) -> &Entries {
        &self.entries
    }

    #[inline]
    pub fn into_entries(self) -> Entries {
        self.entries
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn separator(&self) -> char {
        self.entries.separator()
    }

    /// Appends a property name.
    ///
    /// A name containing the separator is a nested path, `a.b` appends two
    /// segments.
    pub fn append_name(&self, name: &str) -> Self {
        let parser = PathParser::new(self.separator());
        Self {
            entries: self.entries.merge(&parser.parse(name)),
        }
    }

    /// Appends a list index, `[index]`.
    pub fn append_index(&self, index: usize) -> Self {
        let content = index.to_string();
        let kind = SegmentKind::INDEXED | SegmentKind::NUMERIC;
        Self {
            entries: self.entries.push(Segment::new(&content, kind)),
        }
    }

    /// Appends a map key as exactly one segment.
    ///
    /// Keys that would not survive reparsing as a single plain name (they
    /// contain the separator or brackets) are written in brackets.
    pub fn append_key(&self, key: &str) -> Self {
        let separator = self.separator();
        let bracketed = key.is_empty() || key.contains(|c| c == separator || c == '[' || c == ']');
        let mut kind = SegmentKind::of_content(key);
        if bracketed {
            kind |= SegmentKind::INDEXED;
        }
        Self {
            entries: self.entries.push(Segment::new(key, kind)),
        }
    }

    /// Appends every segment of `other`.
    #[inline]
    pub fn join(&self, other: &Path) -> Self {
        Self {
            entries: self.entries.merge(&other.entries),
        }
    }

    /// The path without its last segment, `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let len = self.entries.len();
        (len > 0).then(|| Self {
            entries: self.entries.limit(len - 1),
        })
    }

    #[inline]
    pub fn last(&self) -> Option<Segment<'_>> {
        self.entries.last()
    }
}

impl From<Entries> for Path {
    #[inline]
    fn from(entries: Entries) -> Self {
        Self { entries }
    }
}

impl From<&str> for Path {
    #[inline]
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

impl fmt::Display for Path {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.entries, f)
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({:?})", self.entries.to_original())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{Path, PathParser, SegmentKind};

    #[test]
    fn keys_are_single_segments() {
        let path = Path::root().append_name("map").append_key("a.b");
        assert_eq!(path.len(), 2);
        assert_eq!(path.entries().get(1), Some("a.b"));

        let reparsed = Path::parse(&path.to_string());
        assert_eq!(reparsed, path);

        let plain = Path::root().append_key("port");
        assert_eq!(plain.to_string(), "port");
        assert_eq!(plain.entries().kind(0), SegmentKind::empty());
    }

    #[test]
    fn names_nest() {
        let path = Path::parse("a").append_name("b.c");
        assert_eq!(path.len(), 3);
        assert_eq!(path.to_string(), "a.b.c");
        assert_eq!(Path::root().append_name("").len(), 0);
    }

    #[test]
    fn custom_separator() {
        let parser = PathParser::new('/');
        let path = Path::parse_with(&parser, "a/b").append_key("x.y").append_key("p/q");
        assert_eq!(path.to_string(), "a/b/x.y[p/q]");
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn parents() {
        let path = Path::parse("a[0].b");
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "a[0]");
        assert_eq!(parent.last().and_then(|s| s.index()), Some(0));
        assert!(Path::root().parent().is_none());
        assert!(Path::root().is_root());
    }
}
