use bitflags::bitflags;

bitflags! {
    /// Tags describing the content of one path segment.
    ///
    /// The empty set is a plain name such as `server`.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SegmentKind: u8 {
        /// Written in brackets, `[0]` or `[a.b]`.
        const INDEXED     = 1 << 0;
        /// Only ASCII digits.
        const NUMERIC     = 1 << 1;
        /// Contains a `-`.
        const DASHED      = 1 << 2;
        /// Contains a `_`.
        const UNDERSCORED = 1 << 3;
        /// An opening bracket that is never closed.
        const CORRUPTED   = 1 << 4;
    }
}

impl SegmentKind {
    /// Tags derived from the segment text alone.
    pub(crate) fn of_content(content: &str) -> Self {
        let mut kind = Self::empty();
        if !content.is_empty() && content.bytes().all(|b| b.is_ascii_digit()) {
            kind |= Self::NUMERIC;
        }
        if content.contains('-') {
            kind |= Self::DASHED;
        }
        if content.contains('_') {
            kind |= Self::UNDERSCORED;
        }
        kind
    }
}
