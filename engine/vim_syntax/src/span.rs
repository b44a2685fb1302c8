//! Source location spans.
//!
//! Spans are byte offsets into the text of a single command line. Ex
//! command lines are short, so offsets that do not fit in `u32` saturate
//! instead of failing.

use std::fmt;

/// Byte range `start..end` (exclusive) within one command line.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Placeholder span for values built outside any source text.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create from a byte range, saturating offsets beyond `u32::MAX`.
    #[inline]
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        Span {
            start: u32::try_from(range.start).unwrap_or(u32::MAX),
            end: u32::try_from(range.end).unwrap_or(u32::MAX),
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Merge two spans into one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// True when `other` begins exactly where `self` ends (no whitespace between).
    #[inline]
    pub fn touches(self, other: Span) -> bool {
        self.end == other.start
    }

    /// Slice `source` by this span, clamping to the source bounds.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        let len = source.len();
        let start = (self.start as usize).min(len);
        let end = (self.end as usize).clamp(start, len);
        source.get(start..end).unwrap_or("")
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        let a = Span::new(2, 5);
        let b = Span::new(7, 9);
        assert_eq!(a.merge(b), Span::new(2, 9));
        assert_eq!(b.merge(a), Span::new(2, 9));
    }

    #[test]
    fn touches_requires_adjacency() {
        assert!(Span::new(0, 3).touches(Span::new(3, 4)));
        assert!(!Span::new(0, 3).touches(Span::new(4, 5)));
    }

    #[test]
    fn slice_clamps() {
        assert_eq!(Span::new(1, 3).slice("abcd"), "bc");
        assert_eq!(Span::new(2, 99).slice("abcd"), "cd");
        assert_eq!(Span::new(9, 99).slice("abcd"), "");
    }
}
