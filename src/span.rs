//! Character intervals over document text.

use serde::{Deserialize, Serialize};

/// A `[start, end)` interval of byte offsets into a document's text.
///
/// Zero-length spans are allowed. Offsets are expected to fall on UTF-8
/// character boundaries; the owning [`Document`](crate::Document) checks this
/// when an annotation is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`. Use [`Span::try_new`] for untrusted offsets.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "span start {} is after end {}", start, end);
        Self { start, end }
    }

    /// Create a span, returning `None` if `start > end`.
    pub fn try_new(start: usize, end: usize) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Strict interval intersection: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Returns true if `other` lies entirely within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_length() {
        assert_eq!(Span::new(3, 10).len(), 7);
        assert!(Span::new(4, 4).is_empty());
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = Span::new(0, 5);
        let b = Span::new(5, 9);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));

        let c = Span::new(4, 6);
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn test_overlap_symmetry() {
        let spans: Vec<Span> = (0..6)
            .flat_map(|start| (start..7).map(move |end| Span::new(start, end)))
            .collect();

        for a in &spans {
            for b in &spans {
                assert_eq!(a.overlaps(b), b.overlaps(a), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_zero_length_span_never_overlaps() {
        let empty = Span::new(3, 3);
        assert!(!empty.overlaps(&Span::new(0, 10)));
        assert!(!Span::new(0, 10).overlaps(&empty));
        assert!(Span::new(0, 10).contains(&empty));
    }

    #[test]
    fn test_try_new_rejects_inverted() {
        assert_eq!(Span::try_new(5, 2), None);
        assert_eq!(Span::try_new(2, 5), Some(Span::new(2, 5)));
    }

    #[test]
    #[should_panic]
    fn test_new_panics_on_inverted() {
        Span::new(5, 2);
    }
}
