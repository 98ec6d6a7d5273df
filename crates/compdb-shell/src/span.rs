use miette::SourceSpan;

/// A byte range within a parsed shell line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The text this span covers in `source`.
    ///
    /// Returns an empty string when the span does not fall on valid
    /// boundaries of `source`.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_and_len() {
        let a = Span::new(4, 8);
        let b = Span::new(2, 5);
        let merged = a.merge(b);
        assert_eq!(merged, Span::new(2, 8));
        assert_eq!(merged.len(), 6);
        assert!(!merged.is_empty());
        assert!(Span::new(3, 3).is_empty());
    }

    #[test]
    fn test_slice() {
        let line = "gcc -c hello.c";
        assert_eq!(Span::new(7, 14).slice(line), "hello.c");
        assert_eq!(Span::new(7, 40).slice(line), "");
    }
}
