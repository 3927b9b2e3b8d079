use crate::{Doc, Token};
use std::fmt;

/// Contiguous token range `[start, end)` of a [`Doc`].
#[derive(Clone, Copy)]
pub struct Span<'d> {
    doc: &'d Doc,
    start: usize,
    end: usize,
}

impl<'d> Span<'d> {
    pub(crate) fn new(doc: &'d Doc, start: usize, end: usize) -> Self {
        Self { doc, start, end }
    }

    pub fn doc(&self) -> &'d Doc {
        self.doc
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, i: usize) -> bool {
        (self.start..self.end).contains(&i)
    }

    pub fn tokens(&self) -> impl Iterator<Item = Token<'d>> + 'd {
        let doc = self.doc;
        (self.start..self.end).map(move |i| doc.token(i))
    }

    /// Tokens whose head lies outside the span or who head themselves.
    pub fn roots(&self) -> Vec<Token<'d>> {
        self.tokens()
            .filter(|t| t.is_root() || !self.contains(t.head().i()))
            .collect()
    }

    pub fn text(&self) -> String {
        let text: String = self.tokens().map(|t| t.text_with_ws()).collect();
        text.trim_end().to_string()
    }
}

impl PartialEq for Span<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.start == other.start && self.end == other.end
    }
}

impl Eq for Span<'_> {}

impl fmt::Debug for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{}: {:?})", self.start, self.end, self.text())
    }
}
