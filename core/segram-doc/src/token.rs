use crate::{Doc, Span};
use segram_protocol::{Pos, TokenData};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Cheap, copyable view of one token of a [`Doc`].
#[derive(Clone, Copy)]
pub struct Token<'d> {
    doc: &'d Doc,
    i: usize,
}

impl<'d> Token<'d> {
    pub(crate) fn new(doc: &'d Doc, i: usize) -> Self {
        Self { doc, i }
    }

    pub fn i(&self) -> usize {
        self.i
    }

    pub fn doc(&self) -> &'d Doc {
        self.doc
    }

    pub fn data(&self) -> &'d TokenData {
        self.doc.token_data(self.i)
    }

    pub fn text(&self) -> &'d str {
        &self.data().text
    }

    pub fn whitespace(&self) -> &'d str {
        &self.data().whitespace
    }

    pub fn text_with_ws(&self) -> String {
        format!("{}{}", self.text(), self.whitespace())
    }

    pub fn lemma(&self) -> &'d str {
        &self.data().lemma
    }

    pub fn pos(&self) -> Pos {
        self.data().pos
    }

    pub fn tag(&self) -> &'d str {
        &self.data().tag
    }

    pub fn dep(&self) -> &'d str {
        &self.data().dep
    }

    pub fn feature(&self, key: &str) -> Option<&'d str> {
        self.data().feature(key)
    }

    pub fn has_feature(&self, key: &str, value: &str) -> bool {
        self.data().has_feature(key, value)
    }

    pub fn head(&self) -> Token<'d> {
        Token::new(self.doc, self.data().head.index())
    }

    /// Roots head themselves.
    pub fn is_root(&self) -> bool {
        self.data().head.index() == self.i
    }

    pub fn children(&self) -> impl Iterator<Item = Token<'d>> + 'd {
        let doc = self.doc;
        doc.children_of(self.i).iter().map(move |&c| Token::new(doc, c))
    }

    pub fn lefts(&self) -> impl Iterator<Item = Token<'d>> + 'd {
        let i = self.i;
        self.children().filter(move |c| c.i < i)
    }

    pub fn rights(&self) -> impl Iterator<Item = Token<'d>> + 'd {
        let i = self.i;
        self.children().filter(move |c| c.i > i)
    }

    pub fn ancestors(&self) -> Ancestors<'d> {
        Ancestors { cur: *self }
    }

    /// Whether `self` dominates `other` in the dependency tree.
    pub fn is_ancestor(&self, other: Token<'_>) -> bool {
        other.ancestors().any(|a| a.i == self.i)
    }

    /// Other members of the coordination this token takes part in.
    ///
    /// The chain is entered at its first element (the token not attached
    /// as `conj`) and followed through right-hand `conj` children.
    pub fn conjuncts(&self) -> Vec<Token<'d>> {
        let mut start = *self;
        while !start.is_root() && start.dep() == "conj" {
            start = start.head();
        }
        let mut queue = vec![start];
        let mut k = 0;
        while let Some(&word) = queue.get(k) {
            k += 1;
            queue.extend(word.rights().filter(|c| c.dep() == "conj"));
        }
        queue.retain(|w| w.i != self.i);
        queue
    }

    pub fn corefs(&self) -> impl Iterator<Item = Token<'d>> + 'd {
        let doc = self.doc;
        self.data().corefs.iter().map(move |id| Token::new(doc, id.index()))
    }

    pub fn sent(&self) -> Span<'d> {
        let range = self.doc.sent_of(self.i);
        Span::new(self.doc, range.start, range.end)
    }
}

/// Walks up the head chain, excluding the starting token.
pub struct Ancestors<'d> {
    cur: Token<'d>,
}

impl<'d> Iterator for Ancestors<'d> {
    type Item = Token<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur.is_root() {
            return None;
        }
        self.cur = self.cur.head();
        Some(self.cur)
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.i == other.i
    }
}

impl Eq for Token<'_> {}

impl Hash for Token<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.i.hash(state);
    }
}

impl PartialOrd for Token<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.i.cmp(&other.i)
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.text(), self.i)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
