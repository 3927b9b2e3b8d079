pub mod conllu;
pub mod error;
pub mod span;
pub mod token;

pub use error::DocError;
pub use span::Span;
pub use token::{Ancestors, Token};

use rkyv::AlignedVec;
use segram_protocol::{DocData, SpanData, TokenData};
use std::ops::Range;
use tracing::debug;

/// A dependency-parsed document.
///
/// Tokens are immutable once loaded; the grammar layer only ever reads
/// them through [`Token`] and [`Span`] views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doc {
    tokens: Vec<TokenData>,
    children: Vec<Vec<usize>>,
    sents: Vec<Range<usize>>,
}

impl Doc {
    /// Builds a document and derives sentence spans as maximal runs of
    /// tokens that share a root.
    pub fn new(tokens: Vec<TokenData>) -> Result<Self, DocError> {
        let children = link_children(&tokens)?;
        let roots = find_roots(&tokens)?;

        let mut sents = Vec::new();
        let mut start = 0;
        for i in 1..=roots.len() {
            if i == roots.len() || roots[i] != roots[start] {
                sents.push(start..i);
                start = i;
            }
        }

        debug!(tokens = tokens.len(), sents = sents.len(), "loaded document");
        Ok(Self { tokens, children, sents })
    }

    /// Builds a document with sentence boundaries supplied by the parser.
    pub fn with_sents(tokens: Vec<TokenData>, mut sents: Vec<Range<usize>>) -> Result<Self, DocError> {
        let children = link_children(&tokens)?;
        find_roots(&tokens)?;

        let len = tokens.len();
        if let Some(bad) = sents.iter().find(|s| s.start > s.end || s.end > len) {
            return Err(DocError::SpanOutOfRange { start: bad.start, end: bad.end, len });
        }
        sents.sort_by_key(|s| (s.start, s.end));

        debug!(tokens = len, sents = sents.len(), "loaded document");
        Ok(Self { tokens, children, sents })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at document position `i`. Panics when out of range, like slice indexing.
    pub fn token(&self, i: usize) -> Token<'_> {
        assert!(i < self.tokens.len(), "token index {i} out of range");
        Token::new(self, i)
    }

    pub fn get(&self, i: usize) -> Option<Token<'_>> {
        (i < self.tokens.len()).then(|| Token::new(self, i))
    }

    pub fn tokens(&self) -> impl Iterator<Item = Token<'_>> + '_ {
        (0..self.tokens.len()).map(move |i| Token::new(self, i))
    }

    pub fn sents(&self) -> impl Iterator<Item = Span<'_>> + '_ {
        self.sents.iter().map(move |r| Span::new(self, r.start, r.end))
    }

    pub fn span(&self, start: usize, end: usize) -> Result<Span<'_>, DocError> {
        if start > end || end > self.tokens.len() {
            return Err(DocError::SpanOutOfRange { start, end, len: self.tokens.len() });
        }
        Ok(Span::new(self, start, end))
    }

    /// Surface text with original spacing.
    pub fn text(&self) -> String {
        self.tokens().map(|t| t.text_with_ws()).collect()
    }

    pub fn data(&self) -> &[TokenData] {
        &self.tokens
    }

    pub(crate) fn token_data(&self, i: usize) -> &TokenData {
        &self.tokens[i]
    }

    pub(crate) fn children_of(&self, i: usize) -> &[usize] {
        &self.children[i]
    }

    pub(crate) fn sent_of(&self, i: usize) -> Range<usize> {
        let pos = self.sents.partition_point(|s| s.end <= i);
        match self.sents.get(pos) {
            Some(s) if s.contains(&i) => s.clone(),
            _ => i..i + 1,
        }
    }

    pub fn to_data(&self) -> DocData {
        DocData {
            version: DocData::VERSION,
            tokens: self.tokens.clone(),
            sents: self
                .sents
                .iter()
                .map(|s| SpanData { start: s.start as u32, end: s.end as u32 })
                .collect(),
        }
    }

    pub fn from_data(data: DocData) -> Result<Self, DocError> {
        let sents = data.sents.iter().map(|s| s.start as usize..s.end as usize).collect();
        Self::with_sents(data.tokens, sents)
    }

    /// Validated rkyv snapshot of the document.
    pub fn to_bytes(&self) -> Result<AlignedVec, DocError> {
        rkyv::to_bytes::<_, 1024>(&self.to_data()).map_err(|e| DocError::Archive(format!("{e:?}")))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocError> {
        let data = rkyv::from_bytes::<DocData>(bytes).map_err(|e| DocError::Archive(format!("{e:?}")))?;
        Self::from_data(data)
    }
}

fn link_children(tokens: &[TokenData]) -> Result<Vec<Vec<usize>>, DocError> {
    let mut children = vec![Vec::new(); tokens.len()];
    for (i, tok) in tokens.iter().enumerate() {
        let head = tok.head.index();
        if head >= tokens.len() {
            return Err(DocError::HeadOutOfRange { token: i, head });
        }
        if head != i {
            children[head].push(i);
        }
    }
    Ok(children)
}

/// Root of every token's head chain. Heads must already be in range.
fn find_roots(tokens: &[TokenData]) -> Result<Vec<usize>, DocError> {
    let mut roots: Vec<usize> = Vec::with_capacity(tokens.len());
    for start in 0..tokens.len() {
        let mut cur = start;
        let mut steps = 0;
        loop {
            let head = tokens[cur].head.index();
            if head == cur {
                break;
            }
            if head < start {
                // already resolved
                cur = roots[head];
                break;
            }
            cur = head;
            steps += 1;
            if steps > tokens.len() {
                return Err(DocError::CyclicHeads { token: start });
            }
        }
        roots.push(cur);
    }
    Ok(roots)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use pretty_assertions::assert_eq;
    use segram_protocol::{Pos, TokenId};

    #[test]
    fn test_sentences_from_roots() {
        let doc = Doc::new(two_sentences()).unwrap();
        let spans: Vec<_> = doc.sents().map(|s| (s.start(), s.end())).collect();
        assert_eq!(spans, vec![(0, 7), (7, 11)]);
        assert_eq!(doc.token(9).sent().start(), 7);
    }

    #[test]
    fn test_children_and_heads() {
        let doc = Doc::new(two_sentences()).unwrap();
        let cooked = doc.token(1);
        let children: Vec<_> = cooked.children().map(|t| t.i()).collect();
        assert_eq!(children, vec![0, 2, 3, 6]);
        assert!(cooked.is_root());
        assert_eq!(doc.token(5).head().text(), "ate");
    }

    #[test]
    fn test_invalid_heads() {
        let mut tokens = two_sentences();
        tokens[0].head = TokenId::new(99);
        assert!(matches!(Doc::new(tokens), Err(DocError::HeadOutOfRange { token: 0, head: 99 })));

        let cycle = vec![tok("a", Pos::X, "dep", 1), tok("b", Pos::X, "dep", 0)];
        assert!(matches!(Doc::new(cycle), Err(DocError::CyclicHeads { .. })));
    }

    #[test]
    fn test_bytes_round_trip() {
        let doc = Doc::new(two_sentences()).unwrap();
        let bytes = doc.to_bytes().unwrap();
        let loaded = Doc::from_bytes(&bytes).unwrap();
        assert_eq!(doc, loaded);
    }

    #[test]
    fn test_text() {
        let doc = Doc::new(vec![tok("Hi", Pos::INTJ, "ROOT", 0)]).unwrap();
        assert_eq!(doc.text(), "Hi ");
        assert!(doc.span(0, 2).is_err());
    }
}
