use crate::config::Grammar;
use crate::error::GrammarError;
use crate::registry::Registry;
use crate::sent::Sent;
use segram_doc::Doc;
use tracing::debug;

/// A parsed document with its assembled sentences, keyed by span bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarDoc {
    pub(crate) doc: Doc,
    pub(crate) smap: Registry<Sent>,
}

impl GrammarDoc {
    /// Assembles every sentence of `doc`.
    pub fn from_doc(doc: Doc, grammar: &Grammar) -> Result<Self, GrammarError> {
        let mut smap = Registry::new();
        for span in doc.sents() {
            smap.insert(Sent::from_span(grammar, span)?);
        }
        debug!(tokens = doc.len(), sents = smap.len(), "assembled document");
        Ok(Self { doc, smap })
    }

    pub fn doc(&self) -> &Doc {
        &self.doc
    }

    pub fn sents(&self) -> impl Iterator<Item = &Sent> + '_ {
        self.smap.values()
    }

    pub fn sent(&self, start: usize, end: usize) -> Option<&Sent> {
        self.smap.get(&(start, end))
    }

    /// Sentence containing token `i`.
    pub fn sent_of(&self, i: usize) -> Option<&Sent> {
        self.sents().find(|s| (s.start()..s.end()).contains(&i))
    }

    /// Assembles `start..end` again and stores it, replacing any sentence
    /// with the same bounds in place.
    pub fn reassemble(&mut self, grammar: &Grammar, start: usize, end: usize) -> Result<&Sent, GrammarError> {
        let sent = Sent::from_span(grammar, self.doc.span(start, end)?)?;
        Ok(&*self.smap.insert(sent))
    }

    pub fn text(&self) -> String {
        self.doc.text()
    }
}
