//! Phrases: graph nodes wrapping one component each, and the read-only
//! views used to query a finished sentence.

use crate::components::{Component, ComponentKind};
use crate::conjuncts::Conjuncts;
use crate::error::{ConfigError, GrammarError};
use crate::registry::Canonical;
use crate::sent::Sent;
use segram_doc::Doc;
use segram_protocol::Dep;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhraseKind {
    Verb,
    Noun,
    Desc,
    Prep,
}

impl PhraseKind {
    pub fn alias(self) -> &'static str {
        match self {
            PhraseKind::Verb => "VP",
            PhraseKind::Noun => "NP",
            PhraseKind::Desc => "DP",
            PhraseKind::Prep => "PP",
        }
    }
}

impl fmt::Display for PhraseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

/// Decides whether a phrase type may wrap a component.
pub type Governs = fn(&Component) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct PhraseType {
    pub kind: PhraseKind,
    pub governs: Governs,
}

fn governs_verb(comp: &Component) -> bool {
    comp.kind == ComponentKind::Verb
}

fn governs_noun(comp: &Component) -> bool {
    comp.kind == ComponentKind::Noun
}

fn governs_desc(comp: &Component) -> bool {
    comp.kind == ComponentKind::Desc
}

fn governs_prep(comp: &Component) -> bool {
    comp.kind == ComponentKind::Prep
}

/// Phrase types in the order they are tried.
#[derive(Debug, Clone)]
pub struct PhraseTypes {
    types: Vec<PhraseType>,
}

impl Default for PhraseTypes {
    fn default() -> Self {
        Self {
            types: vec![
                PhraseType { kind: PhraseKind::Verb, governs: governs_verb },
                PhraseType { kind: PhraseKind::Noun, governs: governs_noun },
                PhraseType { kind: PhraseKind::Desc, governs: governs_desc },
                PhraseType { kind: PhraseKind::Prep, governs: governs_prep },
            ],
        }
    }
}

impl PhraseTypes {
    pub fn empty() -> Self {
        Self { types: Vec::new() }
    }

    pub fn register(&mut self, typ: PhraseType) -> Result<(), ConfigError> {
        if self.types.iter().any(|t| t.kind == typ.kind) {
            return Err(ConfigError::DuplicateAlias(typ.kind.alias()));
        }
        self.types.push(typ);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhraseType> + '_ {
        self.types.iter()
    }

    pub fn from_alias(&self, alias: &str) -> Option<PhraseKind> {
        self.types.iter().map(|t| t.kind).find(|k| k.alias() == alias)
    }

    /// Wraps `comp` in the first phrase type that governs it.
    pub fn phrase_for(&self, comp: &Component) -> Result<Phrase, GrammarError> {
        self.types
            .iter()
            .find(|t| (t.governs)(comp))
            .map(|t| Phrase::new(t.kind, comp.tok))
            .ok_or(GrammarError::NoPhraseType {
                kind: comp.kind.alias(),
                idx: comp.tok,
            })
    }
}

/// Graph node of one component, keyed by the component's head index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub kind: PhraseKind,
    pub idx: usize,
    /// Relation to the parent phrase(s).
    pub dep: Dep,
    pub sconj: Option<usize>,
    /// Head index of the coordination lead, when the phrase is a conjunct.
    pub lead: Option<usize>,
}

impl Phrase {
    pub fn new(kind: PhraseKind, idx: usize) -> Self {
        Self { kind, idx, dep: Dep::MISC, sconj: None, lead: None }
    }
}

impl Canonical for Phrase {
    type Key = usize;

    fn key(&self) -> usize {
        self.idx
    }
}

/// Borrowed view of a phrase inside its sentence.
#[derive(Clone, Copy)]
pub struct PhraseRef<'s> {
    sent: &'s Sent,
    phrase: &'s Phrase,
    head: &'s Component,
}

impl<'s> PhraseRef<'s> {
    pub(crate) fn new(sent: &'s Sent, phrase: &'s Phrase, head: &'s Component) -> Self {
        Self { sent, phrase, head }
    }

    pub fn idx(&self) -> usize {
        self.phrase.idx
    }

    pub fn kind(&self) -> PhraseKind {
        self.phrase.kind
    }

    pub fn dep(&self) -> Dep {
        self.phrase.dep
    }

    pub fn sconj(&self) -> Option<usize> {
        self.phrase.sconj
    }

    pub fn phrase(&self) -> &'s Phrase {
        self.phrase
    }

    /// The component this phrase wraps.
    pub fn head(&self) -> &'s Component {
        self.head
    }

    pub fn sent(&self) -> &'s Sent {
        self.sent
    }

    fn resolve(&self, idx: &[usize]) -> Vec<PhraseRef<'s>> {
        idx.iter().filter_map(|&i| self.sent.phrase(i)).collect()
    }

    pub fn lead(&self) -> PhraseRef<'s> {
        self.phrase
            .lead
            .and_then(|lead| self.sent.phrase(lead))
            .unwrap_or(*self)
    }

    pub fn is_lead(&self) -> bool {
        self.lead().idx() == self.idx()
    }

    /// Coordination record the phrase belongs to, if any.
    pub fn coordination(&self) -> Option<&'s Conjuncts> {
        self.sent.conjs().get(&self.lead().idx())
    }

    /// The phrase and its conjuncts, or just the phrase.
    pub fn group(&self) -> Vec<PhraseRef<'s>> {
        match self.coordination() {
            Some(conjs) => self.resolve(&conjs.members),
            None => vec![*self],
        }
    }

    pub fn conjuncts(&self) -> Vec<PhraseRef<'s>> {
        match self.coordination() {
            Some(conjs) => self.resolve(&conjs.members).into_iter().filter(|p| p != self).collect(),
            None => Vec::new(),
        }
    }

    pub fn children(&self) -> Vec<PhraseRef<'s>> {
        self.resolve(self.sent.graph().children(&self.idx()))
    }

    pub fn parents(&self) -> Vec<PhraseRef<'s>> {
        self.resolve(self.sent.graph().parents(&self.idx()))
    }

    /// Shortest distance from a source of the phrase graph.
    pub fn depth(&self) -> usize {
        self.sent.depth(self.idx())
    }

    /// Descendants in depth-first order, each reported once.
    pub fn subdag(&self) -> Vec<PhraseRef<'s>> {
        self.walk(|p| p.children())
    }

    /// Ancestors in depth-first order, each reported once.
    pub fn supdag(&self) -> Vec<PhraseRef<'s>> {
        self.walk(|p| p.parents())
    }

    fn walk(&self, next: impl Fn(&PhraseRef<'s>) -> Vec<PhraseRef<'s>>) -> Vec<PhraseRef<'s>> {
        let mut seen = BTreeSet::from([self.idx()]);
        let mut found = Vec::new();
        let mut stack: Vec<PhraseRef<'s>> = next(self).into_iter().rev().collect();
        while let Some(phrase) = stack.pop() {
            if !seen.insert(phrase.idx()) {
                continue;
            }
            stack.extend(next(&phrase).into_iter().rev());
            found.push(phrase);
        }
        found
    }

    fn controlled(&self, mask: Dep) -> Vec<PhraseRef<'s>> {
        self.children().into_iter().filter(|c| c.dep().intersects(mask)).collect()
    }

    /// The phrase itself when it is verbal.
    pub fn verb(&self) -> Vec<PhraseRef<'s>> {
        if self.kind() == PhraseKind::Verb {
            vec![*self]
        } else {
            Vec::new()
        }
    }

    /// Subjects, including the ones hidden behind a passive agent.
    pub fn subj(&self) -> Vec<PhraseRef<'s>> {
        let mut subjects = Vec::new();
        for child in self.children() {
            if child.dep().contains(Dep::SUBJ) {
                subjects.push(child);
            } else if child.dep().contains(Dep::AGENT) {
                subjects.extend(child.subj());
            }
        }
        subjects
    }

    pub fn dobj(&self) -> Vec<PhraseRef<'s>> {
        self.controlled(Dep::DOBJ)
    }

    pub fn iobj(&self) -> Vec<PhraseRef<'s>> {
        self.controlled(Dep::IOBJ)
    }

    pub fn desc(&self) -> Vec<PhraseRef<'s>> {
        self.controlled(Dep::DESC | Dep::MISC)
    }

    pub fn cdesc(&self) -> Vec<PhraseRef<'s>> {
        self.controlled(Dep::CDESC)
    }

    pub fn adesc(&self) -> Vec<PhraseRef<'s>> {
        self.controlled(Dep::ADESC)
    }

    pub fn prep(&self) -> Vec<PhraseRef<'s>> {
        self.controlled(Dep::PREP)
    }

    pub fn pobj(&self) -> Vec<PhraseRef<'s>> {
        self.controlled(Dep::POBJ)
    }

    /// Subordinate clauses; adnominal clauses count when verbal.
    pub fn subcl(&self) -> Vec<PhraseRef<'s>> {
        self.children()
            .into_iter()
            .filter(|c| {
                c.dep().contains(Dep::SUBCL) || (c.kind() == PhraseKind::Verb && c.dep().contains(Dep::ACL))
            })
            .collect()
    }

    pub fn relcl(&self) -> Vec<PhraseRef<'s>> {
        self.controlled(Dep::RELCL)
    }

    pub fn xcomp(&self) -> Vec<PhraseRef<'s>> {
        self.controlled(Dep::XCOMP)
    }

    pub fn appos(&self) -> Vec<PhraseRef<'s>> {
        self.controlled(Dep::APPOS)
    }

    pub fn nmod(&self) -> Vec<PhraseRef<'s>> {
        self.controlled(Dep::NMOD)
    }

    /// Every token of the phrase and its sub-DAG, with the conjunctions
    /// that join coordinated children. Sorted.
    pub fn tokens(&self) -> Vec<usize> {
        let mut tokens = BTreeSet::new();
        for phrase in std::iter::once(*self).chain(self.subdag()) {
            tokens.extend(phrase.head().subtokens());
            tokens.extend(phrase.sconj());
            if phrase.is_lead() {
                if let Some(conjs) = phrase.coordination() {
                    tokens.extend(conjs.preconj);
                    tokens.extend(conjs.cconj);
                }
            }
        }
        tokens.into_iter().collect()
    }

    pub fn text(&self, doc: &Doc) -> String {
        self.tokens()
            .into_iter()
            .filter_map(|i| doc.get(i))
            .map(|t| t.text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl PartialEq for PhraseRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.sent, other.sent) && self.idx() == other.idx()
    }
}

impl Eq for PhraseRef<'_> {}

impl fmt::Debug for PhraseRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.idx())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segram_protocol::Role;

    #[test]
    fn test_phrase_for() {
        let types = PhraseTypes::default();
        let comp = Component::new(ComponentKind::Desc, 4, Role::DESC);
        let phrase = types.phrase_for(&comp).unwrap();
        assert_eq!(phrase.kind, PhraseKind::Desc);
        assert_eq!(phrase.idx, 4);
        assert_eq!(phrase.dep, Dep::MISC);

        let err = PhraseTypes::empty().phrase_for(&comp).unwrap_err();
        assert!(matches!(err, GrammarError::NoPhraseType { kind: "Desc", idx: 4 }));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut types = PhraseTypes::empty();
        let vp = PhraseType { kind: PhraseKind::Verb, governs: governs_verb };
        types.register(vp).unwrap();
        assert_eq!(types.register(vp), Err(ConfigError::DuplicateAlias("VP")));
        assert_eq!(types.from_alias("VP"), Some(PhraseKind::Verb));
        assert_eq!(types.from_alias("NP"), None);
    }
}
