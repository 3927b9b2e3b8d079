use crate::registry::Canonical;
use segram_doc::Doc;
use segram_protocol::{Modal, Mood, Role, Symbol, SymbolError, Tense};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

/// The four grammatical units a component can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Verb,
    Noun,
    Prep,
    Desc,
}

impl ComponentKind {
    /// Construction is attempted in this order; when several kinds accept a
    /// token, the first one keeps it.
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Noun,
        ComponentKind::Verb,
        ComponentKind::Prep,
        ComponentKind::Desc,
    ];

    pub fn alias(self) -> &'static str {
        match self {
            ComponentKind::Verb => "Verb",
            ComponentKind::Noun => "Noun",
            ComponentKind::Prep => "Prep",
            ComponentKind::Desc => "Desc",
        }
    }

    pub fn from_alias(alias: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.alias() == alias)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Tense,
    Modal,
    Mood,
}

/// Scalar attribute derived by a getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrValue {
    Tense(Tense),
    Modal(Modal),
    Mood(Mood),
}

impl AttrValue {
    pub fn kind(&self) -> AttrKind {
        match self {
            AttrValue::Tense(_) => AttrKind::Tense,
            AttrValue::Modal(_) => AttrKind::Modal,
            AttrValue::Mood(_) => AttrKind::Mood,
        }
    }

    pub fn label(&self) -> String {
        match self {
            AttrValue::Tense(v) => v.label(),
            AttrValue::Modal(v) => v.label(),
            AttrValue::Mood(v) => v.label(),
        }
    }

    pub fn parse(kind: AttrKind, text: &str) -> Result<Self, SymbolError> {
        Ok(match kind {
            AttrKind::Tense => AttrValue::Tense(Tense::parse(text)?),
            AttrKind::Modal => AttrValue::Modal(Modal::parse(text)?),
            AttrKind::Mood => AttrValue::Mood(Mood::parse(text)?),
        })
    }
}

/// A head token with the tokens it controls.
///
/// `slots` only holds non-empty slots; slot names are the ones declared
/// in the component's shape. `sub` holds loosely attached tokens that no
/// slot claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub kind: ComponentKind,
    pub tok: usize,
    pub role: Role,
    pub sub: Vec<usize>,
    pub slots: BTreeMap<&'static str, Vec<usize>>,
    pub attrs: BTreeMap<&'static str, AttrValue>,
}

impl Canonical for Component {
    type Key = usize;

    fn key(&self) -> usize {
        self.tok
    }

    /// The first kind to claim a token keeps it; a rebuild of the same kind
    /// refreshes the fields.
    fn update(&mut self, newer: Self) {
        if newer.kind == self.kind {
            *self = newer;
        } else {
            trace!(tok = self.tok, kept = self.kind.alias(), dropped = newer.kind.alias(), "token already claimed");
        }
    }
}

impl Component {
    pub fn new(kind: ComponentKind, tok: usize, role: Role) -> Self {
        Self {
            kind,
            tok,
            role,
            sub: Vec::new(),
            slots: BTreeMap::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn idx(&self) -> usize {
        self.tok
    }

    pub fn slot(&self, name: &str) -> &[usize] {
        self.slots.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn attr(&self, name: &str) -> Option<AttrValue> {
        self.attrs.get(name).copied()
    }

    pub fn tense(&self) -> Option<Tense> {
        match self.attr("tense") {
            Some(AttrValue::Tense(t)) => Some(t),
            _ => None,
        }
    }

    pub fn modal(&self) -> Option<Modal> {
        match self.attr("modal") {
            Some(AttrValue::Modal(m)) => Some(m),
            _ => None,
        }
    }

    pub fn mood(&self) -> Option<Mood> {
        match self.attr("mood") {
            Some(AttrValue::Mood(m)) => Some(m),
            _ => None,
        }
    }

    pub fn is_negated(&self) -> bool {
        !self.slot("neg").is_empty()
    }

    pub(crate) fn add_to_slot(&mut self, name: &'static str, found: &[usize]) {
        if found.is_empty() {
            return;
        }
        let slot = self.slots.entry(name).or_default();
        for &i in found {
            if !slot.contains(&i) {
                slot.push(i);
            }
        }
    }

    /// Head plus controlled tokens, sorted.
    pub fn tokens(&self) -> Vec<usize> {
        let mut tokens: Vec<usize> = std::iter::once(self.tok)
            .chain(self.slots.values().flatten().copied())
            .collect();
        tokens.sort_unstable();
        tokens.dedup();
        tokens
    }

    /// Controlled and loosely attached tokens, sorted.
    pub fn subtokens(&self) -> Vec<usize> {
        let mut tokens = self.tokens();
        tokens.extend(&self.sub);
        tokens.sort_unstable();
        tokens.dedup();
        tokens
    }

    pub fn contains(&self, i: usize) -> bool {
        self.tok == i || self.slots.values().any(|s| s.contains(&i))
    }

    /// Controlled tokens joined by single spaces.
    pub fn text(&self, doc: &Doc) -> String {
        self.tokens()
            .into_iter()
            .filter_map(|i| doc.get(i))
            .map(|t| t.text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
