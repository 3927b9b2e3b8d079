//! Plain records for caching and exchanging assembled sentences.
//!
//! Records reference everything by token index. Loading checks them
//! against the grammar's component shapes and phrase types and against
//! the document they are loaded into.

use crate::components::{AttrValue, Component, ComponentKind};
use crate::config::Grammar;
use crate::conjuncts::Conjuncts;
use crate::document::GrammarDoc;
use crate::error::GrammarError;
use crate::phrases::Phrase;
use crate::registry::Registry;
use crate::rules::Arity;
use crate::sent::Sent;
use segram_doc::Doc;
use segram_graph::Graph;
use segram_protocol::{Dep, Symbol, TokenData};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::BTreeMap;
use tracing::debug;

/// Value of a slot or attribute field in a component record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Index(usize),
    Indices(Vec<usize>),
    Symbol(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentData {
    #[serde(rename = "@class")]
    pub class: String,
    pub tok: usize,
    #[serde(default)]
    pub sub: Vec<usize>,
    /// Slots and attributes; a missing single slot is `null`.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Option<FieldValue>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseData {
    #[serde(rename = "@class")]
    pub class: String,
    pub head: usize,
    pub dep: String,
    pub sconj: Option<usize>,
    pub lead: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConjunctsData {
    pub members: Vec<usize>,
    pub lead: usize,
    pub cconj: Option<usize>,
    pub preconj: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentData {
    pub start: usize,
    pub end: usize,
    pub cmap: BTreeMap<usize, ComponentData>,
    pub pmap: BTreeMap<usize, PhraseData>,
    pub graph: BTreeMap<usize, Vec<usize>>,
    pub conjs: Vec<ConjunctsData>,
}

/// A whole document: its tokens and every assembled sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocRecord {
    pub tokens: Vec<TokenData>,
    pub sents: Vec<SentData>,
}

impl Component {
    pub fn to_data(&self, grammar: &Grammar) -> ComponentData {
        let mut fields = BTreeMap::new();
        if let Some(shape) = grammar.table().shape(self.kind) {
            for decl in &shape.slots {
                let found = self.slot(decl.name);
                let value = match (decl.arity, found) {
                    (Arity::One, []) => None,
                    (Arity::One, [i]) => Some(FieldValue::Index(*i)),
                    _ => Some(FieldValue::Indices(found.to_vec())),
                };
                fields.insert(decl.name.to_string(), value);
            }
        }
        for (name, value) in &self.attrs {
            fields.insert(name.to_string(), Some(FieldValue::Symbol(value.label())));
        }
        ComponentData {
            class: self.kind.alias().to_string(),
            tok: self.tok,
            sub: self.sub.clone(),
            fields,
        }
    }

    pub fn from_data(grammar: &Grammar, data: &ComponentData) -> Result<Self, GrammarError> {
        let unknown = || GrammarError::UnknownClass {
            what: "component",
            name: data.class.clone(),
        };
        let kind = ComponentKind::from_alias(&data.class).ok_or_else(unknown)?;
        let shape = grammar.table().shape(kind).ok_or_else(unknown)?;
        let class = kind.alias();

        let mut comp = Component::new(kind, data.tok, shape.role);
        comp.sub = data.sub.clone();
        for (field, value) in &data.fields {
            let bad = || GrammarError::BadField { class, field: field.clone() };
            if let Some(decl) = shape.slot(field) {
                match (decl.arity, value) {
                    (_, None) => {}
                    (Arity::One, Some(FieldValue::Index(i))) => comp.add_to_slot(decl.name, &[*i]),
                    (Arity::Many, Some(FieldValue::Indices(found))) => comp.add_to_slot(decl.name, found),
                    _ => return Err(bad()),
                }
            } else if let Some(decl) = shape.attr(field) {
                match value {
                    Some(FieldValue::Symbol(text)) => {
                        comp.attrs.insert(decl.name, AttrValue::parse(decl.kind, text)?);
                    }
                    _ => return Err(bad()),
                }
            } else {
                return Err(GrammarError::UnknownField { class, field: field.clone() });
            }
        }
        Ok(comp)
    }
}

impl Phrase {
    pub fn to_data(&self) -> PhraseData {
        PhraseData {
            class: self.kind.alias().to_string(),
            head: self.idx,
            dep: self.dep.label(),
            sconj: self.sconj,
            lead: self.lead,
        }
    }

    pub fn from_data(grammar: &Grammar, data: &PhraseData) -> Result<Self, GrammarError> {
        let kind = grammar
            .phrase_types()
            .from_alias(&data.class)
            .ok_or_else(|| GrammarError::UnknownClass {
                what: "phrase",
                name: data.class.clone(),
            })?;
        Ok(Self {
            kind,
            idx: data.head,
            dep: Dep::parse(&data.dep)?,
            sconj: data.sconj,
            lead: data.lead,
        })
    }
}

impl Conjuncts {
    pub fn to_data(&self) -> ConjunctsData {
        ConjunctsData {
            members: self.members.clone(),
            lead: self.lead,
            cconj: self.cconj,
            preconj: self.preconj,
        }
    }

    pub fn from_data(data: &ConjunctsData) -> Result<Self, GrammarError> {
        if data.lead >= data.members.len() {
            return Err(GrammarError::BadLead { lead: data.lead, len: data.members.len() });
        }
        Ok(Self {
            members: data.members.clone(),
            lead: data.lead,
            cconj: data.cconj,
            preconj: data.preconj,
        })
    }
}

fn check_token(start: usize, end: usize, idx: usize) -> Result<(), GrammarError> {
    if (start..end).contains(&idx) {
        Ok(())
    } else {
        Err(GrammarError::OutsideSentence { idx, start, end })
    }
}

impl Sent {
    pub fn to_data(&self, grammar: &Grammar) -> SentData {
        SentData {
            start: self.start,
            end: self.end,
            cmap: self.cmap.values().map(|c| (c.tok, c.to_data(grammar))).collect(),
            pmap: self.pmap.values().map(|p| (p.idx, p.to_data())).collect(),
            graph: self.graph.adjacency().clone(),
            conjs: self.conjs.values().map(Conjuncts::to_data).collect(),
        }
    }

    /// Rebuilds a sentence of `doc` from its record without re-running
    /// assembly.
    pub fn from_data(grammar: &Grammar, doc: &Doc, data: &SentData) -> Result<Self, GrammarError> {
        let (start, end) = (data.start, data.end);
        let span = doc.span(start, end)?;
        let root = match span.roots().as_slice() {
            [root] if root.is_root() => root.i(),
            roots => {
                return Err(GrammarError::InvalidSpan {
                    start,
                    end,
                    reason: format!("expected one root, found {}", roots.len()),
                })
            }
        };

        let mut cmap = Registry::new();
        for comp in data.cmap.values() {
            let comp = Component::from_data(grammar, comp)?;
            for idx in comp.subtokens() {
                check_token(start, end, idx)?;
            }
            cmap.insert(comp);
        }

        let mut pmap = Registry::new();
        for phrase in data.pmap.values() {
            let phrase = Phrase::from_data(grammar, phrase)?;
            if !cmap.contains(&phrase.idx) {
                return Err(GrammarError::Dangling { what: "component", idx: phrase.idx });
            }
            if let Some(sconj) = phrase.sconj {
                check_token(start, end, sconj)?;
            }
            pmap.insert(phrase);
        }
        for phrase in pmap.values() {
            if let Some(lead) = phrase.lead.filter(|lead| !pmap.contains(lead)) {
                return Err(GrammarError::Dangling { what: "phrase", idx: lead });
            }
        }

        for (&node, children) in &data.graph {
            if let Some(&idx) = std::iter::once(&node).chain(children).find(|i| !pmap.contains(i)) {
                return Err(GrammarError::Dangling { what: "phrase", idx });
            }
        }
        let graph = Graph::new(data.graph.clone());

        let mut conjs = BTreeMap::new();
        for group in &data.conjs {
            let group = Conjuncts::from_data(group)?;
            if let Some(&idx) = group.members.iter().find(|i| !pmap.contains(i)) {
                return Err(GrammarError::Dangling { what: "phrase", idx });
            }
            for idx in group.cconj.into_iter().chain(group.preconj) {
                check_token(start, end, idx)?;
            }
            if let Some(lead) = group.lead_idx() {
                conjs.insert(lead, group);
            }
        }

        debug!(start, end, phrases = pmap.len(), "loaded sentence");
        Ok(Self {
            start,
            end,
            root,
            cmap,
            pmap,
            graph,
            conjs,
            depths: OnceCell::new(),
        })
    }
}

impl GrammarDoc {
    pub fn to_data(&self, grammar: &Grammar) -> DocRecord {
        DocRecord {
            tokens: self.doc.data().to_vec(),
            sents: self.sents().map(|s| s.to_data(grammar)).collect(),
        }
    }

    pub fn from_data(grammar: &Grammar, record: DocRecord) -> Result<Self, GrammarError> {
        let bounds = record.sents.iter().map(|s| s.start..s.end).collect();
        let doc = Doc::with_sents(record.tokens, bounds)?;
        let mut smap = Registry::new();
        for data in &record.sents {
            smap.insert(Sent::from_data(grammar, &doc, data)?);
        }
        Ok(Self { doc, smap })
    }

    pub fn to_json(&self, grammar: &Grammar) -> Result<String, GrammarError> {
        Ok(serde_json::to_string(&self.to_data(grammar))?)
    }

    pub fn from_json(grammar: &Grammar, text: &str) -> Result<Self, GrammarError> {
        Self::from_data(grammar, serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{grammar, grammar_doc, sent, ALL, BOOK, COOKED, EITHER, WONT};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_component_record() {
        let grammar = grammar();
        let (_, sent) = sent(WONT);
        let data = sent.component(3).unwrap().to_data(&grammar);
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value,
            json!({
                "@class": "Verb",
                "tok": 3,
                "sub": [4],
                "qmark": null,
                "exclam": null,
                "intj": null,
                "neg": 2,
                "part": null,
                "aux": [1],
                "expl": null,
                "tense": "future",
                "modal": "null",
                "mood": "real"
            })
        );
        let back: ComponentData = serde_json::from_value(value).unwrap();
        assert_eq!(Component::from_data(&grammar, &back).unwrap(), *sent.component(3).unwrap());
    }

    #[test]
    fn test_phrase_and_conjuncts_records() {
        let (_, sent) = sent(EITHER);
        let data = sent.to_data(&grammar());
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value["pmap"]["5"],
            json!({"@class": "NP", "head": 5, "dep": "dobj", "sconj": null, "lead": 3})
        );
        assert_eq!(value["conjs"], json!([{"members": [3, 5], "lead": 0, "cconj": 4, "preconj": 2}]));
        assert_eq!(value["graph"]["1"], json!([0, 3, 5]));
    }

    #[test]
    fn test_sentence_round_trip() {
        let grammar = grammar();
        for rows in ALL {
            let gdoc = grammar_doc(rows);
            let json = gdoc.to_json(&grammar).unwrap();
            let back = GrammarDoc::from_json(&grammar, &json).unwrap();
            assert_eq!(back, gdoc);
        }
    }

    #[test]
    fn test_rejects_bad_records() {
        let grammar = grammar();
        let gdoc = grammar_doc(COOKED);
        let record = gdoc.to_data(&grammar);

        let mut bad = record.clone();
        bad.sents[0].pmap.get_mut(&1).unwrap().class = "XP".into();
        assert!(matches!(
            GrammarDoc::from_data(&grammar, bad),
            Err(GrammarError::UnknownClass { what: "phrase", .. })
        ));

        let mut bad = record.clone();
        bad.sents[0].cmap.get_mut(&1).unwrap().fields.insert("colour".into(), None);
        assert!(matches!(
            GrammarDoc::from_data(&grammar, bad),
            Err(GrammarError::UnknownField { class: "Verb", .. })
        ));

        let mut bad = record.clone();
        bad.sents[0].cmap.get_mut(&1).unwrap().fields.insert("aux".into(), Some(FieldValue::Index(0)));
        assert!(matches!(GrammarDoc::from_data(&grammar, bad), Err(GrammarError::BadField { .. })));

        let mut bad = record.clone();
        bad.sents[0].graph.insert(1, vec![0, 42]);
        assert!(matches!(
            GrammarDoc::from_data(&grammar, bad),
            Err(GrammarError::Dangling { what: "phrase", idx: 42 })
        ));

        let mut bad = record.clone();
        bad.sents[0].conjs[0].lead = 2;
        assert!(matches!(
            GrammarDoc::from_data(&grammar, bad),
            Err(GrammarError::BadLead { lead: 2, len: 2 })
        ));

        let mut bad = record.clone();
        bad.sents[0].cmap.get_mut(&3).unwrap().sub.push(9);
        assert!(matches!(
            GrammarDoc::from_data(&grammar, bad),
            Err(GrammarError::OutsideSentence { idx: 9, start: 0, end: 7 })
        ));

        let mut bad = record;
        bad.sents[0].pmap.get_mut(&3).unwrap().dep = "root|nope".into();
        assert!(matches!(GrammarDoc::from_data(&grammar, bad), Err(GrammarError::Symbol(_))));
    }

    #[test]
    fn test_structure_survives_round_trip() {
        let grammar = grammar();
        let gdoc = grammar_doc(BOOK);
        let back = GrammarDoc::from_json(&grammar, &gdoc.to_json(&grammar).unwrap()).unwrap();
        let sent = back.sent(0, 8).unwrap();
        let book = sent.phrase(1).unwrap();
        assert_eq!(book.relcl().iter().map(|p| p.idx()).collect::<Vec<_>>(), vec![4]);
        assert_eq!(sent.coverage(), 1.0);
        assert!(sent.is_dag());
    }
}
