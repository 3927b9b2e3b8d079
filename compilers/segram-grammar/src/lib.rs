//! Semantic grammar graphs.
//!
//! A dependency-parsed sentence is regrouped into components (a head token
//! with the function words it controls), each component becomes a phrase,
//! and phrases are linked into a directed acyclic graph whose edges carry
//! grammatical relations. Coordinated phrases are grouped and the graph is
//! rewritten so that every conjunct relates to the parents of its lead.

pub mod builder;
pub mod components;
pub mod config;
pub mod conjuncts;
pub mod data;
pub mod document;
pub mod error;
pub mod lang;
pub mod phrases;
pub mod registry;
pub mod rules;
pub mod sent;

#[cfg(test)]
mod fixtures;

pub use builder::build_component;
pub use components::{AttrKind, AttrValue, Component, ComponentKind};
pub use config::{Grammar, GrammarConfig};
pub use conjuncts::Conjuncts;
pub use data::{ComponentData, ConjunctsData, DocRecord, FieldValue, PhraseData, SentData};
pub use document::GrammarDoc;
pub use error::{ConfigError, GrammarError};
pub use lang::Backend;
pub use phrases::{Phrase, PhraseKind, PhraseRef, PhraseType, PhraseTypes};
pub use registry::{Canonical, Registry};
pub use rules::{Arity, ComponentShape, Finder, KindRules, RuleTable};
pub use sent::Sent;
