//! Language backends.
//!
//! A backend fills a [`RuleTable`] and answers the few questions about
//! tokens that sentence assembly needs but cannot answer generically.

pub mod en;

use crate::error::ConfigError;
use crate::rules::RuleTable;
use segram_doc::Token;
use segram_protocol::{Dep, Role};
use std::fmt;

pub trait Backend: fmt::Debug + Send + Sync {
    fn lang(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Registers the rules of every component kind the backend supports.
    fn register(&self, table: &mut RuleTable) -> Result<(), ConfigError>;

    /// Relation between a child component head and one of its parents.
    fn classify(&self, child: Token<'_>, parent: Token<'_>) -> Dep;

    /// First element of the coordination `tok` belongs to, or `tok` itself.
    fn lead<'d>(&self, tok: Token<'d>) -> Token<'d>;

    fn is_cconj(&self, tok: Token<'_>) -> bool;

    fn is_sconj(&self, tok: Token<'_>) -> bool;

    fn is_preconj(&self, tok: Token<'_>) -> bool;

    /// Fixed role of a token independent of the phrase it ends up in,
    /// such as negation or punctuation marks.
    fn token_role(&self, tok: Token<'_>) -> Option<Role>;
}

/// Looks up the backend for a language/backend label pair.
pub fn resolve(lang: &str, backend: &str) -> Result<Box<dyn Backend>, ConfigError> {
    match (lang, backend) {
        ("en", "rulebased") => Ok(Box::new(en::RulebasedEnglish)),
        _ => Err(ConfigError::UnknownBackend {
            lang: lang.to_string(),
            backend: backend.to_string(),
        }),
    }
}
