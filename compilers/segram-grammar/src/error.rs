use segram_doc::DocError;
use segram_protocol::SymbolError;
use thiserror::Error;

/// Rule-table and configuration problems, reported while a grammar is
/// being assembled and never afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("component kind '{0}' is registered twice")]
    DuplicateKind(&'static str),

    #[error("{key} already dispatches to '{existing}'")]
    DuplicateDispatch { key: String, existing: &'static str },

    #[error("slot '{slot}' is declared twice on '{kind}'")]
    DuplicateSlot { kind: &'static str, slot: &'static str },

    #[error("'{slot}' is reserved and cannot be declared as a slot of '{kind}'")]
    ReservedSlot { kind: &'static str, slot: &'static str },

    #[error("'{kind}' has a finder for undeclared slot '{slot}'")]
    UndeclaredSlot { kind: &'static str, slot: &'static str },

    #[error("slot '{slot}' of '{kind}' has no finder")]
    MissingFinder { kind: &'static str, slot: &'static str },

    #[error("'{kind}' has a getter for undeclared attribute '{attr}'")]
    UndeclaredAttr { kind: &'static str, attr: &'static str },

    #[error("attribute '{attr}' of '{kind}' has no getter")]
    MissingGetter { kind: &'static str, attr: &'static str },

    #[error("phrase alias '{0}' is registered twice")]
    DuplicateAlias(&'static str),

    #[error("no backend '{backend}' for language '{lang}'")]
    UnknownBackend { lang: String, backend: String },
}

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("tokens {start}..{end} do not form a sentence: {reason}")]
    InvalidSpan { start: usize, end: usize, reason: String },

    #[error("no phrase type governs the '{kind}' component at token {idx}")]
    NoPhraseType { kind: &'static str, idx: usize },

    #[error("unknown {what} '{name}'")]
    UnknownClass { what: &'static str, name: String },

    #[error("'{class}' has no field '{field}'")]
    UnknownField { class: &'static str, field: String },

    #[error("field '{field}' of '{class}' has the wrong shape")]
    BadField { class: &'static str, field: String },

    #[error("{what} {idx} is referenced but not defined")]
    Dangling { what: &'static str, idx: usize },

    #[error("token {idx} lies outside the sentence {start}..{end}")]
    OutsideSentence { idx: usize, start: usize, end: usize },

    #[error("lead ordinal {lead} is out of range for a group of {len}")]
    BadLead { lead: usize, len: usize },

    #[error("phrase graph contains a cycle")]
    Cyclic,

    #[error("components cover {covered} of {total} tokens")]
    Uncovered { covered: usize, total: usize },

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Doc(#[from] DocError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
