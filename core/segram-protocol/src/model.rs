use crate::ids::TokenId;
use crate::symbols::Pos;
use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// One token as delivered by an upstream dependency parser.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct TokenData {
    pub text: String,
    /// Trailing whitespace, empty when the next token is glued on.
    pub whitespace: String,
    pub lemma: String,
    pub pos: Pos,
    /// Fine-grained, language-specific tag.
    pub tag: String,
    /// Dependency label (spaCy/ClearNLP or UD).
    pub dep: String,
    /// Syntactic head; a token heading itself is a sentence root.
    pub head: TokenId,
    /// Morphological features in UD FEATS notation.
    pub morph: String,
    pub corefs: Vec<TokenId>,
}

impl TokenData {
    /// Value of a morphological feature, e.g. `feature("Tense") == Some("Past")`.
    pub fn feature(&self, key: &str) -> Option<&str> {
        self.morph
            .split('|')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Whether a (possibly multi-valued) feature holds `value`.
    pub fn has_feature(&self, key: &str, value: &str) -> bool {
        self.feature(key)
            .map_or(false, |values| values.split(',').any(|v| v == value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct SpanData {
    pub start: u32,
    pub end: u32,
}

/// Binary snapshot of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct DocData {
    pub version: u32,
    pub tokens: Vec<TokenData>,
    pub sents: Vec<SpanData>,
}

impl DocData {
    pub const VERSION: u32 = 1;
}
