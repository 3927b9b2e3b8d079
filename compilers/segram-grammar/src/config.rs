use crate::error::{ConfigError, GrammarError};
use crate::lang::{self, Backend};
use crate::phrases::PhraseTypes;
use crate::rules::RuleTable;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Selects the language backend a [`Grammar`] is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    pub lang: String,
    pub backend: String,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            backend: "rulebased".to_string(),
        }
    }
}

impl GrammarConfig {
    pub fn from_json(text: &str) -> Result<Self, GrammarError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A resolved backend with its validated rule table and phrase types.
/// Built once and passed by reference to everything that assembles or
/// loads sentences.
#[derive(Debug)]
pub struct Grammar {
    backend: Box<dyn Backend>,
    table: RuleTable,
    phrases: PhraseTypes,
}

impl Grammar {
    pub fn new(backend: Box<dyn Backend>) -> Result<Self, ConfigError> {
        let mut table = RuleTable::new();
        backend.register(&mut table)?;
        info!(lang = backend.lang(), backend = backend.name(), kinds = table.kinds().count(), "grammar ready");
        Ok(Self {
            backend,
            table,
            phrases: PhraseTypes::default(),
        })
    }

    pub fn from_config(config: &GrammarConfig) -> Result<Self, ConfigError> {
        Self::new(lang::resolve(&config.lang, &config.backend)?)
    }

    pub fn english() -> Result<Self, ConfigError> {
        Self::from_config(&GrammarConfig::default())
    }

    pub fn with_phrase_types(mut self, phrases: PhraseTypes) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn phrase_types(&self) -> &PhraseTypes {
        &self.phrases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentKind;

    #[test]
    fn test_config_defaults() {
        let config = GrammarConfig::from_json("{}").unwrap();
        assert_eq!(config, GrammarConfig::default());

        let config = GrammarConfig::from_json(r#"{"backend": "neural"}"#).unwrap();
        assert_eq!(config.lang, "en");
        assert_eq!(
            Grammar::from_config(&config).unwrap_err(),
            ConfigError::UnknownBackend { lang: "en".into(), backend: "neural".into() }
        );
        assert!(GrammarConfig::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_english_registers_all_kinds() -> anyhow::Result<()> {
        let grammar = Grammar::english()?;
        assert_eq!(grammar.backend().lang(), "en");
        assert_eq!(grammar.table().kinds().count(), 4);

        let verb = grammar.table().shape(ComponentKind::Verb).unwrap();
        assert!(verb.slot("aux").is_some());
        assert!(verb.attr("mood").is_some());
        assert!(grammar.table().shape(ComponentKind::Desc).unwrap().slot("det").is_some());
        Ok(())
    }

    #[test]
    fn test_registering_twice_fails() {
        let grammar = Grammar::english().unwrap();
        let mut table = grammar.table().clone();
        assert_eq!(
            grammar.backend().register(&mut table),
            Err(ConfigError::DuplicateKind("Verb"))
        );
    }
}
