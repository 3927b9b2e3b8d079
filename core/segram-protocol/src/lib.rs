pub mod ids;
pub mod symbols;

// Re-export core types for convenience
pub use ids::TokenId;
pub use symbols::*;

pub mod model;
pub use model::*;

#[cfg(test)]
mod tests {
    use super::*;
    use rkyv::{from_bytes, to_bytes};

    fn token() -> TokenData {
        TokenData {
            text: "cooked".into(),
            whitespace: " ".into(),
            lemma: "cook".into(),
            pos: Pos::VERB,
            tag: "VBD".into(),
            dep: "ROOT".into(),
            head: TokenId::new(1),
            morph: "Tense=Past|VerbForm=Fin".into(),
            corefs: vec![],
        }
    }

    #[test]
    fn test_token_serialization() {
        let original = token();

        let bytes = to_bytes::<_, 256>(&original).expect("Failed to serialize TokenData");
        let deserialized: TokenData = from_bytes(&bytes).expect("Failed to deserialize TokenData");

        assert_eq!(original, deserialized);
        assert_eq!(deserialized.pos, Pos::VERB);
    }

    #[test]
    fn test_id_layout() {
        assert_eq!(core::mem::size_of::<TokenId>(), 4);
        assert_eq!(TokenId::new(7).index(), 7);
    }

    #[test]
    fn test_features() {
        let tok = token();
        assert_eq!(tok.feature("Tense"), Some("Past"));
        assert_eq!(tok.feature("Mood"), None);
        assert!(tok.has_feature("VerbForm", "Fin"));

        let multi = TokenData { morph: "PronType=Int,Rel".into(), ..token() };
        assert!(multi.has_feature("PronType", "Rel"));
    }
}
