//! Rule tables: what each component kind looks like and how a language
//! backend recognizes and fills it.

use crate::components::{AttrKind, AttrValue, Component, ComponentKind};
use crate::error::ConfigError;
use segram_doc::{Doc, Token};
use segram_protocol::{Pos, Role};
use std::collections::BTreeMap;
use tracing::debug;

pub type HeadPredicate = fn(Token<'_>) -> bool;
/// Tested against each child of a candidate head (or of its lead).
pub type TokenFinder = fn(Token<'_>) -> Vec<usize>;
/// Runs once the component has been built from its head's children.
pub type PostFinder = fn(&Component, &Doc) -> Vec<usize>;
pub type Getter = fn(&Component, &Doc) -> AttrValue;

#[derive(Debug, Clone, Copy)]
pub enum Finder {
    Child(TokenFinder),
    Post(PostFinder),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    One,
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDecl {
    pub name: &'static str,
    pub arity: Arity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrDecl {
    pub name: &'static str,
    pub kind: AttrKind,
}

/// Names that can never be slots.
pub const RESERVED: [&str; 2] = ["tok", "sub"];

/// Language-independent shape of a component kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentShape {
    pub kind: ComponentKind,
    pub role: Role,
    pub tags: Pos,
    pub slots: Vec<SlotDecl>,
    pub attrs: Vec<AttrDecl>,
}

impl ComponentShape {
    /// Shared slots plus whatever the kind declares on its own.
    pub fn base(kind: ComponentKind) -> Self {
        let mut slots = vec![
            SlotDecl { name: "qmark", arity: Arity::One },
            SlotDecl { name: "exclam", arity: Arity::One },
            SlotDecl { name: "intj", arity: Arity::One },
            SlotDecl { name: "neg", arity: Arity::One },
        ];
        let mut attrs = Vec::new();
        let (role, tags) = match kind {
            ComponentKind::Verb => {
                attrs = vec![
                    AttrDecl { name: "tense", kind: AttrKind::Tense },
                    AttrDecl { name: "modal", kind: AttrKind::Modal },
                    AttrDecl { name: "mood", kind: AttrKind::Mood },
                ];
                (Role::VERB, Pos::VERB | Pos::AUX)
            }
            ComponentKind::Noun => (Role::NOUN, Pos::NOUN | Pos::PROPN | Pos::PRON),
            ComponentKind::Prep => {
                slots.push(SlotDecl { name: "preps", arity: Arity::Many });
                (Role::PREP, Pos::ADP)
            }
            ComponentKind::Desc => {
                slots.push(SlotDecl { name: "mod", arity: Arity::Many });
                (Role::DESC, Pos::ADJ | Pos::ADV)
            }
        };
        Self { kind, role, tags, slots, attrs }
    }

    pub fn with_slot(mut self, name: &'static str, arity: Arity) -> Self {
        self.slots.push(SlotDecl { name, arity });
        self
    }

    pub fn slot(&self, name: &str) -> Option<SlotDecl> {
        self.slots.iter().find(|s| s.name == name).copied()
    }

    pub fn attr(&self, name: &str) -> Option<AttrDecl> {
        self.attrs.iter().find(|a| a.name == name).copied()
    }
}

/// Backend rules for one component kind.
#[derive(Debug, Clone)]
pub struct KindRules {
    pub is_head: HeadPredicate,
    pub finders: Vec<(&'static str, Finder)>,
    pub getters: Vec<(&'static str, Getter)>,
    /// Slots re-searched among the lead's children when missing locally.
    pub inherit_from_lead: Vec<&'static str>,
}

/// Validated, ready-to-run rules of one kind. Finders are kept in slot
/// declaration order.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRules {
    pub shape: ComponentShape,
    pub is_head: HeadPredicate,
    pub child_finders: Vec<(SlotDecl, TokenFinder)>,
    pub post_finders: Vec<(SlotDecl, PostFinder)>,
    pub getters: Vec<(AttrDecl, Getter)>,
    pub inherit: Vec<(SlotDecl, TokenFinder)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DispatchKey {
    Role(Role),
    Pos(Pos),
}

impl DispatchKey {
    fn describe(&self) -> String {
        match self {
            DispatchKey::Role(role) => format!("role '{role}'"),
            DispatchKey::Pos(pos) => format!("tag '{pos}'"),
        }
    }
}

/// Static dispatch tables of one grammar, filled once by the backend.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    kinds: BTreeMap<ComponentKind, CompiledRules>,
    dispatch: BTreeMap<DispatchKey, ComponentKind>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `rules` against `shape` and adds them. Nothing is
    /// registered when an error is returned.
    pub fn register(&mut self, shape: ComponentShape, rules: KindRules) -> Result<(), ConfigError> {
        let kind = shape.kind.alias();
        if self.kinds.contains_key(&shape.kind) {
            return Err(ConfigError::DuplicateKind(kind));
        }

        for (i, slot) in shape.slots.iter().enumerate() {
            if RESERVED.contains(&slot.name) {
                return Err(ConfigError::ReservedSlot { kind, slot: slot.name });
            }
            if shape.slots[..i].iter().any(|s| s.name == slot.name) {
                return Err(ConfigError::DuplicateSlot { kind, slot: slot.name });
            }
        }

        let finders: BTreeMap<&'static str, Finder> = rules.finders.iter().copied().collect();
        if let Some(&(slot, _)) = rules.finders.iter().find(|(name, _)| shape.slot(name).is_none()) {
            return Err(ConfigError::UndeclaredSlot { kind, slot });
        }
        if let Some(slot) = rules.inherit_from_lead.iter().copied().find(|name| shape.slot(name).is_none()) {
            return Err(ConfigError::UndeclaredSlot { kind, slot });
        }

        let mut child_finders = Vec::new();
        let mut post_finders = Vec::new();
        for decl in &shape.slots {
            match finders.get(decl.name) {
                Some(Finder::Child(f)) => child_finders.push((*decl, *f)),
                Some(Finder::Post(f)) => post_finders.push((*decl, *f)),
                None => return Err(ConfigError::MissingFinder { kind, slot: decl.name }),
            }
        }

        let mut inherit = Vec::new();
        for &name in &rules.inherit_from_lead {
            match child_finders.iter().find(|(decl, _)| decl.name == name) {
                Some(entry) => inherit.push(*entry),
                // post finders do not look at children
                None => return Err(ConfigError::UndeclaredSlot { kind, slot: name }),
            }
        }

        if let Some(&(attr, _)) = rules.getters.iter().find(|(name, _)| shape.attr(name).is_none()) {
            return Err(ConfigError::UndeclaredAttr { kind, attr });
        }
        let mut getters = Vec::new();
        for decl in &shape.attrs {
            match rules.getters.iter().find(|(name, _)| *name == decl.name) {
                Some((_, getter)) => getters.push((*decl, *getter)),
                None => return Err(ConfigError::MissingGetter { kind, attr: decl.name }),
            }
        }

        let keys: Vec<DispatchKey> = std::iter::once(DispatchKey::Role(shape.role))
            .chain(shape.tags.iter().map(DispatchKey::Pos))
            .collect();
        for key in &keys {
            if let Some(existing) = self.dispatch.get(key) {
                return Err(ConfigError::DuplicateDispatch {
                    key: key.describe(),
                    existing: existing.alias(),
                });
            }
        }

        debug!(kind, slots = shape.slots.len(), attrs = shape.attrs.len(), "registered component rules");
        for key in keys {
            self.dispatch.insert(key, shape.kind);
        }
        self.kinds.insert(
            shape.kind,
            CompiledRules {
                shape,
                is_head: rules.is_head,
                child_finders,
                post_finders,
                getters,
                inherit,
            },
        );
        Ok(())
    }

    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.kinds.keys().copied()
    }

    pub fn shape(&self, kind: ComponentKind) -> Option<&ComponentShape> {
        self.kinds.get(&kind).map(|r| &r.shape)
    }

    /// Kind responsible for `role`, falling back to the one tagged with `pos`.
    pub fn dispatch(&self, role: Role, pos: Pos) -> Option<ComponentKind> {
        self.dispatch
            .get(&DispatchKey::Role(role))
            .or_else(|| self.dispatch.get(&DispatchKey::Pos(pos)))
            .copied()
    }

    pub(crate) fn rules(&self, kind: ComponentKind) -> Option<&CompiledRules> {
        self.kinds.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segram_protocol::{Modal, Mood, Tense};

    fn any_head(_: Token<'_>) -> bool {
        true
    }

    fn nothing(_: Token<'_>) -> Vec<usize> {
        Vec::new()
    }

    fn tense(_: &Component, _: &Doc) -> AttrValue {
        AttrValue::Tense(Tense::PRESENT)
    }

    fn modal(_: &Component, _: &Doc) -> AttrValue {
        AttrValue::Modal(Modal::NULL)
    }

    fn mood(_: &Component, _: &Doc) -> AttrValue {
        AttrValue::Mood(Mood::REAL)
    }

    fn base_finders(extra: &[&'static str]) -> Vec<(&'static str, Finder)> {
        ["qmark", "exclam", "intj", "neg"]
            .iter()
            .chain(extra)
            .map(|name| (*name, Finder::Child(nothing as TokenFinder)))
            .collect()
    }

    fn noun_rules() -> KindRules {
        KindRules {
            is_head: any_head,
            finders: base_finders(&[]),
            getters: vec![],
            inherit_from_lead: vec![],
        }
    }

    #[test]
    fn test_register_and_dispatch() {
        let mut table = RuleTable::new();
        table.register(ComponentShape::base(ComponentKind::Noun), noun_rules()).unwrap();
        table
            .register(
                ComponentShape::base(ComponentKind::Verb),
                KindRules {
                    is_head: any_head,
                    finders: base_finders(&[]),
                    getters: vec![("tense", tense as Getter), ("modal", modal as Getter), ("mood", mood as Getter)],
                    inherit_from_lead: vec!["neg"],
                },
            )
            .unwrap();

        assert_eq!(table.dispatch(Role::NOUN, Pos::VERB), Some(ComponentKind::Noun));
        assert_eq!(table.dispatch(Role::SUBJ, Pos::AUX), Some(ComponentKind::Verb));
        assert_eq!(table.dispatch(Role::SUBJ, Pos::ADJ), None);
        assert_eq!(table.kinds().count(), 2);
    }

    #[test]
    fn test_rejects_duplicates() {
        let mut table = RuleTable::new();
        table.register(ComponentShape::base(ComponentKind::Noun), noun_rules()).unwrap();
        assert_eq!(
            table.register(ComponentShape::base(ComponentKind::Noun), noun_rules()),
            Err(ConfigError::DuplicateKind("Noun"))
        );

        // a second kind claiming an already dispatched tag
        let mut shape = ComponentShape::base(ComponentKind::Desc);
        shape.tags |= Pos::PRON;
        let desc = KindRules { finders: base_finders(&["mod"]), ..noun_rules() };
        assert!(matches!(table.register(shape, desc), Err(ConfigError::DuplicateDispatch { .. })));

        let shape = ComponentShape::base(ComponentKind::Prep).with_slot("neg", Arity::Many);
        let prep = KindRules { finders: base_finders(&["preps"]), ..noun_rules() };
        assert_eq!(
            table.register(shape, prep),
            Err(ConfigError::DuplicateSlot { kind: "Prep", slot: "neg" })
        );
    }

    #[test]
    fn test_rejects_bad_slots() {
        let shape = ComponentShape::base(ComponentKind::Noun).with_slot("tok", Arity::One);
        assert_eq!(
            RuleTable::new().register(shape, noun_rules()),
            Err(ConfigError::ReservedSlot { kind: "Noun", slot: "tok" })
        );

        let rules = KindRules { finders: base_finders(&["det"]), ..noun_rules() };
        assert_eq!(
            RuleTable::new().register(ComponentShape::base(ComponentKind::Noun), rules),
            Err(ConfigError::UndeclaredSlot { kind: "Noun", slot: "det" })
        );

        let shape = ComponentShape::base(ComponentKind::Noun).with_slot("det", Arity::One);
        assert_eq!(
            RuleTable::new().register(shape, noun_rules()),
            Err(ConfigError::MissingFinder { kind: "Noun", slot: "det" })
        );
    }

    #[test]
    fn test_rejects_bad_getters() {
        let rules = KindRules { finders: base_finders(&[]), ..noun_rules() };
        assert_eq!(
            RuleTable::new().register(ComponentShape::base(ComponentKind::Verb), rules.clone()),
            Err(ConfigError::MissingGetter { kind: "Verb", attr: "tense" })
        );

        let rules = KindRules { getters: vec![("tense", tense as Getter)], ..rules };
        assert_eq!(
            RuleTable::new().register(ComponentShape::base(ComponentKind::Noun), rules),
            Err(ConfigError::UndeclaredAttr { kind: "Noun", attr: "tense" })
        );
    }
}
