//! Component construction from head tokens.

use crate::components::{Component, ComponentKind};
use crate::config::Grammar;
use crate::rules::Arity;
use segram_doc::Token;
use segram_protocol::Role;
use tracing::{debug, trace};

/// Whether any registered kind accepts `tok` as a head.
pub(crate) fn is_component_head(grammar: &Grammar, tok: Token<'_>) -> bool {
    grammar
        .table()
        .kinds()
        .filter_map(|kind| grammar.table().rules(kind))
        .any(|rules| (rules.is_head)(tok))
}

/// Builds a `kind` component headed by `tok`, or `None` when the kind does
/// not accept the token as a head.
///
/// When dispatch on the (role, tag) pair points to a different kind, the
/// component is built as that kind instead.
pub fn build_component(grammar: &Grammar, kind: ComponentKind, tok: Token<'_>, role: Option<Role>) -> Option<Component> {
    build(grammar, kind, tok, role, true)
}

fn build(grammar: &Grammar, kind: ComponentKind, tok: Token<'_>, role: Option<Role>, redispatch: bool) -> Option<Component> {
    let rules = grammar.table().rules(kind)?;
    if !(rules.is_head)(tok) {
        return None;
    }
    let role = role.unwrap_or(rules.shape.role);
    if redispatch {
        if let Some(target) = grammar.table().dispatch(role, tok.pos()) {
            if target != kind {
                trace!(tok = tok.i(), from = kind.alias(), to = target.alias(), "redispatched component");
                return build(grammar, target, tok, Some(role), false);
            }
        }
    }

    Some(fill(grammar, kind, tok, role))
}

/// Component for a sentence root that no kind accepts as a head, so that
/// the rest of the sentence has something to attach to. The kind comes
/// from the tag dispatch, falling back to a description.
pub(crate) fn build_fallback(grammar: &Grammar, tok: Token<'_>) -> Option<Component> {
    let table = grammar.table();
    let kind = table
        .dispatch(Role::empty(), tok.pos())
        .or_else(|| table.shape(ComponentKind::Desc).map(|s| s.kind))
        .or_else(|| table.kinds().next())?;
    let role = table.shape(kind)?.role;
    debug!(tok = tok.i(), kind = kind.alias(), "fallback component for headless root");
    Some(fill(grammar, kind, tok, role))
}

/// Runs finders and getters of `kind` around an accepted head.
fn fill(grammar: &Grammar, kind: ComponentKind, tok: Token<'_>, role: Role) -> Component {
    let mut comp = Component::new(kind, tok.i(), role);
    let Some(rules) = grammar.table().rules(kind) else {
        return comp;
    };
    for child in tok.children() {
        for (decl, finder) in &rules.child_finders {
            if decl.arity == Arity::One && !comp.slot(decl.name).is_empty() {
                continue;
            }
            let found = finder(child);
            if !found.is_empty() {
                comp.add_to_slot(decl.name, &found);
                break;
            }
        }
    }

    let lead = grammar.backend().lead(tok);
    if lead != tok {
        for (decl, finder) in &rules.inherit {
            if !comp.slot(decl.name).is_empty() {
                continue;
            }
            if let Some(found) = lead.children().map(finder).find(|f| !f.is_empty()) {
                comp.add_to_slot(decl.name, &found);
            }
        }
    }

    let doc = tok.doc();
    for (decl, finder) in &rules.post_finders {
        let found = finder(&comp, doc);
        comp.add_to_slot(decl.name, &found);
    }
    for (decl, getter) in &rules.getters {
        let value = getter(&comp, doc);
        comp.attrs.insert(decl.name, value);
    }
    comp
}
