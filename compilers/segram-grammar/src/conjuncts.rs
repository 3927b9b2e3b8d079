//! Coordination: detecting groups of conjoined phrases and rewriting the
//! phrase graph so that every member is reachable on its own.

use crate::lang::Backend;
use crate::phrases::{Phrase, PhraseKind};
use crate::registry::Registry;
use segram_doc::{Doc, Token};
use segram_graph::{Graph, GraphMut};
use segram_protocol::Dep;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// One coordination group. Members are phrase indices in token order;
/// `lead` is an ordinal into `members`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conjuncts {
    pub members: Vec<usize>,
    pub lead: usize,
    pub cconj: Option<usize>,
    pub preconj: Option<usize>,
}

impl Conjuncts {
    pub fn lead_idx(&self) -> Option<usize> {
        self.members.get(self.lead).copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.members.contains(&idx)
    }
}

/// Conjunction joining `a` and `b`: `b` has to be in the coordinate chain
/// of `a`, and the first coordinating child along that chain is taken.
pub(crate) fn get_cconj<'d>(backend: &dyn Backend, a: Token<'d>, b: Token<'d>) -> Option<usize> {
    let chain = a.conjuncts();
    if !chain.contains(&b) {
        return None;
    }
    std::iter::once(a)
        .chain(chain)
        .flat_map(|t| t.children())
        .find(|c| backend.is_cconj(*c))
        .map(|c| c.i())
}

/// Groups of component heads sharing a coordinating conjunction.
///
/// Every coordinated pair seeds a group that is grown until no other head
/// shares the same conjunction with all of its members. Groups contained
/// in larger ones are dropped and overlaps go to the larger group.
pub(crate) fn detect(backend: &dyn Backend, doc: &Doc, heads: &[usize]) -> Vec<(usize, Vec<usize>)> {
    let mut found: BTreeSet<(usize, Vec<usize>)> = BTreeSet::new();
    for (n, &a) in heads.iter().enumerate() {
        for &b in &heads[n + 1..] {
            let Some(cc) = get_cconj(backend, doc.token(a), doc.token(b)) else {
                continue;
            };
            let mut group = vec![a, b];
            loop {
                let candidate = heads.iter().copied().find(|&c| {
                    !group.contains(&c)
                        && group
                            .iter()
                            .all(|&m| get_cconj(backend, doc.token(c), doc.token(m)) == Some(cc))
                });
                match candidate {
                    Some(c) => {
                        group.push(c);
                        group.sort_unstable();
                    }
                    None => break,
                }
            }
            found.insert((cc, group));
        }
    }

    let mut ranked: Vec<_> = found.into_iter().collect();
    ranked.sort_by(|x, y| y.1.len().cmp(&x.1.len()).then_with(|| x.cmp(y)));
    let mut taken = BTreeSet::new();
    let mut groups = Vec::new();
    for (cc, members) in ranked {
        if members.iter().any(|m| taken.contains(m)) {
            trace!(cc, ?members, "dropped overlapping coordination group");
            continue;
        }
        taken.extend(members.iter().copied());
        groups.push((cc, members));
    }
    groups.sort_by_key(|(_, members)| members.first().copied());
    groups
}

/// Completes a detected group with its lead and pre-conjunction.
pub(crate) fn assemble(backend: &dyn Backend, doc: &Doc, cc: usize, members: Vec<usize>) -> Conjuncts {
    let anchor = doc.token(cc).head();
    let left = std::iter::once(anchor)
        .chain(anchor.conjuncts())
        .min()
        .unwrap_or(anchor);
    let preconj = left.lefts().find(|t| backend.is_preconj(*t)).map(|t| t.i());
    let lead = members
        .iter()
        .position(|&m| backend.lead(doc.token(m)).i() == m)
        .unwrap_or(0);
    Conjuncts { members, lead, cconj: Some(cc), preconj }
}

fn children_with(graph: &GraphMut<usize>, pmap: &Registry<Phrase>, node: usize, mask: Dep) -> Vec<usize> {
    graph
        .children(&node)
        .into_iter()
        .filter(|c| pmap.get(c).map_or(false, |p| p.dep.intersects(mask)))
        .collect()
}

/// Copies `mask` children of the lead to every member that has none of
/// `present`. Returns the number of edges added.
fn propagate(
    graph: &mut GraphMut<usize>,
    pmap: &Registry<Phrase>,
    conjs: &Conjuncts,
    mask: Dep,
    present: Dep,
) -> usize {
    let Some(lead) = conjs.lead_idx() else {
        return 0;
    };
    let shared = children_with(graph, pmap, lead, mask);
    let mut added = 0;
    for &member in conjs.members.iter().filter(|&&m| m != lead) {
        if !children_with(graph, pmap, member, present).is_empty() {
            continue;
        }
        for &child in shared.iter().filter(|&&c| c != member) {
            if graph.add_link_acyclic(member, child) {
                added += 1;
            }
        }
    }
    added
}

/// Subordinate clauses as seen from the graph being rewritten: explicit
/// clause relations plus adnominal clauses of verb phrases.
fn subclauses(graph: &GraphMut<usize>, pmap: &Registry<Phrase>, node: usize) -> Vec<usize> {
    graph
        .children(&node)
        .into_iter()
        .filter(|c| {
            pmap.get(c).map_or(false, |p| {
                p.dep.contains(Dep::SUBCL) || (p.kind == PhraseKind::Verb && p.dep.contains(Dep::ACL))
            })
        })
        .collect()
}

/// Rewrites the raw link graph around coordination groups keyed by their
/// lead index, then clears coordinate bits from every phrase relation.
pub(crate) fn rewrite(
    graph: Graph<usize>,
    pmap: &mut Registry<Phrase>,
    conjs: &BTreeMap<usize, Conjuncts>,
) -> Graph<usize> {
    let mut graph = graph.thaw();

    let followers: BTreeSet<usize> = conjs
        .values()
        .flat_map(|c| {
            let lead = c.lead_idx();
            c.members.iter().copied().filter(move |&m| Some(m) != lead)
        })
        .collect();
    let dropped = graph.retain_links(|_, child| {
        !(followers.contains(&child) && pmap.get(&child).map_or(false, |p| p.dep.contains(Dep::CONJ)))
    });

    let mut linked = 0;
    for parent in graph.nodes() {
        for child in graph.children(&parent) {
            let Some(group) = conjs.get(&child) else {
                continue;
            };
            for &member in &group.members {
                if member != child && member != parent && graph.add_link_acyclic(parent, member) {
                    linked += 1;
                }
            }
        }
    }

    let mut propagated = 0;
    for group in conjs.values() {
        propagated += propagate(&mut graph, pmap, group, Dep::SUBJ, Dep::SUBJ | Dep::AGENT);
        propagated += propagate(&mut graph, pmap, group, Dep::DESC, Dep::DESC | Dep::MISC);

        let Some(lead) = group.lead_idx() else {
            continue;
        };
        if pmap.get(&lead).map_or(false, |p| p.dep.contains(Dep::CDESC)) {
            let shared = subclauses(&graph, pmap, lead);
            for &member in group.members.iter().filter(|&&m| m != lead) {
                if !subclauses(&graph, pmap, member).is_empty() {
                    continue;
                }
                for &child in shared.iter().filter(|&&c| c != member) {
                    if graph.add_link_acyclic(member, child) {
                        propagated += 1;
                    }
                }
            }
        }
    }

    for phrase in pmap.values_mut() {
        if phrase.dep.contains(Dep::CONJ) {
            phrase.dep.remove(Dep::CONJ);
            if phrase.dep.is_empty() {
                phrase.dep = Dep::MISC;
            }
        }
    }

    debug!(dropped, linked, propagated, groups = conjs.len(), "rewrote coordination links");
    graph.freeze()
}
