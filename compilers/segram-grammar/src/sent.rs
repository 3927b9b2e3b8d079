//! Sentence assembly: from a dependency-parsed span to a frozen phrase graph.

use crate::builder::{build_component, build_fallback};
use crate::components::{Component, ComponentKind};
use crate::config::Grammar;
use crate::conjuncts::{self, Conjuncts};
use crate::error::GrammarError;
use crate::phrases::{Phrase, PhraseKind, PhraseRef};
use crate::registry::{Canonical, Registry};
use segram_doc::{Doc, Span};
use segram_graph::Graph;
use segram_protocol::{Dep, Symbol};
use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

/// One assembled sentence.
///
/// Owns the component and phrase registries of the span, the phrase graph
/// keyed by head index and the coordination groups keyed by lead index.
/// Nothing changes after assembly apart from cached depths.
#[derive(Debug, Clone)]
pub struct Sent {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) root: usize,
    pub(crate) cmap: Registry<Component>,
    pub(crate) pmap: Registry<Phrase>,
    pub(crate) graph: Graph<usize>,
    pub(crate) conjs: BTreeMap<usize, Conjuncts>,
    pub(crate) depths: OnceCell<BTreeMap<usize, usize>>,
}

impl Canonical for Sent {
    type Key = (usize, usize);

    fn key(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

impl PartialEq for Sent {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.end == other.end
            && self.root == other.root
            && self.cmap == other.cmap
            && self.pmap == other.pmap
            && self.graph == other.graph
            && self.conjs == other.conjs
    }
}

impl Sent {
    /// Runs the whole assembly pipeline over `span`, which has to be a
    /// complete sentence with a single root.
    pub fn from_span(grammar: &Grammar, span: Span<'_>) -> Result<Self, GrammarError> {
        let doc = span.doc();
        let (start, end) = (span.start(), span.end());
        let invalid = |reason: String| GrammarError::InvalidSpan { start, end, reason };

        let roots = span.roots();
        let root = match roots.as_slice() {
            [root] if root.is_root() => *root,
            [root] => return Err(invalid(format!("root '{}' depends on a token outside the span", root.text()))),
            _ => return Err(invalid(format!("expected one root, found {}", roots.len()))),
        };

        let mut cmap = Registry::new();
        for tok in span.tokens() {
            for kind in ComponentKind::ALL {
                if let Some(comp) = build_component(grammar, kind, tok, None) {
                    cmap.insert(comp);
                }
            }
        }
        if !cmap.contains(&root.i()) {
            if let Some(comp) = build_fallback(grammar, root) {
                cmap.insert(comp);
            }
        }
        debug!(start, end, components = cmap.len(), "built components");

        let claimed: BTreeSet<usize> = cmap.values().flat_map(|c| c.tokens()).collect();
        let mut subs = 0;
        for tok in span.tokens().filter(|t| !claimed.contains(&t.i())) {
            let owner = tok.ancestors().map(|a| a.i()).find(|i| cmap.contains(i));
            if let Some(comp) = owner.and_then(|i| cmap.get_mut(&i)) {
                comp.sub.push(tok.i());
                subs += 1;
            }
        }
        debug!(subs, "attached loose tokens");

        let mut pmap = Registry::new();
        for comp in cmap.values() {
            pmap.insert(grammar.phrase_types().phrase_for(comp)?);
        }

        let backend = grammar.backend();
        let mut links = Vec::new();
        for comp in cmap.values() {
            let tok = doc.token(comp.tok);
            let Some(phrase) = pmap.get_mut(&comp.tok) else {
                continue;
            };
            match tok.ancestors().find(|a| cmap.contains(&a.i())) {
                None => {
                    phrase.dep = Dep::ROOT;
                    links.push((comp.tok, None));
                }
                Some(parent) => {
                    phrase.dep = backend.classify(tok, parent);
                    phrase.sconj = if tok.head() == parent {
                        comp.subtokens().into_iter().find(|&i| backend.is_sconj(doc.token(i)))
                    } else {
                        None
                    };
                    links.push((parent.i(), Some(comp.tok)));
                }
            }
        }
        let graph = Graph::from_links(links);
        debug!(phrases = pmap.len(), links = graph.links().count(), "linked phrases");

        let heads: Vec<usize> = cmap.keys().collect();
        let mut conjs = BTreeMap::new();
        for (cc, members) in conjuncts::detect(backend, doc, &heads) {
            let group = conjuncts::assemble(backend, doc, cc, members);
            let Some(lead) = group.lead_idx() else {
                continue;
            };
            let lead_dep = pmap.get(&lead).map_or(Dep::empty(), |p| p.dep);
            for member in &group.members {
                if let Some(phrase) = pmap.get_mut(member) {
                    phrase.lead = Some(lead);
                    phrase.dep |= lead_dep;
                }
            }
            conjs.insert(lead, group);
        }
        let graph = conjuncts::rewrite(graph, &mut pmap, &conjs);

        Ok(Self {
            start,
            end,
            root: root.i(),
            cmap,
            pmap,
            graph,
            conjs,
            depths: OnceCell::new(),
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.cmap.values()
    }

    pub fn component(&self, idx: usize) -> Option<&Component> {
        self.cmap.get(&idx)
    }

    pub fn phrase(&self, idx: usize) -> Option<PhraseRef<'_>> {
        let phrase = self.pmap.get(&idx)?;
        let head = self.cmap.get(&idx)?;
        Some(PhraseRef::new(self, phrase, head))
    }

    pub fn phrases(&self) -> Vec<PhraseRef<'_>> {
        self.pmap.keys().filter_map(|idx| self.phrase(idx)).collect()
    }

    pub fn graph(&self) -> &Graph<usize> {
        &self.graph
    }

    /// Coordination groups keyed by the head index of their lead.
    pub fn conjs(&self) -> &BTreeMap<usize, Conjuncts> {
        &self.conjs
    }

    /// Component headed by the root token. Roots no kind accepts get a
    /// fallback component during assembly, so this is only `None` for a
    /// grammar without registered kinds.
    pub fn root(&self) -> Option<&Component> {
        self.cmap.get(&self.root)
    }

    /// Root phrase together with its conjuncts.
    pub fn proots(&self) -> Vec<PhraseRef<'_>> {
        self.phrase(self.root).map(|p| p.group()).unwrap_or_default()
    }

    pub fn sources(&self) -> Vec<PhraseRef<'_>> {
        self.graph.sources().into_iter().filter_map(|i| self.phrase(i)).collect()
    }

    fn of_kind(&self, kind: PhraseKind) -> Vec<PhraseRef<'_>> {
        self.phrases().into_iter().filter(|p| p.kind() == kind).collect()
    }

    pub fn vps(&self) -> Vec<PhraseRef<'_>> {
        self.of_kind(PhraseKind::Verb)
    }

    pub fn nps(&self) -> Vec<PhraseRef<'_>> {
        self.of_kind(PhraseKind::Noun)
    }

    pub fn dps(&self) -> Vec<PhraseRef<'_>> {
        self.of_kind(PhraseKind::Desc)
    }

    pub fn pps(&self) -> Vec<PhraseRef<'_>> {
        self.of_kind(PhraseKind::Prep)
    }

    pub(crate) fn depth(&self, idx: usize) -> usize {
        let depths = self.depths.get_or_init(|| {
            let mut depths = BTreeMap::new();
            let mut queue: VecDeque<(usize, usize)> = self.graph.sources().into_iter().map(|s| (s, 0)).collect();
            while let Some((node, depth)) = queue.pop_front() {
                if depths.contains_key(&node) {
                    continue;
                }
                depths.insert(node, depth);
                queue.extend(self.graph.children(&node).iter().map(|&c| (c, depth + 1)));
            }
            depths
        });
        depths.get(&idx).copied().unwrap_or(0)
    }

    fn covered(&self) -> usize {
        self.cmap
            .values()
            .flat_map(|c| c.subtokens())
            .filter(|i| (self.start..self.end).contains(i))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Share of span tokens that belong to some component.
    pub fn coverage(&self) -> f64 {
        if self.is_empty() {
            return 1.0;
        }
        self.covered() as f64 / self.len() as f64
    }

    pub fn is_dag(&self) -> bool {
        self.graph.is_dag()
    }

    /// Verifies acyclicity and full coverage.
    pub fn check(&self) -> Result<(), GrammarError> {
        if !self.is_dag() {
            return Err(GrammarError::Cyclic);
        }
        let covered = self.covered();
        if covered != self.len() {
            return Err(GrammarError::Uncovered { covered, total: self.len() });
        }
        Ok(())
    }

    /// Surface text of the span.
    pub fn to_text(&self, doc: &Doc) -> String {
        let text: String = (self.start..self.end)
            .filter_map(|i| doc.get(i))
            .map(|t| t.text_with_ws())
            .collect();
        text.trim_end().to_string()
    }

    /// Indented phrase hierarchy, one phrase per line.
    pub fn render(&self, doc: &Doc) -> String {
        let mut out = String::new();
        let mut source = None;
        for step in self.graph.iter_hierarchy() {
            if step.depth == 0 && source != Some(step.parent) {
                source = Some(step.parent);
                self.render_line(&mut out, doc, 0, step.parent);
            }
            if let Some(child) = step.child {
                self.render_line(&mut out, doc, step.depth + 1, child);
            }
        }
        out
    }

    fn render_line(&self, out: &mut String, doc: &Doc, depth: usize, idx: usize) {
        let Some(phrase) = self.phrase(idx) else {
            return;
        };
        out.push_str(&format!(
            "{}{}[{}] {}",
            "  ".repeat(depth),
            phrase.kind(),
            phrase.dep().label(),
            phrase.head().text(doc)
        ));
        if let Some(sconj) = phrase.sconj().and_then(|i| doc.get(i)) {
            out.push_str(&format!(" ({})", sconj.text()));
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use segram_protocol::{Mood, Pos, TokenData, TokenId};

    fn idx(phrases: Vec<PhraseRef<'_>>) -> Vec<usize> {
        phrases.iter().map(|p| p.idx()).collect()
    }

    #[test]
    fn test_basic_relations() {
        let (_, sent) = sent(CHASED);
        let chased = sent.phrase(2).unwrap();
        assert_eq!(chased.dep(), Dep::ROOT);
        assert_eq!(chased.kind(), PhraseKind::Verb);
        assert_eq!(idx(chased.subj()), vec![1]);
        assert_eq!(idx(chased.dobj()), vec![4]);
        assert_eq!(idx(sent.sources()), vec![2]);
        assert_eq!(sent.root().map(|c| c.tok), Some(2));
        assert_eq!(sent.component(1).unwrap().slot("det"), &[0]);
        assert_eq!(sent.coverage(), 1.0);
    }

    #[test]
    fn test_relative_clause() {
        let (_, sent) = sent(BOOK);
        let book = sent.phrase(1).unwrap();
        assert_eq!(idx(book.relcl()), vec![4]);
        assert_eq!(idx(book.subcl()), vec![4]);
        assert_eq!(book.dep(), Dep::SUBJ);

        let read = sent.phrase(4).unwrap();
        assert_eq!(read.dep(), Dep::RELCL | Dep::SUBCL);
        assert_eq!(idx(read.subj()), vec![3]);
        assert_eq!(idx(read.dobj()), vec![2]);
        assert_eq!(idx(read.parents()), vec![1]);
        assert_eq!(read.depth(), 2);

        let was = sent.phrase(5).unwrap();
        assert_eq!(idx(was.adesc()), vec![6]);
        assert_eq!(idx(was.subdag()), vec![1, 4, 2, 3, 6]);
        assert_eq!(idx(read.supdag()), vec![1, 5]);
        sent.check().unwrap();
    }

    #[test]
    fn test_coordination_propagates_subject() {
        let (doc, sent) = sent(COOKED);
        let group = sent.conjs().get(&1).unwrap();
        assert_eq!(group.members, vec![1, 3]);
        assert_eq!(group.lead, 0);
        assert_eq!(group.cconj, Some(2));

        let ate = sent.phrase(3).unwrap();
        assert_eq!(idx(ate.subj()), vec![0]);
        assert_eq!(idx(ate.dobj()), vec![5]);
        assert_eq!(ate.dep(), Dep::ROOT);
        assert_eq!(ate.lead().idx(), 1);
        assert!(!ate.is_lead());
        assert_eq!(idx(ate.conjuncts()), vec![1]);

        let cooked = sent.phrase(1).unwrap();
        assert!(cooked.is_lead());
        assert_eq!(idx(cooked.children()), vec![0]);
        assert_eq!(idx(cooked.group()), vec![1, 3]);
        assert_eq!(idx(sent.proots()), vec![1, 3]);
        assert_eq!(idx(sent.sources()), vec![1, 3]);
        assert_eq!(cooked.tokens(), vec![0, 1, 2, 6]);
        assert_eq!(cooked.text(&doc), "John cooked and .");
        assert_eq!(sent.coverage(), 1.0);
    }

    #[test]
    fn test_no_coordinate_edges_survive() {
        for rows in ALL {
            let (doc, sent) = sent(rows);
            for phrase in sent.phrases() {
                assert!(!phrase.dep().contains(Dep::CONJ), "{} in {}", phrase.idx(), sent.to_text(&doc));
            }
            assert!(sent.is_dag());
            assert_eq!(sent.coverage(), 1.0, "{}", sent.to_text(&doc));
            sent.check().unwrap();
        }
    }

    #[test]
    fn test_coordinated_objects() {
        let (_, sent) = sent(EITHER);
        let bought = sent.phrase(1).unwrap();
        assert_eq!(idx(bought.children()), vec![0, 3, 5]);
        assert_eq!(idx(bought.dobj()), vec![3, 5]);
        assert_eq!(sent.phrase(5).unwrap().dep(), Dep::DOBJ);

        let group = sent.conjs().get(&3).unwrap();
        assert_eq!((group.cconj, group.preconj), (Some(4), Some(2)));
    }

    #[test]
    fn test_coordinated_subjects() {
        let (_, sent) = sent(LEFT);
        let left = sent.phrase(6).unwrap();
        assert_eq!(idx(left.subj()), vec![0, 2, 5]);
        assert_eq!(sent.conjs().len(), 1);
        assert_eq!(sent.conjs().get(&0).map(|g| g.cconj), Some(Some(4)));
        assert_eq!(sent.nps().len(), 3);
    }

    #[test]
    fn test_passive_agent() {
        let (_, sent) = sent(PASSIVE);
        let eaten = sent.phrase(3).unwrap();
        assert_eq!(idx(eaten.dobj()), vec![1]);
        assert_eq!(idx(eaten.subj()), vec![5]);
        assert_eq!(sent.phrase(4).unwrap().dep(), Dep::AGENT);
        assert_eq!(sent.phrase(5).unwrap().dep(), Dep::SUBJ);
        assert_eq!(sent.pps().len(), 1);
    }

    #[test]
    fn test_prepositions() {
        let (_, sent) = sent(SAT);
        let sat = sent.phrase(1).unwrap();
        assert_eq!(idx(sat.prep()), vec![2]);
        assert_eq!(idx(sent.phrase(2).unwrap().pobj()), vec![4]);
        assert_eq!(sat.head().slot("exclam"), &[5]);
    }

    #[test]
    fn test_imperative() {
        let (doc, sent) = sent(GO);
        let go = sent.phrase(0).unwrap();
        assert_eq!(go.head().mood(), Some(Mood::IMP));
        assert_eq!(idx(go.desc()), vec![1]);
        assert_eq!(sent.to_text(&doc), "Go home!");
    }

    #[test]
    fn test_render() {
        let (doc, sent) = sent(CHASED);
        assert_eq!(sent.render(&doc), "VP[root] chased\n  NP[subj] The cat\n  NP[dobj] the mouse\n");
    }

    #[test]
    fn test_rejects_partial_span() {
        let doc = doc(CHASED);
        let grammar = grammar();
        let err = Sent::from_span(&grammar, doc.span(0, 2).unwrap()).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidSpan { start: 0, end: 2, .. }));

        let doc = Doc::new(two_roots()).unwrap();
        let err = Sent::from_span(&grammar, doc.span(0, 2).unwrap()).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidSpan { .. }));
    }

    #[test]
    fn test_headless_root_gets_a_component() {
        let (doc, sent) = sent(WOW);
        let root = sent.root().unwrap();
        assert_eq!(root.kind, ComponentKind::Desc);
        assert_eq!(root.subtokens(), vec![0, 1]);
        assert_eq!(sent.coverage(), 1.0);
        sent.check().unwrap();
        assert_eq!(sent.render(&doc), "DP[root] Wow !\n");

        let doc = Doc::new(vec![token("and", Pos::CCONJ, "ROOT", 0), token("so", Pos::ADV, "advmod", 0)]).unwrap();
        let sent = Sent::from_span(&grammar(), doc.span(0, 2).unwrap()).unwrap();
        sent.check().unwrap();
    }

    #[test]
    fn test_first_kind_keeps_token() {
        let (_, sent) = sent(COOL);
        let cool = sent.component(1).unwrap();
        assert_eq!(cool.kind, ComponentKind::Noun);
        assert_eq!(sent.phrase(1).unwrap().kind(), PhraseKind::Noun);
        assert_eq!(sent.components().filter(|c| c.tok == 1).count(), 1);
        assert_eq!(idx(sent.nps()), vec![0, 1, 2]);
        assert!(sent.dps().is_empty());
    }

    #[test]
    fn test_reassembly_is_stable() {
        let grammar = grammar();
        let doc = doc(COOL);
        let first = Sent::from_span(&grammar, doc.span(0, 4).unwrap()).unwrap();
        let second = Sent::from_span(&grammar, doc.span(0, 4).unwrap()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.components().count(), first.phrases().len());
    }

    fn token(text: &str, pos: Pos, dep: &str, head: usize) -> TokenData {
        TokenData {
            text: text.to_string(),
            whitespace: " ".to_string(),
            lemma: text.to_lowercase(),
            pos,
            tag: String::new(),
            dep: dep.to_string(),
            head: TokenId::new(head as u32),
            morph: String::new(),
            corefs: Vec::new(),
        }
    }

    fn two_roots() -> Vec<TokenData> {
        vec![token("Stop", Pos::VERB, "ROOT", 0), token("Go", Pos::VERB, "ROOT", 1)]
    }

    const TAGS: [Pos; 18] = [
        Pos::ADJ, Pos::ADV, Pos::INTJ, Pos::NOUN, Pos::PROPN, Pos::VERB,
        Pos::ADP, Pos::AUX, Pos::CCONJ, Pos::DET, Pos::NUM, Pos::PART,
        Pos::PRON, Pos::SCONJ, Pos::PUNCT, Pos::SYM, Pos::X, Pos::SPACE,
    ];

    const LABELS: [&str; 44] = [
        "acl", "acomp", "advcl", "advmod", "agent", "amod", "appos", "attr", "aux", "auxpass", "case",
        "cc", "ccomp", "compound", "conj", "csubj", "csubjpass", "dative", "dep", "det", "dobj", "expl",
        "intj", "mark", "meta", "neg", "nmod", "npadvmod", "nsubj", "nsubjpass", "nummod", "oprd",
        "parataxis", "pcomp", "pobj", "poss", "preconj", "predet", "prep", "prt", "punct", "quantmod",
        "relcl", "xcomp",
    ];

    fn random_tree() -> impl Strategy<Value = Vec<TokenData>> {
        let pos = prop::sample::select(TAGS.to_vec());
        let dep = prop::sample::select(LABELS.to_vec());
        (pos.clone(), 0usize..12).prop_flat_map(move |(root, n)| {
            prop::collection::vec((pos.clone(), dep.clone(), any::<prop::sample::Index>()), n).prop_map(move |rows| {
                let mut tokens = vec![token("root", root, "ROOT", 0)];
                for (k, (pos, dep, parent)) in rows.into_iter().enumerate() {
                    let i = k + 1;
                    tokens.push(token(&format!("w{i}"), pos, dep, parent.index(i)));
                }
                tokens
            })
        })
    }

    proptest! {
        #[test]
        fn test_random_trees_assemble(tokens in random_tree()) {
            let doc = Doc::new(tokens).unwrap();
            let grammar = grammar();
            let span = doc.span(0, doc.len()).unwrap();
            let sent = Sent::from_span(&grammar, span).unwrap();
            prop_assert!(sent.is_dag());
            prop_assert_eq!(sent.coverage(), 1.0);
            prop_assert!(sent.check().is_ok());
            prop_assert!(sent.root().is_some());
            prop_assert!(sent.phrases().iter().all(|p| !p.dep().contains(Dep::CONJ)));
            prop_assert_eq!(sent.components().count(), sent.phrases().len());
        }
    }
}
