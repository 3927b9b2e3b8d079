//! Rule-based English over spaCy (ClearNLP) dependency labels.

use super::Backend;
use crate::components::{AttrValue, Component, ComponentKind};
use crate::error::ConfigError;
use crate::rules::{Arity, ComponentShape, Finder, Getter, KindRules, RuleTable, TokenFinder};
use segram_doc::{Doc, Token};
use segram_protocol::{Dep, Modal, Mood, Pos, Role, Tense};

/// English reading of a token: shape predicates over POS and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnglishToken<'d>(pub Token<'d>);

impl<'d> EnglishToken<'d> {
    fn dep_is(self, label: &str) -> bool {
        self.0.dep() == label
    }

    fn pos_is(self, pos: Pos) -> bool {
        self.0.pos() == pos
    }

    fn lemma_in(self, lemmas: &[&str]) -> bool {
        lemmas.iter().any(|l| self.0.lemma().eq_ignore_ascii_case(l))
    }

    pub fn head(self) -> Self {
        Self(self.0.head())
    }

    pub fn children(self) -> impl Iterator<Item = EnglishToken<'d>> + 'd {
        self.0.children().map(EnglishToken)
    }

    /// First conjunct of the coordination chain that is not itself
    /// attached as a conjunct.
    pub fn lead(self) -> Self {
        self.0
            .conjuncts()
            .into_iter()
            .map(EnglishToken)
            .find(|c| !c.is_conj())
            .unwrap_or(self)
    }

    pub fn tense(self) -> Option<Tense> {
        let tense = self.0.feature("Tense")?;
        if tense.contains("Past") {
            Some(Tense::PAST)
        } else if tense.contains("Pres") {
            Some(Tense::PRESENT)
        } else {
            None
        }
    }

    pub fn is_root(self) -> bool {
        self.0.is_root()
    }

    // Nouns

    pub fn is_pron(self) -> bool {
        self.pos_is(Pos::PRON)
    }

    pub fn is_noun(self) -> bool {
        self.pos_is(Pos::NOUN) || self.pos_is(Pos::PROPN)
    }

    pub fn is_num(self) -> bool {
        self.pos_is(Pos::NUM)
    }

    pub fn is_nounlike(self) -> bool {
        self.is_noun() || self.is_pron() || (self.is_num() && !self.is_nummod())
    }

    pub fn is_np_head(self) -> bool {
        (self.is_nounlike() || self.is_noun_mod()) && !self.is_poss() && !self.is_expl() && !self.is_desc_mod()
    }

    pub fn is_nmod(self) -> bool {
        self.dep_is("nmod")
    }

    pub fn is_npadvmod(self) -> bool {
        self.dep_is("npadvmod")
    }

    pub fn is_nummod(self) -> bool {
        self.dep_is("nummod")
    }

    pub fn is_noun_mod(self) -> bool {
        self.is_nmod() || self.is_nummod() || self.is_npadvmod() || self.dep_is("compound")
    }

    // Verbs

    pub fn is_verb(self) -> bool {
        self.pos_is(Pos::VERB)
    }

    pub fn is_aux(self) -> bool {
        self.pos_is(Pos::AUX)
    }

    pub fn is_auxpass(self) -> bool {
        self.dep_is("auxpass")
    }

    pub fn is_verblike(self) -> bool {
        self.is_verb() || self.is_aux() || self.is_auxpass()
    }

    pub fn is_aux_verb(self) -> bool {
        (self.is_aux() || self.is_auxpass())
            && self.head().is_verblike()
            && !self.is_root()
            && !self.is_ccomp()
            && !self.is_advcl()
    }

    pub fn is_vp_head(self) -> bool {
        !self.lead().is_aux_verb() && self.is_verblike() && !self.is_amod() && !self.is_prep()
    }

    pub fn is_imp_mood(self) -> bool {
        self.lead().is_root() && self.0.has_feature("VerbForm", "Inf")
    }

    // Arguments

    pub fn is_subj(self) -> bool {
        self.dep_is("nsubj") || self.dep_is("csubj")
    }

    pub fn is_subjpass(self) -> bool {
        self.dep_is("nsubjpass") || self.dep_is("csubjpass")
    }

    pub fn is_dobj(self) -> bool {
        self.dep_is("dobj")
    }

    pub fn is_iobj(self) -> bool {
        self.dep_is("iobj") || self.dep_is("dative")
    }

    pub fn is_agent(self) -> bool {
        self.dep_is("agent")
    }

    pub fn is_expl(self) -> bool {
        self.dep_is("expl")
    }

    pub fn is_attr(self) -> bool {
        self.dep_is("attr")
    }

    pub fn is_oprd(self) -> bool {
        self.dep_is("oprd")
    }

    // Prepositions

    pub fn is_adp(self) -> bool {
        self.pos_is(Pos::ADP)
    }

    pub fn is_prep(self) -> bool {
        self.dep_is("prep")
    }

    pub fn is_preplike(self) -> bool {
        (self.is_adp() && !self.is_agent()) || self.is_prep()
    }

    pub fn is_pp_head(self) -> bool {
        (self.is_preplike() || self.is_agent()) && !self.lead().head().is_preplike()
    }

    // Descriptions

    pub fn is_adj(self) -> bool {
        self.pos_is(Pos::ADJ)
    }

    pub fn is_adv(self) -> bool {
        self.pos_is(Pos::ADV)
    }

    pub fn is_advmod(self) -> bool {
        self.dep_is("advmod")
    }

    pub fn is_amod(self) -> bool {
        self.dep_is("amod")
    }

    pub fn is_poss(self) -> bool {
        self.dep_is("poss")
    }

    pub fn is_appos(self) -> bool {
        self.dep_is("appos")
    }

    pub fn is_dp_head(self) -> bool {
        let lead = self.lead();
        !lead.is_neg()
            && !lead.is_desc_mod()
            && (self.is_adj() || self.is_adv() || self.is_poss() || (self.is_verblike() && self.is_amod()))
    }

    /// Modifier of an adjective or adverb ("very" in "very big").
    pub fn is_desc_mod(self) -> bool {
        let head = self.head();
        (head.is_adv() || head.is_adj()) && (self.is_advmod() || self.is_npadvmod() || self.is_amod())
    }

    // Clauses and complements

    pub fn is_acl(self) -> bool {
        self.dep_is("acl")
    }

    pub fn is_advcl(self) -> bool {
        self.dep_is("advcl")
    }

    pub fn is_relcl(self) -> bool {
        self.dep_is("relcl")
    }

    pub fn is_xcomp(self) -> bool {
        self.dep_is("xcomp")
    }

    pub fn is_ccomp(self) -> bool {
        self.dep_is("ccomp")
    }

    pub fn is_acomp(self) -> bool {
        self.dep_is("acomp")
    }

    // Conjunctions

    pub fn is_preconj(self) -> bool {
        self.dep_is("preconj")
    }

    pub fn is_cconj(self) -> bool {
        self.pos_is(Pos::CCONJ) && !self.is_preconj()
    }

    pub fn is_sconj(self) -> bool {
        self.pos_is(Pos::SCONJ)
    }

    pub fn is_conj(self) -> bool {
        self.dep_is("conj")
    }

    // Other

    pub fn is_det(self) -> bool {
        self.pos_is(Pos::DET)
    }

    pub fn is_neg(self) -> bool {
        self.dep_is("neg")
    }

    /// "no" and "never" used as determiners.
    pub fn is_no(self) -> bool {
        self.dep_is("det") && self.lemma_in(&["no", "never"])
    }

    pub fn is_cconj_neg(self) -> bool {
        (self.is_cconj() && self.lemma_in(&["nor"])) || (self.is_preconj() && self.lemma_in(&["neither"]))
    }

    pub fn is_negation(self) -> bool {
        self.is_neg() || self.is_no() || self.is_cconj_neg()
    }

    pub fn is_part(self) -> bool {
        self.pos_is(Pos::PART)
    }

    pub fn is_punct(self) -> bool {
        self.pos_is(Pos::PUNCT)
    }

    pub fn is_qmark(self) -> bool {
        self.is_punct() && self.lemma_in(&["?"])
    }

    pub fn is_exclam(self) -> bool {
        self.is_punct() && self.lemma_in(&["!"])
    }

    pub fn is_intj(self) -> bool {
        self.pos_is(Pos::INTJ)
    }
}

// Head predicates

fn is_vp_head(tok: Token<'_>) -> bool {
    EnglishToken(tok).is_vp_head()
}

fn is_np_head(tok: Token<'_>) -> bool {
    EnglishToken(tok).is_np_head()
}

fn is_pp_head(tok: Token<'_>) -> bool {
    EnglishToken(tok).is_pp_head()
}

fn is_dp_head(tok: Token<'_>) -> bool {
    EnglishToken(tok).is_dp_head()
}

// Finders

fn hit(tok: Token<'_>, found: bool) -> Vec<usize> {
    if found {
        vec![tok.i()]
    } else {
        Vec::new()
    }
}

fn find_qmark(tok: Token<'_>) -> Vec<usize> {
    hit(tok, EnglishToken(tok).is_qmark())
}

fn find_exclam(tok: Token<'_>) -> Vec<usize> {
    hit(tok, EnglishToken(tok).is_exclam())
}

fn find_intj(tok: Token<'_>) -> Vec<usize> {
    hit(tok, EnglishToken(tok).is_intj())
}

fn find_neg(tok: Token<'_>) -> Vec<usize> {
    let t = EnglishToken(tok);
    hit(tok, t.is_neg() || t.is_no())
}

fn find_part(tok: Token<'_>) -> Vec<usize> {
    let t = EnglishToken(tok);
    hit(tok, t.is_part() && !t.is_neg())
}

fn find_aux(tok: Token<'_>) -> Vec<usize> {
    let t = EnglishToken(tok);
    hit(tok, t.is_aux_verb() && !t.is_part() && !t.is_conj())
}

fn find_expl(tok: Token<'_>) -> Vec<usize> {
    hit(tok, EnglishToken(tok).is_expl())
}

fn find_det(tok: Token<'_>) -> Vec<usize> {
    let t = EnglishToken(tok);
    hit(tok, t.is_det() && !t.is_no())
}

/// Chained prepositions ("out of"), in tree order.
fn find_preps(tok: Token<'_>) -> Vec<usize> {
    let mut found = Vec::new();
    let mut stack = vec![tok];
    while let Some(t) = stack.pop() {
        let e = EnglishToken(t);
        if e.is_prep() && !e.is_conj() {
            found.push(t.i());
            let children: Vec<_> = t.children().collect();
            stack.extend(children.into_iter().rev());
        }
    }
    found
}

fn find_mod(tok: Token<'_>) -> Vec<usize> {
    hit(tok, EnglishToken(tok).is_desc_mod())
}

/// Determiner hanging off a description modifier ("a" in "a bit too big").
fn find_desc_det(comp: &Component, doc: &Doc) -> Vec<usize> {
    comp.slot("mod")
        .iter()
        .filter_map(|&i| doc.get(i))
        .map(EnglishToken)
        .filter(|m| m.is_desc_mod())
        .find_map(|m| m.children().find(|c| c.is_det()))
        .map(|det| vec![det.0.i()])
        .unwrap_or_default()
}

// Getters

fn auxiliaries<'d>(comp: &Component, doc: &'d Doc) -> impl Iterator<Item = EnglishToken<'d>> + 'd {
    comp.slot("aux")
        .to_vec()
        .into_iter()
        .filter_map(move |i| doc.get(i))
        .map(EnglishToken)
}

fn get_tense(comp: &Component, doc: &Doc) -> AttrValue {
    for aux in auxiliaries(comp, doc) {
        if aux.lemma_in(&["will", "shall"]) {
            return AttrValue::Tense(Tense::FUTURE);
        }
        if aux.lemma_in(&["have"]) {
            return AttrValue::Tense(Tense::PAST);
        }
        if let Some(tense) = aux.tense() {
            return AttrValue::Tense(tense);
        }
    }
    let own = doc.get(comp.tok).and_then(|t| EnglishToken(t).tense());
    AttrValue::Tense(own.unwrap_or(Tense::PRESENT))
}

fn get_modal(comp: &Component, doc: &Doc) -> AttrValue {
    for aux in auxiliaries(comp, doc) {
        let modal = if aux.lemma_in(&["can", "could"]) {
            Modal::ABILITY
        } else if aux.lemma_in(&["may", "might"]) {
            Modal::POSSIBILITY
        } else if aux.lemma_in(&["must"]) {
            Modal::NECESSITY
        } else if aux.lemma_in(&["should", "ought"]) {
            Modal::OBLIGATION
        } else if aux.lemma_in(&["need"]) {
            Modal::NEED
        } else {
            continue;
        };
        return AttrValue::Modal(modal);
    }
    AttrValue::Modal(Modal::NULL)
}

/// Imperative: a bare infinitive heading the sentence with no auxiliary
/// ("Go home!", but not "She will leave").
fn get_mood(comp: &Component, doc: &Doc) -> AttrValue {
    let imperative = comp.slot("aux").is_empty()
        && doc
            .get(comp.tok)
            .map_or(false, |t| EnglishToken(t).is_imp_mood());
    AttrValue::Mood(if imperative { Mood::IMP } else { Mood::REAL })
}

/// Relation of `tok` to the head of its parent component.
pub fn classify(tok: EnglishToken<'_>, head: EnglishToken<'_>) -> Dep {
    let mut dep = Dep::empty();
    if tok.is_conj() {
        dep |= Dep::CONJ;
    }
    if tok.is_preplike() {
        return dep | Dep::PREP;
    }
    if tok.is_subj() {
        dep |= Dep::SUBJ;
    }
    if tok.is_agent() {
        return dep | Dep::AGENT;
    }
    if head.is_preplike() {
        if tok.is_advmod() {
            return dep | Dep::DESC;
        }
        dep |= Dep::POBJ;
    }
    if head.is_nounlike() {
        if tok.is_adj() || tok.is_poss() || tok.is_amod() || tok.is_acomp() {
            dep |= Dep::DESC;
        }
        if tok.is_acl() {
            dep |= Dep::ACL;
        }
        if tok.is_relcl() {
            dep |= Dep::RELCL;
        }
        if tok.is_noun_mod() {
            dep |= Dep::NMOD;
        }
        if tok.is_appos() {
            dep |= Dep::APPOS;
        }
    }
    if head.is_verblike() {
        if tok.is_subjpass() || tok.is_dobj() {
            dep |= Dep::DOBJ;
        }
        if tok.is_iobj() {
            dep |= Dep::IOBJ;
        }
        if tok.is_oprd() || tok.is_attr() || tok.is_acomp() {
            dep |= Dep::ADESC;
        }
        if (tok.is_adj() || tok.is_nounlike()) && (tok.is_ccomp() || tok.is_advcl()) {
            dep |= Dep::CDESC;
        }
        if tok.is_adv() {
            dep |= Dep::DESC;
        }
        if head.is_imp_mood() && tok.is_npadvmod() {
            dep |= Dep::SUBJ;
        }
    }
    if head.is_agent() {
        dep |= Dep::SUBJ;
    }
    if tok.is_verblike() && !tok.is_acomp() && !tok.is_xcomp() && !dep.intersects(Dep::CONJ | Dep::DESC) {
        dep |= Dep::SUBCL;
    }
    if tok.is_xcomp() {
        dep |= Dep::XCOMP;
    }
    if dep.is_empty() {
        Dep::MISC
    } else {
        dep
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RulebasedEnglish;

impl RulebasedEnglish {
    fn finders(extra: &[(&'static str, Finder)]) -> Vec<(&'static str, Finder)> {
        let base: [(&'static str, TokenFinder); 4] = [
            ("qmark", find_qmark),
            ("exclam", find_exclam),
            ("intj", find_intj),
            ("neg", find_neg),
        ];
        base.into_iter()
            .map(|(name, f)| (name, Finder::Child(f)))
            .chain(extra.iter().copied())
            .collect()
    }
}

impl Backend for RulebasedEnglish {
    fn lang(&self) -> &'static str {
        "en"
    }

    fn name(&self) -> &'static str {
        "rulebased"
    }

    fn register(&self, table: &mut RuleTable) -> Result<(), ConfigError> {
        table.register(
            ComponentShape::base(ComponentKind::Verb)
                .with_slot("part", Arity::One)
                .with_slot("aux", Arity::Many)
                .with_slot("expl", Arity::One),
            KindRules {
                is_head: is_vp_head,
                finders: Self::finders(&[
                    ("part", Finder::Child(find_part)),
                    ("aux", Finder::Child(find_aux)),
                    ("expl", Finder::Child(find_expl)),
                ]),
                getters: vec![
                    ("tense", get_tense as Getter),
                    ("modal", get_modal as Getter),
                    ("mood", get_mood as Getter),
                ],
                inherit_from_lead: vec!["part"],
            },
        )?;
        table.register(
            ComponentShape::base(ComponentKind::Noun).with_slot("det", Arity::One),
            KindRules {
                is_head: is_np_head,
                finders: Self::finders(&[("det", Finder::Child(find_det))]),
                getters: vec![],
                inherit_from_lead: vec!["det"],
            },
        )?;
        table.register(
            ComponentShape::base(ComponentKind::Prep),
            KindRules {
                is_head: is_pp_head,
                finders: Self::finders(&[("preps", Finder::Child(find_preps))]),
                getters: vec![],
                inherit_from_lead: vec![],
            },
        )?;
        table.register(
            ComponentShape::base(ComponentKind::Desc).with_slot("det", Arity::One),
            KindRules {
                is_head: is_dp_head,
                finders: Self::finders(&[
                    ("mod", Finder::Child(find_mod)),
                    ("det", Finder::Post(find_desc_det)),
                ]),
                getters: vec![],
                inherit_from_lead: vec![],
            },
        )
    }

    fn classify(&self, child: Token<'_>, parent: Token<'_>) -> Dep {
        classify(EnglishToken(child), EnglishToken(parent))
    }

    fn lead<'d>(&self, tok: Token<'d>) -> Token<'d> {
        EnglishToken(tok).lead().0
    }

    fn is_cconj(&self, tok: Token<'_>) -> bool {
        EnglishToken(tok).is_cconj()
    }

    fn is_sconj(&self, tok: Token<'_>) -> bool {
        EnglishToken(tok).is_sconj()
    }

    fn is_preconj(&self, tok: Token<'_>) -> bool {
        EnglishToken(tok).is_preconj()
    }

    fn token_role(&self, tok: Token<'_>) -> Option<Role> {
        let t = EnglishToken(tok);
        if t.is_negation() {
            Some(Role::NEG)
        } else if t.is_qmark() {
            Some(Role::QMARK)
        } else if t.is_exclam() {
            Some(Role::EXCLAM)
        } else if t.is_intj() {
            Some(Role::INTJ)
        } else {
            None
        }
    }
}
