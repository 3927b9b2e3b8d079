//! Hand-parsed sentences in CoNLL-U, spaCy English label set. Columns are
//! whitespace separated here and turned into tabs on load.

use crate::{Grammar, GrammarDoc, Sent};
use segram_doc::{conllu, Doc};

pub const CHASED: &str = "
1 The the DET DT Definite=Def 2 det _ _
2 cat cat NOUN NN Number=Sing 3 nsubj _ _
3 chased chase VERB VBD Tense=Past|VerbForm=Fin 0 ROOT _ _
4 the the DET DT Definite=Def 5 det _ _
5 mouse mouse NOUN NN Number=Sing 3 dobj _ SpaceAfter=No
6 . . PUNCT . _ 3 punct _ _
";

pub const COOKED: &str = "
1 John John PROPN NNP Number=Sing 2 nsubj _ _
2 cooked cook VERB VBD Tense=Past|VerbForm=Fin 0 ROOT _ _
3 and and CCONJ CC _ 2 cc _ _
4 ate eat VERB VBD Tense=Past|VerbForm=Fin 2 conj _ _
5 the the DET DT Definite=Def 6 det _ _
6 cake cake NOUN NN Number=Sing 4 dobj _ SpaceAfter=No
7 . . PUNCT . _ 2 punct _ _
";

pub const BOOK: &str = "
1 The the DET DT Definite=Def 2 det _ _
2 book book NOUN NN Number=Sing 6 nsubj _ _
3 that that PRON WDT PronType=Rel 5 dobj _ _
4 she she PRON PRP Case=Nom 5 nsubj _ _
5 read read VERB VBD Tense=Past|VerbForm=Fin 2 relcl _ _
6 was be AUX VBD Tense=Past|VerbForm=Fin 0 ROOT _ _
7 boring boring ADJ JJ Degree=Pos 6 acomp _ SpaceAfter=No
8 . . PUNCT . _ 6 punct _ _
";

pub const PASSIVE: &str = "
1 The the DET DT Definite=Def 2 det _ _
2 cake cake NOUN NN Number=Sing 4 nsubjpass _ _
3 was be AUX VBD Tense=Past|VerbForm=Fin 4 auxpass _ _
4 eaten eat VERB VBN Tense=Past|VerbForm=Part 0 ROOT _ _
5 by by ADP IN _ 4 agent _ _
6 John John PROPN NNP Number=Sing 5 pobj _ SpaceAfter=No
7 . . PUNCT . _ 4 punct _ _
";

pub const EITHER: &str = "
1 She she PRON PRP Case=Nom 2 nsubj _ _
2 bought buy VERB VBD Tense=Past|VerbForm=Fin 0 ROOT _ _
3 either either CCONJ CC _ 4 preconj _ _
4 apples apple NOUN NNS Number=Plur 2 dobj _ _
5 or or CCONJ CC _ 4 cc _ _
6 pears pear NOUN NNS Number=Plur 4 conj _ SpaceAfter=No
7 . . PUNCT . _ 2 punct _ _
";

pub const LEFT: &str = "
1 Tom Tom PROPN NNP _ 7 nsubj _ SpaceAfter=No
2 , , PUNCT , _ 1 punct _ _
3 Ann Ann PROPN NNP _ 1 conj _ SpaceAfter=No
4 , , PUNCT , _ 3 punct _ _
5 and and CCONJ CC _ 3 cc _ _
6 Bob Bob PROPN NNP _ 3 conj _ _
7 left leave VERB VBD Tense=Past|VerbForm=Fin 0 ROOT _ SpaceAfter=No
8 . . PUNCT . _ 7 punct _ _
";

pub const WONT: &str = "
1 She she PRON PRP Case=Nom 4 nsubj _ _
2 will will AUX MD VerbForm=Fin 4 aux _ _
3 not not PART RB Polarity=Neg 4 neg _ _
4 leave leave VERB VB VerbForm=Inf 0 ROOT _ SpaceAfter=No
5 . . PUNCT . _ 4 punct _ _
";

pub const SAT: &str = "
1 She she PRON PRP Case=Nom 2 nsubj _ _
2 sat sit VERB VBD Tense=Past|VerbForm=Fin 0 ROOT _ _
3 on on ADP IN _ 2 prep _ _
4 the the DET DT Definite=Def 5 det _ _
5 mat mat NOUN NN Number=Sing 3 pobj _ SpaceAfter=No
6 ! ! PUNCT . _ 2 punct _ _
";

pub const GO: &str = "
1 Go go VERB VB VerbForm=Inf 0 ROOT _ _
2 home home ADV RB _ 1 advmod _ SpaceAfter=No
3 ! ! PUNCT . _ 1 punct _ _
";

/// The root heads no component.
pub const WOW: &str = "
1 Wow wow INTJ UH _ 0 ROOT _ SpaceAfter=No
2 ! ! PUNCT . _ 1 punct _ _
";

/// "cool" is both a noun modifier and an adjective.
pub const COOL: &str = "
1 Dogs dog NOUN NNS Number=Plur 3 nsubj _ _
2 cool cool ADJ JJ Degree=Pos 3 compound _ _
3 stuff stuff NOUN NN Number=Sing 0 ROOT _ SpaceAfter=No
4 . . PUNCT . _ 3 punct _ _
";

pub const ALL: [&str; 11] = [CHASED, COOKED, BOOK, PASSIVE, EITHER, LEFT, WONT, SAT, GO, WOW, COOL];

pub fn doc(rows: &str) -> Doc {
    let text = rows
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join("\t"))
        .collect::<Vec<_>>()
        .join("\n");
    conllu::parse(text.trim()).expect("fixture parses")
}

pub fn grammar() -> Grammar {
    Grammar::english().expect("english grammar registers")
}

/// First sentence of a fixture.
pub fn sent(rows: &str) -> (Doc, Sent) {
    let doc = doc(rows);
    let grammar = grammar();
    let span = doc.sents().next().expect("fixture has a sentence");
    let sent = Sent::from_span(&grammar, span).expect("fixture is a sentence");
    (doc, sent)
}

pub fn grammar_doc(rows: &str) -> GrammarDoc {
    GrammarDoc::from_doc(doc(rows), &grammar()).expect("fixture assembles")
}
