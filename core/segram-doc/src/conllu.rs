//! Reader for CoNLL-U dependency trees.
//!
//! Heads are 1-based within a sentence with `0` marking the root; they are
//! rewritten to document positions, roots heading themselves. Multiword
//! token ranges (`1-2`) and empty nodes (`1.1`) are skipped.

use crate::{Doc, DocError};
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res},
    sequence::tuple,
    IResult,
};
use segram_protocol::{Pos, Symbol, TokenData, TokenId};
use tracing::debug;

struct Row<'a> {
    id: usize,
    form: &'a str,
    lemma: &'a str,
    upos: &'a str,
    xpos: &'a str,
    feats: &'a str,
    head: usize,
    deprel: &'a str,
    misc: &'a str,
}

fn field(input: &str) -> IResult<&str, &str> {
    take_till1(|c| c == '\t')(input)
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

fn row(input: &str) -> IResult<&str, Row<'_>> {
    let tab = || char('\t');
    let (rest, (id, _, form, _, lemma, _, upos, _, xpos, _, feats, _, head, _, deprel, _, _deps, _, misc)) =
        all_consuming(tuple((
            number, tab(), field, tab(), field, tab(), field, tab(), field, tab(), field, tab(), number, tab(),
            field, tab(), field, tab(), field,
        )))(input)?;
    Ok((rest, Row { id, form, lemma, upos, xpos, feats, head, deprel, misc }))
}

fn blank(value: &str) -> &str {
    if value == "_" {
        ""
    } else {
        value
    }
}

/// Heads are 1-based within their sentence block, so none may exceed the
/// number of rows the block ends up with.
fn check_heads(heads: &mut Vec<(usize, usize)>, rows: usize) -> Result<(), DocError> {
    let bad = heads.iter().find(|&&(_, head)| head > rows).copied();
    heads.clear();
    match bad {
        Some((line, head)) => Err(DocError::Conllu {
            line,
            message: format!("head {head} points past the last of {rows} rows"),
        }),
        None => Ok(()),
    }
}

pub fn parse(text: &str) -> Result<Doc, DocError> {
    let mut tokens: Vec<TokenData> = Vec::new();
    let mut sents = Vec::new();
    let mut start = 0;
    let mut heads = Vec::new();

    for (n, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        let err = |message: String| DocError::Conllu { line: n + 1, message };

        if line.trim().is_empty() {
            if tokens.len() > start {
                check_heads(&mut heads, tokens.len() - start)?;
                sents.push(start..tokens.len());
                start = tokens.len();
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        let id = line.split('\t').next().unwrap_or_default();
        if id.contains(|c: char| c == '-' || c == '.') {
            continue;
        }

        let (_, row) = row(line).map_err(|e| err(e.to_string()))?;
        if row.id != tokens.len() - start + 1 {
            return Err(err(format!("expected token id {}, found {}", tokens.len() - start + 1, row.id)));
        }
        let pos = Pos::parse(row.upos).map_err(|e| err(e.to_string()))?;
        heads.push((n + 1, row.head));
        let head = match row.head {
            0 => tokens.len(),
            h => start + h - 1,
        };
        let space_after = !row.misc.split('|').any(|m| m == "SpaceAfter=No");
        let lemma = match blank(row.lemma) {
            "" => row.form,
            lemma => lemma,
        };

        tokens.push(TokenData {
            text: row.form.to_string(),
            whitespace: if space_after { " ".into() } else { String::new() },
            lemma: lemma.to_string(),
            pos,
            tag: blank(row.xpos).to_string(),
            dep: row.deprel.to_string(),
            head: TokenId::new(head as u32),
            morph: blank(row.feats).to_string(),
            corefs: Vec::new(),
        });
    }
    if tokens.len() > start {
        check_heads(&mut heads, tokens.len() - start)?;
        sents.push(start..tokens.len());
    }

    debug!(tokens = tokens.len(), sents = sents.len(), "parsed CoNLL-U");
    Doc::with_sents(tokens, sents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
# text = The cat sat.
1\tThe\tthe\tDET\tDT\tDefinite=Def\t2\tdet\t_\t_
2\tcat\tcat\tNOUN\tNN\tNumber=Sing\t3\tnsubj\t_\t_
3\tsat\tsit\tVERB\tVBD\tTense=Past\t0\tROOT\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t.\t_\t3\tpunct\t_\t_

1-2\tDon't\t_\t_\t_\t_\t_\t_\t_\t_
1\tDo\tdo\tAUX\tVB\t_\t3\taux\t_\tSpaceAfter=No
2\tn't\tnot\tPART\tRB\t_\t3\tneg\t_\t_
3\tgo\tgo\tVERB\tVB\tVerbForm=Inf\t0\tROOT\t_\t_
";

    #[test]
    fn test_parse_sentences() {
        let doc = parse(SAMPLE).unwrap();
        assert_eq!(doc.len(), 7);

        let spans: Vec<_> = doc.sents().map(|s| (s.start(), s.end())).collect();
        assert_eq!(spans, vec![(0, 4), (4, 7)]);

        let sat = doc.token(2);
        assert!(sat.is_root());
        assert_eq!(sat.lemma(), "sit");
        assert_eq!(sat.feature("Tense"), Some("Past"));
        assert_eq!(sat.whitespace(), "");
        assert_eq!(doc.token(5).head().i(), 6);
        assert_eq!(doc.token(3).data().morph, "");
    }

    #[test]
    fn test_parse_errors() {
        let bad_pos = "1\tcat\tcat\tFOO\tNN\t_\t0\tROOT\t_\t_\n";
        assert!(matches!(parse(bad_pos), Err(DocError::Conllu { line: 1, .. })));

        let short = "1\tcat\tcat\n";
        assert!(matches!(parse(short), Err(DocError::Conllu { line: 1, .. })));

        let gap = "1\ta\ta\tX\t_\t_\t0\tROOT\t_\t_\n3\tb\tb\tX\t_\t_\t1\tdep\t_\t_\n";
        assert!(matches!(parse(gap), Err(DocError::Conllu { line: 2, .. })));

        let dangling = "1\ta\ta\tX\t_\t_\t5\tdep\t_\t_\n";
        assert!(matches!(parse(dangling), Err(DocError::Conllu { line: 1, .. })));

        // head 3 would land on the first row of the next sentence
        let crossing = "1\ta\ta\tX\t_\t_\t0\tROOT\t_\t_\n2\tb\tb\tX\t_\t_\t3\tdep\t_\t_\n\n\
                        1\tc\tc\tX\t_\t_\t0\tROOT\t_\t_\n";
        assert!(matches!(parse(crossing), Err(DocError::Conllu { line: 2, .. })));
    }
}
