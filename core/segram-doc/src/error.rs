use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocError {
    #[error("CoNLL-U line {line}: {message}")]
    Conllu { line: usize, message: String },

    #[error("token {token} has head {head} outside of the document")]
    HeadOutOfRange { token: usize, head: usize },

    #[error("head chain of token {token} does not reach a root")]
    CyclicHeads { token: usize },

    #[error("span {start}..{end} is not within the document of {len} tokens")]
    SpanOutOfRange { start: usize, end: usize, len: usize },

    #[error("archive error: {0}")]
    Archive(String),
}
