//! Errors raised while building or querying a profile HMM.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HmmError {
    /// No rows, or rows of different widths.
    #[error("invalid alignment: {0}")]
    InvalidAlignment(String),
    /// The alignment or the training parameters cannot produce a model.
    #[error("invalid training data: {0}")]
    InvalidTrainingData(String),
    /// A zero-length query sequence or path.
    #[error("empty input")]
    EmptyInput,
    #[error("symbol {0:?} is not in the alphabet")]
    UnknownSymbol(char),
    #[error("unknown state {0:?}")]
    UnknownState(String),
    /// Tables and topology do not fit together.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// Every path ending at the terminal state has probability zero.
    #[error("the sequence cannot be emitted by the model")]
    NoPath,
    #[error("parse error: {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HmmError>;
