//! Error kinds for the placement machine and the PCFG generator.
//!
//! Mirrors the way `parser::ParseError` is structured: a single enum,
//! manual `Display`, and `std::error::Error` so callers can use `?`
//! freely instead of matching on strings.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrickError {
    /// A lexeme did not match any recognized token shape.
    LexError(String),
    /// A lexeme's operator name is not one of the recognized names.
    UnknownOp(String),
    /// A transactional fill (or `AssertFilled`'s probe) hit an occupied voxel.
    CollisionError(String),
    /// `AssertFilled` found the probed cell empty.
    AssertionError,
    /// The generator exceeded a caller-supplied sentence length limit.
    GenerationLimitExceeded { sentence_len: usize, limit: usize },
    /// `)` was applied to a state stack already at depth 1.
    StackUnderflow,
    /// A nonterminal's productions summed to a probability outside the
    /// tolerated range.
    InvalidProbability { lhs: String, sum: f64 },
}

impl fmt::Display for BrickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexError(lexeme) => write!(f, "LexError: malformed lexeme {lexeme:?}"),
            Self::UnknownOp(name) => write!(f, "UnknownOp: unrecognized operator {name:?}"),
            Self::CollisionError(at) => write!(f, "CollisionError: cannot fill {at}"),
            Self::AssertionError => write!(f, "AssertionError: AssertFilled failed"),
            Self::GenerationLimitExceeded { sentence_len, limit } => write!(
                f,
                "GenerationLimitExceeded: sentence grew to {sentence_len} symbols, limit is {limit}"
            ),
            Self::StackUnderflow => write!(f, "StackUnderflow: ')' popped past base state"),
            Self::InvalidProbability { lhs, sum } => write!(
                f,
                "InvalidProbability: productions for {lhs} summed to {sum}, which exceeds the tolerated range"
            ),
        }
    }
}

impl std::error::Error for BrickError {}

pub type BrickResult<T> = Result<T, BrickError>;
