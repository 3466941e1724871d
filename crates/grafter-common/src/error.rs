use thiserror::Error;

use crate::CommonToken;

/// Why the recognizer gave up on a span of input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    #[error("mismatched input {found} expecting {expected}")]
    MismatchedToken { expected: i32, found: CommonToken },

    #[error("missing token of type {expected} at {found}")]
    MissingToken { expected: i32, found: CommonToken },

    #[error("extraneous input {found} expecting {expected}")]
    UnwantedToken { expected: i32, found: CommonToken },

    #[error("no viable alternative at input {found}")]
    NoViableAlt { found: CommonToken },

    #[error("{message}")]
    Other { message: String },
}

impl RecognitionError {
    /// The token the recognizer was looking at when it failed.
    pub fn token(&self) -> Option<&CommonToken> {
        match self {
            Self::MismatchedToken { found, .. }
            | Self::MissingToken { found, .. }
            | Self::UnwantedToken { found, .. }
            | Self::NoViableAlt { found } => Some(found),
            Self::Other { .. } => None,
        }
    }
}
