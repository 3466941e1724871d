use std::fmt;

use grafter_tree::{EOF, Token as _, TokenStream};
use text_size::TextRange;

use crate::{CommonToken, RecognitionError};

/// Payload of a node standing in for input that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNode {
    start: CommonToken,
    stop: CommonToken,
    text: String,
    error: RecognitionError,
}

impl ErrorNode {
    pub(crate) fn new<S>(
        input: &S,
        start: &CommonToken,
        stop: Option<&CommonToken>,
        error: RecognitionError,
    ) -> Self
    where
        S: TokenStream<Token = CommonToken> + ?Sized,
    {
        // a stop before start (other than EOF) means the recognizer never
        // consumed anything; collapse the span to the start token
        let stop = match stop {
            Some(stop) if !precedes(stop, start) || stop.token_type() == EOF => stop.clone(),
            _ => start.clone(),
        };
        let text = match start.token_index() {
            Some(i) => {
                let j = if stop.token_type() == EOF { Some(input.len()) } else { stop.token_index() };
                j.map_or_else(|| "<unknown>".to_owned(), |j| input.text_between(i, j))
            }
            None => "<unknown>".to_owned(),
        };
        Self { start: start.clone(), stop, text, error }
    }

    pub fn start(&self) -> &CommonToken {
        &self.start
    }

    pub fn stop(&self) -> &CommonToken {
        &self.stop
    }

    /// Input text of the damaged span.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> &RecognitionError {
        &self.error
    }

    /// Source range covered by the span, when both ends carry one.
    pub fn range(&self) -> Option<TextRange> {
        let start = self.start.range()?;
        match self.stop.range() {
            Some(stop) => Some(start.cover(stop)),
            None => Some(start),
        }
    }
}

fn precedes(stop: &CommonToken, start: &CommonToken) -> bool {
    matches!((stop.token_index(), start.token_index()), (Some(stop), Some(start)) if stop < start)
}

impl fmt::Display for ErrorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = &self.text;
        match &self.error {
            RecognitionError::MissingToken { expected, .. } => {
                write!(f, "<missing type: {expected}>")
            }
            RecognitionError::UnwantedToken { found, .. } => {
                write!(f, "<extraneous: {found}, resync={text}>")
            }
            RecognitionError::MismatchedToken { found, .. } => {
                write!(f, "<mismatched token: {found}, resync={text}>")
            }
            RecognitionError::NoViableAlt { found } => {
                write!(f, "<unexpected: {found}, resync={text}>")
            }
            RecognitionError::Other { .. } => write!(f, "<error: {text}>"),
        }
    }
}
