use std::fmt;

use grafter_tree::{EOF, Token};
use text_size::TextRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonToken {
    token_type: i32,
    text: Option<String>,
    range: Option<TextRange>,
    token_index: Option<usize>,
}

impl CommonToken {
    pub fn new(token_type: i32, text: impl Into<String>) -> Self {
        Self { token_type, text: Some(text.into()), range: None, token_index: None }
    }

    /// A token that never appeared in the input, such as `DECL` in `^(DECL ID)`.
    pub fn imaginary(token_type: i32, text: Option<&str>) -> Self {
        Self { token_type, text: text.map(str::to_owned), range: None, token_index: None }
    }

    pub fn eof() -> Self {
        Self { token_type: EOF, text: Some("<EOF>".to_owned()), range: None, token_index: None }
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.token_index = Some(index);
        self
    }

    pub(crate) fn set_token_index(&mut self, index: usize) {
        self.token_index = Some(index);
    }

    /// Source range of the token, if it came from real input.
    pub fn range(&self) -> Option<TextRange> {
        self.range
    }
}

impl Token for CommonToken {
    fn token_type(&self) -> i32 {
        self.token_type
    }

    fn set_token_type(&mut self, token_type: i32) {
        self.token_type = token_type;
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    fn token_index(&self) -> Option<usize> {
        self.token_index
    }
}

/// Renders as `[@index,'text',<type>]`, with `-1` for a missing index.
impl fmt::Display for CommonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match &self.text {
            Some(text) => text.replace('\n', "\\n").replace('\r', "\\r").replace('\t', "\\t"),
            None => "<no text>".to_owned(),
        };
        match self.token_index {
            Some(index) => write!(f, "[@{index},'{text}',<{}>]", self.token_type),
            None => write!(f, "[@-1,'{text}',<{}>]", self.token_type),
        }
    }
}
