use grafter_tree::{EOF, Token as _, TokenStream};

use crate::CommonToken;

/// A fully buffered token stream. Tokens are renumbered by position.
#[derive(Debug, Clone, Default)]
pub struct CommonTokenStream {
    tokens: Vec<CommonToken>,
}

impl CommonTokenStream {
    pub fn new(tokens: impl IntoIterator<Item = CommonToken>) -> Self {
        let tokens = tokens
            .into_iter()
            .enumerate()
            .map(|(index, mut token)| {
                token.set_token_index(index);
                token
            })
            .collect();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[CommonToken] {
        &self.tokens
    }
}

impl TokenStream for CommonTokenStream {
    type Token = CommonToken;

    fn len(&self) -> usize {
        self.tokens.len()
    }

    fn text_between(&self, start: usize, stop: usize) -> String {
        let Some(last) = self.tokens.len().checked_sub(1) else {
            return String::new();
        };
        let stop = stop.min(last);
        if start > stop {
            return String::new();
        }
        self.tokens[start..=stop]
            .iter()
            .take_while(|token| token.token_type() != EOF)
            .filter_map(|token| token.text())
            .collect()
    }
}
