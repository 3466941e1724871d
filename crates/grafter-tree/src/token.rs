/// Token type carried by nodes that have no meaningful type, such as error nodes.
pub const INVALID_TOKEN_TYPE: i32 = 0;

/// Token type of the end-of-input token.
pub const EOF: i32 = -1;

/// A lexed token as seen by the tree builder.
///
/// Only the type and text are interpreted; everything else is carried along
/// opaquely by the node representation.
pub trait Token {
    fn token_type(&self) -> i32;

    fn set_token_type(&mut self, token_type: i32);

    fn text(&self) -> Option<&str>;

    fn set_text(&mut self, text: Option<String>);

    /// Position of the token in its stream, if it came from one.
    fn token_index(&self) -> Option<usize>;
}
