use thiserror::Error;

/// Structural failure while assembling a tree.
///
/// These are kept apart from recognition errors: they mean the grammar actions
/// asked for a shape that cannot exist, not that the input failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("`{operation}` is not supported by this node representation")]
    Unsupported { operation: &'static str },

    #[error("more than one node as root ({children} children under a nil root)")]
    MalformedRoot { children: usize },

    #[error("token of type {token_type} cannot be wrapped in a node")]
    RejectedToken { token_type: i32 },

    #[error("child index {index} out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("can't set a single child to a list")]
    NilChild,

    #[error("attempt to add a child list to itself")]
    SelfAppend,

    #[error("{detail}")]
    BrokenLink { detail: String },
}
