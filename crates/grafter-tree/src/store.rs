//! Capabilities the builder needs from a node representation.

use std::fmt::Debug;
use std::hash::Hash;

use crate::{Token, TreeError};

/// A stream of tokens, seen only by error node construction.
pub trait TokenStream {
    type Token: Token;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text of the tokens in `start..=stop`.
    fn text_between(&self, start: usize, stop: usize) -> String;
}

/// Storage for tree nodes addressed by copyable handles.
///
/// Children are owned exclusively by their parent. Parent links are plain
/// handles and never keep a node alive. A child index of `None` means the node
/// is a root or detached.
///
/// Implementations must splice in [`NodeStore::add_child`]: adding a nil node
/// moves its children over instead of nesting the container.
pub trait NodeStore {
    type Node: Copy + Eq + Hash + Debug;
    type Token: Token;
    type RecognitionError;

    /// Wraps `payload` into a node; `None` creates a nil node.
    fn create(&mut self, payload: Option<Self::Token>) -> Result<Self::Node, TreeError>;

    /// Creates a token for an imaginary node such as `DECL` in `^(DECL type ID)`.
    fn create_token(&mut self, token_type: i32, text: Option<&str>) -> Self::Token;

    /// Creates a token derived from a real input token, e.g. turning `{` into `BLOCK`.
    fn create_token_from(&mut self, from: &Self::Token) -> Self::Token;

    /// Builds a node standing in for the tokens `start..=stop` that failed to parse.
    fn error_node<S>(
        &mut self,
        input: &S,
        start: &Self::Token,
        stop: Option<&Self::Token>,
        error: Self::RecognitionError,
    ) -> Self::Node
    where
        S: TokenStream<Token = Self::Token> + ?Sized;

    /// Copies the payload of `node` into a fresh node without children.
    fn dup_node(&mut self, node: Self::Node) -> Self::Node;

    fn is_nil(&self, node: Self::Node) -> bool;

    fn token_type(&self, node: Self::Node) -> i32;

    fn text(&self, node: Self::Node) -> Option<&str>;

    fn set_token_type(&mut self, node: Self::Node, token_type: i32) -> Result<(), TreeError> {
        let _ = (node, token_type);
        Err(TreeError::Unsupported { operation: "set_token_type" })
    }

    fn set_text(&mut self, node: Self::Node, text: Option<String>) -> Result<(), TreeError> {
        let _ = (node, text);
        Err(TreeError::Unsupported { operation: "set_text" })
    }

    fn children(&self, node: Self::Node) -> &[Self::Node];

    fn child_count(&self, node: Self::Node) -> usize {
        self.children(node).len()
    }

    fn child(&self, node: Self::Node, index: usize) -> Option<Self::Node> {
        self.children(node).get(index).copied()
    }

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn set_parent(&mut self, node: Self::Node, parent: Option<Self::Node>);

    fn child_index(&self, node: Self::Node) -> Option<usize>;

    fn set_child_index(&mut self, node: Self::Node, index: Option<usize>);

    /// Appends `child`, splicing its children instead if it is nil.
    fn add_child(&mut self, node: Self::Node, child: Self::Node) -> Result<(), TreeError>;

    fn add_children<I>(&mut self, node: Self::Node, kids: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = Self::Node>,
    {
        for kid in kids {
            self.add_child(node, kid)?;
        }
        Ok(())
    }

    /// Replaces the child at `index`; `child` must not be nil.
    fn set_child(
        &mut self,
        node: Self::Node,
        index: usize,
        child: Self::Node,
    ) -> Result<(), TreeError>;

    /// Removes the child at `index` and reindexes the siblings after it.
    fn delete_child(&mut self, node: Self::Node, index: usize) -> Option<Self::Node>;

    /// Moves all children out of `node`, leaving them detached.
    fn take_children(&mut self, node: Self::Node) -> Vec<Self::Node>;
}
