//! Arena-backed reference node representation for `grafter-tree`.

mod error;
mod error_node;
mod forest;
mod stream;
mod token;

pub use error::RecognitionError;
pub use error_node::ErrorNode;
pub use forest::{Forest, Node, NodeId, Payload};
pub use stream::CommonTokenStream;
pub use token::CommonToken;

/// A tree builder over the arena-backed [`Forest`].
pub type CommonTreeBuilder = grafter_tree::TreeBuilder<Forest>;
