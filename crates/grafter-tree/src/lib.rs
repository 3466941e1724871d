//! Tree-construction algebra for assembling ASTs while a parse is in progress.
//!
//! Grammar actions describe tree shapes with "root" (`^`) and "child" operators.
//! [`TreeBuilder`] turns a sequence of those operators into concrete trees on top
//! of any node representation implementing [`NodeStore`].

mod builder;
mod error;
mod rule;
mod store;
mod token;
mod unique_id;

/// Tree construction over a node store.
pub use builder::{RootSource, TreeBuilder};
/// Structural errors raised while assembling trees.
pub use error::TreeError;
/// Per-rule accumulator of a root and its pending kids.
pub use rule::RuleMarker;
/// Capabilities a node representation provides to the builder.
pub use store::{NodeStore, TokenStream};
/// Token capability and reserved token types.
pub use token::{EOF, INVALID_TOKEN_TYPE, Token};
/// Debug identifiers for nodes.
pub use unique_id::UniqueIds;
