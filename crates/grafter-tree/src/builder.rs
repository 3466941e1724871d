//! Node factory, rerooting, rule postprocessing and duplication.
//!
//! A nil node is an accumulator: a flat list of siblings still waiting for a
//! real root. Operations against a nil target splice its children rather than
//! nest it, and operations against a non-nil target demote it to the single
//! child of the new root.

use tracing::{debug, trace};

use crate::rule::RuleMarker;
use crate::{NodeStore, Token as _, TokenStream, TreeError, UniqueIds};

/// The node that a `^` operator promotes, either already built or still a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSource<N, T> {
    Node(N),
    Token(T),
}

/// Assembles trees in a [`NodeStore`] following grammar root/child operators.
///
/// The only session state is the debug id map. Use one builder per parse.
#[derive(Debug)]
pub struct TreeBuilder<S: NodeStore> {
    store: S,
    ids: UniqueIds<S::Node>,
}

impl<S: NodeStore + Default> Default for TreeBuilder<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: NodeStore> TreeBuilder<S> {
    pub fn new(store: S) -> Self {
        Self { store, ids: UniqueIds::new() }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Creates an empty nil node.
    pub fn nil(&mut self) -> Result<S::Node, TreeError> {
        self.store.create(None)
    }

    pub fn create(&mut self, token: S::Token) -> Result<S::Node, TreeError> {
        self.store.create(Some(token))
    }

    /// Creates a node of `token_type`.
    ///
    /// With `from`, the payload is a copy of that token retyped (and given
    /// `text` when present), as in `BLOCK[$lc]`. Without it, the payload is a
    /// fresh imaginary token.
    pub fn create_typed(
        &mut self,
        token_type: i32,
        from: Option<&S::Token>,
        text: Option<&str>,
    ) -> Result<S::Node, TreeError> {
        let token = match from {
            Some(from) => {
                let mut token = self.store.create_token_from(from);
                token.set_token_type(token_type);
                if let Some(text) = text {
                    token.set_text(Some(text.to_owned()));
                }
                token
            }
            None => self.store.create_token(token_type, text),
        };
        self.store.create(Some(token))
    }

    /// Creates a node holding the tokens `start..=stop` that failed to parse.
    pub fn error_node<I>(
        &mut self,
        input: &I,
        start: &S::Token,
        stop: Option<&S::Token>,
        error: S::RecognitionError,
    ) -> S::Node
    where
        I: TokenStream<Token = S::Token> + ?Sized,
    {
        let node = self.store.error_node(input, start, stop, error);
        debug!(
            ?node,
            start = ?start.token_index(),
            stop = ?stop.and_then(|stop| stop.token_index()),
            "synthesized error node"
        );
        node
    }

    pub(crate) fn materialize(
        &mut self,
        source: RootSource<S::Node, S::Token>,
    ) -> Result<S::Node, TreeError> {
        match source {
            RootSource::Node(node) => Ok(node),
            RootSource::Token(token) => self.store.create(Some(token)),
        }
    }

    /// Applies a `^` operator while `kids` are still pending for the current subtree.
    ///
    /// A nil `old_root` absorbs `kids` and is returned as is; the real root is
    /// not established yet. Otherwise `old_root` absorbs `kids` and becomes the
    /// child of the new root, which is returned. `kids` is always drained.
    pub fn become_root_with_kids(
        &mut self,
        old_root: S::Node,
        new_root: RootSource<S::Node, S::Token>,
        kids: &mut Vec<S::Node>,
    ) -> Result<S::Node, TreeError> {
        if self.store.is_nil(old_root) {
            trace!(?old_root, pending = kids.len(), "nil root absorbs pending kids");
            self.store.add_children(old_root, kids.drain(..))?;
            return Ok(old_root);
        }

        self.store.add_children(old_root, kids.drain(..))?;
        let new_root = self.materialize(new_root)?;
        trace!(?old_root, ?new_root, "demoting old root under new root");
        self.store.add_child(new_root, old_root)?;
        Ok(new_root)
    }

    /// Makes `new_root` the root of the already built `old_root`.
    ///
    /// ```text
    /// old=^(nil a b c), new=r       yields ^(r a b c)
    /// old=^(a b c),     new=r       yields ^(r ^(a b c))
    /// old=^(nil a b c), new=^(nil r) yields ^(r a b c)
    /// old=None,         new=^(nil r) yields ^(nil r)
    /// ```
    pub fn become_root(
        &mut self,
        new_root: RootSource<S::Node, S::Token>,
        old_root: Option<S::Node>,
    ) -> Result<S::Node, TreeError> {
        let new_root = self.materialize(new_root)?;
        let Some(old_root) = old_root else {
            return Ok(new_root);
        };

        let mut root = new_root;
        if self.store.is_nil(new_root) {
            let children = self.store.child_count(new_root);
            if children > 1 {
                debug!(?new_root, children, "nil new root has more than one child");
                return Err(TreeError::MalformedRoot { children });
            }
            if let [only] = self.store.take_children(new_root)[..] {
                root = only;
            }
        }

        trace!(?root, ?old_root, "attaching old root");
        self.store.add_child(root, old_root)?;
        Ok(root)
    }

    /// Finalizes a rule result from its accumulated root and leftover `kids`.
    ///
    /// Without a root, a single kid becomes the result on its own and several
    /// kids are gathered under a new nil node. `kids` is always drained.
    pub fn rule_post_processing_with_kids(
        &mut self,
        root: Option<S::Node>,
        kids: &mut Vec<S::Node>,
    ) -> Result<Option<S::Node>, TreeError> {
        if let Some(root) = root {
            self.store.add_children(root, kids.drain(..))?;
            return Ok(Some(root));
        }

        match kids.len() {
            0 => Ok(None),
            1 => {
                let kid = kids[0];
                kids.clear();
                // whoever invokes the rule attaches the result
                self.detach(kid);
                Ok(Some(kid))
            }
            _ => {
                let nil = self.nil()?;
                trace!(?nil, kids = kids.len(), "gathering rule result under nil");
                self.store.add_children(nil, kids.drain(..))?;
                Ok(Some(nil))
            }
        }
    }

    /// Takes `node` out of its parent's children, if it is still listed there.
    fn detach(&mut self, node: S::Node) {
        if let (Some(parent), Some(index)) = (self.store.parent(node), self.store.child_index(node))
            && self.store.child(parent, index) == Some(node)
        {
            trace!(?node, ?parent, index, "detaching promoted kid");
            self.store.delete_child(parent, index);
        }
        self.store.set_parent(node, None);
        self.store.set_child_index(node, None);
    }

    /// Collapses `^(nil x)` to `x` and an empty nil to `None`.
    pub fn rule_post_processing(&mut self, root: Option<S::Node>) -> Option<S::Node> {
        let root = root?;
        if !self.store.is_nil(root) {
            return Some(root);
        }
        match self.store.child_count(root) {
            0 => None,
            1 => self.store.take_children(root).pop(),
            _ => Some(root),
        }
    }

    /// Appends `child` to `node`; does nothing when either is missing.
    pub fn add_child(
        &mut self,
        node: Option<S::Node>,
        child: Option<S::Node>,
    ) -> Result<(), TreeError> {
        match (node, child) {
            (Some(node), Some(child)) => self.store.add_child(node, child),
            _ => Ok(()),
        }
    }

    /// Appends every kid to `node`; does nothing when `node` is missing.
    pub fn add_children<I>(&mut self, node: Option<S::Node>, kids: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = S::Node>,
    {
        match node {
            Some(node) => self.store.add_children(node, kids),
            None => Ok(()),
        }
    }

    /// Deep-copies the tree at `node` as a detached root.
    pub fn dup_tree(&mut self, node: Option<S::Node>) -> Result<Option<S::Node>, TreeError> {
        self.dup_tree_with_parent(node, None)
    }

    /// Deep-copies the tree at `node`, giving the copy `parent` and the
    /// original's child index.
    pub fn dup_tree_with_parent(
        &mut self,
        node: Option<S::Node>,
        parent: Option<S::Node>,
    ) -> Result<Option<S::Node>, TreeError> {
        let Some(node) = node else {
            return Ok(None);
        };

        let copy = self.store.dup_node(node);
        let index = self.store.child_index(node);
        self.store.set_child_index(copy, index);
        self.store.set_parent(copy, parent);

        for i in 0..self.store.child_count(node) {
            let child = self.store.child(node, i);
            if let Some(child_copy) = self.dup_tree_with_parent(child, Some(copy))? {
                self.store.add_child(copy, child_copy)?;
            }
        }
        Ok(Some(copy))
    }

    /// Returns the debug id of `node`, assigning the next one on first sight.
    pub fn unique_id(&mut self, node: S::Node) -> u32 {
        self.ids.get(node)
    }

    /// Starts a new debug session; ids restart at 1.
    pub fn reset_unique_ids(&mut self) {
        self.ids.reset();
    }

    /// Starts accumulating the result of a grammar rule.
    #[allow(clippy::unused_self)]
    pub fn start_rule(&self) -> RuleMarker<S::Node> {
        RuleMarker::new()
    }
}
