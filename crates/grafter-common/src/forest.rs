//! Arena storage for every node built during a parse.
//!
//! Nodes are never freed individually: a node detached from every tree simply
//! stays in the arena until the forest is dropped.

use std::mem;

use grafter_errors::Diagnostic;
use grafter_tree::{INVALID_TOKEN_TYPE, NodeStore, Token as _, TokenStream, TreeError};
use la_arena::{Arena, Idx};
use tracing::trace;

use crate::{CommonToken, ErrorNode, RecognitionError};

pub type NodeId = Idx<Node>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A container whose children belong to whatever subsumes it.
    Nil,
    Token(CommonToken),
    Error(Box<ErrorNode>),
}

#[derive(Debug)]
pub struct Node {
    payload: Payload,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    child_index: Option<usize>,
    token_start: Option<usize>,
    token_stop: Option<usize>,
}

impl Node {
    fn new(payload: Payload) -> Self {
        Self {
            payload,
            children: Vec::new(),
            parent: None,
            child_index: None,
            token_start: None,
            token_stop: None,
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

#[derive(Debug, Default)]
pub struct Forest {
    nodes: Arena<Node>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { nodes: Arena::with_capacity(capacity) }
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, node: NodeId) -> &Node {
        &self.nodes[node]
    }

    pub fn token(&self, node: NodeId) -> Option<&CommonToken> {
        match &self.nodes[node].payload {
            Payload::Token(token) => Some(token),
            Payload::Nil | Payload::Error(_) => None,
        }
    }

    pub fn error(&self, node: NodeId) -> Option<&ErrorNode> {
        match &self.nodes[node].payload {
            Payload::Error(error) => Some(error),
            Payload::Nil | Payload::Token(_) => None,
        }
    }

    fn alloc(&mut self, payload: Payload) -> NodeId {
        self.nodes.alloc(Node::new(payload))
    }

    /// Appends `kid` as the last child of `node`, taking it away from any
    /// previous parent.
    fn push_child(&mut self, node: NodeId, kid: NodeId) {
        self.detach(kid);
        let index = self.nodes[node].children.len();
        self.nodes[node].children.push(kid);
        let kid = &mut self.nodes[kid];
        kid.parent = Some(node);
        kid.child_index = Some(index);
    }

    /// Removes `kid` from its parent's children if it is still listed there.
    fn detach(&mut self, kid: NodeId) {
        let Node { parent, child_index, .. } = self.nodes[kid];
        if let (Some(parent), Some(index)) = (parent, child_index)
            && self.nodes[parent].children.get(index) == Some(&kid)
        {
            self.nodes[parent].children.remove(index);
            self.freshen_parent_and_child_indexes(parent, index);
        }
        let kid = &mut self.nodes[kid];
        kid.parent = None;
        kid.child_index = None;
    }

    /// Rewrites parent and child index of every child of `node` from `offset` on.
    pub fn freshen_parent_and_child_indexes(&mut self, node: NodeId, offset: usize) {
        let children = mem::take(&mut self.nodes[node].children);
        for (index, &kid) in children.iter().enumerate().skip(offset) {
            let kid = &mut self.nodes[kid];
            kid.parent = Some(node);
            kid.child_index = Some(index);
        }
        self.nodes[node].children = children;
    }

    /// Replaces the children `start..=stop` of `parent` with `new_tree`, or with
    /// its children if it is nil.
    pub fn replace_children(
        &mut self,
        parent: NodeId,
        start: usize,
        stop: usize,
        new_tree: NodeId,
    ) -> Result<(), TreeError> {
        let len = self.nodes[parent].children.len();
        if start > stop || stop >= len {
            return Err(TreeError::IndexOutOfBounds { index: stop.max(start), len });
        }
        if new_tree == parent {
            return Err(TreeError::SelfAppend);
        }

        let replacement = if self.is_nil(new_tree) {
            self.take_children(new_tree)
        } else {
            self.detach(new_tree);
            vec![new_tree]
        };
        trace!(?parent, start, stop, count = replacement.len(), "replacing children");
        let removed: Vec<_> =
            self.nodes[parent].children.splice(start..=stop, replacement).collect();
        for kid in removed {
            let kid = &mut self.nodes[kid];
            kid.parent = None;
            kid.child_index = None;
        }
        self.freshen_parent_and_child_indexes(parent, start);
        Ok(())
    }

    /// Records which input tokens `node` spans.
    pub fn set_token_boundaries(
        &mut self,
        node: NodeId,
        start: Option<&CommonToken>,
        stop: Option<&CommonToken>,
    ) {
        let node = &mut self.nodes[node];
        node.token_start = start.and_then(|token| token.token_index());
        node.token_stop = stop.and_then(|token| token.token_index());
    }

    /// First input token of `node`, falling back to its own token.
    pub fn token_start_index(&self, node: NodeId) -> Option<usize> {
        let data = &self.nodes[node];
        data.token_start.or_else(|| self.token(node).and_then(|token| token.token_index()))
    }

    /// Last input token of `node`, falling back to its own token.
    pub fn token_stop_index(&self, node: NodeId) -> Option<usize> {
        let data = &self.nodes[node];
        data.token_stop.or_else(|| self.token(node).and_then(|token| token.token_index()))
    }

    /// Fills in missing boundaries bottom-up from the first and last child.
    pub fn set_unknown_token_boundaries(&mut self, node: NodeId) {
        let children = self.nodes[node].children.clone();
        for &kid in &children {
            self.set_unknown_token_boundaries(kid);
        }
        if self.nodes[node].token_start.is_some() && self.nodes[node].token_stop.is_some() {
            return;
        }
        let (Some(&first), Some(&last)) = (children.first(), children.last()) else {
            return;
        };
        let start = self.token_start_index(first);
        let stop = self.token_stop_index(last);
        let data = &mut self.nodes[node];
        data.token_start = start;
        data.token_stop = stop;
    }

    /// Verifies that every parent link and child index below `root` agrees with
    /// the children lists.
    pub fn check_links(&self, root: NodeId) -> Result<(), TreeError> {
        let mut stack = vec![(root, self.nodes[root].parent, self.nodes[root].child_index)];
        while let Some((node, parent, index)) = stack.pop() {
            let data = &self.nodes[node];
            if data.parent != parent {
                return Err(TreeError::BrokenLink {
                    detail: format!(
                        "parents don't match for {node:?}; expected {parent:?} found {:?}",
                        data.parent
                    ),
                });
            }
            if data.child_index != index {
                return Err(TreeError::BrokenLink {
                    detail: format!(
                        "child indexes don't match for {node:?}; expected {index:?} found {:?}",
                        data.child_index
                    ),
                });
            }
            for (i, &kid) in data.children.iter().enumerate() {
                stack.push((kid, Some(node), Some(i)));
            }
        }
        Ok(())
    }

    /// Renders `node` alone: its text, `nil`, or the error description.
    pub fn node_text(&self, node: NodeId) -> String {
        match &self.nodes[node].payload {
            Payload::Nil => "nil".to_owned(),
            Payload::Token(token) => token.text().unwrap_or("<no text>").to_owned(),
            Payload::Error(error) => error.to_string(),
        }
    }

    /// Renders the tree as `(root child (sub child))`; nil roots print their
    /// children as a bare list.
    pub fn to_string_tree(&self, node: NodeId) -> String {
        let mut buf = String::new();
        self.write_tree(node, &mut buf);
        buf
    }

    fn write_tree(&self, node: NodeId, buf: &mut String) {
        let data = &self.nodes[node];
        if data.children.is_empty() {
            buf.push_str(&self.node_text(node));
            return;
        }
        let nil = self.is_nil(node);
        if !nil {
            buf.push('(');
            buf.push_str(&self.node_text(node));
            buf.push(' ');
        }
        for (i, &kid) in data.children.iter().enumerate() {
            if i > 0 {
                buf.push(' ');
            }
            self.write_tree(kid, buf);
        }
        if !nil {
            buf.push(')');
        }
    }

    /// Collects one diagnostic per error node below `root`, in tree order.
    pub fn diagnostics(&self, root: NodeId) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if let Some(error) = self.error(node)
                && let Some(range) = error.range()
            {
                let message = error.error().to_string();
                diagnostics.push(Diagnostic::new(message, range, error.text()));
            }
            stack.extend(self.nodes[node].children.iter().rev());
        }
        diagnostics
    }
}

impl NodeStore for Forest {
    type Node = NodeId;
    type Token = CommonToken;
    type RecognitionError = RecognitionError;

    fn create(&mut self, payload: Option<CommonToken>) -> Result<NodeId, TreeError> {
        Ok(self.alloc(payload.map_or(Payload::Nil, Payload::Token)))
    }

    fn create_token(&mut self, token_type: i32, text: Option<&str>) -> CommonToken {
        CommonToken::imaginary(token_type, text)
    }

    fn create_token_from(&mut self, from: &CommonToken) -> CommonToken {
        from.clone()
    }

    fn error_node<S>(
        &mut self,
        input: &S,
        start: &CommonToken,
        stop: Option<&CommonToken>,
        error: RecognitionError,
    ) -> NodeId
    where
        S: TokenStream<Token = CommonToken> + ?Sized,
    {
        let error = ErrorNode::new(input, start, stop, error);
        let start = error.start().token_index();
        let stop = error.stop().token_index();
        let node = self.alloc(Payload::Error(Box::new(error)));
        let data = &mut self.nodes[node];
        data.token_start = start;
        data.token_stop = stop;
        node
    }

    fn dup_node(&mut self, node: NodeId) -> NodeId {
        let data = &self.nodes[node];
        let mut copy = Node::new(data.payload.clone());
        copy.token_start = data.token_start;
        copy.token_stop = data.token_stop;
        self.nodes.alloc(copy)
    }

    fn is_nil(&self, node: NodeId) -> bool {
        matches!(self.nodes[node].payload, Payload::Nil)
    }

    fn token_type(&self, node: NodeId) -> i32 {
        match &self.nodes[node].payload {
            Payload::Token(token) => token.token_type(),
            Payload::Nil | Payload::Error(_) => INVALID_TOKEN_TYPE,
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node].payload {
            Payload::Token(token) => token.text(),
            Payload::Error(error) => Some(error.text()),
            Payload::Nil => None,
        }
    }

    fn set_token_type(&mut self, node: NodeId, token_type: i32) -> Result<(), TreeError> {
        match &mut self.nodes[node].payload {
            Payload::Token(token) => {
                token.set_token_type(token_type);
                Ok(())
            }
            Payload::Nil | Payload::Error(_) => {
                Err(TreeError::Unsupported { operation: "set_token_type" })
            }
        }
    }

    fn set_text(&mut self, node: NodeId, text: Option<String>) -> Result<(), TreeError> {
        match &mut self.nodes[node].payload {
            Payload::Token(token) => {
                token.set_text(text);
                Ok(())
            }
            Payload::Nil | Payload::Error(_) => Err(TreeError::Unsupported { operation: "set_text" }),
        }
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].children
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) {
        self.nodes[node].parent = parent;
    }

    fn child_index(&self, node: NodeId) -> Option<usize> {
        self.nodes[node].child_index
    }

    fn set_child_index(&mut self, node: NodeId, index: Option<usize>) {
        self.nodes[node].child_index = index;
    }

    fn add_child(&mut self, node: NodeId, child: NodeId) -> Result<(), TreeError> {
        if node == child {
            return Err(TreeError::SelfAppend);
        }
        if self.is_nil(child) {
            // move the list over; the nil container ends up empty
            trace!(?node, ?child, "splicing nil child");
            for kid in self.take_children(child) {
                self.push_child(node, kid);
            }
        } else {
            self.push_child(node, child);
        }
        Ok(())
    }

    fn set_child(&mut self, node: NodeId, index: usize, child: NodeId) -> Result<(), TreeError> {
        if self.is_nil(child) {
            return Err(TreeError::NilChild);
        }
        let len = self.nodes[node].children.len();
        if index >= len {
            return Err(TreeError::IndexOutOfBounds { index, len });
        }
        if self.nodes[node].children[index] == child {
            return Ok(());
        }
        self.detach(child);
        // detaching may have shifted our own children if `child` was a sibling
        let len = self.nodes[node].children.len();
        let Some(slot) = self.nodes[node].children.get_mut(index) else {
            return Err(TreeError::IndexOutOfBounds { index, len });
        };
        let old = mem::replace(slot, child);
        let old = &mut self.nodes[old];
        old.parent = None;
        old.child_index = None;
        let child = &mut self.nodes[child];
        child.parent = Some(node);
        child.child_index = Some(index);
        Ok(())
    }

    fn delete_child(&mut self, node: NodeId, index: usize) -> Option<NodeId> {
        if index >= self.nodes[node].children.len() {
            return None;
        }
        let kid = self.nodes[node].children.remove(index);
        let data = &mut self.nodes[kid];
        data.parent = None;
        data.child_index = None;
        self.freshen_parent_and_child_indexes(node, index);
        Some(kid)
    }

    fn take_children(&mut self, node: NodeId) -> Vec<NodeId> {
        let children = mem::take(&mut self.nodes[node].children);
        for &kid in &children {
            let kid = &mut self.nodes[kid];
            kid.parent = None;
            kid.child_index = None;
        }
        children
    }
}
