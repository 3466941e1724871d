use drop_bomb::DropBomb;

use crate::{NodeStore, RootSource, TreeBuilder, TreeError};

/// The root and pending kids of one grammar rule under construction.
///
/// Created by [`TreeBuilder::start_rule`]. Must be either finished or abandoned.
pub struct RuleMarker<N> {
    root: Option<N>,
    kids: Vec<N>,
    bomb: DropBomb,
}

impl<N: Copy> RuleMarker<N> {
    pub(crate) fn new() -> Self {
        Self {
            root: None,
            kids: Vec::new(),
            bomb: DropBomb::new("RuleMarker must be either finished or abandoned"),
        }
    }

    pub fn root_node(&self) -> Option<N> {
        self.root
    }

    pub fn pending(&self) -> &[N] {
        &self.kids
    }

    /// Queues `node` as a child of whatever ends up rooting the rule.
    pub fn child(&mut self, node: N) {
        self.kids.push(node);
    }

    /// Applies a `^` operator.
    ///
    /// ```text
    /// A B^           yields ^(B A)
    /// A^ B^          yields ^(B A)
    /// A r^ B, r=(C D)     yields ^(C D A B)
    /// A r^ B, r=(nil C D) yields (nil A C D B)
    /// ```
    pub fn root<S>(
        &mut self,
        builder: &mut TreeBuilder<S>,
        source: RootSource<N, S::Token>,
    ) -> Result<(), TreeError>
    where
        S: NodeStore<Node = N>,
    {
        let root = match self.root {
            Some(old_root) => builder.become_root_with_kids(old_root, source, &mut self.kids)?,
            None => {
                let new_root = builder.materialize(source)?;
                let store = builder.store_mut();
                if store.is_nil(new_root) {
                    let existing = store.take_children(new_root);
                    store.add_children(new_root, self.kids.drain(..))?;
                    store.add_children(new_root, existing)?;
                } else {
                    store.add_children(new_root, self.kids.drain(..))?;
                }
                new_root
            }
        };
        self.root = Some(root);
        Ok(())
    }

    /// Runs rule postprocessing and returns the rule result.
    pub fn finish<S>(mut self, builder: &mut TreeBuilder<S>) -> Result<Option<N>, TreeError>
    where
        S: NodeStore<Node = N>,
    {
        self.bomb.defuse();
        builder.rule_post_processing_with_kids(self.root, &mut self.kids)
    }

    pub fn abandon(mut self) {
        self.bomb.defuse();
    }
}
