use crate::model::TokenLogit;
use crate::node::{Node, NodeArena, NodeIndex};

// ---------------------------------------------------------------------------
// expand_node
// ---------------------------------------------------------------------------

/// Materialize the children of a leaf from sampled next-token candidates.
///
/// One child per candidate, in candidate order, with `prior = exp(logprob)`
/// and `state = parent.state + token`. The child list is installed in a
/// single step, so selection never observes a partially expanded node.
///
/// Expansion runs at most once per node; the leaf must still be childless.
pub fn expand_node(arena: &mut NodeArena, leaf: NodeIndex, candidates: &[TokenLogit]) {
    debug_assert!(
        arena[leaf].is_leaf(),
        "expand_node: node already has {} children",
        arena[leaf].children().len()
    );

    let mut children = Vec::with_capacity(candidates.len());
    for cand in candidates {
        let state = format!("{}{}", arena[leaf].state(), cand.token);
        let mut child = Node::new(cand.token.clone(), cand.logprob, state);
        child.set_parent(Some(leaf));
        children.push(arena.alloc(child));
    }
    arena[leaf].set_children(children);
}

// ---------------------------------------------------------------------------
// max_subtree_value: diagnostic / invariant helper
// ---------------------------------------------------------------------------

/// Maximum `value` anywhere in the subtree rooted at `idx`.
///
/// After a correct backup pass this equals `arena[idx].value()` for every
/// node; tests lean on that.
pub fn max_subtree_value(arena: &NodeArena, idx: NodeIndex) -> f64 {
    let mut best = arena[idx].value();
    let mut stack: Vec<NodeIndex> = arena[idx].children().to_vec();
    while let Some(cur) = stack.pop() {
        best = best.max(arena[cur].value());
        stack.extend_from_slice(arena[cur].children());
    }
    best
}

// ---------------------------------------------------------------------------
// SearchTree
// ---------------------------------------------------------------------------

/// Thin lifecycle manager for the search arena and root node.
///
/// Bundles arena + root index + the original prompt. Nodes are created only
/// through expansion (the root at construction) and live until the tree is
/// dropped or reinitialized: the full tree is kept around for diagnostics.
pub struct SearchTree {
    arena: NodeArena,
    root: NodeIndex,
    prompt: String,
}

impl SearchTree {
    /// A fresh tree: single root with prior 1 whose state is the prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::root(prompt.clone()));
        Self {
            arena,
            root,
            prompt,
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Clear the arena and start over with a fresh root for `prompt`.
    pub fn reinit(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.arena.clear();
        self.root = self.arena.alloc(Node::root(self.prompt.clone()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
