use std::ops::{Index, IndexMut};

// ---------------------------------------------------------------------------
// NodeIndex: typed arena index
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NodeIndex(u32);

impl NodeIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

// ---------------------------------------------------------------------------
// Node: one generation state in the search tree
// ---------------------------------------------------------------------------

/// Label of the root node. The root carries no token of its own; it stands
/// for the start of generation.
pub const ROOT_LABEL: &str = "<start>";

/// One tree vertex: the prompt plus every token chosen on the path here.
///
/// `label`, `prior`, and `state` are fixed at creation. The only mutable
/// fields are `visits` (bumped by selection), `value` (raised by backup),
/// and `last_score` (recorded by scoring, diagnostic only).
pub struct Node {
    label: String,
    prior: f64,
    state: String,

    value: f64,
    visits: u32,
    last_score: f64,

    children: Vec<NodeIndex>,
    parent: Option<NodeIndex>,
}

impl Node {
    /// A non-root node: `prior = exp(logprob)`, state already concatenated
    /// by the caller.
    pub fn new(label: impl Into<String>, logprob: f64, state: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prior: logprob.exp(),
            state: state.into(),
            value: 0.0,
            visits: 0,
            last_score: 0.0,
            children: Vec::new(),
            parent: None,
        }
    }

    /// The root: sentinel label, log-probability 0 (prior 1), state = prompt.
    pub fn root(prompt: impl Into<String>) -> Self {
        Self::new(ROOT_LABEL, 0.0, prompt)
    }

    // --- Getters ---

    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn prior(&self) -> f64 {
        self.prior
    }
    pub fn state(&self) -> &str {
        &self.state
    }
    pub fn value(&self) -> f64 {
        self.value
    }
    pub fn visits(&self) -> u32 {
        self.visits
    }
    pub fn last_score(&self) -> f64 {
        self.last_score
    }
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    // --- Mutation ---

    /// Count one selection pass through this node.
    pub fn bump_visits(&mut self) {
        self.visits += 1;
    }

    /// Raise `value` to `reward` if it improves it. Returns whether the
    /// value changed: backup stops ascending on the first `false`.
    pub fn raise_value(&mut self, reward: f64) -> bool {
        if reward > self.value {
            self.value = reward;
            true
        } else {
            false
        }
    }

    /// Record the most recent P-UCB score. Diagnostic only; the search
    /// never reads it back.
    pub fn set_last_score(&mut self, score: f64) {
        self.last_score = score;
    }

    pub fn set_parent(&mut self, idx: Option<NodeIndex>) {
        self.parent = idx;
    }

    /// Install the full child list in one step. Expansion runs at most once
    /// per node, so the list must still be empty.
    pub fn set_children(&mut self, children: Vec<NodeIndex>) {
        debug_assert!(
            self.children.is_empty(),
            "set_children: node already expanded with {} children",
            self.children.len()
        );
        self.children = children;
    }
}

// ---------------------------------------------------------------------------
// NodeArena: arena allocator; the arena owns every node top-down
// ---------------------------------------------------------------------------

pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(cap),
        }
    }

    pub fn alloc(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(node);
        idx
    }

    pub fn get(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.as_usize()]
    }

    pub fn get_mut(&mut self, idx: NodeIndex) -> &mut Node {
        &mut self.nodes[idx.as_usize()]
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeIndex> for NodeArena {
    type Output = Node;
    fn index(&self, idx: NodeIndex) -> &Self::Output {
        self.get(idx)
    }
}

impl IndexMut<NodeIndex> for NodeArena {
    fn index_mut(&mut self, idx: NodeIndex) -> &mut Self::Output {
        self.get_mut(idx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
