pub mod cache;
pub mod model;
pub mod node;
pub mod search;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_util;

pub use cache::ProgramCache;
pub use model::{
    CompletionOptions, LanguageModel, ModelError, RewardEvaluator, TokenLogit,
};
pub use node::{Node, NodeArena, NodeIndex, ROOT_LABEL};
pub use search::{
    backup, run_search, select_child, SearchConfig, SearchError, SearchOutcome,
};
pub use tree::{expand_node, max_subtree_value, SearchTree};
