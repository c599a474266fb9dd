use std::fmt;
use std::time::Instant;

use crate::cache::ProgramCache;
use crate::model::{CompletionOptions, LanguageModel, ModelError, RewardEvaluator};
use crate::node::{NodeArena, NodeIndex};
use crate::tree::{expand_node, SearchTree};

// ---------------------------------------------------------------------------
// SearchConfig
// ---------------------------------------------------------------------------

/// Search configuration: immutable, passed explicitly into the rollout
/// loop (no ambient hyperparameter state).
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// P-UCB exploration base (`c_base` in the beta term).
    pub c_base: f64,
    /// P-UCB exploration offset (`c` in the beta term).
    pub c: f64,
    /// Children created per expansion.
    pub top_k: usize,
    /// Rollout budget per task.
    pub max_rollouts: u32,
    /// Completion length cap handed to the sampler.
    pub max_tokens: u32,
    /// Sampling temperature handed to the sampler.
    pub temperature: f32,
    /// Beam width handed to the sampler. Forwarded verbatim; samplers that
    /// only support width 1 still yield a correct search.
    pub beam_width: u32,
    /// Stop sequences terminating a completion.
    pub stop: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            c_base: 10.0,
            c: 4.0,
            top_k: 3,
            max_rollouts: 128,
            max_tokens: 256,
            temperature: 0.2,
            beam_width: 1,
            stop: Vec::new(),
        }
    }
}

impl SearchConfig {
    /// Reject configurations the rollout loop cannot run with.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.top_k == 0 {
            return Err(SearchError::Config("top_k must be >= 1".into()));
        }
        if self.max_rollouts == 0 {
            return Err(SearchError::Config("max_rollouts must be >= 1".into()));
        }
        if self.max_tokens == 0 {
            return Err(SearchError::Config("max_tokens must be >= 1".into()));
        }
        if self.beam_width == 0 {
            return Err(SearchError::Config("beam_width must be >= 1".into()));
        }
        if self.c_base <= 0.0 {
            return Err(SearchError::Config("c_base must be positive".into()));
        }
        Ok(())
    }

    fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            beam_width: self.beam_width,
            stop: self.stop.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// SearchError
// ---------------------------------------------------------------------------

/// Error surfaced by the per-task search entry point. The search never
/// retries or swallows; the caller decides what a failed task means.
#[derive(Debug)]
pub enum SearchError {
    /// Invalid configuration, rejected before any rollout runs.
    Config(String),
    /// The token or completion sampler failed or returned malformed output.
    Model(ModelError),
    /// The reward evaluator failed.
    Eval(ModelError),
    /// Rollouts finished without a single cached program to pick from.
    NoPrograms,
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "invalid search configuration: {msg}"),
            Self::Model(e) => write!(f, "model error: {e}"),
            Self::Eval(e) => write!(f, "evaluator error: {e}"),
            Self::NoPrograms => write!(f, "no generated programs to select from"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(e) | Self::Eval(e) => Some(e),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// P-UCB selection
// ---------------------------------------------------------------------------

/// beta(s) = ln((s.visits + c_base + 1) / c_base) + c
fn beta(parent_visits: u32, config: &SearchConfig) -> f64 {
    ((parent_visits as f64 + config.c_base + 1.0) / config.c_base).ln() + config.c
}

/// Pick the child of `parent` with the greatest P-UCB score, recording the
/// score on every child (`last_score`, diagnostic only).
///
/// score(a) = a.value + beta(s) * a.prior * sqrt(ln(s.visits)) / (1 + a.visits)
///
/// Strictly-greater comparison, so equal scores resolve to the earliest
/// child in stored order. With `parent.visits == 1` the exploration term is
/// 0 (ln 1 = 0) and the rule degenerates to pure exploitation: expected.
pub fn select_child(arena: &mut NodeArena, parent: NodeIndex, config: &SearchConfig) -> NodeIndex {
    let parent_visits = arena[parent].visits();
    debug_assert!(
        parent_visits >= 1,
        "select_child: parent entered selection without a visit"
    );
    debug_assert!(
        !arena[parent].is_leaf(),
        "select_child: parent has no children"
    );

    let b = beta(parent_visits, config);
    let explore_scale = b * (parent_visits as f64).ln().sqrt();

    let children: Vec<NodeIndex> = arena[parent].children().to_vec();
    let mut best = children[0];
    let mut best_score = f64::NEG_INFINITY;
    for idx in children {
        let child = &arena[idx];
        let score =
            child.value() + explore_scale * child.prior() / (1.0 + child.visits() as f64);
        arena[idx].set_last_score(score);
        if score > best_score {
            best = idx;
            best_score = score;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// backup
// ---------------------------------------------------------------------------

/// Propagate `reward` from `leaf` to the root as a running max.
///
/// Iterative walk up the non-owning parent indices: no recursion, so deep
/// generations cannot exhaust the call stack. Stops at the first node whose
/// value already dominates the reward: everything above it dominates too,
/// because a parent's value is never below a child's.
pub fn backup(arena: &mut NodeArena, leaf: NodeIndex, reward: f64) {
    let mut current = Some(leaf);
    while let Some(idx) = current {
        if !arena[idx].raise_value(reward) {
            break;
        }
        current = arena[idx].parent();
    }
}

// ---------------------------------------------------------------------------
// SearchOutcome
// ---------------------------------------------------------------------------

/// Result of one per-task search.
#[derive(Clone, Debug)]
#[must_use]
pub struct SearchOutcome {
    /// Best completion found, with the prompt stripped.
    pub completion: String,
    /// Reward of that completion.
    pub best_reward: f64,
    /// Rollouts actually performed (1-based index of the early-exit rollout,
    /// or the full budget).
    pub rollouts_used: u32,
    /// Distinct programs generated and evaluated.
    pub programs_generated: usize,
    /// Evaluations avoided by the program cache.
    pub cache_hits: u32,
    /// External evaluator invocations.
    pub num_evals: u32,
    /// Wall time spent inside the evaluator.
    pub total_eval_secs: f64,
}

impl SearchOutcome {
    pub fn mean_eval_secs(&self) -> f64 {
        if self.num_evals > 0 {
            self.total_eval_secs / self.num_evals as f64
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// run_search: the rollout controller
// ---------------------------------------------------------------------------

/// Run up to `max_rollouts` rollouts of select → expand → evaluate → backup
/// on `tree`, then return the best cached program.
///
/// The loop exits early as soon as a rollout resolves a perfect reward
/// (1.0), recording that rollout's 1-based index. Model or evaluator
/// failures abort the whole task search; the tree is per-task and gets
/// discarded by the caller on failure, so partially applied visit counts
/// are not rolled back.
pub fn run_search(
    tree: &mut SearchTree,
    task_id: &str,
    model: &dyn LanguageModel,
    evaluator: &dyn RewardEvaluator,
    config: &SearchConfig,
) -> Result<SearchOutcome, SearchError> {
    config.validate()?;

    let options = config.completion_options();
    let prompt = tree.prompt().to_owned();
    let root = tree.root();
    let arena = tree.arena_mut();

    let mut cache = ProgramCache::new();
    let mut rollouts_used = config.max_rollouts;
    let mut cache_hits = 0u32;
    let mut num_evals = 0u32;
    let mut total_eval_secs = 0.0f64;

    for rollout in 0..config.max_rollouts {
        // Selection: descend while children exist, counting every entry.
        let mut current = root;
        arena[current].bump_visits();
        while !arena[current].is_leaf() {
            current = select_child(arena, current, config);
            arena[current].bump_visits();
        }

        // Expansion: one child per sampled candidate. A sampler may return
        // fewer than k candidates; zero leaves the node a leaf, and a later
        // rollout will ask again.
        let candidates = model
            .top_k_tokens(arena[current].state(), config.top_k)
            .map_err(SearchError::Model)?;
        if !candidates.is_empty() {
            expand_node(arena, current, &candidates);
        }

        // Evaluation: cached reward for this prefix, or a full completion
        // plus an external test run.
        let reward = match cache.lookup_prefix(arena[current].state()) {
            Some(reward) => {
                cache_hits += 1;
                reward
            }
            None => {
                let program = model
                    .complete(arena[current].state(), &options)
                    .map_err(SearchError::Model)?;
                let completion = program.strip_prefix(prompt.as_str()).ok_or_else(|| {
                    SearchError::Model(ModelError::msg(
                        "completion does not extend the original prompt",
                    ))
                })?;

                let eval_start = Instant::now();
                let reward = evaluator
                    .evaluate(task_id, completion)
                    .map_err(SearchError::Eval)?;
                total_eval_secs += eval_start.elapsed().as_secs_f64();
                num_evals += 1;

                if !(0.0..=1.0).contains(&reward) {
                    return Err(SearchError::Eval(ModelError::msg(format!(
                        "reward {reward} outside [0, 1]"
                    ))));
                }
                cache.insert(program, reward);
                reward
            }
        };

        // Backpropagation.
        backup(arena, current, reward);

        if reward >= 1.0 {
            rollouts_used = rollout + 1;
            break;
        }
    }

    let (program, best_reward) = cache.best().ok_or(SearchError::NoPrograms)?;
    let completion = program.strip_prefix(prompt.as_str()).unwrap_or(program);

    Ok(SearchOutcome {
        completion: completion.to_owned(),
        best_reward,
        rollouts_used,
        programs_generated: cache.len(),
        cache_hits,
        num_evals,
        total_eval_secs,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
