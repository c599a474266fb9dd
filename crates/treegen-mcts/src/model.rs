use std::fmt;

// ---------------------------------------------------------------------------
// ModelError: error type for external collaborator failures
// ---------------------------------------------------------------------------

/// Error from an external collaborator (model server, test harness, ...).
///
/// Wraps `Box<dyn Error + Send + Sync>` so `treegen-mcts` stays decoupled
/// from any particular inference or execution stack.
#[derive(Debug)]
pub struct ModelError(Box<dyn std::error::Error + Send + Sync>);

impl ModelError {
    /// Wrap any error into a ModelError.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }

    /// Create from a string message.
    pub fn msg(msg: impl Into<String>) -> Self {
        Self(msg.into().into())
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<String> for ModelError {
    fn from(s: String) -> Self {
        Self::msg(s)
    }
}

// ---------------------------------------------------------------------------
// TokenLogit: one next-token candidate
// ---------------------------------------------------------------------------

/// A candidate next token with its log-probability under the model.
///
/// The search derives the node prior as `logprob.exp()`; the raw
/// log-probability is what inference stacks hand out.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenLogit {
    pub token: String,
    pub logprob: f64,
}

impl TokenLogit {
    pub fn new(token: impl Into<String>, logprob: f64) -> Self {
        Self {
            token: token.into(),
            logprob,
        }
    }
}

// ---------------------------------------------------------------------------
// CompletionOptions: sampling knobs forwarded to the model
// ---------------------------------------------------------------------------

/// Sampling parameters for a full completion.
///
/// `beam_width` is forwarded even to samplers that only support width 1;
/// the search is correct regardless of what the sampler actually does
/// with it.
#[derive(Clone, Debug)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub beam_width: u32,
    pub stop: Vec<String>,
}

// ---------------------------------------------------------------------------
// LanguageModel trait
// ---------------------------------------------------------------------------

/// Clean boundary between search and token generation.
///
/// The search asks for top-k next-token priors at a state, and for full
/// completions from a state. It doesn't know whether the other side is a
/// local GGUF model, an HTTP endpoint, or a scripted test double.
///
/// `Send + Sync` because a model handle is shared across per-task runs.
pub trait LanguageModel: Send + Sync {
    /// Up to `k` next-token candidates at `state`, in model order.
    /// Blocking call.
    fn top_k_tokens(&self, state: &str, k: usize) -> Result<Vec<TokenLogit>, ModelError>;

    /// Full generation: returns `state` plus the newly generated
    /// continuation, terminated at `max_tokens` or any stop sequence.
    /// Blocking call.
    fn complete(&self, state: &str, options: &CompletionOptions) -> Result<String, ModelError>;
}

// ---------------------------------------------------------------------------
// RewardEvaluator trait
// ---------------------------------------------------------------------------

/// Boundary to the test-execution harness.
///
/// Returns the fraction of the task's test suite the completion passes,
/// in [0, 1]. A single blocking call from the search's perspective; an
/// implementation may fan the completion out across test cases internally
/// as long as it joins to one number before returning.
pub trait RewardEvaluator: Send + Sync {
    fn evaluate(&self, task_id: &str, completion: &str) -> Result<f64, ModelError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
