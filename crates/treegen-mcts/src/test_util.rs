//! Scripted model and evaluator doubles for engine tests.

use std::sync::atomic::{AtomicU32, Ordering::Relaxed};

use crate::model::{
    CompletionOptions, LanguageModel, ModelError, RewardEvaluator, TokenLogit,
};

// ---------------------------------------------------------------------------
// FnModel: closure-backed language model
// ---------------------------------------------------------------------------

/// Language model scripted by two closures: one for top-k priors, one for
/// full completions. Completions must return state + continuation, like a
/// real sampler.
pub(crate) struct FnModel<T, C>
where
    T: Fn(&str, usize) -> Vec<TokenLogit> + Send + Sync,
    C: Fn(&str) -> String + Send + Sync,
{
    pub top_k: T,
    pub complete: C,
}

impl<T, C> LanguageModel for FnModel<T, C>
where
    T: Fn(&str, usize) -> Vec<TokenLogit> + Send + Sync,
    C: Fn(&str) -> String + Send + Sync,
{
    fn top_k_tokens(&self, state: &str, k: usize) -> Result<Vec<TokenLogit>, ModelError> {
        Ok((self.top_k)(state, k))
    }

    fn complete(&self, state: &str, _options: &CompletionOptions) -> Result<String, ModelError> {
        Ok((self.complete)(state))
    }
}

// ---------------------------------------------------------------------------
// FnEvaluator: closure-backed reward evaluator
// ---------------------------------------------------------------------------

pub(crate) struct FnEvaluator<F>
where
    F: Fn(&str, &str) -> f64 + Send + Sync,
{
    pub eval: F,
}

impl<F> RewardEvaluator for FnEvaluator<F>
where
    F: Fn(&str, &str) -> f64 + Send + Sync,
{
    fn evaluate(&self, task_id: &str, completion: &str) -> Result<f64, ModelError> {
        Ok((self.eval)(task_id, completion))
    }
}

// ---------------------------------------------------------------------------
// CountingEvaluator: call-indexed rewards
// ---------------------------------------------------------------------------

/// Counts evaluator invocations; returns 1.0 on exactly one call index
/// (1-based) when the completion contains the needle, 0.0 otherwise.
/// Exercises early exit and cache idempotence.
pub(crate) struct CountingEvaluator {
    calls: AtomicU32,
    perfect_call: u32,
    needle: String,
}

impl CountingEvaluator {
    pub fn perfect_on(call: u32, needle: impl Into<String>) -> Self {
        Self {
            calls: AtomicU32::new(0),
            perfect_call: call,
            needle: needle.into(),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Relaxed)
    }
}

impl RewardEvaluator for CountingEvaluator {
    fn evaluate(&self, _task_id: &str, completion: &str) -> Result<f64, ModelError> {
        let call = self.calls.fetch_add(1, Relaxed) + 1;
        if call == self.perfect_call && completion.contains(&self.needle) {
            Ok(1.0)
        } else {
            Ok(0.0)
        }
    }
}

// ---------------------------------------------------------------------------
// Failing doubles
// ---------------------------------------------------------------------------

/// Model whose every call fails, as an unreachable sampler would.
pub(crate) struct FailingModel;

impl LanguageModel for FailingModel {
    fn top_k_tokens(&self, _state: &str, _k: usize) -> Result<Vec<TokenLogit>, ModelError> {
        Err(ModelError::msg("token sampler unreachable"))
    }

    fn complete(&self, _state: &str, _options: &CompletionOptions) -> Result<String, ModelError> {
        Err(ModelError::msg("completion sampler unreachable"))
    }
}

/// Evaluator whose every call fails, as a broken test harness would.
pub(crate) struct FailingEvaluator;

impl RewardEvaluator for FailingEvaluator {
    fn evaluate(&self, _task_id: &str, _completion: &str) -> Result<f64, ModelError> {
        Err(ModelError::msg("test harness crashed"))
    }
}
