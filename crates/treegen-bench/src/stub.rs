//! Deterministic stand-ins for the sampler and the test harness, used by
//! the benchmark binary and the driver tests. No network, no subprocess:
//! token priors and completions are derived from a hash of the state, so
//! the same seed always reproduces the same search.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use treegen_mcts::{CompletionOptions, LanguageModel, ModelError, RewardEvaluator, TokenLogit};

// ---------------------------------------------------------------------------
// StubModel
// ---------------------------------------------------------------------------

const VOCAB: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "return", "if ", "else ", "x", "y", "(", ")", " + ", "\n",
];

/// Hash-seeded fake language model over a tiny fixed vocabulary.
///
/// `top_k_tokens` draws `k` distinct vocabulary entries with synthetic
/// logprobs in descending order; `complete` extends the state one drawn
/// token at a time until `max_tokens`, a stop sequence, or the vocabulary's
/// newline ends the program. Both are pure functions of `(seed, state)`.
pub struct StubModel {
    seed: u64,
}

impl StubModel {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, state: &str) -> SmallRng {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        state.hash(&mut hasher);
        SmallRng::seed_from_u64(hasher.finish())
    }
}

impl LanguageModel for StubModel {
    fn top_k_tokens(&self, state: &str, k: usize) -> Result<Vec<TokenLogit>, ModelError> {
        let mut rng = self.rng_for(state);
        let k = k.min(VOCAB.len());

        let mut picks: Vec<usize> = Vec::with_capacity(k);
        while picks.len() < k {
            let i = rng.gen_range(0..VOCAB.len());
            if !picks.contains(&i) {
                picks.push(i);
            }
        }

        // Descending synthetic logprobs, so the first pick is the favorite.
        Ok(picks
            .into_iter()
            .enumerate()
            .map(|(rank, i)| TokenLogit {
                token: VOCAB[i].to_string(),
                logprob: -0.2 - rank as f64 * 0.9,
            })
            .collect())
    }

    fn complete(&self, state: &str, options: &CompletionOptions) -> Result<String, ModelError> {
        let mut rng = self.rng_for(state);
        let mut out = String::from(state);
        let generated_at = out.len();

        for _ in 0..options.max_tokens {
            let token = VOCAB[rng.gen_range(0..VOCAB.len())];
            out.push_str(token);
            // Stop sequences only match generated text, never the prompt.
            if let Some(stop) = options
                .stop
                .iter()
                .filter_map(|s| out[generated_at..].find(s).map(|at| generated_at + at + s.len()))
                .min()
            {
                out.truncate(stop);
                break;
            }
            if token == "\n" {
                break;
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// CoverageEvaluator
// ---------------------------------------------------------------------------

/// Reward = fraction of target substrings present in the completion.
/// A crude stand-in for a test suite's pass rate: each target is one
/// "test", passing when its text shows up.
pub struct CoverageEvaluator {
    targets: Vec<String>,
}

impl CoverageEvaluator {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }
}

impl RewardEvaluator for CoverageEvaluator {
    fn evaluate(&self, _task_id: &str, completion: &str) -> Result<f64, ModelError> {
        if self.targets.is_empty() {
            return Ok(0.0);
        }
        let hit = self
            .targets
            .iter()
            .filter(|t| completion.contains(t.as_str()))
            .count();
        Ok(hit as f64 / self.targets.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
