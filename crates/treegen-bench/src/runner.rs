//! Per-task benchmark loop: run one search per task, append one record per
//! task to the result sink, aggregate run-level stats.

use std::io;
use std::time::Instant;

use serde::Serialize;
use treegen_mcts::{
    run_search, LanguageModel, RewardEvaluator, SearchConfig, SearchError, SearchOutcome,
    SearchTree,
};

use crate::jsonl::JsonlSink;

// ---------------------------------------------------------------------------
// RunnerError: wraps search + I/O errors
// ---------------------------------------------------------------------------

/// Error from the benchmark driver: a search failure that was fatal to the
/// whole run, or an I/O error from the result sink.
#[derive(Debug)]
pub enum RunnerError {
    Search(SearchError),
    Io(io::Error),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Search(e) => write!(f, "search error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Search(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<SearchError> for RunnerError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

impl From<io::Error> for RunnerError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Task / TaskRecord
// ---------------------------------------------------------------------------

/// One benchmark problem: an identifier the evaluator recognizes, and the
/// fully assembled prompt (prompt templating happens upstream).
#[derive(Clone, Debug)]
pub struct Task {
    pub id: String,
    pub prompt: String,
}

impl Task {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
        }
    }
}

/// Per-task search statistics, nested inside the output record.
#[derive(Serialize, Clone, Debug)]
pub struct TaskStats {
    pub num_rollouts: u32,
    pub num_generations: usize,
    pub eval_time: String,
    pub mean_test_time: String,
}

/// The one record appended to the JSONL sink per processed task.
#[derive(Serialize, Clone, Debug)]
pub struct TaskRecord {
    pub task_id: String,
    pub completion: String,
    pub stats: TaskStats,
}

/// Build the boundary record from a finished search.
pub fn make_record(task: &Task, outcome: &SearchOutcome, elapsed_secs: f64) -> TaskRecord {
    TaskRecord {
        task_id: task.id.clone(),
        completion: outcome.completion.clone(),
        stats: TaskStats {
            num_rollouts: outcome.rollouts_used,
            num_generations: outcome.programs_generated,
            eval_time: format!("{elapsed_secs:.4}s"),
            mean_test_time: format!("{:.4}s", outcome.mean_eval_secs()),
        },
    }
}

// ---------------------------------------------------------------------------
// RunStats / RunReport
// ---------------------------------------------------------------------------

/// Aggregate stats over a whole benchmark run.
#[derive(Clone, Debug)]
pub struct RunStats {
    pub total_tasks: u32,
    pub completed: u32,
    pub failed: u32,
    /// Tasks whose best program passed every test.
    pub solved: u32,
    pub total_rollouts: u64,
    pub total_programs: u64,
    pub total_evals: u64,
    pub elapsed_secs: f64,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            total_tasks: 0,
            completed: 0,
            failed: 0,
            solved: 0,
            total_rollouts: 0,
            total_programs: 0,
            total_evals: 0,
            elapsed_secs: 0.0,
        }
    }

    fn add_outcome(&mut self, outcome: &SearchOutcome) {
        self.completed += 1;
        if outcome.best_reward >= 1.0 {
            self.solved += 1;
        }
        self.total_rollouts += outcome.rollouts_used as u64;
        self.total_programs += outcome.programs_generated as u64;
        self.total_evals += outcome.num_evals as u64;
    }

    pub fn solve_rate(&self) -> f64 {
        if self.completed > 0 {
            self.solved as f64 / self.completed as f64
        } else {
            0.0
        }
    }

    pub fn mean_rollouts(&self) -> f64 {
        if self.completed > 0 {
            self.total_rollouts as f64 / self.completed as f64
        } else {
            0.0
        }
    }

    pub fn rollouts_per_second(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.total_rollouts as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// What a run produced: aggregate stats plus the per-task failures that
/// were skipped over (a failing task aborts that task only, not the run).
pub struct RunReport {
    pub stats: RunStats,
    pub failures: Vec<(String, SearchError)>,
}

// ---------------------------------------------------------------------------
// run_tasks
// ---------------------------------------------------------------------------

/// Run the search once per task, appending a record per completed task.
///
/// A sampler or evaluator failure aborts the current task's search (its
/// tree is discarded) and the loop moves on; the failure is reported in
/// the `RunReport`. Sink I/O failures abort the whole run.
pub fn run_tasks(
    tasks: &[Task],
    model: &dyn LanguageModel,
    evaluator: &dyn RewardEvaluator,
    config: &SearchConfig,
    sink: &mut JsonlSink,
) -> Result<RunReport, RunnerError> {
    let run_start = Instant::now();
    let mut stats = RunStats::new();
    let mut failures = Vec::new();

    for task in tasks {
        stats.total_tasks += 1;
        let task_start = Instant::now();
        let mut tree = SearchTree::new(task.prompt.clone());

        match run_search(&mut tree, &task.id, model, evaluator, config) {
            Ok(outcome) => {
                let record = make_record(task, &outcome, task_start.elapsed().as_secs_f64());
                sink.append(&record)?;
                stats.add_outcome(&outcome);
            }
            Err(err) => {
                stats.failed += 1;
                failures.push((task.id.clone(), err));
            }
        }
    }

    stats.elapsed_secs = run_start.elapsed().as_secs_f64();
    Ok(RunReport { stats, failures })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
