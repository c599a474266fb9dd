//! Benchmark driver around the `treegen-mcts` engine: a per-task run loop,
//! an append-only JSONL result sink, Graphviz tree rendering, and
//! deterministic stub backends for offline runs.

pub mod jsonl;
pub mod runner;
pub mod stub;
pub mod viz;

pub use jsonl::JsonlSink;
pub use runner::{make_record, run_tasks, RunReport, RunStats, RunnerError, Task, TaskRecord, TaskStats};
pub use stub::{CoverageEvaluator, StubModel};
pub use viz::render_dot;
