//! Search throughput benchmark over synthetic tasks.
//!
//! Usage: bench_search [num_tasks] [max_rollouts] [seed]
//!
//! Runs the full search loop against the deterministic stub model and a
//! substring-coverage evaluator, appending one JSONL record per task, and
//! prints aggregate throughput at the end.

use std::time::Instant;

use treegen_bench::{run_tasks, CoverageEvaluator, JsonlSink, StubModel, Task};
use treegen_mcts::SearchConfig;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let num_tasks: u32 = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);
    let max_rollouts: u32 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(64);
    let seed: u64 = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let config = SearchConfig {
        max_rollouts,
        max_tokens: 32,
        ..SearchConfig::default()
    };

    let tasks: Vec<Task> = (0..num_tasks)
        .map(|i| Task::new(format!("synthetic/{i}"), format!("fn task_{i}() {{\n")))
        .collect();

    let model = StubModel::with_seed(seed);
    let evaluator = CoverageEvaluator::new(["alpha", "return"]);

    let out_path = std::env::temp_dir().join("bench_search_results.jsonl");
    let _ = std::fs::remove_file(&out_path);
    let mut sink = match JsonlSink::append_to(&out_path) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("failed to open result sink {}: {e}", out_path.display());
            std::process::exit(1);
        }
    };

    println!(
        "bench_search: {num_tasks} tasks, {max_rollouts} rollouts/task, seed {seed}"
    );
    println!("results: {}", out_path.display());

    let start = Instant::now();
    let report = match run_tasks(&tasks, &model, &evaluator, &config, &mut sink) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("run aborted: {e}");
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    let stats = &report.stats;
    println!();
    println!("tasks:            {}", stats.total_tasks);
    println!(
        "completed:        {} ({} solved, {:.1}% solve rate)",
        stats.completed,
        stats.solved,
        stats.solve_rate() * 100.0
    );
    println!("failed:           {}", stats.failed);
    println!("total rollouts:   {}", stats.total_rollouts);
    println!("total programs:   {}", stats.total_programs);
    println!("total evals:      {}", stats.total_evals);
    println!("mean rollouts:    {:.1}/task", stats.mean_rollouts());
    println!(
        "throughput:       {:.1} rollouts/s over {:.2}s",
        stats.rollouts_per_second(),
        elapsed.as_secs_f64()
    );

    for (task_id, err) in &report.failures {
        eprintln!("  failed {task_id}: {err}");
    }
}
