use p3loops::algorithms::move_tree::{Deadline, ExploreOptions, Never};
use p3loops::model::{PointSpec, Side};
use p3loops::PathEngine;
use std::time::{Duration, Instant};

// Greedy chain: always take the first legal gap.
fn build_path(edges_target: usize) -> PathEngine {
    let mut eng = PathEngine::new();
    if eng
        .add_first_edge(PointSpec::boundary(Side::North, 0.5), PointSpec::boundary(Side::South, 0.5))
        .is_err()
    {
        return eng;
    }
    while eng.edges().len() < edges_target {
        let Some(seg) = eng.available_next_segments().first().copied() else { break };
        if eng.add_segment(&seg).is_err() { break; }
    }
    eng
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() { return 0.0; }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len()-1)]
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut edges = 8usize;
    let mut depth = 3usize;
    let mut nodes = 4096usize;
    let mut runs = 20usize;
    let mut budget_ms: Option<u64> = None;
    let mut assert_ms: Option<f64> = None;
    for a in &args[1..] {
        if let Some(val)=a.strip_prefix("--edges=") { if let Ok(v)=val.parse() { edges=v; } }
        else if let Some(val)=a.strip_prefix("--depth=") { if let Ok(v)=val.parse() { depth=v; } }
        else if let Some(val)=a.strip_prefix("--nodes=") { if let Ok(v)=val.parse() { nodes=v; } }
        else if let Some(val)=a.strip_prefix("--runs=") { if let Ok(v)=val.parse() { runs=v; } }
        else if let Some(val)=a.strip_prefix("--budget-ms=") { if let Ok(v)=val.parse() { budget_ms=Some(v); } }
        else if let Some(val)=a.strip_prefix("--assert-ms=") { if let Ok(v)=val.parse() { assert_ms=Some(v); } }
    }

    let eng = build_path(edges);
    let opts = ExploreOptions { max_depth: depth, max_nodes: nodes, ..ExploreOptions::default() };

    let mut times_ms: Vec<f64> = Vec::with_capacity(runs);
    let mut tree_nodes = 0usize;
    let mut pruned = 0usize;
    let mut cancelled = 0usize;
    for _ in 0..runs.max(1) {
        let t0 = Instant::now();
        let tree = match budget_ms {
            Some(ms) => eng.explore_with(&opts, &Deadline(t0 + Duration::from_millis(ms))),
            None => eng.explore_with(&opts, &Never),
        };
        times_ms.push(t0.elapsed().as_secs_f64() * 1000.0);
        tree_nodes = tree.len();
        pruned = tree.pruned;
        if tree.cancelled { cancelled += 1; }
    }
    times_ms.sort_by(|a, b| a.total_cmp(b));
    let med = percentile(&times_ms, 0.5);
    let p90 = percentile(&times_ms, 0.9);
    println!("edges={} depth={} nodes_cap={} tree_nodes={} pruned={} cancelled_runs={} median_ms={:.4} p90_ms={:.4}", eng.edges().len(), depth, nodes, tree_nodes, pruned, cancelled, med, p90);
    if let Some(th) = assert_ms { if med > th { eprintln!("FAIL: median {:.4} ms > threshold {:.3} ms", med, th); std::process::exit(1); } }
}
