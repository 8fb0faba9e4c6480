use std::time::{Duration, Instant};

use anyhow::{Result, ensure};
use boxpack::entities::{BPInstance, BPSolution};
use boxpack::io::generator::ProblemSpecification;
use log::{info, warn};
use rayon::prelude::*;

use crate::algorithm::{AlgorithmKind, init};
use crate::config::BPConfig;

/// Outcome of a single run
#[derive(Debug, Clone)]
pub struct RunResult {
    pub solution: BPSolution,
    pub run_time: Duration,
}

impl RunResult {
    /// Every box placed exactly once, none overlapping or out of bounds
    pub fn is_valid(&self, instance: &BPInstance) -> bool {
        self.solution.verify() && self.solution.n_boxes() == instance.boxes.len()
    }

    /// Number of containers used beyond the lower bound
    pub fn surplus(&self) -> usize {
        self.solution.n_containers().saturating_sub(self.solution.lower_bound)
    }
}

/// Aggregated results of one algorithm over all samples of a [`ProblemSpecification`]
#[derive(Debug, Clone)]
pub struct BatteryResult {
    pub kind: AlgorithmKind,
    pub n_samples: usize,
    pub avg_k1_density: f64,
    pub avg_surplus: f64,
    pub avg_run_time: Duration,
}

pub fn run(kind: AlgorithmKind, instance: &BPInstance, config: &BPConfig) -> RunResult {
    let start = Instant::now();
    let solution = init(kind, instance, config).optimize();
    RunResult {
        solution,
        run_time: start.elapsed(),
    }
}

/// Runs every algorithm in `kinds` on `spec.samples` instances generated with seeds
/// `spec.default_seed() + i`. Samples run in parallel, each with its own algorithm instance.
///
/// Fails if an instance cannot be generated or an algorithm produces an invalid solution.
pub fn run_battery(spec: &ProblemSpecification, kinds: &[AlgorithmKind], config: &BPConfig) -> Result<Vec<BatteryResult>> {
    ensure!(spec.samples > 0, "at least one sample is required");
    let instances = (0..spec.samples as u64)
        .map(|i| spec.generate(spec.default_seed() + i))
        .collect::<Result<Vec<_>>>()?;

    info!("[BENCH] {spec}, {} samples", spec.samples);

    let mut results = vec![];
    for &kind in kinds {
        let runs = instances
            .par_iter()
            .map(|instance| (instance, run(kind, instance, config)))
            .collect::<Vec<_>>();

        for (i, (instance, r)) in runs.iter().enumerate() {
            ensure!(r.is_valid(instance), "{kind} produced an invalid solution for sample {i}");
        }

        let n = runs.len() as f64;
        let result = BatteryResult {
            kind,
            n_samples: runs.len(),
            avg_k1_density: runs.iter().map(|(_, r)| r.solution.k1_pack_density()).sum::<f64>() / n,
            avg_surplus: runs.iter().map(|(_, r)| r.surplus() as f64).sum::<f64>() / n,
            avg_run_time: runs.iter().map(|(_, r)| r.run_time).sum::<Duration>() / runs.len() as u32,
        };
        info!(
            "[BENCH] {:<26} k1: {:.3}%, surplus: {:.2}, run time: {:.3}ms",
            kind.short_name(),
            result.avg_k1_density * 100.0,
            result.avg_surplus,
            result.avg_run_time.as_secs_f64() * 1000.0
        );
        results.push(result);
    }

    if let Some(best) = results
        .iter()
        .min_by(|a, b| a.avg_surplus.total_cmp(&b.avg_surplus))
    {
        info!("[BENCH] fewest containers: {}", best.kind);
    } else {
        warn!("[BENCH] no algorithms were run");
    }
    Ok(results)
}
