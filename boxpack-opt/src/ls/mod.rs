use std::fmt::Debug;
use std::time::Instant;

use boxpack::io::debug::{DebugVisualizer, NoDebug};
use itertools::Itertools;
use log::{debug, info};
use rand::prelude::SmallRng;
use rand::seq::SliceRandom;
use thousands::Separable;

use crate::config::BPConfig;

/// Reflow, local swap and deep insertion over skyline containers
pub mod local_sequence;

/// Cross-container, local and repack moves over free-rectangle containers
pub mod repack_space;

/// Free-rectangle moves with temporary, bounded overlap
pub mod relaxed_space;

/// Everything the [`LocalSearch`] engine needs to know about a neighborhood.
///
/// Scores follow "lower is better": a move is an improvement iff its delta is strictly negative.
/// Infeasible moves score [`f64::INFINITY`].
pub trait LocalSearchStrategy {
    type Solution;
    type Move: Debug;

    fn initial_solution(&mut self) -> Self::Solution;

    /// Called once per round, before the moves are generated
    fn per_iteration_setup(&mut self, _solution: &Self::Solution) {}

    fn neighboring_moves(&mut self, solution: &Self::Solution, rng: &mut SmallRng) -> Vec<Self::Move>;

    /// Moves for which this returns `true` are always evaluated, regardless of the exploration limit
    fn must_consider(&self, _mv: &Self::Move) -> bool {
        false
    }

    /// Change in score if `mv` were applied. Must not modify `solution`.
    fn delta_score(&self, solution: &Self::Solution, score: f64, mv: &Self::Move) -> f64;

    fn apply_move(&mut self, solution: &mut Self::Solution, mv: Self::Move);

    fn score_solution(&self, solution: &Self::Solution) -> f64;

    fn debug_visualizer(&self) -> &dyn DebugVisualizer {
        &NoDebug
    }
}

/// Hill climber: each round, evaluates a random sample of the neighboring moves and commits the best one
/// if it improves the solution. Converges after a number of consecutive rounds without improvement.
pub struct LocalSearch<S: LocalSearchStrategy> {
    strategy: S,
    solution: S::Solution,
    score: f64,
    /// SmallRng is a fast, non-cryptographic PRNG <https://rust-random.github.io/book/guide-rngs.html>
    rng: SmallRng,
    exploration_limit: usize,
    no_improvement_limit: usize,
    n_no_improvement: usize,
    converged: bool,
    n_rounds: usize,
    n_committed: usize,
    n_evaluated: usize,
    start: Instant,
}

impl<S: LocalSearchStrategy> LocalSearch<S> {
    pub fn new(mut strategy: S, config: &BPConfig, rng: SmallRng) -> Self {
        assert!(config.exploration_limit > 0);
        let solution = strategy.initial_solution();
        let score = strategy.score_solution(&solution);
        Self {
            strategy,
            solution,
            score,
            rng,
            exploration_limit: config.exploration_limit,
            no_improvement_limit: config.no_improvement_limit,
            n_no_improvement: 0,
            converged: false,
            n_rounds: 0,
            n_committed: 0,
            n_evaluated: 0,
            start: Instant::now(),
        }
    }

    /// Runs until convergence
    pub fn optimize(&mut self) -> &S::Solution {
        self.optimize_step(usize::MAX).0
    }

    /// Runs until `limit` moves have been committed or the search has converged.
    /// Also returns whether the search has converged.
    pub fn optimize_step(&mut self, limit: usize) -> (&S::Solution, bool) {
        let mut n_committed = 0;
        while n_committed < limit && !self.converged {
            if self.round() {
                n_committed += 1;
            }
        }
        (&self.solution, self.converged)
    }

    /// Returns whether a move was committed
    fn round(&mut self) -> bool {
        self.n_rounds += 1;
        self.strategy.per_iteration_setup(&self.solution);

        let moves = self.strategy.neighboring_moves(&self.solution, &mut self.rng);
        let (forced, mut sampled): (Vec<_>, Vec<_>) = moves
            .into_iter()
            .partition(|mv| self.strategy.must_consider(mv));
        sampled.shuffle(&mut self.rng);
        sampled.truncate(self.exploration_limit);

        let candidates = forced.into_iter().chain(sampled).collect_vec();
        self.n_evaluated += candidates.len();

        let best = candidates
            .into_iter()
            .map(|mv| {
                let delta = self.strategy.delta_score(&self.solution, self.score, &mv);
                (delta, mv)
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b));

        match best {
            Some((delta, mv)) if delta < 0.0 => {
                debug!("[LS] round {}: applying {mv:?} (delta: {delta:.5})", self.n_rounds);
                self.strategy.apply_move(&mut self.solution, mv);
                self.score = self.strategy.score_solution(&self.solution);
                self.n_no_improvement = 0;
                self.n_committed += 1;
                true
            }
            _ => {
                self.n_no_improvement += 1;
                if self.n_no_improvement >= self.no_improvement_limit {
                    self.converged = true;
                    info!(
                        "[LS] converged after {} rounds in {:.3}ms ({} moves committed, {} evaluated)",
                        self.n_rounds.separate_with_commas(),
                        self.start.elapsed().as_secs_f64() * 1000.0,
                        self.n_committed.separate_with_commas(),
                        self.n_evaluated.separate_with_commas()
                    );
                }
                false
            }
        }
    }

    pub fn solution(&self) -> &S::Solution {
        &self.solution
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// Walks down from `start` towards 0, one step at a time
    struct Countdown {
        start: i32,
    }

    impl LocalSearchStrategy for Countdown {
        type Solution = i32;
        type Move = i32;

        fn initial_solution(&mut self) -> i32 {
            self.start
        }

        fn neighboring_moves(&mut self, _solution: &i32, _rng: &mut SmallRng) -> Vec<i32> {
            vec![-1, 1]
        }

        fn delta_score(&self, solution: &i32, _score: f64, mv: &i32) -> f64 {
            ((solution + mv).abs() - solution.abs()) as f64
        }

        fn apply_move(&mut self, solution: &mut i32, mv: i32) {
            *solution += mv;
        }

        fn score_solution(&self, solution: &i32) -> f64 {
            solution.abs() as f64
        }
    }

    fn search(start: i32) -> LocalSearch<Countdown> {
        LocalSearch::new(Countdown { start }, &BPConfig::default(), SmallRng::seed_from_u64(0))
    }

    #[test]
    fn zero_step_returns_initial_solution() {
        let mut ls = search(3);
        let (solution, converged) = ls.optimize_step(0);
        assert_eq!(*solution, 3);
        assert!(!converged);
    }

    #[test]
    fn step_limit_counts_committed_moves() {
        let mut ls = search(10);
        let (solution, converged) = ls.optimize_step(4);
        assert_eq!(*solution, 6);
        assert!(!converged);
    }

    #[test]
    fn converges_at_local_optimum() {
        let mut ls = search(5);
        assert_eq!(*ls.optimize(), 0);
        assert!(ls.converged());
        // further steps are no-ops
        let (solution, converged) = ls.optimize_step(10);
        assert_eq!(*solution, 0);
        assert!(converged);
    }
}
