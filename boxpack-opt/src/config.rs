use boxpack::io::svg::SvgDrawOptions;
use serde::{Deserialize, Serialize};

/// Configuration for all optimizers
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct BPConfig {
    /// Seed for the PRNG. If undefined, the algorithm will run in non-deterministic mode using entropy
    pub prng_seed: Option<u64>,
    /// Maximum number of (randomly sampled) moves evaluated per local search round
    pub exploration_limit: usize,
    /// Local search stops after this many consecutive rounds without improvement
    pub no_improvement_limit: usize,
    /// Number of moves generated per round by the free-rectangle strategies, once close to the lower bound
    pub move_budget: usize,
    /// Fraction of `move_budget` reserved for moves within a single container
    pub local_move_frac: f32,
    /// Free-rectangle strategies only move the largest box of each container
    /// while there are more than `estimate_factor * lower bound` containers
    pub estimate_factor: f32,
    /// Optional SVG drawing options
    #[serde(default)]
    pub svg_draw_options: SvgDrawOptions,
}

impl Default for BPConfig {
    fn default() -> Self {
        Self {
            prng_seed: Some(0),
            exploration_limit: 500,
            no_improvement_limit: 5,
            move_budget: 2000,
            local_move_frac: 0.2,
            estimate_factor: 1.5,
            svg_draw_options: SvgDrawOptions::default(),
        }
    }
}
