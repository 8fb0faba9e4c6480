use boxpack::io::ext_repr::{ExtBPInstance, ExtBPSolution};
use serde::{Deserialize, Serialize};

use crate::config::BPConfig;

#[derive(Serialize, Deserialize, Clone)]
pub struct BPOutput {
    #[serde(flatten)]
    pub instance: ExtBPInstance,
    /// Name of the algorithm that produced the solution
    pub algorithm: String,
    pub solution: ExtBPSolution,
    pub config: BPConfig,
}
