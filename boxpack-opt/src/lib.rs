use std::sync::LazyLock;
use std::time::Instant;

/// Uniform access to every optimizer configuration
pub mod algorithm;

/// Benchmark battery over generated instances
pub mod bench;

pub mod config;

/// Constructive packers: orderings, placers and container selection
pub mod greedy;

pub mod io;

/// Hill climbing engine and its strategies
pub mod ls;

pub static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);
