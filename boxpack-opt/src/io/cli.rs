use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::algorithm::AlgorithmKind;

/// Packs a generated (or given) set of rectangles into as few square containers as possible
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Instance to solve. If undefined, instances are generated from the parameters below
    #[arg(short, long, value_name = "FILE")]
    pub input_file: Option<PathBuf>,
    #[arg(long, default_value_t = 20)]
    pub container_size: i32,
    #[arg(long, default_value_t = 1)]
    pub min_w: i32,
    #[arg(long, default_value_t = 7)]
    pub max_w: i32,
    #[arg(long, default_value_t = 1)]
    pub min_h: i32,
    #[arg(long, default_value_t = 7)]
    pub max_h: i32,
    #[arg(short, long, default_value_t = 200)]
    pub n_boxes: usize,
    /// Number of generated instances every algorithm is benchmarked on
    #[arg(long, default_value_t = 1)]
    pub samples: usize,
    /// Algorithms to run, all of them if none are given
    #[arg(short, long, value_enum)]
    pub algorithm: Vec<AlgorithmKind>,
    #[arg(short, long, value_name = "FOLDER")]
    pub solution_folder: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info"
    )]
    pub log_level: LevelFilter,
}
