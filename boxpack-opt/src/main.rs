use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use boxpack::io::export::{export, export_instance};
use boxpack::io::ext_repr::ExtBPInstance;
use boxpack::io::generator::ProblemSpecification;
use boxpack::io::import::import;
use boxpack::io::svg::container_to_svg;
use boxpack_opt::algorithm::{AlgorithmKind, init};
use boxpack_opt::bench::run_battery;
use boxpack_opt::config::BPConfig;
use boxpack_opt::io;
use boxpack_opt::io::cli::Cli;
use boxpack_opt::io::output::BPOutput;
use clap::Parser as ClapParser;
use log::{info, warn};

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let config: BPConfig = match args.config_file {
        None => {
            warn!("[MAIN] No config file provided, use --config-file to provide a custom config");
            BPConfig::default()
        }
        Some(config_file) => io::read_json(&config_file).context("incorrect config file format")?,
    };

    info!("[MAIN] Successfully parsed BPConfig: {config:?}");

    let kinds = match args.algorithm.is_empty() {
        true => AlgorithmKind::ALL.to_vec(),
        false => args.algorithm.clone(),
    };

    fs::create_dir_all(&args.solution_folder)
        .with_context(|| format!("could not create solution folder: {:?}", args.solution_folder))?;

    let (ext_instance, stem) = match &args.input_file {
        Some(input_file) => {
            let ext_instance: ExtBPInstance = io::read_json(input_file)?;
            let stem = input_file
                .file_stem()
                .and_then(|s| s.to_str())
                .context("invalid input file name")?
                .to_string();
            (ext_instance, stem)
        }
        None => {
            let spec = ProblemSpecification {
                samples: args.samples,
                ..ProblemSpecification::new(
                    args.container_size,
                    args.min_w,
                    args.max_w,
                    args.min_h,
                    args.max_h,
                    args.n_boxes,
                )
            };
            run_battery(&spec, &kinds, &config)?;

            // the first sample is solved once more to write its solutions
            let seed = spec.default_seed();
            let name = format!("gen_{}_{}_{seed}", spec.container_size, spec.n_boxes);
            (export_instance(&spec.generate(seed)?, &name), name)
        }
    };

    let instance = import(&ext_instance)?;
    info!(
        "[MAIN] instance {}: {} boxes, lower bound {}",
        ext_instance.name,
        instance.boxes.len(),
        instance.lower_bound
    );

    for kind in kinds {
        let mut algorithm = init(kind, &instance, &config);
        let start = Instant::now();
        let solution = algorithm.optimize();

        info!(
            "[MAIN] {kind}: {} containers (lower bound {}), k1 density {:.3}%",
            solution.n_containers(),
            solution.lower_bound,
            solution.k1_pack_density() * 100.0
        );

        let output = BPOutput {
            instance: ext_instance.clone(),
            algorithm: kind.name().to_string(),
            solution: export(&solution, start),
            config,
        };
        let solution_path = args.solution_folder.join(format!("sol_{stem}_{kind}.json"));
        io::write_json(&output, &solution_path)?;

        for ci in 0..solution.n_containers() {
            let svg_path = args.solution_folder.join(format!("sol_{stem}_{kind}_{ci}.svg"));
            let svg = container_to_svg(&solution, ci, config.svg_draw_options, algorithm.debug_visualizer());
            io::write_svg(&svg, &svg_path)?;
        }
    }

    Ok(())
}
