use std::time::Instant;

use crate::entities::{BPInstance, BPSolution};
use crate::io::ext_repr::{ExtBPInstance, ExtBPSolution, ExtBox, ExtContainer, ExtPlacedBox};

/// Exports an instance out of the library, e.g. to store a generated one next to its solution
pub fn export_instance(instance: &BPInstance, name: &str) -> ExtBPInstance {
    ExtBPInstance {
        name: name.to_string(),
        container_size: instance.container_size,
        boxes: instance
            .boxes
            .iter()
            .map(|b| ExtBox {
                width: b.w,
                height: b.h,
            })
            .collect(),
    }
}

/// Exports a solution out of the library
pub fn export(solution: &BPSolution, epoch: Instant) -> ExtBPSolution {
    let containers = solution
        .containers
        .iter()
        .enumerate()
        .map(|(ci, boxes)| ExtContainer {
            index: ci,
            boxes: boxes
                .iter()
                .map(|b| ExtPlacedBox {
                    x: b.x,
                    y: b.y,
                    width: b.w,
                    height: b.h,
                })
                .collect(),
            density: solution.container_density(ci),
        })
        .collect();

    ExtBPSolution {
        n_containers: solution.n_containers(),
        lower_bound: solution.lower_bound,
        containers,
        density: solution.density(),
        k1_density: solution.k1_pack_density(),
        run_time_sec: solution
            .time_stamp
            .saturating_duration_since(epoch)
            .as_secs_f64(),
    }
}
