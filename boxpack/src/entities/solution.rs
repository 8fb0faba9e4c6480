use std::time::Instant;

use itertools::Itertools;
use log::error;
use ordered_float::OrderedFloat;

use crate::geometry::PlacedRect;

/// Immutable snapshot of a [`BPProblem`](crate::entities::BPProblem), as handed out by the optimizers.
#[derive(Debug, Clone)]
pub struct BPSolution {
    pub container_size: i32,
    pub lower_bound: usize,
    /// Placed rectangles per container, container index = position
    pub containers: Vec<Vec<PlacedRect>>,
    /// Instant the solution was created
    pub time_stamp: Instant,
}

impl BPSolution {
    pub fn n_containers(&self) -> usize {
        self.containers.len()
    }

    pub fn n_boxes(&self) -> usize {
        self.containers.iter().map(|c| c.len()).sum()
    }

    fn container_area(&self) -> i64 {
        self.container_size as i64 * self.container_size as i64
    }

    /// Fraction of container `ci` covered by rectangles
    pub fn container_density(&self, ci: usize) -> f64 {
        let used = self.containers[ci].iter().map(|b| b.area()).sum::<i64>();
        used as f64 / self.container_area() as f64
    }

    /// Fraction of all used containers covered by rectangles
    pub fn density(&self) -> f64 {
        match self.containers.is_empty() {
            true => 0.0,
            false => {
                let used = self.containers.iter().flatten().map(|b| b.area()).sum::<i64>();
                used as f64 / (self.container_area() * self.n_containers() as i64) as f64
            }
        }
    }

    /// Average density of all containers except the least dense one.
    /// Not affected by a single, nearly empty "last" container.
    pub fn k1_pack_density(&self) -> f64 {
        let densities = (0..self.n_containers())
            .map(|ci| self.container_density(ci))
            .collect_vec();
        let least_dense = densities
            .iter()
            .copied()
            .min_by_key(|d| OrderedFloat(*d))
            .unwrap_or(0.0);
        let sum = densities.iter().sum::<f64>();
        (sum - least_dense) / usize::max(1, densities.len().saturating_sub(1)) as f64
    }

    /// Checks that no rectangle is out of bounds and no two rectangles in the same container intersect.
    /// The first violation found is logged.
    pub fn verify(&self) -> bool {
        for (ci, boxes) in self.containers.iter().enumerate() {
            if let Some(b) = boxes.iter().find(|b| b.out_of_bounds(self.container_size)) {
                error!("{b} in container {ci} is out of bounds");
                return false;
            }
            if let Some((a, b)) = boxes
                .iter()
                .tuple_combinations()
                .find(|(a, b)| a.intersects(b))
            {
                error!("{a} and {b} in container {ci} overlap");
                return false;
            }
        }
        true
    }
}
