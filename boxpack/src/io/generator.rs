use std::fmt::{Display, Formatter};

use anyhow::{Result, ensure};
use rand::prelude::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::entities::BPInstance;
use crate::geometry::Rect;

/// Parameters of a family of random instances.
/// Box widths and heights are drawn uniformly from `[min, max]` (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSpecification {
    pub container_size: i32,
    pub min_w: i32,
    pub max_w: i32,
    pub min_h: i32,
    pub max_h: i32,
    pub n_boxes: usize,
    /// Number of instances to generate from this specification when benchmarking
    #[serde(default = "default_samples")]
    pub samples: usize,
}

fn default_samples() -> usize {
    1
}

impl ProblemSpecification {
    pub fn new(container_size: i32, min_w: i32, max_w: i32, min_h: i32, max_h: i32, n_boxes: usize) -> Self {
        Self {
            container_size,
            min_w,
            max_w,
            min_h,
            max_h,
            n_boxes,
            samples: default_samples(),
        }
    }

    /// Seed derived from the parameters, so the same specification always yields the same instances.
    pub fn default_seed(&self) -> u64 {
        let dims = [self.min_w, self.max_w, self.min_h, self.max_h]
            .iter()
            .map(|&d| d as u64)
            .product::<u64>();
        self.container_size as u64 + dims + self.n_boxes as u64
    }

    /// Generates an instance with the boxes drawn from a PRNG seeded with `seed`.
    pub fn generate(&self, seed: u64) -> Result<BPInstance> {
        ensure!(
            0 < self.min_w && self.min_w <= self.max_w,
            "invalid width range [{}, {}]",
            self.min_w,
            self.max_w
        );
        ensure!(
            0 < self.min_h && self.min_h <= self.max_h,
            "invalid height range [{}, {}]",
            self.min_h,
            self.max_h
        );
        let mut rng = SmallRng::seed_from_u64(seed);
        let boxes = (0..self.n_boxes)
            .map(|_| {
                Rect::new(
                    rng.random_range(self.min_w..=self.max_w),
                    rng.random_range(self.min_h..=self.max_h),
                )
            })
            .collect();
        BPInstance::new(self.container_size, boxes)
    }
}

impl Display for ProblemSpecification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} boxes [{}x{}] to [{}x{}] in {}^2 containers",
            self.n_boxes, self.min_w, self.min_h, self.max_w, self.max_h, self.container_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_instance() {
        let spec = ProblemSpecification::new(20, 1, 7, 1, 7, 200);
        assert_eq!(spec.default_seed(), 20 + 49 + 200);
        assert_eq!(spec.to_string(), "200 boxes [1x1] to [7x7] in 20^2 containers");

        let a = spec.generate(spec.default_seed()).unwrap();
        let b = spec.generate(spec.default_seed()).unwrap();
        assert_eq!(a.boxes, b.boxes);
        assert_eq!(a.boxes.len(), 200);
        assert!(a.boxes.iter().all(|r| (1..=7).contains(&r.w) && (1..=7).contains(&r.h)));
    }

    #[test]
    fn boxes_must_fit_container() {
        assert!(ProblemSpecification::new(10, 1, 11, 1, 1, 50).generate(0).is_err());
        assert!(ProblemSpecification::new(10, 5, 4, 1, 1, 5).generate(0).is_err());
    }
}
