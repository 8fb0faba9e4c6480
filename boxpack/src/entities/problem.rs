use std::time::Instant;

use crate::entities::{BPInstance, BPSolution, Container};
use crate::util::assertions::problem_matches_solution;

/// Dynamic counterpart of [`BPInstance`]: the ordered list of containers being modified by an optimizer.
///
/// A container's index is its position in `containers`. Removing a container shifts all later ones.
#[derive(Clone, Debug)]
pub struct BPProblem<C: Container> {
    pub container_size: i32,
    pub lower_bound: usize,
    pub containers: Vec<C>,
}

impl<C: Container> BPProblem<C> {
    pub fn new(instance: &BPInstance) -> Self {
        Self {
            container_size: instance.container_size,
            lower_bound: instance.lower_bound,
            containers: vec![],
        }
    }

    /// Appends a new, empty container and returns its index.
    pub fn open_container(&mut self) -> usize {
        self.containers.push(C::empty(self.container_size));
        self.containers.len() - 1
    }

    /// Removes the container at index `ci`, shifting all later containers one position down.
    pub fn remove_container(&mut self, ci: usize) -> C {
        self.containers.remove(ci)
    }

    pub fn n_containers(&self) -> usize {
        self.containers.len()
    }

    pub fn n_boxes(&self) -> usize {
        self.containers.iter().map(|c| c.n_boxes()).sum()
    }

    /// Creates a snapshot of the current state of the problem as a [`BPSolution`].
    pub fn save(&self) -> BPSolution {
        let solution = BPSolution {
            container_size: self.container_size,
            lower_bound: self.lower_bound,
            containers: self
                .containers
                .iter()
                .map(|c| c.boxes().to_vec())
                .collect(),
            time_stamp: Instant::now(),
        };

        debug_assert!(problem_matches_solution(self, &solution));

        solution
    }
}
