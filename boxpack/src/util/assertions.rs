//Various checks to verify correctness of the state of the system
//Used in debug_assert!() blocks

use itertools::Itertools;

use crate::entities::{BPProblem, BPSolution, Container, Segment, SpaceContainer};
use crate::geometry::PlacedRect;

/// Segment starts begin at 0, strictly increase and stay inside the container.
pub fn skyline_is_valid(segments: &[Segment], size: i32) -> bool {
    segments.first().is_some_and(|s| s.start == 0)
        && segments.iter().tuple_windows().all(|(a, b)| a.start < b.start)
        && segments
            .iter()
            .all(|s| s.start < size && (0..=size).contains(&s.value))
}

/// Every rectangle is covered by the skyline: over its band, the step function reaches at least its far edge.
/// `band` maps a rectangle to (band start, band length, far edge).
pub fn skyline_covers(
    segments: &[Segment],
    boxes: &[PlacedRect],
    band: impl Fn(&PlacedRect) -> (i32, i32, i32),
) -> bool {
    boxes.iter().all(|b| {
        let (start, len, far_edge) = band(b);
        crate::entities::segment_container::relevant_segments(segments, start, len)
            .iter()
            .all(|s| s.value >= far_edge)
    })
}

/// No two spaces overlap, no space overlaps a placed rectangle and all spaces are in bounds.
pub fn spaces_are_disjoint(container: &SpaceContainer) -> bool {
    let spaces = container.spaces();
    spaces.iter().all(|s| !s.out_of_bounds(container.size()))
        && spaces.iter().tuple_combinations().all(|(a, b)| !a.intersects(b))
        && spaces
            .iter()
            .all(|s| container.boxes().iter().all(|b| !s.intersects(b)))
}

pub fn problem_matches_solution<C: Container>(problem: &BPProblem<C>, solution: &BPSolution) -> bool {
    solution.container_size == problem.container_size
        && solution.n_containers() == problem.n_containers()
        && problem
            .containers
            .iter()
            .zip(solution.containers.iter())
            .all(|(c, s)| c.boxes() == s.as_slice())
}
