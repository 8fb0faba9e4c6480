use boxpack::entities::space_container::optimal_placement;
use boxpack::entities::{BPInstance, BPProblem, Container, SpaceContainer};
use boxpack::geometry::PlacedRect;
use boxpack::io::debug::DebugVisualizer;
use itertools::Itertools;
use log::debug;
use ordered_float::OrderedFloat;
use rand::prelude::SmallRng;

use crate::config::BPConfig;
use crate::ls::LocalSearchStrategy;
use crate::ls::repack_space::{RepackSpace, SpaceMove, shallow_global_repack};

const SOURCE_FREE_THRESHOLD: f64 = 0.1;
const PLACEBO_DELTA: f64 = -0.00001;
const PENALTY_INCREMENT: f64 = 0.3;
const OVERLAP_DECREMENT: f64 = 0.007;
const REPACK_OVERLAP_DECREMENT: f64 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelaxedMove {
    Base(SpaceMove),
    /// Does nothing, but tightens the overlap constraints
    Placebo,
    /// Force box `box_idx` of `source` into space `space_idx` of an earlier container,
    /// overlapping the boxes already there
    Cram {
        source: usize,
        box_idx: usize,
        target: usize,
        space_idx: usize,
    },
    /// Take an overlapping box out of `ci`, into another container or a new one
    Escape { ci: usize, box_idx: usize },
}

/// [`RepackSpace`] which temporarily tolerates overlap between boxes.
///
/// Overlap is allowed up to `allowed_overlap` (relative overlap between two boxes) and costs
/// `overlap_penalty` per unit of area. Every time nothing better than a placebo move is found,
/// the allowed overlap shrinks and the penalty grows, until escaping becomes cheaper than overlapping.
/// Placebo moves are available as long as overlap remains, so the search cannot converge before it is gone.
pub struct RelaxedSpace {
    base: RepackSpace,
    allowed_overlap: f64,
    overlap_penalty: f64,
    consecutive_placebo: usize,
    /// Set once cramming is exhausted, the strict neighborhood is used from then on
    force_late: bool,
}

impl RelaxedSpace {
    pub fn new(instance: BPInstance, config: &BPConfig, debug: Box<dyn DebugVisualizer>) -> Self {
        let mut base = RepackSpace::new(instance, config, debug);
        base.source_free_threshold = SOURCE_FREE_THRESHOLD;
        Self {
            base,
            allowed_overlap: 1.0,
            overlap_penalty: 1.0,
            consecutive_placebo: 0,
            force_late: false,
        }
    }

    pub fn allowed_overlap(&self) -> f64 {
        self.allowed_overlap
    }

    pub fn overlap_penalty(&self) -> f64 {
        self.overlap_penalty
    }


    /// For every space of the first container with free space, the box of a later container
    /// whose optimal placement covers that space the most
    fn cram_moves(&self, problem: &BPProblem<SpaceContainer>) -> Vec<RelaxedMove> {
        let Some(target) = problem.containers.iter().position(|c| c.has_accessible_space()) else {
            return vec![];
        };
        let size = problem.container_size;
        let spaces = problem.containers[target].spaces();

        spaces
            .iter()
            .enumerate()
            .filter_map(|(space_idx, space)| {
                let candidates = problem
                    .containers
                    .iter()
                    .enumerate()
                    .skip(target + 1)
                    .flat_map(|(source, c)| {
                        c.boxes().iter().enumerate().filter_map(move |(box_idx, b)| {
                            optimal_placement(&b.rect(), space, size)
                                .map(|p| (source, box_idx, space.relative_overlap(&p)))
                        })
                    })
                    .collect_vec();
                candidates
                    .into_iter()
                    .rev()
                    .max_by_key(|(_, _, overlap)| OrderedFloat(*overlap))
                    .map(|(source, box_idx, _)| RelaxedMove::Cram {
                        source,
                        box_idx,
                        target,
                        space_idx,
                    })
            })
            .collect()
    }

    /// Area of `boxes[idx]` shared with boxes it overlaps more than allowed
    fn excess_overlap(&self, boxes: &[PlacedRect], idx: usize) -> i64 {
        let b = &boxes[idx];
        boxes
            .iter()
            .enumerate()
            .filter(|(j, o)| *j != idx && b.relative_overlap(o) > self.allowed_overlap)
            .map(|(_, o)| b.intersection(o))
            .sum()
    }

    fn cram_placement(&self, problem: &BPProblem<SpaceContainer>, mv: &RelaxedMove) -> Option<PlacedRect> {
        let RelaxedMove::Cram {
            source,
            box_idx,
            target,
            space_idx,
        } = *mv
        else {
            panic!("{mv:?} is not a cram move");
        };
        let rect = problem.containers[source].boxes()[box_idx].rect();
        let tgt = &problem.containers[target];
        optimal_placement(&rect, &tgt.spaces()[space_idx], tgt.size())
    }

    fn placebo(&mut self) {
        self.consecutive_placebo += 1;
        self.overlap_penalty += PENALTY_INCREMENT * self.consecutive_placebo as f64;
        self.allowed_overlap =
            f64::max(0.0, self.allowed_overlap - OVERLAP_DECREMENT * self.consecutive_placebo as f64);
        if self.allowed_overlap <= 0.0 {
            self.force_late = true;
        }
        debug!(
            "[LS] placebo, allowed overlap: {:.3}, overlap penalty: {:.3}",
            self.allowed_overlap, self.overlap_penalty
        );
    }
}

impl LocalSearchStrategy for RelaxedSpace {
    type Solution = BPProblem<SpaceContainer>;
    type Move = RelaxedMove;

    fn initial_solution(&mut self) -> BPProblem<SpaceContainer> {
        let boxes = self.base.instance().boxes.clone();
        self.base.one_box_per_container(boxes)
    }

    fn per_iteration_setup(&mut self, problem: &BPProblem<SpaceContainer>) {
        if self.force_late {
            self.base.refresh_snapshot(problem);
        }
    }

    fn neighboring_moves(&mut self, problem: &BPProblem<SpaceContainer>, rng: &mut SmallRng) -> Vec<RelaxedMove> {
        if !self.force_late {
            let crams = self.cram_moves(problem);
            if !crams.is_empty() {
                return std::iter::once(RelaxedMove::Placebo).chain(crams).collect();
            }
            debug!("[LS] nothing left to cram, switching to strict moves");
            self.force_late = true;
            self.base.refresh_snapshot(problem);
        }

        let mut moves = vec![];
        let overlapping = problem
            .containers
            .iter()
            .any(|c| c.boxes().iter().tuple_combinations().any(|(a, b)| a.intersects(b)));
        if overlapping {
            moves.push(RelaxedMove::Placebo);
        }
        for (ci, c) in problem.containers.iter().enumerate() {
            for box_idx in 0..c.n_boxes() {
                if self.excess_overlap(c.boxes(), box_idx) > 0 {
                    moves.push(RelaxedMove::Escape { ci, box_idx });
                }
            }
        }
        moves.extend(
            self.base
                .budgeted_moves(problem, rng)
                .into_iter()
                .map(RelaxedMove::Base),
        );
        moves
    }

    fn must_consider(&self, mv: &RelaxedMove) -> bool {
        matches!(mv, RelaxedMove::Placebo | RelaxedMove::Escape { .. })
    }

    fn delta_score(&self, problem: &BPProblem<SpaceContainer>, _score: f64, mv: &RelaxedMove) -> f64 {
        match *mv {
            RelaxedMove::Base(base_mv) => self.base.delta(problem, &base_mv),
            RelaxedMove::Placebo => PLACEBO_DELTA,
            RelaxedMove::Escape { ci, box_idx } => {
                let c = &problem.containers[ci];
                let a = c.boxes()[box_idx].area() as f64;
                let new_ci = problem.n_containers();
                let excess = self.excess_overlap(c.boxes(), box_idx) as f64;
                (c.area() as f64 - a) / (1 + new_ci) as f64 - excess * self.overlap_penalty
            }
            RelaxedMove::Cram {
                source,
                box_idx,
                target,
                ..
            } => {
                let Some(placed) = self.cram_placement(problem, mv) else {
                    return 0.0;
                };
                let tgt = &problem.containers[target];
                if tgt
                    .boxes()
                    .iter()
                    .any(|b| placed.relative_overlap(b) > self.allowed_overlap)
                {
                    return 0.0;
                }
                let overlap = tgt.boxes().iter().map(|b| placed.intersection(b)).sum::<i64>() as f64;

                let src = &problem.containers[source];
                let a = src.boxes()[box_idx].area() as f64;
                // crams only go to earlier containers, staying in the source costs nothing
                let source_cost = match src.n_boxes() {
                    1 => a - src.area() as f64,
                    _ => 0.0,
                };
                // leaving the source resolves the excess overlap the box has there
                let relief = self.excess_overlap(src.boxes(), box_idx) as f64;

                source_cost / (source + 1) as f64 - f64::max(1.0, a - overlap) / (target + 1) as f64
                    - relief * self.overlap_penalty
            }
        }
    }

    fn apply_move(&mut self, problem: &mut BPProblem<SpaceContainer>, mv: RelaxedMove) {
        match mv {
            RelaxedMove::Base(base_mv) => {
                if let SpaceMove::Repack { .. } = base_mv {
                    self.allowed_overlap = f64::max(0.0, self.allowed_overlap - REPACK_OVERLAP_DECREMENT);
                }
                self.base.apply(problem, base_mv);
                return;
            }
            RelaxedMove::Placebo => self.placebo(),
            RelaxedMove::Cram {
                source,
                box_idx,
                target,
                ..
            } => {
                self.consecutive_placebo = 0;
                let placed = self
                    .cram_placement(problem, &mv)
                    .unwrap_or_else(|| panic!("{mv:?} has no placement"));
                {
                    let src = &mut problem.containers[source];
                    src.remove_box(box_idx);
                    src.consolidate();
                }
                {
                    let tgt = &mut problem.containers[target];
                    tgt.add(placed);
                    tgt.consolidate();
                }
                if problem.containers[source].is_empty() {
                    problem.remove_container(source);
                }
            }
            RelaxedMove::Escape { ci, box_idx } => {
                self.consecutive_placebo = 0;
                let rect = {
                    let c = &mut problem.containers[ci];
                    let removed = c.remove_box(box_idx);
                    c.consolidate();
                    removed.rect()
                };
                for leftover in shallow_global_repack(problem, ci, &[rect]) {
                    let new_ci = problem.open_container();
                    problem.containers[new_ci].add_to_space(&leftover, 0);
                }
            }
        }
        self.base.draw_spaces(problem);
    }

    fn score_solution(&self, _problem: &BPProblem<SpaceContainer>) -> f64 {
        0.0
    }

    fn debug_visualizer(&self) -> &dyn DebugVisualizer {
        self.base.debug()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxpack::geometry::Rect;
    use boxpack::io::debug::NoDebug;
    use float_cmp::approx_eq;
    use rand::SeedableRng;

    fn strategy(size: i32, boxes: &[(i32, i32)]) -> RelaxedSpace {
        let boxes = boxes.iter().map(|&(w, h)| Rect::new(w, h)).collect();
        let instance = BPInstance::new(size, boxes).unwrap();
        RelaxedSpace::new(instance, &BPConfig::default(), Box::new(NoDebug))
    }

    #[test]
    fn placebo_tightens_constraints() {
        let mut s = strategy(10, &[(5, 5)]);
        let mut problem = s.initial_solution();
        s.apply_move(&mut problem, RelaxedMove::Placebo);
        s.apply_move(&mut problem, RelaxedMove::Placebo);
        assert!(approx_eq!(f64, s.overlap_penalty(), 1.0 + 0.3 + 0.6));
        assert!(approx_eq!(f64, s.allowed_overlap(), 1.0 - 0.007 - 0.014));
        assert_eq!(problem.n_boxes(), 1);
    }

    #[test]
    fn cram_overlaps_and_removes_source() {
        let mut s = strategy(10, &[(6, 6), (6, 6)]);
        let mut problem = s.initial_solution();
        let moves = s.neighboring_moves(&problem, &mut SmallRng::seed_from_u64(0));
        let cram = moves
            .iter()
            .copied()
            .find(|m| matches!(m, RelaxedMove::Cram { space_idx: 0, .. }))
            .unwrap();
        assert!(moves.contains(&RelaxedMove::Placebo));
        // (36 - 100) / 2 for emptying the source, 36 - 12 for the part of the box that does not overlap
        assert!(approx_eq!(f64, s.delta_score(&problem, 0.0, &cram), -32.0 - 24.0));

        s.apply_move(&mut problem, cram);
        assert_eq!(problem.n_containers(), 1);
        assert_eq!(problem.n_boxes(), 2);
        assert!(!problem.save().verify());
    }

    #[test]
    fn cramming_continues_close_to_the_bound() {
        // lower bound 2, three containers is not far from it
        let mut s = strategy(10, &[(6, 6), (6, 6), (6, 6)]);
        let problem = s.initial_solution();
        assert!(!s.base.far_from_bound(&problem));

        let moves = s.neighboring_moves(&problem, &mut SmallRng::seed_from_u64(0));
        assert!(moves.contains(&RelaxedMove::Placebo));
        assert!(moves.iter().any(|m| matches!(m, RelaxedMove::Cram { target: 0, .. })));
        assert!(!moves.iter().any(|m| matches!(m, RelaxedMove::Base(_))));
    }

    #[test]
    fn cram_out_of_an_overlap_is_rewarded() {
        let mut s = strategy(10, &[(6, 6), (5, 5), (5, 5)]);
        let mut problem: BPProblem<SpaceContainer> = BPProblem::new(s.base.instance());
        let target = problem.open_container();
        problem.containers[target].add(PlacedRect::new(0, 0, 6, 6));
        let source = problem.open_container();
        problem.containers[source].add(PlacedRect::new(0, 0, 5, 5));
        problem.containers[source].add(PlacedRect::new(2, 2, 5, 5));
        s.allowed_overlap = 0.3;

        // lands at (5, 0), overlapping 5 units in the target and leaving 9 / 25 of overlap behind
        let cram = RelaxedMove::Cram {
            source,
            box_idx: 1,
            target,
            space_idx: 0,
        };
        assert!(approx_eq!(f64, s.delta_score(&problem, 0.0, &cram), -20.0 - 9.0));

        s.apply_move(&mut problem, cram);
        assert_eq!(problem.n_containers(), 2);
        assert_eq!(problem.n_boxes(), 3);
        assert_eq!(problem.containers[target].boxes()[1], PlacedRect::new(5, 0, 5, 5));
    }

    #[test]
    fn escape_resolves_overlap() {
        let mut s = strategy(10, &[(5, 5), (5, 5)]);
        let mut problem: BPProblem<SpaceContainer> = BPProblem::new(s.base.instance());
        let ci = problem.open_container();
        problem.containers[ci].add(PlacedRect::new(0, 0, 5, 5));
        problem.containers[ci].add(PlacedRect::new(2, 2, 5, 5));

        // 9 / 25 of overlap is tolerated at first
        let moves = s.neighboring_moves(&problem, &mut SmallRng::seed_from_u64(0));
        assert!(moves.contains(&RelaxedMove::Placebo));
        assert!(!moves.iter().any(|m| matches!(m, RelaxedMove::Escape { .. })));

        s.allowed_overlap = 0.0;
        let moves = s.neighboring_moves(&problem, &mut SmallRng::seed_from_u64(0));
        assert!(moves.contains(&RelaxedMove::Escape { ci: 0, box_idx: 1 }));
        assert!(approx_eq!(
            f64,
            s.delta_score(&problem, 0.0, &RelaxedMove::Escape { ci: 0, box_idx: 1 }),
            75.0 / 2.0 - 9.0
        ));

        s.apply_move(&mut problem, RelaxedMove::Escape { ci: 0, box_idx: 1 });
        assert_eq!(problem.n_containers(), 2);
        assert!(problem.save().verify());
    }
}
