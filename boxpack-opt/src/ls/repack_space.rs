use std::cmp::Reverse;

use boxpack::entities::space_container::optimal_placement;
use boxpack::entities::{BPInstance, BPProblem, Container, SpaceContainer};
use boxpack::geometry::{PlacedRect, Rect};
use boxpack::io::debug::DebugVisualizer;
use itertools::Itertools;
use log::trace;
use rand::prelude::{IteratorRandom, SmallRng};
use rand::seq::SliceRandom;

use crate::config::BPConfig;
use crate::ls::LocalSearchStrategy;

/// Fraction of free space a container needs before its boxes are considered for relocation
const SOURCE_FREE_THRESHOLD: f64 = 0.2;

/// Local moves are generated for one in every `LOCAL_MOVE_PERIOD` containers per round, in rotation
const LOCAL_MOVE_PERIOD: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpaceMove {
    /// Move box `box_idx` of `source` to the origin of space `space_idx` of an earlier container
    CrossContainer {
        source: usize,
        box_idx: usize,
        target: usize,
        space_idx: usize,
    },
    /// Relocate box `box_idx` of `ci` into its own space `space_idx`, evicting and reinserting what it overlaps
    Local { ci: usize, box_idx: usize, space_idx: usize },
    /// Relocate box `box_idx` of `source` into space `space_idx` of an earlier container,
    /// evicting what it overlaps there into free spaces elsewhere
    Repack {
        source: usize,
        box_idx: usize,
        target: usize,
        space_idx: usize,
    },
}

/// Local search over free-rectangle containers, starting from one box per container.
///
/// Boxes are weighted by `1 / (1 + ci)`, so moving area towards earlier containers is an improvement.
/// Far from the lower bound, only the largest box of every container is moved. Close to it, a budgeted
/// mix of local and repack moves is generated.
pub struct RepackSpace {
    instance: BPInstance,
    move_budget: usize,
    local_move_frac: f32,
    estimate_factor: f32,
    pub(crate) source_free_threshold: f64,
    /// Containers with `ci % LOCAL_MOVE_PERIOD == move_index` get local moves this round
    move_index: usize,
    /// Free spaces of all containers, taken at the start of the round.
    /// Used to estimate (and later perform) the redistribution of spillover.
    snapshot: Vec<(usize, PlacedRect)>,
    debug: Box<dyn DebugVisualizer>,
}

impl RepackSpace {
    pub fn new(instance: BPInstance, config: &BPConfig, debug: Box<dyn DebugVisualizer>) -> Self {
        Self {
            instance,
            move_budget: config.move_budget,
            local_move_frac: config.local_move_frac,
            estimate_factor: config.estimate_factor,
            source_free_threshold: SOURCE_FREE_THRESHOLD,
            move_index: 0,
            snapshot: vec![],
            debug,
        }
    }

    pub fn instance(&self) -> &BPInstance {
        &self.instance
    }

    /// Whether the solution is still far from the estimated optimum
    pub fn far_from_bound(&self, problem: &BPProblem<SpaceContainer>) -> bool {
        let estimate = (self.instance.lower_bound as f32 * self.estimate_factor) as usize;
        problem.n_containers() > estimate
    }

    pub fn refresh_snapshot(&mut self, problem: &BPProblem<SpaceContainer>) {
        self.snapshot = problem
            .containers
            .iter()
            .enumerate()
            .flat_map(|(ci, c)| c.spaces().iter().map(move |s| (ci, *s)))
            .collect();
    }

    /// Every box in its own container, in the order given
    pub fn one_box_per_container(&self, boxes: impl IntoIterator<Item = Rect>) -> BPProblem<SpaceContainer> {
        let mut problem: BPProblem<SpaceContainer> = BPProblem::new(&self.instance);
        for rect in boxes {
            let ci = problem.open_container();
            problem.containers[ci].add_to_space(&rect, 0);
        }
        problem
    }

    /// Moves for the largest box of every container into the first fitting space of each earlier container
    pub fn cross_container_moves(&self, problem: &BPProblem<SpaceContainer>) -> Vec<SpaceMove> {
        let mut moves = vec![];
        for (source, c) in problem.containers.iter().enumerate() {
            let Some(box_idx) = c.boxes().iter().position_max_by_key(|b| b.area()) else {
                continue;
            };
            let rect = c.boxes()[box_idx].rect();
            for target in 0..source {
                if let Some((space_idx, _)) = problem.containers[target].fitting_spaces(&rect).next() {
                    moves.push(SpaceMove::CrossContainer {
                        source,
                        box_idx,
                        target,
                        space_idx,
                    });
                }
            }
        }
        moves
    }

    /// Budgeted local and repack moves for the boxes of all containers with enough free space
    pub fn budgeted_moves(&mut self, problem: &BPProblem<SpaceContainer>, rng: &mut SmallRng) -> Vec<SpaceMove> {
        let mut local = vec![];
        let mut repack = vec![];
        let sources = problem
            .containers
            .iter()
            .enumerate()
            .filter(|(_, c)| c.free_space() as f64 / c.area() as f64 > self.source_free_threshold);

        for (ci, c) in sources {
            for box_idx in 0..c.n_boxes() {
                if ci % LOCAL_MOVE_PERIOD == self.move_index {
                    local.extend((0..c.spaces().len()).map(|space_idx| SpaceMove::Local {
                        ci,
                        box_idx,
                        space_idx,
                    }));
                }
                for target in 0..ci {
                    repack.extend(
                        (0..problem.containers[target].spaces().len()).map(|space_idx| SpaceMove::Repack {
                            source: ci,
                            box_idx,
                            target,
                            space_idx,
                        }),
                    );
                }
            }
        }
        self.move_index = (self.move_index + 1) % LOCAL_MOVE_PERIOD;

        let local_budget = (self.move_budget as f32 * self.local_move_frac) as usize;
        local.shuffle(rng);
        local.truncate(local_budget);

        let repack_budget = self.move_budget.saturating_sub(local.len());
        let repack = match repack.len() > repack_budget {
            true => repack.into_iter().choose_multiple(rng, repack_budget),
            false => repack,
        };

        trace!("[LS] {} local and {} repack moves generated", local.len(), repack.len());
        local.into_iter().chain(repack).collect()
    }

    pub fn delta(&self, problem: &BPProblem<SpaceContainer>, mv: &SpaceMove) -> f64 {
        match *mv {
            SpaceMove::CrossContainer {
                source,
                box_idx,
                target,
                ..
            } => {
                let src = &problem.containers[source];
                let a = src.boxes()[box_idx].area() as f64;
                let source_cost = match src.n_boxes() {
                    1 => 0.0,
                    _ => a,
                };
                -a / (target + 1) as f64 + source_cost / (source + 1) as f64
            }
            SpaceMove::Local { ci, box_idx, space_idx } => {
                let original = &problem.containers[ci];
                let mut c = original.clone();
                let rect = c.remove_box(box_idx).rect();
                let Some(placed) = optimal_placement(&rect, &c.spaces()[space_idx], c.size()) else {
                    return 0.0;
                };
                match c.local_repack(placed).is_empty() {
                    true => c.spaces().len() as f64 - original.spaces().len() as f64,
                    false => 0.0,
                }
            }
            SpaceMove::Repack {
                source,
                box_idx,
                target,
                space_idx,
            } => {
                let src = &problem.containers[source];
                let rect = src.boxes()[box_idx].rect();
                let a = rect.area() as f64;
                let tgt = &problem.containers[target];
                let Some(placed) = optimal_placement(&rect, &tgt.spaces()[space_idx], tgt.size()) else {
                    return 0.0;
                };
                let spillover = tgt.clone().local_repack(placed);
                let source_emptied = src.n_boxes() == 1;
                let Some(assignment) = self.assign_spillover(&spillover, target, source, source_emptied) else {
                    return f64::INFINITY;
                };

                let spill_cost = spillover.iter().map(|r| r.area() as f64).sum::<f64>() / (1 + target) as f64;
                let spill_gain = assignment
                    .iter()
                    .map(|(ci, p)| p.area() as f64 / (1 + ci) as f64)
                    .sum::<f64>();
                let source_cost = match source_emptied {
                    true => a - src.area() as f64,
                    false => a,
                };

                spill_cost - spill_gain + source_cost / (source + 1) as f64 - a / (target + 1) as f64
            }
        }
    }

    pub fn apply(&mut self, problem: &mut BPProblem<SpaceContainer>, mv: SpaceMove) {
        match mv {
            SpaceMove::CrossContainer {
                source,
                box_idx,
                target,
                space_idx,
            } => {
                let rect = problem.containers[source].boxes()[box_idx].rect();
                let tgt = &mut problem.containers[target];
                tgt.add_to_space(&rect, space_idx);
                tgt.consolidate();
                remove_from_source(problem, source, box_idx);
            }
            SpaceMove::Local { ci, box_idx, space_idx } => {
                let c = &mut problem.containers[ci];
                let rect = c.remove_box(box_idx).rect();
                let placed = optimal_placement(&rect, &c.spaces()[space_idx], c.size())
                    .unwrap_or_else(|| panic!("{rect} has no placement in space {space_idx} of container {ci}"));
                let spillover = c.local_repack(placed);
                assert!(spillover.is_empty(), "local move in {ci} spilled {spillover:?}");
            }
            SpaceMove::Repack {
                source,
                box_idx,
                target,
                space_idx,
            } => {
                let source_emptied = problem.containers[source].n_boxes() == 1;
                let rect = problem.containers[source].boxes()[box_idx].rect();

                let tgt = &mut problem.containers[target];
                let placed = optimal_placement(&rect, &tgt.spaces()[space_idx], tgt.size())
                    .unwrap_or_else(|| panic!("{rect} has no placement in space {space_idx} of container {target}"));
                let spillover = tgt.local_repack(placed);

                let assignment = self
                    .assign_spillover(&spillover, target, source, source_emptied)
                    .unwrap_or_else(|| panic!("spillover {spillover:?} of container {target} cannot be placed"));

                // source is removed last, so the snapshot indices stay valid
                {
                    let src = &mut problem.containers[source];
                    src.remove_box(box_idx);
                    src.consolidate();
                }
                for (ci, p) in assignment {
                    problem.containers[ci].add(p);
                    problem.containers[ci].consolidate();
                }
                if problem.containers[source].is_empty() {
                    problem.remove_container(source);
                }
            }
        }
        self.draw_spaces(problem);
    }

    /// Assigns every spillover box, largest first, to the origin of the first unused snapshot space
    /// that fits it. Spaces of `target` and of an emptied `source` are skipped.
    /// `None` if any box cannot be assigned.
    fn assign_spillover(
        &self,
        spillover: &[Rect],
        target: usize,
        source: usize,
        source_emptied: bool,
    ) -> Option<Vec<(usize, PlacedRect)>> {
        let mut used = vec![false; self.snapshot.len()];
        spillover
            .iter()
            .sorted_by_key(|r| Reverse(r.area()))
            .map(|rect| {
                let (i, (ci, space)) = self.snapshot.iter().enumerate().find(|(i, (ci, space))| {
                    !used[*i] && *ci != target && !(source_emptied && *ci == source) && space.fits_rotated(rect)
                })?;
                used[i] = true;
                let oriented = match space.fits(rect) {
                    true => *rect,
                    false => rect.rotate(),
                };
                Some((*ci, oriented.as_placed(space.x, space.y)))
            })
            .collect()
    }

    /// Replaces the debug drawings with the current free spaces
    pub fn draw_spaces(&mut self, problem: &BPProblem<SpaceContainer>) {
        self.debug.clear();
        for (ci, c) in problem.containers.iter().enumerate() {
            for space in c.spaces() {
                self.debug.draw_box(ci, space);
            }
        }
    }

    pub fn debug(&self) -> &dyn DebugVisualizer {
        self.debug.as_ref()
    }
}

/// Removes a box from `source`, and the container itself if it is left empty
fn remove_from_source(problem: &mut BPProblem<SpaceContainer>, source: usize, box_idx: usize) {
    let src = &mut problem.containers[source];
    src.remove_box(box_idx);
    src.consolidate();
    if src.is_empty() {
        problem.remove_container(source);
    }
}

/// Places `boxes` into the first container other than `avoid` with enough free space and a fitting space.
/// Returns the boxes that could not be placed.
pub fn shallow_global_repack(problem: &mut BPProblem<SpaceContainer>, avoid: usize, boxes: &[Rect]) -> Vec<Rect> {
    let mut leftovers = vec![];
    for rect in boxes {
        let found = problem.containers.iter().enumerate().find_map(|(ci, c)| {
            match ci != avoid && c.free_space() >= rect.area() {
                true => c.fitting_spaces(rect).next().map(|(space_idx, _)| (ci, space_idx)),
                false => None,
            }
        });
        match found {
            Some((ci, space_idx)) => {
                let c = &mut problem.containers[ci];
                c.add_to_space(rect, space_idx);
                c.consolidate();
            }
            None => leftovers.push(*rect),
        }
    }
    leftovers
}

impl LocalSearchStrategy for RepackSpace {
    type Solution = BPProblem<SpaceContainer>;
    type Move = SpaceMove;

    fn initial_solution(&mut self) -> BPProblem<SpaceContainer> {
        let boxes = self
            .instance
            .boxes
            .iter()
            .copied()
            .sorted_by_key(|b| Reverse(b.area()))
            .collect_vec();
        self.one_box_per_container(boxes)
    }

    fn per_iteration_setup(&mut self, problem: &BPProblem<SpaceContainer>) {
        if !self.far_from_bound(problem) {
            self.refresh_snapshot(problem);
        }
    }

    fn neighboring_moves(&mut self, problem: &BPProblem<SpaceContainer>, rng: &mut SmallRng) -> Vec<SpaceMove> {
        match self.far_from_bound(problem) {
            true => self.cross_container_moves(problem),
            false => self.budgeted_moves(problem, rng),
        }
    }

    fn delta_score(&self, problem: &BPProblem<SpaceContainer>, _score: f64, mv: &SpaceMove) -> f64 {
        self.delta(problem, mv)
    }

    fn apply_move(&mut self, problem: &mut BPProblem<SpaceContainer>, mv: SpaceMove) {
        self.apply(problem, mv);
    }

    fn score_solution(&self, _problem: &BPProblem<SpaceContainer>) -> f64 {
        0.0
    }

    fn debug_visualizer(&self) -> &dyn DebugVisualizer {
        self.debug()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxpack::io::debug::{NoDebug, SvgDebugVisualizer};
    use float_cmp::approx_eq;
    use rand::SeedableRng;

    fn strategy(size: i32, boxes: &[(i32, i32)]) -> RepackSpace {
        let boxes = boxes.iter().map(|&(w, h)| Rect::new(w, h)).collect();
        let instance = BPInstance::new(size, boxes).unwrap();
        RepackSpace::new(instance, &BPConfig::default(), Box::new(NoDebug))
    }

    #[test]
    fn initial_solution_is_one_box_per_container() {
        let mut s = strategy(10, &[(2, 2), (5, 5), (3, 3)]);
        let problem = s.initial_solution();
        assert_eq!(problem.n_containers(), 3);
        assert_eq!(problem.containers[0].boxes(), &[PlacedRect::new(0, 0, 5, 5)]);
        assert!(s.far_from_bound(&problem));
    }

    #[test]
    fn cross_container_move_empties_source() {
        let mut s = strategy(10, &[(5, 5), (5, 5), (5, 5)]);
        let mut problem = s.initial_solution();
        let moves = s.cross_container_moves(&problem);
        // container 1 -> 0, container 2 -> 0 and 1
        assert_eq!(moves.len(), 3);

        let mv = moves[0];
        assert!(approx_eq!(f64, s.delta(&problem, &mv), -25.0));
        s.apply(&mut problem, mv);
        assert_eq!(problem.n_containers(), 2);
        assert_eq!(problem.n_boxes(), 3);
        assert!(problem.save().verify());
    }

    #[test]
    fn local_move_defragments_free_space() {
        let mut s = strategy(10, &[(2, 6), (2, 4)]);
        let mut problem = s.one_box_per_container([Rect::new(2, 6)]);
        problem.containers[0].add_to_space(&Rect::new(2, 4), 0);
        assert_eq!(problem.containers[0].spaces().len(), 3);

        // stacking the 2x4 below the 2x6 leaves a single free rectangle
        let mv = SpaceMove::Local {
            ci: 0,
            box_idx: 1,
            space_idx: 0,
        };
        let moves = s.budgeted_moves(&problem, &mut SmallRng::seed_from_u64(0));
        assert!(moves.contains(&mv));
        assert!(approx_eq!(f64, s.delta(&problem, &mv), 1.0 - 3.0));

        s.apply(&mut problem, mv);
        assert_eq!(
            problem.containers[0].boxes(),
            &[PlacedRect::new(0, 0, 2, 6), PlacedRect::new(0, 6, 2, 4)]
        );
        assert_eq!(problem.containers[0].spaces(), &[PlacedRect::new(2, 0, 8, 10)]);
        assert_eq!(problem.n_boxes(), 2);
        assert!(problem.save().verify());
    }

    #[test]
    fn shallow_repack_skips_avoided_container() {
        let s = strategy(10, &[(5, 5), (5, 5)]);
        let mut problem = s.one_box_per_container([Rect::new(5, 5), Rect::new(5, 5)]);
        let leftovers = shallow_global_repack(&mut problem, 0, &[Rect::new(5, 5), Rect::new(6, 6)]);
        assert_eq!(leftovers, vec![Rect::new(6, 6)]);
        assert_eq!(problem.containers[0].n_boxes(), 1);
        assert_eq!(problem.containers[1].n_boxes(), 2);
    }

    #[test]
    fn repack_places_spillover_where_estimated() {
        let instance = BPInstance::new(10, vec![Rect::new(10, 6), Rect::new(10, 5), Rect::new(4, 10)]).unwrap();
        let mut s = RepackSpace::new(instance, &BPConfig::default(), Box::new(SvgDebugVisualizer::default()));
        let mut problem = s.one_box_per_container([Rect::new(10, 6), Rect::new(4, 10), Rect::new(10, 5)]);
        s.refresh_snapshot(&problem);

        // the 10x5 goes into container 0, evicting the 10x6 into container 1 next to the 4x10
        let mv = SpaceMove::Repack {
            source: 2,
            box_idx: 0,
            target: 0,
            space_idx: 0,
        };
        assert!(s.delta(&problem, &mv) < 0.0);
        s.apply(&mut problem, mv);

        assert_eq!(problem.n_containers(), 2);
        assert_eq!(problem.n_boxes(), 3);
        assert!(problem.save().verify());
        assert!(s.debug().overlay(0, boxpack::io::svg::SvgTheme::GRAY.debug_color, 1.0).is_some());
    }
}
