use boxpack::entities::{BPInstance, BPProblem, Container, SegmentContainer};
use boxpack::geometry::Rect;
use itertools::Itertools;
use rand::prelude::SmallRng;

use crate::greedy::GreedyPacker;
use crate::greedy::bin_packer::{ContainerSelection, GenericBinPacker};
use crate::greedy::ordering::AreaDescOrdering;
use crate::greedy::placers::{CircTouch, Placer};
use crate::ls::LocalSearchStrategy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequenceMove {
    /// Move as many boxes as possible from `source` into `target`, repacking the rest of `source`
    Reflow { target: usize, source: usize },
    /// Exchange the insertion order of boxes `a` and `b` of container `ci` and repack it
    LocalSwap { ci: usize, a: usize, b: usize },
    /// Take a deep insertion candidate out of `source` and insert it at `position` in the
    /// insertion order of `target`, repacking both
    DeepInsert {
        source: usize,
        box_idx: usize,
        target: usize,
        position: usize,
    },
}

/// Local search over the insertion order of skyline containers.
/// Containers are always repacked from scratch with [`CircTouch`].
pub struct LocalSequence {
    instance: BPInstance,
}

impl LocalSequence {
    pub fn new(instance: BPInstance) -> Self {
        Self { instance }
    }

    fn size(&self) -> i32 {
        self.instance.container_size
    }

    fn reflow(&self, problem: &BPProblem<SegmentContainer>, target: usize, source: usize) -> Reflow {
        let boxes = problem.containers[source].boxes().iter().map(|b| b.rect());
        let (target, leftovers) = pack(problem.containers[target].clone(), boxes);
        match leftovers.is_empty() {
            true => Reflow::Drained { target },
            false => match pack(SegmentContainer::new(self.size()), leftovers) {
                (source, overflow) if overflow.is_empty() => Reflow::Partial { target, source },
                _ => Reflow::Overflow,
            },
        }
    }

    fn swapped(&self, container: &SegmentContainer, a: usize, b: usize) -> Option<SegmentContainer> {
        let mut swapped = container.clone();
        swapped.swap(a, b);
        repack(self.size(), swapped.boxes().iter().map(|bx| bx.rect()))
    }

    /// New (source, target), `None` if either overflows
    fn deep_inserted(
        &self,
        problem: &BPProblem<SegmentContainer>,
        source: usize,
        box_idx: usize,
        target: usize,
        position: usize,
    ) -> Option<(SegmentContainer, SegmentContainer)> {
        let source_boxes = problem.containers[source].boxes();
        let moved = source_boxes[box_idx].rect();

        let remaining = source_boxes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != box_idx)
            .map(|(_, b)| b.rect());
        let mut target_order = problem.containers[target]
            .boxes()
            .iter()
            .map(|b| b.rect())
            .collect_vec();
        target_order.insert(position, moved);

        let new_source = repack(self.size(), remaining)?;
        let new_target = repack(self.size(), target_order)?;
        Some((new_source, new_target))
    }
}

/// Outcome of draining a source container into a target
enum Reflow {
    Drained {
        target: SegmentContainer,
    },
    Partial {
        target: SegmentContainer,
        source: SegmentContainer,
    },
    Overflow,
}

impl LocalSearchStrategy for LocalSequence {
    type Solution = BPProblem<SegmentContainer>;
    type Move = SequenceMove;

    fn initial_solution(&mut self) -> BPProblem<SegmentContainer> {
        let packer = GenericBinPacker::new(CircTouch, ContainerSelection::FirstFit, &self.instance, 0);
        let mut greedy = GreedyPacker::<Rect, _, _>::new(AreaDescOrdering::new(&self.instance.boxes), packer);
        greedy.optimize();
        greedy.into_packer().into_problem()
    }

    fn neighboring_moves(&mut self, problem: &BPProblem<SegmentContainer>, _rng: &mut SmallRng) -> Vec<SequenceMove> {
        let containers = &problem.containers;
        let n = containers.len();
        let mut moves = vec![];

        for source in 0..n {
            for target in 0..source {
                if containers[target].accessible_space() > 0 {
                    moves.push(SequenceMove::Reflow { target, source });
                }
            }
        }

        // the last container is still being filled, its order does not matter yet
        for (ci, c) in containers.iter().enumerate().take(n.saturating_sub(1)) {
            if c.accessible_space() + 1 < c.free_space() {
                for a in 0..c.n_boxes() {
                    for b in 0..a {
                        moves.push(SequenceMove::LocalSwap { ci, a, b });
                    }
                }
            }
        }

        for (source, c) in containers.iter().enumerate() {
            for &(box_idx, _) in c.deep_insertion_candidates() {
                for target in 0..source {
                    for position in 0..=containers[target].n_boxes() {
                        moves.push(SequenceMove::DeepInsert {
                            source,
                            box_idx,
                            target,
                            position,
                        });
                    }
                }
            }
        }
        moves
    }

    fn delta_score(&self, problem: &BPProblem<SegmentContainer>, _score: f64, mv: &SequenceMove) -> f64 {
        let full_container = -(self.size() as f64 * self.size() as f64);
        match *mv {
            SequenceMove::Reflow { target, source } => match self.reflow(problem, target, source) {
                Reflow::Drained { .. } => full_container,
                Reflow::Partial { target: new, .. } => cost(&new) - cost(&problem.containers[target]),
                Reflow::Overflow => f64::INFINITY,
            },
            SequenceMove::LocalSwap { a, b, .. } if a == b => 0.0,
            SequenceMove::LocalSwap { ci, a, b } => {
                let old = &problem.containers[ci];
                match self.swapped(old, a, b) {
                    Some(new) => (old.accessible_space() - new.accessible_space()) as f64 / 2.0,
                    None => f64::INFINITY,
                }
            }
            SequenceMove::DeepInsert {
                source,
                box_idx,
                target,
                position,
            } => match self.deep_inserted(problem, source, box_idx, target, position) {
                None => f64::INFINITY,
                Some((new_source, _)) if new_source.is_empty() => full_container,
                Some((new_source, new_target)) => {
                    let old = cost(&problem.containers[source]) + cost(&problem.containers[target]);
                    cost(&new_source) + cost(&new_target) - old
                }
            },
        }
    }

    fn apply_move(&mut self, problem: &mut BPProblem<SegmentContainer>, mv: SequenceMove) {
        match mv {
            SequenceMove::Reflow { target, source } => match self.reflow(problem, target, source) {
                Reflow::Drained { target: new } => {
                    problem.containers[target] = new;
                    problem.remove_container(source);
                }
                Reflow::Partial {
                    target: new_target,
                    source: new_source,
                } => {
                    problem.containers[target] = new_target;
                    problem.containers[source] = new_source;
                }
                Reflow::Overflow => panic!("reflow of {source} into {target} overflows"),
            },
            SequenceMove::LocalSwap { ci, a, b } => {
                let new = self
                    .swapped(&problem.containers[ci], a, b)
                    .unwrap_or_else(|| panic!("swapping {a} and {b} in container {ci} overflows"));
                problem.containers[ci] = new;
            }
            SequenceMove::DeepInsert {
                source,
                box_idx,
                target,
                position,
            } => {
                let (new_source, new_target) = self
                    .deep_inserted(problem, source, box_idx, target, position)
                    .unwrap_or_else(|| panic!("deep insertion of {box_idx} from {source} into {target} overflows"));
                problem.containers[target] = new_target;
                match new_source.is_empty() {
                    true => {
                        problem.remove_container(source);
                    }
                    false => problem.containers[source] = new_source,
                }
            }
        }
    }

    fn score_solution(&self, problem: &BPProblem<SegmentContainer>) -> f64 {
        problem.containers.iter().map(cost).sum()
    }
}

/// Free space that is not reachable counts more than free space that is
fn cost(container: &SegmentContainer) -> f64 {
    container.free_space() as f64 - container.accessible_space() as f64 / 4.0
}

/// Places `boxes` one by one into `container`, returns the ones that did not fit
fn pack(mut container: SegmentContainer, boxes: impl IntoIterator<Item = Rect>) -> (SegmentContainer, Vec<Rect>) {
    let mut overflow = vec![];
    for rect in boxes {
        match CircTouch.place(&rect, &container) {
            Some((placed, _)) => container.add(placed),
            None => overflow.push(rect),
        }
    }
    (container, overflow)
}

/// Packs `boxes` into a fresh container, `None` if they do not all fit
fn repack(size: i32, boxes: impl IntoIterator<Item = Rect>) -> Option<SegmentContainer> {
    match pack(SegmentContainer::new(size), boxes) {
        (container, overflow) if overflow.is_empty() => Some(container),
        _ => None,
    }
}
