use boxpack::entities::{BPInstance, BPProblem, Container};
use boxpack::geometry::{PlacedRect, Rect};
use log::trace;
use ordered_float::OrderedFloat;

use crate::greedy::PackingStrategy;
use crate::greedy::placers::{CircTouch, Placer};

/// How the container receiving an item is chosen among those that can hold it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerSelection {
    /// The first container (in index order) with a valid placement
    FirstFit,
    /// The container whose placement has the highest placer score, first one on ties
    BestFit,
}

/// Packs items one by one with placer `P`, opening a new container whenever none of the
/// available ones can hold the item.
///
/// Containers without accessible space are no longer considered.
pub struct GenericBinPacker<P: Placer> {
    placer: P,
    selection: ContainerSelection,
    problem: BPProblem<P::Container>,
    /// Indices of containers that may still accept items, ascending
    available: Vec<usize>,
}

impl<P: Placer> GenericBinPacker<P> {
    /// Starts from `n_preallocated` empty containers
    pub fn new(placer: P, selection: ContainerSelection, instance: &BPInstance, n_preallocated: usize) -> Self {
        let mut problem: BPProblem<P::Container> = BPProblem::new(instance);
        let available = (0..n_preallocated).map(|_| problem.open_container()).collect();
        Self {
            placer,
            selection,
            problem,
            available,
        }
    }

    pub fn into_problem(self) -> BPProblem<P::Container> {
        self.problem
    }

    fn select(&self, rect: &Rect) -> Option<(usize, PlacedRect)> {
        let mut candidates = self.available.iter().filter_map(|&ci| {
            self.placer
                .place(rect, &self.problem.containers[ci])
                .map(|(placed, score)| (ci, placed, score))
        });

        let selected = match self.selection {
            ContainerSelection::FirstFit => candidates.next(),
            // `max_by_key` keeps the last maximum, reverse to keep the first
            ContainerSelection::BestFit => {
                let all: Vec<_> = candidates.collect();
                all.into_iter().rev().max_by_key(|(_, _, s)| OrderedFloat(*s))
            }
        };
        selected.map(|(ci, placed, _)| (ci, placed))
    }
}

impl GenericBinPacker<CircTouch> {
    /// Touch-maximizing placement with best-fit container selection,
    /// starting from as many containers as the lower bound.
    pub fn gold_standard(instance: &BPInstance) -> Self {
        Self::new(CircTouch, ContainerSelection::BestFit, instance, instance.lower_bound)
    }
}

impl<P: Placer> PackingStrategy<Rect> for GenericBinPacker<P> {
    type Solution = BPProblem<P::Container>;

    fn pack_item(&mut self, item: Rect) {
        let (ci, placed) = match self.select(&item) {
            Some(selected) => selected,
            None => {
                let ci = self.problem.open_container();
                self.available.push(ci);
                let (placed, _) = self
                    .placer
                    .place(&item, &self.problem.containers[ci])
                    .expect("an empty container accepts every box");
                (ci, placed)
            }
        };
        trace!("[GREEDY] placing {item} at {placed} in container {ci}");

        let container = &mut self.problem.containers[ci];
        container.add(placed);
        if !container.has_accessible_space() {
            self.available.retain(|&c| c != ci);
        }
    }

    fn solution(&self) -> &BPProblem<P::Container> {
        &self.problem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::greedy::placers::{NormalPosFirstFit, SpaceFirstFit};

    fn instance(size: i32, boxes: &[(i32, i32)]) -> BPInstance {
        let boxes = boxes.iter().map(|&(w, h)| Rect::new(w, h)).collect();
        BPInstance::new(size, boxes).unwrap()
    }

    #[test]
    fn single_box_opens_single_container() {
        let instance = instance(20, &[(7, 7)]);
        let mut packer = GenericBinPacker::new(NormalPosFirstFit, ContainerSelection::FirstFit, &instance, 0);
        packer.pack_item(Rect::new(7, 7));
        let problem = packer.solution();
        assert_eq!(problem.n_containers(), 1);
        assert_eq!(problem.containers[0].boxes(), &[PlacedRect::new(0, 0, 7, 7)]);
        assert_eq!(problem.lower_bound, 1);
    }

    #[test]
    fn full_container_forces_new_one() {
        let instance = instance(10, &[(10, 10), (1, 1)]);
        let mut packer = GenericBinPacker::new(SpaceFirstFit, ContainerSelection::FirstFit, &instance, 0);
        packer.pack_item(Rect::new(10, 10));
        {
            let c0 = &packer.solution().containers[0];
            assert_eq!(c0.free_space(), 0);
            assert!(!c0.has_accessible_space());
        }
        packer.pack_item(Rect::new(1, 1));
        assert_eq!(packer.solution().n_containers(), 2);
        assert_eq!(packer.solution().containers[1].n_boxes(), 1);
    }

    #[test]
    fn gold_standard_preallocates_lower_bound() {
        let instance = instance(10, &[(6, 6), (6, 6), (6, 6)]);
        let mut packer = GenericBinPacker::gold_standard(&instance);
        assert_eq!(packer.solution().n_containers(), 2);
        for _ in 0..3 {
            packer.pack_item(Rect::new(6, 6));
        }
        let problem = packer.into_problem();
        assert_eq!(problem.n_containers(), 3);
        assert_eq!(problem.n_boxes(), 3);
        assert!(problem.save().verify());
    }
}
