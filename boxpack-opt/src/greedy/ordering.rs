use std::cmp::Reverse;
use std::collections::VecDeque;

use boxpack::entities::{BPProblem, SpaceContainer};
use boxpack::geometry::Rect;
use itertools::Itertools;

use crate::greedy::OrderingStrategy;

/// Non-increasing area, ties broken by non-increasing short side
fn sorted_by_area_desc(boxes: &[Rect]) -> Vec<Rect> {
    boxes
        .iter()
        .copied()
        .sorted_by_key(|b| (Reverse(b.area()), Reverse(b.short_side())))
        .collect()
}

/// Items are offered in their original order, models boxes arriving one by one
pub struct OnlineOrdering {
    queue: VecDeque<Rect>,
}

impl OnlineOrdering {
    pub fn new(boxes: &[Rect]) -> Self {
        Self {
            queue: boxes.iter().copied().collect(),
        }
    }
}

impl<S> OrderingStrategy<Rect, S> for OnlineOrdering {
    fn next_item(&mut self, _solution: &S) -> Option<Rect> {
        self.queue.pop_front()
    }
}

/// Largest items first, each oriented horizontally
pub struct AreaDescOrdering {
    queue: VecDeque<Rect>,
}

impl AreaDescOrdering {
    pub fn new(boxes: &[Rect]) -> Self {
        Self {
            queue: sorted_by_area_desc(boxes)
                .into_iter()
                .map(|b| b.horizontal())
                .collect(),
        }
    }
}

impl<S> OrderingStrategy<Rect, S> for AreaDescOrdering {
    fn next_item(&mut self, _solution: &S) -> Option<Rect> {
        self.queue.pop_front()
    }
}

/// Largest items first, but prefers any remaining item that still fits one of the existing free rectangles.
/// Free rectangles are scanned in container order, for each one the largest fitting item is taken.
pub struct AdaptiveBestFitOrdering {
    remaining: Vec<Rect>,
}

impl AdaptiveBestFitOrdering {
    pub fn new(boxes: &[Rect]) -> Self {
        Self {
            remaining: sorted_by_area_desc(boxes),
        }
    }
}

impl OrderingStrategy<Rect, BPProblem<SpaceContainer>> for AdaptiveBestFitOrdering {
    fn next_item(&mut self, problem: &BPProblem<SpaceContainer>) -> Option<Rect> {
        if self.remaining.is_empty() {
            return None;
        }
        let idx = problem
            .containers
            .iter()
            .flat_map(|c| c.spaces())
            .find_map(|space| self.remaining.iter().position(|b| space.fits_rotated(b)))
            .unwrap_or(0);

        Some(self.remaining.remove(idx))
    }
}
