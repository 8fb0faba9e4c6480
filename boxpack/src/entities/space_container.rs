use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::entities::Container;
use crate::geometry::{PlacedRect, Rect, consolidate};
use crate::util::assertions;

/// Container that tracks its free space explicitly, as a list of disjoint rectangles ("spaces").
///
/// Together with the placed rectangles, the spaces partition the container.
/// Adjacent spaces are only merged when [`SpaceContainer::consolidate`] is called.
#[derive(Clone, Debug)]
pub struct SpaceContainer {
    size: i32,
    boxes: Vec<PlacedRect>,
    spaces: Vec<PlacedRect>,
}

impl SpaceContainer {
    pub fn new(size: i32) -> Self {
        assert!(size > 0, "container size must be positive: {size}");
        Self {
            size,
            boxes: vec![],
            spaces: vec![PlacedRect::new(0, 0, size, size)],
        }
    }

    pub fn spaces(&self) -> &[PlacedRect] {
        &self.spaces
    }

    /// Places `rect` at the origin of the space with index `space_idx`, rotating it if only
    /// the rotated orientation fits. Returns the placed rectangle.
    ///
    /// Panics if `rect` does not fit the space in either orientation.
    pub fn add_to_space(&mut self, rect: &Rect, space_idx: usize) -> PlacedRect {
        let space = self.spaces[space_idx];
        let oriented = match (space.fits(rect), space.fits(&rect.rotate())) {
            (true, _) => *rect,
            (false, true) => rect.rotate(),
            (false, false) => panic!("space {space} does not fit {rect}"),
        };
        let placed = oriented.as_placed(space.x, space.y);
        self.boxes.push(placed);
        self.spaces.remove(space_idx);
        self.spaces.extend(space.shatter(&placed));

        debug_assert!(assertions::spaces_are_disjoint(self));
        placed
    }

    /// Removes the rectangle with index `box_idx` and frees the area it occupied.
    /// Parts of that area still covered by other (overlapping) rectangles stay occupied.
    pub fn remove_box(&mut self, box_idx: usize) -> PlacedRect {
        let removed = self.boxes.remove(box_idx);
        let freed = self
            .boxes
            .iter()
            .fold(vec![removed], |free, b| carve(free, b));
        self.spaces.extend(freed);

        debug_assert!(assertions::spaces_are_disjoint(self));
        removed
    }

    /// Merges continuous spaces until no pair can be merged anymore.
    pub fn consolidate(&mut self) {
        consolidate(&mut self.spaces);
    }

    /// Places `placed` in the container, evicting every rectangle it intersects.
    /// The evicted rectangles are then reinserted, largest first, into the first space that fits them.
    /// Returns the ones that could not be reinserted ("spillover").
    ///
    /// Panics if `placed` is out of bounds.
    pub fn local_repack(&mut self, placed: PlacedRect) -> Vec<Rect> {
        assert!(
            !placed.out_of_bounds(self.size),
            "local repack of {placed} is out of bounds"
        );

        let evicted_idxs = self
            .boxes
            .iter()
            .positions(|b| b.intersects(&placed))
            .collect_vec();

        let evicted = evicted_idxs
            .into_iter()
            .rev()
            .map(|i| self.remove_box(i))
            .sorted_by_key(|b| std::cmp::Reverse(b.area()))
            .collect_vec();

        self.add(placed);
        self.consolidate();

        let mut spillover = vec![];
        for b in evicted {
            let rect = b.rect();
            match self.spaces.iter().position(|s| s.fits_rotated(&rect)) {
                Some(space_idx) => {
                    self.add_to_space(&rect, space_idx);
                    self.consolidate();
                }
                None => spillover.push(rect),
            }
        }
        spillover
    }

    /// All spaces that fit `rect` in at least one orientation, with their index.
    pub fn fitting_spaces<'a>(&'a self, rect: &'a Rect) -> impl Iterator<Item = (usize, &'a PlacedRect)> + 'a {
        self.spaces
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.fits_rotated(rect))
    }
}

impl Container for SpaceContainer {
    fn empty(size: i32) -> Self {
        SpaceContainer::new(size)
    }

    fn size(&self) -> i32 {
        self.size
    }

    fn boxes(&self) -> &[PlacedRect] {
        &self.boxes
    }

    fn free_space(&self) -> i64 {
        self.spaces.iter().map(|s| s.area()).sum()
    }

    fn has_accessible_space(&self) -> bool {
        !self.spaces.is_empty()
    }

    /// Registers `placed` at its exact position and shatters every space it intersects.
    fn add(&mut self, placed: PlacedRect) {
        debug_assert!(!placed.out_of_bounds(self.size), "{placed} out of bounds");
        self.boxes.push(placed);
        self.spaces = carve(std::mem::take(&mut self.spaces), &placed);

        debug_assert!(assertions::spaces_are_disjoint(self));
    }
}

/// Among the 4 corners of `space` and both orientations of `rect`, returns the in-bounds placement
/// with the largest relative overlap with `space`. Ties go to the first candidate.
pub fn optimal_placement(rect: &Rect, space: &PlacedRect, size: i32) -> Option<PlacedRect> {
    [*rect, rect.rotate()]
        .into_iter()
        .flat_map(|r| {
            [
                r.as_placed(space.x, space.y),
                r.as_placed(space.end_x() - r.w, space.y),
                r.as_placed(space.x, space.end_y() - r.h),
                r.as_placed(space.end_x() - r.w, space.end_y() - r.h),
            ]
        })
        .filter(|p| !p.out_of_bounds(size))
        .collect_vec()
        .into_iter()
        .rev()
        .max_by_key(|p| OrderedFloat(space.relative_overlap(p)))
}

/// Removes the area covered by `rect` from a list of disjoint rectangles.
fn carve(rects: Vec<PlacedRect>, rect: &PlacedRect) -> Vec<PlacedRect> {
    rects
        .into_iter()
        .flat_map(|r| match r.intersects(rect) {
            true => r.shatter(rect),
            false => vec![r],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_to_space_rotates_when_needed() {
        let mut c = SpaceContainer::new(10);
        let placed = c.add_to_space(&Rect::new(10, 4), 0);
        assert_eq!(placed, PlacedRect::new(0, 0, 10, 4));
        assert_eq!(c.spaces(), &[PlacedRect::new(0, 4, 10, 6)]);

        let placed = c.add_to_space(&Rect::new(6, 10), 0);
        assert_eq!(placed, PlacedRect::new(0, 4, 10, 6));
        assert_eq!(c.free_space(), 0);
        assert!(!c.has_accessible_space());
    }

    #[test]
    fn full_box_removed_restores_single_space() {
        let mut c = SpaceContainer::new(10);
        c.add_to_space(&Rect::new(10, 10), 0);
        assert_eq!(c.free_space(), 0);
        assert!(!c.has_accessible_space());

        c.remove_box(0);
        c.consolidate();
        assert_eq!(c.spaces(), &[PlacedRect::new(0, 0, 10, 10)]);
    }

    #[test]
    fn removal_keeps_overlapped_area_occupied() {
        let mut c = SpaceContainer::new(10);
        c.add(PlacedRect::new(0, 0, 4, 4));
        c.add(PlacedRect::new(2, 2, 4, 4));
        c.remove_box(0);
        let occupied = PlacedRect::new(2, 2, 4, 4);
        assert!(c.spaces().iter().all(|s| !s.intersects(&occupied)));
        assert_eq!(c.free_space(), 100 - 16);
    }

    #[test]
    fn local_repack_reinserts_evicted_boxes() {
        let mut c = SpaceContainer::new(10);
        c.add_to_space(&Rect::new(3, 3), 0);
        let spillover = c.local_repack(PlacedRect::new(0, 0, 5, 5));
        assert!(spillover.is_empty());
        assert_eq!(c.n_boxes(), 2);
        assert!(c.boxes().iter().tuple_combinations().all(|(a, b)| !a.intersects(b)));
        assert_eq!(c.free_space(), 100 - 25 - 9);
    }

    #[test]
    fn local_repack_reports_spillover() {
        let mut c = SpaceContainer::new(10);
        c.add_to_space(&Rect::new(10, 6), 0);
        let spillover = c.local_repack(PlacedRect::new(0, 0, 10, 5));
        assert_eq!(spillover, vec![Rect::new(10, 6)]);
        assert_eq!(c.n_boxes(), 1);
        assert_eq!(c.free_space(), 50);
    }

    #[test]
    fn optimal_placement_prefers_full_overlap() {
        let space = PlacedRect::new(6, 0, 4, 10);
        let placed = optimal_placement(&Rect::new(8, 3), &space, 10);
        assert_eq!(placed, Some(PlacedRect::new(6, 0, 3, 8)));
        assert_eq!(optimal_placement(&Rect::new(11, 1), &space, 10), None);
    }
}
