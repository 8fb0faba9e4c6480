use crate::geometry::PlacedRect;

/// A square container holding placed rectangles, together with some representation of its free space.
///
/// A container's index (`ci`) is its position in [`BPProblem::containers`](crate::entities::BPProblem),
/// so it is not stored here.
pub trait Container: Clone {
    /// Creates a new, empty container of `size` x `size`
    fn empty(size: i32) -> Self;

    fn size(&self) -> i32;

    /// All placed rectangles, in insertion order
    fn boxes(&self) -> &[PlacedRect];

    /// Area not covered by any placed rectangle
    fn free_space(&self) -> i64;

    /// Whether any future rectangle could in principle still be placed in this container
    fn has_accessible_space(&self) -> bool;

    /// Registers `placed` in the container, updating the free space representation
    fn add(&mut self, placed: PlacedRect);

    fn area(&self) -> i64 {
        self.size() as i64 * self.size() as i64
    }

    fn is_empty(&self) -> bool {
        self.boxes().is_empty()
    }

    fn n_boxes(&self) -> usize {
        self.boxes().len()
    }

    /// Fraction of the container covered by placed rectangles
    fn density(&self) -> f64 {
        let used = self.boxes().iter().map(|b| b.area()).sum::<i64>();
        used as f64 / self.area() as f64
    }
}
