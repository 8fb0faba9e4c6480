use crate::entities::Container;
use crate::geometry::PlacedRect;
use crate::util::assertions;

/// Minimum loss of accessible space (beyond the rectangle's own area), as a fraction of the
/// container area, for a placed rectangle to be flagged as a deep insertion candidate.
const DEEP_INSERTION_THRESHOLD: f64 = 0.05;

/// Breakpoint of a skyline step function.
/// For all positions in `[start, next.start)`, placed geometry reaches up to `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub start: i32,
    pub value: i32,
}

/// Container that approximates its occupied area with two skylines, one per axis.
///
/// `segments_x` is indexed by `y` and stores the furthest `x` reached in each horizontal band,
/// `segments_y` is indexed by `x` and stores the furthest `y` reached in each vertical band.
/// Rectangles are only ever added, never removed.
#[derive(Clone, Debug)]
pub struct SegmentContainer {
    size: i32,
    boxes: Vec<PlacedRect>,
    segments_x: Vec<Segment>,
    segments_y: Vec<Segment>,
    /// (index of the box in `boxes`, accessible space lost beyond its own area)
    deep_insertion_candidates: Vec<(usize, i64)>,
    free_space: i64,
    accessible_space: i64,
}

impl SegmentContainer {
    pub fn new(size: i32) -> Self {
        assert!(size > 0, "container size must be positive: {size}");
        let origin = Segment { start: 0, value: 0 };
        let area = size as i64 * size as i64;
        Self {
            size,
            boxes: vec![],
            segments_x: vec![origin],
            segments_y: vec![origin],
            deep_insertion_candidates: vec![],
            free_space: area,
            accessible_space: area,
        }
    }

    pub fn segments_x(&self) -> &[Segment] {
        &self.segments_x
    }

    pub fn segments_y(&self) -> &[Segment] {
        &self.segments_y
    }

    /// Area to the right of the horizontal skyline, the part of the free space still reachable
    /// by rectangles sliding in from the open side of the container.
    pub fn accessible_space(&self) -> i64 {
        self.accessible_space
    }

    pub fn deep_insertion_candidates(&self) -> &[(usize, i64)] {
        &self.deep_insertion_candidates
    }

    /// Exchanges the positions of two rectangles in the insertion order.
    /// Only the order changes, skylines stay as they are.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.boxes.swap(a, b);
        for (idx, _) in self.deep_insertion_candidates.iter_mut() {
            if *idx == a {
                *idx = b;
            } else if *idx == b {
                *idx = a;
            }
        }
    }

    fn compute_accessible_space(&self) -> i64 {
        band_lengths(&self.segments_x, self.size)
            .map(|(seg, height)| (self.size - seg.value).max(0) as i64 * height as i64)
            .sum()
    }
}

impl Container for SegmentContainer {
    fn empty(size: i32) -> Self {
        SegmentContainer::new(size)
    }

    fn size(&self) -> i32 {
        self.size
    }

    fn boxes(&self) -> &[PlacedRect] {
        &self.boxes
    }

    fn free_space(&self) -> i64 {
        self.free_space
    }

    fn has_accessible_space(&self) -> bool {
        self.segments_x
            .iter()
            .any(|s| s.value < self.size && s.start < self.size)
    }

    fn add(&mut self, placed: PlacedRect) {
        debug_assert!(!placed.out_of_bounds(self.size), "{placed} out of bounds");
        let prev_accessible = self.accessible_space;

        self.boxes.push(placed);
        self.free_space -= placed.area();

        raise_skyline(
            &mut self.segments_x,
            placed.y,
            placed.h,
            placed.end_x(),
            self.size,
        );
        raise_skyline(
            &mut self.segments_y,
            placed.x,
            placed.w,
            placed.end_y(),
            self.size,
        );
        self.accessible_space = self.compute_accessible_space();

        let excess = prev_accessible - self.accessible_space - placed.area();
        if excess as f64 >= DEEP_INSERTION_THRESHOLD * self.area() as f64 {
            self.deep_insertion_candidates
                .push((self.boxes.len() - 1, excess));
        }

        debug_assert!(assertions::skyline_is_valid(&self.segments_x, self.size));
        debug_assert!(assertions::skyline_is_valid(&self.segments_y, self.size));
        debug_assert!(assertions::skyline_covers(&self.segments_x, &self.boxes, |b| (b.y, b.h, b.end_x())));
        debug_assert!(assertions::skyline_covers(&self.segments_y, &self.boxes, |b| (b.x, b.w, b.end_y())));
    }
}

/// Index of the segment whose band contains `pos`.
pub fn floor_index(segments: &[Segment], pos: i32) -> usize {
    segments
        .partition_point(|s| s.start <= pos)
        .checked_sub(1)
        .expect("skyline must start at 0")
}

/// All segments whose band overlaps `[start, start + len)`.
pub fn relevant_segments(segments: &[Segment], start: i32, len: i32) -> &[Segment] {
    let first = floor_index(segments, start);
    let last = floor_index(segments, start + len - 1);
    &segments[first..=last]
}

/// Iterates the segments together with the length of their band, the last band ending at `size`.
pub fn band_lengths(segments: &[Segment], size: i32) -> impl Iterator<Item = (&Segment, i32)> {
    segments.iter().enumerate().map(move |(i, seg)| {
        let end = segments.get(i + 1).map_or(size, |next| next.start);
        (seg, (end - seg.start).max(0))
    })
}

/// Raises the step function to at least `far_edge` over `[start, start + len)`.
/// Neighbouring segments that end up with equal values are merged.
fn raise_skyline(segments: &mut Vec<Segment>, start: i32, len: i32, far_edge: i32, size: i32) {
    let end = start + len;
    split_at(segments, start);
    if end < size {
        split_at(segments, end);
    }
    segments
        .iter_mut()
        .filter(|s| s.start >= start && s.start < end)
        .for_each(|s| s.value = i32::max(s.value, far_edge));

    segments.dedup_by(|next, prev| next.value == prev.value);
}

fn split_at(segments: &mut Vec<Segment>, pos: i32) {
    let idx = floor_index(segments, pos);
    if segments[idx].start != pos {
        let value = segments[idx].value;
        segments.insert(idx + 1, Segment { start: pos, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: i32, value: i32) -> Segment {
        Segment { start, value }
    }

    #[test]
    fn single_box_raises_both_skylines() {
        let mut c = SegmentContainer::new(20);
        c.add(PlacedRect::new(0, 0, 7, 7));
        assert_eq!(c.segments_x(), &[seg(0, 7), seg(7, 0)]);
        assert_eq!(c.segments_y(), &[seg(0, 7), seg(7, 0)]);
        assert_eq!(c.free_space(), 400 - 49);
        assert_eq!(c.accessible_space(), 400 - 49);
        assert!(c.has_accessible_space());
        assert!(c.deep_insertion_candidates().is_empty());
    }

    #[test]
    fn full_box_leaves_no_accessible_space() {
        let mut c = SegmentContainer::new(10);
        c.add(PlacedRect::new(0, 0, 10, 10));
        assert_eq!(c.free_space(), 0);
        assert_eq!(c.accessible_space(), 0);
        assert!(!c.has_accessible_space());
        assert_eq!(c.segments_x(), &[seg(0, 10)]);
    }

    #[test]
    fn equal_neighbours_are_merged() {
        let mut c = SegmentContainer::new(10);
        c.add(PlacedRect::new(0, 0, 4, 3));
        c.add(PlacedRect::new(0, 3, 4, 2));
        assert_eq!(c.segments_x(), &[seg(0, 4), seg(5, 0)]);
        assert_eq!(c.segments_y(), &[seg(0, 5), seg(4, 0)]);
    }

    #[test]
    fn floating_box_shadows_band_and_flags_deep_insertion() {
        let mut c = SegmentContainer::new(10);
        // box at the far end of the band hides everything to its left
        c.add(PlacedRect::new(8, 0, 2, 5));
        assert_eq!(c.segments_x(), &[seg(0, 10), seg(5, 0)]);
        assert_eq!(c.accessible_space(), 50);
        assert_eq!(c.free_space(), 90);
        assert_eq!(c.deep_insertion_candidates(), &[(0, 40)]);
    }

    #[test]
    fn relevant_segments_span_band() {
        let segs = vec![seg(0, 4), seg(3, 2), seg(6, 7), seg(9, 0)];
        assert_eq!(relevant_segments(&segs, 0, 3), &segs[0..1]);
        assert_eq!(relevant_segments(&segs, 2, 5), &segs[0..3]);
        assert_eq!(relevant_segments(&segs, 9, 1), &segs[3..4]);
    }

    #[test]
    fn swap_only_changes_order() {
        let mut c = SegmentContainer::new(10);
        c.add(PlacedRect::new(0, 0, 2, 2));
        c.add(PlacedRect::new(2, 0, 3, 3));
        let segments = c.segments_x().to_vec();
        c.swap(0, 1);
        assert_eq!(c.boxes()[0], PlacedRect::new(2, 0, 3, 3));
        assert_eq!(c.segments_x(), segments.as_slice());
    }
}
