use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A [`Rect`] positioned inside a container, with its origin at `(x, y)`.
/// Used both for placed items and for free space ("spaces").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PlacedRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        debug_assert!(w > 0 && h > 0, "degenerate placed rectangle: {w}x{h} @ ({x},{y})");
        PlacedRect { x, y, w, h }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            w: self.w,
            h: self.h,
        }
    }

    #[inline(always)]
    pub fn end_x(&self) -> i32 {
        self.x + self.w
    }

    #[inline(always)]
    pub fn end_y(&self) -> i32 {
        self.y + self.h
    }

    #[inline(always)]
    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// Open-interval overlap test, rectangles that only touch do not intersect.
    #[inline(always)]
    pub fn intersects(&self, other: &PlacedRect) -> bool {
        !(self.end_x() <= other.x
            || other.end_x() <= self.x
            || self.end_y() <= other.y
            || other.end_y() <= self.y)
    }

    pub fn out_of_bounds(&self, size: i32) -> bool {
        self.x < 0 || self.y < 0 || self.end_x() > size || self.end_y() > size
    }

    /// True if `other` lies completely inside `self`.
    pub fn contains(&self, other: &PlacedRect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.end_x() >= other.end_x()
            && self.end_y() >= other.end_y()
    }

    /// True if `self` fits the dimensions of `rect` (without rotation).
    #[inline(always)]
    pub fn fits(&self, rect: &Rect) -> bool {
        self.rect().fits(rect)
    }

    #[inline(always)]
    pub fn fits_rotated(&self, rect: &Rect) -> bool {
        self.rect().fits_rotated(rect)
    }

    /// True if `self` and `other` share a full edge, i.e. their union is again a rectangle.
    pub fn continuous(&self, other: &PlacedRect) -> bool {
        let side_by_side = self.y == other.y
            && self.h == other.h
            && (self.end_x() == other.x || other.end_x() == self.x);
        let stacked = self.x == other.x
            && self.w == other.w
            && (self.end_y() == other.y || other.end_y() == self.y);
        side_by_side || stacked
    }

    /// Returns the smallest rectangle that contains both `self` and `other`.
    /// For two [continuous](PlacedRect::continuous) rectangles this is their exact union.
    pub fn super_rect(&self, other: &PlacedRect) -> PlacedRect {
        let x = i32::min(self.x, other.x);
        let y = i32::min(self.y, other.y);
        let end_x = i32::max(self.end_x(), other.end_x());
        let end_y = i32::max(self.end_y(), other.end_y());
        PlacedRect::new(x, y, end_x - x, end_y - y)
    }

    /// Returns the rectangle covered by both `self` and `other`, if any.
    pub fn intersection_rect(&self, other: &PlacedRect) -> Option<PlacedRect> {
        let x = i32::max(self.x, other.x);
        let y = i32::max(self.y, other.y);
        let end_x = i32::min(self.end_x(), other.end_x());
        let end_y = i32::min(self.end_y(), other.end_y());
        match x < end_x && y < end_y {
            true => Some(PlacedRect::new(x, y, end_x - x, end_y - y)),
            false => None,
        }
    }

    /// Area covered by both `self` and `other`.
    pub fn intersection(&self, other: &PlacedRect) -> i64 {
        self.intersection_rect(other).map_or(0, |r| r.area())
    }

    /// Overlapping area relative to the larger of the two rectangles, in `[0, 1]`.
    pub fn relative_overlap(&self, other: &PlacedRect) -> f64 {
        self.intersection(other) as f64 / i64::max(self.area(), other.area()) as f64
    }

    /// Splits `self` into the (up to 4) disjoint rectangles that cover `self` minus `other`:
    /// a right, bottom, left and top strip, each clipped so that no two strips overlap.
    ///
    /// Panics if the two rectangles do not intersect.
    pub fn shatter(&self, other: &PlacedRect) -> Vec<PlacedRect> {
        assert!(
            self.intersects(other),
            "cannot shatter {self} with non-intersecting {other}"
        );
        let mut parts = Vec::with_capacity(4);
        let inner_end_x = i32::min(self.end_x(), other.end_x());
        let inner_end_y = i32::min(self.end_y(), other.end_y());
        let inner_x = i32::max(self.x, other.x);

        if self.end_x() > other.end_x() {
            parts.push(PlacedRect::new(
                other.end_x(),
                self.y,
                self.end_x() - other.end_x(),
                self.h,
            ));
        }
        if self.end_y() > other.end_y() {
            parts.push(PlacedRect::new(
                self.x,
                other.end_y(),
                inner_end_x - self.x,
                self.end_y() - other.end_y(),
            ));
        }
        if self.x < other.x {
            parts.push(PlacedRect::new(
                self.x,
                self.y,
                other.x - self.x,
                inner_end_y - self.y,
            ));
        }
        if self.y < other.y {
            parts.push(PlacedRect::new(
                inner_x,
                self.y,
                inner_end_x - inner_x,
                other.y - self.y,
            ));
        }
        parts
    }
}

impl Display for PlacedRect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}x{} @ ({},{})]", self.w, self.h, self.x, self.y)
    }
}

/// Merges continuous rectangles of `spaces` until no pair can be merged anymore.
/// Inverse of [`PlacedRect::shatter`], applying it to an already consolidated list is a no-op.
pub fn consolidate(spaces: &mut Vec<PlacedRect>) {
    let mut merged_any = true;
    while merged_any {
        merged_any = false;
        let mut i = 0;
        while i < spaces.len() {
            let mut j = i + 1;
            while j < spaces.len() {
                if spaces[i].continuous(&spaces[j]) {
                    spaces[i] = spaces[i].super_rect(&spaces[j]);
                    spaces.remove(j);
                    merged_any = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn touching_is_not_intersecting() {
        let a = PlacedRect::new(0, 0, 5, 5);
        assert!(!a.intersects(&PlacedRect::new(5, 0, 5, 5)));
        assert!(!a.intersects(&PlacedRect::new(0, 5, 5, 5)));
        assert!(a.intersects(&PlacedRect::new(4, 4, 5, 5)));
    }

    #[test]
    fn bounds_and_containment() {
        let a = PlacedRect::new(3, 3, 7, 7);
        assert!(!a.out_of_bounds(10));
        assert!(a.out_of_bounds(9));
        assert!(a.contains(&PlacedRect::new(4, 4, 2, 2)));
        assert!(!a.contains(&PlacedRect::new(2, 4, 2, 2)));
    }

    #[test]
    fn continuity_and_union() {
        let a = PlacedRect::new(0, 0, 4, 3);
        let b = PlacedRect::new(4, 0, 2, 3);
        let c = PlacedRect::new(0, 3, 4, 1);
        let d = PlacedRect::new(4, 1, 2, 3);
        assert!(a.continuous(&b) && b.continuous(&a));
        assert!(a.continuous(&c));
        assert!(!a.continuous(&d));
        assert_eq!(a.super_rect(&b), PlacedRect::new(0, 0, 6, 3));
    }

    #[test]
    fn overlap_measures() {
        let a = PlacedRect::new(0, 0, 4, 4);
        let b = PlacedRect::new(2, 2, 4, 2);
        assert_eq!(a.intersection(&b), 4);
        float_cmp::assert_approx_eq!(f64, a.relative_overlap(&b), 0.25);
        assert_eq!(a.intersection(&PlacedRect::new(4, 0, 1, 1)), 0);
    }

    #[test_case(PlacedRect::new(0, 0, 10, 10), PlacedRect::new(3, 3, 2, 2), 4; "box in the middle")]
    #[test_case(PlacedRect::new(0, 0, 10, 10), PlacedRect::new(0, 0, 4, 4), 2; "box in the corner")]
    #[test_case(PlacedRect::new(2, 2, 6, 6), PlacedRect::new(0, 0, 20, 20), 0; "box covers space")]
    #[test_case(PlacedRect::new(0, 0, 10, 4), PlacedRect::new(8, 2, 5, 5), 2; "box sticks out")]
    #[test_case(PlacedRect::new(5, 5, 5, 5), PlacedRect::new(0, 7, 20, 1), 2; "box crosses space")]
    fn shatter_conserves_area(space: PlacedRect, rect: PlacedRect, n_parts: usize) {
        let parts = space.shatter(&rect);
        assert_eq!(parts.len(), n_parts);
        let parts_area = parts.iter().map(|p| p.area()).sum::<i64>();
        assert_eq!(parts_area + space.intersection(&rect), space.area());
        for (i, p) in parts.iter().enumerate() {
            assert!(space.contains(p));
            assert!(!p.intersects(&rect));
            assert!(parts[i + 1..].iter().all(|q| !q.intersects(p)));
        }
    }

    #[test]
    #[should_panic]
    fn shatter_requires_intersection() {
        PlacedRect::new(0, 0, 2, 2).shatter(&PlacedRect::new(2, 0, 2, 2));
    }

    #[test]
    fn consolidate_reverses_shatter() {
        let space = PlacedRect::new(0, 0, 10, 10);
        let hole = PlacedRect::new(3, 4, 2, 3);
        let mut spaces = space.shatter(&hole);
        spaces.push(hole);
        consolidate(&mut spaces);
        assert_eq!(spaces, vec![space]);
    }

    #[test]
    fn consolidate_is_idempotent() {
        let mut spaces = vec![
            PlacedRect::new(0, 0, 2, 2),
            PlacedRect::new(2, 0, 2, 2),
            PlacedRect::new(0, 2, 1, 3),
            PlacedRect::new(5, 5, 1, 1),
            PlacedRect::new(4, 0, 2, 2),
            PlacedRect::new(1, 2, 3, 3),
        ];
        consolidate(&mut spaces);
        let once = spaces.clone();
        consolidate(&mut spaces);
        assert_eq!(once, spaces);
        assert_eq!(once.iter().map(|s| s.area()).sum::<i64>(), 4 + 4 + 3 + 1 + 4 + 9);
    }
}
