use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::geometry::PlacedRect;

/// Dimensions of an axis-aligned rectangle (an item to be packed), without a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(w: i32, h: i32) -> Self {
        assert!(w > 0 && h > 0, "invalid rectangle dimensions: {w}x{h}");
        Rect { w, h }
    }

    #[inline(always)]
    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    pub fn circumference(&self) -> i64 {
        2 * (self.w as i64 + self.h as i64)
    }

    pub fn short_side(&self) -> i32 {
        i32::min(self.w, self.h)
    }

    pub fn long_side(&self) -> i32 {
        i32::max(self.w, self.h)
    }

    /// Returns the same rectangle turned by 90 degrees.
    pub fn rotate(&self) -> Rect {
        Rect {
            w: self.h,
            h: self.w,
        }
    }

    /// Returns the orientation of `self` with `w >= h`.
    pub fn horizontal(&self) -> Rect {
        match self.h > self.w {
            true => self.rotate(),
            false => *self,
        }
    }

    /// True if `other` fits inside `self` without rotation.
    #[inline(always)]
    pub fn fits(&self, other: &Rect) -> bool {
        other.w <= self.w && other.h <= self.h
    }

    /// True if `other` fits inside `self` in at least one orientation.
    #[inline(always)]
    pub fn fits_rotated(&self, other: &Rect) -> bool {
        self.fits(other) || self.fits(&other.rotate())
    }

    pub fn as_placed(&self, x: i32, y: i32) -> PlacedRect {
        PlacedRect::new(x, y, self.w, self.h)
    }
}

impl Display for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} x {}]", self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_measures() {
        let r = Rect::new(3, 7);
        assert_eq!(r.area(), 21);
        assert_eq!(r.circumference(), 20);
        assert_eq!(r.short_side(), 3);
        assert_eq!(r.long_side(), 7);
        assert_eq!(r.rotate(), Rect::new(7, 3));
        assert_eq!(r.horizontal(), Rect::new(7, 3));
    }

    #[test]
    fn fitting() {
        let space = Rect::new(5, 2);
        assert!(!space.fits(&Rect::new(2, 5)));
        assert!(space.fits_rotated(&Rect::new(2, 5)));
        assert!(!space.fits_rotated(&Rect::new(3, 3)));
    }
}
