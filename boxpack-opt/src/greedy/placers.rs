use boxpack::entities::segment_container::{band_lengths, relevant_segments};
use boxpack::entities::{Container, Segment, SegmentContainer, SpaceContainer};
use boxpack::geometry::{PlacedRect, Rect};

/// Finds a position for a rectangle inside a single container.
pub trait Placer {
    type Container: Container;

    /// Returns a placement for `rect` (possibly rotated) and its quality, higher is better.
    /// `None` if `rect` does not fit.
    fn place(&self, rect: &Rect, container: &Self::Container) -> Option<(PlacedRect, f64)>;
}

/// Places the rectangle as far left as possible in the lowest horizontal band where it fits.
/// Never rotates.
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalPosFirstFit;

impl Placer for NormalPosFirstFit {
    type Container = SegmentContainer;

    fn place(&self, rect: &Rect, container: &SegmentContainer) -> Option<(PlacedRect, f64)> {
        let size = container.size();
        let segments = container.segments_x();
        if rect.h > size {
            return None;
        }
        // slide the band down along the segment starts until the rectangle fits
        let (x, y) = segments
            .iter()
            .map(|s| s.start)
            .take_while(|y| y + rect.h <= size)
            .map(|y| (band_frontier(segments, y, rect.h), y))
            .find(|(x, _)| x + rect.w <= size)?;

        Some((rect.as_placed(x, y), 0.0))
    }
}

/// Considers the position next to every step of the skyline and keeps the one where the rectangle
/// touches the most of the container border and the already placed rectangles. Tries both orientations.
#[derive(Clone, Copy, Debug, Default)]
pub struct CircTouch;

impl CircTouch {
    fn best_fit(&self, rect: &Rect, container: &SegmentContainer) -> Option<(PlacedRect, f64)> {
        let size = container.size();
        let segs_x = container.segments_x();
        let segs_y = container.segments_y();

        let mut best: Option<(PlacedRect, f64)> = None;
        for (i, seg) in segs_x.iter().enumerate() {
            let prev_x = match i {
                0 => size,
                _ => segs_x[i - 1].value,
            };
            let mut y = seg.start;
            if y + rect.h > size {
                continue;
            }
            let x = band_frontier(segs_x, y, rect.h);
            if x >= prev_x || x + rect.w > size {
                continue;
            }
            // slide towards the origin if the columns below leave room
            let y_cor = band_frontier(segs_y, x, rect.w);
            if y_cor < y {
                y = y_cor;
            }

            let placed = rect.as_placed(x, y);
            let score = touch_score(&placed, segs_x, segs_y, size);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((placed, score));
            }
        }
        best
    }
}

impl Placer for CircTouch {
    type Container = SegmentContainer;

    fn place(&self, rect: &Rect, container: &SegmentContainer) -> Option<(PlacedRect, f64)> {
        let fit = self.best_fit(rect, container);
        let fit_rotated = self.best_fit(&rect.rotate(), container);
        match (fit, fit_rotated) {
            (Some((_, s)), Some((_, s_rot))) if s_rot > s => fit_rotated,
            (None, _) => fit_rotated,
            _ => fit,
        }
    }
}

/// Places the rectangle at the origin of the first free rectangle that fits it in either orientation
#[derive(Clone, Copy, Debug, Default)]
pub struct SpaceFirstFit;

impl Placer for SpaceFirstFit {
    type Container = SpaceContainer;

    fn place(&self, rect: &Rect, container: &SpaceContainer) -> Option<(PlacedRect, f64)> {
        let (_, space) = container.fitting_spaces(rect).next()?;
        let oriented = match space.fits(rect) {
            true => *rect,
            false => rect.rotate(),
        };
        Some((oriented.as_placed(space.x, space.y), 0.0))
    }
}

/// Furthest extent of the skyline over the band `[start, start + len)`
fn band_frontier(segments: &[Segment], start: i32, len: i32) -> i32 {
    relevant_segments(segments, start, len)
        .iter()
        .map(|s| s.value)
        .max()
        .unwrap_or(0)
}

/// Length of the edges of `placed` touching the container border (bottom and right)
/// or a skyline step it rests against, plus a tie-break favouring positions closer to the back.
fn touch_score(placed: &PlacedRect, segs_x: &[Segment], segs_y: &[Segment], size: i32) -> f64 {
    let mut touch = 0;
    if placed.end_y() == size {
        touch += placed.w;
    }
    if placed.end_x() == size {
        touch += placed.h;
    }
    touch += skyline_contact(segs_x, placed.y, placed.end_y(), placed.x, size);
    touch += skyline_contact(segs_y, placed.x, placed.end_x(), placed.y, size);

    touch as f64 + (size - placed.x) as f64 / size as f64
}

/// Total length of the segments starting in `[start, end)` whose value equals `edge`
fn skyline_contact(segments: &[Segment], start: i32, end: i32, edge: i32, size: i32) -> i32 {
    band_lengths(segments, size)
        .filter(|(s, _)| s.start >= start && s.start < end && s.value == edge)
        .map(|(s, len)| i32::min(s.start + len, end) - s.start)
        .sum()
}
