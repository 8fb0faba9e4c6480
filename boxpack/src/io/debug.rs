use svg::node::element::{Group, Line};

use crate::geometry::PlacedRect;
use crate::io::svg::{Color, rect_element};

/// Sink for diagnostic drawings emitted by optimizers, addressed by container index.
/// Optimizers only ever write to it.
pub trait DebugVisualizer: Send {
    /// Forgets everything drawn so far
    fn clear(&mut self);

    fn draw_box(&mut self, ci: usize, rect: &PlacedRect);

    fn draw_line(&mut self, ci: usize, from: (i32, i32), to: (i32, i32));

    /// Everything drawn in container `ci` since the last clear, as an SVG group.
    /// `None` if this visualizer does not keep its drawings.
    fn overlay(&self, _ci: usize, _color: Color, _stroke_width: f32) -> Option<Group> {
        None
    }
}

/// Discards all drawings
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDebug;

impl DebugVisualizer for NoDebug {
    fn clear(&mut self) {}

    fn draw_box(&mut self, _ci: usize, _rect: &PlacedRect) {}

    fn draw_line(&mut self, _ci: usize, _from: (i32, i32), _to: (i32, i32)) {}
}

/// Keeps all drawings since the last clear, so they can be rendered on top of a container's SVG
#[derive(Clone, Debug, Default)]
pub struct SvgDebugVisualizer {
    boxes: Vec<(usize, PlacedRect)>,
    lines: Vec<(usize, (i32, i32), (i32, i32))>,
}

impl SvgDebugVisualizer {
    pub fn n_drawings(&self) -> usize {
        self.boxes.len() + self.lines.len()
    }
}

impl DebugVisualizer for SvgDebugVisualizer {
    fn clear(&mut self) {
        self.boxes.clear();
        self.lines.clear();
    }

    fn draw_box(&mut self, ci: usize, rect: &PlacedRect) {
        self.boxes.push((ci, *rect));
    }

    fn draw_line(&mut self, ci: usize, from: (i32, i32), to: (i32, i32)) {
        self.lines.push((ci, from, to));
    }

    fn overlay(&self, ci: usize, color: Color, stroke_width: f32) -> Option<Group> {
        let group = Group::new().set("id", format!("debug_{ci}"));
        let group = self
            .boxes
            .iter()
            .filter(|(c, _)| *c == ci)
            .fold(group, |g, (_, r)| {
                g.add(
                    rect_element(r)
                        .set("fill", "none")
                        .set("stroke", format!("{color}"))
                        .set("stroke-width", stroke_width)
                        .set("stroke-dasharray", 5.0 * stroke_width),
                )
            });
        let group = self
            .lines
            .iter()
            .filter(|(c, _, _)| *c == ci)
            .fold(group, |g, (_, (x1, y1), (x2, y2))| {
                g.add(
                    Line::new()
                        .set("x1", *x1)
                        .set("y1", *y1)
                        .set("x2", *x2)
                        .set("y2", *y2)
                        .set("stroke", format!("{color}"))
                        .set("stroke-width", stroke_width),
                )
            });
        Some(group)
    }
}
