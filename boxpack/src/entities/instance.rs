use anyhow::{Result, ensure};

use crate::geometry::Rect;

/// Immutable bin packing instance: a square container size and the rectangles to pack into
/// as few containers as possible.
#[derive(Debug, Clone)]
pub struct BPInstance {
    pub container_size: i32,
    pub boxes: Vec<Rect>,
    /// `ceil(total box area / container area)`, no packing can use fewer containers
    pub lower_bound: usize,
}

impl BPInstance {
    pub fn new(container_size: i32, boxes: Vec<Rect>) -> Result<Self> {
        ensure!(
            container_size > 0,
            "container size must be positive, got {container_size}"
        );
        let container = Rect::new(container_size, container_size);
        for (i, b) in boxes.iter().enumerate() {
            ensure!(
                container.fits(b),
                "box {i} {b} does not fit a container of size {container_size}"
            );
        }

        let container_area = container.area();
        let total_area = boxes.iter().map(|b| b.area()).sum::<i64>();
        let lower_bound = ((total_area + container_area - 1) / container_area) as usize;

        Ok(Self {
            container_size,
            boxes,
            lower_bound,
        })
    }

    pub fn container_area(&self) -> i64 {
        self.container_size as i64 * self.container_size as i64
    }

    pub fn total_box_area(&self) -> i64 {
        self.boxes.iter().map(|b| b.area()).sum()
    }
}
