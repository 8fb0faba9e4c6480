use anyhow::{Context, Result, ensure};

use crate::entities::BPInstance;
use crate::geometry::Rect;
use crate::io::ext_repr::ExtBPInstance;

/// Imports an instance into the library
pub fn import(ext_instance: &ExtBPInstance) -> Result<BPInstance> {
    let boxes = ext_instance
        .boxes
        .iter()
        .map(|b| {
            ensure!(
                b.width > 0 && b.height > 0,
                "invalid box dimensions: {}x{}",
                b.width,
                b.height
            );
            Ok(Rect::new(b.width, b.height))
        })
        .collect::<Result<Vec<_>>>()?;

    BPInstance::new(ext_instance.container_size, boxes)
        .with_context(|| format!("invalid instance: {}", ext_instance.name))
}
