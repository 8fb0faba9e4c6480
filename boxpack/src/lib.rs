//!
//! Two-dimensional rectangle bin packing: geometry, container free-space bookkeeping,
//! problem instances and solutions.
//!
//! Everything that searches for a packing lives in `boxpack-opt`, this crate only models
//! the state that is being searched over.

/// Axis-aligned rectangles, placed or not, and the operations on them
pub mod geometry;

/// Containers, instances, problems and solutions
pub mod entities;

/// Instance generation, external representations, SVG and debug drawing
pub mod io;

/// Helper functions which do not belong to any specific module
pub mod util;
