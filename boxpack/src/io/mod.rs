/// Seeded generation of random instances
pub mod generator;

/// External representation of instances and solutions, as read and written by the outside world
pub mod ext_repr;

/// Conversion of external instances into [`BPInstance`](crate::entities::BPInstance)s
pub mod import;

/// Conversion of [`BPSolution`](crate::entities::BPSolution)s into their external representation
pub mod export;

/// Diagnostic drawing hooks for optimizers
pub mod debug;

/// SVG rendering of solutions
pub mod svg;
