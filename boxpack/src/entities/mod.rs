mod container;
mod instance;
mod problem;
mod solution;

/// Skyline based container
pub mod segment_container;

/// Free rectangle based container
pub mod space_container;

#[doc(inline)]
pub use container::Container;

#[doc(inline)]
pub use instance::BPInstance;

#[doc(inline)]
pub use problem::BPProblem;

#[doc(inline)]
pub use solution::BPSolution;

#[doc(inline)]
pub use segment_container::{Segment, SegmentContainer};

#[doc(inline)]
pub use space_container::SpaceContainer;
