use serde::{Deserialize, Serialize};

/// Bin packing instance
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtBPInstance {
    /// The name of the instance
    pub name: String,
    /// Width and height of every (square) container
    pub container_size: i32,
    /// Rectangles to be packed
    pub boxes: Vec<ExtBox>,
}

/// Unplaced rectangle
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct ExtBox {
    pub width: i32,
    pub height: i32,
}

/// Rectangle placed with its corner closest to the origin at `(x, y)`
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct ExtPlacedBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A single container and the rectangles placed inside it
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtContainer {
    /// Index of the container in the solution
    pub index: usize,
    pub boxes: Vec<ExtPlacedBox>,
    /// Fraction of the container covered by rectangles
    pub density: f64,
}

/// Bin packing solution
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtBPSolution {
    pub n_containers: usize,
    /// Minimum number of containers any solution needs
    pub lower_bound: usize,
    pub containers: Vec<ExtContainer>,
    /// Sum of the area of the rectangles divided by the sum of the area of the containers
    pub density: f64,
    /// Average density of all containers but the least dense one
    pub k1_density: f64,
    /// The time it took to generate the solution in seconds
    pub run_time_sec: f64,
}
