//! Coordinate bounds for persisted graphs

use serde::{Deserialize, Serialize};

/// Height of the coordinate space
pub const DEFAULT_MAX_Y: f64 = 1000.0;

/// Width of the coordinate space, matching a 1980x1080 canvas
pub const DEFAULT_MAX_X: f64 = DEFAULT_MAX_Y * 1980.0 / 1080.0;

/// The rectangle `[0, max_x] x [0, max_y]` node coordinates must lie in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphExtent {
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for GraphExtent {
    fn default() -> Self {
        Self {
            max_x: DEFAULT_MAX_X,
            max_y: DEFAULT_MAX_Y,
        }
    }
}

impl GraphExtent {
    pub fn new(max_x: f64, max_y: f64) -> Self {
        Self { max_x, max_y }
    }

    /// Check if a point lies inside the extent, edges included
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.max_x).contains(&x) && (0.0..=self.max_y).contains(&y)
    }

    /// Describe why a coordinate pair is out of bounds, if it is
    pub fn check(&self, x: f64, y: f64) -> Option<String> {
        if !x.is_finite() || !y.is_finite() {
            return Some(format!("coordinates ({}, {}) are not finite", x, y));
        }
        if !self.contains(x, y) {
            return Some(format!(
                "coordinates ({}, {}) outside extent {}x{}",
                x, y, self.max_x, self.max_y
            ));
        }
        None
    }
}
