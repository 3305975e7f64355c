//! Planar polygon area over raw latitude/longitude degrees.
//!
//! Degrees are treated as a flat Cartesian plane and scaled by a fixed
//! meters-per-degree factor with no latitude correction. Results are a
//! rough estimate, not a geodesic area.

use crate::domain::model::{AreaUnit, BoundaryPath, Coordinate, MIN_BOUNDARY_POINTS};

/// 每度約 111,320 公尺（未做緯度修正）
pub const METERS_PER_DEGREE: f64 = 111_320.0;

pub struct AreaEngine;

impl AreaEngine {
    /// Area of `path` in `unit`. Paths with fewer than 3 points yield 0.
    pub fn compute_area(path: &BoundaryPath, unit: AreaUnit) -> f64 {
        if path.len() < MIN_BOUNDARY_POINTS {
            return 0.0;
        }

        let square_degrees = shoelace_magnitude(path.points());
        unit.convert_square_meters(square_degrees_to_square_meters(square_degrees))
    }
}

/// 鞋帶公式：|Σ(lat_i·lng_{i+1} − lat_{i+1}·lng_i)| / 2
pub fn shoelace_magnitude(points: &[Coordinate]) -> f64 {
    let n = points.len();
    if n < MIN_BOUNDARY_POINTS {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].lat * points[j].lng;
        sum -= points[j].lat * points[i].lng;
    }

    sum.abs() / 2.0
}

pub fn square_degrees_to_square_meters(square_degrees: f64) -> f64 {
    square_degrees * METERS_PER_DEGREE * METERS_PER_DEGREE
}

impl AreaUnit {
    pub fn convert_square_meters(self, square_meters: f64) -> f64 {
        square_meters / self.square_meters_per_unit()
    }
}
