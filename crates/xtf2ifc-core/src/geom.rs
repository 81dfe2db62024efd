use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn with_z(self, z: f64) -> Vec3 {
        Vec3::new(self.x, self.y, z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    pub fn planar(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

pub fn planar_distance(a: Vec2, b: Vec2) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Elevation at `at` on the straight line from `start` to `end`, weighted by
/// the planar distance of `at` from `start`.
///
/// Coincident endpoints yield `start_z`. With `clamp` the result never leaves
/// the band spanned by the two endpoint elevations, so points past either end
/// of the segment are pinned to that end.
pub fn interpolate_elevation(
    start: Vec2,
    end: Vec2,
    start_z: f64,
    end_z: f64,
    at: Vec2,
    clamp: bool,
) -> f64 {
    let total = planar_distance(start, end);
    if !total.is_finite() || total == 0.0 {
        return start_z;
    }
    let fraction = planar_distance(start, at) / total;
    let z = start_z + (end_z - start_z) * fraction;
    if clamp && start_z.is_finite() && end_z.is_finite() {
        z.clamp(start_z.min(end_z), start_z.max(end_z))
    } else {
        z
    }
}

pub fn centroid(points: &[Vec2]) -> Option<Vec2> {
    if points.is_empty() {
        return None;
    }
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for p in points {
        sum_x += p.x;
        sum_y += p.y;
    }
    let n = points.len() as f64;
    Some(Vec2::new(sum_x / n, sum_y / n))
}

pub fn planar_direction(from: Vec2, to: Vec2) -> Option<Vec2> {
    let len = planar_distance(from, to);
    if !len.is_finite() || len < 1e-12 {
        return None;
    }
    Some(Vec2::new((to.x - from.x) / len, (to.y - from.y) / len))
}

pub fn floor_to_multiple(value: f64, step: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    (value / step).floor() * step
}

pub fn approx_same_position(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
}
