use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox3 {
    pub min: DVec3,
    pub max: DVec3,
}

impl BBox3 {
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// A cube centered on the origin with the given half extent.
    pub fn cube(half_extent: f64) -> Self {
        Self::new(DVec3::splat(-half_extent), DVec3::splat(half_extent))
    }

    pub fn from_center_size(center: DVec3, size: DVec3) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Whether `other` lies entirely inside this box (touching faces count as inside).
    pub fn contains(&self, other: &BBox3) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    pub fn contains_point(&self, point: DVec3) -> bool {
        self.min.cmple(point).all() && self.max.cmpge(point).all()
    }

    pub fn intersects(&self, other: &BBox3) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    pub fn merge(&self, other: &BBox3) -> BBox3 {
        BBox3::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn translate(&self, delta: DVec3) -> BBox3 {
        BBox3::new(self.min + delta, self.max + delta)
    }
}
