use super::BoundingVolume;
use cgmath::*;

/// Axis-aligned bounding box kept as min/max corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Aabb {
        Aabb { min, max }
    }

    pub fn from_points(points: &[Point3<f64>]) -> Aabb {
        assert!(!points.is_empty(), "cannot bound zero points");
        let mut min = points[0];
        let mut max = points[0];
        for pt in &points[1..] {
            for i in 0..3 {
                min[i] = min[i].min(pt[i]);
                max[i] = max[i].max(pt[i]);
            }
        }
        Aabb { min, max }
    }

    pub fn center(&self) -> Point3<f64> {
        self.min + (self.max - self.min) / 2.0
    }

    /// Half-widths along each axis.
    pub fn extents(&self) -> Vector3<f64> {
        (self.max - self.min) / 2.0
    }

    pub fn vol(&self) -> f64 {
        let d = self.max - self.min;
        d.x * d.y * d.z
    }

    pub fn overlap(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// The overlapping region of the two boxes, if any.
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        if !self.overlap(other) {
            return None;
        }
        let mut min = self.min;
        let mut max = self.max;
        for i in 0..3 {
            min[i] = min[i].max(other.min[i]);
            max[i] = max[i].min(other.max[i]);
        }
        Some(Aabb { min, max })
    }

    pub fn merge(&self, other: &Aabb) -> Aabb {
        let mut min = self.min;
        let mut max = self.max;
        for i in 0..3 {
            min[i] = min[i].min(other.min[i]);
            max[i] = max[i].max(other.max[i]);
        }
        Aabb { min, max }
    }

    pub fn contains_point(&self, p: Point3<f64>) -> bool {
        (0..3).all(|i| self.min[i] <= p[i] && p[i] <= self.max[i])
    }
}

impl BoundingVolume for Aabb {
    fn from_points(points: &[Point3<f64>]) -> Aabb {
        Aabb::from_points(points)
    }

    fn merge(&self, other: &Aabb) -> Aabb {
        Aabb::merge(self, other)
    }

    fn overlap(&self, other: &Aabb) -> bool {
        Aabb::overlap(self, other)
    }

    fn center(&self) -> Point3<f64> {
        Aabb::center(self)
    }

    fn size(&self) -> f64 {
        self.vol()
    }
}
