//! Bounding volume kinds used by the collision hierarchies.

mod aabb;
mod kios;
mod obb;
mod obbrss;
mod rss;

pub use aabb::Aabb;
pub use kios::{Kios, Sphere};
pub use obb::{obb_disjoint, Obb};
pub use obbrss::ObbRss;
pub use rss::Rss;

use cgmath::*;

/// Capabilities every bounding volume kind provides.
pub trait BoundingVolume: Clone + std::fmt::Debug {
    /// Fits a volume of this kind around `points`. Panics on an empty slice.
    fn from_points(points: &[Point3<f64>]) -> Self;

    /// A volume enclosing both `self` and `other`.
    fn merge(&self, other: &Self) -> Self;

    /// True if the two volumes, expressed in a common frame, overlap.
    fn overlap(&self, other: &Self) -> bool;

    fn center(&self) -> Point3<f64>;

    /// Rough measure of occupied space. Only compared between volumes of the
    /// same kind, to pick which hierarchy to descend first.
    fn size(&self) -> f64;
}

/// Volumes that can be tested without baking mesh transforms into vertices.
///
/// `r` and `t` map `b2`'s frame into `b1`'s frame.
pub trait OrientedBoundingVolume: BoundingVolume {
    fn overlap_oriented(r: &Matrix3<f64>, t: &Vector3<f64>, b1: &Self, b2: &Self) -> bool;
}
