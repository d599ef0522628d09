use super::{BoundingVolume, Obb, OrientedBoundingVolume, Rss};
use cgmath::*;

/// Composite of an [`Obb`] and an [`Rss`] fitted to the same geometry.
///
/// Overlap queries answer through the box half; the swept-sphere half rides
/// along for callers that want its tighter surface.
#[derive(Clone, Copy, Debug)]
pub struct ObbRss {
    pub obb: Obb,
    pub rss: Rss,
}

impl BoundingVolume for ObbRss {
    fn from_points(points: &[Point3<f64>]) -> ObbRss {
        ObbRss {
            obb: Obb::from_points(points),
            rss: Rss::from_points(points),
        }
    }

    fn merge(&self, other: &ObbRss) -> ObbRss {
        let mut pts = Vec::with_capacity(16);
        pts.extend_from_slice(&self.obb.corners());
        pts.extend_from_slice(&other.obb.corners());
        ObbRss::from_points(&pts)
    }

    fn overlap(&self, other: &ObbRss) -> bool {
        self.obb.overlap(&other.obb)
    }

    fn center(&self) -> Point3<f64> {
        BoundingVolume::center(&self.obb)
    }

    fn size(&self) -> f64 {
        self.obb.size()
    }
}

impl OrientedBoundingVolume for ObbRss {
    fn overlap_oriented(r: &Matrix3<f64>, t: &Vector3<f64>, b1: &ObbRss, b2: &ObbRss) -> bool {
        Obb::overlap_oriented(r, t, &b1.obb, &b2.obb)
    }
}
