use super::{Aabb, BoundingVolume, OrientedBoundingVolume};
use cgmath::*;

#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

/// Bounding volume kept as the intersection of a few enclosing spheres.
///
/// Every sphere individually contains the bounded geometry, so two of these
/// volumes are certainly apart as soon as any sphere of one is apart from
/// any sphere of the other.
#[derive(Clone, Debug)]
pub struct Kios {
    pub spheres: Vec<Sphere>,
}

fn enclosing_sphere(center: Point3<f64>, corners: &[Point3<f64>; 8]) -> Sphere {
    let mut radius = 0f64;
    for c in corners {
        radius = radius.max((c - center).magnitude());
    }
    Sphere { center, radius }
}

fn aabb_corners(aabb: &Aabb) -> [Point3<f64>; 8] {
    let (lo, hi) = (aabb.min, aabb.max);
    [
        point3(lo.x, lo.y, lo.z),
        point3(hi.x, lo.y, lo.z),
        point3(lo.x, hi.y, lo.z),
        point3(hi.x, hi.y, lo.z),
        point3(lo.x, lo.y, hi.z),
        point3(hi.x, lo.y, hi.z),
        point3(lo.x, hi.y, hi.z),
        point3(hi.x, hi.y, hi.z),
    ]
}

impl BoundingVolume for Kios {
    fn from_points(points: &[Point3<f64>]) -> Kios {
        let aabb = Aabb::from_points(points);
        let corners = aabb_corners(&aabb);
        let center = aabb.center();
        let e = aabb.extents();
        let mut axis = 0;
        for i in 1..3 {
            if e[i] > e[axis] {
                axis = i;
            }
        }
        let mut offset = vec3(0f64, 0., 0.);
        offset[axis] = e[axis] * 0.5;
        let spheres = vec![
            enclosing_sphere(center, &corners),
            enclosing_sphere(center + offset, &corners),
            enclosing_sphere(center - offset, &corners),
        ];
        Kios { spheres }
    }

    fn merge(&self, other: &Kios) -> Kios {
        // bounds of the primary spheres cover both volumes
        let mut pts = Vec::with_capacity(4);
        for s in [&self.spheres[0], &other.spheres[0]].iter() {
            let r = vec3(s.radius, s.radius, s.radius);
            pts.push(s.center - r);
            pts.push(s.center + r);
        }
        Kios::from_points(&pts)
    }

    fn overlap(&self, other: &Kios) -> bool {
        for s1 in &self.spheres {
            for s2 in &other.spheres {
                let gap2 = (s1.radius + s2.radius).powi(2);
                if (s2.center - s1.center).magnitude2() > gap2 {
                    return false;
                }
            }
        }
        true
    }

    fn center(&self) -> Point3<f64> {
        self.spheres[0].center
    }

    fn size(&self) -> f64 {
        self.spheres[0].radius.powi(3)
    }
}

impl OrientedBoundingVolume for Kios {
    fn overlap_oriented(r: &Matrix3<f64>, t: &Vector3<f64>, b1: &Kios, b2: &Kios) -> bool {
        for s1 in &b1.spheres {
            for s2 in &b2.spheres {
                let c2 = r * s2.center.to_vec() + t;
                let gap2 = (s1.radius + s2.radius).powi(2);
                if (c2 - s1.center.to_vec()).magnitude2() > gap2 {
                    return false;
                }
            }
        }
        true
    }
}
