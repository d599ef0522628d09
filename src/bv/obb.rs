use super::{Aabb, BoundingVolume, OrientedBoundingVolume};
use cgmath::*;

/// Margin added to the absolute rotation entries so that near-parallel edge
/// cross products cannot produce a spurious separating axis.
const AXIS_EPS: f64 = 1e-6;

/// Oriented box: orthonormal axes (columns of `axes`), center, half-extents.
///
/// Fits are axis-aligned in the owning mesh's local frame; the orientation
/// comes in through the relative transform between two mesh frames.
#[derive(Clone, Copy, Debug)]
pub struct Obb {
    pub axes: Matrix3<f64>,
    pub center: Point3<f64>,
    pub extents: Vector3<f64>,
}

/// Separating-axis test for two boxes related by `(rc, tc)`, everything
/// expressed in the first box's frame. Returns `true` when a separating axis
/// exists, i.e. the boxes are disjoint.
///
/// If a line can be drawn between two boxes they do not collide. Face-face
/// and face-edge cases are covered by the three axes of each box, edge-edge
/// cases by the nine pairwise cross products.
pub fn obb_disjoint(
    rc: &Matrix3<f64>,
    tc: &Vector3<f64>,
    e1: &Vector3<f64>,
    e2: &Vector3<f64>,
) -> bool {
    // row i, column j of the rotation; cgmath stores columns
    let r = |i: usize, j: usize| rc[j][i];
    let ar = |i: usize, j: usize| r(i, j).abs() + AXIS_EPS;

    // axes of the first box
    for i in 0..3 {
        let ra = e1[i];
        let rb = e2[0] * ar(i, 0) + e2[1] * ar(i, 1) + e2[2] * ar(i, 2);
        if tc[i].abs() > ra + rb {
            return true;
        }
    }
    // axes of the second box
    for j in 0..3 {
        let ra = e1[0] * ar(0, j) + e1[1] * ar(1, j) + e1[2] * ar(2, j);
        let rb = e2[j];
        let t = tc[0] * r(0, j) + tc[1] * r(1, j) + tc[2] * r(2, j);
        if t.abs() > ra + rb {
            return true;
        }
    }
    // cross products of axis pairs
    for i in 0..3 {
        let i1 = (i + 1) % 3;
        let i2 = (i + 2) % 3;
        for j in 0..3 {
            let j1 = (j + 1) % 3;
            let j2 = (j + 2) % 3;
            let ra = e1[i1] * ar(i2, j) + e1[i2] * ar(i1, j);
            let rb = e2[j1] * ar(i, j2) + e2[j2] * ar(i, j1);
            let t = tc[i2] * r(i1, j) - tc[i1] * r(i2, j);
            if t.abs() > ra + rb {
                return true;
            }
        }
    }
    false
}

impl Obb {
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let mut pts = [self.center; 8];
        for (k, pt) in pts.iter_mut().enumerate() {
            let sx = if k & 1 == 1 { 1. } else { -1. };
            let sy = if k & 2 == 2 { 1. } else { -1. };
            let sz = if k & 4 == 4 { 1. } else { -1. };
            *pt += self.axes * vec3(
                sx * self.extents.x,
                sy * self.extents.y,
                sz * self.extents.z,
            );
        }
        pts
    }

    /// Relative box transform from a mesh-level `(r, t)`, landing in
    /// `self`'s box frame.
    fn box_relative(
        &self,
        r: &Matrix3<f64>,
        t: &Vector3<f64>,
        other: &Obb,
    ) -> (Matrix3<f64>, Vector3<f64>) {
        let at = self.axes.transpose();
        let rc = at * r * other.axes;
        let tc = at * (r * other.center.to_vec() + t - self.center.to_vec());
        (rc, tc)
    }
}

impl BoundingVolume for Obb {
    fn from_points(points: &[Point3<f64>]) -> Obb {
        let aabb = Aabb::from_points(points);
        Obb {
            axes: Matrix3::identity(),
            center: aabb.center(),
            extents: aabb.extents(),
        }
    }

    fn merge(&self, other: &Obb) -> Obb {
        let mut pts = Vec::with_capacity(16);
        pts.extend_from_slice(&self.corners());
        pts.extend_from_slice(&other.corners());
        Obb::from_points(&pts)
    }

    fn overlap(&self, other: &Obb) -> bool {
        let (rc, tc) = self.box_relative(&Matrix3::identity(), &vec3(0., 0., 0.), other);
        !obb_disjoint(&rc, &tc, &self.extents, &other.extents)
    }

    fn center(&self) -> Point3<f64> {
        self.center
    }

    fn size(&self) -> f64 {
        8. * self.extents.x * self.extents.y * self.extents.z
    }
}

impl OrientedBoundingVolume for Obb {
    fn overlap_oriented(r: &Matrix3<f64>, t: &Vector3<f64>, b1: &Obb, b2: &Obb) -> bool {
        let (rc, tc) = b1.box_relative(r, t, b2);
        !obb_disjoint(&rc, &tc, &b1.extents, &b2.extents)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn unit_box_at(center: Point3<f64>) -> Obb {
        Obb {
            axes: Matrix3::identity(),
            center,
            extents: vec3(0.5, 0.5, 0.5),
        }
    }

    #[test]
    fn basic_collision() {
        let a = unit_box_at(point3(0., 0., 0.));
        let b = unit_box_at(point3(0.75, 0., 0.));
        let c = unit_box_at(point3(2., 2., 2.));
        assert_eq!(a.overlap(&b), true);
        assert_eq!(a.overlap(&c), false);
        assert_eq!(b.overlap(&c), false);
    }

    #[test]
    fn rotation_collisions() {
        // gap of 0.05 between the faces; a 45 degree twist closes it
        let a = unit_box_at(point3(0., 0., 0.));
        let b = unit_box_at(point3(0., 0., 0.));
        let ident = Matrix3::identity();
        let spin = Matrix3::from_angle_z(Deg(45.));
        assert_eq!(
            Obb::overlap_oriented(&ident, &vec3(1.05, 0., 0.), &a, &b),
            false
        );
        assert_eq!(
            Obb::overlap_oriented(&spin, &vec3(1.05, 0., 0.), &a, &b),
            true
        );
    }

    #[test]
    fn edge_edge_collision() {
        // the spun box presents an edge; it reaches sqrt(2)/2 along x
        let a = unit_box_at(point3(0., 0., 0.));
        let b = unit_box_at(point3(0., 0., 0.));
        let spin = Matrix3::from_angle_z(Deg(45.));
        let reach = 0.5 + 2f64.sqrt() / 2.;
        assert_eq!(
            Obb::overlap_oriented(&spin, &vec3(reach - 0.01, 0., 0.), &a, &b),
            true
        );
        assert_eq!(
            Obb::overlap_oriented(&spin, &vec3(reach + 0.01, 0., 0.), &a, &b),
            false
        );
    }
}
