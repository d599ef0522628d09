use super::{Aabb, BoundingVolume, OrientedBoundingVolume};
use cgmath::*;

const DIST_EPS: f64 = 1e-12;

/// Rectangle-swept sphere: a rectangle in the x/y plane of `axes`, inflated
/// in every direction by `radius`.
///
/// Two of these overlap iff the distance between their rectangles is at most
/// the sum of their radii. Fits put the rectangle across the two largest
/// extents of the local axis-aligned bounds, with the smallest extent as the
/// radius.
#[derive(Clone, Copy, Debug)]
pub struct Rss {
    pub axes: Matrix3<f64>,
    pub center: Point3<f64>,
    pub half_lengths: Vector2<f64>,
    pub radius: f64,
}

/// Closest distance between two segments.
fn segment_distance(p1: Point3<f64>, q1: Point3<f64>, p2: Point3<f64>, q2: Point3<f64>) -> f64 {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.magnitude2();
    let e = d2.magnitude2();
    let f = d2.dot(r);
    let (s, t);
    if a <= DIST_EPS && e <= DIST_EPS {
        return r.magnitude();
    }
    if a <= DIST_EPS {
        s = 0.0;
        t = (f / e).clamp(0., 1.);
    } else {
        let c = d1.dot(r);
        if e <= DIST_EPS {
            t = 0.0;
            s = (-c / a).clamp(0., 1.);
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let mut s_tmp = if denom > DIST_EPS {
                ((b * f - c * e) / denom).clamp(0., 1.)
            } else {
                0.0
            };
            let t_tmp = (b * s_tmp + f) / e;
            let t_clamped = t_tmp.clamp(0., 1.);
            if t_clamped != t_tmp {
                s_tmp = ((t_clamped * b - c) / a).clamp(0., 1.);
            }
            s = s_tmp;
            t = t_clamped;
        }
    }
    ((p1 + d1 * s) - (p2 + d2 * t)).magnitude()
}

/// Distance from a point to a rectangle spanning `(-h.x..h.x, -h.y..h.y, 0)`
/// in its own frame.
fn point_rect_distance(p: Point3<f64>, h: Vector2<f64>) -> f64 {
    let dx = (p.x.abs() - h.x).max(0.);
    let dy = (p.y.abs() - h.y).max(0.);
    (dx * dx + dy * dy + p.z * p.z).sqrt()
}

fn rect_corners(h: Vector2<f64>) -> [Point3<f64>; 4] {
    [
        point3(-h.x, -h.y, 0.),
        point3(h.x, -h.y, 0.),
        point3(h.x, h.y, 0.),
        point3(-h.x, h.y, 0.),
    ]
}

/// True if the segment pierces the rectangle's plane inside its bounds.
fn segment_pierces_rect(p: Point3<f64>, q: Point3<f64>, h: Vector2<f64>) -> bool {
    if p.z * q.z > 0. {
        return false;
    }
    let dz = p.z - q.z;
    if dz.abs() <= DIST_EPS {
        return false;
    }
    let s = p.z / dz;
    let hit = p + (q - p) * s;
    hit.x.abs() <= h.x && hit.y.abs() <= h.y
}

/// Closest distance between two rectangles, the second placed by `(rc, tc)`
/// in the first one's frame.
fn rect_distance(rc: &Matrix3<f64>, tc: &Vector3<f64>, h1: Vector2<f64>, h2: Vector2<f64>) -> f64 {
    let c1 = rect_corners(h1);
    let c2_local = rect_corners(h2);
    let mut c2 = [point3(0f64, 0., 0.); 4];
    for (out, p) in c2.iter_mut().zip(c2_local.iter()) {
        *out = Point3::from_vec(rc * p.to_vec() + tc);
    }

    // a rectangle edge passing through the other rectangle means contact
    let rt = rc.transpose();
    for k in 0..4 {
        let (p, q) = (c2[k], c2[(k + 1) % 4]);
        if segment_pierces_rect(p, q, h1) {
            return 0.;
        }
        let pl = Point3::from_vec(rt * (c1[k].to_vec() - tc));
        let ql = Point3::from_vec(rt * (c1[(k + 1) % 4].to_vec() - tc));
        if segment_pierces_rect(pl, ql, h2) {
            return 0.;
        }
    }

    let mut best = f64::MAX;
    for i in 0..4 {
        for j in 0..4 {
            best = best.min(segment_distance(
                c1[i],
                c1[(i + 1) % 4],
                c2[j],
                c2[(j + 1) % 4],
            ));
        }
    }
    for k in 0..4 {
        best = best.min(point_rect_distance(c2[k], h1));
        let local = Point3::from_vec(rt * (c1[k].to_vec() - tc));
        best = best.min(point_rect_distance(local, h2));
    }
    best
}

impl Rss {
    /// Relative rectangle transform from a mesh-level `(r, t)`, landing in
    /// `self`'s rectangle frame.
    fn rect_relative(
        &self,
        r: &Matrix3<f64>,
        t: &Vector3<f64>,
        other: &Rss,
    ) -> (Matrix3<f64>, Vector3<f64>) {
        let at = self.axes.transpose();
        let rc = at * r * other.axes;
        let tc = at * (r * other.center.to_vec() + t - self.center.to_vec());
        (rc, tc)
    }

    /// Conservative axis-aligned bounds of the swept rectangle.
    fn enclosing_corners(&self) -> [Point3<f64>; 8] {
        let e = vec3(
            self.half_lengths.x + self.radius,
            self.half_lengths.y + self.radius,
            self.radius,
        );
        let mut pts = [self.center; 8];
        for (k, pt) in pts.iter_mut().enumerate() {
            let sx = if k & 1 == 1 { 1. } else { -1. };
            let sy = if k & 2 == 2 { 1. } else { -1. };
            let sz = if k & 4 == 4 { 1. } else { -1. };
            *pt += self.axes * vec3(sx * e.x, sy * e.y, sz * e.z);
        }
        pts
    }
}

impl BoundingVolume for Rss {
    fn from_points(points: &[Point3<f64>]) -> Rss {
        let aabb = Aabb::from_points(points);
        let e = aabb.extents();
        // order the coordinate axes by extent, largest two span the rectangle
        let mut order = [0usize, 1, 2];
        order.sort_unstable_by(|&a, &b| e[b].partial_cmp(&e[a]).expect("extent is nan"));
        let unit = |i: usize| {
            let mut v = vec3(0f64, 0., 0.);
            v[i] = 1.;
            v
        };
        Rss {
            axes: Matrix3::from_cols(unit(order[0]), unit(order[1]), unit(order[2])),
            center: aabb.center(),
            half_lengths: vec2(e[order[0]], e[order[1]]),
            radius: e[order[2]],
        }
    }

    fn merge(&self, other: &Rss) -> Rss {
        let mut pts = Vec::with_capacity(16);
        pts.extend_from_slice(&self.enclosing_corners());
        pts.extend_from_slice(&other.enclosing_corners());
        Rss::from_points(&pts)
    }

    fn overlap(&self, other: &Rss) -> bool {
        let (rc, tc) = self.rect_relative(&Matrix3::identity(), &vec3(0., 0., 0.), other);
        rect_distance(&rc, &tc, self.half_lengths, other.half_lengths)
            <= self.radius + other.radius
    }

    fn center(&self) -> Point3<f64> {
        self.center
    }

    fn size(&self) -> f64 {
        (2. * self.half_lengths.x + 2. * self.radius)
            * (2. * self.half_lengths.y + 2. * self.radius)
            * (2. * self.radius)
    }
}

impl OrientedBoundingVolume for Rss {
    fn overlap_oriented(r: &Matrix3<f64>, t: &Vector3<f64>, b1: &Rss, b2: &Rss) -> bool {
        let (rc, tc) = b1.rect_relative(r, t, b2);
        rect_distance(&rc, &tc, b1.half_lengths, b2.half_lengths) <= b1.radius + b2.radius
    }
}
