//! Stateless triangle-pair kernels.
//!
//! Everything here is a pure function over vertex triples; callers pick the
//! calling convention. The `_transformed` variants take triangles in their
//! own mesh frames together with an `(r, t)` mapping the second mesh's frame
//! into the first one's, and report results in the first frame.

use crate::bv::Aabb;
use cgmath::*;

const EPS: f64 = 1e-10;

/// Contact manifold for one triangle pair: up to two points on the
/// intersection segment, a separating direction for the second triangle,
/// and the depth along it.
#[derive(Clone, Copy, Debug)]
pub struct TriContact {
    pub points: [Point3<f64>; 2],
    pub num_points: usize,
    pub normal: Vector3<f64>,
    pub penetration: f64,
}

impl TriContact {
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points[..self.num_points]
    }
}

pub fn triangle_aabb(tri: &[Point3<f64>; 3]) -> Aabb {
    Aabb::from_points(&tri[..])
}

fn tri_normal(tri: &[Point3<f64>; 3]) -> Option<Vector3<f64>> {
    let n = (tri[2] - tri[0]).cross(tri[1] - tri[0]);
    if n.magnitude2() < EPS * EPS {
        None
    } else {
        Some(n.normalize())
    }
}

/// Signed distances of `tri`'s vertices to the plane through `on_plane` with
/// normal `normal`, and whether all three lie strictly on one side.
fn plane_side(
    on_plane: &Point3<f64>,
    tri: &[Point3<f64>; 3],
    normal: &Vector3<f64>,
) -> (bool, Vector3<f64>) {
    let d = -normal.dot(on_plane.to_vec());
    let dists = vec3(
        d + normal.dot(tri[0].to_vec()),
        d + normal.dot(tri[1].to_vec()),
        d + normal.dot(tri[2].to_vec()),
    );
    let apart = dists.x < 0. && dists.y < 0. && dists.z < 0.
        || dists.x > 0. && dists.y > 0. && dists.z > 0.;
    (apart, dists)
}

fn is_coplanar(dists: &Vector3<f64>) -> bool {
    dists.x.abs() < EPS && dists.y.abs() < EPS && dists.z.abs() < EPS
}

fn abs_max_dim(v: &Vector3<f64>) -> usize {
    let mut idx = 0;
    for i in 1..3 {
        if v[i].abs() > v[idx].abs() {
            idx = i;
        }
    }
    idx
}

/// Index of the vertex alone on its side of the plane, then the other two.
fn lone_vertex(dists: &Vector3<f64>) -> (usize, usize, usize) {
    if dists[0] * dists[1] > 0. {
        (2, 0, 1)
    } else if dists[0] * dists[2] > 0. {
        (1, 0, 2)
    } else {
        (0, 1, 2)
    }
}

/// Point on the segment `from`..`to` where the signed distance interpolates
/// to zero.
fn edge_crossing(from: Point3<f64>, to: Point3<f64>, d_from: f64, d_to: f64) -> Point3<f64> {
    from + (to - from) * (d_from / (d_from - d_to))
}

/// The two points where `tri`'s edges cross the other triangle's plane.
/// Requires the vertices to straddle the plane.
fn crossing_points(
    tri: &[Point3<f64>; 3],
    dists: &Vector3<f64>,
) -> (Point3<f64>, Point3<f64>) {
    let (lone, a, b) = lone_vertex(dists);
    (
        edge_crossing(tri[a], tri[lone], dists[a], dists[lone]),
        edge_crossing(tri[b], tri[lone], dists[b], dists[lone]),
    )
}

fn order_interval(interval: (f64, f64)) -> (f64, f64) {
    if interval.0 > interval.1 {
        (interval.1, interval.0)
    } else {
        interval
    }
}

fn interval_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    let a = order_interval(a);
    let b = order_interval(b);
    a.0 - EPS <= b.1 && b.0 - EPS <= a.1
}

fn cross_2d(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

fn segments_intersect_2d(
    start_a: &Point2<f64>,
    end_a: &Point2<f64>,
    start_b: &Point2<f64>,
    end_b: &Point2<f64>,
) -> bool {
    let a = end_a - start_a;
    let b = end_b - start_b;
    let rs = cross_2d(&a, &b);
    let qpr = cross_2d(&(start_b - start_a), &a);

    if rs.abs() < EPS && qpr.abs() < EPS {
        // collinear; compare spans along the shared direction
        let l = a.normalize();
        let span_a = (start_a.to_vec().dot(l), end_a.to_vec().dot(l));
        let span_b = (start_b.to_vec().dot(l), end_b.to_vec().dot(l));
        return interval_overlap(span_a, span_b);
    } else if rs.abs() < EPS {
        return false;
    }

    let t = cross_2d(&(start_b - start_a), &b) / rs;
    let u = qpr / rs;
    t >= -EPS && t <= 1. + EPS && u >= -EPS && u <= 1. + EPS
}

fn point_in_triangle_2d(p: &Point2<f64>, tri: &[Point2<f64>; 3]) -> bool {
    let s0 = cross_2d(&(tri[1] - tri[0]), &(p - tri[0]));
    let s1 = cross_2d(&(tri[2] - tri[1]), &(p - tri[1]));
    let s2 = cross_2d(&(tri[0] - tri[2]), &(p - tri[2]));
    s0 >= -EPS && s1 >= -EPS && s2 >= -EPS || s0 <= EPS && s1 <= EPS && s2 <= EPS
}

/// Overlap test for two triangles known to share a plane, run in the 2D
/// projection that drops the dominant normal axis.
fn coplanar_overlap(
    normal: &Vector3<f64>,
    t1: &[Point3<f64>; 3],
    t2: &[Point3<f64>; 3],
) -> bool {
    let axis = abs_max_dim(normal);
    let x = (axis + 1) % 3;
    let y = (axis + 2) % 3;
    let flat = |t: &[Point3<f64>; 3]| [
        point2(t[0][x], t[0][y]),
        point2(t[1][x], t[1][y]),
        point2(t[2][x], t[2][y]),
    ];
    let a = flat(t1);
    let b = flat(t2);
    for i in 0..3 {
        for j in 0..3 {
            if segments_intersect_2d(&a[i], &a[(i + 1) % 3], &b[j], &b[(j + 1) % 3]) {
                return true;
            }
        }
    }
    // no edges cross, but one triangle may sit inside the other
    point_in_triangle_2d(&a[0], &b) || point_in_triangle_2d(&b[0], &a)
}

/// True if the two triangles, expressed in a common frame, intersect.
/// Degenerate (zero-area) triangles never intersect anything.
pub fn tri_overlap(t1: &[Point3<f64>; 3], t2: &[Point3<f64>; 3]) -> bool {
    let (n1, n2) = match (tri_normal(t1), tri_normal(t2)) {
        (Some(n1), Some(n2)) => (n1, n2),
        _ => return false,
    };
    let (t2_apart, d2) = plane_side(&t1[0], t2, &n1);
    let (t1_apart, d1) = plane_side(&t2[0], t1, &n2);
    if t2_apart || t1_apart {
        return false;
    }
    if is_coplanar(&d2) {
        return coplanar_overlap(&n1, t1, t2);
    }
    let line = n1.cross(n2).normalize();
    let idx = abs_max_dim(&line);
    let proj1 = vec3(t1[0][idx], t1[1][idx], t1[2][idx]);
    let proj2 = vec3(t2[0][idx], t2[1][idx], t2[2][idx]);
    let (l1, a1, b1) = lone_vertex(&d1);
    let (l2, a2, b2) = lone_vertex(&d2);
    let param = |proj: &Vector3<f64>, d: &Vector3<f64>, lone: usize, v: usize| {
        proj[v] + (proj[lone] - proj[v]) * d[v] / (d[v] - d[lone])
    };
    let span1 = (param(&proj1, &d1, l1, a1), param(&proj1, &d1, l1, b1));
    let span2 = (param(&proj2, &d2, l2, a2), param(&proj2, &d2, l2, b2));
    interval_overlap(span1, span2)
}

/// Like [`tri_overlap`], with the second triangle given in its own mesh
/// frame and mapped through `(r, t)`.
pub fn tri_overlap_transformed(
    t1: &[Point3<f64>; 3],
    t2: &[Point3<f64>; 3],
    r: &Matrix3<f64>,
    t: &Vector3<f64>,
) -> bool {
    tri_overlap(t1, &map_triangle(t2, r, t))
}

/// Contact manifold between two triangles in a common frame, or `None` when
/// they do not intersect.
///
/// The contact points are the ends of the segment both triangles share. The
/// penetration is how far the second triangle's vertex span reaches across
/// the first triangle's supporting plane on the shallow side, and the
/// normal is the matching push-out direction for the second mesh.
pub fn tri_contact(t1: &[Point3<f64>; 3], t2: &[Point3<f64>; 3]) -> Option<TriContact> {
    let n1 = tri_normal(t1)?;
    let n2 = tri_normal(t2)?;
    let (t2_apart, d2) = plane_side(&t1[0], t2, &n1);
    let (t1_apart, d1) = plane_side(&t2[0], t1, &n2);
    if t2_apart || t1_apart {
        return None;
    }
    if is_coplanar(&d2) {
        if !coplanar_overlap(&n1, t1, t2) {
            return None;
        }
        let c = Point3::from_vec((t1[0].to_vec() + t1[1].to_vec() + t1[2].to_vec()) / 3.);
        return Some(TriContact {
            points: [c; 2],
            num_points: 1,
            normal: n1,
            penetration: 0.,
        });
    }

    let line = n1.cross(n2).normalize();
    let param = |p: &Point3<f64>| p.to_vec().dot(line);
    let order = |pair: (Point3<f64>, Point3<f64>)| {
        if param(&pair.0) > param(&pair.1) {
            (pair.1, pair.0)
        } else {
            pair
        }
    };
    let (p_lo, p_hi) = order(crossing_points(t1, &d1));
    let (q_lo, q_hi) = order(crossing_points(t2, &d2));
    let lo = if param(&p_lo) >= param(&q_lo) { p_lo } else { q_lo };
    let hi = if param(&p_hi) <= param(&q_hi) { p_hi } else { q_hi };
    if param(&lo) > param(&hi) + EPS {
        return None;
    }
    let num_points = if (hi - lo).magnitude2() < EPS { 1 } else { 2 };

    let below = (-d2.x).max(-d2.y).max(-d2.z).max(0.);
    let above = d2.x.max(d2.y).max(d2.z).max(0.);
    let (penetration, normal) = if below <= above {
        (below, n1)
    } else {
        (above, -n1)
    };
    Some(TriContact {
        points: [lo, hi],
        num_points,
        normal,
        penetration,
    })
}

/// Like [`tri_contact`], with the second triangle mapped through `(r, t)`.
/// Points and normal come back in the first mesh's frame.
pub fn tri_contact_transformed(
    t1: &[Point3<f64>; 3],
    t2: &[Point3<f64>; 3],
    r: &Matrix3<f64>,
    t: &Vector3<f64>,
) -> Option<TriContact> {
    tri_contact(t1, &map_triangle(t2, r, t))
}

fn map_triangle(
    tri: &[Point3<f64>; 3],
    r: &Matrix3<f64>,
    t: &Vector3<f64>,
) -> [Point3<f64>; 3] {
    [
        Point3::from_vec(r * tri[0].to_vec() + t),
        Point3::from_vec(r * tri[1].to_vec() + t),
        Point3::from_vec(r * tri[2].to_vec() + t),
    ]
}
