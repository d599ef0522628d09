use cgmath::*;

/// A rigid placement (rotation then translation) of a mesh in world space.
#[derive(Clone, Copy, Debug)]
pub struct RigidTransform {
    pub rot: Matrix3<f64>,
    pub pos: Vector3<f64>,
}

impl RigidTransform {
    pub fn new(rot: Matrix3<f64>, pos: Vector3<f64>) -> RigidTransform {
        RigidTransform { rot, pos }
    }

    pub fn identity() -> RigidTransform {
        RigidTransform {
            rot: Matrix3::identity(),
            pos: vec3(0., 0., 0.),
        }
    }

    pub fn from_translation(pos: Vector3<f64>) -> RigidTransform {
        RigidTransform {
            rot: Matrix3::identity(),
            pos,
        }
    }

    /// True if applying this transform moves nothing, within floating point
    /// noise. Used to skip vertex baking.
    pub fn is_identity(&self) -> bool {
        let d = self.rot - Matrix3::identity();
        let mut m = 0f64;
        for c in 0..3 {
            for r in 0..3 {
                m = m.max(d[c][r].abs());
            }
        }
        m < 1e-12 && self.pos.magnitude2() < 1e-24
    }

    #[inline(always)]
    pub fn transform_point(&self, p: Point3<f64>) -> Point3<f64> {
        Point3::from_vec(self.rot * p.to_vec() + self.pos)
    }

    #[inline(always)]
    pub fn transform_vector(&self, v: Vector3<f64>) -> Vector3<f64> {
        self.rot * v
    }

    pub fn inverse(&self) -> RigidTransform {
        let rt = self.rot.transpose();
        RigidTransform {
            rot: rt,
            pos: -(rt * self.pos),
        }
    }
}

/// Relative rotation/translation `(R, T)` such that `R * x + T` expresses a
/// `tf2`-frame point `x` in `tf1`'s frame.
pub fn relative_transform(
    tf1: &RigidTransform,
    tf2: &RigidTransform,
) -> (Matrix3<f64>, Vector3<f64>) {
    let rt = tf1.rot.transpose();
    (rt * tf2.rot, rt * (tf2.pos - tf1.pos))
}
