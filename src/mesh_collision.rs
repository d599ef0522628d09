//! Collision contexts for mesh pairs, one per calling convention.
//!
//! Both variants drive the same occupancy dispatch at the leaves: occupied
//! pairs produce contacts (presence-only or with geometry, within the
//! request's budget), pairs where neither mesh is free produce cost sources
//! when cost collection is on, and anything else is a no-op.

use crate::bv::{obb_disjoint, BoundingVolume, Kios, Obb, ObbRss, OrientedBoundingVolume, Rss};
use crate::bvh::{BvhModel, ModelType};
use crate::error::CollisionError;
use crate::intersect;
use crate::request::{CollisionRequest, CollisionResult, Contact, CostSource};
use crate::traversal::CollisionTraversal;
use crate::xform::{relative_transform, RigidTransform};
use cgmath::*;

/// Collision context for two meshes expressed in a common frame.
///
/// Initialization bakes non-identity placements into the mesh vertices —
/// the models are mutated and the given transforms reset to identity. This
/// is what lets a plain axis-aligned hierarchy answer a posed query, at the
/// price of a refit (or rebuild) per pose change.
pub struct MeshCollisionNode<'a, BV: BoundingVolume> {
    model1: &'a BvhModel<BV>,
    model2: &'a BvhModel<BV>,
    request: CollisionRequest,
    result: &'a mut CollisionResult,
    cost_density: f64,
    pub enable_statistics: bool,
    pub num_bv_tests: usize,
    pub num_leaf_tests: usize,
}

impl<'a, BV: BoundingVolume> MeshCollisionNode<'a, BV> {
    /// Fails without touching either model when one of them does not hold
    /// triangles.
    pub fn initialize(
        model1: &'a mut BvhModel<BV>,
        tf1: &mut RigidTransform,
        model2: &'a mut BvhModel<BV>,
        tf2: &mut RigidTransform,
        request: &CollisionRequest,
        result: &'a mut CollisionResult,
        use_refit: bool,
        refit_bottomup: bool,
    ) -> Result<MeshCollisionNode<'a, BV>, CollisionError> {
        if model1.model_type() != ModelType::Triangles
            || model2.model_type() != ModelType::Triangles
        {
            return Err(CollisionError::NotTriangles);
        }
        bake_transform(model1, tf1, use_refit, refit_bottomup)?;
        bake_transform(model2, tf2, use_refit, refit_bottomup)?;
        let cost_density = model1.mesh().cost_density() * model2.mesh().cost_density();
        let model1: &'a BvhModel<BV> = model1;
        let model2: &'a BvhModel<BV> = model2;
        Ok(MeshCollisionNode {
            model1,
            model2,
            request: request.clone(),
            result,
            cost_density,
            enable_statistics: false,
            num_bv_tests: 0,
            num_leaf_tests: 0,
        })
    }
}

/// Rewrites the model's vertices through `tf`, then resets `tf` to
/// identity. A second call is therefore a no-op.
fn bake_transform<BV: BoundingVolume>(
    model: &mut BvhModel<BV>,
    tf: &mut RigidTransform,
    use_refit: bool,
    refit_bottomup: bool,
) -> Result<(), CollisionError> {
    if tf.is_identity() {
        return Ok(());
    }
    let baked: Vec<Point3<f64>> = model
        .mesh()
        .vertices()
        .iter()
        .map(|&v| tf.transform_point(v))
        .collect();
    model.begin_replace_model();
    model.replace_sub_model(&baked)?;
    model.end_replace_model(use_refit, refit_bottomup)?;
    *tf = RigidTransform::identity();
    Ok(())
}

impl<'a, BV: BoundingVolume> CollisionTraversal for MeshCollisionNode<'a, BV> {
    fn is_first_leaf(&self, b: usize) -> bool {
        self.model1.node(b).is_leaf()
    }

    fn is_second_leaf(&self, b: usize) -> bool {
        self.model2.node(b).is_leaf()
    }

    fn first_children(&self, b: usize) -> (usize, usize) {
        self.model1.node(b).children()
    }

    fn second_children(&self, b: usize) -> (usize, usize) {
        self.model2.node(b).children()
    }

    fn descend_first(&self, b1: usize, b2: usize) -> bool {
        let n1 = self.model1.node(b1);
        let n2 = self.model2.node(b2);
        !n1.is_leaf() && (n2.is_leaf() || n1.bv.size() > n2.bv.size())
    }

    fn bv_test(&mut self, b1: usize, b2: usize) -> bool {
        if self.enable_statistics {
            self.num_bv_tests += 1;
        }
        !self.model1.node(b1).bv.overlap(&self.model2.node(b2).bv)
    }

    fn leaf_test(&mut self, b1: usize, b2: usize) {
        if self.enable_statistics {
            self.num_leaf_tests += 1;
        }
        let prim1 = self.model1.node(b1).primitive_id();
        let prim2 = self.model2.node(b2).primitive_id();
        let p = self.model1.mesh().triangle_verts(prim1);
        let q = self.model2.mesh().triangle_verts(prim2);
        let occ1 = self.model1.mesh().occupancy();
        let occ2 = self.model2.mesh().occupancy();

        if occ1.is_occupied() && occ2.is_occupied() {
            let mut intersected = false;
            if !self.request.enable_contact {
                if intersect::tri_overlap(&p, &q) {
                    intersected = true;
                    if self.result.num_contacts() < self.request.num_max_contacts {
                        self.result.add_contact(Contact::new(prim1, prim2));
                    }
                }
            } else if let Some(hit) = intersect::tri_contact(&p, &q) {
                intersected = true;
                let remaining = self
                    .request
                    .num_max_contacts
                    .saturating_sub(self.result.num_contacts());
                for point in hit.points().iter().take(remaining) {
                    self.result.add_contact(Contact::with_geometry(
                        prim1,
                        prim2,
                        *point,
                        hit.normal,
                        hit.penetration,
                    ));
                }
            }
            if intersected && self.request.enable_cost {
                add_overlap_cost(&p, &q, self.cost_density, &self.request, self.result);
            }
        } else if !occ1.is_free() && !occ2.is_free() && self.request.enable_cost {
            if intersect::tri_overlap(&p, &q) {
                add_overlap_cost(&p, &q, self.cost_density, &self.request, self.result);
            }
        }
    }

    fn can_stop(&self) -> bool {
        self.request.is_satisfied(self.result)
    }
}

/// Records the overlap of the two triangles' bounds as a cost source.
fn add_overlap_cost(
    p: &[Point3<f64>; 3],
    q: &[Point3<f64>; 3],
    cost_density: f64,
    request: &CollisionRequest,
    result: &mut CollisionResult,
) {
    let b1 = intersect::triangle_aabb(p);
    let b2 = intersect::triangle_aabb(q);
    if let Some(overlap) = b1.intersection(&b2) {
        result.add_cost_source(
            CostSource::new(overlap, cost_density),
            request.num_max_cost_sources,
        );
    }
}

/// Collision context that leaves both meshes in their local frames and
/// carries the relative rotation/translation `(R, T)` mapping mesh2 into
/// mesh1. Works for any volume kind that can be tested under a rigid
/// transform; contacts are transformed to world space before storage.
pub struct MeshCollisionNodeOriented<'a, BV: OrientedBoundingVolume> {
    model1: &'a BvhModel<BV>,
    model2: &'a BvhModel<BV>,
    tf1: RigidTransform,
    tf2: RigidTransform,
    r: Matrix3<f64>,
    t: Vector3<f64>,
    request: CollisionRequest,
    result: &'a mut CollisionResult,
    cost_density: f64,
    pub enable_statistics: bool,
    pub num_bv_tests: usize,
    pub num_leaf_tests: usize,
}

pub type MeshCollisionNodeObb<'a> = MeshCollisionNodeOriented<'a, Obb>;
pub type MeshCollisionNodeRss<'a> = MeshCollisionNodeOriented<'a, Rss>;
pub type MeshCollisionNodeKios<'a> = MeshCollisionNodeOriented<'a, Kios>;
pub type MeshCollisionNodeObbRss<'a> = MeshCollisionNodeOriented<'a, ObbRss>;

impl<'a, BV: OrientedBoundingVolume> MeshCollisionNodeOriented<'a, BV> {
    pub fn initialize(
        model1: &'a BvhModel<BV>,
        tf1: &RigidTransform,
        model2: &'a BvhModel<BV>,
        tf2: &RigidTransform,
        request: &CollisionRequest,
        result: &'a mut CollisionResult,
    ) -> Result<MeshCollisionNodeOriented<'a, BV>, CollisionError> {
        if model1.model_type() != ModelType::Triangles
            || model2.model_type() != ModelType::Triangles
        {
            return Err(CollisionError::NotTriangles);
        }
        let (r, t) = relative_transform(tf1, tf2);
        Ok(MeshCollisionNodeOriented {
            model1,
            model2,
            tf1: *tf1,
            tf2: *tf2,
            r,
            t,
            request: request.clone(),
            result,
            cost_density: model1.mesh().cost_density() * model2.mesh().cost_density(),
            enable_statistics: false,
            num_bv_tests: 0,
            num_leaf_tests: 0,
        })
    }
}

impl<'a, BV: OrientedBoundingVolume> CollisionTraversal for MeshCollisionNodeOriented<'a, BV> {
    fn is_first_leaf(&self, b: usize) -> bool {
        self.model1.node(b).is_leaf()
    }

    fn is_second_leaf(&self, b: usize) -> bool {
        self.model2.node(b).is_leaf()
    }

    fn first_children(&self, b: usize) -> (usize, usize) {
        self.model1.node(b).children()
    }

    fn second_children(&self, b: usize) -> (usize, usize) {
        self.model2.node(b).children()
    }

    fn descend_first(&self, b1: usize, b2: usize) -> bool {
        let n1 = self.model1.node(b1);
        let n2 = self.model2.node(b2);
        !n1.is_leaf() && (n2.is_leaf() || n1.bv.size() > n2.bv.size())
    }

    fn bv_test(&mut self, b1: usize, b2: usize) -> bool {
        if self.enable_statistics {
            self.num_bv_tests += 1;
        }
        !BV::overlap_oriented(
            &self.r,
            &self.t,
            &self.model1.node(b1).bv,
            &self.model2.node(b2).bv,
        )
    }

    fn leaf_test(&mut self, b1: usize, b2: usize) {
        oriented_leaf_test(
            self.model1,
            self.model2,
            b1,
            b2,
            &self.r,
            &self.t,
            &self.tf1,
            &self.tf2,
            self.enable_statistics,
            self.cost_density,
            &mut self.num_leaf_tests,
            &self.request,
            self.result,
        )
    }

    fn can_stop(&self) -> bool {
        self.request.is_satisfied(self.result)
    }
}

impl<'a> MeshCollisionNodeOriented<'a, Obb> {
    /// Box test for drivers that push a node-local relative frame down the
    /// descent instead of re-deriving it from the mesh transforms.
    pub fn bv_test_with(
        &mut self,
        b1: usize,
        b2: usize,
        rc: &Matrix3<f64>,
        tc: &Vector3<f64>,
    ) -> bool {
        if self.enable_statistics {
            self.num_bv_tests += 1;
        }
        obb_disjoint(
            rc,
            tc,
            &self.model1.node(b1).bv.extents,
            &self.model2.node(b2).bv.extents,
        )
    }

    /// Leaf counterpart of [`bv_test_with`](Self::bv_test_with); triangles
    /// are tested under the node's own `(R, T)`.
    pub fn leaf_test_with(
        &mut self,
        b1: usize,
        b2: usize,
        _rc: &Matrix3<f64>,
        _tc: &Vector3<f64>,
    ) {
        oriented_leaf_test(
            self.model1,
            self.model2,
            b1,
            b2,
            &self.r,
            &self.t,
            &self.tf1,
            &self.tf2,
            self.enable_statistics,
            self.cost_density,
            &mut self.num_leaf_tests,
            &self.request,
            self.result,
        )
    }
}

/// Leaf dispatch shared by every oriented variant. Triangles stay in their
/// mesh frames; the kernels run under `(r, t)` and contact geometry is
/// mapped to world space through `tf1` before storage.
fn oriented_leaf_test<BV: BoundingVolume>(
    model1: &BvhModel<BV>,
    model2: &BvhModel<BV>,
    b1: usize,
    b2: usize,
    r: &Matrix3<f64>,
    t: &Vector3<f64>,
    tf1: &RigidTransform,
    tf2: &RigidTransform,
    enable_statistics: bool,
    cost_density: f64,
    num_leaf_tests: &mut usize,
    request: &CollisionRequest,
    result: &mut CollisionResult,
) {
    if enable_statistics {
        *num_leaf_tests += 1;
    }
    let prim1 = model1.node(b1).primitive_id();
    let prim2 = model2.node(b2).primitive_id();
    let p = model1.mesh().triangle_verts(prim1);
    let q = model2.mesh().triangle_verts(prim2);
    let occ1 = model1.mesh().occupancy();
    let occ2 = model2.mesh().occupancy();

    let world = |tri: &[Point3<f64>; 3], tf: &RigidTransform| {
        [
            tf.transform_point(tri[0]),
            tf.transform_point(tri[1]),
            tf.transform_point(tri[2]),
        ]
    };

    if occ1.is_occupied() && occ2.is_occupied() {
        let mut intersected = false;
        if !request.enable_contact {
            if intersect::tri_overlap_transformed(&p, &q, r, t) {
                intersected = true;
                if result.num_contacts() < request.num_max_contacts {
                    result.add_contact(Contact::new(prim1, prim2));
                }
            }
        } else if let Some(hit) = intersect::tri_contact_transformed(&p, &q, r, t) {
            intersected = true;
            let remaining = request.num_max_contacts.saturating_sub(result.num_contacts());
            let normal = tf1.transform_vector(hit.normal);
            for point in hit.points().iter().take(remaining) {
                result.add_contact(Contact::with_geometry(
                    prim1,
                    prim2,
                    tf1.transform_point(*point),
                    normal,
                    hit.penetration,
                ));
            }
        }
        if intersected && request.enable_cost {
            add_overlap_cost(&world(&p, tf1), &world(&q, tf2), cost_density, request, result);
        }
    } else if !occ1.is_free() && !occ2.is_free() && request.enable_cost {
        if intersect::tri_overlap_transformed(&p, &q, r, t) {
            add_overlap_cost(&world(&p, tf1), &world(&q, tf2), cost_density, request, result);
        }
    }
}
