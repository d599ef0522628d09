//! Narrow-phase collision detection between triangle meshes.
//!
//! Each mesh is wrapped in a bounding volume hierarchy ([`BvhModel`]); a
//! collision query walks both hierarchies at once, pruning node pairs whose
//! volumes are disjoint and running a triangle-pair test at the leaves.
//! Queries come in two calling conventions with identical semantics:
//!
//! * [`MeshCollisionNode`] assumes both meshes share a frame. Non-identity
//!   placements are baked into the mesh vertices during initialization
//!   (mutating the models), which lets plain axis-aligned volumes be used.
//! * [`MeshCollisionNodeOriented`] leaves the meshes in their local frames
//!   and carries the relative rotation/translation between them, for volume
//!   kinds that can be tested under a rigid transform ([`Obb`], [`Rss`],
//!   [`Kios`], [`ObbRss`]).
//!
//! What gets collected is controlled by a [`CollisionRequest`]: contact
//! presence or full contact geometry up to a budget, and optionally a set of
//! [`CostSource`] boxes measuring how much volume is in contact.

pub mod bv;
pub mod bvh;
pub mod error;
pub mod intersect;
pub mod mesh;
pub mod mesh_collision;
pub mod request;
pub mod traversal;
pub mod xform;

pub use bv::{obb_disjoint, Aabb, BoundingVolume, Kios, Obb, ObbRss, OrientedBoundingVolume, Rss};
pub use bvh::{BvhModel, BvhNode, ModelType};
pub use error::CollisionError;
pub use mesh::{Occupancy, TriMesh};
pub use mesh_collision::{
    MeshCollisionNode, MeshCollisionNodeKios, MeshCollisionNodeObb, MeshCollisionNodeObbRss,
    MeshCollisionNodeOriented, MeshCollisionNodeRss,
};
pub use request::{CollisionRequest, CollisionResult, Contact, ContactGeometry, CostSource};
pub use traversal::{collide, CollisionTraversal};
pub use xform::{relative_transform, RigidTransform};
