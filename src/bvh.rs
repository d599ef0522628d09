use crate::bv::{Aabb, BoundingVolume};
use crate::error::CollisionError;
use crate::mesh::TriMesh;
use cgmath::*;
use log::{debug, trace};

/// What the leaves of a [`BvhModel`] hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelType {
    Triangles,
    Points,
}

/// One node of the hierarchy. Leaves bound a single primitive; interior
/// nodes bound a contiguous run of the model's primitive ordering.
#[derive(Clone, Debug)]
pub struct BvhNode<BV> {
    pub bv: BV,
    children: Option<(usize, usize)>,
    first_primitive: usize,
    num_primitives: usize,
    primitive_id: usize,
}

impl<BV> BvhNode<BV> {
    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Indices of the two children. Must only be called on interior nodes.
    pub fn children(&self) -> (usize, usize) {
        self.children.expect("leaf node has no children")
    }

    /// The primitive this leaf bounds.
    pub fn primitive_id(&self) -> usize {
        self.primitive_id
    }
}

/// A bounding volume hierarchy over a [`TriMesh`], generic in the volume
/// kind. Node 0 is the root; children always carry larger indices than
/// their parent, so a reverse index sweep visits children first.
pub struct BvhModel<BV> {
    mesh: TriMesh,
    model_type: ModelType,
    nodes: Vec<BvhNode<BV>>,
    primitive_indices: Vec<usize>,
    staging: Option<Vec<Point3<f64>>>,
}

fn largest_extent_index(aabb: &Aabb) -> usize {
    let e = aabb.extents();
    let mut idx = 0;
    for i in 1..3 {
        if e[i] > e[idx] {
            idx = i;
        }
    }
    idx
}

/// Builds the subtree over `order[..]`, whose slice starts at absolute
/// primitive position `first`, and returns the subtree root's node index.
fn build_subtree<BV, F>(
    nodes: &mut Vec<BvhNode<BV>>,
    order: &mut [usize],
    first: usize,
    centroids: &[Point3<f64>],
    prim_points: &F,
) -> usize
where
    BV: BoundingVolume,
    F: Fn(usize, &mut Vec<Point3<f64>>),
{
    let mut pts = Vec::new();
    for &p in order.iter() {
        prim_points(p, &mut pts);
    }
    let idx = nodes.len();
    nodes.push(BvhNode {
        bv: BV::from_points(&pts),
        children: None,
        first_primitive: first,
        num_primitives: order.len(),
        primitive_id: order[0],
    });
    if order.len() == 1 {
        return idx;
    }

    // split at the centroid midpoint of the widest axis, falling back to an
    // equal-counts split when everything lands on one side
    let cpts: Vec<Point3<f64>> = order.iter().map(|&p| centroids[p]).collect();
    let cbox = Aabb::from_points(&cpts);
    let axis = largest_extent_index(&cbox);
    let mid_val = cbox.center()[axis];
    let mut mid = itertools::partition(order.iter_mut(), |&p| centroids[p][axis] < mid_val);
    if mid == 0 || mid == order.len() {
        order.sort_unstable_by(|&a, &b| {
            centroids[a][axis]
                .partial_cmp(&centroids[b][axis])
                .expect("centroid is nan")
        });
        mid = order.len() / 2;
    }
    let (left_order, right_order) = order.split_at_mut(mid);
    let left = build_subtree(nodes, left_order, first, centroids, prim_points);
    let right = build_subtree(nodes, right_order, first + mid, centroids, prim_points);
    nodes[idx].children = Some((left, right));
    idx
}

impl<BV: BoundingVolume> BvhModel<BV> {
    /// Builds a triangle hierarchy, one triangle per leaf.
    pub fn from_mesh(mesh: TriMesh) -> BvhModel<BV> {
        assert!(mesh.num_triangles() > 0, "cannot build over an empty mesh");
        let n = mesh.num_triangles();
        let mut model = BvhModel {
            mesh,
            model_type: ModelType::Triangles,
            nodes: Vec::new(),
            primitive_indices: (0..n).collect(),
            staging: None,
        };
        model.rebuild();
        debug!(
            "built triangle hierarchy: {} nodes over {} primitives",
            model.nodes.len(),
            n
        );
        model
    }

    /// Builds a point hierarchy, one vertex per leaf. Point models cannot be
    /// used in mesh collision queries but share the replace protocol.
    pub fn from_point_cloud(points: Vec<Point3<f64>>) -> BvhModel<BV> {
        assert!(!points.is_empty(), "cannot build over an empty point cloud");
        let n = points.len();
        let mut model = BvhModel {
            mesh: TriMesh::new(points, Vec::new()),
            model_type: ModelType::Points,
            nodes: Vec::new(),
            primitive_indices: (0..n).collect(),
            staging: None,
        };
        model.rebuild();
        debug!(
            "built point hierarchy: {} nodes over {} primitives",
            model.nodes.len(),
            n
        );
        model
    }

    pub fn mesh(&self) -> &TriMesh {
        &self.mesh
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, i: usize) -> &BvhNode<BV> {
        &self.nodes[i]
    }

    pub fn nodes(&self) -> &[BvhNode<BV>] {
        &self.nodes
    }

    fn push_primitive_points(&self, prim: usize, out: &mut Vec<Point3<f64>>) {
        match self.model_type {
            ModelType::Triangles => out.extend_from_slice(&self.mesh.triangle_verts(prim)),
            ModelType::Points => out.push(self.mesh.vertices()[prim]),
        }
    }

    fn primitive_centroid(&self, prim: usize) -> Point3<f64> {
        match self.model_type {
            ModelType::Triangles => {
                let [a, b, c] = self.mesh.triangle_verts(prim);
                Point3::from_vec((a.to_vec() + b.to_vec() + c.to_vec()) / 3.)
            }
            ModelType::Points => self.mesh.vertices()[prim],
        }
    }

    fn rebuild(&mut self) {
        let centroids: Vec<Point3<f64>> = (0..self.primitive_indices.len())
            .map(|p| self.primitive_centroid(p))
            .collect();
        let mut nodes = std::mem::take(&mut self.nodes);
        let mut order = std::mem::take(&mut self.primitive_indices);
        nodes.clear();
        {
            let prim_points =
                |prim: usize, out: &mut Vec<Point3<f64>>| self.push_primitive_points(prim, out);
            build_subtree(&mut nodes, &mut order, 0, &centroids, &prim_points);
        }
        self.nodes = nodes;
        self.primitive_indices = order;
    }

    /// Recomputes every volume after a vertex replacement, keeping the tree
    /// shape. Bottom-up merges child volumes and is fast but looser;
    /// top-down refits each node to the primitives it actually covers.
    pub fn refit(&mut self, bottomup: bool) {
        if bottomup {
            for i in (0..self.nodes.len()).rev() {
                let bv = if self.nodes[i].is_leaf() {
                    let mut pts = Vec::new();
                    self.push_primitive_points(self.nodes[i].primitive_id, &mut pts);
                    BV::from_points(&pts)
                } else {
                    let (l, r) = self.nodes[i].children();
                    self.nodes[l].bv.merge(&self.nodes[r].bv)
                };
                self.nodes[i].bv = bv;
            }
        } else {
            for i in 0..self.nodes.len() {
                let first = self.nodes[i].first_primitive;
                let num = self.nodes[i].num_primitives;
                let mut pts = Vec::new();
                for k in first..first + num {
                    self.push_primitive_points(self.primitive_indices[k], &mut pts);
                }
                self.nodes[i].bv = BV::from_points(&pts);
            }
        }
        trace!("refit {} nodes (bottomup: {})", self.nodes.len(), bottomup);
    }

    /// Starts an in-place vertex replacement.
    pub fn begin_replace_model(&mut self) {
        self.staging = Some(Vec::with_capacity(self.mesh.num_vertices()));
    }

    /// Appends replacement vertices; call once per submesh.
    pub fn replace_sub_model(&mut self, vertices: &[Point3<f64>]) -> Result<(), CollisionError> {
        match &mut self.staging {
            Some(buf) => {
                buf.extend_from_slice(vertices);
                Ok(())
            }
            None => Err(CollisionError::ReplaceNotStarted),
        }
    }

    /// Swaps the staged vertices in and updates the hierarchy, either by
    /// refitting the existing tree or rebuilding it from scratch.
    pub fn end_replace_model(
        &mut self,
        use_refit: bool,
        refit_bottomup: bool,
    ) -> Result<(), CollisionError> {
        let staged = self.staging.take().ok_or(CollisionError::ReplaceNotStarted)?;
        if staged.len() != self.mesh.num_vertices() {
            return Err(CollisionError::VertexCountMismatch {
                expected: self.mesh.num_vertices(),
                got: staged.len(),
            });
        }
        self.mesh.set_vertices(staged);
        if use_refit {
            self.refit(refit_bottomup);
        } else {
            self.rebuild();
        }
        Ok(())
    }
}
