use cgmath::*;

/// Semantic classification of the space a mesh stands for, used to decide
/// whether a pair of meshes produces contacts, cost, or nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occupancy {
    Free,
    Occupied,
    Unknown,
}

impl Occupancy {
    #[inline(always)]
    pub fn is_free(self) -> bool {
        self == Occupancy::Free
    }

    #[inline(always)]
    pub fn is_occupied(self) -> bool {
        self == Occupancy::Occupied
    }
}

/// A triangle mesh in its own local frame.
///
/// Vertices only change through the owning model's replace protocol; the
/// index triples are fixed for the life of the mesh.
#[derive(Clone, Debug)]
pub struct TriMesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<[u32; 3]>,
    occupancy: Occupancy,
    cost_density: f64,
}

impl TriMesh {
    pub fn new(vertices: Vec<Point3<f64>>, triangles: Vec<[u32; 3]>) -> TriMesh {
        for tri in &triangles {
            for &i in tri {
                assert!((i as usize) < vertices.len(), "triangle index out of range");
            }
        }
        TriMesh {
            vertices,
            triangles,
            occupancy: Occupancy::Occupied,
            cost_density: 1.0,
        }
    }

    /// Builds the triangle list from a flat index buffer, three indices per
    /// triangle.
    pub fn from_flat_indices(vertices: Vec<Point3<f64>>, indices: Vec<u32>) -> TriMesh {
        use itertools::Itertools;
        assert_eq!(indices.len() % 3, 0);
        let triangles = indices
            .into_iter()
            .tuples()
            .map(|(a, b, c)| [a, b, c])
            .collect();
        TriMesh::new(vertices, triangles)
    }

    pub fn with_occupancy(mut self, occupancy: Occupancy) -> TriMesh {
        self.occupancy = occupancy;
        self
    }

    pub fn with_cost_density(mut self, cost_density: f64) -> TriMesh {
        assert!(cost_density >= 0.);
        self.cost_density = cost_density;
        self
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn triangle(&self, i: usize) -> [u32; 3] {
        self.triangles[i]
    }

    pub fn triangle_verts(&self, i: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.triangles[i];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    pub fn occupancy(&self) -> Occupancy {
        self.occupancy
    }

    pub fn cost_density(&self) -> f64 {
        self.cost_density
    }

    pub(crate) fn set_vertices(&mut self, vertices: Vec<Point3<f64>>) {
        debug_assert_eq!(vertices.len(), self.vertices.len());
        self.vertices = vertices;
    }
}
