use crate::bv::Aabb;
use cgmath::*;

/// Read-only configuration for a collision query.
#[derive(Clone, Debug)]
pub struct CollisionRequest {
    /// Upper bound on contacts stored in the result.
    pub num_max_contacts: usize,
    /// When false, only presence and primitive ids are recorded, skipping
    /// the contact-geometry kernel entirely.
    pub enable_contact: bool,
    /// When true, overlapping axis-aligned regions feed the cost sources.
    pub enable_cost: bool,
    /// Upper bound on cost sources stored.
    pub num_max_cost_sources: usize,
}

impl Default for CollisionRequest {
    fn default() -> CollisionRequest {
        CollisionRequest {
            num_max_contacts: 1,
            enable_contact: false,
            enable_cost: false,
            num_max_cost_sources: 1,
        }
    }
}

impl CollisionRequest {
    /// True once the result holds everything this request asked for. Cost
    /// accumulation needs the whole traversal, so it disables early exit.
    pub fn is_satisfied(&self, result: &CollisionResult) -> bool {
        !self.enable_cost && result.num_contacts() >= self.num_max_contacts
    }
}

/// World-frame geometry of a single contact.
#[derive(Clone, Copy, Debug)]
pub struct ContactGeometry {
    pub point: Point3<f64>,
    pub normal: Vector3<f64>,
    pub penetration: f64,
}

/// One intersecting triangle pair, identified by the triangle indices in
/// each mesh, with geometry when the request asked for it.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    pub prim1: usize,
    pub prim2: usize,
    pub geometry: Option<ContactGeometry>,
}

impl Contact {
    pub fn new(prim1: usize, prim2: usize) -> Contact {
        Contact {
            prim1,
            prim2,
            geometry: None,
        }
    }

    pub fn with_geometry(
        prim1: usize,
        prim2: usize,
        point: Point3<f64>,
        normal: Vector3<f64>,
        penetration: f64,
    ) -> Contact {
        Contact {
            prim1,
            prim2,
            geometry: Some(ContactGeometry {
                point,
                normal,
                penetration,
            }),
        }
    }
}

/// A world-frame axis-aligned region that is in contact, weighted by the
/// product of the two meshes' cost densities.
#[derive(Clone, Copy, Debug)]
pub struct CostSource {
    pub bounds: Aabb,
    pub cost_density: f64,
}

impl CostSource {
    pub fn new(bounds: Aabb, cost_density: f64) -> CostSource {
        CostSource {
            bounds,
            cost_density,
        }
    }
}

/// Accumulator a query writes into. Contact order mirrors the driver's
/// visit order; cost sources are an insertion-capped set.
#[derive(Debug, Default)]
pub struct CollisionResult {
    contacts: Vec<Contact>,
    cost_sources: Vec<CostSource>,
}

impl CollisionResult {
    pub fn new() -> CollisionResult {
        CollisionResult::default()
    }

    pub fn add_contact(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    /// Stores `source` unless `cap` sources are already held.
    pub fn add_cost_source(&mut self, source: CostSource, cap: usize) -> bool {
        if self.cost_sources.len() < cap {
            self.cost_sources.push(source);
            true
        } else {
            false
        }
    }

    pub fn num_contacts(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_collision(&self) -> bool {
        !self.contacts.is_empty()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn cost_sources(&self) -> &[CostSource] {
        &self.cost_sources
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
        self.cost_sources.clear();
    }
}
