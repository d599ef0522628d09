use cgmath::*;
use mesh_collisions::*;
use std::collections::BTreeSet;

/// Axis-aligned box mesh, 12 triangles.
fn cube(center: Point3<f64>, half: Vector3<f64>) -> TriMesh {
    let v = |sx: f64, sy: f64, sz: f64| {
        point3(
            center.x + sx * half.x,
            center.y + sy * half.y,
            center.z + sz * half.z,
        )
    };
    let vertices = vec![
        v(-1., -1., -1.),
        v(1., -1., -1.),
        v(1., 1., -1.),
        v(-1., 1., -1.),
        v(-1., -1., 1.),
        v(1., -1., 1.),
        v(1., 1., 1.),
        v(-1., 1., 1.),
    ];
    let quads = [
        [0u32, 1, 2, 3],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [3, 2, 6, 7],
        [0, 3, 7, 4],
        [1, 2, 6, 5],
    ];
    let mut indices = Vec::new();
    for q in &quads {
        indices.extend_from_slice(&[q[0], q[1], q[2], q[0], q[2], q[3]]);
    }
    TriMesh::from_flat_indices(vertices, indices)
}

fn unit_cube() -> TriMesh {
    cube(point3(0., 0., 0.), vec3(0.5, 0.5, 0.5))
}

fn run_same_frame(
    mesh1: TriMesh,
    tf1: RigidTransform,
    mesh2: TriMesh,
    tf2: RigidTransform,
    request: &CollisionRequest,
) -> CollisionResult {
    let mut m1: BvhModel<Aabb> = BvhModel::from_mesh(mesh1);
    let mut m2: BvhModel<Aabb> = BvhModel::from_mesh(mesh2);
    let mut tf1 = tf1;
    let mut tf2 = tf2;
    let mut result = CollisionResult::new();
    let mut node = MeshCollisionNode::initialize(
        &mut m1, &mut tf1, &mut m2, &mut tf2, request, &mut result, false, false,
    )
    .unwrap();
    collide(&mut node);
    result
}

#[test]
fn touching_cubes_report_one_presence_contact() {
    let request = CollisionRequest {
        num_max_contacts: 1,
        ..Default::default()
    };
    let result = run_same_frame(
        unit_cube(),
        RigidTransform::identity(),
        unit_cube(),
        RigidTransform::from_translation(vec3(0.5, 0., 0.)),
        &request,
    );
    assert_eq!(result.num_contacts(), 1);
    assert!(result.contacts()[0].geometry.is_none());
}

#[test]
fn distant_cubes_report_nothing() {
    let request = CollisionRequest {
        num_max_contacts: 16,
        enable_cost: true,
        num_max_cost_sources: 16,
        ..Default::default()
    };
    let result = run_same_frame(
        unit_cube(),
        RigidTransform::identity(),
        unit_cube(),
        RigidTransform::from_translation(vec3(2., 0., 0.)),
        &request,
    );
    assert_eq!(result.num_contacts(), 0);
    assert!(result.cost_sources().is_empty());
}

#[test]
fn shallow_penetration_depth_and_normal() {
    // faces overlap by 0.2 along x; the second cube is thinner in y/z so
    // nothing grazes edge-on
    let request = CollisionRequest {
        num_max_contacts: 1024,
        enable_contact: true,
        ..Default::default()
    };
    let result = run_same_frame(
        unit_cube(),
        RigidTransform::identity(),
        cube(point3(0., 0., 0.), vec3(0.5, 0.4, 0.4)),
        RigidTransform::from_translation(vec3(0.8, 0., 0.)),
        &request,
    );
    assert!(result.num_contacts() >= 2);
    for contact in result.contacts() {
        let geom = contact.geometry.unwrap();
        assert!((geom.penetration - 0.2).abs() < 1e-9);
        assert!((geom.normal.x.abs() - 1.0).abs() < 1e-9);
        assert!(geom.normal.y.abs() < 1e-9 && geom.normal.z.abs() < 1e-9);
    }
}

#[test]
fn occupied_against_unknown_feeds_cost_only() {
    let request = CollisionRequest {
        enable_cost: true,
        num_max_contacts: 16,
        num_max_cost_sources: 64,
        ..Default::default()
    };
    let result = run_same_frame(
        unit_cube(),
        RigidTransform::identity(),
        cube(point3(0., 0., 0.), vec3(0.5, 0.4, 0.4)).with_occupancy(Occupancy::Unknown),
        RigidTransform::from_translation(vec3(0.8, 0., 0.)),
        &request,
    );
    assert_eq!(result.num_contacts(), 0);
    assert!(!result.cost_sources().is_empty());
    let overlap_region = Aabb::new(point3(0.3, -0.4, -0.4), point3(0.5, 0.4, 0.4));
    for source in result.cost_sources() {
        assert!(source.bounds.overlap(&overlap_region));
    }
}

#[test]
fn contact_budget_is_never_exceeded() {
    let request = CollisionRequest {
        num_max_contacts: 3,
        enable_contact: true,
        ..Default::default()
    };
    let result = run_same_frame(
        unit_cube(),
        RigidTransform::identity(),
        cube(point3(0., 0., 0.), vec3(0.5, 0.4, 0.4)),
        RigidTransform::from_translation(vec3(0.8, 0., 0.)),
        &request,
    );
    assert_eq!(result.num_contacts(), 3);
}

#[test]
fn cost_sources_are_capped_by_the_request() {
    let request = CollisionRequest {
        enable_cost: true,
        num_max_contacts: 0,
        num_max_cost_sources: 2,
        ..Default::default()
    };
    let result = run_same_frame(
        unit_cube(),
        RigidTransform::identity(),
        cube(point3(0., 0., 0.), vec3(0.5, 0.4, 0.4)),
        RigidTransform::from_translation(vec3(0.8, 0., 0.)),
        &request,
    );
    assert_eq!(result.cost_sources().len(), 2);
}

#[test]
fn stored_primitive_ids_are_in_range() {
    let request = CollisionRequest {
        num_max_contacts: 1024,
        enable_contact: true,
        ..Default::default()
    };
    let mesh1 = unit_cube();
    let mesh2 = cube(point3(0., 0., 0.), vec3(0.5, 0.4, 0.4));
    let (n1, n2) = (mesh1.num_triangles(), mesh2.num_triangles());
    let result = run_same_frame(
        mesh1,
        RigidTransform::identity(),
        mesh2,
        RigidTransform::from_translation(vec3(0.8, 0., 0.)),
        &request,
    );
    for contact in result.contacts() {
        assert!(contact.prim1 < n1);
        assert!(contact.prim2 < n2);
    }
}

#[test]
fn baking_initialize_is_idempotent() {
    let mut m1: BvhModel<Aabb> = BvhModel::from_mesh(unit_cube());
    let mut m2: BvhModel<Aabb> = BvhModel::from_mesh(unit_cube());
    let mut tf1 = RigidTransform::new(Matrix3::from_angle_z(Deg(15.)), vec3(1., 2., 3.));
    let mut tf2 = RigidTransform::from_translation(vec3(-1., 0., 0.));
    let request = CollisionRequest::default();

    let mut result = CollisionResult::new();
    MeshCollisionNode::initialize(
        &mut m1, &mut tf1, &mut m2, &mut tf2, &request, &mut result, true, false,
    )
    .unwrap();
    assert!(tf1.is_identity() && tf2.is_identity());
    let baked1: Vec<Point3<f64>> = m1.mesh().vertices().to_vec();
    let baked2: Vec<Point3<f64>> = m2.mesh().vertices().to_vec();

    let mut result = CollisionResult::new();
    MeshCollisionNode::initialize(
        &mut m1, &mut tf1, &mut m2, &mut tf2, &request, &mut result, true, false,
    )
    .unwrap();
    assert_eq!(m1.mesh().vertices(), &baked1[..]);
    assert_eq!(m2.mesh().vertices(), &baked2[..]);
}

#[test]
fn point_models_fail_initialization() {
    let mut m1: BvhModel<Aabb> = BvhModel::from_point_cloud(vec![point3(0., 0., 0.)]);
    let mut m2: BvhModel<Aabb> = BvhModel::from_mesh(unit_cube());
    let mut tf1 = RigidTransform::identity();
    let mut tf2 = RigidTransform::identity();
    let mut result = CollisionResult::new();
    let err = MeshCollisionNode::initialize(
        &mut m1,
        &mut tf1,
        &mut m2,
        &mut tf2,
        &CollisionRequest::default(),
        &mut result,
        false,
        false,
    )
    .err()
    .unwrap();
    assert_eq!(err, CollisionError::NotTriangles);
}

/// The traversal must find exactly the pairs a full quadratic sweep finds.
#[test]
fn pruning_loses_no_intersecting_pair() {
    let request = CollisionRequest {
        num_max_contacts: usize::MAX,
        ..Default::default()
    };
    let mut m1: BvhModel<Aabb> = BvhModel::from_mesh(unit_cube());
    let mut m2: BvhModel<Aabb> = BvhModel::from_mesh(unit_cube());
    let mut tf1 = RigidTransform::identity();
    let mut tf2 = RigidTransform::new(Matrix3::from_angle_z(Deg(35.)), vec3(0.6, 0.25, 0.1));
    let mut result = CollisionResult::new();
    let mut node = MeshCollisionNode::initialize(
        &mut m1, &mut tf1, &mut m2, &mut tf2, &request, &mut result, false, false,
    )
    .unwrap();
    collide(&mut node);

    let traversed: BTreeSet<(usize, usize)> = result
        .contacts()
        .iter()
        .map(|c| (c.prim1, c.prim2))
        .collect();

    let mut brute = BTreeSet::new();
    for i in 0..m1.mesh().num_triangles() {
        for j in 0..m2.mesh().num_triangles() {
            if intersect::tri_overlap(&m1.mesh().triangle_verts(i), &m2.mesh().triangle_verts(j)) {
                brute.insert((i, j));
            }
        }
    }
    assert!(!brute.is_empty());
    assert_eq!(traversed, brute);
}

/// Oriented traversal on local meshes must agree with the same-frame
/// traversal run on baked copies, in pairs and in world-space geometry.
#[test]
fn oriented_matches_baked_same_frame() {
    let tf1 = RigidTransform::new(Matrix3::from_angle_x(Deg(30.)), vec3(0., 0.2, -0.1));
    let tf2 = RigidTransform::new(Matrix3::from_angle_z(Deg(90.)), vec3(0.6, 0.2, 0.));
    let request = CollisionRequest {
        num_max_contacts: 1024,
        enable_contact: true,
        ..Default::default()
    };

    let m1: BvhModel<Obb> = BvhModel::from_mesh(unit_cube());
    let m2: BvhModel<Obb> = BvhModel::from_mesh(cube(point3(0., 0., 0.), vec3(0.5, 0.4, 0.4)));
    let mut oriented = CollisionResult::new();
    let mut node =
        MeshCollisionNodeOriented::initialize(&m1, &tf1, &m2, &tf2, &request, &mut oriented)
            .unwrap();
    collide(&mut node);

    let baked = run_same_frame(
        unit_cube(),
        tf1,
        cube(point3(0., 0., 0.), vec3(0.5, 0.4, 0.4)),
        tf2,
        &request,
    );

    assert!(oriented.is_collision());
    assert_eq!(oriented.num_contacts(), baked.num_contacts());
    let pairs = |r: &CollisionResult| -> BTreeSet<(usize, usize)> {
        r.contacts().iter().map(|c| (c.prim1, c.prim2)).collect()
    };
    assert_eq!(pairs(&oriented), pairs(&baked));

    for contact in oriented.contacts() {
        let geom = contact.geometry.unwrap();
        let matched = baked.contacts().iter().any(|other| {
            other.prim1 == contact.prim1 && other.prim2 == contact.prim2 && {
                let g = other.geometry.unwrap();
                (g.point - geom.point).magnitude() < 1e-6
                    && (g.normal - geom.normal).magnitude() < 1e-6
                    && (g.penetration - geom.penetration).abs() < 1e-6
            }
        });
        assert!(matched, "no same-frame twin for {:?}", contact);
    }
}

fn oriented_hit<BV: OrientedBoundingVolume>(offset: Vector3<f64>) -> bool {
    let m1: BvhModel<BV> = BvhModel::from_mesh(unit_cube());
    let m2: BvhModel<BV> = BvhModel::from_mesh(unit_cube());
    let tf1 = RigidTransform::identity();
    let tf2 = RigidTransform::from_translation(offset);
    let request = CollisionRequest {
        num_max_contacts: 1,
        ..Default::default()
    };
    let mut result = CollisionResult::new();
    let mut node =
        MeshCollisionNodeOriented::initialize(&m1, &tf1, &m2, &tf2, &request, &mut result)
            .unwrap();
    collide(&mut node);
    result.is_collision()
}

#[test]
fn every_oriented_volume_kind_agrees() {
    let hit = vec3(0.5, 0.1, 0.);
    let miss = vec3(3., 0., 0.);
    assert!(oriented_hit::<Obb>(hit));
    assert!(oriented_hit::<Rss>(hit));
    assert!(oriented_hit::<Kios>(hit));
    assert!(oriented_hit::<ObbRss>(hit));
    assert!(!oriented_hit::<Obb>(miss));
    assert!(!oriented_hit::<Rss>(miss));
    assert!(!oriented_hit::<Kios>(miss));
    assert!(!oriented_hit::<ObbRss>(miss));
}

#[test]
fn propagated_box_test_matches_the_node_test() {
    let m1: BvhModel<Obb> = BvhModel::from_mesh(unit_cube());
    let m2: BvhModel<Obb> = BvhModel::from_mesh(unit_cube());
    let tf1 = RigidTransform::identity();
    let tf2 = RigidTransform::new(Matrix3::from_angle_z(Deg(40.)), vec3(0.9, 0., 0.));
    let (r, t) = relative_transform(&tf1, &tf2);
    let request = CollisionRequest::default();
    let mut result = CollisionResult::new();
    let mut node =
        MeshCollisionNodeOriented::initialize(&m1, &tf1, &m2, &tf2, &request, &mut result)
            .unwrap();

    // fitted axes are the identity, so the box-relative frame is just (R, T)
    // shifted between the two box centers
    for (b1, b2) in [(0usize, 0usize), (0, 1), (1, 0)].iter().copied() {
        let c1 = m1.node(b1).bv.center;
        let c2 = m2.node(b2).bv.center;
        let tc = r * c2.to_vec() + t - c1.to_vec();
        assert_eq!(
            node.bv_test_with(b1, b2, &r, &tc),
            node.bv_test(b1, b2),
            "box test disagrees at ({}, {})",
            b1,
            b2
        );
    }
}
