use approx::assert_relative_eq;
use glam::Vec3;
use physics_sandbox::{
    collider::ShapeKind,
    mesh::Mesh,
    sandbox::{Sandbox, SandboxConfig},
    scene::Ray,
    selection::Command,
    wireframe::{WireframeGeometry, FLOATS_PER_VERTEX},
};

#[test]
fn test_sphere_vertices_on_radius() {
    let mesh = Mesh::uv_sphere(0.75);
    for p in &mesh.positions {
        assert_relative_eq!(p.length(), 0.75, epsilon = 1e-5);
    }
}

#[test]
fn test_icosahedron_shape() {
    let mesh = Mesh::icosahedron(0.5);
    assert_eq!(mesh.positions.len(), 12);
    assert_eq!(mesh.triangle_count(), 20);
    assert_eq!(mesh.edges().len(), 30);
    for p in &mesh.positions {
        assert_relative_eq!(p.length(), 0.5, epsilon = 1e-6);
    }
}

#[test]
fn test_floor_grid_is_flat() {
    let mesh = Mesh::floor_grid(50.0, 10);
    assert_eq!(mesh.positions.len(), 121);
    assert_eq!(mesh.triangle_count(), 200);
    assert!(mesh.positions.iter().all(|p| p.y == 0.0));
    let max = mesh.positions.iter().fold(Vec3::splat(f32::MIN), |acc, p| acc.max(*p));
    assert_relative_eq!(max.x, 25.0, epsilon = 1e-4);
}

#[test]
fn test_torus_knot_is_finite() {
    let mesh = Mesh::torus_knot(0.5, 0.2);
    assert!(mesh.positions.iter().all(|p| p.is_finite()));
    assert!(mesh.positions.iter().all(|p| p.length() < 1.0));
}

#[test]
fn test_wireframe_for_demo_scene() {
    let sandbox = Sandbox::new(SandboxConfig::default()).unwrap();
    let vertices = WireframeGeometry::generate_vertices(&sandbox);

    assert!(!vertices.is_empty(), "Should generate vertices for the demo scene");
    assert_eq!(vertices.len() % (FLOATS_PER_VERTEX * 2), 0, "Vertices should come in line pairs");
    for &val in &vertices {
        assert!(val.is_finite(), "Vertex data contains non-finite values");
    }
}

#[test]
fn test_wireframe_includes_debug_proxies() {
    let mut sandbox = Sandbox::new(SandboxConfig::default()).unwrap();
    let plain = WireframeGeometry::generate_vertices(&sandbox).len();

    let cube = sandbox.scene().find("Box").unwrap();
    let center = sandbox.scene().world_position(cube).unwrap();
    sandbox.push(Command::Pick(Some(Ray::new(center + Vec3::Z * 10.0, -Vec3::Z))));
    sandbox.push(Command::AssignCollider(ShapeKind::Cube));
    sandbox.push(Command::EnablePhysics);
    sandbox.push(Command::ToggleDebug);
    sandbox.frame(0.0).unwrap();

    let with_proxy = WireframeGeometry::generate_vertices(&sandbox).len();
    let cube_lines = Mesh::cuboid(1.0, 1.0, 1.0).edges().len();
    assert_eq!(with_proxy - plain, cube_lines * 2 * FLOATS_PER_VERTEX);
}
