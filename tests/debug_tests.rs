use approx::assert_relative_eq;
use glam::Vec3;
use physics_sandbox::{
    collider::ShapeKind,
    mesh::Mesh,
    sandbox::{Sandbox, SandboxConfig},
    scene::{NodeId, Ray},
    selection::Command,
};

fn promote(sandbox: &mut Sandbox, name: &str, kind: ShapeKind) -> NodeId {
    let target = sandbox.scene().find(name).unwrap();
    let center = sandbox.scene().world_position(target).unwrap();
    sandbox.push(Command::Pick(Some(Ray::new(center + Vec3::Z * 10.0, -Vec3::Z))));
    sandbox.push(Command::AssignCollider(kind));
    sandbox.push(Command::EnablePhysics);
    let report = sandbox.frame(0.0).unwrap();
    assert_eq!(report.promoted.len(), 1, "{} was not promoted", name);
    report.promoted[0].node
}

fn extents(mesh: &Mesh) -> Vec3 {
    let min = mesh.positions.iter().fold(Vec3::splat(f32::MAX), |acc, p| acc.min(*p));
    let max = mesh.positions.iter().fold(Vec3::splat(f32::MIN), |acc, p| acc.max(*p));
    max - min
}

fn toggle(sandbox: &mut Sandbox) {
    sandbox.push(Command::ToggleDebug);
    sandbox.frame(0.0).unwrap();
}

#[test]
fn test_toggle_on_off_on_matches_tracked_bodies() {
    let mut sandbox = Sandbox::new(SandboxConfig::default()).unwrap();
    promote(&mut sandbox, "Box", ShapeKind::Cube);
    promote(&mut sandbox, "Sphere", ShapeKind::Sphere);
    promote(&mut sandbox, "Icosahedron", ShapeKind::Hull);

    for expected_on in [true, false, true] {
        toggle(&mut sandbox);
        assert_eq!(sandbox.debug().is_enabled(), expected_on);
        let expected = if expected_on { sandbox.registry().len() } else { 0 };
        assert_eq!(sandbox.debug().proxies().len(), expected);
    }
}

#[test]
fn test_promotion_while_enabled_adds_one_proxy() {
    let mut sandbox = Sandbox::new(SandboxConfig {
        debug: true,
        ..SandboxConfig::default()
    })
    .unwrap();
    sandbox.frame(0.0).unwrap();
    assert!(sandbox.debug().is_enabled());
    assert!(sandbox.debug().proxies().is_empty());

    let pivot = promote(&mut sandbox, "Cylinder", ShapeKind::Cylinder);
    assert_eq!(sandbox.debug().proxies().len(), 1);
    assert_eq!(sandbox.debug().proxies()[0].owner, pivot);
}

#[test]
fn test_analytic_proxies_match_collider_dimensions() {
    let mut sandbox = Sandbox::new(SandboxConfig::default()).unwrap();
    let cube = promote(&mut sandbox, "Box", ShapeKind::Cube);
    let ball = promote(&mut sandbox, "Sphere", ShapeKind::Sphere);
    let can = promote(&mut sandbox, "Icosahedron", ShapeKind::Cylinder);
    toggle(&mut sandbox);

    for proxy in sandbox.debug().proxies() {
        let tracked = sandbox.registry().get(proxy.owner).unwrap();
        let shape = sandbox.world().collider(tracked.collider).unwrap().shape();
        let size = extents(&proxy.mesh);

        if proxy.owner == cube {
            let half = shape.as_cuboid().unwrap().half_extents;
            assert_relative_eq!(size.x, half.x * 2.0, epsilon = 1e-6);
            assert_relative_eq!(size.y, half.y * 2.0, epsilon = 1e-6);
            assert_relative_eq!(size.z, half.z * 2.0, epsilon = 1e-6);
        } else if proxy.owner == ball {
            let radius = shape.as_ball().unwrap().radius;
            let farthest = proxy.mesh.positions.iter().map(|p| p.length()).fold(0.0, f32::max);
            assert_relative_eq!(farthest, radius, epsilon = 1e-5);
            assert_relative_eq!(size.y, radius * 2.0, epsilon = 1e-5);
        } else if proxy.owner == can {
            let cylinder = shape.as_cylinder().unwrap();
            assert_relative_eq!(size.y, cylinder.half_height * 2.0, epsilon = 1e-6);
            let widest = proxy
                .mesh
                .positions
                .iter()
                .map(|p| Vec3::new(p.x, 0.0, p.z).length())
                .fold(0.0, f32::max);
            assert_relative_eq!(widest, cylinder.radius, epsilon = 1e-5);
        } else {
            panic!("unexpected proxy owner {:?}", proxy.owner);
        }
    }
}

#[test]
fn test_hull_proxy_samples_every_vertex() {
    let mut sandbox = Sandbox::new(SandboxConfig::default()).unwrap();
    let pivot = promote(&mut sandbox, "Model", ShapeKind::Hull);
    toggle(&mut sandbox);

    let proxy = &sandbox.debug().proxies()[0];
    let vertices = sandbox.scene().world_vertices(pivot).unwrap();
    assert_eq!(proxy.mesh.positions.len(), vertices.len());
    assert_eq!(proxy.mesh.indices.len(), vertices.len() / 3 * 3);

    let local = extents(&proxy.mesh);
    let world = sandbox.scene().world_aabb(pivot).unwrap().unwrap().size();
    assert_relative_eq!(local.x, world.x, epsilon = 1e-4);
    assert_relative_eq!(local.y, world.y, epsilon = 1e-4);
    assert_relative_eq!(local.z, world.z, epsilon = 1e-4);
}

#[test]
fn test_proxies_follow_their_bodies() {
    let mut sandbox = Sandbox::new(SandboxConfig::default()).unwrap();
    let pivot = promote(&mut sandbox, "Box", ShapeKind::Cube);
    toggle(&mut sandbox);
    let start = sandbox.debug().proxies()[0].transform.translation;

    for _ in 0..30 {
        sandbox.frame(1.0 / 60.0).unwrap();
        let proxy = &sandbox.debug().proxies()[0];
        assert_eq!(proxy.transform, sandbox.scene().node(pivot).unwrap().transform);
    }
    assert!(sandbox.debug().proxies()[0].transform.translation.y < start.y);
}
