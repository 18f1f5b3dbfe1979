use approx::assert_relative_eq;
use glam::Vec3;
use physics_sandbox::{
    collider::ShapeKind,
    params::ParameterUpdate,
    sandbox::{Sandbox, SandboxConfig, FLOOR_HALF_THICKNESS},
    scene::{NodeId, Ray},
    selection::Command,
    Error,
};

const FRAME: f64 = 1.0 / 60.0;

fn select_and_promote(sandbox: &mut Sandbox, name: &str, kind: ShapeKind) -> NodeId {
    let target = sandbox.scene().find(name).unwrap();
    let center = sandbox.scene().world_position(target).unwrap();
    sandbox.push(Command::Pick(Some(Ray::new(center + Vec3::Z * 10.0, -Vec3::Z))));
    sandbox.push(Command::AssignCollider(kind));
    sandbox.push(Command::EnablePhysics);
    sandbox.frame(0.0).unwrap().promoted[0].node
}

#[test]
fn test_pushed_cube_comes_to_rest_on_the_floor() {
    let mut sandbox = Sandbox::new(SandboxConfig::default()).unwrap();
    let pivot = select_and_promote(&mut sandbox, "Box", ShapeKind::Cube);
    let start = sandbox.scene().world_position(pivot).unwrap();

    sandbox.push(Command::ApplyForce);
    let mut steps = 0;
    for _ in 0..900 {
        steps += sandbox.frame(FRAME).unwrap().steps;
    }
    assert!((899..=901).contains(&steps), "ran {} steps", steps);

    let end = sandbox.scene().world_position(pivot).unwrap();
    let tracked = sandbox.registry().get(pivot).unwrap();
    let velocity = sandbox.world().linear_velocity(tracked.body).unwrap();

    assert_relative_eq!(end.y, FLOOR_HALF_THICKNESS + 0.5, epsilon = 0.05);
    assert!(end.x > start.x + 0.5, "cube moved from {} to {}", start.x, end.x);
    assert!(velocity.length() < 0.05);
}

#[test]
fn test_zero_gravity_mid_flight_keeps_velocity() {
    let mut sandbox = Sandbox::new(SandboxConfig::default()).unwrap();
    let pivot = select_and_promote(&mut sandbox, "Sphere", ShapeKind::Sphere);
    let body = sandbox.registry().get(pivot).unwrap().body;

    for _ in 0..30 {
        sandbox.frame(FRAME).unwrap();
    }
    sandbox.push(Command::SetParameter(ParameterUpdate::Gravity(0.0)));
    sandbox.frame(FRAME).unwrap();
    let before = sandbox.world().linear_velocity(body).unwrap();
    assert!(before.y < -1.0);

    for _ in 0..30 {
        sandbox.frame(FRAME).unwrap();
    }
    let after = sandbox.world().linear_velocity(body).unwrap();
    assert_relative_eq!(after.y, before.y, epsilon = 1e-3);
    assert_eq!(sandbox.world().gravity(), Vec3::ZERO);
}

#[test]
fn test_rejected_parameter_is_reported() {
    let mut sandbox = Sandbox::new(SandboxConfig::default()).unwrap();
    sandbox.push(Command::SetParameter(ParameterUpdate::Friction(f32::NAN)));
    sandbox.push(Command::SetParameter(ParameterUpdate::Restitution(0.9)));
    let report = sandbox.frame(FRAME).unwrap();

    assert_eq!(report.rejected.len(), 1);
    assert_eq!(sandbox.params().friction, 0.5);
    assert_eq!(sandbox.params().restitution, 0.9);
}

#[test]
fn test_live_material_change_reaches_existing_body() {
    let mut sandbox = Sandbox::new(SandboxConfig::default()).unwrap();
    let pivot = select_and_promote(&mut sandbox, "Cylinder", ShapeKind::Cylinder);
    sandbox.push(Command::SetParameter(ParameterUpdate::Restitution(0.1)));
    sandbox.push(Command::SetParameter(ParameterUpdate::Damping(2.0)));
    sandbox.frame(FRAME).unwrap();

    let tracked = sandbox.registry().get(pivot).unwrap();
    assert_eq!(sandbox.world().collider(tracked.collider).unwrap().restitution(), 0.1);
    assert_eq!(sandbox.world().body(tracked.body).unwrap().linear_damping(), 2.0);
}

#[test]
fn test_stall_runs_bounded_steps() {
    let mut sandbox = Sandbox::new(SandboxConfig {
        max_steps_per_frame: Some(3),
        ..SandboxConfig::default()
    })
    .unwrap();
    assert_eq!(sandbox.frame(10.0).unwrap().steps, 3);
    assert_eq!(sandbox.world().steps(), 3);
}

#[test]
fn test_unusable_clock_settings_are_rejected_up_front() {
    let configs = [
        SandboxConfig {
            max_frame_delta: -1.0,
            ..SandboxConfig::default()
        },
        SandboxConfig {
            fixed_step: -1.0 / 60.0,
            ..SandboxConfig::default()
        },
        SandboxConfig {
            fixed_step: 0.0,
            ..SandboxConfig::default()
        },
        SandboxConfig {
            fixed_step: f64::NAN,
            ..SandboxConfig::default()
        },
    ];
    for config in configs {
        assert!(matches!(
            Sandbox::new(config),
            Err(Error::InvalidClock { .. })
        ));
    }
}

#[test]
fn test_zero_frame_clamp_keeps_frames_returning() {
    let mut sandbox = Sandbox::new(SandboxConfig {
        max_frame_delta: 0.0,
        ..SandboxConfig::default()
    })
    .unwrap();
    assert_eq!(sandbox.frame(FRAME).unwrap().steps, 0);
}
