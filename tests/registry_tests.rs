use approx::assert_relative_eq;
use glam::Vec3;
use physics_sandbox::{
    collider::{self, ShapeKind},
    mesh::Mesh,
    params::SimulationParameters,
    physics::PhysicsWorld,
    registry::{Promotion, RigidBodyRegistry, TrackedBody},
    scene::{NodeKind, Scene, Transform},
};

struct Fixture {
    scene: Scene,
    world: PhysicsWorld,
    registry: RigidBodyRegistry,
    params: SimulationParameters,
}

impl Fixture {
    fn new() -> Self {
        let params = SimulationParameters::default();
        let mut world = PhysicsWorld::new(params.gravity_vector(), 1.0 / 60.0);
        world.add_fixed_cuboid(Vec3::ZERO, Vec3::new(25.0, 0.1, 25.0));
        Self {
            scene: Scene::new(),
            world,
            registry: RigidBodyRegistry::default(),
            params,
        }
    }

    fn promote(&mut self, position: Vec3, mesh: Mesh, kind: ShapeKind) -> TrackedBody {
        let id = self
            .scene
            .add(
                self.scene.root(),
                "object",
                NodeKind::Object,
                Transform::from_translation(position),
                Some(mesh),
            )
            .unwrap();
        let (pivot, descriptor) = collider::fit(&mut self.scene, id, kind, &self.params).unwrap();
        self.registry
            .create_body(&self.scene, &mut self.world, pivot, &descriptor, &self.params)
            .unwrap()
            .tracked()
    }

    fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.world.step().unwrap();
        }
        self.registry.sync_all(&self.world, &mut self.scene).unwrap();
    }
}

#[test]
fn test_second_promotion_is_a_no_op() {
    let mut fixture = Fixture::new();
    let tracked = fixture.promote(
        Vec3::new(0.0, 5.0, 0.0),
        Mesh::cuboid(1.0, 1.0, 1.0),
        ShapeKind::Cube,
    );
    let bodies = fixture.world.body_count();

    let (pivot, descriptor) =
        collider::fit(&mut fixture.scene, tracked.node, ShapeKind::Cube, &fixture.params).unwrap();
    assert_eq!(pivot, tracked.node);
    let again = fixture
        .registry
        .create_body(&fixture.scene, &mut fixture.world, pivot, &descriptor, &fixture.params)
        .unwrap();

    assert_eq!(again, Promotion::AlreadyTracked(tracked));
    assert_eq!(fixture.registry.len(), 1);
    assert_eq!(fixture.world.body_count(), bodies);
}

#[test]
fn test_body_starts_at_pivot() {
    let mut fixture = Fixture::new();
    let tracked = fixture.promote(
        Vec3::new(3.0, 4.0, -2.0),
        Mesh::uv_sphere(0.5),
        ShapeKind::Sphere,
    );
    let (position, _) = fixture.world.pose(tracked.body).unwrap();
    let pivot = fixture.scene.world_position(tracked.node).unwrap();
    assert_relative_eq!(position.x, pivot.x, epsilon = 1e-5);
    assert_relative_eq!(position.y, pivot.y, epsilon = 1e-5);
    assert_relative_eq!(position.z, pivot.z, epsilon = 1e-5);
}

#[test]
fn test_sync_copies_exact_pose() {
    let mut fixture = Fixture::new();
    let bodies = [
        fixture.promote(Vec3::new(-2.0, 3.0, 0.0), Mesh::cuboid(1.0, 1.0, 1.0), ShapeKind::Cube),
        fixture.promote(Vec3::new(2.0, 4.0, 0.0), Mesh::torus_knot(0.5, 0.2), ShapeKind::Hull),
    ];
    fixture
        .registry
        .apply_impulse(&mut fixture.world, &bodies[0], Vec3::new(1.0, 0.0, 0.5))
        .unwrap();

    for _ in 0..5 {
        fixture.run(7);
        for tracked in &bodies {
            let (translation, rotation) = fixture.world.pose(tracked.body).unwrap();
            let transform = fixture.scene.node(tracked.node).unwrap().transform;
            assert_eq!(transform.translation, translation);
            assert_eq!(transform.rotation, rotation);
        }
    }
}

#[test]
fn test_parameters_reach_every_body() {
    let mut fixture = Fixture::new();
    let tracked = [
        fixture.promote(Vec3::new(0.0, 5.0, 0.0), Mesh::cuboid(1.0, 1.0, 1.0), ShapeKind::Cube),
        fixture.promote(
            Vec3::new(2.0, 5.0, 0.0),
            Mesh::cylinder(0.5, 0.5, 1.0),
            ShapeKind::Cylinder,
        ),
    ];

    let params = SimulationParameters {
        gravity: -2.0,
        restitution: 0.9,
        friction: 1.5,
        damping: 0.3,
        impulse: 5.0,
    };
    fixture
        .registry
        .propagate_parameters(&mut fixture.world, &params)
        .unwrap();

    assert_eq!(fixture.world.gravity(), Vec3::new(0.0, -2.0, 0.0));
    for t in &tracked {
        let collider = fixture.world.collider(t.collider).unwrap();
        assert_eq!(collider.restitution(), 0.9);
        assert_eq!(collider.friction(), 1.5);
        let body = fixture.world.body(t.body).unwrap();
        assert_eq!(body.linear_damping(), 0.3);
        assert_eq!(body.angular_damping(), 0.3);
    }
}

#[test]
fn test_zero_gravity_keeps_velocity() {
    let mut fixture = Fixture::new();
    let tracked = fixture.promote(
        Vec3::new(0.0, 50.0, 0.0),
        Mesh::uv_sphere(0.5),
        ShapeKind::Sphere,
    );
    fixture.run(30);
    let falling = fixture.world.linear_velocity(tracked.body).unwrap();
    assert!(falling.y < -1.0);

    fixture.params.gravity = 0.0;
    fixture
        .registry
        .propagate_parameters(&mut fixture.world, &fixture.params)
        .unwrap();
    fixture.run(30);

    let coasting = fixture.world.linear_velocity(tracked.body).unwrap();
    assert_relative_eq!(coasting.y, falling.y, epsilon = 1e-3);
}

#[test]
fn test_impulse_wakes_sleeping_body() {
    let mut fixture = Fixture::new();
    let tracked = fixture.promote(
        Vec3::new(0.0, 5.0, 0.0),
        Mesh::cuboid(1.0, 1.0, 1.0),
        ShapeKind::Cube,
    );
    fixture.world.body_mut(tracked.body).unwrap().sleep();
    assert!(fixture.world.body(tracked.body).unwrap().is_sleeping());

    fixture
        .registry
        .apply_impulse(&mut fixture.world, &tracked, Vec3::new(5.0, 0.0, 0.0))
        .unwrap();

    let body = fixture.world.body(tracked.body).unwrap();
    assert!(!body.is_sleeping());
    assert!(body.linvel().x > 0.0);
}
