//! Rapier-backed physics world.
//!
//! Thin adapter over the rapier sets and pipeline. Everything outside this
//! module speaks `glam`; conversion to nalgebra happens here only.

use crate::collider::ColliderShape;
use crate::error::{Error, Result};
use glam::{Quat, Vec3};
use rapier3d::prelude::*;

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    steps: u64,
}

pub(crate) fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub(crate) fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3, fixed_step: f32) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = fixed_step;

        Self {
            gravity: to_vector(gravity),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            steps: 0,
        }
    }

    pub fn gravity(&self) -> Vec3 {
        from_vector(&self.gravity)
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_vector(gravity);
    }

    pub fn fixed_step(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Number of completed steps since creation.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Advances the world by one fixed step.
    pub fn step(&mut self) -> Result<()> {
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(Error::NonFiniteState(format!("gravity {:?}", self.gravity())));
        }
        let dt = self.integration_parameters.dt;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::NonFiniteState(format!("timestep {}", dt)));
        }

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.steps += 1;
        Ok(())
    }

    /// Static box, used for the ground.
    pub fn add_fixed_cuboid(&mut self, center: Vec3, half_extents: Vec3) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed().translation(to_vector(center)).build();
        let handle = self.bodies.insert(body);
        let collider =
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    pub fn create_dynamic_body(&mut self, translation: Vec3, damping: f32) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(translation))
            .linear_damping(damping)
            .angular_damping(damping)
            .build();
        self.bodies.insert(body)
    }

    /// Removes a body together with its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Builds a collider from `shape` and attaches it to `body`.
    ///
    /// Fails only when a hull shape is degenerate (fewer than four
    /// non-coplanar points).
    pub fn attach_collider(
        &mut self,
        body: RigidBodyHandle,
        shape: &ColliderShape,
        restitution: f32,
        friction: f32,
    ) -> Option<ColliderHandle> {
        let builder = match shape {
            ColliderShape::Ball { radius } => ColliderBuilder::ball(*radius),
            ColliderShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ColliderShape::Cylinder {
                half_height,
                radius,
            } => ColliderBuilder::cylinder(*half_height, *radius),
            ColliderShape::ConvexHull { points } => {
                let points: Vec<Point<Real>> =
                    points.iter().map(|p| point![p.x, p.y, p.z]).collect();
                ColliderBuilder::convex_hull(&points)?
            }
        };
        let collider = builder.restitution(restitution).friction(friction).build();
        Some(
            self.colliders
                .insert_with_parent(collider, body, &mut self.bodies),
        )
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    pub fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.colliders.get_mut(handle)
    }

    /// Current translation and orientation of a body.
    pub fn pose(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        self.bodies.get(handle).map(|body| {
            let rotation = body.rotation();
            (
                from_vector(body.translation()),
                Quat::from_xyzw(rotation.i, rotation.j, rotation.k, rotation.w),
            )
        })
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|body| from_vector(body.linvel()))
    }
}
