//! Pairs visual nodes with their rigid bodies.
//!
//! The registry is the only place a body is created for a node, so a node is
//! tracked at most once. Poses flow one way: physics to scene, once per frame
//! after stepping.

use crate::collider::ColliderDescriptor;
use crate::error::{Error, Result};
use crate::params::SimulationParameters;
use crate::physics::PhysicsWorld;
use crate::scene::{NodeId, Scene};
use glam::Vec3;
use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
use std::collections::BTreeMap;

/// Upward nudge given to every freshly promoted body.
pub const DEFAULT_SETTLE_IMPULSE: Vec3 = Vec3::new(0.0, 0.5, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedBody {
    pub node: NodeId,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    Created(TrackedBody),
    /// The node already had a body; nothing was created.
    AlreadyTracked(TrackedBody),
}

impl Promotion {
    pub fn tracked(&self) -> TrackedBody {
        match *self {
            Promotion::Created(tracked) | Promotion::AlreadyTracked(tracked) => tracked,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Promotion::Created(_))
    }
}

#[derive(Debug, Clone)]
pub struct RigidBodyRegistry {
    tracked: BTreeMap<NodeId, TrackedBody>,
    settle_impulse: Vec3,
}

impl Default for RigidBodyRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_IMPULSE)
    }
}

impl RigidBodyRegistry {
    pub fn new(settle_impulse: Vec3) -> Self {
        Self {
            tracked: BTreeMap::new(),
            settle_impulse,
        }
    }

    /// Creates a dynamic body for `pivot` at its current world position.
    ///
    /// Promoting a node that is already tracked returns its existing body.
    pub fn create_body(
        &mut self,
        scene: &Scene,
        world: &mut PhysicsWorld,
        pivot: NodeId,
        descriptor: &ColliderDescriptor,
        params: &SimulationParameters,
    ) -> Result<Promotion> {
        if let Some(tracked) = self.tracked.get(&pivot) {
            log::debug!("{:?} is already tracked, skipping promotion", pivot);
            return Ok(Promotion::AlreadyTracked(*tracked));
        }

        let position = scene.world_position(pivot)?;
        let body = world.create_dynamic_body(position, params.damping);
        let Some(collider) =
            world.attach_collider(body, &descriptor.shape, params.restitution, params.friction)
        else {
            world.remove_body(body);
            return Err(Error::DegenerateGeometry {
                node: pivot,
                shape: descriptor.shape.kind().name(),
            });
        };

        let tracked = TrackedBody {
            node: pivot,
            body,
            collider,
        };
        self.tracked.insert(pivot, tracked);
        self.apply_impulse(world, &tracked, self.settle_impulse)?;

        log::info!(
            "promoted {:?} to a {} body at {:?}",
            scene.node(pivot)?.name,
            descriptor.shape.kind(),
            position
        );
        Ok(Promotion::Created(tracked))
    }

    /// Copies every body's pose onto its node's local transform.
    ///
    /// Tracked nodes are direct children of the root, so local and world
    /// transforms coincide. A body that has gone missing does not stop the
    /// others from syncing; the first such failure is returned afterwards.
    pub fn sync_all(&self, world: &PhysicsWorld, scene: &mut Scene) -> Result<()> {
        let mut first_error = None;
        for tracked in self.tracked.values() {
            let Some((translation, rotation)) = world.pose(tracked.body) else {
                first_error.get_or_insert(Error::MissingBody(tracked.node));
                continue;
            };
            let transform = &mut scene.node_mut(tracked.node)?.transform;
            transform.translation = translation;
            transform.rotation = rotation;
        }
        log::trace!("synced {} bodies", self.tracked.len());
        first_error.map_or(Ok(()), Err)
    }

    /// Pushes material, damping and gravity onto the world and every body.
    pub fn propagate_parameters(
        &self,
        world: &mut PhysicsWorld,
        params: &SimulationParameters,
    ) -> Result<()> {
        world.set_gravity(params.gravity_vector());
        for tracked in self.tracked.values() {
            let collider = world
                .collider_mut(tracked.collider)
                .ok_or(Error::MissingBody(tracked.node))?;
            collider.set_restitution(params.restitution);
            collider.set_friction(params.friction);

            let body = world
                .body_mut(tracked.body)
                .ok_or(Error::MissingBody(tracked.node))?;
            body.set_linear_damping(params.damping);
            body.set_angular_damping(params.damping);
        }
        Ok(())
    }

    /// Wakes the body, then applies a one-shot impulse.
    pub fn apply_impulse(
        &self,
        world: &mut PhysicsWorld,
        tracked: &TrackedBody,
        impulse: Vec3,
    ) -> Result<()> {
        let body = world
            .body_mut(tracked.body)
            .ok_or(Error::MissingBody(tracked.node))?;
        body.wake_up(true);
        body.apply_impulse(crate::physics::to_vector(impulse), true);
        Ok(())
    }

    pub fn get(&self, node: NodeId) -> Option<&TrackedBody> {
        self.tracked.get(&node)
    }

    pub fn is_tracked(&self, node: NodeId) -> bool {
        self.tracked.contains_key(&node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedBody> {
        self.tracked.values()
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::{self, ShapeKind};
    use crate::mesh::Mesh;
    use crate::scene::{NodeKind, Transform};

    fn promoted_cube() -> (Scene, PhysicsWorld, RigidBodyRegistry, NodeId, ColliderDescriptor) {
        let mut scene = Scene::new();
        let cube = scene
            .add(
                scene.root(),
                "cube",
                NodeKind::Object,
                Transform::from_translation(Vec3::new(0.0, 5.0, 0.0)),
                Some(Mesh::cuboid(1.0, 1.0, 1.0)),
            )
            .unwrap();
        let params = SimulationParameters::default();
        let (pivot, descriptor) =
            collider::fit(&mut scene, cube, ShapeKind::Cube, &params).unwrap();
        let world = PhysicsWorld::new(params.gravity_vector(), 1.0 / 60.0);
        (scene, world, RigidBodyRegistry::default(), pivot, descriptor)
    }

    #[test]
    fn test_create_body_is_idempotent() {
        let (scene, mut world, mut registry, pivot, descriptor) = promoted_cube();
        let params = SimulationParameters::default();
        let first = registry
            .create_body(&scene, &mut world, pivot, &descriptor, &params)
            .unwrap();
        let second = registry
            .create_body(&scene, &mut world, pivot, &descriptor, &params)
            .unwrap();
        assert!(first.is_created());
        assert_eq!(second, Promotion::AlreadyTracked(first.tracked()));
        assert_eq!(registry.len(), 1);
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_settle_impulse_moves_body_up() {
        let (scene, mut world, mut registry, pivot, descriptor) = promoted_cube();
        let params = SimulationParameters::default();
        let tracked = registry
            .create_body(&scene, &mut world, pivot, &descriptor, &params)
            .unwrap()
            .tracked();
        let velocity = world.linear_velocity(tracked.body).unwrap();
        assert!(velocity.y > 0.0);
    }

    #[test]
    fn test_propagate_with_no_bodies_sets_gravity() {
        let mut world = PhysicsWorld::new(Vec3::ZERO, 1.0 / 60.0);
        let params = SimulationParameters {
            gravity: -3.0,
            ..Default::default()
        };
        RigidBodyRegistry::default()
            .propagate_parameters(&mut world, &params)
            .unwrap();
        assert_eq!(world.gravity(), Vec3::new(0.0, -3.0, 0.0));
    }
}
