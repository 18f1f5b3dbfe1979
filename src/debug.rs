//! Wireframe proxies of live colliders.
//!
//! Proxies live in their own layer, not in the scene graph, and are rebuilt
//! from the physics world each time debug mode is switched on.

use crate::collider::ColliderShape;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::physics::PhysicsWorld;
use crate::registry::{RigidBodyRegistry, TrackedBody};
use crate::scene::{NodeId, Scene, Transform};

#[derive(Debug, Clone)]
pub struct DebugProxy {
    pub owner: NodeId,
    pub transform: Transform,
    pub mesh: Mesh,
}

/// Builds a proxy for one tracked body.
///
/// Analytic colliders are rebuilt from their stored parameters. Anything else
/// falls back to every vertex under the owner, in the owner's frame, drawn as
/// a triangle soup.
pub fn build(scene: &Scene, world: &PhysicsWorld, tracked: &TrackedBody) -> Result<DebugProxy> {
    let collider = world
        .collider(tracked.collider)
        .ok_or(Error::MissingBody(tracked.node))?;

    let mesh = match ColliderShape::from_collider_shape(collider.shape()) {
        Some(ColliderShape::Ball { radius }) => Mesh::uv_sphere(radius),
        Some(ColliderShape::Cuboid { half_extents }) => {
            let size = half_extents * 2.0;
            Mesh::cuboid(size.x, size.y, size.z)
        }
        Some(ColliderShape::Cylinder {
            half_height,
            radius,
        }) => Mesh::cylinder(radius, radius, half_height * 2.0),
        Some(ColliderShape::ConvexHull { .. }) | None => {
            let to_owner = scene.world_matrix(tracked.node)?.inverse();
            Mesh::triangle_soup(scene.subtree_vertices_in(tracked.node, to_owner)?)
        }
    };

    Ok(DebugProxy {
        owner: tracked.node,
        transform: scene.node(tracked.node)?.transform,
        mesh,
    })
}

#[derive(Debug, Clone, Default)]
pub struct DebugLayer {
    enabled: bool,
    proxies: Vec<DebugProxy>,
}

impl DebugLayer {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn proxies(&self) -> &[DebugProxy] {
        &self.proxies
    }

    /// Flips debug mode. Turning it on builds one proxy per tracked body,
    /// turning it off drops them all. Returns the new mode.
    pub fn toggle(
        &mut self,
        scene: &Scene,
        world: &PhysicsWorld,
        registry: &RigidBodyRegistry,
    ) -> Result<bool> {
        if self.enabled {
            self.clear();
            self.enabled = false;
        } else {
            self.proxies = registry
                .iter()
                .map(|tracked| build(scene, world, tracked))
                .collect::<Result<Vec<_>>>()?;
            self.enabled = true;
        }
        log::info!(
            "debug mode {} ({} proxies)",
            if self.enabled { "on" } else { "off" },
            self.proxies.len()
        );
        Ok(self.enabled)
    }

    /// Adds a proxy for a freshly promoted body when debug mode is on.
    pub fn on_promoted(
        &mut self,
        scene: &Scene,
        world: &PhysicsWorld,
        tracked: &TrackedBody,
    ) -> Result<()> {
        if !self.enabled || self.proxies.iter().any(|p| p.owner == tracked.node) {
            return Ok(());
        }
        self.proxies.push(build(scene, world, tracked)?);
        Ok(())
    }

    /// Copies each owner's transform onto its proxy. Runs after `sync_all`.
    pub fn sync(&mut self, scene: &Scene) -> Result<()> {
        for proxy in &mut self.proxies {
            proxy.transform = scene.node(proxy.owner)?.transform;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.proxies.clear();
    }
}
