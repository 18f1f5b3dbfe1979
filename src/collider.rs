//! Collider fitting.
//!
//! Derives a collision shape from a visual object's world bounding box and
//! moves the object under a pivot node centred on that box, so the pivot's
//! origin matches the centre of mass the physics body will report.
//!
//! The sphere and cylinder fits are deliberately loose: the sphere takes half
//! the largest extent, the cylinder half the larger horizontal extent. They
//! contain the box's faces, not its corners.

use crate::error::{Error, Result};
use crate::params::SimulationParameters;
use crate::scene::{Aabb, NodeId, NodeKind, Scene, Transform};
use glam::{Affine3A, Vec3};
use rapier3d::geometry::Shape;
use std::fmt;

const MIN_EXTENT: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Sphere,
    Cube,
    Cylinder,
    /// Convex hull of the object's vertices.
    Hull,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Sphere,
        ShapeKind::Cube,
        ShapeKind::Cylinder,
        ShapeKind::Hull,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Sphere => "sphere",
            ShapeKind::Cube => "cube",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Hull => "hull",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
    Cylinder { half_height: f32, radius: f32 },
    /// Points in the pivot's local frame.
    ConvexHull { points: Vec<Vec3> },
}

impl ColliderShape {
    /// Fits a shape of `kind` to a world-space box. Hull shapes need the
    /// vertices themselves; use `fit_hull` for those.
    pub fn fit_box(kind: ShapeKind, aabb: &Aabb) -> Option<Self> {
        let size = aabb.size();
        match kind {
            ShapeKind::Sphere => Some(ColliderShape::Ball {
                radius: size.max_element() / 2.0,
            }),
            ShapeKind::Cube => Some(ColliderShape::Cuboid {
                half_extents: size / 2.0,
            }),
            ShapeKind::Cylinder => Some(ColliderShape::Cylinder {
                half_height: size.y / 2.0,
                radius: size.x.max(size.z) / 2.0,
            }),
            ShapeKind::Hull => None,
        }
    }

    pub fn fit_hull(points: Vec<Vec3>) -> Self {
        ColliderShape::ConvexHull { points }
    }

    /// Reads the analytic parameters back from a live collider shape.
    /// Shapes without an analytic form yield `None`.
    pub fn from_collider_shape(shape: &dyn Shape) -> Option<Self> {
        if let Some(ball) = shape.as_ball() {
            return Some(ColliderShape::Ball {
                radius: ball.radius,
            });
        }
        if let Some(cuboid) = shape.as_cuboid() {
            let h = cuboid.half_extents;
            return Some(ColliderShape::Cuboid {
                half_extents: Vec3::new(h.x, h.y, h.z),
            });
        }
        if let Some(cylinder) = shape.as_cylinder() {
            return Some(ColliderShape::Cylinder {
                half_height: cylinder.half_height,
                radius: cylinder.radius,
            });
        }
        None
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            ColliderShape::Ball { .. } => ShapeKind::Sphere,
            ColliderShape::Cuboid { .. } => ShapeKind::Cube,
            ColliderShape::Cylinder { .. } => ShapeKind::Cylinder,
            ColliderShape::ConvexHull { .. } => ShapeKind::Hull,
        }
    }

    /// True when the shape encloses a non-zero volume.
    pub fn has_volume(&self) -> bool {
        match self {
            ColliderShape::Ball { radius } => *radius > MIN_EXTENT,
            ColliderShape::Cuboid { half_extents } => half_extents.min_element() > MIN_EXTENT,
            ColliderShape::Cylinder {
                half_height,
                radius,
            } => *half_height > MIN_EXTENT && *radius > MIN_EXTENT,
            ColliderShape::ConvexHull { points } => spans_volume(points),
        }
    }
}

/// True when `points` are not all coplanar.
fn spans_volume(points: &[Vec3]) -> bool {
    let Some(&origin) = points.first() else {
        return false;
    };
    let Some(axis) = points
        .iter()
        .map(|p| *p - origin)
        .max_by(|a, b| a.length_squared().total_cmp(&b.length_squared()))
        .filter(|axis| axis.length() > MIN_EXTENT)
    else {
        return false;
    };
    let Some(normal) = points
        .iter()
        .map(|p| axis.cross(*p - origin))
        .max_by(|a, b| a.length_squared().total_cmp(&b.length_squared()))
        .filter(|n| n.length() > MIN_EXTENT * axis.length())
    else {
        return false;
    };
    let normal = normal.normalize();
    points
        .iter()
        .any(|p| normal.dot(*p - origin).abs() > MIN_EXTENT)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColliderDescriptor {
    pub shape: ColliderShape,
    pub restitution: f32,
    pub friction: f32,
}

impl ColliderDescriptor {
    pub fn new(shape: ColliderShape, params: &SimulationParameters) -> Self {
        Self {
            shape,
            restitution: params.restitution,
            friction: params.friction,
        }
    }
}

/// Inserts a pivot under the root at `center` and moves `object` beneath it
/// without changing the object's world transform.
///
/// An object that already is a pivot is returned unchanged, so each promoted
/// object owns exactly one pivot.
pub fn attach_pivot(scene: &mut Scene, object: NodeId, center: Vec3) -> Result<NodeId> {
    if scene.node(object)?.kind == NodeKind::Pivot {
        return Ok(object);
    }

    let object_world = scene.world_matrix(object)?;
    let name = format!("{} pivot", scene.node(object)?.name);
    let pivot = scene.add(
        scene.root(),
        name,
        NodeKind::Pivot,
        Transform::from_translation(center),
        None,
    )?;
    scene.reparent(object, pivot)?;

    let pivot_world = Affine3A::from_translation(center);
    let local = pivot_world.inverse() * object_world;
    let node = scene.node_mut(object)?;
    node.transform = Transform::from_affine(&local);
    let pickable = std::mem::replace(&mut node.pickable, false);
    scene.node_mut(pivot)?.pickable = pickable;
    Ok(pivot)
}

/// Fits a collider of `kind` to `object` and re-parents it under a pivot.
///
/// Nothing in the scene changes when fitting is rejected.
pub fn fit(
    scene: &mut Scene,
    object: NodeId,
    kind: ShapeKind,
    params: &SimulationParameters,
) -> Result<(NodeId, ColliderDescriptor)> {
    let degenerate = || Error::DegenerateGeometry {
        node: object,
        shape: kind.name(),
    };
    let aabb = scene.world_aabb(object)?.ok_or_else(degenerate)?;
    let center = aabb.center();

    let shape = match ColliderShape::fit_box(kind, &aabb) {
        Some(shape) => shape,
        None => {
            let to_pivot = Affine3A::from_translation(-center);
            ColliderShape::fit_hull(scene.subtree_vertices_in(object, to_pivot)?)
        }
    };
    if !shape.has_volume() {
        return Err(degenerate());
    }

    let pivot = attach_pivot(scene, object, center)?;
    log::info!(
        "fitted {} collider to {:?} (pivot {:?} at {:?})",
        kind,
        scene.node(object)?.name,
        pivot,
        center
    );
    Ok((pivot, ColliderDescriptor::new(shape, params)))
}
