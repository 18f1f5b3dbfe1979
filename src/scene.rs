//! Arena scene graph.
//!
//! Nodes are addressed by `NodeId` and never removed. Node 0 is the root.
//! Each node carries a local transform relative to its parent and an optional
//! mesh in its own local space.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use glam::{Affine3A, Quat, Vec3};

const RAY_EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn from_affine(affine: &Affine3A) -> Self {
        let (scale, rotation, translation) = affine.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Object,
    /// Synthetic parent whose origin sits on its child's bounding-box center.
    Pivot,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    /// Pickable nodes and all of their descendants take part in ray picks.
    pub pickable: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |aabb, p| Self {
            min: aabb.min.min(p),
            max: aabb.max.max(p),
        }))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Möller–Trumbore, two-sided. Returns the hit distance along the ray.
    pub fn intersect_triangle(&self, [a, b, c]: [Vec3; 3]) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < RAY_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let t_vec = self.origin - a;
        let u = t_vec.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = t_vec.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let distance = edge2.dot(q) * inv_det;
        (distance > RAY_EPSILON).then_some(distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: "root".to_string(),
                kind: NodeKind::Group,
                transform: Transform::IDENTITY,
                mesh: None,
                pickable: false,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn add(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        kind: NodeKind,
        transform: Transform,
        mesh: Option<Mesh>,
    ) -> Result<NodeId> {
        self.get(parent).ok_or(Error::UnknownNode(parent))?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            kind,
            transform,
            mesh,
            pickable: false,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(Error::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.get_mut(id).ok_or(Error::UnknownNode(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// First node with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    /// Moves `child` under `new_parent`, keeping its local transform as is.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) -> Result<()> {
        if child == NodeId::ROOT || self.is_ancestor(child, new_parent) {
            return Err(Error::InvalidReparent {
                child,
                parent: new_parent,
            });
        }
        self.node(new_parent)?;
        if let Some(old_parent) = self.node(child)?.parent {
            self.nodes[old_parent.0].children.retain(|&c| c != child);
        }
        self.nodes[child.0].parent = Some(new_parent);
        self.nodes[new_parent.0].children.push(child);
        Ok(())
    }

    /// True when `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    pub fn world_matrix(&self, id: NodeId) -> Result<Affine3A> {
        let node = self.node(id)?;
        let local = node.transform.to_affine();
        match node.parent {
            Some(parent) => Ok(self.world_matrix(parent)? * local),
            None => Ok(local),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Result<Vec3> {
        Ok(self.world_matrix(id)?.translation.into())
    }

    /// `id` followed by all of its descendants, depth first.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get(current) {
                out.push(current);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Vertices of every mesh in the subtree of `id`, transformed by `frame`
    /// applied after each mesh's world matrix.
    pub fn subtree_vertices_in(&self, id: NodeId, frame: Affine3A) -> Result<Vec<Vec3>> {
        let mut vertices = Vec::new();
        for node_id in self.subtree(id) {
            let node = self.node(node_id)?;
            if let Some(mesh) = &node.mesh {
                let to_frame = frame * self.world_matrix(node_id)?;
                vertices.extend(mesh.positions.iter().map(|p| to_frame.transform_point3(*p)));
            }
        }
        Ok(vertices)
    }

    pub fn world_vertices(&self, id: NodeId) -> Result<Vec<Vec3>> {
        self.subtree_vertices_in(id, Affine3A::IDENTITY)
    }

    /// World-space bounding box of every mesh in the subtree of `id`.
    /// `None` when the subtree holds no geometry.
    pub fn world_aabb(&self, id: NodeId) -> Result<Option<Aabb>> {
        Ok(Aabb::from_points(self.world_vertices(id)?))
    }

    fn is_pickable(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.get(node_id) {
                Some(node) if node.pickable => return true,
                Some(node) => current = node.parent,
                None => return false,
            }
        }
        false
    }

    /// Nearest mesh hit among pickable nodes and their descendants.
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        let mut nearest: Option<RayHit> = None;
        for id in self.ids() {
            let Some(mesh) = self.get(id).and_then(|n| n.mesh.as_ref()) else {
                continue;
            };
            if !self.is_pickable(id) {
                continue;
            }
            let Ok(world) = self.world_matrix(id) else {
                continue;
            };
            for tri in mesh.triangles() {
                let tri = tri.map(|p| world.transform_point3(p));
                if let Some(distance) = ray.intersect_triangle(tri) {
                    if nearest.map_or(true, |hit| distance < hit.distance) {
                        nearest = Some(RayHit {
                            node: id,
                            distance,
                            point: ray.at(distance),
                        });
                    }
                }
            }
        }
        nearest
    }

    /// Walks up from `id` to the ancestor that is a direct child of the root.
    pub fn selectable_root(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let parent = self.get(current)?.parent?;
            if parent == NodeId::ROOT {
                return Some(current);
            }
            current = parent;
        }
    }
}
