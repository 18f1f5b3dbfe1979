//! Indexed triangle meshes and the primitive builders used by the demo scene
//! and by debug proxies.
//!
//! All builders produce geometry centred on the local origin, Y up.

use glam::Vec3;
use std::collections::BTreeSet;
use std::f32::consts::{PI, TAU};

const SPHERE_WIDTH_SEGMENTS: u32 = 32;
const SPHERE_HEIGHT_SEGMENTS: u32 = 16;
const CYLINDER_RADIAL_SEGMENTS: u32 = 32;
const TORUS_KNOT_TUBULAR_SEGMENTS: u32 = 64;
const TORUS_KNOT_RADIAL_SEGMENTS: u32 = 8;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }

    /// Unique undirected triangle edges, as drawn by a wireframe.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut edges = BTreeSet::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.into_iter().collect()
    }

    /// Treats every three consecutive points as a triangle. Trailing points
    /// that do not complete a triangle are kept but not indexed.
    pub fn triangle_soup(points: Vec<Vec3>) -> Self {
        let indexed = (points.len() / 3 * 3) as u32;
        Self {
            positions: points,
            indices: (0..indexed).collect(),
        }
    }

    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let h = Vec3::new(width, height, depth) * 0.5;
        let positions = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 7, 6, 3, 6, 2, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        Self::new(positions, indices)
    }

    pub fn uv_sphere(radius: f32) -> Self {
        let (width, height) = (SPHERE_WIDTH_SEGMENTS, SPHERE_HEIGHT_SEGMENTS);
        let mut positions = Vec::with_capacity(((width + 1) * (height + 1)) as usize);
        for iy in 0..=height {
            let v = iy as f32 / height as f32;
            for ix in 0..=width {
                let u = ix as f32 / width as f32;
                positions.push(Vec3::new(
                    -radius * (u * TAU).cos() * (v * PI).sin(),
                    radius * (v * PI).cos(),
                    radius * (u * TAU).sin() * (v * PI).sin(),
                ));
            }
        }

        let row = width + 1;
        let mut indices = Vec::new();
        for iy in 0..height {
            for ix in 0..width {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        Self::new(positions, indices)
    }

    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32) -> Self {
        let segments = CYLINDER_RADIAL_SEGMENTS;
        let half = height * 0.5;
        let mut positions = Vec::with_capacity((segments * 2 + 2) as usize);
        for (y, radius) in [(half, radius_top), (-half, radius_bottom)] {
            for i in 0..segments {
                let theta = i as f32 / segments as f32 * TAU;
                positions.push(Vec3::new(radius * theta.sin(), y, radius * theta.cos()));
            }
        }
        let top_center = positions.len() as u32;
        positions.push(Vec3::new(0.0, half, 0.0));
        let bottom_center = top_center + 1;
        positions.push(Vec3::new(0.0, -half, 0.0));

        let mut indices = Vec::new();
        for i in 0..segments {
            let next = (i + 1) % segments;
            let (top, top_next) = (i, next);
            let (bottom, bottom_next) = (i + segments, next + segments);
            indices.extend_from_slice(&[top, bottom, top_next]);
            indices.extend_from_slice(&[bottom, bottom_next, top_next]);
            indices.extend_from_slice(&[top_center, top, top_next]);
            indices.extend_from_slice(&[bottom_center, bottom_next, bottom]);
        }
        Self::new(positions, indices)
    }

    pub fn icosahedron(radius: f32) -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        #[rustfmt::skip]
        let raw = [
            (-1.0, t, 0.0), (1.0, t, 0.0), (-1.0, -t, 0.0), (1.0, -t, 0.0),
            (0.0, -1.0, t), (0.0, 1.0, t), (0.0, -1.0, -t), (0.0, 1.0, -t),
            (t, 0.0, -1.0), (t, 0.0, 1.0), (-t, 0.0, -1.0), (-t, 0.0, 1.0),
        ];
        let positions = raw
            .iter()
            .map(|&(x, y, z)| Vec3::new(x, y, z).normalize() * radius)
            .collect();
        #[rustfmt::skip]
        let indices = vec![
            0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11,
            1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8,
            3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9,
            4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
        ];
        Self::new(positions, indices)
    }

    /// (2, 3) torus knot swept by a circular tube.
    pub fn torus_knot(radius: f32, tube: f32) -> Self {
        let (tubular, radial) = (TORUS_KNOT_TUBULAR_SEGMENTS, TORUS_KNOT_RADIAL_SEGMENTS);
        let (p, q) = (2.0_f32, 3.0_f32);
        let curve = |u: f32| {
            let quo = q / p * u;
            let scale = radius * (2.0 + quo.cos()) * 0.5;
            Vec3::new(scale * u.cos(), scale * u.sin(), radius * quo.sin() * 0.5)
        };

        let mut positions = Vec::with_capacity(((tubular + 1) * (radial + 1)) as usize);
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * p * TAU;
            let p1 = curve(u);
            let p2 = curve(u + 0.01);
            let tangent = p2 - p1;
            let normal = p2 + p1;
            let binormal = tangent.cross(normal).normalize();
            let normal = binormal.cross(tangent).normalize();
            for j in 0..=radial {
                let v = j as f32 / radial as f32 * TAU;
                let cx = -tube * v.cos();
                let cy = tube * v.sin();
                positions.push(p1 + normal * cx + binormal * cy);
            }
        }

        let mut indices = Vec::new();
        for j in 1..=tubular {
            for i in 1..=radial {
                let a = (radial + 1) * (j - 1) + (i - 1);
                let b = (radial + 1) * j + (i - 1);
                let c = (radial + 1) * j + i;
                let d = (radial + 1) * (j - 1) + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        Self::new(positions, indices)
    }

    /// Flat XZ plane subdivided into `segments` × `segments` quads.
    pub fn floor_grid(size: f32, segments: u32) -> Self {
        let segments = segments.max(1);
        let half = size * 0.5;
        let step = size / segments as f32;
        let mut positions = Vec::with_capacity(((segments + 1) * (segments + 1)) as usize);
        for iz in 0..=segments {
            for ix in 0..=segments {
                positions.push(Vec3::new(-half + ix as f32 * step, 0.0, -half + iz as f32 * step));
            }
        }
        let row = segments + 1;
        let mut indices = Vec::new();
        for iz in 0..segments {
            for ix in 0..segments {
                let a = iz * row + ix;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
        Self::new(positions, indices)
    }
}
