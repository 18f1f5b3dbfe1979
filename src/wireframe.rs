use crate::mesh::Mesh;
use crate::sandbox::Sandbox;
use glam::Affine3A;

const IDLE_COLOR: [f32; 3] = [0.9, 0.9, 0.9];
const SELECTED_COLOR: [f32; 3] = [1.0, 0.85, 0.2];
const DYNAMIC_BODY_COLOR: [f32; 3] = [0.3, 0.6, 1.0];
const FLOOR_COLOR: [f32; 3] = [0.5, 0.5, 0.5]; // Gray
const DEBUG_PROXY_COLOR: [f32; 3] = [0.0, 1.0, 0.0]; // Green
pub const FLOATS_PER_VERTEX: usize = 6; // 3 position + 3 color

pub struct WireframeGeometry;

impl WireframeGeometry {
    /// Line-list vertices for every mesh in the scene, then every debug proxy.
    pub fn generate_vertices(sandbox: &Sandbox) -> Vec<f32> {
        let scene = sandbox.scene();
        let focus = sandbox.selection().focus();
        let mut vertices = Vec::new();

        for id in scene.ids() {
            let Some(mesh) = scene.get(id).and_then(|node| node.mesh.as_ref()) else {
                continue;
            };
            let Ok(world) = scene.world_matrix(id) else {
                continue;
            };
            let unit = scene.selectable_root(id);
            let color = if id == sandbox.floor() {
                FLOOR_COLOR
            } else if unit.is_some() && unit == focus {
                SELECTED_COLOR
            } else if unit.map_or(false, |unit| sandbox.registry().is_tracked(unit)) {
                DYNAMIC_BODY_COLOR
            } else {
                IDLE_COLOR
            };
            Self::add_mesh_lines(&mut vertices, mesh, &world, &color);
        }

        for proxy in sandbox.debug().proxies() {
            Self::add_mesh_lines(
                &mut vertices,
                &proxy.mesh,
                &proxy.transform.to_affine(),
                &DEBUG_PROXY_COLOR,
            );
        }

        vertices
    }

    pub fn vertex_count(vertices: &[f32]) -> u32 {
        (vertices.len() / FLOATS_PER_VERTEX) as u32
    }

    fn add_mesh_lines(vertices: &mut Vec<f32>, mesh: &Mesh, world: &Affine3A, color: &[f32; 3]) {
        for (a, b) in mesh.edges() {
            let start = world.transform_point3(mesh.positions[a as usize]);
            let end = world.transform_point3(mesh.positions[b as usize]);
            Self::add_line(vertices, &start.to_array(), &end.to_array(), color);
        }
    }

    fn add_line(vertices: &mut Vec<f32>, start: &[f32; 3], end: &[f32; 3], color: &[f32; 3]) {
        vertices.extend_from_slice(start);
        vertices.extend_from_slice(color);
        vertices.extend_from_slice(end);
        vertices.extend_from_slice(color);
    }
}
