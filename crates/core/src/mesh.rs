//! Static geometry shared by every draw: the instanced unit cube, the screen
//! quad and the isometric block icon.

use glam::{Vec2, Vec3};

use crate::face::{Face, FACE_CELL_SIZE};
use crate::layout::{CubeVertex, ScreenVertex};

/// Indexed triangle-list geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh<V> {
    /// Vertex records.
    pub vertices: Vec<V>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u16>,
}

impl<V> Mesh<V> {
    fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Append vertices with indices relative to the first of them.
    fn push(&mut self, vertices: impl IntoIterator<Item = V>, local_indices: &[u16]) {
        let base = self.vertices.len() as u16;
        self.vertices.extend(vertices);
        self.indices.extend(local_indices.iter().map(|i| base + i));
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Indices of the two triangles of a face quad, corners in generation order.
const FACE_QUAD_INDICES: [u16; 6] = [0, 1, 2, 3, 2, 1];

/// Four corners of one face of the unit cube.
///
/// Corners sweep the face along a tangent (`card`) and bitangent axis; UVs are
/// placed inside the face's cell of the 3×2 face grid with the top edge of
/// the cell at the upper edge of side faces.
fn cube_face(face: Face) -> [CubeVertex; 4] {
    let normal = face.normal();
    let sign = normal.x + normal.y + normal.z;
    let (card, card_cross) = if normal.x == 0.0 {
        let card = Vec3::X * sign;
        (card, normal.cross(card))
    } else {
        let card = -Vec3::Z * sign;
        (card, (Vec3::Z * sign).cross(normal))
    };
    let card_sum = card.x + card.y + card.z;
    let cross_sum = card_cross.x + card_cross.y + card_cross.z;

    [-card - card_cross, card - card_cross, -card + card_cross, card + card_cross].map(|corner| {
        let position = (normal + corner + Vec3::ONE) / 2.0;
        let along = (position * card).length();
        let across = (position * card_cross).length();
        let uv_offset = Vec2::new(
            if card_sum == 1.0 { along } else { 1.0 - along },
            if cross_sum == 1.0 { 1.0 - across } else { across },
        );
        CubeVertex {
            position: position.to_array(),
            uv: (face.uv_origin() + uv_offset * FACE_CELL_SIZE).to_array(),
            face: face as u32,
        }
    })
}

/// The shared cube: 4 vertices per face in face order, 36 indices.
pub fn cube_mesh() -> Mesh<CubeVertex> {
    let mut mesh = Mesh::new();
    for face in Face::ALL {
        mesh.push(cube_face(face), &FACE_QUAD_INDICES);
    }
    mesh
}

/// Unit quad for full-image overlays; uv matches position.
pub fn screen_quad_mesh() -> Mesh<ScreenVertex> {
    let mut mesh = Mesh::new();
    mesh.push(
        [
            ScreenVertex::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.0)),
            ScreenVertex::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.0)),
            ScreenVertex::new(Vec2::new(0.0, 1.0), Vec2::new(0.0, 1.0)),
            ScreenVertex::new(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0)),
        ],
        &[0, 1, 3, 3, 2, 0],
    );
    mesh
}

/// Isometric icon of a block showing its front (+Z), right (+X) and top (+Y)
/// faces, fitted into the unit square (y down).
pub fn isometric_block_mesh() -> Mesh<ScreenVertex> {
    // Elevation of a 30° isometric view.
    let angle = 30_f32.to_radians().sin().atan();
    let half_diagonal = std::f32::consts::SQRT_2 / 2.0;
    let h = angle.sin() * half_diagonal;
    let w = angle.cos() * half_diagonal;

    let full_height = std::f32::consts::SQRT_2 / 2.0 + h * 2.0;
    let full_width = 2.0 * w;
    let scale = 1.0 / full_width.max(full_height);

    let w = w * scale;
    let h = h * scale;
    let full_height = full_height * scale;

    let points = [
        Vec2::new(0.5, 0.0),
        Vec2::new(0.5 + w, h),
        Vec2::new(0.5 + w, full_height - h),
        Vec2::new(0.5, full_height),
        Vec2::new(0.5 - w, full_height - h),
        Vec2::new(0.5 - w, h),
    ];
    let center = Vec2::new(0.5, h * 2.0);
    let cell = |u: f32, v: f32| Vec2::new(u / 3.0, v / 2.0);

    let triangles = [
        // front
        [(points[5], cell(0.0, 0.0)), (points[4], cell(0.0, 1.0)), (center, cell(1.0, 0.0))],
        [(points[4], cell(0.0, 1.0)), (points[3], cell(1.0, 1.0)), (center, cell(1.0, 0.0))],
        // right
        [(points[3], cell(2.0, 1.0)), (points[2], cell(3.0, 1.0)), (center, cell(2.0, 0.0))],
        [(points[2], cell(3.0, 1.0)), (points[1], cell(3.0, 0.0)), (center, cell(2.0, 0.0))],
        // top
        [(points[1], cell(2.0, 0.0)), (points[0], cell(1.0, 0.0)), (center, cell(2.0, 1.0))],
        [(points[0], cell(1.0, 0.0)), (points[5], cell(1.0, 1.0)), (center, cell(2.0, 1.0))],
    ];

    let mut mesh = Mesh::new();
    for triangle in triangles {
        mesh.push(
            triangle.map(|(position, uv)| ScreenVertex::new(position, uv)),
            &[0, 1, 2],
        );
    }
    mesh
}
