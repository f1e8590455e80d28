//! Cube face indexing shared by the mesh, the light payload and the shaders.

use glam::{Vec2, Vec3};

/// Number of faces on a cube (and light slots per instance).
pub const FACE_COUNT: usize = 6;

/// One of the six axis-aligned cube faces.
///
/// The discriminant is the `face` vertex attribute and the light slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Face {
    /// +X
    PosX = 0,
    /// +Y (top)
    PosY = 1,
    /// +Z
    PosZ = 2,
    /// -X
    NegX = 3,
    /// -Y (bottom)
    NegY = 4,
    /// -Z
    NegZ = 5,
}

/// Per-face constants: outward normal and the origin of the face's cell in the
/// 3×2 face grid every texture-array layer is laid out in.
struct FaceInfo {
    normal: [f32; 3],
    uv_origin: [f32; 2],
}

const FACE_TABLE: [FaceInfo; FACE_COUNT] = [
    FaceInfo {
        normal: [1.0, 0.0, 0.0],
        uv_origin: [2.0 / 3.0, 0.0],
    },
    FaceInfo {
        normal: [0.0, 1.0, 0.0],
        uv_origin: [1.0 / 3.0, 0.0],
    },
    FaceInfo {
        normal: [0.0, 0.0, 1.0],
        uv_origin: [0.0, 0.0],
    },
    FaceInfo {
        normal: [-1.0, 0.0, 0.0],
        uv_origin: [2.0 / 3.0, 0.5],
    },
    FaceInfo {
        normal: [0.0, -1.0, 0.0],
        uv_origin: [1.0 / 3.0, 0.5],
    },
    FaceInfo {
        normal: [0.0, 0.0, -1.0],
        uv_origin: [0.0, 0.5],
    },
];

/// Size of one face cell inside a layer, in UV units.
pub const FACE_CELL_SIZE: Vec2 = Vec2::new(1.0 / 3.0, 1.0 / 2.0);

impl Face {
    /// All faces in slot order.
    pub const ALL: [Face; FACE_COUNT] = [
        Face::PosX,
        Face::PosY,
        Face::PosZ,
        Face::NegX,
        Face::NegY,
        Face::NegZ,
    ];

    /// Face for a raw slot index, if it is in range.
    pub fn from_index(index: u32) -> Option<Face> {
        Face::ALL.get(index as usize).copied()
    }

    /// Slot index (0..6).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vec3 {
        Vec3::from_array(FACE_TABLE[self.index()].normal)
    }

    /// Top-left corner of this face's cell in the per-layer face grid.
    pub fn uv_origin(self) -> Vec2 {
        Vec2::from_array(FACE_TABLE[self.index()].uv_origin)
    }

    /// The face on the other side of the cube.
    pub fn opposite(self) -> Face {
        Face::ALL[(self.index() + 3) % FACE_COUNT]
    }
}
