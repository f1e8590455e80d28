//! Vertex and instance records as they sit in GPU buffers.
//!
//! Field order and widths are the attribute contract with the mesher and the
//! renderer; the GPU vertex layouts in `blockshade-render` mirror them.

use glam::{Vec2, Vec3, Vec4};

use crate::light::{FaceLights, PackedLight};

/// One corner of the shared unit-cube mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    /// Corner in model space, inside `[0, 1]^3`.
    pub position: [f32; 3],
    /// Texture coordinate inside the layer.
    pub uv: [f32; 2],
    /// Face slot (0..6); constant over the four corners of a face.
    pub face: u32,
}

impl CubeVertex {
    /// Model-space position.
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Texture coordinate.
    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }
}

/// Per-instance record for the lit cube pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeInstance {
    /// World offset of the cube (integer aligned).
    pub position: [f32; 3],
    /// Texture-array layer.
    pub texture_index: u32,
    /// Light levels of faces 0..4.
    pub light_lo: [u8; 4],
    /// Light levels of faces 4..6.
    pub light_hi: [u8; 2],
    /// Keeps the stride at a multiple of four bytes.
    pub _padding: [u8; 2],
}

impl CubeInstance {
    /// Build an instance at an integer voxel position.
    pub fn new(position: [i32; 3], texture_index: u32, lights: FaceLights) -> Self {
        let packed = lights.pack();
        Self {
            position: position.map(|c| c as f32),
            texture_index,
            light_lo: packed.lo,
            light_hi: packed.hi,
            _padding: [0; 2],
        }
    }

    /// World offset.
    pub fn offset(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Light payload as carried on the wire.
    pub fn packed_light(&self) -> PackedLight {
        PackedLight {
            lo: self.light_lo,
            hi: self.light_hi,
        }
    }
}

/// Per-instance record for the unlit cube pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BasicInstance {
    /// World offset of the cube.
    pub position: [f32; 3],
    /// Texture-array layer.
    pub texture_index: u32,
}

impl BasicInstance {
    /// Build an instance at an integer voxel position.
    pub fn new(position: [i32; 3], texture_index: u32) -> Self {
        Self {
            position: position.map(|c| c as f32),
            texture_index,
        }
    }

    /// World offset.
    pub fn offset(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// 2D vertex for screen quads and isometric icons.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenVertex {
    /// Position in quad space (unit square for images).
    pub position: [f32; 2],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl ScreenVertex {
    /// Construct from glam vectors.
    pub fn new(position: Vec2, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            uv: uv.to_array(),
        }
    }
}

/// One glyph: both opposite corners in position and texture space plus a tint.
///
/// Uploaded once per glyph with instance step; the four quad corners are
/// derived from the vertex ordinal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextVertex {
    /// Top-left corner in text space (y grows downward).
    pub left_top: [f32; 2],
    /// Bottom-right corner in text space.
    pub right_bottom: [f32; 2],
    /// Texture coordinate at the top-left corner.
    pub tex_left_top: [f32; 2],
    /// Texture coordinate at the bottom-right corner.
    pub tex_right_bottom: [f32; 2],
    /// Glyph tint (RGBA).
    pub color: [f32; 4],
}

impl TextVertex {
    /// Glyph tint.
    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn record_sizes_match_vertex_strides() {
        assert_eq!(size_of::<CubeVertex>(), 24);
        assert_eq!(size_of::<CubeInstance>(), 24);
        assert_eq!(size_of::<BasicInstance>(), 16);
        assert_eq!(size_of::<ScreenVertex>(), 16);
        assert_eq!(size_of::<TextVertex>(), 48);
    }

    #[test]
    fn light_vectors_are_adjacent() {
        assert_eq!(offset_of!(CubeInstance, texture_index), 12);
        assert_eq!(offset_of!(CubeInstance, light_lo), 16);
        assert_eq!(offset_of!(CubeInstance, light_hi), 20);
    }

    #[test]
    fn instance_bytes_carry_faces_in_order() {
        let instance = CubeInstance::new([1, 2, 3], 4, FaceLights([9, 8, 7, 6, 5, 4]));
        let bytes = bytemuck::bytes_of(&instance);
        assert_eq!(&bytes[16..22], &[9, 8, 7, 6, 5, 4]);
        assert_eq!(instance.packed_light().unpack(), FaceLights([9, 8, 7, 6, 5, 4]));
    }
}
