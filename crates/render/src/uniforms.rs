//! Uniform blocks laid out for WGSL alignment.

use blockshade_core::{CubeUniforms, ScreenTransform};
use glam::Mat3;

/// Cube pass uniform (`CubeUniform` in `cube.wgsl` and `cube_basic.wgsl`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeUniform {
    /// Model-view-projection matrix, column major.
    pub mvp: [[f32; 4]; 4],
    /// Selected voxel position; meaningless unless `selection_active` is set.
    pub selector: [f32; 3],
    /// Maximum level of the light format in use.
    pub light_max: f32,
    /// Non-zero when a voxel is selected.
    pub selection_active: u32,
    /// Padding to the 16-byte struct alignment.
    pub _padding: [u32; 3],
}

impl CubeUniform {
    /// Flatten per-draw cube state.
    pub fn from_uniforms(uniforms: &CubeUniforms) -> Self {
        let selected = uniforms.selector.position();
        Self {
            mvp: uniforms.mvp.to_cols_array_2d(),
            selector: selected.map(|p| p.to_array()).unwrap_or([0.0; 3]),
            light_max: f32::from(uniforms.light_format.max_level()),
            selection_active: u32::from(selected.is_some()),
            _padding: [0; 3],
        }
    }
}

/// `mat3x3<f32>` as WGSL stores it: three columns padded to 16 bytes.
fn mat3_columns(matrix: Mat3) -> [[f32; 4]; 3] {
    [matrix.x_axis, matrix.y_axis, matrix.z_axis].map(|column| column.extend(0.0).to_array())
}

/// Screen quad and text uniform (`ScreenUniform`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenUniform {
    /// Screen transform columns.
    pub transform: [[f32; 4]; 3],
}

impl ScreenUniform {
    /// Upload form of a screen transform.
    pub fn from_transform(transform: &ScreenTransform) -> Self {
        Self {
            transform: mat3_columns(transform.0),
        }
    }
}

/// Isometric icon uniform (`IsometricUniform`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct IsometricUniform {
    /// Screen transform columns.
    pub transform: [[f32; 4]; 3],
    /// Texture-array layer of the block.
    pub layer: u32,
    /// Padding to the 16-byte struct alignment.
    pub _padding: [u32; 3],
}

impl IsometricUniform {
    /// Upload form of an icon draw.
    pub fn new(transform: &ScreenTransform, layer: u32) -> Self {
        Self {
            transform: mat3_columns(transform.0),
            layer,
            _padding: [0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockshade_core::{HighlightSelector, LightFormat};
    use glam::{Mat4, Vec2};
    use std::mem::{offset_of, size_of};

    #[test]
    fn sizes_match_wgsl_layout() {
        assert_eq!(size_of::<CubeUniform>(), 96);
        assert_eq!(offset_of!(CubeUniform, selector), 64);
        assert_eq!(offset_of!(CubeUniform, light_max), 76);
        assert_eq!(offset_of!(CubeUniform, selection_active), 80);
        assert_eq!(size_of::<ScreenUniform>(), 48);
        assert_eq!(size_of::<IsometricUniform>(), 64);
        assert_eq!(offset_of!(IsometricUniform, layer), 48);
    }

    #[test]
    fn no_selection_clears_the_flag() {
        let uniform = CubeUniform::from_uniforms(&CubeUniforms::new(Mat4::IDENTITY));
        assert_eq!(uniform.selection_active, 0);
        assert_eq!(uniform.light_max, 255.0);
    }

    #[test]
    fn selection_and_format_are_uploaded() {
        let uniforms = CubeUniforms::new(Mat4::IDENTITY)
            .with_selector(HighlightSelector::voxel([1, -2, 3]))
            .with_light_format(LightFormat::Nibble);
        let uniform = CubeUniform::from_uniforms(&uniforms);
        assert_eq!(uniform.selection_active, 1);
        assert_eq!(uniform.selector, [1.0, -2.0, 3.0]);
        assert_eq!(uniform.light_max, 15.0);
    }

    #[test]
    fn mat3_columns_are_padded() {
        let transform = ScreenTransform(Mat3::from_translation(Vec2::new(0.25, 0.5)));
        let uniform = ScreenUniform::from_transform(&transform);
        assert_eq!(uniform.transform[2], [0.25, 0.5, 1.0, 0.0]);
        assert_eq!(uniform.transform[0], [1.0, 0.0, 0.0, 0.0]);
    }
}
