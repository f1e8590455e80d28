//! Vertex buffer layouts binding the record types to shader locations.
//!
//! | location | lit cube           | basic cube      | screen / icon | text             |
//! |----------|--------------------|-----------------|---------------|------------------|
//! | 0        | position           | position        | position      | left_top         |
//! | 1        | uv                 | uv              | uv            | right_bottom     |
//! | 2        | face               |                 |               | tex_left_top     |
//! | 3        | instance position  | instance pos.   |               | tex_right_bottom |
//! | 4        | instance texture   | instance tex.   |               | color            |
//! | 5        | light faces 0..3   |                 |               |                  |
//! | 6        | light faces 4..5   |                 |               |                  |

use std::mem::size_of;

use blockshade_core::{BasicInstance, CubeInstance, CubeVertex, ScreenVertex, TextVertex};

const LIT_CUBE_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Uint32];

const BASIC_CUBE_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

const LIT_INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    3 => Float32x3, // position
    4 => Uint32,    // texture_index
    5 => Uint8x4,   // light_lo
    6 => Uint8x2    // light_hi
];

const BASIC_INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![3 => Float32x3, 4 => Uint32];

const SCREEN_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

const GLYPH_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    0 => Float32x2,
    1 => Float32x2,
    2 => Float32x2,
    3 => Float32x2,
    4 => Float32x4
];

/// Cube mesh vertices for the lit pipeline (with the `face` attribute).
pub fn lit_cube_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<CubeVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &LIT_CUBE_VERTEX_ATTRIBUTES,
    }
}

/// Cube mesh vertices for the basic pipeline; `face` is skipped.
pub fn basic_cube_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<CubeVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &BASIC_CUBE_VERTEX_ATTRIBUTES,
    }
}

/// Per-instance [`CubeInstance`] records.
pub fn lit_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<CubeInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &LIT_INSTANCE_ATTRIBUTES,
    }
}

/// Per-instance [`BasicInstance`] records.
pub fn basic_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<BasicInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &BASIC_INSTANCE_ATTRIBUTES,
    }
}

/// Screen quad and isometric icon vertices.
pub fn screen_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<ScreenVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &SCREEN_VERTEX_ATTRIBUTES,
    }
}

/// One [`TextVertex`] per glyph, stepped per instance.
pub fn glyph_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<TextVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &GLYPH_ATTRIBUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    fn locations(layout: &wgpu::VertexBufferLayout<'_>) -> Vec<(u32, u64)> {
        layout
            .attributes
            .iter()
            .map(|a| (a.shader_location, a.offset))
            .collect()
    }

    #[test]
    fn lit_cube_binds_every_slot() {
        assert_eq!(
            locations(&lit_cube_vertex_layout()),
            vec![
                (0, offset_of!(CubeVertex, position) as u64),
                (1, offset_of!(CubeVertex, uv) as u64),
                (2, offset_of!(CubeVertex, face) as u64),
            ]
        );
        assert_eq!(
            locations(&lit_instance_layout()),
            vec![
                (3, offset_of!(CubeInstance, position) as u64),
                (4, offset_of!(CubeInstance, texture_index) as u64),
                (5, offset_of!(CubeInstance, light_lo) as u64),
                (6, offset_of!(CubeInstance, light_hi) as u64),
            ]
        );
    }

    #[test]
    fn basic_cube_skips_face_and_light() {
        let vertex = locations(&basic_cube_vertex_layout());
        let instance = locations(&basic_instance_layout());
        assert_eq!(vertex.iter().map(|l| l.0).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(instance, vec![(3, 0), (4, 12)]);
        assert_eq!(basic_cube_vertex_layout().array_stride, 24);
        assert_eq!(basic_instance_layout().array_stride, 16);
    }

    #[test]
    fn glyph_fields_follow_record_order() {
        let layout = glyph_instance_layout();
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(layout.array_stride, 48);
        assert_eq!(
            locations(&layout),
            vec![
                (0, offset_of!(TextVertex, left_top) as u64),
                (1, offset_of!(TextVertex, right_bottom) as u64),
                (2, offset_of!(TextVertex, tex_left_top) as u64),
                (3, offset_of!(TextVertex, tex_right_bottom) as u64),
                (4, offset_of!(TextVertex, color) as u64),
            ]
        );
    }
}
