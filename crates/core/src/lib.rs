#![warn(missing_docs)]
//! Reference implementation of the voxel shading contract.
//!
//! Every vertex and fragment stage the GPU pipelines run is defined here as a
//! pure function over the same records the GPU buffers hold. The software
//! rasterizer executes these directly; the WGSL shaders must agree with them.

pub mod cube;
pub mod face;
pub mod fragment;
pub mod layout;
pub mod light;
pub mod mesh;
pub mod screen;
pub mod text;
pub mod texture;

pub use cube::{
    basic_cube_vertex, cube_fragment, cube_vertex, highlight_tint, CubeUniforms, CubeVarying,
    HighlightSelector, HIGHLIGHT_TINT,
};
pub use face::{Face, FACE_CELL_SIZE, FACE_COUNT};
pub use fragment::{is_cut_out, AlphaPolicy, Fragment};
pub use layout::{BasicInstance, CubeInstance, CubeVertex, ScreenVertex, TextVertex};
pub use light::{FaceLights, LightError, LightFormat, PackedLight};
pub use mesh::{cube_mesh, isometric_block_mesh, screen_quad_mesh, Mesh};
pub use screen::{
    isometric_fragment, screen_fragment, screen_vertex, DrawParams, ScreenSpace, ScreenTransform,
    ScreenVarying,
};
pub use text::{
    glyph_corner, text_extent, text_fragment, text_vertex, GlyphQuad, Rect, TextVarying,
    GLYPH_CORNERS, GLYPH_CORNER_COUNT,
};
pub use texture::{ArraySampler, Sampler2d, TexelFormat, Texture2d, TextureArray, TextureError};
