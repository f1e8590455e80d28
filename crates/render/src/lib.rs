#![warn(missing_docs)]
//! wgpu backend for the blockshade stages.
//!
//! Each pipeline binds the record layouts of `blockshade-core` to the
//! attribute slots its WGSL shader declares, so the GPU output matches the
//! reference stages and the software rasterizer.

mod camera;
mod context;
mod layout;
mod pipeline;
mod screenshot;
mod target;
mod texture;
mod uniforms;

pub use camera::Camera;
pub use context::{RenderContext, COLOR_FORMAT, DEPTH_FORMAT};
pub use layout::{
    basic_cube_vertex_layout, basic_instance_layout, glyph_instance_layout,
    lit_cube_vertex_layout, lit_instance_layout, screen_vertex_layout,
};
pub use pipeline::{
    CubeBatch, CubePipeline, CubeVariant, IsometricPipeline, OverlayBatch, ScreenPipeline,
    TextPipeline,
};
pub use screenshot::{record_texture_readback, write_png, TextureReadback};
pub use target::OffscreenTarget;
pub use texture::{load_texture_array, DataSource, GpuTexture, TextureLoadError};
pub use uniforms::{CubeUniform, IsometricUniform, ScreenUniform};
