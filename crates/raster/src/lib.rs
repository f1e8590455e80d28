#![warn(missing_docs)]
//! Software rasterizer for the blockshade stages.
//!
//! Runs the reference vertex and fragment stages of `blockshade-core` over a
//! [`Framebuffer`], with the same fixed-function state the GPU pipelines use:
//! `Less` depth testing for cubes, submission-order overlays and alpha
//! blended text. Used for previews without a GPU and as the oracle the GPU
//! output is compared against.

pub mod draw;
pub mod framebuffer;
pub mod rasterizer;

pub use draw::{draw_basic_cubes, draw_cubes, draw_isometric_block, draw_screen_quad, draw_text};
pub use framebuffer::{Framebuffer, CLEAR_DEPTH};
pub use rasterizer::{
    rasterize_triangle, BlendMode, DepthMode, DrawStats, RasterState, Varyings, NEAR_W_EPSILON,
};
