//! Color and depth targets written by the rasterizer.

use glam::Vec4;

/// Depth value a cleared target starts at (the far plane).
pub const CLEAR_DEPTH: f32 = 1.0;

/// One RGBA color target with an attached depth buffer.
///
/// Colors are linear floating point saturated to `[0, 1]` on every write,
/// so blending reads the same destination an `Rgba8Unorm` attachment holds.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<Vec4>,
    depth: Vec<f32>,
}

impl Framebuffer {
    /// Create a target cleared to `clear_color` and the far plane.
    pub fn new(width: u32, height: u32, clear_color: Vec4) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![saturate(clear_color); len],
            depth: vec![CLEAR_DEPTH; len],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Color at `(x, y)`; `None` outside the target.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        self.index(x, y).map(|i| self.color[i])
    }

    /// Depth at `(x, y)`; `None` outside the target.
    pub fn depth(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    pub(crate) fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub(crate) fn depth_at(&self, index: usize) -> f32 {
        self.depth[index]
    }

    pub(crate) fn set_depth(&mut self, index: usize, depth: f32) {
        self.depth[index] = depth;
    }

    pub(crate) fn color_at(&self, index: usize) -> Vec4 {
        self.color[index]
    }

    pub(crate) fn set_color(&mut self, index: usize, color: Vec4) {
        self.color[index] = saturate(color);
    }

    /// Export as tightly packed RGBA8, rows top to bottom.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.color
            .iter()
            .flat_map(|c| c.to_array().map(|channel| (channel * 255.0).round() as u8))
            .collect()
    }
}

fn saturate(color: Vec4) -> Vec4 {
    color.clamp(Vec4::ZERO, Vec4::ONE)
}
