//! CPU-side textures with the sampling behaviour the GPU pipelines configure:
//! nearest filtering, clamp-to-edge addressing, normalized 8-bit texels.

use glam::{Vec2, Vec4};
use thiserror::Error;

/// Errors raised while assembling texture data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureError {
    /// A texture array needs at least one layer.
    #[error("texture array has no layers")]
    NoLayers,
    /// A layer's dimensions differ from the first layer.
    #[error(
        "layer {layer} is {found_width}x{found_height}, expected {expected_width}x{expected_height}"
    )]
    LayerSizeMismatch {
        /// Index of the offending layer.
        layer: usize,
        /// Width of layer 0.
        expected_width: u32,
        /// Height of layer 0.
        expected_height: u32,
        /// Width of the offending layer.
        found_width: u32,
        /// Height of the offending layer.
        found_height: u32,
    },
    /// Pixel buffer length does not match the dimensions.
    #[error("texel data is {found} bytes, expected {expected}")]
    DataLength {
        /// Bytes required by width × height × channels.
        expected: usize,
        /// Bytes supplied.
        found: usize,
    },
    /// Zero-sized textures cannot be sampled.
    #[error("texture dimensions must be non-zero")]
    Empty,
}

/// Texel storage format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexelFormat {
    /// Four 8-bit channels.
    Rgba8,
    /// Single 8-bit channel, sampled as `(r, 0, 0, 1)`.
    R8,
}

impl TexelFormat {
    /// Bytes per texel.
    pub fn channels(self) -> usize {
        match self {
            TexelFormat::Rgba8 => 4,
            TexelFormat::R8 => 1,
        }
    }
}

/// Sampler over a single 2D texture.
pub trait Sampler2d {
    /// Sample at a normalized coordinate.
    fn sample(&self, uv: Vec2) -> Vec4;
}

/// Sampler over a 2D texture array.
pub trait ArraySampler {
    /// Sample layer `layer` at a normalized coordinate.
    fn sample_layer(&self, uv: Vec2, layer: u32) -> Vec4;
}

/// A 2D texture held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture2d {
    width: u32,
    height: u32,
    format: TexelFormat,
    data: Vec<u8>,
}

impl Texture2d {
    /// Wrap tightly packed texel bytes.
    pub fn new(
        width: u32,
        height: u32,
        format: TexelFormat,
        data: Vec<u8>,
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty);
        }
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(TextureError::DataLength {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Texture of one repeated RGBA8 texel.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, TextureError> {
        let data = rgba.repeat(width as usize * height as usize);
        Self::new(width, height, TexelFormat::Rgba8, data)
    }

    /// Width in texels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Storage format.
    pub fn format(&self) -> TexelFormat {
        self.format
    }

    /// Raw texel bytes, row-major from the top-left.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Texel at integer coordinates (clamped), normalized to `[0, 1]`.
    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let channels = self.format.channels();
        let start = (y * self.width as usize + x) * channels;
        let bytes = &self.data[start..start + channels];
        match self.format {
            TexelFormat::Rgba8 => Vec4::new(
                unorm(bytes[0]),
                unorm(bytes[1]),
                unorm(bytes[2]),
                unorm(bytes[3]),
            ),
            TexelFormat::R8 => Vec4::new(unorm(bytes[0]), 0.0, 0.0, 1.0),
        }
    }

    fn nearest(&self, uv: Vec2) -> (u32, u32) {
        (
            nearest_index(uv.x, self.width),
            nearest_index(uv.y, self.height),
        )
    }
}

impl Sampler2d for Texture2d {
    fn sample(&self, uv: Vec2) -> Vec4 {
        let (x, y) = self.nearest(uv);
        self.texel(x, y)
    }
}

/// Same-sized layers addressed by index.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureArray {
    layers: Vec<Texture2d>,
}

impl TextureArray {
    /// Assemble layers; all must share the dimensions of the first.
    pub fn new(layers: Vec<Texture2d>) -> Result<Self, TextureError> {
        let first = layers.first().ok_or(TextureError::NoLayers)?;
        let (width, height) = (first.width, first.height);
        for (layer, texture) in layers.iter().enumerate().skip(1) {
            if texture.width != width || texture.height != height {
                return Err(TextureError::LayerSizeMismatch {
                    layer,
                    expected_width: width,
                    expected_height: height,
                    found_width: texture.width,
                    found_height: texture.height,
                });
            }
        }
        Ok(Self { layers })
    }

    /// Number of layers.
    pub fn layer_count(&self) -> u32 {
        self.layers.len() as u32
    }

    /// Shared layer dimensions.
    pub fn size(&self) -> (u32, u32) {
        (self.layers[0].width, self.layers[0].height)
    }

    /// Borrow the layers in order.
    pub fn layers(&self) -> &[Texture2d] {
        &self.layers
    }
}

impl ArraySampler for TextureArray {
    /// Out-of-range layers clamp to the last one, as GPU array fetches do.
    fn sample_layer(&self, uv: Vec2, layer: u32) -> Vec4 {
        let index = (layer as usize).min(self.layers.len() - 1);
        self.layers[index].sample(uv)
    }
}

fn unorm(byte: u8) -> f32 {
    byte as f32 / 255.0
}

fn nearest_index(coord: f32, size: u32) -> u32 {
    let scaled = (coord * size as f32).floor();
    if scaled.is_nan() || scaled < 0.0 {
        0
    } else {
        (scaled as u32).min(size - 1)
    }
}
