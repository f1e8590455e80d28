//! 2D overlay stages: textured screen quads and isometric block icons.
//!
//! Overlay geometry lives in a y-down space that a 3×3 matrix maps onto the
//! unit square; [`ScreenTransform::to_ndc`] then flips y into device
//! coordinates.

use glam::{Mat3, Vec2, Vec4};

use crate::fragment::{is_cut_out, Fragment};
use crate::layout::ScreenVertex;
use crate::texture::{ArraySampler, Sampler2d};

/// Virtual screen the overlay positions are expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSpace {
    /// Width in virtual pixels.
    pub width: f32,
    /// Height in virtual pixels.
    pub height: f32,
}

impl Default for ScreenSpace {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

impl ScreenSpace {
    fn view_scale(&self) -> Vec2 {
        Vec2::ONE / Vec2::new(self.width, self.height)
    }
}

/// Placement of an overlay element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    /// Anchor position in virtual pixels.
    pub position: Vec2,
    /// Anchor point inside the element, relative to its size (0..1).
    pub origin: Vec2,
    /// Extra scale applied to the element's natural size.
    pub scale: Vec2,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }
}

impl DrawParams {
    /// Set the position.
    pub fn position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Set the anchor origin.
    pub fn origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Set the scale.
    pub fn scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }
}

/// Homogeneous 2D transform used by every overlay pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform(pub Mat3);

impl ScreenTransform {
    /// Identity: geometry is already in unit-square view space.
    pub const IDENTITY: ScreenTransform = ScreenTransform(Mat3::IDENTITY);

    /// Transform for a unit-square quad whose natural size is `size` pixels.
    pub fn for_quad(params: &DrawParams, size: Vec2, screen: &ScreenSpace) -> Self {
        let s = screen.view_scale();
        Self(
            Mat3::from_translation(params.position * s)
                * Mat3::from_scale(s * size * params.scale)
                * Mat3::from_translation(-params.origin),
        )
    }

    /// Transform for text laid out in pixels with total extent `text_size`.
    pub fn for_text(params: &DrawParams, text_size: Vec2, screen: &ScreenSpace) -> Self {
        let s = screen.view_scale();
        Self(
            Mat3::from_translation(params.position * s)
                * Mat3::from_scale(s * params.scale)
                * Mat3::from_translation(-params.origin * text_size),
        )
    }

    /// Apply the matrix to `(x, y, 1)`.
    pub fn to_view(&self, point: Vec2) -> Vec2 {
        (self.0 * point.extend(1.0)).truncate()
    }

    /// Map to normalized device coordinates, flipping y.
    pub fn to_ndc(&self, point: Vec2) -> Vec4 {
        let view = self.to_view(point);
        Vec4::new(view.x * 2.0 - 1.0, (1.0 - view.y) * 2.0 - 1.0, 0.0, 1.0)
    }
}

/// Values handed from the overlay vertex stage to its fragment stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVarying {
    /// Clip-space position.
    pub clip_position: Vec4,
    /// Texture coordinate (interpolated).
    pub uv: Vec2,
}

/// Overlay vertex stage shared by screen quads and isometric icons.
pub fn screen_vertex(vertex: &ScreenVertex, transform: &ScreenTransform) -> ScreenVarying {
    ScreenVarying {
        clip_position: transform.to_ndc(Vec2::from_array(vertex.position)),
        uv: Vec2::from_array(vertex.uv),
    }
}

/// Screen-quad fragment stage: cutout, then the texel unchanged.
pub fn screen_fragment<S: Sampler2d + ?Sized>(uv: Vec2, texture: &S) -> Fragment {
    let texel = texture.sample(uv);
    if is_cut_out(texel.w) {
        Fragment::Discard
    } else {
        Fragment::Color(texel)
    }
}

/// Isometric-icon fragment stage: like [`screen_fragment`] on one array layer.
pub fn isometric_fragment<S: ArraySampler + ?Sized>(
    uv: Vec2,
    layer: u32,
    textures: &S,
) -> Fragment {
    let texel = textures.sample_layer(uv, layer);
    if is_cut_out(texel.w) {
        Fragment::Discard
    } else {
        Fragment::Color(texel)
    }
}
