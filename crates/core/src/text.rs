//! Glyph quads synthesized from one record per glyph.
//!
//! Each [`TextVertex`] carries only two opposite corners; the four quad
//! corners come from the vertex ordinal through [`GLYPH_CORNERS`], so a glyph
//! costs one instance record instead of four vertices.

use glam::{Vec2, Vec4};

use crate::fragment::Fragment;
use crate::layout::TextVertex;
use crate::screen::ScreenTransform;
use crate::texture::Sampler2d;

/// Corners per glyph quad (drawn as a 4-vertex triangle strip).
pub const GLYPH_CORNER_COUNT: u32 = 4;

/// Produces `(position, texcoord)` of one corner from a glyph record.
pub type CornerFn = fn(&TextVertex) -> (Vec2, Vec2);

/// Corner selectors indexed by vertex ordinal:
/// 0 left-top, 1 right-top, 2 left-bottom, 3 right-bottom.
pub const GLYPH_CORNERS: [CornerFn; GLYPH_CORNER_COUNT as usize] = [
    |g| {
        (
            Vec2::new(g.left_top[0], g.left_top[1]),
            Vec2::new(g.tex_left_top[0], g.tex_left_top[1]),
        )
    },
    |g| {
        (
            Vec2::new(g.right_bottom[0], g.left_top[1]),
            Vec2::new(g.tex_right_bottom[0], g.tex_left_top[1]),
        )
    },
    |g| {
        (
            Vec2::new(g.left_top[0], g.right_bottom[1]),
            Vec2::new(g.tex_left_top[0], g.tex_right_bottom[1]),
        )
    },
    |g| {
        (
            Vec2::new(g.right_bottom[0], g.right_bottom[1]),
            Vec2::new(g.tex_right_bottom[0], g.tex_right_bottom[1]),
        )
    },
];

/// Corner `ordinal` (0..4) of a glyph.
pub fn glyph_corner(glyph: &TextVertex, ordinal: u32) -> (Vec2, Vec2) {
    GLYPH_CORNERS[ordinal as usize](glyph)
}

/// Values handed from the text vertex stage to its fragment stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextVarying {
    /// Clip-space position.
    pub clip_position: Vec4,
    /// Coverage texture coordinate (interpolated).
    pub uv: Vec2,
    /// Glyph tint.
    pub color: Vec4,
}

/// Text vertex stage for corner `ordinal` of `glyph`.
pub fn text_vertex(glyph: &TextVertex, ordinal: u32, transform: &ScreenTransform) -> TextVarying {
    let (position, uv) = glyph_corner(glyph, ordinal);
    TextVarying {
        clip_position: transform.to_ndc(position),
        uv,
        color: glyph.color(),
    }
}

/// Text fragment stage: the red channel is coverage; tint alpha is scaled by it.
pub fn text_fragment<S: Sampler2d + ?Sized>(varying: &TextVarying, coverage: &S) -> Fragment {
    let coverage = coverage.sample(varying.uv).x;
    if coverage <= 0.0 {
        return Fragment::Discard;
    }
    Fragment::Color(varying.color * Vec4::new(1.0, 1.0, 1.0, coverage))
}

/// Axis-aligned rectangle, `min` at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

impl Rect {
    /// Rectangle from two corners.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Width and height.
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Whether the two rectangles share an area larger than zero.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.cmplt(other.max).all() && other.min.cmplt(self.max).all()
    }
}

/// A laid-out glyph as produced by the text layout collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    /// Where the glyph lands, in text-space pixels.
    pub pixel_rect: Rect,
    /// Where the glyph sits in the coverage texture.
    pub tex_rect: Rect,
    /// Region the glyph must stay inside.
    pub bounds: Rect,
    /// Tint.
    pub color: Vec4,
}

impl GlyphQuad {
    /// Clip the glyph to its bounds and emit the instance record.
    ///
    /// Clipping shrinks the texture rectangle by the same fraction as the
    /// pixel rectangle so the glyph is cropped, not squashed. A glyph with
    /// nothing left inside its bounds yields `None`.
    pub fn to_text_vertex(&self) -> Option<TextVertex> {
        if !self.pixel_rect.overlaps(&self.bounds) {
            return None;
        }
        let mut pixel = self.pixel_rect;
        let mut tex = self.tex_rect;

        if pixel.max.x > self.bounds.max.x {
            let old_width = pixel.size().x;
            pixel.max.x = self.bounds.max.x;
            tex.max.x = tex.min.x + tex.size().x * pixel.size().x / old_width;
        }
        if pixel.min.x < self.bounds.min.x {
            let old_width = pixel.size().x;
            pixel.min.x = self.bounds.min.x;
            tex.min.x = tex.max.x - tex.size().x * pixel.size().x / old_width;
        }
        if pixel.max.y > self.bounds.max.y {
            let old_height = pixel.size().y;
            pixel.max.y = self.bounds.max.y;
            tex.max.y = tex.min.y + tex.size().y * pixel.size().y / old_height;
        }
        if pixel.min.y < self.bounds.min.y {
            let old_height = pixel.size().y;
            pixel.min.y = self.bounds.min.y;
            tex.min.y = tex.max.y - tex.size().y * pixel.size().y / old_height;
        }

        Some(TextVertex {
            left_top: pixel.min.to_array(),
            right_bottom: pixel.max.to_array(),
            tex_left_top: tex.min.to_array(),
            tex_right_bottom: tex.max.to_array(),
            color: self.color.to_array(),
        })
    }
}

/// Union of all glyph rectangles, as `(width, height)` from the origin.
pub fn text_extent(glyphs: &[TextVertex]) -> Vec2 {
    glyphs.iter().fold(Vec2::ZERO, |extent, glyph| {
        extent.max(Vec2::from_array(glyph.right_bottom))
    })
}
