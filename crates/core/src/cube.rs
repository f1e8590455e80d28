//! Instanced cube stages: per-face light selection, highlight, clip transform
//! and the lit fragment combine.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::fragment::{is_cut_out, AlphaPolicy, Fragment};
use crate::layout::{BasicInstance, CubeInstance, CubeVertex};
use crate::light::LightFormat;
use crate::texture::ArraySampler;

/// Additive tint applied to highlighted fragments.
pub const HIGHLIGHT_TINT: f32 = 0.5;

/// The currently selected voxel, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HighlightSelector(Option<Vec3>);

impl HighlightSelector {
    /// Nothing selected.
    pub const NONE: HighlightSelector = HighlightSelector(None);

    /// Select the voxel at an integer position.
    pub fn voxel(position: [i32; 3]) -> Self {
        Self(Some(Vec3::new(
            position[0] as f32,
            position[1] as f32,
            position[2] as f32,
        )))
    }

    /// Select an arbitrary offset (matched exactly).
    pub fn at(position: Vec3) -> Self {
        Self(Some(position))
    }

    /// Selected offset.
    pub fn position(&self) -> Option<Vec3> {
        self.0
    }

    /// `1.0` when `offset` equals the selection on every component, else `0.0`.
    pub fn flag(&self, offset: Vec3) -> f32 {
        match self.0 {
            Some(selected) if selected == offset => 1.0,
            _ => 0.0,
        }
    }
}

/// Per-draw inputs of the cube passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeUniforms {
    /// Combined model-view-projection matrix.
    pub mvp: Mat4,
    /// Selected voxel for the highlight overlay.
    pub selector: HighlightSelector,
    /// Quantization of the instances' light payload.
    pub light_format: LightFormat,
}

impl CubeUniforms {
    /// Uniforms with no selection and the canonical light format.
    pub fn new(mvp: Mat4) -> Self {
        Self {
            mvp,
            selector: HighlightSelector::NONE,
            light_format: LightFormat::CANONICAL,
        }
    }

    /// Replace the selection.
    pub fn with_selector(mut self, selector: HighlightSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Replace the light format.
    pub fn with_light_format(mut self, light_format: LightFormat) -> Self {
        self.light_format = light_format;
        self
    }
}

/// Values handed from the cube vertex stage to the fragment stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeVarying {
    /// Clip-space position.
    pub clip_position: Vec4,
    /// Texture coordinate (interpolated).
    pub uv: Vec2,
    /// Normalized face light (flat).
    pub light: f32,
    /// Highlight flag, 0.0 or 1.0 (flat).
    pub highlight: f32,
    /// Texture-array layer (flat).
    pub layer: u32,
}

/// Lit cube vertex stage.
///
/// `vertex.face` must be below 6; the mesher guarantees it.
pub fn cube_vertex(
    vertex: &CubeVertex,
    instance: &CubeInstance,
    uniforms: &CubeUniforms,
) -> CubeVarying {
    let offset = instance.offset();
    let level = instance.packed_light().level(vertex.face);
    CubeVarying {
        clip_position: uniforms.mvp * (vertex.position() + offset).extend(1.0),
        uv: vertex.uv(),
        light: uniforms.light_format.normalize(level),
        highlight: uniforms.selector.flag(offset),
        layer: instance.texture_index,
    }
}

/// Unlit cube vertex stage; the `face` attribute is ignored and light is full.
pub fn basic_cube_vertex(
    vertex: &CubeVertex,
    instance: &BasicInstance,
    uniforms: &CubeUniforms,
) -> CubeVarying {
    let offset = instance.offset();
    CubeVarying {
        clip_position: uniforms.mvp * (vertex.position() + offset).extend(1.0),
        uv: vertex.uv(),
        light: 1.0,
        highlight: uniforms.selector.flag(offset),
        layer: instance.texture_index,
    }
}

/// Tint added for a (possibly interpolated) highlight value.
pub fn highlight_tint(highlight: f32) -> f32 {
    if highlight > 0.5 {
        HIGHLIGHT_TINT
    } else {
        0.0
    }
}

/// Cube fragment stage: cutout, light scale, additive highlight.
///
/// The tint is added without clamping, so a highlighted black texel reads as
/// mid grey and bright texels saturate.
pub fn cube_fragment<S: ArraySampler + ?Sized>(
    varying: &CubeVarying,
    textures: &S,
    policy: AlphaPolicy,
) -> Fragment {
    let texel = textures.sample_layer(varying.uv, varying.layer);
    if is_cut_out(texel.w) {
        return Fragment::Discard;
    }
    let rgb = texel.truncate() * varying.light + Vec3::splat(highlight_tint(varying.highlight));
    Fragment::Color(rgb.extend(policy.resolve(texel.w)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::Face;
    use crate::light::FaceLights;
    use crate::texture::{Texture2d, TextureArray};

    fn single_layer(rgba: [u8; 4]) -> TextureArray {
        TextureArray::new(vec![Texture2d::solid(1, 1, rgba).unwrap()]).unwrap()
    }

    fn varying(light: f32, highlight: f32) -> CubeVarying {
        CubeVarying {
            clip_position: Vec4::W,
            uv: Vec2::splat(0.5),
            light,
            highlight,
            layer: 0,
        }
    }

    fn vertex_on(face: Face) -> CubeVertex {
        CubeVertex {
            position: [0.0, 1.0, 0.0],
            uv: [0.25, 0.75],
            face: face as u32,
        }
    }

    #[test]
    fn vertex_selects_its_face_light() {
        let instance = CubeInstance::new([0, 0, 0], 3, FaceLights([0, 51, 102, 153, 204, 255]));
        let uniforms = CubeUniforms::new(Mat4::IDENTITY);
        for (face, expected) in Face::ALL.into_iter().zip([0.0, 0.2, 0.4, 0.6, 0.8, 1.0]) {
            let out = cube_vertex(&vertex_on(face), &instance, &uniforms);
            assert!((out.light - expected).abs() < 1e-6, "face {face:?}");
            assert_eq!(out.layer, 3);
        }
    }

    #[test]
    fn vertex_applies_offset_then_mvp() {
        let instance = CubeInstance::new([2, 3, 4], 0, FaceLights::default());
        let mvp = Mat4::from_scale(Vec3::splat(2.0));
        let out = cube_vertex(&vertex_on(Face::PosY), &instance, &CubeUniforms::new(mvp));
        assert_eq!(out.clip_position, Vec4::new(4.0, 8.0, 8.0, 1.0));
        assert_eq!(out.uv, Vec2::new(0.25, 0.75));
    }

    #[test]
    fn nibble_format_normalizes_by_fifteen() {
        let instance = CubeInstance::new([0, 0, 0], 0, FaceLights::uniform(15));
        let uniforms = CubeUniforms::new(Mat4::IDENTITY).with_light_format(LightFormat::Nibble);
        assert_eq!(cube_vertex(&vertex_on(Face::NegX), &instance, &uniforms).light, 1.0);
    }

    #[test]
    fn highlight_requires_exact_match() {
        let uniforms =
            CubeUniforms::new(Mat4::IDENTITY).with_selector(HighlightSelector::voxel([1, 2, 3]));
        let hit = CubeInstance::new([1, 2, 3], 0, FaceLights::default());
        let near = CubeInstance::new([1, 2, 4], 0, FaceLights::default());
        let v = vertex_on(Face::PosX);
        assert_eq!(cube_vertex(&v, &hit, &uniforms).highlight, 1.0);
        assert_eq!(cube_vertex(&v, &near, &uniforms).highlight, 0.0);

        let none = CubeUniforms::new(Mat4::IDENTITY);
        assert_eq!(cube_vertex(&v, &hit, &none).highlight, 0.0);
    }

    #[test]
    fn basic_vertex_is_fully_lit() {
        let out = basic_cube_vertex(
            &vertex_on(Face::NegZ),
            &BasicInstance::new([0, 0, 0], 7),
            &CubeUniforms::new(Mat4::IDENTITY),
        );
        assert_eq!(out.light, 1.0);
        assert_eq!(out.layer, 7);
    }

    #[test]
    fn lit_highlighted_fragment_combines_additively() {
        let textures = single_layer([204, 153, 102, 255]);
        let color = cube_fragment(&varying(0.5, 1.0), &textures, AlphaPolicy::CutoutOpaque)
            .color()
            .unwrap();
        assert!((color.x - 0.9).abs() < 1e-6);
        assert!((color.y - 0.8).abs() < 1e-6);
        assert!((color.z - 0.7).abs() < 1e-6);
        assert_eq!(color.w, 1.0);
    }

    #[test]
    fn zero_alpha_discards_and_small_alpha_survives() {
        let clear = single_layer([255, 255, 255, 0]);
        let fragment = cube_fragment(&varying(1.0, 1.0), &clear, AlphaPolicy::CutoutOpaque);
        assert!(fragment.is_discarded());

        let faint = single_layer([255, 255, 255, 3]);
        let color = cube_fragment(&varying(1.0, 0.0), &faint, AlphaPolicy::CutoutPassthrough)
            .color()
            .unwrap();
        assert!((color.w - 3.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn highlight_shows_over_black() {
        let black = single_layer([0, 0, 0, 255]);
        let color = cube_fragment(&varying(0.0, 1.0), &black, AlphaPolicy::CutoutOpaque)
            .color()
            .unwrap();
        assert_eq!(color, Vec4::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn tint_threshold_is_strictly_above_half() {
        assert_eq!(highlight_tint(0.5), 0.0);
        assert_eq!(highlight_tint(0.51), HIGHLIGHT_TINT);
    }
}
