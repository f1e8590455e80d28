//! Property-based tests for the shading contract
//!
//! Validates:
//! - Face light lookup is an exact table lookup over the packed payload
//! - Normalization is range-preserving and monotonic for both light formats
//! - Highlight is exactly binary
//! - Cutout discards only zero alpha

use blockshade_core::{
    cube_fragment, cube_vertex, AlphaPolicy, CubeInstance, CubeUniforms, CubeVarying, CubeVertex,
    FaceLights, HighlightSelector, LightFormat, Texture2d, TextureArray,
};
use glam::{Mat4, Vec2, Vec4};
use proptest::prelude::*;

fn light_format() -> impl Strategy<Value = LightFormat> {
    prop_oneof![Just(LightFormat::Nibble), Just(LightFormat::Byte)]
}

proptest! {
    /// Property: the packed payload reconstructs every face exactly.
    #[test]
    fn face_lookup_is_exact(levels in any::<[u8; 6]>(), face in 0u32..6) {
        let packed = FaceLights(levels).pack();
        prop_assert_eq!(packed.level(face), levels[face as usize]);
        prop_assert_eq!(packed.unpack(), FaceLights(levels));
    }

    /// Property: the vertex stage forwards the normalized light of its own face.
    #[test]
    fn vertex_light_follows_face(levels in any::<[u8; 6]>(), face in 0u32..6) {
        let instance = CubeInstance::new([0, 0, 0], 0, FaceLights(levels));
        let vertex = CubeVertex { position: [0.0; 3], uv: [0.0; 2], face };
        let out = cube_vertex(&vertex, &instance, &CubeUniforms::new(Mat4::IDENTITY));
        prop_assert_eq!(out.light, LightFormat::Byte.normalize(levels[face as usize]));
    }

    /// Property: intensity stays in [0, 1] and never decreases with the level.
    #[test]
    fn normalize_is_monotonic(format in light_format(), a in any::<u8>(), b in any::<u8>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (ilo, ihi) = (format.normalize(lo), format.normalize(hi));
        prop_assert!((0.0..=1.0).contains(&ilo));
        prop_assert!((0.0..=1.0).contains(&ihi));
        prop_assert!(ilo <= ihi);
    }

    /// Property: requantizing to a finer format and back is lossless.
    #[test]
    fn nibble_survives_byte_round_trip(levels in proptest::array::uniform6(0u8..=15)) {
        let lights = FaceLights(levels);
        let byte = lights.requantize(LightFormat::Nibble, LightFormat::Byte);
        prop_assert!(LightFormat::Byte.validate(&byte).is_ok());
        prop_assert_eq!(byte.requantize(LightFormat::Byte, LightFormat::Nibble), lights);
    }

    /// Property: highlight is 1.0 only on an exact component-wise match.
    #[test]
    fn highlight_is_binary(
        position in proptest::array::uniform3(-64i32..64),
        selected in proptest::array::uniform3(-64i32..64),
    ) {
        let uniforms = CubeUniforms::new(Mat4::IDENTITY)
            .with_selector(HighlightSelector::voxel(selected));
        let instance = CubeInstance::new(position, 0, FaceLights::default());
        let vertex = CubeVertex { position: [0.5; 3], uv: [0.0; 2], face: 0 };
        let flag = cube_vertex(&vertex, &instance, &uniforms).highlight;
        prop_assert_eq!(flag, if position == selected { 1.0 } else { 0.0 });
    }

    /// Property: only texels with zero alpha are cut out.
    #[test]
    fn only_zero_alpha_discards(alpha in any::<u8>(), light in 0.0f32..=1.0) {
        let layer = Texture2d::solid(1, 1, [200, 100, 50, alpha]).unwrap();
        let textures = TextureArray::new(vec![layer]).unwrap();
        let varying = CubeVarying {
            clip_position: Vec4::W,
            uv: Vec2::ZERO,
            light,
            highlight: 0.0,
            layer: 0,
        };
        let fragment = cube_fragment(&varying, &textures, AlphaPolicy::CutoutOpaque);
        prop_assert_eq!(fragment.is_discarded(), alpha == 0);
        if let Some(color) = fragment.color() {
            prop_assert_eq!(color.w, 1.0);
        }
    }
}
