//! Draw calls mirroring the GPU passes, one per pipeline.

use blockshade_core::{
    basic_cube_vertex, cube_fragment, cube_vertex, isometric_fragment, screen_fragment,
    screen_vertex, text_fragment, text_vertex, AlphaPolicy, ArraySampler, BasicInstance,
    CubeInstance, CubeUniforms, CubeVarying, CubeVertex, Mesh, Sampler2d, ScreenTransform,
    ScreenVarying, ScreenVertex, TextVertex,
};
use tracing::debug;

use crate::framebuffer::Framebuffer;
use crate::rasterizer::{rasterize_triangle, DrawStats, RasterState, Varyings};

/// Triangles of a 4-vertex strip, keeping each triangle's leading vertex first.
const STRIP_TRIANGLES: [[usize; 3]; 2] = [[0, 1, 2], [1, 3, 2]];

fn draw_indexed<V, F>(
    target: &mut Framebuffer,
    varyings: &[V],
    indices: &[u16],
    state: RasterState,
    stats: &mut DrawStats,
    mut shade: F,
) where
    V: Varyings,
    F: FnMut(&V) -> blockshade_core::Fragment,
{
    for triangle in indices.chunks_exact(3) {
        let triangle = [0, 1, 2].map(|corner| varyings[triangle[corner] as usize]);
        rasterize_triangle(target, &triangle, state, stats, &mut shade);
    }
}

/// Instanced lit cubes: one copy of `mesh` per instance, depth tested.
pub fn draw_cubes<S: ArraySampler + ?Sized>(
    target: &mut Framebuffer,
    mesh: &Mesh<CubeVertex>,
    instances: &[CubeInstance],
    uniforms: &CubeUniforms,
    textures: &S,
    policy: AlphaPolicy,
) -> DrawStats {
    let mut stats = DrawStats::default();
    let mut varyings: Vec<CubeVarying> = Vec::with_capacity(mesh.vertices.len());
    for instance in instances {
        varyings.clear();
        varyings.extend(mesh.vertices.iter().map(|v| cube_vertex(v, instance, uniforms)));
        draw_indexed(target, &varyings, &mesh.indices, RasterState::OPAQUE, &mut stats, |v| {
            cube_fragment(v, textures, policy)
        });
    }
    debug!(
        instances = instances.len(),
        written = stats.written,
        discarded = stats.discarded,
        depth_rejected = stats.depth_rejected,
        "Drew lit cubes"
    );
    stats
}

/// Instanced unlit cubes; texel alpha passes through.
pub fn draw_basic_cubes<S: ArraySampler + ?Sized>(
    target: &mut Framebuffer,
    mesh: &Mesh<CubeVertex>,
    instances: &[BasicInstance],
    uniforms: &CubeUniforms,
    textures: &S,
) -> DrawStats {
    let mut stats = DrawStats::default();
    let mut varyings: Vec<CubeVarying> = Vec::with_capacity(mesh.vertices.len());
    for instance in instances {
        varyings.clear();
        varyings.extend(mesh.vertices.iter().map(|v| basic_cube_vertex(v, instance, uniforms)));
        draw_indexed(target, &varyings, &mesh.indices, RasterState::OPAQUE, &mut stats, |v| {
            cube_fragment(v, textures, AlphaPolicy::CutoutPassthrough)
        });
    }
    debug!(
        instances = instances.len(),
        written = stats.written,
        discarded = stats.discarded,
        "Drew basic cubes"
    );
    stats
}

/// A textured quad in screen space, drawn over whatever is in the target.
pub fn draw_screen_quad<S: Sampler2d + ?Sized>(
    target: &mut Framebuffer,
    mesh: &Mesh<ScreenVertex>,
    transform: &ScreenTransform,
    texture: &S,
) -> DrawStats {
    let mut stats = DrawStats::default();
    let varyings: Vec<ScreenVarying> =
        mesh.vertices.iter().map(|v| screen_vertex(v, transform)).collect();
    draw_indexed(target, &varyings, &mesh.indices, RasterState::OVERLAY, &mut stats, |v| {
        screen_fragment(v.uv, texture)
    });
    debug!(written = stats.written, discarded = stats.discarded, "Drew screen quad");
    stats
}

/// An isometric block icon sampling one texture-array layer.
pub fn draw_isometric_block<S: ArraySampler + ?Sized>(
    target: &mut Framebuffer,
    mesh: &Mesh<ScreenVertex>,
    transform: &ScreenTransform,
    layer: u32,
    textures: &S,
) -> DrawStats {
    let mut stats = DrawStats::default();
    let varyings: Vec<ScreenVarying> =
        mesh.vertices.iter().map(|v| screen_vertex(v, transform)).collect();
    draw_indexed(target, &varyings, &mesh.indices, RasterState::OVERLAY, &mut stats, |v| {
        isometric_fragment(v.uv, layer, textures)
    });
    debug!(layer, written = stats.written, discarded = stats.discarded, "Drew isometric block");
    stats
}

/// Glyph quads, one record per glyph, alpha blended onto the target.
pub fn draw_text<S: Sampler2d + ?Sized>(
    target: &mut Framebuffer,
    glyphs: &[TextVertex],
    transform: &ScreenTransform,
    coverage: &S,
) -> DrawStats {
    let mut stats = DrawStats::default();
    for glyph in glyphs {
        let corners = [0, 1, 2, 3].map(|ordinal| text_vertex(glyph, ordinal, transform));
        for triangle in STRIP_TRIANGLES {
            let triangle = triangle.map(|i| corners[i]);
            rasterize_triangle(
                target,
                &triangle,
                RasterState::BLENDED_OVERLAY,
                &mut stats,
                |v| text_fragment(v, coverage),
            );
        }
    }
    debug!(
        glyphs = glyphs.len(),
        written = stats.written,
        discarded = stats.discarded,
        "Drew text"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockshade_core::{
        cube_mesh, screen_quad_mesh, FaceLights, HighlightSelector, TexelFormat, Texture2d,
        TextureArray,
    };
    use glam::{Mat4, Vec3, Vec4};

    fn solid_array(layers: &[[u8; 4]]) -> TextureArray {
        TextureArray::new(
            layers
                .iter()
                .map(|&rgba| Texture2d::solid(2, 2, rgba).unwrap())
                .collect(),
        )
        .unwrap()
    }

    /// Orthographic view down -Z; the unit cube at the origin covers the
    /// middle third of the target.
    fn front_view() -> Mat4 {
        Mat4::orthographic_rh(-1.0, 2.0, -1.0, 2.0, 0.1, 10.0)
            * Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
    }

    #[test]
    fn lit_cube_shows_its_front_face_light() {
        let mut fb = Framebuffer::new(16, 16, Vec4::ZERO);
        let mut lights = FaceLights::uniform(0);
        lights.set(blockshade_core::Face::PosZ, 51);
        let instance = CubeInstance::new([0, 0, 0], 0, lights);
        let textures = solid_array(&[[255, 255, 255, 255]]);
        let stats = draw_cubes(
            &mut fb,
            &cube_mesh(),
            &[instance],
            &CubeUniforms::new(front_view()),
            &textures,
            AlphaPolicy::CutoutOpaque,
        );
        assert!(stats.written > 0);
        let center = fb.pixel(8, 8).unwrap();
        assert!((center.x - 0.2).abs() < 1e-6, "{center:?}");
        assert_eq!(center.w, 1.0);
        // Corners of the target are outside the cube.
        assert_eq!(fb.pixel(0, 0), Some(Vec4::ZERO));
    }

    #[test]
    fn selected_cube_is_tinted() {
        let mut fb = Framebuffer::new(16, 16, Vec4::ZERO);
        let instance = CubeInstance::new([0, 0, 0], 0, FaceLights::uniform(0));
        let textures = solid_array(&[[255, 255, 255, 255]]);
        let uniforms =
            CubeUniforms::new(front_view()).with_selector(HighlightSelector::voxel([0, 0, 0]));
        draw_cubes(
            &mut fb,
            &cube_mesh(),
            &[instance],
            &uniforms,
            &textures,
            AlphaPolicy::CutoutOpaque,
        );
        assert_eq!(fb.pixel(8, 8), Some(Vec4::new(0.5, 0.5, 0.5, 1.0)));
    }

    #[test]
    fn transparent_layer_is_cut_out_everywhere() {
        let mut fb = Framebuffer::new(8, 8, Vec4::ZERO);
        let instance = BasicInstance::new([0, 0, 0], 0);
        let textures = solid_array(&[[255, 0, 0, 0]]);
        let stats = draw_basic_cubes(
            &mut fb,
            &cube_mesh(),
            &[instance],
            &CubeUniforms::new(front_view()),
            &textures,
        );
        assert_eq!(stats.written, 0);
        assert!(stats.discarded > 0);
        assert!(fb.to_rgba8().iter().all(|&b| b == 0));
    }

    #[test]
    fn basic_cubes_keep_texel_alpha() {
        let mut fb = Framebuffer::new(8, 8, Vec4::ZERO);
        let instance = BasicInstance::new([0, 0, 0], 0);
        let textures = solid_array(&[[255, 255, 255, 128]]);
        let uniforms = CubeUniforms::new(front_view());
        draw_basic_cubes(&mut fb, &cube_mesh(), &[instance], &uniforms, &textures);
        let center = fb.pixel(4, 4).unwrap();
        assert!((center.w - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn screen_quad_fills_its_rectangle() {
        let mut fb = Framebuffer::new(4, 4, Vec4::ZERO);
        let texture = Texture2d::solid(1, 1, [0, 255, 0, 255]).unwrap();
        let stats =
            draw_screen_quad(&mut fb, &screen_quad_mesh(), &ScreenTransform::IDENTITY, &texture);
        assert_eq!(stats.written, 16);
        assert_eq!(fb.pixel(3, 3), Some(Vec4::new(0.0, 1.0, 0.0, 1.0)));
    }

    #[test]
    fn text_blends_coverage_over_background() {
        let mut fb = Framebuffer::new(4, 4, Vec4::new(0.0, 0.0, 1.0, 1.0));
        let coverage = Texture2d::new(1, 1, TexelFormat::R8, vec![255]).unwrap();
        let glyph = TextVertex {
            left_top: [0.0, 0.0],
            right_bottom: [0.5, 0.5],
            tex_left_top: [0.0, 0.0],
            tex_right_bottom: [1.0, 1.0],
            color: [1.0, 0.0, 0.0, 0.5],
        };
        let stats = draw_text(&mut fb, &[glyph], &ScreenTransform::IDENTITY, &coverage);
        assert_eq!(stats.written, 4);
        assert_eq!(fb.pixel(0, 0), Some(Vec4::new(0.5, 0.0, 0.5, 1.0)));
        assert_eq!(fb.pixel(3, 3), Some(Vec4::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn text_blends_over_the_stored_saturated_color() {
        // Highlighted texels exceed 1.0 before the target stores them.
        let mut fb = Framebuffer::new(2, 2, Vec4::new(1.5, 1.5, 1.5, 1.0));
        let coverage = Texture2d::new(1, 1, TexelFormat::R8, vec![255]).unwrap();
        let glyph = TextVertex {
            left_top: [0.0, 0.0],
            right_bottom: [1.0, 1.0],
            tex_left_top: [0.0, 0.0],
            tex_right_bottom: [1.0, 1.0],
            color: [0.0, 0.0, 0.0, 0.5],
        };
        draw_text(&mut fb, &[glyph], &ScreenTransform::IDENTITY, &coverage);
        assert_eq!(&fb.to_rgba8()[..4], &[128, 128, 128, 255]);
    }
}
