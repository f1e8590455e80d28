//! The demo frame: a small lit voxel patch, a cutout block, a selection,
//! an inventory-style icon, a crosshair and a text label.

use anyhow::{Context, Result};
use blockshade_core::{
    text_extent, AlphaPolicy, BasicInstance, CubeInstance, CubeUniforms, DrawParams, Face,
    FaceLights, GlyphQuad, HighlightSelector, LightFormat, Rect, ScreenSpace, ScreenTransform,
    TexelFormat, TextVertex, Texture2d, TextureArray, TextureError,
};
use glam::{IVec3, Vec2, Vec4};
use tracing::debug;

use crate::config::PreviewConfig;

/// Material ids of the procedural layers.
pub const GRASS: u32 = 0;
pub const STONE: u32 = 1;
pub const PLANKS: u32 = 2;
pub const GLASS: u32 = 3;
const MATERIALS: u32 = 4;

const FLOOR_SIZE: i32 = 6;
const PILLAR: [i32; 3] = [2, 1, 2];
const PILLAR_HEIGHT: i32 = 3;

/// Texel size of one face cell in the procedural layers.
const CELL_TEXELS: u32 = 8;

const ICON_SIZE: f32 = 64.0;
const CROSSHAIR_SIZE: f32 = 18.0;
const MARGIN: f32 = 12.0;

/// Everything one frame draws, shared by both backends.
pub struct Scene {
    pub textures: TextureArray,
    pub uniforms: CubeUniforms,
    pub policy: AlphaPolicy,
    pub lit: Vec<CubeInstance>,
    pub basic: Vec<BasicInstance>,
    pub icon_layer: u32,
    pub icon_transform: ScreenTransform,
    pub crosshair: Texture2d,
    pub crosshair_transform: ScreenTransform,
    pub glyphs: Vec<TextVertex>,
    pub font: Texture2d,
    pub text_transform: ScreenTransform,
}

impl Scene {
    /// Assemble the frame described by `cfg` over an already loaded texture array.
    pub fn build(cfg: &PreviewConfig, textures: TextureArray) -> Result<Self> {
        let lit = lit_instances(cfg.light_format)?;
        let basic = vec![
            BasicInstance::new([4, 1, 1], GLASS),
            BasicInstance::new([4, 2, 1], GLASS),
        ];

        let mut uniforms = CubeUniforms::new(cfg.camera.view_projection_matrix(cfg.aspect()))
            .with_light_format(cfg.light_format);
        if let Some(voxel) = cfg.selection {
            uniforms = uniforms.with_selector(HighlightSelector::voxel(voxel));
        }

        let screen = ScreenSpace {
            width: cfg.width as f32,
            height: cfg.height as f32,
        };
        let icon_transform = ScreenTransform::for_quad(
            &DrawParams::default()
                .position(Vec2::new(screen.width - MARGIN, screen.height - MARGIN))
                .origin(Vec2::ONE),
            Vec2::splat(ICON_SIZE),
            &screen,
        );
        let crosshair_transform = ScreenTransform::for_quad(
            &DrawParams::default()
                .position(Vec2::new(screen.width, screen.height) * 0.5)
                .origin(Vec2::splat(0.5)),
            Vec2::splat(CROSSHAIR_SIZE),
            &screen,
        );

        let font = BitmapFont::new()?;
        let bounds = Rect::new(Vec2::ZERO, Vec2::new(screen.width - 2.0 * MARGIN, screen.height));
        let glyphs = font.layout(&cfg.label, Vec4::new(1.0, 0.95, 0.6, 1.0), bounds);
        let text_transform = ScreenTransform::for_text(
            &DrawParams::default().position(Vec2::splat(MARGIN)),
            text_extent(&glyphs),
            &screen,
        );

        debug!(
            lit = lit.len(),
            basic = basic.len(),
            glyphs = glyphs.len(),
            layers = textures.layer_count(),
            "Built preview scene"
        );

        Ok(Self {
            textures,
            uniforms,
            policy: cfg.alpha_policy,
            lit,
            basic,
            icon_layer: STONE,
            icon_transform,
            crosshair: crosshair_texture()?,
            crosshair_transform,
            glyphs,
            font: font.coverage,
            text_transform,
        })
    }
}

/// Floor and pillar instances with sun-style per-face light.
///
/// Levels are produced in the canonical byte format and requantized when the
/// preview asks for another one.
fn lit_instances(format: LightFormat) -> Result<Vec<CubeInstance>> {
    let pillar = IVec3::from_array(PILLAR);
    let mut voxels = Vec::new();
    for x in 0..FLOOR_SIZE {
        for z in 0..FLOOR_SIZE {
            voxels.push((IVec3::new(x, 0, z), GRASS));
        }
    }
    for y in 0..PILLAR_HEIGHT {
        let material = if y + 1 == PILLAR_HEIGHT { PLANKS } else { STONE };
        voxels.push((pillar + IVec3::Y * y, material));
    }

    voxels
        .into_iter()
        .map(|(voxel, material)| {
            let distance = (voxel - pillar).abs();
            let shade = (distance.x + distance.y + distance.z).min(6) as u8 * 12;
            let lights = sunlight(shade).requantize(LightFormat::CANONICAL, format);
            format
                .validate(&lights)
                .with_context(|| format!("light payload of voxel {voxel}"))?;
            Ok(CubeInstance::new(voxel.to_array(), material, lights))
        })
        .collect()
}

fn sunlight(shade: u8) -> FaceLights {
    let mut lights = FaceLights::uniform(0);
    for (face, level) in [
        (Face::PosY, 255u8),
        (Face::PosX, 210),
        (Face::PosZ, 185),
        (Face::NegX, 150),
        (Face::NegZ, 125),
        (Face::NegY, 80),
    ] {
        lights.set(face, level.saturating_sub(shade));
    }
    lights
}

/// Procedural texture array: one tinted layer per material, each face cell
/// shaded differently, plus a framed cutout layer.
pub fn debug_layers() -> Result<TextureArray, TextureError> {
    let width = CELL_TEXELS * 3;
    let height = CELL_TEXELS * 2;
    let layers = (0..MATERIALS)
        .map(|material| {
            let mut data = Vec::with_capacity((width * height * 4) as usize);
            for y in 0..height {
                for x in 0..width {
                    data.extend_from_slice(&debug_texel(material, x, y));
                }
            }
            Texture2d::new(width, height, TexelFormat::Rgba8, data)
        })
        .collect::<Result<Vec<_>, _>>()?;
    TextureArray::new(layers)
}

fn debug_texel(material: u32, x: u32, y: u32) -> [u8; 4] {
    let (cx, cy) = (x % CELL_TEXELS, y % CELL_TEXELS);
    let edge = cx == 0 || cy == 0 || cx == CELL_TEXELS - 1 || cy == CELL_TEXELS - 1;

    if material == GLASS {
        return if edge || cx == cy {
            [200, 230, 255, 255]
        } else {
            [0, 0, 0, 0]
        };
    }

    let cell = (y / CELL_TEXELS) * 3 + x / CELL_TEXELS;
    let tile = material + 1;
    let base = [
        ((tile * 37) % 256) as f32,
        ((tile * 73) % 256) as f32,
        ((tile * 109) % 256) as f32,
    ];
    let checker = if (cx / 2 + cy / 2) % 2 == 0 { 1.0 } else { 0.85 };
    let mut scale = checker * (1.0 - 0.06 * cell as f32);
    if edge {
        scale *= 0.6;
    }
    [
        (base[0] * scale) as u8,
        (base[1] * scale) as u8,
        (base[2] * scale) as u8,
        255,
    ]
}

fn crosshair_texture() -> Result<Texture2d, TextureError> {
    const SIZE: u32 = 9;
    let mid = SIZE / 2;
    let mut data = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let on = x == mid || y == mid;
            data.extend_from_slice(if on { &[255, 255, 255, 230] } else { &[0, 0, 0, 0] });
        }
    }
    Texture2d::new(SIZE, SIZE, TexelFormat::Rgba8, data)
}

/// 3×5 bitmap glyphs, one row per byte, most significant of the low three
/// bits on the left.
const GLYPHS: &[(char, [u8; 5])] = &[
    ('A', [0b111, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b111, 0b100, 0b100, 0b100, 0b111]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b111, 0b100, 0b111]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('O', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('S', [0b111, 0b100, 0b111, 0b001, 0b111]),
];
const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;
/// Atlas column stride; the extra column keeps neighbours apart.
const GLYPH_STRIDE: u32 = GLYPH_WIDTH + 1;
/// Screen pixels per glyph texel.
const GLYPH_SCALE: f32 = 4.0;

/// R8 coverage atlas of [`GLYPHS`] plus the layout that indexes it.
struct BitmapFont {
    coverage: Texture2d,
}

impl BitmapFont {
    fn new() -> Result<Self, TextureError> {
        let width = GLYPHS.len() as u32 * GLYPH_STRIDE;
        let mut data = vec![0u8; (width * GLYPH_HEIGHT) as usize];
        for (slot, (_, rows)) in GLYPHS.iter().enumerate() {
            for (y, row) in rows.iter().enumerate() {
                for x in 0..GLYPH_WIDTH {
                    if row >> (GLYPH_WIDTH - 1 - x) & 1 == 1 {
                        data[y * width as usize + slot * GLYPH_STRIDE as usize + x as usize] = 255;
                    }
                }
            }
        }
        Ok(Self {
            coverage: Texture2d::new(width, GLYPH_HEIGHT, TexelFormat::R8, data)?,
        })
    }

    /// Lay `text` out left to right in text-space pixels, clipped to `bounds`.
    ///
    /// Characters without a glyph advance the pen and draw nothing.
    fn layout(&self, text: &str, color: Vec4, bounds: Rect) -> Vec<TextVertex> {
        let atlas_width = self.coverage.width() as f32;
        let advance = GLYPH_STRIDE as f32 * GLYPH_SCALE;
        let size = Vec2::new(GLYPH_WIDTH as f32, GLYPH_HEIGHT as f32) * GLYPH_SCALE;

        text.chars()
            .enumerate()
            .filter_map(|(column, ch)| {
                let slot = GLYPHS.iter().position(|(c, _)| *c == ch.to_ascii_uppercase())?;
                let min = Vec2::new(column as f32 * advance, 0.0);
                let tex_x = (slot as u32 * GLYPH_STRIDE) as f32 / atlas_width;
                let quad = GlyphQuad {
                    pixel_rect: Rect::new(min, min + size),
                    tex_rect: Rect::new(
                        Vec2::new(tex_x, 0.0),
                        Vec2::new(tex_x + GLYPH_WIDTH as f32 / atlas_width, 1.0),
                    ),
                    bounds,
                    color,
                };
                quad.to_text_vertex()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockshade_core::{glyph_corner, Sampler2d};

    #[test]
    fn default_scene_builds() {
        let cfg = PreviewConfig::default();
        let scene = Scene::build(&cfg, debug_layers().unwrap()).unwrap();
        assert_eq!(scene.lit.len(), (FLOOR_SIZE * FLOOR_SIZE + PILLAR_HEIGHT) as usize);
        assert_eq!(scene.glyphs.len(), cfg.label.len());
        assert!(scene.uniforms.selector.position().is_some());
    }

    #[test]
    fn nibble_scene_carries_nibble_levels() {
        let cfg = PreviewConfig {
            light_format: LightFormat::Nibble,
            ..PreviewConfig::default()
        };
        let scene = Scene::build(&cfg, debug_layers().unwrap()).unwrap();
        assert_eq!(scene.uniforms.light_format, LightFormat::Nibble);
        for instance in &scene.lit {
            assert!(instance.light_lo.iter().chain(&instance.light_hi).all(|&l| l <= 15));
        }
    }

    #[test]
    fn no_selection_means_no_highlight() {
        let cfg = PreviewConfig {
            selection: None,
            ..PreviewConfig::default()
        };
        let scene = Scene::build(&cfg, debug_layers().unwrap()).unwrap();
        assert_eq!(scene.uniforms.selector.position(), None);
    }

    #[test]
    fn glass_layer_has_cutout_texels() {
        let layers = debug_layers().unwrap();
        let glass = &layers.layers()[GLASS as usize];
        assert_eq!(glass.texel(0, 0).w, 1.0);
        assert_eq!(glass.texel(2, 1).w, 0.0);
    }

    #[test]
    fn glyphs_sample_their_own_atlas_cell() {
        let font = BitmapFont::new().unwrap();
        let bounds = Rect::new(Vec2::ZERO, Vec2::splat(1000.0));
        let glyphs = font.layout("L", Vec4::ONE, bounds);
        assert_eq!(glyphs.len(), 1);

        // 'L' has its left column lit top to bottom and a bare top-right corner.
        let (_, left_top) = glyph_corner(&glyphs[0], 0);
        let (_, right_top) = glyph_corner(&glyphs[0], 1);
        assert_eq!(font.coverage.sample(left_top + Vec2::splat(0.01)).x, 1.0);
        assert_eq!(font.coverage.sample(right_top + Vec2::new(-0.01, 0.01)).x, 0.0);
    }

    #[test]
    fn unknown_characters_only_advance() {
        let font = BitmapFont::new().unwrap();
        let bounds = Rect::new(Vec2::ZERO, Vec2::splat(1000.0));
        let glyphs = font.layout("A A", Vec4::ONE, bounds);
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[1].left_top[0], 2.0 * GLYPH_STRIDE as f32 * GLYPH_SCALE);
    }

    #[test]
    fn label_is_clipped_to_bounds() {
        let font = BitmapFont::new().unwrap();
        let bounds = Rect::new(Vec2::ZERO, Vec2::new(20.0, 100.0));
        let glyphs = font.layout("ABCDE", Vec4::ONE, bounds);
        assert!(glyphs.iter().all(|g| g.right_bottom[0] <= 20.0));
        assert_eq!(glyphs.len(), 2);
    }
}
