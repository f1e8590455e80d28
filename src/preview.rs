//! Rendering the demo frame through either backend.

use anyhow::{Context, Result};
use blockshade_core::{cube_mesh, isometric_block_mesh, screen_quad_mesh};
use blockshade_raster::{
    draw_basic_cubes, draw_cubes, draw_isometric_block, draw_screen_quad, draw_text, DrawStats,
    Framebuffer,
};
use blockshade_render::{
    CubePipeline, CubeVariant, GpuTexture, IsometricPipeline, OffscreenTarget, RenderContext,
    ScreenPipeline, TextPipeline,
};
use glam::Vec4;
use tracing::info;

use crate::config::{Backend, PreviewConfig};
use crate::scene::Scene;

/// Render `scene` with the backend `cfg` selects and return RGBA8 rows.
pub fn render(cfg: &PreviewConfig, scene: &Scene) -> Result<Vec<u8>> {
    match cfg.backend {
        Backend::Software => Ok(render_software(cfg, scene)),
        Backend::Gpu => render_gpu(cfg, scene),
    }
}

/// Run the reference stages on the CPU rasterizer.
pub fn render_software(cfg: &PreviewConfig, scene: &Scene) -> Vec<u8> {
    let mut fb = Framebuffer::new(cfg.width, cfg.height, Vec4::from_array(cfg.clear_color));
    let cube = cube_mesh();

    let mut stats = DrawStats::default();
    stats += draw_cubes(&mut fb, &cube, &scene.lit, &scene.uniforms, &scene.textures, scene.policy);
    stats += draw_basic_cubes(&mut fb, &cube, &scene.basic, &scene.uniforms, &scene.textures);
    stats += draw_isometric_block(
        &mut fb,
        &isometric_block_mesh(),
        &scene.icon_transform,
        scene.icon_layer,
        &scene.textures,
    );
    stats += draw_screen_quad(
        &mut fb,
        &screen_quad_mesh(),
        &scene.crosshair_transform,
        &scene.crosshair,
    );
    stats += draw_text(&mut fb, &scene.glyphs, &scene.text_transform, &scene.font);

    info!(
        triangles = stats.triangles,
        written = stats.written,
        discarded = stats.discarded,
        depth_rejected = stats.depth_rejected,
        "Software frame complete"
    );
    fb.to_rgba8()
}

/// Run the WGSL stages on a headless wgpu device.
pub fn render_gpu(cfg: &PreviewConfig, scene: &Scene) -> Result<Vec<u8>> {
    let ctx = pollster::block_on(RenderContext::new_headless(cfg.force_fallback_adapter))
        .context("GPU backend unavailable")?;
    let device = &ctx.device;
    let queue = &ctx.queue;

    let textures = GpuTexture::from_array(device, queue, &scene.textures);
    let crosshair = GpuTexture::from_texture(device, queue, &scene.crosshair, "Crosshair");
    let font = GpuTexture::from_texture(device, queue, &scene.font, "Glyph Coverage");

    let lit = CubePipeline::new(&ctx, CubeVariant::Lit(scene.policy))?;
    let basic = CubePipeline::new(&ctx, CubeVariant::Basic)?;
    let isometric = IsometricPipeline::new(&ctx)?;
    let screen = ScreenPipeline::new(&ctx)?;
    let text = TextPipeline::new(&ctx)?;

    let lit_batch = lit.prepare_lit(&ctx, &scene.lit, &scene.uniforms, &textures)?;
    let basic_batch = basic.prepare_basic(&ctx, &scene.basic, &scene.uniforms, &textures)?;
    let icon_batch = isometric.prepare(&ctx, &scene.icon_transform, scene.icon_layer, &textures);
    let crosshair_batch = screen.prepare(&ctx, &scene.crosshair_transform, &crosshair);
    let text_batch = if scene.glyphs.is_empty() {
        None
    } else {
        Some(text.prepare(&ctx, &scene.glyphs, &scene.text_transform, &font)?)
    };

    let target = OffscreenTarget::new(&ctx, (cfg.width, cfg.height));
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Preview Encoder"),
    });
    let [r, g, b, a] = cfg.clear_color.map(f64::from);
    {
        let mut pass = target.begin_scene_pass(&mut encoder, wgpu::Color { r, g, b, a });
        lit.draw(&mut pass, &lit_batch);
        basic.draw(&mut pass, &basic_batch);
    }
    {
        let mut pass = target.begin_overlay_pass(&mut encoder);
        isometric.draw(&mut pass, &icon_batch);
        screen.draw(&mut pass, &crosshair_batch);
        if let Some(batch) = &text_batch {
            text.draw(&mut pass, batch);
        }
    }

    let rgba = target.finish_and_read(&ctx, encoder)?;
    info!(adapter = %ctx.adapter_name, "GPU frame complete");
    Ok(rgba)
}
