//! Off-screen color and depth attachments.

use anyhow::Result;

use crate::context::{RenderContext, COLOR_FORMAT, DEPTH_FORMAT};
use crate::screenshot::record_texture_readback;

/// Color target with the depth buffer used by the cube passes.
pub struct OffscreenTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    size: (u32, u32),
}

impl OffscreenTarget {
    /// Allocate attachments of `size` pixels.
    pub fn new(ctx: &RenderContext, size: (u32, u32)) -> Self {
        let extent = wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: 1,
        };
        let color = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Color"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Depth"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            color,
            size,
        }
    }

    /// Begin the depth-tested cube pass, clearing color to `clear` and depth
    /// to the far plane.
    pub fn begin_scene_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
        clear: wgpu::Color,
    ) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        })
    }

    /// Begin an overlay pass drawn on top of the existing color, no depth.
    pub fn begin_overlay_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
    ) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            ..Default::default()
        })
    }

    /// Submit `encoder` followed by a copy of the color target and return
    /// its contents as RGBA8 rows.
    pub fn finish_and_read(
        &self,
        ctx: &RenderContext,
        mut encoder: wgpu::CommandEncoder,
    ) -> Result<Vec<u8>> {
        let readback =
            record_texture_readback(&ctx.device, &mut encoder, &self.color, self.size);
        ctx.queue.submit(Some(encoder.finish()));
        readback.read_rgba8(&ctx.device)
    }
}
