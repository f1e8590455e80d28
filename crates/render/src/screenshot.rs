//! Copying rendered targets back to the CPU and saving them as PNG.

use anyhow::{Context, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, ImageEncoder};
use std::path::Path;
use std::sync::mpsc;

/// Copy of a color target waiting in a mappable buffer.
pub struct TextureReadback {
    buffer: wgpu::Buffer,
    padded_bytes_per_row: u32,
    width: u32,
    height: u32,
}

impl TextureReadback {
    /// Map the buffer and return tightly packed RGBA8 rows.
    pub fn read_rgba8(self, device: &wgpu::Device) -> Result<Vec<u8>> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });

        device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .context("readback channel closed")?
            .context("readback mapping failed")?;

        let row_bytes = (self.width * 4) as usize;
        let mut rgba = Vec::with_capacity(row_bytes * self.height as usize);
        {
            let mapped = slice.get_mapped_range();
            for row in mapped
                .chunks_exact(self.padded_bytes_per_row as usize)
                .take(self.height as usize)
            {
                rgba.extend_from_slice(&row[..row_bytes]);
            }
        }
        self.buffer.unmap();
        Ok(rgba)
    }
}

/// Record a copy of an RGBA8 `texture` into a mappable buffer.
///
/// Call [`TextureReadback::read_rgba8`] once the encoder has been submitted.
pub fn record_texture_readback(
    device: &wgpu::Device,
    encoder: &mut wgpu::CommandEncoder,
    texture: &wgpu::Texture,
    size: (u32, u32),
) -> TextureReadback {
    let (width, height) = size;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_bytes_per_row = (width * 4).div_ceil(align) * align;

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: padded_bytes_per_row as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &buffer,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    TextureReadback {
        buffer,
        padded_bytes_per_row,
        width,
        height,
    }
}

/// Write RGBA8 rows to `path` as a PNG.
pub fn write_png(path: &Path, size: (u32, u32), rgba: &[u8]) -> Result<()> {
    let (width, height) = size;
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let encoder = PngEncoder::new_with_quality(file, CompressionType::Fast, FilterType::NoFilter);
    encoder
        .write_image(rgba, width, height, ColorType::Rgba8.into())
        .with_context(|| format!("failed to encode {}", path.display()))?;
    tracing::info!(path = %path.display(), width, height, "Wrote PNG");
    Ok(())
}
