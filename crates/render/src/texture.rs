//! Texture-array loading and GPU upload.

use std::path::{Path, PathBuf};

use blockshade_core::{TexelFormat, Texture2d, TextureArray, TextureError};
use thiserror::Error;

/// Where the encoded bytes of one texture layer come from.
#[derive(Debug, Clone, Copy)]
pub enum DataSource<'a> {
    /// Encoded image bytes already in memory.
    Inline(&'a [u8]),
    /// Encoded image file on disk.
    Path(&'a Path),
}

/// Errors produced while loading texture layers.
#[derive(Debug, Error)]
pub enum TextureLoadError {
    /// Reading a layer file failed.
    #[error("failed to read texture layer {layer} from {path}")]
    Io {
        /// Index of the layer in the source list.
        layer: usize,
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A layer could not be decoded.
    #[error("failed to decode texture layer {layer}")]
    Decode {
        /// Index of the layer in the source list.
        layer: usize,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },
    /// Decoded layers do not form a valid array.
    #[error(transparent)]
    Layout(#[from] TextureError),
}

fn decode_layer(layer: usize, source: DataSource<'_>) -> Result<Texture2d, TextureLoadError> {
    let decoded = match source {
        DataSource::Inline(bytes) => image::load_from_memory(bytes),
        DataSource::Path(path) => {
            let bytes = std::fs::read(path).map_err(|source| TextureLoadError::Io {
                layer,
                path: path.to_path_buf(),
                source,
            })?;
            image::load_from_memory(&bytes)
        }
    }
    .map_err(|source| TextureLoadError::Decode { layer, source })?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Texture2d::new(width, height, TexelFormat::Rgba8, rgba.into_raw())?)
}

/// Decode every source into one RGBA8 layer of a texture array.
///
/// All layers must share the size of the first one.
pub fn load_texture_array(sources: &[DataSource<'_>]) -> Result<TextureArray, TextureLoadError> {
    let layers = sources
        .iter()
        .enumerate()
        .map(|(layer, &source)| decode_layer(layer, source))
        .collect::<Result<Vec<_>, _>>()?;
    let array = TextureArray::new(layers)?;
    let (width, height) = array.size();
    tracing::debug!(layers = array.layer_count(), width, height, "Loaded texture array");
    Ok(array)
}

fn wgpu_format(format: TexelFormat) -> wgpu::TextureFormat {
    match format {
        TexelFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        TexelFormat::R8 => wgpu::TextureFormat::R8Unorm,
    }
}

/// Write tightly packed rows into one layer, padding rows to the copy alignment.
fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, layer: u32, source: &Texture2d) {
    let (width, height) = (source.width(), source.height());
    let row_bytes = width as usize * source.format().channels();
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
    let padded_row_bytes = row_bytes.div_ceil(alignment) * alignment;

    let padded;
    let data = if padded_row_bytes == row_bytes {
        source.data()
    } else {
        let mut rows = vec![0u8; padded_row_bytes * height as usize];
        for (row, src) in source.data().chunks_exact(row_bytes).enumerate() {
            let dst_start = row * padded_row_bytes;
            rows[dst_start..dst_start + row_bytes].copy_from_slice(src);
        }
        padded = rows;
        &padded
    };

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(padded_row_bytes as u32),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

fn nearest_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Bind group layout of a sampled texture at binding 0 and its sampler at 1.
pub(crate) fn texture_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// A texture uploaded to the GPU with its view and sampler.
pub struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl GpuTexture {
    /// Upload every layer of `array` as a `texture_2d_array`.
    pub fn from_array(device: &wgpu::Device, queue: &wgpu::Queue, array: &TextureArray) -> Self {
        let (width, height) = array.size();
        let layers = array.layer_count();
        let format = array.layers()[0].format();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Block Texture Array"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu_format(format),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (index, layer) in array.layers().iter().enumerate() {
            write_layer(queue, &texture, index as u32, layer);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Block Texture Array View"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            array_layer_count: Some(layers),
            ..Default::default()
        });
        tracing::info!(width, height, layers, "Uploaded texture array");

        Self {
            _texture: texture,
            view,
            sampler: nearest_sampler(device, "Block Texture Sampler"),
        }
    }

    /// Upload a single 2D texture (RGBA8 image or R8 glyph coverage).
    pub fn from_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &Texture2d,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: source.width(),
                height: source.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu_format(source.format()),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_layer(queue, &texture, 0, source);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
            sampler: nearest_sampler(device, label),
        }
    }

    pub(crate) fn bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}
