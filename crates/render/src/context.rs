//! GPU device ownership and validation scopes.

use anyhow::{bail, Context, Result};

/// Color format every pipeline renders into.
///
/// Linear `Unorm` so stored values equal shader outputs, matching the
/// software framebuffer export.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Depth format of the cube passes.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Off-screen GPU rendering context.
pub struct RenderContext {
    /// Logical GPU device used for issuing commands.
    pub device: wgpu::Device,
    /// Command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Name of the adapter the device was created on.
    pub adapter_name: String,
}

impl RenderContext {
    /// Create a context without a surface.
    ///
    /// `force_fallback` asks for a software adapter, which is what CI
    /// machines without a GPU provide.
    pub async fn new_headless(force_fallback: bool) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: None,
                force_fallback_adapter: force_fallback,
            })
            .await
            .context("Failed to find suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("blockshade device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await
            .context("Failed to create GPU device")?;

        let info = adapter.get_info();
        tracing::info!(
            adapter = %info.name,
            backend = ?info.backend,
            "Headless GPU context initialized"
        );

        Ok(Self {
            device,
            queue,
            adapter_name: info.name,
        })
    }

    /// Run `create` inside a validation error scope, turning wgpu validation
    /// failures into errors instead of uncaptured-error panics.
    pub fn validated<T>(&self, what: &str, create: impl FnOnce(&wgpu::Device) -> T) -> Result<T> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create(&self.device);
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            bail!("{what} failed validation: {err}");
        }
        Ok(value)
    }
}
