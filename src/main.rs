//! blockshade - render a voxel preview frame to PNG
//!
//! Draws a small demo scene through the software rasterizer or the wgpu
//! pipelines and writes the result as an image.

mod config;
mod preview;
mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use blockshade_render::{load_texture_array, write_png, DataSource};
use clap::Parser;
use config::{Backend, PreviewConfig, DEFAULT_CONFIG_PATH};
use scene::Scene;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Voxel shading preview renderer", long_about = None)]
struct Args {
    /// Preview settings (TOML); missing or invalid files fall back to defaults
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Output PNG path, overriding the config
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rendering backend, overriding the config
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    /// Output width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Ask wgpu for a software adapter
    #[arg(long)]
    fallback_adapter: bool,

    /// Texture-array layer images, overriding the config
    #[arg(long = "layer")]
    layers: Vec<PathBuf>,

    /// Write the effective settings to this path before rendering
    #[arg(long)]
    save_config: Option<PathBuf>,
}

impl Args {
    fn apply(self, cfg: &mut PreviewConfig) -> Option<PathBuf> {
        if let Some(output) = self.output {
            cfg.output = output;
        }
        if let Some(backend) = self.backend {
            cfg.backend = backend;
        }
        if let Some(width) = self.width {
            cfg.width = width;
        }
        if let Some(height) = self.height {
            cfg.height = height;
        }
        if self.fallback_adapter {
            cfg.force_fallback_adapter = true;
        }
        if !self.layers.is_empty() {
            cfg.texture_layers = self.layers;
        }
        self.save_config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let mut cfg = PreviewConfig::load_from_path(&args.config);
    let save_config = args.apply(&mut cfg);
    anyhow::ensure!(
        cfg.width > 0 && cfg.height > 0,
        "output size must be non-zero, got {}x{}",
        cfg.width,
        cfg.height
    );

    if let Some(path) = save_config {
        cfg.save_to_path(&path)
            .with_context(|| format!("failed to save config to {}", path.display()))?;
        info!("Saved preview config to {}", path.display());
    }

    let textures = if cfg.texture_layers.is_empty() {
        scene::debug_layers()?
    } else {
        let sources: Vec<DataSource<'_>> = cfg
            .texture_layers
            .iter()
            .map(|path| DataSource::Path(path.as_path()))
            .collect();
        load_texture_array(&sources)?
    };

    let scene = Scene::build(&cfg, textures)?;
    info!(
        backend = ?cfg.backend,
        width = cfg.width,
        height = cfg.height,
        "Rendering preview"
    );
    let rgba = preview::render(&cfg, &scene)?;
    write_png(&cfg.output, (cfg.width, cfg.height), &rgba)?;
    Ok(())
}
