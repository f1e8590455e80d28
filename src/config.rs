//! Preview settings loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blockshade_core::{AlphaPolicy, LightFormat};
use blockshade_render::Camera;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Where the preview looks for its settings when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/preview.toml";

/// Which implementation of the stages renders the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// CPU rasterizer running the reference stages.
    #[default]
    Software,
    /// wgpu pipelines running the WGSL stages.
    Gpu,
}

/// Everything the preview needs to render one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub width: u32,
    pub height: u32,
    pub backend: Backend,
    /// Request a software adapter when rendering on the GPU backend.
    pub force_fallback_adapter: bool,
    pub output: PathBuf,
    /// Quantization the demo scene's light payload is produced in.
    pub light_format: LightFormat,
    /// Alpha handling of the lit cube pass.
    pub alpha_policy: AlphaPolicy,
    /// Voxel drawn with the selection highlight, if any.
    pub selection: Option<[i32; 3]>,
    /// Linear RGBA clear color.
    pub clear_color: [f32; 4],
    /// Image files used as texture-array layers. Empty means procedural debug layers.
    pub texture_layers: Vec<PathBuf>,
    /// Text drawn in the top-left corner.
    pub label: String,
    pub camera: Camera,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            backend: Backend::default(),
            force_fallback_adapter: false,
            output: PathBuf::from("preview.png"),
            light_format: LightFormat::CANONICAL,
            alpha_policy: AlphaPolicy::CutoutOpaque,
            selection: Some([2, 1, 2]),
            clear_color: [0.45, 0.62, 0.85, 1.0],
            texture_layers: Vec::new(),
            label: "BLOCKSHADE".to_string(),
            camera: Camera::looking_at(Vec3::new(7.5, 6.0, 9.0), Vec3::new(2.0, 0.5, 2.0)),
        }
    }
}

impl PreviewConfig {
    /// Load settings from `path`, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<PreviewConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    PreviewConfig::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!("Preview config not found at {}. Using defaults", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                PreviewConfig::default()
            }
        }
    }

    /// Write settings to `path`, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Width over height of the output image.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}_{timestamp}"))
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: PreviewConfig = toml::from_str(
            r#"
            width = 128
            backend = "gpu"
            light_format = "nibble"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.width, 128);
        assert_eq!(cfg.height, PreviewConfig::default().height);
        assert_eq!(cfg.backend, Backend::Gpu);
        assert_eq!(cfg.light_format, LightFormat::Nibble);
        assert_eq!(cfg.alpha_policy, AlphaPolicy::CutoutOpaque);
    }

    #[test]
    fn camera_table_is_partial() {
        let cfg: PreviewConfig = toml::from_str(
            r#"
            [camera]
            position = [1.0, 2.0, 3.0]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.camera.position, [1.0, 2.0, 3.0]);
        assert_eq!(cfg.camera.near, Camera::default().near);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = temp_dir("blockshade_config_bad");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("preview.toml");
        fs::write(&path, "width = \"wide\"").unwrap();

        assert_eq!(PreviewConfig::load_from_path(&path), PreviewConfig::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = temp_dir("blockshade_config_missing").join("preview.toml");
        assert_eq!(PreviewConfig::load_from_path(&path), PreviewConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = temp_dir("blockshade_config_save");
        let path = dir.join("nested").join("preview.toml");
        let cfg = PreviewConfig {
            width: 320,
            backend: Backend::Gpu,
            selection: Some([0, 0, 0]),
            alpha_policy: AlphaPolicy::CutoutPassthrough,
            texture_layers: vec![PathBuf::from("stone.png")],
            ..PreviewConfig::default()
        };
        cfg.save_to_path(&path).unwrap();

        assert_eq!(PreviewConfig::load_from_path(&path), cfg);
        let _ = fs::remove_dir_all(&dir);
    }
}
