//! Configuration file support for dichromat.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/dichromat/config.toml` (lowest priority)
//! - Project-local: `.dichromat.toml` (searched up directory tree)
//! - CLI flags and `DICHROMAT_SALT` (highest priority, applied separately)

use std::path::{Path, PathBuf};

use dichromat_core::{Color, Dichromacy, ExplorerParams, PlateFormat};
use serde::Deserialize;
use tracing::{debug, info};

/// Project-local config file name.
const PROJECT_FILE: &str = ".dichromat.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Plate rendering settings.
    pub plate: PlateConfig,
    /// Catalog location.
    pub catalog: CatalogConfig,
    /// Parameter explorer defaults.
    pub explorer: ExplorerConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// Plate rendering configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PlateConfig {
    /// Seed salt.
    pub salt: Option<String>,
    /// Canvas edge length in pixels.
    pub image_size: Option<u32>,
    /// Batch output format: "png" or "jpeg".
    pub format: Option<String>,
    /// JPEG quality (1-100).
    pub jpeg_quality: Option<u8>,
}

/// Catalog configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog directory or metadata file.
    pub path: Option<PathBuf>,
}

/// Explorer configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Ring dot color.
    pub fg_rgb: Option<Color>,
    /// Background dot color.
    pub bg_rgb: Option<Color>,
    /// Mean dot diameter (6-40).
    pub circle_mean_size: Option<f64>,
    /// Relative dot size deviation (0-0.60).
    pub circle_size_variance: Option<f64>,
    /// Mean grayscale noise (-0.08-0.08).
    pub noise_offset: Option<f64>,
    /// Grayscale noise deviation (0-0.25).
    pub noise_variance: Option<f64>,
    /// Pattern density (0.10-0.60).
    pub pattern_density: Option<f64>,
    /// Dichromacy to simulate.
    pub simulate: Option<Dichromacy>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl ExplorerConfig {
    /// Overlays the configured values onto `base`.
    pub fn apply(&self, base: ExplorerParams) -> ExplorerParams {
        ExplorerParams {
            fg: self.fg_rgb.unwrap_or(base.fg),
            bg: self.bg_rgb.unwrap_or(base.bg),
            circle_mean_size: self.circle_mean_size.unwrap_or(base.circle_mean_size),
            circle_size_variance: self.circle_size_variance.unwrap_or(base.circle_size_variance),
            noise_offset: self.noise_offset.unwrap_or(base.noise_offset),
            noise_variance: self.noise_variance.unwrap_or(base.noise_variance),
            pattern_density: self.pattern_density.unwrap_or(base.pattern_density),
            simulate: self.simulate.or(base.simulate),
            seed: base.seed,
        }
    }
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/dichromat/config.toml`
    /// 2. Project-local: `.dichromat.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if let Some(size) = self.plate.image_size {
            let range = dichromat_core::plate::MIN_IMAGE_SIZE..=dichromat_core::plate::MAX_IMAGE_SIZE;
            if !range.contains(&size) {
                return Err(format!(
                    "plate.image_size must be {}-{}, got {size}",
                    range.start(),
                    range.end()
                ));
            }
        }
        if let Some(ref f) = self.plate.format {
            if f.parse::<PlateFormat>().is_err() {
                return Err(format!("plate.format must be 'png' or 'jpeg', got '{f}'"));
            }
        }
        if let Some(q) = self.plate.jpeg_quality {
            if !(1..=100).contains(&q) {
                return Err(format!("plate.jpeg_quality must be 1-100, got {q}"));
            }
        }

        self.explorer
            .apply(ExplorerParams::default())
            .validate()
            .map_err(|e| format!("explorer: {e}"))?;

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // Plate
        self.plate.salt = other.plate.salt.or_else(|| self.plate.salt.take());
        self.plate.image_size = other.plate.image_size.or(self.plate.image_size);
        self.plate.format = other.plate.format.or_else(|| self.plate.format.take());
        self.plate.jpeg_quality = other.plate.jpeg_quality.or(self.plate.jpeg_quality);

        // Catalog
        self.catalog.path = other.catalog.path.or_else(|| self.catalog.path.take());

        // Explorer
        let (e, o) = (&mut self.explorer, other.explorer);
        e.fg_rgb = o.fg_rgb.or(e.fg_rgb);
        e.bg_rgb = o.bg_rgb.or(e.bg_rgb);
        e.circle_mean_size = o.circle_mean_size.or(e.circle_mean_size);
        e.circle_size_variance = o.circle_size_variance.or(e.circle_size_variance);
        e.noise_offset = o.noise_offset.or(e.noise_offset);
        e.noise_variance = o.noise_variance.or(e.noise_variance);
        e.pattern_density = o.pattern_density.or(e.pattern_density);
        e.simulate = o.simulate.or(e.simulate);

        // Output
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dichromat").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.dichromat.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(PROJECT_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
