//! Explore and presets commands - tune plate parameters interactively.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use dichromat_core::colorimetry::match_luminance;
use dichromat_core::explorer::{self, Preset, PRESETS};
use dichromat_core::{Color, Dichromacy, ExplorerImage, ExplorerParams};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::output::JsonOutput;

/// Arguments for `dichromat explore`.
#[derive(Args, Clone, Debug, Default)]
pub struct ExploreArgs {
    /// Start from a named preset (see `dichromat presets`)
    #[arg(long)]
    pub preset: Option<String>,

    /// Ring color, "r,g,b" or "#rrggbb"
    #[arg(long, value_name = "COLOR")]
    pub fg: Option<Color>,

    /// Background color, "r,g,b" or "#rrggbb"
    #[arg(long, value_name = "COLOR")]
    pub bg: Option<Color>,

    /// Mean dot diameter (6-40)
    #[arg(long)]
    pub mean_size: Option<f64>,

    /// Relative dot size deviation (0-0.60)
    #[arg(long)]
    pub size_variance: Option<f64>,

    /// Mean grayscale noise (-0.08-0.08)
    #[arg(long, allow_hyphen_values = true)]
    pub noise_offset: Option<f64>,

    /// Grayscale noise deviation (0-0.25)
    #[arg(long)]
    pub noise_variance: Option<f64>,

    /// Pattern density (0.10-0.60)
    #[arg(long)]
    pub density: Option<f64>,

    /// Simulate a dichromacy on the result
    #[arg(long, value_name = "TYPE")]
    pub simulate: Option<Dichromacy>,

    /// Seed for a reproducible image
    #[arg(long)]
    pub seed: Option<u64>,

    /// Adjust the ring's green channel to match background luminance
    #[arg(long)]
    pub match_luminance: bool,

    /// Write the PNG here instead of embedding base64 in the output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ExploreArgs {
    /// Resolve parameters.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Built-in defaults
    /// 2. Config file `[explorer]` section
    /// 3. `--preset`
    /// 4. Individual flags
    pub fn params(&self, config: &AppConfig) -> Result<ExplorerParams> {
        let mut params = config.explorer.apply(ExplorerParams::default());

        if let Some(ref name) = self.preset {
            let Some(preset) = explorer::preset(name) else {
                let names: Vec<&str> = PRESETS.iter().map(|p| p.name).collect();
                bail!("unknown preset '{name}' (available: {})", names.join(", "));
            };
            debug!("Using preset {}", preset.name);
            params = ExplorerParams {
                simulate: params.simulate,
                ..preset.params
            };
        }

        params.fg = self.fg.unwrap_or(params.fg);
        params.bg = self.bg.unwrap_or(params.bg);
        params.circle_mean_size = self.mean_size.unwrap_or(params.circle_mean_size);
        params.circle_size_variance = self.size_variance.unwrap_or(params.circle_size_variance);
        params.noise_offset = self.noise_offset.unwrap_or(params.noise_offset);
        params.noise_variance = self.noise_variance.unwrap_or(params.noise_variance);
        params.pattern_density = self.density.unwrap_or(params.pattern_density);
        params.simulate = self.simulate.or(params.simulate);
        params.seed = self.seed;

        if self.match_luminance {
            let matched = match_luminance(params.fg, params.bg);
            debug!("Matched ring luminance: {} -> {}", params.fg, matched);
            params.fg = matched;
        }

        params.validate()?;
        Ok(params)
    }
}

/// Explorer result when the PNG was written to disk.
#[derive(Debug, Serialize)]
struct WrittenImage<'a> {
    path: &'a Path,
    bytes: usize,
    luminance_fg: f64,
    luminance_bg: f64,
    luminance_delta: f64,
    seed: u64,
    dots_placed: usize,
    target_dots: usize,
}

impl<'a> WrittenImage<'a> {
    fn new(path: &'a Path, image: &ExplorerImage) -> Self {
        Self {
            path,
            bytes: image.png.len(),
            luminance_fg: image.luminance_fg,
            luminance_bg: image.luminance_bg,
            luminance_delta: image.luminance_delta,
            seed: image.seed,
            dots_placed: image.dots_placed,
            target_dots: image.target_dots,
        }
    }
}

#[derive(Debug, Serialize)]
struct ExploreOutput<T: Serialize> {
    params: ExplorerParams,
    #[serde(flatten)]
    image: T,
}

/// Run `dichromat explore`.
pub fn run(args: &ExploreArgs, config: &AppConfig, out: &JsonOutput) -> Result<()> {
    let params = args.params(config)?;
    let image = explorer::generate(&params)?;
    info!(
        "Placed {}/{} dots (seed {})",
        image.dots_placed, image.target_dots, image.seed
    );

    // Report the seed actually used so the image can be reproduced.
    let params = ExplorerParams {
        seed: Some(image.seed),
        ..params
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &image.png)
                .with_context(|| format!("failed to write {}", path.display()))?;
            out.write(&ExploreOutput {
                params,
                image: WrittenImage::new(path, &image),
            })
        }
        None => out.write(&ExploreOutput { params, image }),
    }
}

#[derive(Debug, Serialize)]
struct PresetList<'a> {
    presets: &'a [Preset],
}

/// Run `dichromat presets`.
pub fn run_presets(out: &JsonOutput) -> Result<()> {
    out.write(&PresetList { presets: &PRESETS })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dichromat_core::colorimetry::luminance;

    #[test]
    fn test_defaults_without_flags() {
        let params = ExploreArgs::default().params(&AppConfig::default()).unwrap();
        assert_eq!(params, ExplorerParams::default());
    }

    #[test]
    fn test_preset_overrides_config_and_flags_override_preset() {
        let mut config = AppConfig::default();
        config.explorer.circle_mean_size = Some(30.0);
        config.explorer.pattern_density = Some(0.5);

        let args = ExploreArgs {
            preset: Some("high noise challenge".into()),
            density: Some(0.3),
            ..ExploreArgs::default()
        };
        let params = args.params(&config).unwrap();

        assert_eq!(params.circle_mean_size, 16.0);
        assert_eq!(params.noise_variance, 0.18);
        assert_eq!(params.pattern_density, 0.3);
    }

    #[test]
    fn test_unknown_preset_lists_names() {
        let args = ExploreArgs {
            preset: Some("nope".into()),
            ..ExploreArgs::default()
        };
        let err = args.params(&AppConfig::default()).unwrap_err().to_string();
        assert!(err.contains("Neutral Baseline"));
    }

    #[test]
    fn test_out_of_range_flag_rejected() {
        let args = ExploreArgs {
            mean_size: Some(80.0),
            ..ExploreArgs::default()
        };
        let err = args.params(&AppConfig::default()).unwrap_err().to_string();
        assert!(err.contains("circle_mean_size"));
    }

    #[test]
    fn test_match_luminance_moves_ring_toward_background() {
        let args = ExploreArgs {
            match_luminance: true,
            ..ExploreArgs::default()
        };
        let params = args.params(&AppConfig::default()).unwrap();
        let before = ExplorerParams::default();

        assert_eq!(params.fg.r, before.fg.r);
        assert_eq!(params.fg.b, before.fg.b);
        let delta = (luminance(params.fg) - luminance(params.bg)).abs();
        assert!(delta <= (luminance(before.fg) - luminance(before.bg)).abs());
    }
}
