//! Plate and session commands - render screening plates for a session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use dichromat_core::domain::sha256_hex;
use dichromat_core::plate::DEFAULT_SALT;
use dichromat_core::{DeficiencyType, ImageIndex, PlateRenderer, PlateSpec};
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::output::JsonOutput;

/// Rendering options shared by `plate` and `session`.
#[derive(Args, Clone, Debug, Default)]
pub struct RenderArgs {
    /// Seed salt
    #[arg(long, env = "DICHROMAT_SALT")]
    pub salt: Option<String>,

    /// Canvas edge length in pixels
    #[arg(long, value_name = "PX")]
    pub size: Option<u32>,
}

impl RenderArgs {
    /// Fill unset options from the config file. CLI (and env) wins.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        if self.salt.is_none() {
            self.salt.clone_from(&config.plate.salt);
        }
        self.size = self.size.or(config.plate.image_size);
        self
    }

    /// Builds a renderer, falling back to built-in defaults.
    pub fn renderer(&self) -> Result<PlateRenderer> {
        let mut config =
            dichromat_core::PlateConfig::with_salt(self.salt.as_deref().unwrap_or(DEFAULT_SALT));
        if let Some(size) = self.size {
            config.image_size = size;
        }
        Ok(PlateRenderer::new(config)?)
    }
}

/// Arguments for `dichromat plate`.
#[derive(Args, Clone, Debug)]
pub struct PlateArgs {
    /// Session identifier
    pub session: String,

    /// Plate index (1-10)
    pub index: u32,

    /// PNG file to write (default: plate_NN.png)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Override the hidden number (0-99)
    #[arg(long)]
    pub answer: Option<u8>,

    /// Override the plate type
    #[arg(long, value_name = "TYPE")]
    pub deficiency: Option<DeficiencyType>,

    /// Print the plate configuration without rendering
    #[arg(long)]
    pub config_only: bool,

    #[command(flatten)]
    pub render: RenderArgs,
}

/// Arguments for `dichromat session`.
#[derive(Args, Clone, Debug)]
pub struct SessionArgs {
    /// Session identifier
    pub session: String,

    /// Directory to write plate_01.png .. plate_10.png into
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub render: RenderArgs,
}

/// One rendered (or configured) plate, as printed.
#[derive(Debug, Serialize)]
struct PlateReport {
    image_number: u32,
    #[serde(flatten)]
    spec: PlateSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
}

impl PlateReport {
    fn config_only(index: u32, spec: PlateSpec) -> Self {
        Self {
            image_number: index,
            spec,
            path: None,
            bytes: None,
            sha256: None,
        }
    }

    fn written(index: u32, spec: PlateSpec, path: &Path, png: &[u8]) -> Self {
        Self {
            image_number: index,
            spec,
            path: Some(path.to_path_buf()),
            bytes: Some(png.len()),
            sha256: Some(sha256_hex(png)),
        }
    }
}

#[derive(Debug, Serialize)]
struct PlateOutput<'a> {
    session_id: &'a str,
    #[serde(flatten)]
    plate: PlateReport,
}

#[derive(Debug, Serialize)]
struct SessionOutput<'a> {
    session_id: &'a str,
    plates: Vec<PlateReport>,
}

fn plate_filename(index: ImageIndex) -> String {
    format!("plate_{:02}.png", index.get())
}

fn write_png(path: &Path, png: &[u8]) -> Result<()> {
    std::fs::write(path, png).with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote {} ({} bytes)", path.display(), png.len());
    Ok(())
}

/// Run `dichromat plate`.
pub fn run(args: &PlateArgs, config: &AppConfig, out: &JsonOutput) -> Result<()> {
    let renderer = args.render.clone().with_config(config).renderer()?;
    let index = ImageIndex::new(args.index)?;

    let mut spec = renderer.test_config(&args.session, args.index)?;
    if let Some(deficiency_type) = args.deficiency {
        spec.deficiency_type = deficiency_type;
    }
    if let Some(answer) = args.answer {
        spec.correct_answer = answer;
    }

    let report = if args.config_only {
        PlateReport::config_only(args.index, spec)
    } else {
        let png = renderer.render(&args.session, args.index, spec)?;
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(plate_filename(index)));
        write_png(&path, &png)?;
        PlateReport::written(args.index, spec, &path, &png)
    };

    out.write(&PlateOutput {
        session_id: &args.session,
        plate: report,
    })
}

/// Run `dichromat session`.
pub fn run_session(args: &SessionArgs, config: &AppConfig, out: &JsonOutput) -> Result<()> {
    let renderer = args.render.clone().with_config(config).renderer()?;
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;

    let mut plates = Vec::with_capacity(usize::from(ImageIndex::MAX));
    for index in ImageIndex::all() {
        let number = u32::from(index.get());
        let (spec, png) = renderer.render_scheduled(&args.session, number)?;
        let path = args.output_dir.join(plate_filename(index));
        write_png(&path, &png)?;
        plates.push(PlateReport::written(number, spec, &path, &png));
    }

    out.write(&SessionOutput {
        session_id: &args.session,
        plates,
    })
}
