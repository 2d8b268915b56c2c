//! Generate command - pre-render a catalog of plates.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use dichromat_adapters::FsPlateOutput;
use dichromat_core::batch::{generate_batch, BatchConfig, DEFAULT_BATCH_COUNT};
use dichromat_core::encode::DEFAULT_JPEG_QUALITY;
use dichromat_core::plate::DEFAULT_IMAGE_SIZE;
use dichromat_core::{CatalogStats, PlateFormat};
use serde::Serialize;
use tracing::info;

use super::iso_timestamp;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Arguments for `dichromat generate`.
#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    /// Directory to write plates and metadata.json into
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Number of plates
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    /// Plate file format
    #[arg(long, value_name = "png|jpeg")]
    pub format: Option<PlateFormat>,

    /// JPEG quality (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: Option<u8>,

    /// Batch seed (default: current Unix time)
    #[arg(long)]
    pub seed: Option<String>,

    /// Write the catalog here instead of DIR/metadata.json
    #[arg(long, value_name = "FILE")]
    pub metadata_file: Option<PathBuf>,

    /// Plate edge length in pixels
    #[arg(long, value_name = "PX")]
    pub size: Option<u32>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl GenerateArgs {
    /// Resolve the batch settings: CLI > config > built-in defaults.
    pub fn batch_config(&self, config: &AppConfig) -> Result<BatchConfig> {
        let format = match (self.format, config.plate.format.as_deref()) {
            (Some(f), _) => f,
            (None, Some(s)) => s
                .parse()
                .with_context(|| format!("invalid plate.format in config: {s}"))?,
            (None, None) => PlateFormat::default(),
        };
        let format = match format {
            PlateFormat::Png => {
                if self.jpeg_quality.is_some() {
                    bail!("--jpeg-quality only applies to --format jpeg");
                }
                PlateFormat::Png
            }
            PlateFormat::Jpeg { .. } => format.with_quality(
                self.jpeg_quality
                    .or(config.plate.jpeg_quality)
                    .unwrap_or(DEFAULT_JPEG_QUALITY),
            ),
        };

        let count = self.count.unwrap_or(DEFAULT_BATCH_COUNT);
        if count == 0 {
            bail!("--count must be at least 1");
        }

        Ok(BatchConfig {
            count,
            seed: self.seed.clone().unwrap_or_else(default_seed),
            format,
            image_size: self.size.or(config.plate.image_size).unwrap_or(DEFAULT_IMAGE_SIZE),
        })
    }
}

fn default_seed() -> String {
    time::OffsetDateTime::now_utc().unix_timestamp().to_string()
}

#[derive(Debug, Serialize)]
struct GenerateOutput<'a> {
    output_dir: &'a Path,
    metadata_file: &'a Path,
    seed: &'a str,
    format: String,
    #[serde(flatten)]
    stats: CatalogStats,
}

/// Run `dichromat generate`.
pub fn run(args: &GenerateArgs, config: &AppConfig, out: &JsonOutput) -> Result<()> {
    let batch = args.batch_config(config)?;

    let mut output = FsPlateOutput::new(&args.output_dir)?;
    if let Some(ref path) = args.metadata_file {
        output = output.with_metadata_path(path);
    }

    let progress = args.progress || config.output.progress.unwrap_or(false);
    let show_progress = !args.quiet && (progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(Some(u64::from(batch.count)), args.quiet, show_progress);

    info!(
        "Generating {} {} plates into {} (seed {})",
        batch.count,
        batch.format,
        output.dir().display(),
        batch.seed
    );
    let catalog = generate_batch(&batch, Some(iso_timestamp()), &output, &progress_bar)?;

    out.write(&GenerateOutput {
        output_dir: output.dir(),
        metadata_file: output.metadata_path(),
        seed: &batch.seed,
        format: batch.format.to_string(),
        stats: catalog.statistics(),
    })
}
