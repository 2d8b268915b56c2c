//! Simulate command - show how colors or images appear to a dichromat.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use dichromat_adapters::{load_rgb, save_png};
use dichromat_core::{simulate_color, simulate_image, Color, Dichromacy};
use serde::Serialize;
use tracing::info;

use crate::output::JsonOutput;

/// Arguments for `dichromat simulate`.
#[derive(Args, Clone, Debug)]
pub struct SimulateArgs {
    /// Image to read
    #[arg(required_unless_present = "color")]
    pub input: Option<PathBuf>,

    /// PNG to write
    #[arg(required_unless_present = "color")]
    pub output: Option<PathBuf>,

    /// Dichromacy to simulate
    #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "deuteranopia")]
    pub dichromacy: Dichromacy,

    /// Simulate a single color instead of an image
    #[arg(long, value_name = "COLOR", conflicts_with_all = ["input", "output"])]
    pub color: Option<Color>,
}

#[derive(Debug, Serialize)]
struct ColorResult {
    dichromacy: Dichromacy,
    input: Color,
    simulated: Color,
    hex: String,
}

#[derive(Debug, Serialize)]
struct ImageResult<'a> {
    dichromacy: Dichromacy,
    input: &'a Path,
    output: &'a Path,
    width: u32,
    height: u32,
}

/// Run `dichromat simulate`.
pub fn run(args: &SimulateArgs, out: &JsonOutput) -> Result<()> {
    if let Some(color) = args.color {
        let simulated = simulate_color(color, args.dichromacy);
        return out.write(&ColorResult {
            dichromacy: args.dichromacy,
            input: color,
            simulated,
            hex: simulated.to_hex(),
        });
    }

    let (Some(input), Some(output)) = (&args.input, &args.output) else {
        bail!("simulate needs INPUT and OUTPUT, or --color");
    };

    let image = load_rgb(input)?;
    let simulated = simulate_image(&image, args.dichromacy);
    save_png(output, &simulated)?;
    info!("Simulated {} -> {}", input.display(), output.display());

    out.write(&ImageResult {
        dichromacy: args.dichromacy,
        input,
        output,
        width: simulated.width(),
        height: simulated.height(),
    })
}
