//! Luminance command - relative luminance and green-channel matching.

use anyhow::{bail, Result};
use clap::Args;
use dichromat_core::colorimetry::{luminance, match_luminance, LuminanceReport};
use dichromat_core::Color;
use serde::Serialize;

use crate::output::JsonOutput;

/// Arguments for `dichromat luminance`.
#[derive(Args, Clone, Debug)]
pub struct LuminanceArgs {
    /// Foreground color, "r,g,b" or "#rrggbb"
    pub fg: Color,

    /// Background color to compare against
    pub bg: Option<Color>,

    /// Solve the foreground green channel so both luminances match
    #[arg(long = "match")]
    pub match_bg: bool,
}

#[derive(Debug, Serialize)]
struct Single {
    rgb: Color,
    hex: String,
    luminance: f64,
}

#[derive(Debug, Serialize)]
struct Matched {
    #[serde(flatten)]
    before: LuminanceReport,
    matched_fg_rgb: Color,
    matched_luminance: f64,
}

/// Run `dichromat luminance`.
pub fn run(args: &LuminanceArgs, out: &JsonOutput) -> Result<()> {
    match (args.bg, args.match_bg) {
        (None, true) => bail!("--match needs a background color"),
        (None, false) => out.write(&Single {
            rgb: args.fg,
            hex: args.fg.to_hex(),
            luminance: luminance(args.fg),
        }),
        (Some(bg), false) => out.write(&LuminanceReport::new(args.fg, bg)),
        (Some(bg), true) => {
            let matched = match_luminance(args.fg, bg);
            out.write(&Matched {
                before: LuminanceReport::new(args.fg, bg),
                matched_fg_rgb: matched,
                matched_luminance: luminance(matched),
            })
        }
    }
}
