//! CLI command definitions and handlers.

pub mod assign;
pub mod classify;
pub mod explore;
pub mod generate;
pub mod luminance;
pub mod plate;
pub mod simulate;

use clap::{Parser, Subcommand};

/// Dichromat - color-vision screening plates and analysis
#[derive(Parser)]
#[command(name = "dichromat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Render one session plate
    Plate(plate::PlateArgs),
    /// Render all ten plates of a session
    Session(plate::SessionArgs),
    /// Render a parameter-explorer image
    Explore(explore::ExploreArgs),
    /// List explorer presets
    Presets,
    /// Compute relative luminance of colors
    Luminance(luminance::LuminanceArgs),
    /// Simulate a dichromacy on a color or an image file
    Simulate(simulate::SimulateArgs),
    /// Pre-generate a plate catalog
    Generate(generate::GenerateArgs),
    /// Map a session onto catalog plates
    Assign(assign::AssignArgs),
    /// Classify a set of answers
    Classify(classify::ClassifyArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed; nothing flagged.
    Success = 0,
    /// Command completed; the result is flagged (deficiency, unreliable
    /// answers, or an integrity mismatch).
    Flagged = 1,
    /// Command failed.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

/// Current UTC time as RFC 3339.
pub fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            tracing::debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
