//! Classify command - interpret a completed answer set.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use dichromat_core::{classify, AnswerRecord};
use serde::Deserialize;
use tracing::{debug, info};

use super::ExitCode;
use crate::output::JsonOutput;

/// Arguments for `dichromat classify`.
#[derive(Args, Clone, Debug)]
pub struct ClassifyArgs {
    /// JSON file of answer records, or "-" for stdin
    #[arg(default_value = "-")]
    pub input: PathBuf,
}

/// Accepted input shapes: a bare array or an object with an `answers` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnswerDocument {
    Records(Vec<AnswerRecord>),
    Wrapped { answers: Vec<AnswerRecord> },
}

impl AnswerDocument {
    fn into_records(self) -> Vec<AnswerRecord> {
        match self {
            Self::Records(records) | Self::Wrapped { answers: records } => records,
        }
    }
}

fn parse_answers(json: &str) -> Result<Vec<AnswerRecord>> {
    let doc: AnswerDocument = serde_json::from_str(json)
        .context("expected an array of answer records or {\"answers\": [...]}")?;
    Ok(doc.into_records())
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read answers from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))
    }
}

/// Run `dichromat classify`.
pub fn run(args: &ClassifyArgs, out: &JsonOutput) -> Result<ExitCode> {
    let records = parse_answers(&read_input(&args.input)?)?;
    debug!("Classifying {} answer records", records.len());

    let outcome = classify(&records);
    info!(
        "Outcome: {:?} (confidence {:?})",
        outcome.color_vision_status, outcome.confidence
    );
    out.write(&outcome)?;

    Ok(if outcome.is_flagged() {
        ExitCode::Flagged
    } else {
        ExitCode::Success
    })
}
