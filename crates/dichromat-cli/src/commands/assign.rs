//! Assign command - map a session onto pre-generated catalog plates.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use dichromat_adapters::{FsCatalogSource, SharedCatalog};
use dichromat_core::{
    map_session_to_catalog, CatalogSource, CatalogStats, DeficiencyType, SessionAssignment,
};
use serde::Serialize;
use tracing::{info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::JsonOutput;

/// Arguments for `dichromat assign`.
#[derive(Args, Clone, Debug)]
pub struct AssignArgs {
    /// Session identifier
    pub session: String,

    /// Catalog directory or metadata file (overrides config)
    #[arg(short, long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Check each assigned plate's SHA-256 against the catalog
    #[arg(long)]
    pub verify: bool,

    /// Include catalog statistics in the output
    #[arg(long)]
    pub stats: bool,
}

#[derive(Debug, Serialize)]
struct AssignedPlate<'a> {
    image_number: u8,
    id: u32,
    filename: &'a str,
    dichromism_type: DeficiencyType,
    correct_answer: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    verified: Option<bool>,
}

#[derive(Debug, Serialize)]
struct AssignOutput<'a> {
    session_id: &'a str,
    assignment: &'a SessionAssignment,
    plates: Vec<AssignedPlate<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<CatalogStats>,
}

/// Run `dichromat assign`.
pub fn run(args: &AssignArgs, config: &AppConfig, out: &JsonOutput) -> Result<ExitCode> {
    let path = args
        .catalog
        .clone()
        .or_else(|| config.catalog.path.clone())
        .ok_or_else(|| anyhow!("no catalog given; pass --catalog or set [catalog] path"))?;

    let shared = SharedCatalog::new(FsCatalogSource::new(path));
    let catalog = shared.get()?;
    let assignment = map_session_to_catalog(&args.session, &catalog)?;

    let mut mismatches = 0;
    let mut plates = Vec::with_capacity(assignment.ids().len());
    for (index, id) in assignment.iter() {
        let entry = catalog
            .entry(id)
            .ok_or_else(|| anyhow!("catalog has no entry {id}"))?;

        let verified = if args.verify {
            let bytes = shared.source().read_plate(entry)?;
            let ok = catalog.verify_integrity(id, &bytes);
            if !ok {
                warn!("Integrity mismatch for {}", entry.filename);
                mismatches += 1;
            }
            Some(ok)
        } else {
            None
        };

        plates.push(AssignedPlate {
            image_number: index.get(),
            id,
            filename: &entry.filename,
            dichromism_type: entry.deficiency_type,
            correct_answer: entry.correct_answer,
            verified,
        });
    }
    info!("Assigned session {} to {} plates", args.session, plates.len());

    out.write(&AssignOutput {
        session_id: &args.session,
        assignment: &assignment,
        plates,
        stats: args.stats.then(|| catalog.statistics()),
    })?;

    Ok(if mismatches > 0 {
        ExitCode::Flagged
    } else {
        ExitCode::Success
    })
}
