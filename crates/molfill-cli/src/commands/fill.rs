use crate::cli::FillArgs;
use crate::config::{FillSettings, PartialFillConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use molfill::{
    core::io::{traits::StructureFile, xyz::XyzFile},
    core::models::placement::Placement,
    core::tables::{ElementTable, Tables},
    engine::progress::ProgressReporter,
    engine::tasks::density::density_of,
    workflows::{self, fill::FillOutcome},
};
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: FillArgs) -> Result<()> {
    let partial_config = PartialFillConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let mut settings = partial_config.merge_with_cli(&args)?;

    let tables = load_tables(&settings)?;

    info!("Loading pattern from {:?}", &args.input);
    let records = XyzFile::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
        path: args.input.clone(),
        source: e.into(),
    })?;
    if let Some(path) = &settings.base_path {
        info!("Loading base structure from {:?}", path);
        let base = XyzFile::read_from_path(path).map_err(|e| CliError::FileParsing {
            path: path.clone(),
            source: e.into(),
        })?;
        settings.fill.base = Some(base);
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting fill...");
    info!("Invoking the core fill workflow...");
    let outcome = workflows::fill::run(&records, &settings.fill, &tables, &reporter)?;
    progress_handler.clear();
    for notice in progress_handler.notices() {
        println!("! {}", notice);
    }

    if outcome.placement.is_error() {
        let message = match &outcome.placement {
            Placement::NoAtoms { message } => message.clone(),
            _ => String::new(),
        };
        return Err(CliError::NothingPlaced {
            kind: outcome.placement.kind(),
            message,
        });
    }

    let achieved = density_of(
        outcome.shape_volume,
        outcome.base.iter().chain(outcome.placement.atoms()),
        &tables.masses,
    );
    let summary = summary_line(&outcome, achieved);
    if matches!(outcome.target.limit(), Some(n) if outcome.placement.len() < n) {
        warn!("Placed fewer copies than requested.");
    }

    let comment = format!("molfill {} placement; {}", outcome.mode, summary);
    let mut atoms = outcome.base;
    atoms.extend(outcome.placement.into_atoms());
    XyzFile::write_to_path(&atoms, &comment, &args.output).map_err(|e| CliError::FileParsing {
        path: args.output.clone(),
        source: e.into(),
    })?;

    println!("✓ {}", summary);
    println!("  {} atom(s) written to: {}", atoms.len(), args.output.display());
    Ok(())
}

fn load_tables(settings: &FillSettings) -> Result<Tables> {
    let mut tables = Tables::default();
    if let Some(path) = &settings.radii_path {
        tables.radii.merge(load_table(path)?);
    }
    if let Some(path) = &settings.masses_path {
        tables.masses.merge(load_table(path)?);
    }
    Ok(tables)
}

fn load_table(path: &Path) -> Result<ElementTable> {
    info!("Loading lookup table from {:?}", path);
    ElementTable::load(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn summary_line(outcome: &FillOutcome, achieved_density: f64) -> String {
    let mut line = format!(
        "Placed {} {}(s) of target {} using {} fill",
        outcome.placement.len(),
        outcome.placement.kind(),
        outcome.target,
        outcome.mode
    );
    if let Some(attempts) = outcome.attempts_used {
        line.push_str(&format!(", {} attempt(s)", attempts));
    }
    if !outcome.base.is_empty() {
        line.push_str(&format!(" around a {}-atom base", outcome.base.len()));
    }
    if let Some(seed) = outcome.seed {
        line.push_str(&format!(", seed {}", seed));
    }
    line.push_str(&format!(", density {:.4} g/mL", achieved_density));
    line
}
