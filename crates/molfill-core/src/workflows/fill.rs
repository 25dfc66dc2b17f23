use crate::core::models::atom::AtomRecord;
use crate::core::models::pattern::Pattern;
use crate::core::models::placement::Placement;
use crate::core::shapes::Volume;
use crate::core::tables::Tables;
use crate::core::utils::geometry::recentered;
use crate::engine::config::{FillConfig, Target};
use crate::engine::context::FillContext;
use crate::engine::error::EngineError;
use crate::engine::orientation::OrientationRandomizer;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::{density, grid_fill, random_fill, unit_cell};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use tracing::{debug, info, instrument};

/// Mixed into the run seed so anchor draws and rotations use independent streams.
const ORIENTATION_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    UnitCell,
    Density,
    Random,
    Grid,
}

impl FillMode {
    /// Picks the single mode a configuration runs in: unit cell, then density, then
    /// random or grid fill.
    pub fn select(config: &FillConfig) -> Self {
        if config.unit_cell.is_some() {
            FillMode::UnitCell
        } else if config.density.is_some() {
            FillMode::Density
        } else if config.rand_fill {
            FillMode::Random
        } else {
            FillMode::Grid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FillMode::UnitCell => "unit-cell",
            FillMode::Density => "density",
            FillMode::Random => "random",
            FillMode::Grid => "grid",
        }
    }
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillOutcome {
    pub placement: Placement,
    /// The base structure as placed at the shape center, empty when none was configured.
    pub base: Vec<AtomRecord>,
    pub mode: FillMode,
    /// The count the filler aimed for; in density mode this is the derived count.
    pub target: Target,
    /// Draws consumed by the random filler, `None` for deterministic modes.
    pub attempts_used: Option<usize>,
    pub shape_volume: f64,
    /// The seed actually used, if the run involved randomness.
    pub seed: Option<u64>,
}

#[instrument(skip_all, name = "fill_workflow")]
pub fn run(
    records: &[AtomRecord],
    config: &FillConfig,
    tables: &Tables,
    reporter: &ProgressReporter,
) -> Result<FillOutcome, EngineError> {
    // === Phase 0: Validation and setup ===
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    config.validate()?;
    let shape = config.shape.build()?;
    let shape_volume = shape.volume();
    let mode = FillMode::select(config);
    info!(
        shape = shape.name(),
        volume = shape_volume,
        mode = %mode,
        "Building fill run."
    );

    let Some(pattern) = Pattern::from_records(records) else {
        reporter.report(Progress::PhaseFinish);
        info!("Input pattern is empty; nothing to place.");
        return Ok(FillOutcome {
            placement: Placement::no_atoms(),
            base: Vec::new(),
            mode,
            target: config.target,
            attempts_used: None,
            shape_volume,
            seed: None,
        });
    };

    let base = config
        .base
        .as_deref()
        .map(|records| recentered(records, &shape.center()))
        .unwrap_or_default();
    let base_types = base.iter().map(|atom| atom.atom_type.as_str());
    if let Some(atom_type) = tables
        .radii
        .first_missing(pattern.atom_types().chain(base_types))
    {
        return Err(EngineError::UnknownAtomType {
            table: "radius",
            atom_type: atom_type.to_string(),
        });
    }
    if mode == FillMode::Density {
        if let Some(atom_type) = tables.masses.first_missing(pattern.atom_types()) {
            return Err(EngineError::UnknownAtomType {
                table: "mass",
                atom_type: atom_type.to_string(),
            });
        }
    }

    let (lower, _) = shape.bounds();
    debug!(
        kind = %pattern.kind(),
        atoms = pattern.len(),
        lower = ?lower,
        "Placements are laid out from the lower bounding corner."
    );
    if !base.is_empty() {
        let center = shape.center();
        info!(atoms = base.len(), center = ?center, "Base structure seeded at shape center.");
        reporter.report(Progress::Message(format!(
            "Base structure of {} atoms placed at the shape center.",
            base.len()
        )));
    }
    let context = FillContext::new(&shape, &pattern, &tables.radii, config.tol, reporter)
        .with_base(&base);

    let target = match (mode, config.density) {
        (FillMode::Density, Some(rho)) => {
            let count =
                density::molecule_count_for_density(&shape, &pattern, &tables.masses, rho);
            reporter.report(Progress::Message(format!(
                "Density {} g/mL sized the run to {} copies.",
                rho, count
            )));
            Target::Exact(count)
        }
        _ => config.target,
    };
    let needs_rng = mode != FillMode::UnitCell && (config.rand_fill || config.randomize_orientation);
    let seed = needs_rng.then(|| resolve_seed(config.seed));
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Placement ===
    reporter.report(Progress::PhaseStart { name: "Placement" });
    let mut randomizer = match seed {
        Some(seed) if config.randomize_orientation => {
            Some(OrientationRandomizer::new(seed ^ ORIENTATION_SEED_SALT))
        }
        _ => None,
    };

    let (placement, attempts_used) = match mode {
        FillMode::UnitCell => {
            let cell = config
                .unit_cell
                .as_ref()
                .ok_or_else(|| EngineError::Internal("unit-cell mode without a cell".into()))?;
            if config.randomize_orientation {
                debug!("Orientation randomization does not apply to unit-cell replication.");
            }
            (unit_cell::run(&context, cell, target), None)
        }
        FillMode::Density | FillMode::Random | FillMode::Grid if config.rand_fill => {
            let mut rng = StdRng::seed_from_u64(seed.unwrap_or_default());
            let result = random_fill::run(
                &context,
                target,
                config.max_attempts,
                &mut rng,
                randomizer.as_mut(),
            );
            (result.placement, Some(result.attempts_used))
        }
        FillMode::Density | FillMode::Random | FillMode::Grid => (
            grid_fill::run(&context, config.spacing(), target, randomizer.as_mut()),
            None,
        ),
    };
    reporter.report(Progress::PhaseFinish);

    info!(
        kind = placement.kind(),
        placed = placement.len(),
        atoms = placement.atom_count(),
        base_atoms = base.len(),
        target = %target,
        "Fill workflow complete."
    );
    Ok(FillOutcome {
        placement,
        base,
        mode,
        target,
        attempts_used,
        shape_volume,
        seed,
    })
}

fn resolve_seed(configured: Option<u64>) -> u64 {
    match configured {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            info!(seed, "No seed configured; drew one from OS entropy.");
            seed
        }
    }
}
