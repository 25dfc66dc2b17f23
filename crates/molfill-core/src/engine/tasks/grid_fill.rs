use super::PlacedSet;
use crate::core::models::atom::AtomRecord;
use crate::core::models::pattern::Pattern;
use crate::core::models::placement::Placement;
use crate::core::shapes::Volume;
use crate::core::utils::geometry::axis_steps;
use crate::engine::config::Target;
use crate::engine::context::FillContext;
use crate::engine::orientation::OrientationRandomizer;
use crate::engine::progress::{Progress, StrideCounter};
use nalgebra::{Point3, Vector3};
use tracing::{info, instrument, warn};

/// Scans a regular lattice over the shape bounds and keeps every copy that fits.
///
/// Lattice points run from the bounding-box minimum in steps of `spacing`, half-open
/// per axis, visited x outer, y middle, z inner. Without an orientation randomizer the
/// result depends only on the inputs.
#[instrument(skip_all, name = "grid_fill_task")]
pub fn run(
    context: &FillContext,
    spacing: f64,
    target: Target,
    mut orientation: Option<&mut OrientationRandomizer>,
) -> Placement {
    let (min, max) = context.shape.bounds();
    let steps = Vector3::from_fn(|axis, _| axis_steps(min[axis], max[axis], spacing));
    let total = steps.x.saturating_mul(steps.y).saturating_mul(steps.z);
    info!(
        spacing,
        target = %target,
        lattice_points = total,
        "Starting grid fill."
    );
    context.reporter.report(Progress::TaskStart {
        total_steps: total as u64,
        target: target.limit(),
    });

    let mut placed = PlacedSet::new(context);
    let mut counter = StrideCounter::new(context.reporter);

    'scan: for i in 0..steps.x {
        for j in 0..steps.y {
            for k in 0..steps.z {
                if target.is_reached(placed.len()) {
                    break 'scan;
                }
                let point = min + Vector3::new(i as f64, j as f64, k as f64) * spacing;
                placed.try_accept(candidate_at(context.pattern, &point, orientation.as_deref_mut()));
                counter.tick(placed.len());
            }
        }
    }
    counter.flush();
    context.reporter.report(Progress::TaskFinish);

    let count = placed.len();
    match target.limit() {
        Some(n) if count < n => {
            warn!(
                placed = count,
                target = n,
                "Lattice exhausted before the target count was reached."
            );
            context.reporter.report(Progress::Message(format!(
                "Lattice exhausted after placing {} of {} copies.",
                count, n
            )));
        }
        _ => info!(placed = count, "Grid fill complete."),
    }
    placed.into_placement()
}

fn candidate_at(
    pattern: &Pattern,
    point: &Point3<f64>,
    orientation: Option<&mut OrientationRandomizer>,
) -> Vec<AtomRecord> {
    match (pattern, orientation) {
        (Pattern::SingleAtom(_), _) | (Pattern::RigidGroup(_), None) => pattern.placed_at(point),
        (Pattern::RigidGroup(_), Some(randomizer)) => randomizer.randomize(&pattern.placed_at(point)),
    }
}
