use super::PlacedSet;
use crate::core::models::pattern::Pattern;
use crate::core::models::placement::Placement;
use crate::core::shapes::Volume;
use crate::engine::config::Target;
use crate::engine::context::FillContext;
use crate::engine::orientation::OrientationRandomizer;
use crate::engine::progress::{Progress, StrideCounter};
use nalgebra::{Point3, Vector3};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RandomFillResult {
    pub placement: Placement,
    pub attempts_used: usize,
}

/// Rejection-samples anchor points uniformly in the shape's bounding box.
///
/// Every draw consumes one attempt whether or not it is accepted. The run ends when
/// the target is reached or `max_attempts` draws have been made; a shortfall is a
/// partial result, not an error.
#[instrument(skip_all, name = "random_fill_task")]
pub fn run(
    context: &FillContext,
    target: Target,
    max_attempts: usize,
    rng: &mut StdRng,
    mut orientation: Option<&mut OrientationRandomizer>,
) -> RandomFillResult {
    let (min, max) = context.shape.bounds();
    let span = max - min;
    info!(target = %target, max_attempts, "Starting random fill.");
    context.reporter.report(Progress::TaskStart {
        total_steps: max_attempts as u64,
        target: target.limit(),
    });

    let mut placed = PlacedSet::new(context);
    let mut counter = StrideCounter::new(context.reporter);
    let mut attempts_used = 0;

    while attempts_used < max_attempts && !target.is_reached(placed.len()) {
        attempts_used += 1;

        let fraction = Vector3::new(
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
        );
        let anchor: Point3<f64> = min + span.component_mul(&fraction);
        let copy = context.pattern.placed_at(&anchor);
        let candidate = match (context.pattern, orientation.as_deref_mut()) {
            (Pattern::RigidGroup(_), Some(randomizer)) => randomizer.randomize(&copy),
            _ => copy,
        };
        placed.try_accept(candidate);
        counter.tick(placed.len());
    }
    counter.flush();
    context.reporter.report(Progress::TaskFinish);

    let count = placed.len();
    if attempts_used == max_attempts && !target.is_reached(count) {
        match target {
            Target::Exact(n) => {
                warn!(
                    placed = count,
                    target = n,
                    attempts_used,
                    "Attempt budget exhausted before the target count was reached."
                );
                context.reporter.report(Progress::Message(format!(
                    "Attempt budget of {} exhausted after placing {} of {} copies.",
                    max_attempts, count, n
                )));
            }
            Target::Unbounded => info!(placed = count, attempts_used, "Attempt budget spent."),
        }
    } else {
        info!(placed = count, attempts_used, "Random fill complete.");
    }

    RandomFillResult {
        placement: placed.into_placement(),
        attempts_used,
    }
}
