use crate::core::models::placement::{Placement, PlacementKind};
use crate::core::shapes::Volume;
use crate::engine::config::{Target, UnitCell};
use crate::engine::context::FillContext;
use crate::engine::progress::{Progress, StrideCounter};
use nalgebra::Vector3;
use std::ops::RangeInclusive;
use tracing::{info, instrument};

/// Replicates the pattern on the lattice spanned by `cell`, anchored at the shape's
/// left corner, keeping every copy whose atoms all lie inside the shape.
///
/// Copies are not tested against each other, since the cell is assumed to describe a
/// physically valid crystal. Copies that overlap the base structure are dropped.
#[instrument(skip_all, name = "unit_cell_task")]
pub fn run(context: &FillContext, cell: &UnitCell, target: Target) -> Placement {
    let origin = context.shape.left_corner();
    let [ri, rj, rk] = index_ranges(context.shape, cell);
    let total = [&ri, &rj, &rk]
        .iter()
        .map(|r| r.end().saturating_sub(*r.start()).saturating_add(1) as u64)
        .fold(1u64, u64::saturating_mul);
    info!(lattice_points = total, "Starting unit-cell replication.");
    context.reporter.report(Progress::TaskStart {
        total_steps: total,
        target: target.limit(),
    });

    let kind = context.pattern.kind();
    let base = (!context.base.is_empty()).then(|| context.detector());
    let mut copies = Vec::new();
    let mut counter = StrideCounter::new(context.reporter);

    'scan: for i in ri {
        for j in rj.clone() {
            for k in rk.clone() {
                if target.is_reached(copies.len()) {
                    break 'scan;
                }
                let point = origin + cell.lattice_point(i, j, k);
                let copy = context.pattern.placed_at(&point);
                let clears_base = base
                    .as_ref()
                    .is_none_or(|detector| !copy.iter().any(|atom| detector.overlaps_atom(atom)));
                if context.shape.contains_all(&copy) && clears_base {
                    copies.push(copy);
                }
                counter.tick(copies.len());
            }
        }
    }
    counter.flush();
    context.reporter.report(Progress::TaskFinish);
    info!(placed = copies.len(), "Unit-cell replication complete.");

    match kind {
        PlacementKind::Atom => Placement::Atoms(copies.into_iter().flatten().collect()),
        PlacementKind::Molecule => Placement::Molecules(copies),
    }
}

/// Lattice index ranges along a, b and c covering the shape's bounding box.
fn index_ranges(shape: &impl Volume, cell: &UnitCell) -> [RangeInclusive<i64>; 3] {
    let (min, max) = shape.bounds();
    let anchor = shape.left_corner();
    let mut lo = Vector3::repeat(f64::INFINITY);
    let mut hi = Vector3::repeat(f64::NEG_INFINITY);

    for corner in 0..8 {
        let pick = |axis: usize| {
            if corner & (1 << axis) == 0 {
                min[axis]
            } else {
                max[axis]
            }
        };
        let offset = Vector3::new(pick(0), pick(1), pick(2)) - anchor.coords;
        let frac = cell.fractional(&offset);
        lo = lo.inf(&frac);
        hi = hi.sup(&frac);
    }

    [0, 1, 2].map(|axis| (lo[axis].floor() as i64)..=(hi[axis].ceil() as i64))
}
