//! Conversion between a physical density and a molecule count.

use crate::core::models::atom::AtomRecord;
use crate::core::models::pattern::Pattern;
use crate::core::shapes::Volume;
use crate::core::tables::MassTable;
use tracing::debug;

/// `1 g/mL` expressed in `amu/Å³`: `1e-24 mL/Å³ * N_A`.
pub const G_PER_ML_TO_AMU_PER_A3: f64 = 0.602214076;

/// Summed mass of `atoms` in amu; types absent from the table contribute nothing.
pub fn mass_of(atoms: &[AtomRecord], masses: &MassTable) -> f64 {
    atoms
        .iter()
        .filter_map(|atom| masses.get(&atom.atom_type))
        .sum()
}

/// Estimates how many pattern copies reach `density` (g/mL) in `shape`.
///
/// This is a coarse heuristic, not a mass balance: starting from one copy, the running
/// mass is doubled and the count incremented by one until the mass reaches the target,
/// so the count grows logarithmically with the target mass.
///
/// The target mass is `density * volume` converted to amu with
/// [`G_PER_ML_TO_AMU_PER_A3`], so `density` is a real g/mL value. Tools that multiply
/// volume and density directly with no unit factor will arrive at a different count for
/// the same inputs.
pub fn molecule_count_for_density(
    shape: &impl Volume,
    pattern: &Pattern,
    masses: &MassTable,
    density: f64,
) -> usize {
    let target_mass = density * shape.volume() * G_PER_ML_TO_AMU_PER_A3;
    let mut mass = mass_of(pattern.atoms(), masses);
    let mut count = 1;

    if mass > 0.0 {
        while mass < target_mass {
            mass *= 2.0;
            count += 1;
        }
    }

    debug!(density, target_mass, count, "Sized placement from density.");
    count
}

/// Achieved density in g/mL of `atoms` spread over `volume` cubic Angstroms.
pub fn density_of<'a>(
    volume: f64,
    atoms: impl IntoIterator<Item = &'a AtomRecord>,
    masses: &MassTable,
) -> f64 {
    if volume <= 0.0 {
        return 0.0;
    }
    let total: f64 = atoms
        .into_iter()
        .filter_map(|atom| masses.get(&atom.atom_type))
        .sum();
    total / (volume * G_PER_ML_TO_AMU_PER_A3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::placement::Placement;
    use crate::core::shapes::{Cuboid, Shape};
    use nalgebra::Point3;

    fn argon() -> Pattern {
        Pattern::from_records(&[AtomRecord::new("Ar", Point3::origin())]).unwrap()
    }

    fn unit_box(edge: f64) -> Shape {
        Shape::Box(Cuboid::at_origin(edge, edge, edge).unwrap())
    }

    #[test]
    fn count_follows_doubling_rule() {
        let masses = MassTable::from_pairs([("Ar", 40.0)]);
        // 10^3 Å^3 at 1 g/mL is about 602 amu: 40, 80, 160, 320, 640 gives five steps.
        let count = molecule_count_for_density(&unit_box(10.0), &argon(), &masses, 1.0);
        assert_eq!(count, 5);
    }

    #[test]
    fn tiny_density_still_places_one_copy() {
        let masses = MassTable::from_pairs([("Ar", 40.0)]);
        let count = molecule_count_for_density(&unit_box(10.0), &argon(), &masses, 1e-6);
        assert_eq!(count, 1);
    }

    #[test]
    fn count_is_non_decreasing_in_density() {
        let masses = MassTable::from_pairs([("Ar", 39.948)]);
        let shape = unit_box(25.0);
        let mut previous = 0;
        for step in 1..200 {
            let density = step as f64 * 0.05;
            let count = molecule_count_for_density(&shape, &argon(), &masses, density);
            assert!(count >= previous, "Count dropped at density {}", density);
            previous = count;
        }
    }

    #[test]
    fn massless_pattern_yields_single_copy() {
        let masses = MassTable::new();
        assert_eq!(
            molecule_count_for_density(&unit_box(10.0), &argon(), &masses, 1.0),
            1
        );
    }

    #[test]
    fn density_of_reports_g_per_ml() {
        let masses = MassTable::from_pairs([("Ar", 40.0)]);
        let shape = unit_box(10.0);
        let placement = Placement::Atoms(vec![
            AtomRecord::new("Ar", Point3::new(1.0, 1.0, 1.0)),
            AtomRecord::new("Ar", Point3::new(5.0, 5.0, 5.0)),
        ]);

        let density = density_of(shape.volume(), placement.atoms(), &masses);
        let expected = 80.0 / (1000.0 * G_PER_ML_TO_AMU_PER_A3);
        assert!((density - expected).abs() < 1e-12);
        assert_eq!(density_of(shape.volume(), Placement::no_atoms().atoms(), &masses), 0.0);
        assert_eq!(density_of(0.0, placement.atoms(), &masses), 0.0);
    }
}
