//! Pairwise minimum-separation test.
//!
//! Two atoms overlap when their centers are closer than the sum of their radii minus
//! the tolerance. [`is_overlap_atom`] and [`is_overlap_molecule`] are the reference
//! all-pairs scans; [`OverlapDetector`] answers the same questions through a
//! [`SpatialIndex`] and is what the fillers use.

use super::spatial_index::SpatialIndex;
use crate::core::models::atom::AtomRecord;
use crate::core::tables::RadiusTable;

/// Radius of `atom`; types absent from the table count as zero.
#[inline]
fn radius_of(radii: &RadiusTable, atom: &AtomRecord) -> f64 {
    radii.get(&atom.atom_type).unwrap_or(0.0)
}

#[inline]
fn pair_overlaps(a: &AtomRecord, b: &AtomRecord, radii: &RadiusTable, tol: f64) -> bool {
    a.distance_to(b) < radius_of(radii, a) + radius_of(radii, b) - tol
}

pub fn is_overlap_atom(
    candidate: &AtomRecord,
    placed: &[AtomRecord],
    radii: &RadiusTable,
    tol: f64,
) -> bool {
    placed
        .iter()
        .any(|other| pair_overlaps(candidate, other, radii, tol))
}

/// True if any candidate atom overlaps any atom of any placed molecule, or if
/// two atoms of the candidate overlap each other.
pub fn is_overlap_molecule(
    candidate: &[AtomRecord],
    placed: &[Vec<AtomRecord>],
    radii: &RadiusTable,
    tol: f64,
) -> bool {
    let against_placed = candidate.iter().any(|atom| {
        placed
            .iter()
            .any(|molecule| is_overlap_atom(atom, molecule, radii, tol))
    });
    against_placed || self_overlaps(candidate, radii, tol)
}

fn self_overlaps(candidate: &[AtomRecord], radii: &RadiusTable, tol: f64) -> bool {
    candidate.iter().enumerate().any(|(i, a)| {
        candidate[i + 1..]
            .iter()
            .any(|b| pair_overlaps(a, b, radii, tol))
    })
}

/// Incremental overlap checker over the atoms accepted so far.
pub struct OverlapDetector<'a> {
    radii: &'a RadiusTable,
    tol: f64,
    index: SpatialIndex,
    accepted: Vec<AtomRecord>,
}

impl<'a> OverlapDetector<'a> {
    /// `max_radius` must bound the radius of every atom that will be checked or
    /// inserted; the index cell edge is the largest possible cutoff.
    pub fn new(radii: &'a RadiusTable, tol: f64, max_radius: f64) -> Self {
        Self {
            radii,
            tol,
            index: SpatialIndex::new(2.0 * max_radius - tol),
            accepted: Vec::new(),
        }
    }

    fn overlaps_accepted(&self, atom: &AtomRecord) -> bool {
        self.index.any_neighbor(&atom.position, |idx| {
            pair_overlaps(atom, &self.accepted[idx], self.radii, self.tol)
        })
    }

    /// Same answer as [`is_overlap_atom`] against every accepted atom.
    pub fn overlaps_atom(&self, candidate: &AtomRecord) -> bool {
        self.overlaps_accepted(candidate)
    }

    /// Same answer as [`is_overlap_molecule`] against every accepted molecule.
    pub fn overlaps_molecule(&self, candidate: &[AtomRecord]) -> bool {
        candidate.iter().any(|atom| self.overlaps_accepted(atom))
            || self_overlaps(candidate, self.radii, self.tol)
    }

    pub fn insert(&mut self, atoms: &[AtomRecord]) {
        for atom in atoms {
            self.index.insert(self.accepted.len(), &atom.position);
            self.accepted.push(atom.clone());
        }
    }

    pub fn accepted_atoms(&self) -> usize {
        self.accepted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn radii() -> RadiusTable {
        RadiusTable::from_pairs([("A", 1.0), ("B", 0.5)])
    }

    fn at(atom_type: &str, x: f64, y: f64, z: f64) -> AtomRecord {
        AtomRecord::new(atom_type, Point3::new(x, y, z))
    }

    #[test]
    fn atom_overlap_uses_strict_cutoff() {
        let radii = radii();
        let placed = vec![at("A", 0.0, 0.0, 0.0)];

        assert!(is_overlap_atom(&at("A", 1.8, 0.0, 0.0), &placed, &radii, 0.1));
        assert!(!is_overlap_atom(&at("A", 1.9, 0.0, 0.0), &placed, &radii, 0.1));
        assert!(!is_overlap_atom(&at("A", 1.95, 0.0, 0.0), &placed, &radii, 0.1));
        assert!(is_overlap_atom(&at("B", 1.0, 0.0, 0.0), &placed, &radii, 0.1));
    }

    #[test]
    fn empty_placed_set_never_overlaps() {
        assert!(!is_overlap_atom(&at("A", 0.0, 0.0, 0.0), &[], &radii(), 0.0));
        assert!(!is_overlap_molecule(&[at("A", 0.0, 0.0, 0.0)], &[], &radii(), 0.0));
    }

    #[test]
    fn large_tolerance_disables_overlap() {
        let placed = vec![at("A", 0.0, 0.0, 0.0)];
        assert!(!is_overlap_atom(&at("A", 0.0, 0.0, 0.0), &placed, &radii(), 2.0));
    }

    #[test]
    fn molecule_overlap_checks_every_atom_pair() {
        let radii = radii();
        let placed = vec![vec![at("B", 0.0, 0.0, 0.0), at("B", 5.0, 0.0, 0.0)]];

        let clear = vec![at("B", 2.0, 0.0, 0.0), at("B", 3.0, 0.0, 0.0)];
        let touching = vec![at("B", 2.0, 0.0, 0.0), at("B", 4.5, 0.0, 0.0)];
        assert!(!is_overlap_molecule(&clear, &placed, &radii, 0.0));
        assert!(is_overlap_molecule(&touching, &placed, &radii, 0.0));
    }

    #[test]
    fn molecule_self_overlap_is_reported() {
        let cramped = vec![at("A", 10.0, 0.0, 0.0), at("A", 10.5, 0.0, 0.0)];
        assert!(is_overlap_molecule(&cramped, &[], &radii(), 0.0));
        assert!(!is_overlap_molecule(&cramped, &[], &radii(), 1.6));
    }

    #[test]
    fn detector_matches_reference_on_random_clouds() {
        let radii = radii();
        let mut rng = StdRng::seed_from_u64(7);
        let random_atom = |rng: &mut StdRng| {
            let kind = if rng.gen_bool(0.5) { "A" } else { "B" };
            at(
                kind,
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
            )
        };

        for tol in [0.0, 0.3, 1.2] {
            let placed: Vec<AtomRecord> = (0..60).map(|_| random_atom(&mut rng)).collect();
            let mut detector = OverlapDetector::new(&radii, tol, 1.0);
            detector.insert(&placed);
            assert_eq!(detector.accepted_atoms(), placed.len());

            for _ in 0..400 {
                let candidate = random_atom(&mut rng);
                assert_eq!(
                    detector.overlaps_atom(&candidate),
                    is_overlap_atom(&candidate, &placed, &radii, tol),
                    "Disagreement at tol {} for {:?}",
                    tol,
                    candidate.position
                );
            }
        }
    }

    #[test]
    fn detector_matches_reference_for_molecules() {
        let radii = radii();
        let placed = vec![
            vec![at("A", 0.0, 0.0, 0.0), at("B", 1.2, 0.0, 0.0)],
            vec![at("A", 4.0, 4.0, 4.0), at("B", 4.0, 5.0, 4.0)],
        ];
        let mut detector = OverlapDetector::new(&radii, 0.2, 1.0);
        for molecule in &placed {
            detector.insert(molecule);
        }

        let candidates = [
            vec![at("A", 2.5, 0.0, 0.0), at("B", 3.5, 0.0, 0.0)],
            vec![at("A", 8.0, 8.0, 8.0), at("B", 9.0, 8.0, 8.0)],
            vec![at("A", 8.0, 8.0, 8.0), at("A", 8.1, 8.0, 8.0)],
            vec![at("B", 4.0, 6.0, 4.0), at("B", 4.0, 7.0, 4.0)],
        ];
        for candidate in &candidates {
            assert_eq!(
                detector.overlaps_molecule(candidate),
                is_overlap_molecule(candidate, &placed, &radii, 0.2)
            );
        }
    }
}
