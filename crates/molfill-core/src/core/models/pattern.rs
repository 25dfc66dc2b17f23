use super::atom::AtomRecord;
use super::placement::PlacementKind;
use nalgebra::Point3;

/// The template replicated by every filler.
///
/// Offsets are normalized on construction so the minimum-coordinate corner of the
/// pattern sits at the local origin. A pattern is a rigid body: fillers only ever
/// translate it as a whole, and the orientation randomizer only ever rotates it as
/// a whole.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    SingleAtom(AtomRecord),
    RigidGroup(Vec<AtomRecord>),
}

impl Pattern {
    /// Builds a normalized pattern from source records.
    ///
    /// Returns `None` when `records` is empty, which callers surface as the
    /// "No atoms found" placement.
    pub fn from_records(records: &[AtomRecord]) -> Option<Self> {
        let min = min_corner(records)?;
        let shift = -min.coords;
        let mut normalized: Vec<AtomRecord> =
            records.iter().map(|atom| atom.translated(&shift)).collect();

        if normalized.len() == 1 {
            normalized.pop().map(Pattern::SingleAtom)
        } else {
            Some(Pattern::RigidGroup(normalized))
        }
    }

    pub fn atoms(&self) -> &[AtomRecord] {
        match self {
            Pattern::SingleAtom(atom) => std::slice::from_ref(atom),
            Pattern::RigidGroup(atoms) => atoms,
        }
    }

    pub fn len(&self) -> usize {
        self.atoms().len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms().is_empty()
    }

    pub fn kind(&self) -> PlacementKind {
        match self {
            Pattern::SingleAtom(_) => PlacementKind::Atom,
            Pattern::RigidGroup(_) => PlacementKind::Molecule,
        }
    }

    /// A copy of the pattern with its local origin moved to `point`.
    pub fn placed_at(&self, point: &Point3<f64>) -> Vec<AtomRecord> {
        let offset = point.coords;
        self.atoms()
            .iter()
            .map(|atom| atom.translated(&offset))
            .collect()
    }

    pub fn atom_types(&self) -> impl Iterator<Item = &str> {
        self.atoms().iter().map(|atom| atom.atom_type.as_str())
    }
}

fn min_corner(records: &[AtomRecord]) -> Option<Point3<f64>> {
    let first = records.first()?.position;
    Some(
        records
            .iter()
            .fold(first, |acc, atom| acc.inf(&atom.position)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Vec<AtomRecord> {
        vec![
            AtomRecord::with_tag("O", Point3::new(10.0, 5.0, -2.0), "HOH"),
            AtomRecord::with_tag("H", Point3::new(10.96, 5.0, -2.0), "HOH"),
            AtomRecord::with_tag("H", Point3::new(9.76, 5.93, -2.0), "HOH"),
        ]
    }

    #[test]
    fn empty_records_yield_no_pattern() {
        assert!(Pattern::from_records(&[]).is_none());
    }

    #[test]
    fn single_record_becomes_single_atom_at_origin() {
        let pattern =
            Pattern::from_records(&[AtomRecord::new("Ar", Point3::new(3.0, 4.0, 5.0))]).unwrap();

        match &pattern {
            Pattern::SingleAtom(atom) => {
                assert_eq!(atom.atom_type, "Ar");
                assert_eq!(atom.position, Point3::origin());
            }
            other => panic!("Expected a single atom, got {:?}", other),
        }
        assert_eq!(pattern.kind(), PlacementKind::Atom);
    }

    #[test]
    fn group_is_normalized_to_its_min_corner() {
        let pattern = Pattern::from_records(&water()).unwrap();

        assert_eq!(pattern.kind(), PlacementKind::Molecule);
        assert_eq!(pattern.len(), 3);

        let atoms = pattern.atoms();
        assert!((atoms[0].position - Point3::new(0.24, 0.0, 0.0)).norm() < 1e-12);
        assert!((atoms[1].position - Point3::new(1.2, 0.0, 0.0)).norm() < 1e-12);
        assert!((atoms[2].position - Point3::new(0.0, 0.93, 0.0)).norm() < 1e-12);
        assert!(atoms.iter().all(|a| a.tag.as_deref() == Some("HOH")));
    }

    #[test]
    fn normalization_preserves_inter_atom_offsets_and_order() {
        let source = water();
        let pattern = Pattern::from_records(&source).unwrap();
        let atoms = pattern.atoms();

        for i in 0..source.len() {
            assert_eq!(atoms[i].atom_type, source[i].atom_type);
            for j in 0..source.len() {
                let before = source[i].distance_to(&source[j]);
                let after = atoms[i].distance_to(&atoms[j]);
                assert!((before - after).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn placed_at_moves_min_corner_onto_point() {
        let pattern = Pattern::from_records(&water()).unwrap();
        let point = Point3::new(-5.0, -5.0, -5.0);
        let copy = pattern.placed_at(&point);

        let corner = min_corner(&copy).unwrap();
        assert!((corner - point).norm() < 1e-12);
    }
}
