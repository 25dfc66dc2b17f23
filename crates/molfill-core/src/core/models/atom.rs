use nalgebra::{Point3, Vector3};

/// A single atom of a pattern or of a finished placement.
///
/// Positions are offsets from the pattern origin while a record belongs to a
/// [`Pattern`](super::pattern::Pattern), and absolute world coordinates once the
/// record has been placed inside a shape. Records are never mutated in place;
/// translation and rotation produce new records and carry the tag through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    /// The atom type used for radius and mass lookups (e.g., "C", "O", "Ar").
    pub atom_type: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// An optional label carried through placement, such as a residue name.
    pub tag: Option<String>,
}

impl AtomRecord {
    /// Creates an untagged record.
    ///
    /// # Arguments
    ///
    /// * `atom_type` - The atom type string.
    /// * `position` - The coordinates of the atom.
    pub fn new(atom_type: &str, position: Point3<f64>) -> Self {
        Self {
            atom_type: atom_type.to_string(),
            position,
            tag: None,
        }
    }

    /// Creates a record carrying a tag (e.g., a residue label).
    pub fn with_tag(atom_type: &str, position: Point3<f64>, tag: &str) -> Self {
        Self {
            atom_type: atom_type.to_string(),
            position,
            tag: Some(tag.to_string()),
        }
    }

    /// Returns a copy of this record shifted by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        self.moved_to(self.position + offset)
    }

    /// Returns a copy of this record with its position replaced.
    pub fn moved_to(&self, position: Point3<f64>) -> Self {
        Self {
            atom_type: self.atom_type.clone(),
            position,
            tag: self.tag.clone(),
        }
    }

    /// Euclidean distance between the centers of two records.
    #[inline]
    pub fn distance_to(&self, other: &AtomRecord) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_has_no_tag() {
        let atom = AtomRecord::new("C", Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.atom_type, "C");
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert!(atom.tag.is_none());
    }

    #[test]
    fn translated_keeps_type_and_tag() {
        let atom = AtomRecord::with_tag("O", Point3::new(0.0, 0.0, 0.0), "HOH");
        let moved = atom.translated(&Vector3::new(1.0, -1.0, 2.5));

        assert_eq!(moved.position, Point3::new(1.0, -1.0, 2.5));
        assert_eq!(moved.atom_type, "O");
        assert_eq!(moved.tag.as_deref(), Some("HOH"));
        assert_eq!(atom.position, Point3::origin());
    }

    #[test]
    fn distance_to_is_euclidean() {
        let a = AtomRecord::new("X", Point3::new(0.0, 0.0, 0.0));
        let b = AtomRecord::new("X", Point3::new(3.0, 4.0, 0.0));
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }
}
