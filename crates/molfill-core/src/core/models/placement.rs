use super::atom::AtomRecord;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementKind {
    Atom,
    Molecule,
}

impl PlacementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementKind::Atom => "atom",
            PlacementKind::Molecule => "molecule",
        }
    }
}

impl fmt::Display for PlacementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered result of one placement run.
///
/// `NoAtoms` is the sentinel failure returned when the input pattern is empty; it is
/// a value rather than an error so callers can branch on [`Placement::kind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Atoms(Vec<AtomRecord>),
    Molecules(Vec<Vec<AtomRecord>>),
    NoAtoms { message: String },
}

impl Placement {
    pub const ERROR_KIND: &'static str = "ERROR";
    pub const NO_ATOMS_MESSAGE: &'static str = "No atoms found";

    pub fn no_atoms() -> Self {
        Placement::NoAtoms {
            message: Self::NO_ATOMS_MESSAGE.to_string(),
        }
    }

    /// The discriminator: "atom", "molecule" or "ERROR".
    pub fn kind(&self) -> &'static str {
        match self {
            Placement::Atoms(_) => PlacementKind::Atom.as_str(),
            Placement::Molecules(_) => PlacementKind::Molecule.as_str(),
            Placement::NoAtoms { .. } => Self::ERROR_KIND,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Placement::NoAtoms { .. })
    }

    /// Number of placed entities (atoms or molecules).
    pub fn len(&self) -> usize {
        match self {
            Placement::Atoms(atoms) => atoms.len(),
            Placement::Molecules(molecules) => molecules.len(),
            Placement::NoAtoms { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn atoms(&self) -> Box<dyn Iterator<Item = &AtomRecord> + '_> {
        match self {
            Placement::Atoms(atoms) => Box::new(atoms.iter()),
            Placement::Molecules(molecules) => Box::new(molecules.iter().flatten()),
            Placement::NoAtoms { .. } => Box::new(std::iter::empty()),
        }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms().count()
    }

    /// Flattens the placement into a single atom list, in placement order.
    pub fn into_atoms(self) -> Vec<AtomRecord> {
        match self {
            Placement::Atoms(atoms) => atoms,
            Placement::Molecules(molecules) => molecules.into_iter().flatten().collect(),
            Placement::NoAtoms { .. } => Vec::new(),
        }
    }
}
