//! Placement tasks.
//!
//! Each submodule implements one way of producing a placement from a
//! [`FillContext`](crate::engine::context::FillContext): lattice scanning
//! ([`grid_fill`]), rejection sampling ([`random_fill`]), periodic replication
//! ([`unit_cell`]), and the density-to-count conversion feeding the first two
//! ([`density`]).

pub mod density;
pub mod grid_fill;
pub mod random_fill;
pub mod unit_cell;

use crate::core::models::atom::AtomRecord;
use crate::core::models::placement::{Placement, PlacementKind};
use crate::core::shapes::Volume;
use crate::engine::context::FillContext;
use crate::engine::overlap::OverlapDetector;

/// The growing sequence of accepted copies, paired with the detector that guards it.
pub(crate) struct PlacedSet<'a> {
    context: FillContext<'a>,
    detector: OverlapDetector<'a>,
    kind: PlacementKind,
    atoms: Vec<AtomRecord>,
    molecules: Vec<Vec<AtomRecord>>,
}

impl<'a> PlacedSet<'a> {
    pub(crate) fn new(context: &FillContext<'a>) -> Self {
        Self {
            context: *context,
            detector: context.detector(),
            kind: context.pattern.kind(),
            atoms: Vec::new(),
            molecules: Vec::new(),
        }
    }

    /// Accepts `candidate` if it lies inside the shape and overlaps nothing already
    /// accepted. Returns whether it was accepted.
    pub(crate) fn try_accept(&mut self, candidate: Vec<AtomRecord>) -> bool {
        let shape = self.context.shape;
        match self.kind {
            PlacementKind::Atom => {
                let Some(atom) = candidate.into_iter().next() else {
                    return false;
                };
                if !shape.is_inside(&atom.position) || self.detector.overlaps_atom(&atom) {
                    return false;
                }
                self.detector.insert(std::slice::from_ref(&atom));
                self.atoms.push(atom);
            }
            PlacementKind::Molecule => {
                if !shape.contains_all(&candidate) || self.detector.overlaps_molecule(&candidate)
                {
                    return false;
                }
                self.detector.insert(&candidate);
                self.molecules.push(candidate);
            }
        }
        true
    }

    pub(crate) fn len(&self) -> usize {
        match self.kind {
            PlacementKind::Atom => self.atoms.len(),
            PlacementKind::Molecule => self.molecules.len(),
        }
    }

    pub(crate) fn into_placement(self) -> Placement {
        match self.kind {
            PlacementKind::Atom => Placement::Atoms(self.atoms),
            PlacementKind::Molecule => Placement::Molecules(self.molecules),
        }
    }
}
