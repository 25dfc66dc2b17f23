//! Per-type lookup tables consumed by the engine.
//!
//! Radii drive the overlap test and masses drive density sizing. Both are plain
//! `atom type -> positive float` maps, read-only for the duration of a run. Built-in
//! defaults cover the common elements; user tables loaded from TOML or CSV are merged
//! over them.

pub mod defaults;
pub mod table;

pub use table::{ElementTable, TableLoadError};

/// Atom type to radius in Angstroms.
pub type RadiusTable = ElementTable;
/// Atom type to mass in g/mol.
pub type MassTable = ElementTable;

#[derive(Debug, Clone, PartialEq)]
pub struct Tables {
    pub radii: RadiusTable,
    pub masses: MassTable,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            radii: ElementTable::covalent_radii(),
            masses: ElementTable::atomic_masses(),
        }
    }
}
