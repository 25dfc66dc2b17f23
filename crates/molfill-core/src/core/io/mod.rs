//! Provides input/output for structure files.
//!
//! The engine consumes plain [`AtomRecord`](crate::core::models::atom::AtomRecord)
//! sequences; this module converts them from and to files behind the
//! [`traits::StructureFile`] interface.

pub mod traits;
pub mod xyz;
