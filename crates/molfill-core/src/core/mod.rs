//! # Core Module
//!
//! Stateless building blocks shared by the packing engine.
//!
//! - **Atoms and Patterns** ([`models`]) - Atom records, the normalized pattern template,
//!   and the placement result type
//! - **Volumes** ([`shapes`]) - Box, sphere and mesh regions behind the `Volume` trait
//! - **Lookup Tables** ([`tables`]) - Per-type radii and masses with built-in defaults
//! - **File I/O** ([`io`]) - Reading patterns and writing placements
//! - **Geometry Helpers** ([`utils`]) - Centroids, rigid rotations and lattice counting

pub mod io;
pub mod models;
pub mod shapes;
pub mod tables;
pub mod utils;
