//! # molfill Core Library
//!
//! Fills a bounded region (box, sphere or triangulated mesh) with copies of a molecular
//! pattern while keeping every pair of atoms separated by at least the sum of their radii
//! minus a tolerance.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three layers throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`AtomRecord`, `Pattern`,
//!   `Placement`), the shape volumes, radius and mass tables, and structure file I/O.
//!
//! - **[`engine`]: The Logic Core.** Configuration and validation, the overlap detector and
//!   its spatial index, the orientation randomizer, and the placement tasks (grid fill,
//!   random fill, density sizing and unit-cell replication).
//!
//! - **[`workflows`]: The Public API.** [`workflows::fill::run`] validates a configuration,
//!   selects exactly one placement mode and returns the finished placement.

pub mod core;
pub mod engine;
pub mod workflows;
