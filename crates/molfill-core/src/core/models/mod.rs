//! # Core Models Module
//!
//! This module contains the data structures that flow through every placement run.
//!
//! ## Key Components
//!
//! - [`atom`] - A typed, optionally tagged atom record with coordinates
//! - [`pattern`] - The normalized atom or rigid-group template being replicated
//! - [`placement`] - The ordered output of a run together with its discriminator
//!
//! ## Usage
//!
//! ```ignore
//! use molfill::core::models::{atom::AtomRecord, pattern::Pattern};
//!
//! let records = vec![
//!     AtomRecord::new("O", Point3::new(0.0, 0.0, 0.0)),
//!     AtomRecord::new("H", Point3::new(0.96, 0.0, 0.0)),
//! ];
//! let pattern = Pattern::from_records(&records).expect("pattern has atoms");
//! assert_eq!(pattern.kind().as_str(), "molecule");
//! ```

pub mod atom;
pub mod pattern;
pub mod placement;
