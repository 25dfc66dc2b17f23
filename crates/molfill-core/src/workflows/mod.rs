//! # Workflows Module
//!
//! High-level entry points that tie the `core` and `engine` layers together.
//!
//! - **Fill Workflow** ([`fill`]) - Validates a configuration, builds the shape and
//!   pattern, selects one placement mode and returns the placement.

pub mod fill;
