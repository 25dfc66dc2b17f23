//! # Engine Module
//!
//! The packing logic: configuration, overlap detection and the placement tasks.
//!
//! - **Configuration** ([`config`]) - Fill options, shape parameters, targets and unit cells
//! - **Overlap Detection** ([`overlap`], [`spatial_index`]) - The pairwise separation test
//!   and its grid-accelerated form
//! - **Orientation** ([`orientation`]) - Uniform random rigid rotations
//! - **Tasks** ([`tasks`]) - Grid fill, random fill, density sizing and unit-cell replication
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level error types

pub mod config;
pub mod context;
pub mod error;
pub mod orientation;
pub mod overlap;
pub mod progress;
pub mod spatial_index;
pub mod tasks;
