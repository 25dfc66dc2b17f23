use thiserror::Error;

use super::config::ConfigError;
use crate::core::shapes::ShapeError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to build shape: {source}")]
    Shape {
        #[from]
        source: ShapeError,
    },

    #[error("No {table} entry for atom type '{atom_type}'")]
    UnknownAtomType {
        table: &'static str,
        atom_type: String,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
