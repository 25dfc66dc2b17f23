use super::defaults::{ATOMIC_MASSES, COVALENT_RADII};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Value for atom type '{atom_type}' must be positive and finite (got {value})")]
    InvalidValue { atom_type: String, value: f64 },
}

#[derive(Debug, Deserialize)]
struct TableRow {
    atom_type: String,
    value: f64,
}

/// A mapping from atom type to a positive scalar property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementTable {
    values: HashMap<String, f64>,
}

impl ElementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn covalent_radii() -> Self {
        Self::from_static(&COVALENT_RADII)
    }

    pub fn atomic_masses() -> Self {
        Self::from_static(&ATOMIC_MASSES)
    }

    /// Builds a table from `(atom type, value)` pairs; later duplicates win.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    fn from_static(map: &phf::Map<&'static str, f64>) -> Self {
        Self::from_pairs(map.entries().map(|(name, value)| (*name, *value)))
    }

    /// Loads a table from disk, choosing the format by extension: `.csv` files need
    /// `atom_type,value` headers, anything else is read as a flat TOML map.
    pub fn load(path: &Path) -> Result<Self, TableLoadError> {
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let table = if is_csv {
            Self::load_csv(path)?
        } else {
            Self::load_toml(path)?
        };
        table.validate()?;
        debug!(path = %path.display(), entries = table.len(), "Loaded element table.");
        Ok(table)
    }

    fn load_toml(path: &Path) -> Result<Self, TableLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| TableLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let values: HashMap<String, f64> =
            toml::from_str(&content).map_err(|e| TableLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        Ok(Self { values })
    }

    fn load_csv(path: &Path) -> Result<Self, TableLoadError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| TableLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut values = HashMap::new();
        for result in reader.deserialize::<TableRow>() {
            let row = result.map_err(|e| TableLoadError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            values.insert(row.atom_type, row.value);
        }
        Ok(Self { values })
    }

    fn validate(&self) -> Result<(), TableLoadError> {
        match self
            .values
            .iter()
            .find(|(_, value)| !(value.is_finite() && **value > 0.0))
        {
            Some((atom_type, value)) => Err(TableLoadError::InvalidValue {
                atom_type: atom_type.clone(),
                value: *value,
            }),
            None => Ok(()),
        }
    }

    pub fn get(&self, atom_type: &str) -> Option<f64> {
        self.values.get(atom_type).copied()
    }

    pub fn contains(&self, atom_type: &str) -> bool {
        self.values.contains_key(atom_type)
    }

    /// Overlays `other` onto this table; entries in `other` take precedence.
    pub fn merge(&mut self, other: ElementTable) {
        self.values.extend(other.values);
    }

    /// Returns the first type in `types` that has no entry.
    pub fn first_missing<'a, I>(&self, types: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        types.into_iter().find(|t| !self.contains(t))
    }

    /// Largest value in the table restricted to `types`, or `None` if none are known.
    pub fn max_over<'a, I>(&self, types: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        types
            .into_iter()
            .filter_map(|t| self.get(t))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
