use crate::cli::{FillArgs, FillStrategy};
use crate::error::{CliError, Result};
use molfill::engine::config as core_config;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DEFAULT_TOL: f64 = 2.0;
const DEFAULT_MESH_SCALE: f64 = 1.0;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", tag = "type")]
enum PartialShapeConfig {
    Box {
        origin: Option<[f64; 3]>,
        length: f64,
        height: f64,
        width: f64,
    },
    Sphere {
        center: Option<[f64; 3]>,
        radius: f64,
    },
    Mesh {
        source: PathBuf,
        scale: Option<f64>,
    },
}

impl PartialShapeConfig {
    fn into_core(self, base_dir: &Path) -> core_config::ShapeConfig {
        let point = |p: Option<[f64; 3]>| p.map(Point3::from).unwrap_or_else(Point3::origin);
        match self {
            PartialShapeConfig::Box {
                origin,
                length,
                height,
                width,
            } => core_config::ShapeConfig::Box {
                origin: point(origin),
                length,
                height,
                width,
            },
            PartialShapeConfig::Sphere { center, radius } => core_config::ShapeConfig::Sphere {
                center: point(center),
                radius,
            },
            PartialShapeConfig::Mesh { source, scale } => core_config::ShapeConfig::Mesh {
                source: resolve_relative(base_dir, source),
                scale: scale.unwrap_or(DEFAULT_MESH_SCALE),
            },
        }
    }
}

/// `num-molecules` is either a count or the keyword `"fill"`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
enum PartialTarget {
    Count(usize),
    Keyword(String),
}

impl PartialTarget {
    fn into_core(self) -> Result<core_config::Target> {
        match self {
            PartialTarget::Count(n) => Ok(core_config::Target::Exact(n)),
            PartialTarget::Keyword(s) => {
                core_config::Target::from_str(&s).map_err(|e| CliError::Config(e.to_string()))
            }
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum PartialUnitCell {
    Lengths { lengths: [f64; 3] },
    Vectors { a: [f64; 3], b: [f64; 3], c: [f64; 3] },
}

impl PartialUnitCell {
    fn into_core(self) -> Result<core_config::UnitCell> {
        let cell = match self {
            PartialUnitCell::Lengths { lengths } => core_config::UnitCell::orthorhombic(lengths),
            PartialUnitCell::Vectors { a, b, c } => core_config::UnitCell::new(
                Vector3::from(a),
                Vector3::from(b),
                Vector3::from(c),
            ),
        };
        cell.map_err(|e| CliError::Config(e.to_string()))
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialFillOptions {
    num_molecules: Option<PartialTarget>,
    tol: Option<f64>,
    spacing: Option<f64>,
    rand_fill: Option<bool>,
    max_attempts: Option<usize>,
    randomize_orient: Option<bool>,
    density: Option<f64>,
    seed: Option<u64>,
    unit_cell: Option<PartialUnitCell>,
    base: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialTablesConfig {
    radii: Option<PathBuf>,
    masses: Option<PathBuf>,
}

/// The fully merged settings of one `fill` invocation.
#[derive(Debug, Clone)]
pub struct FillSettings {
    pub fill: core_config::FillConfig,
    pub radii_path: Option<PathBuf>,
    pub masses_path: Option<PathBuf>,
    /// XYZ file of the base structure, read by the command before filling.
    pub base_path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialFillConfig {
    shape: Option<PartialShapeConfig>,
    fill: Option<PartialFillOptions>,
    tables: Option<PartialTablesConfig>,
    /// Directory that relative paths in the file are resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

impl PartialFillConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    pub fn merge_with_cli(mut self, args: &FillArgs) -> Result<FillSettings> {
        self.apply_set_values(&args.set_values)?;

        let shape = self
            .shape
            .take()
            .ok_or_else(|| CliError::Config("`[shape]` section is required.".to_string()))?
            .into_core(&self.base_dir);
        let fill = self.fill.take().unwrap_or_default();
        let tables = self.tables.take().unwrap_or_default();

        let target = match &args.num_molecules {
            Some(raw) => PartialTarget::Keyword(raw.clone()).into_core()?,
            None => match fill.num_molecules {
                Some(partial) => partial.into_core()?,
                None => core_config::Target::Unbounded,
            },
        };

        let mut builder = core_config::FillConfigBuilder::new()
            .shape(shape)
            .target(target)
            .tol(args.tol.or(fill.tol).unwrap_or(DEFAULT_TOL))
            .max_attempts(
                args.max_attempts
                    .or(fill.max_attempts)
                    .unwrap_or(core_config::DEFAULT_MAX_ATTEMPTS),
            )
            .rand_fill(Self::merge_strategy(args.strategy, fill.rand_fill))
            .randomize_orientation(args.randomize_orient || fill.randomize_orient.unwrap_or(false));

        if let Some(spacing) = args.spacing.or(fill.spacing) {
            builder = builder.spacing(spacing);
        }
        if let Some(density) = args.density.or(fill.density) {
            builder = builder.density(density);
        }
        if let Some(seed) = args.seed.or(fill.seed) {
            builder = builder.seed(seed);
        }
        if let Some(cell) = fill.unit_cell {
            builder = builder.unit_cell(cell.into_core()?);
        }

        let base_path = match &args.base {
            Some(path) => Some(path.clone()),
            None => fill.base.map(|p| resolve_relative(&self.base_dir, p)),
        };

        let fill = builder.build().map_err(|e| CliError::Config(e.to_string()))?;
        Ok(FillSettings {
            fill,
            base_path,
            radii_path: tables.radii.map(|p| resolve_relative(&self.base_dir, p)),
            masses_path: tables.masses.map(|p| resolve_relative(&self.base_dir, p)),
        })
    }

    fn merge_strategy(cli_flags: FillStrategy, file_val: Option<bool>) -> bool {
        if cli_flags.rand_fill {
            true
        } else if cli_flags.grid_fill {
            false
        } else {
            file_val.unwrap_or(false)
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            if let Some(field) = key.strip_prefix("shape.") {
                self.set_shape_value(key, field, value_str)?;
                continue;
            }

            match key {
                "fill.num-molecules" => {
                    self.fill_mut().num_molecules = Some(PartialTarget::Keyword(value_str.to_string()));
                }
                "fill.tol" => self.fill_mut().tol = Some(parse_value(key, value_str)?),
                "fill.spacing" => self.fill_mut().spacing = Some(parse_value(key, value_str)?),
                "fill.rand-fill" => self.fill_mut().rand_fill = Some(parse_value(key, value_str)?),
                "fill.max-attempts" => {
                    self.fill_mut().max_attempts = Some(parse_value(key, value_str)?)
                }
                "fill.randomize-orient" => {
                    self.fill_mut().randomize_orient = Some(parse_value(key, value_str)?)
                }
                "fill.density" => self.fill_mut().density = Some(parse_value(key, value_str)?),
                "fill.seed" => self.fill_mut().seed = Some(parse_value(key, value_str)?),
                "fill.base" => self.fill_mut().base = Some(PathBuf::from(value_str)),
                "tables.radii" => {
                    self.tables.get_or_insert_with(Default::default).radii =
                        Some(PathBuf::from(value_str))
                }
                "tables.masses" => {
                    self.tables.get_or_insert_with(Default::default).masses =
                        Some(PathBuf::from(value_str))
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn set_shape_value(&mut self, key: &str, field: &str, value_str: &str) -> Result<()> {
        let shape = self.shape.as_mut().ok_or_else(|| {
            CliError::Config(format!(
                "Cannot set '{}': the config file has no `[shape]` section.",
                key
            ))
        })?;
        match (shape, field) {
            (PartialShapeConfig::Box { length, .. }, "length") => *length = parse_value(key, value_str)?,
            (PartialShapeConfig::Box { height, .. }, "height") => *height = parse_value(key, value_str)?,
            (PartialShapeConfig::Box { width, .. }, "width") => *width = parse_value(key, value_str)?,
            (PartialShapeConfig::Sphere { radius, .. }, "radius") => {
                *radius = parse_value(key, value_str)?
            }
            (PartialShapeConfig::Mesh { scale, .. }, "scale") => {
                *scale = Some(parse_value(key, value_str)?)
            }
            (PartialShapeConfig::Mesh { source, .. }, "source") => *source = PathBuf::from(value_str),
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}' (not a parameter of the configured shape)",
                    key
                )));
            }
        }
        Ok(())
    }

    fn fill_mut(&mut self) -> &mut PartialFillOptions {
        self.fill.get_or_insert_with(Default::default)
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value_str))
    })
}

fn resolve_relative(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use molfill::engine::config::{ShapeConfig, Target};
    use once_cell::sync::Lazy;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn fill_args(config_path: &Path, extra: &[&str]) -> FillArgs {
        let mut args = vec![
            "molfill".to_string(),
            "fill".to_string(),
            "-i".to_string(),
            "in.xyz".to_string(),
            "-o".to_string(),
            "out.xyz".to_string(),
            "-c".to_string(),
            config_path.to_str().unwrap().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        let Commands::Fill(fill_args) = Cli::parse_from(args).command;
        fill_args
    }

    fn merge(name: &str, content: &str, extra: &[&str]) -> Result<FillSettings> {
        let config_path = write_config_file(name, content);
        let args = fill_args(&config_path, extra);
        PartialFillConfig::from_file(&config_path)?.merge_with_cli(&args)
    }

    const SPHERE_ONLY: &str = r#"
        [shape]
        type = "sphere"
        radius = 5.0
    "#;

    #[test]
    fn test_load_from_file_and_merge_with_defaults() {
        let settings = merge("defaults.toml", SPHERE_ONLY, &[]).unwrap();
        let fill = settings.fill;

        assert_eq!(
            fill.shape,
            ShapeConfig::Sphere {
                center: Point3::origin(),
                radius: 5.0
            }
        );
        assert_eq!(fill.target, Target::Unbounded);
        assert_eq!(fill.tol, 2.0);
        assert_eq!(fill.spacing(), 2.0);
        assert_eq!(fill.max_attempts, 10_000);
        assert!(!fill.rand_fill);
        assert!(!fill.randomize_orientation);
        assert!(fill.density.is_none() && fill.unit_cell.is_none() && fill.seed.is_none());
        assert!(settings.radii_path.is_none() && settings.masses_path.is_none());
        assert!(settings.base_path.is_none());
    }

    #[test]
    fn test_full_file_is_parsed() {
        let content = r#"
            [shape]
            type = "box"
            origin = [1.0, 2.0, 3.0]
            length = 10.0
            height = 11.0
            width = 12.0

            [fill]
            num-molecules = 25
            tol = 0.5
            spacing = 1.5
            rand-fill = true
            max-attempts = 700
            randomize-orient = true
            density = 0.9
            seed = 99
            base = "structures/protein.xyz"

            [fill.unit-cell]
            a = [2.0, 0.0, 0.0]
            b = [0.0, 2.0, 0.0]
            c = [0.0, 1.0, 2.0]

            [tables]
            radii = "radii.toml"
            masses = "/abs/masses.csv"
        "#;
        let settings = merge("full.toml", content, &[]).unwrap();
        let fill = settings.fill;

        assert_eq!(
            fill.shape,
            ShapeConfig::Box {
                origin: Point3::new(1.0, 2.0, 3.0),
                length: 10.0,
                height: 11.0,
                width: 12.0
            }
        );
        assert_eq!(fill.target, Target::Exact(25));
        assert_eq!(fill.spacing(), 1.5);
        assert!(fill.rand_fill && fill.randomize_orientation);
        assert_eq!(fill.max_attempts, 700);
        assert_eq!(fill.density, Some(0.9));
        assert_eq!(fill.seed, Some(99));
        assert_eq!(fill.unit_cell.unwrap().c(), Vector3::new(0.0, 1.0, 2.0));
        assert_eq!(settings.radii_path, Some(TEST_DIR.path().join("radii.toml")));
        assert_eq!(settings.masses_path, Some(PathBuf::from("/abs/masses.csv")));
        assert_eq!(
            settings.base_path,
            Some(TEST_DIR.path().join("structures/protein.xyz"))
        );
    }

    #[test]
    fn test_base_path_from_cli_wins_and_stays_as_given() {
        let content = r#"
            [shape]
            type = "sphere"
            radius = 5.0

            [fill]
            base = "from_file.xyz"
        "#;
        let from_cli = merge("base_cli.toml", content, &["--base", "here/base.xyz"]).unwrap();
        assert_eq!(from_cli.base_path, Some(PathBuf::from("here/base.xyz")));

        let from_set = merge("base_set.toml", SPHERE_ONLY, &["-S", "fill.base=set.xyz"]).unwrap();
        assert_eq!(from_set.base_path, Some(TEST_DIR.path().join("set.xyz")));
    }

    #[test]
    fn test_cli_args_override_file_values() {
        let content = r#"
            [shape]
            type = "sphere"
            radius = 5.0

            [fill]
            num-molecules = 5 # Will be overridden
            tol = 1.0 # Will be overridden
            rand-fill = true # Will be overridden
        "#;
        let settings = merge(
            "override.toml",
            content,
            &["--num-molecules", "fill", "--tol", "0.1", "--spacing", "1.0", "--grid-fill", "--seed", "3"],
        )
        .unwrap();

        assert_eq!(settings.fill.target, Target::Unbounded);
        assert_eq!(settings.fill.tol, 0.1);
        assert_eq!(settings.fill.spacing(), 1.0);
        assert!(!settings.fill.rand_fill);
        assert_eq!(settings.fill.seed, Some(3));
    }

    #[test]
    fn test_set_value_overrides_file_but_not_cli() {
        let content = r#"
            [shape]
            type = "sphere"
            radius = 5.0

            [fill]
            max-attempts = 50 # Will be overridden by --set
        "#;
        let settings = merge(
            "set.toml",
            content,
            &[
                "-S", "fill.max-attempts=20",
                "-S", "shape.radius=7.5",
                "-S", "fill.tol=1.0",
                "--tol", "0.25",
            ],
        )
        .unwrap();

        assert_eq!(settings.fill.max_attempts, 20);
        assert_eq!(settings.fill.tol, 0.25);
        assert_eq!(
            settings.fill.shape,
            ShapeConfig::Sphere {
                center: Point3::origin(),
                radius: 7.5
            }
        );
    }

    #[test]
    fn test_set_value_rejects_unknown_or_mismatched_keys() {
        let unknown = merge("unknown_key.toml", SPHERE_ONLY, &["-S", "fill.colour=blue"]);
        assert!(matches!(unknown, Err(CliError::Config(msg)) if msg.contains("fill.colour")));

        let mismatched = merge("mismatch.toml", SPHERE_ONLY, &["-S", "shape.length=3"]);
        assert!(matches!(mismatched, Err(CliError::Config(_))));

        let malformed = merge("malformed.toml", SPHERE_ONLY, &["-S", "fill.tol"]);
        assert!(matches!(malformed, Err(CliError::Config(msg)) if msg.contains("KEY=VALUE")));

        let bad_value = merge("bad_value.toml", SPHERE_ONLY, &["-S", "fill.tol=wide"]);
        assert!(matches!(bad_value, Err(CliError::Config(_))));
    }

    #[test]
    fn test_missing_shape_returns_error() {
        let result = merge("no_shape.toml", "[fill]\ntol = 1.0\n", &[]);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("shape")));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let content = r#"
            [shape]
            type = "sphere"
            radius = 5.0

            [fill]
            tolerance = 1.0
        "#;
        let result = merge("unknown_field.toml", content, &[]);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn test_invalid_values_surface_as_config_errors() {
        let singular = r#"
            [shape]
            type = "sphere"
            radius = 5.0

            [fill.unit-cell]
            a = [1.0, 0.0, 0.0]
            b = [2.0, 0.0, 0.0]
            c = [0.0, 0.0, 1.0]
        "#;
        assert!(matches!(
            merge("singular.toml", singular, &[]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            merge("bad_target.toml", SPHERE_ONLY, &["--num-molecules", "several"]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            merge("zero_tol.toml", SPHERE_ONLY, &["--tol", "0"]),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_mesh_source_resolves_against_config_dir() {
        let content = r#"
            [shape]
            type = "mesh"
            source = "meshes/vessel.stl"
        "#;
        let settings = merge("mesh.toml", content, &[]).unwrap();
        assert_eq!(
            settings.fill.shape,
            ShapeConfig::Mesh {
                source: TEST_DIR.path().join("meshes/vessel.stl"),
                scale: 1.0
            }
        );
    }
}
