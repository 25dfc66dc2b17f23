use crate::core::models::atom::AtomRecord;
use crate::core::shapes::{Cuboid, Mesh, Shape, ShapeError, Sphere};
use nalgebra::{Matrix3, Point3, Vector3};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Determinants below this magnitude mark a unit cell as singular.
const SINGULAR_CELL_EPSILON: f64 = 1e-9;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(
            name,
            format!("must be positive and finite (got {value})"),
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeConfig {
    Box {
        origin: Point3<f64>,
        length: f64,
        height: f64,
        width: f64,
    },
    Sphere {
        center: Point3<f64>,
        radius: f64,
    },
    Mesh {
        source: PathBuf,
        scale: f64,
    },
}

impl ShapeConfig {
    /// Constructs the shape, reading the mesh file if the variant requires one.
    pub fn build(&self) -> Result<Shape, ShapeError> {
        Ok(match self {
            ShapeConfig::Box {
                origin,
                length,
                height,
                width,
            } => Shape::Box(Cuboid::new(*origin, *length, *height, *width)?),
            ShapeConfig::Sphere { center, radius } => Shape::Sphere(Sphere::new(*center, *radius)?),
            ShapeConfig::Mesh { source, scale } => Shape::Mesh(Mesh::load(source, *scale)?),
        })
    }
}

/// How many pattern copies a filler should try to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    Exact(usize),
    /// Place as many copies as the shape admits.
    #[default]
    Unbounded,
}

impl Target {
    #[inline]
    pub fn is_reached(&self, placed: usize) -> bool {
        match self {
            Target::Exact(n) => placed >= *n,
            Target::Unbounded => false,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            Target::Exact(n) => Some(*n),
            Target::Unbounded => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Exact(n) => write!(f, "{n}"),
            Target::Unbounded => f.write_str("fill"),
        }
    }
}

impl FromStr for Target {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("fill") {
            return Ok(Target::Unbounded);
        }
        s.parse::<usize>()
            .map(Target::Exact)
            .map_err(|_| invalid("num_molecules", format!("expected 'fill' or a count, got '{s}'")))
    }
}

/// Three lattice vectors spanning one periodic cell.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCell {
    vectors: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl UnitCell {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if the vectors are not linearly
    /// independent.
    pub fn new(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Result<Self, ConfigError> {
        let vectors = Matrix3::from_columns(&[a, b, c]);
        if !vectors.iter().all(|v| v.is_finite()) {
            return Err(invalid("unit_cell", "lattice vectors must be finite"));
        }
        let determinant = vectors.determinant();
        if determinant.abs() < SINGULAR_CELL_EPSILON {
            return Err(invalid(
                "unit_cell",
                format!("lattice vectors are linearly dependent (determinant {determinant:.3e})"),
            ));
        }
        let inverse = vectors
            .try_inverse()
            .ok_or_else(|| invalid("unit_cell", "lattice matrix is not invertible"))?;
        Ok(Self { vectors, inverse })
    }

    /// An orthorhombic cell with the given edge lengths along x, y and z.
    pub fn orthorhombic(lengths: [f64; 3]) -> Result<Self, ConfigError> {
        for length in lengths {
            require_positive("unit_cell", length)?;
        }
        Self::new(
            Vector3::x() * lengths[0],
            Vector3::y() * lengths[1],
            Vector3::z() * lengths[2],
        )
    }

    pub fn a(&self) -> Vector3<f64> {
        self.vectors.column(0).into_owned()
    }

    pub fn b(&self) -> Vector3<f64> {
        self.vectors.column(1).into_owned()
    }

    pub fn c(&self) -> Vector3<f64> {
        self.vectors.column(2).into_owned()
    }

    /// Cartesian offset of lattice point `(i, j, k)`.
    pub fn lattice_point(&self, i: i64, j: i64, k: i64) -> Vector3<f64> {
        self.vectors * Vector3::new(i as f64, j as f64, k as f64)
    }

    /// Fractional coordinates of a Cartesian offset.
    pub fn fractional(&self, offset: &Vector3<f64>) -> Vector3<f64> {
        self.inverse * offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillConfig {
    pub shape: ShapeConfig,
    pub target: Target,
    pub tol: f64,
    pub spacing: Option<f64>,
    pub rand_fill: bool,
    pub max_attempts: usize,
    pub randomize_orientation: bool,
    pub unit_cell: Option<UnitCell>,
    pub density: Option<f64>,
    pub seed: Option<u64>,
    /// A fixed structure recentered on the shape center before filling; copies are
    /// packed around it.
    pub base: Option<Vec<AtomRecord>>,
}

impl FillConfig {
    /// Lattice step of the grid filler; falls back to `tol` when unset.
    pub fn spacing(&self) -> f64 {
        self.spacing.unwrap_or(self.tol)
    }

    /// Re-checks every numeric constraint enforced by [`FillConfigBuilder::build`].
    ///
    /// Public fields may be edited after building, so the workflow calls this again
    /// before any placement starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("tol", self.tol)?;
        if let Some(spacing) = self.spacing {
            require_positive("spacing", spacing)?;
        }
        if self.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be at least 1"));
        }
        if let Some(density) = self.density {
            require_positive("density", density)?;
        }
        if self.target == Target::Exact(0) {
            return Err(invalid("num_molecules", "must be at least 1"));
        }
        if self.base.as_ref().is_some_and(Vec::is_empty) {
            return Err(invalid("base", "the base structure has no atoms"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FillConfigBuilder {
    shape: Option<ShapeConfig>,
    target: Option<Target>,
    tol: Option<f64>,
    spacing: Option<f64>,
    rand_fill: Option<bool>,
    max_attempts: Option<usize>,
    randomize_orientation: Option<bool>,
    unit_cell: Option<UnitCell>,
    density: Option<f64>,
    seed: Option<u64>,
    base: Option<Vec<AtomRecord>>,
}

impl FillConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(mut self, shape: ShapeConfig) -> Self {
        self.shape = Some(shape);
        self
    }
    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }
    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = Some(tol);
        self
    }
    pub fn spacing(mut self, spacing: f64) -> Self {
        self.spacing = Some(spacing);
        self
    }
    pub fn rand_fill(mut self, enabled: bool) -> Self {
        self.rand_fill = Some(enabled);
        self
    }
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
    pub fn randomize_orientation(mut self, enabled: bool) -> Self {
        self.randomize_orientation = Some(enabled);
        self
    }
    pub fn unit_cell(mut self, cell: UnitCell) -> Self {
        self.unit_cell = Some(cell);
        self
    }
    pub fn density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn base(mut self, records: Vec<AtomRecord>) -> Self {
        self.base = Some(records);
        self
    }

    pub fn build(self) -> Result<FillConfig, ConfigError> {
        let config = FillConfig {
            shape: self.shape.ok_or(ConfigError::MissingParameter("shape"))?,
            target: self.target.unwrap_or_default(),
            tol: self.tol.ok_or(ConfigError::MissingParameter("tol"))?,
            spacing: self.spacing,
            rand_fill: self.rand_fill.unwrap_or(false),
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            randomize_orientation: self.randomize_orientation.unwrap_or(false),
            unit_cell: self.unit_cell,
            density: self.density,
            seed: self.seed,
            base: self.base,
        };
        config.validate()?;
        Ok(config)
    }
}
