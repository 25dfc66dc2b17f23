//! Geometric volumes that placements are confined to.
//!
//! Every shape implements [`Volume`], which is the only view the fillers have of the
//! region being packed. [`Shape`] is the closed set of supported volumes and forwards
//! the trait to the concrete type.

pub mod cuboid;
pub mod mesh;
pub mod sphere;

pub use cuboid::Cuboid;
pub use mesh::{Mesh, Triangle};
pub use sphere::Sphere;

use crate::core::models::atom::AtomRecord;
use nalgebra::Point3;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("Shape parameter '{name}' must be positive and finite (got {value})")]
    InvalidDimension { name: &'static str, value: f64 },
    #[error("Mesh contains no triangles")]
    EmptyMesh,
    #[error("Mesh encloses no volume (signed volume {volume:.3e}); is the surface closed?")]
    DegenerateMesh { volume: f64 },
    #[error("Failed to read mesh '{path}': {source}", path = path.display())]
    MeshIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The contract every packable region satisfies.
///
/// `is_inside` and `volume` must agree with `bounds`: no point outside the bounding box
/// is ever inside, and the volume never exceeds the bounding-box volume.
pub trait Volume {
    /// Axis-aligned box `(min, max)` enclosing the shape.
    fn bounds(&self) -> (Point3<f64>, Point3<f64>);

    fn is_inside(&self, point: &Point3<f64>) -> bool;

    /// Anchor point that patterns are translated to before placement.
    fn left_corner(&self) -> Point3<f64>;

    fn center(&self) -> Point3<f64>;

    /// Geometric volume in cubic Angstroms.
    fn volume(&self) -> f64;

    /// Returns true if every atom of `atoms` lies inside the shape.
    fn contains_all(&self, atoms: &[AtomRecord]) -> bool {
        atoms.iter().all(|atom| self.is_inside(&atom.position))
    }
}

#[derive(Debug, Clone)]
pub enum Shape {
    Box(Cuboid),
    Sphere(Sphere),
    Mesh(Mesh),
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Box(_) => "box",
            Shape::Sphere(_) => "sphere",
            Shape::Mesh(_) => "mesh",
        }
    }

    fn as_volume(&self) -> &dyn Volume {
        match self {
            Shape::Box(b) => b,
            Shape::Sphere(s) => s,
            Shape::Mesh(m) => m,
        }
    }
}

impl Volume for Shape {
    fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        self.as_volume().bounds()
    }

    fn is_inside(&self, point: &Point3<f64>) -> bool {
        self.as_volume().is_inside(point)
    }

    fn left_corner(&self) -> Point3<f64> {
        self.as_volume().left_corner()
    }

    fn center(&self) -> Point3<f64> {
        self.as_volume().center()
    }

    fn volume(&self) -> f64 {
        self.as_volume().volume()
    }
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, ShapeError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ShapeError::InvalidDimension { name, value })
    }
}
