use super::{ShapeError, Volume, require_positive};
use nalgebra::{Point3, Vector3};

/// An axis-aligned box spanning `origin` to `origin + (length, height, width)`.
///
/// Length runs along x, height along y and width along z. Containment is half-open,
/// so a point on the far faces belongs to the neighbouring box, not this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    origin: Point3<f64>,
    dims: Vector3<f64>,
}

impl Cuboid {
    pub fn new(origin: Point3<f64>, length: f64, height: f64, width: f64) -> Result<Self, ShapeError> {
        let dims = Vector3::new(
            require_positive("length", length)?,
            require_positive("height", height)?,
            require_positive("width", width)?,
        );
        Ok(Self { origin, dims })
    }

    pub fn at_origin(length: f64, height: f64, width: f64) -> Result<Self, ShapeError> {
        Self::new(Point3::origin(), length, height, width)
    }

    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    pub fn dimensions(&self) -> Vector3<f64> {
        self.dims
    }
}

impl Volume for Cuboid {
    fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        (self.origin, self.origin + self.dims)
    }

    fn is_inside(&self, point: &Point3<f64>) -> bool {
        let far = self.origin + self.dims;
        (0..3).all(|axis| point[axis] >= self.origin[axis] && point[axis] < far[axis])
    }

    fn left_corner(&self) -> Point3<f64> {
        self.origin
    }

    fn center(&self) -> Point3<f64> {
        self.origin + self.dims * 0.5
    }

    fn volume(&self) -> f64 {
        self.dims.x * self.dims.y * self.dims.z
    }
}
