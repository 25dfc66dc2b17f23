use super::{ShapeError, Volume, require_positive};
use nalgebra::Point3;
use std::f64::consts::PI;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Winding numbers above this value classify a point as enclosed.
const WINDING_INSIDE_THRESHOLD: f64 = 0.5;
/// Slack applied to the bounding-box prefilter.
const BOUNDS_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f64>; 3],
}

impl Triangle {
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Signed solid angle subtended by this triangle as seen from `point`
    /// (Van Oosterom & Strackee).
    fn solid_angle(&self, point: &Point3<f64>) -> f64 {
        let a = self.vertices[0] - point;
        let b = self.vertices[1] - point;
        let c = self.vertices[2] - point;
        let (la, lb, lc) = (a.norm(), b.norm(), c.norm());

        let numerator = a.dot(&b.cross(&c));
        let denominator = la * lb * lc + a.dot(&b) * lc + b.dot(&c) * la + c.dot(&a) * lb;
        2.0 * numerator.atan2(denominator)
    }

    /// Contribution of this face to the enclosed volume (divergence theorem).
    fn signed_volume(&self) -> f64 {
        let [a, b, c] = self.vertices.map(|v| v.coords);
        a.dot(&b.cross(&c)) / 6.0
    }
}

/// A closed triangulated surface treated as a solid volume.
///
/// Containment is decided with the generalized winding number, which tolerates
/// inconsistent face orientation and small gaps better than ray parity. Vertices
/// are stored already scaled.
#[derive(Debug, Clone)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    min: Point3<f64>,
    max: Point3<f64>,
    volume: f64,
}

impl Mesh {
    /// Builds a mesh volume from in-memory triangles.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::EmptyMesh`] if `triangles` is empty and
    /// [`ShapeError::DegenerateMesh`] if the surface encloses no volume.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Result<Self, ShapeError> {
        if triangles.is_empty() {
            return Err(ShapeError::EmptyMesh);
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for vertex in triangles.iter().flat_map(|t| t.vertices.iter()) {
            min = min.inf(vertex);
            max = max.sup(vertex);
        }

        let signed: f64 = triangles.iter().map(Triangle::signed_volume).sum();
        let volume = signed.abs();
        if !volume.is_finite() || volume <= f64::EPSILON {
            return Err(ShapeError::DegenerateMesh { volume: signed });
        }

        Ok(Self {
            triangles,
            min,
            max,
            volume,
        })
    }

    /// Loads an STL surface (ASCII or binary) and scales every vertex by `scale`
    /// about the coordinate origin.
    pub fn load(path: &Path, scale: f64) -> Result<Self, ShapeError> {
        let scale = require_positive("mesh_scale", scale)?;
        let io_error = |source| ShapeError::MeshIo {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_error)?;
        let mut reader = BufReader::new(file);
        let stl = stl_io::read_stl(&mut reader).map_err(io_error)?;

        let vertex = |index: usize| {
            let v = &stl.vertices[index];
            Point3::new(
                f64::from(v[0]) * scale,
                f64::from(v[1]) * scale,
                f64::from(v[2]) * scale,
            )
        };
        let triangles: Vec<Triangle> = stl
            .faces
            .iter()
            .map(|face| {
                Triangle::new(
                    vertex(face.vertices[0]),
                    vertex(face.vertices[1]),
                    vertex(face.vertices[2]),
                )
            })
            .collect();

        debug!(
            path = %path.display(),
            triangles = triangles.len(),
            scale,
            "Loaded mesh surface."
        );
        Self::from_triangles(triangles)
    }

    /// Winding number of the surface around `point`; ±1 inside, 0 outside.
    pub fn winding_number(&self, point: &Point3<f64>) -> f64 {
        let total: f64 = self.triangles.iter().map(|t| t.solid_angle(point)).sum();
        total / (4.0 * PI)
    }

    fn within_bounds(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|axis| {
            point[axis] >= self.min[axis] - BOUNDS_EPSILON
                && point[axis] <= self.max[axis] + BOUNDS_EPSILON
        })
    }
}

impl Volume for Mesh {
    fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        (self.min, self.max)
    }

    fn is_inside(&self, point: &Point3<f64>) -> bool {
        self.within_bounds(point) && self.winding_number(point).abs() > WINDING_INSIDE_THRESHOLD
    }

    fn left_corner(&self) -> Point3<f64> {
        self.min
    }

    fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Twelve outward-facing triangles of the cube `[0, size]^3`.
#[cfg(test)]
pub(crate) fn cube_triangles(size: f64) -> Vec<Triangle> {
    let p = |x: f64, y: f64, z: f64| Point3::new(x * size, y * size, z * size);
    let faces = [
        [(0., 0., 0.), (0., 1., 0.), (1., 1., 0.)],
        [(0., 0., 0.), (1., 1., 0.), (1., 0., 0.)],
        [(0., 0., 1.), (1., 0., 1.), (1., 1., 1.)],
        [(0., 0., 1.), (1., 1., 1.), (0., 1., 1.)],
        [(0., 0., 0.), (1., 0., 0.), (1., 0., 1.)],
        [(0., 0., 0.), (1., 0., 1.), (0., 0., 1.)],
        [(0., 1., 0.), (0., 1., 1.), (1., 1., 1.)],
        [(0., 1., 0.), (1., 1., 1.), (1., 1., 0.)],
        [(0., 0., 0.), (0., 0., 1.), (0., 1., 1.)],
        [(0., 0., 0.), (0., 1., 1.), (0., 1., 0.)],
        [(1., 0., 0.), (1., 1., 0.), (1., 1., 1.)],
        [(1., 0., 0.), (1., 1., 1.), (1., 0., 1.)],
    ];
    faces
        .iter()
        .map(|[a, b, c]| Triangle::new(p(a.0, a.1, a.2), p(b.0, b.1, b.2), p(c.0, c.1, c.2)))
        .collect()
}
