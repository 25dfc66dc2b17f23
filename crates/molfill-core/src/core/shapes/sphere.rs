use super::{ShapeError, Volume, require_positive};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    center: Point3<f64>,
    radius: f64,
}

impl Sphere {
    pub fn new(center: Point3<f64>, radius: f64) -> Result<Self, ShapeError> {
        Ok(Self {
            center,
            radius: require_positive("radius", radius)?,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Volume for Sphere {
    fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        let half = Vector3::repeat(self.radius);
        (self.center - half, self.center + half)
    }

    fn is_inside(&self, point: &Point3<f64>) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }

    fn left_corner(&self) -> Point3<f64> {
        self.center - Vector3::repeat(self.radius)
    }

    fn center(&self) -> Point3<f64> {
        self.center
    }

    fn volume(&self) -> f64 {
        4.0 / 3.0 * PI * self.radius.powi(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_points_are_inside() {
        let sphere = Sphere::new(Point3::origin(), 5.0).unwrap();
        assert!(sphere.is_inside(&Point3::new(5.0, 0.0, 0.0)));
        assert!(sphere.is_inside(&Point3::new(0.0, -3.0, 4.0)));
        assert!(!sphere.is_inside(&Point3::new(5.0, 0.1, 0.0)));
        assert!(!sphere.is_inside(&Point3::new(-5.0, -5.0, -5.0)));
    }

    #[test]
    fn bounds_and_corner_enclose_the_sphere() {
        let sphere = Sphere::new(Point3::new(1.0, 2.0, 3.0), 2.0).unwrap();
        let (min, max) = sphere.bounds();

        assert_eq!(min, Point3::new(-1.0, 0.0, 1.0));
        assert_eq!(max, Point3::new(3.0, 4.0, 5.0));
        assert_eq!(sphere.left_corner(), min);
        assert_eq!(sphere.center(), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn volume_matches_closed_form() {
        let sphere = Sphere::new(Point3::origin(), 3.0).unwrap();
        assert!((sphere.volume() - 36.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        assert!(Sphere::new(Point3::origin(), 0.0).is_err());
        assert!(Sphere::new(Point3::origin(), -1.0).is_err());
    }
}
