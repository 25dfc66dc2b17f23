use crate::core::models::atom::AtomRecord;
use crate::core::utils::geometry::{centroid, rotate_about};
use nalgebra::{Quaternion, UnitQuaternion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

/// Draws a rotation uniformly from SO(3) (Shoemake's subgroup algorithm).
pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> UnitQuaternion<f64> {
    let u1: f64 = rng.gen_range(0.0..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let u3: f64 = rng.gen_range(0.0..1.0);

    let (a, b) = ((1.0 - u1).sqrt(), u1.sqrt());
    let (sin2, cos2) = (TAU * u2).sin_cos();
    let (sin3, cos3) = (TAU * u3).sin_cos();

    UnitQuaternion::from_quaternion(Quaternion::new(b * cos3, a * sin2, a * cos2, b * sin3))
}

/// Applies an independent uniform rotation to each copy of a pattern.
#[derive(Debug, Clone)]
pub struct OrientationRandomizer {
    rng: StdRng,
}

impl OrientationRandomizer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns `atoms` rotated as a rigid body about their centroid.
    pub fn randomize(&mut self, atoms: &[AtomRecord]) -> Vec<AtomRecord> {
        let Some(pivot) = centroid(atoms) else {
            return Vec::new();
        };
        let rotation = random_rotation(&mut self.rng);
        rotate_about(atoms, &pivot, &rotation)
    }
}
