use crate::core::models::atom::AtomRecord;
use nalgebra::{Point3, UnitQuaternion};

/// Unweighted mean position of `atoms`, or `None` for an empty slice.
pub fn centroid(atoms: &[AtomRecord]) -> Option<Point3<f64>> {
    if atoms.is_empty() {
        return None;
    }
    let sum = atoms
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, atom| acc + atom.position.coords);
    Some(Point3::from(sum / atoms.len() as f64))
}

/// Rotates every atom's offset from `pivot` by `rotation`, keeping order, types and tags.
pub fn rotate_about(
    atoms: &[AtomRecord],
    pivot: &Point3<f64>,
    rotation: &UnitQuaternion<f64>,
) -> Vec<AtomRecord> {
    atoms
        .iter()
        .map(|atom| atom.moved_to(pivot + rotation * (atom.position - pivot)))
        .collect()
}

/// Translates `atoms` rigidly so their centroid lands on `center`.
pub fn recentered(atoms: &[AtomRecord], center: &Point3<f64>) -> Vec<AtomRecord> {
    match centroid(atoms) {
        Some(current) => {
            let shift = center - current;
            atoms.iter().map(|atom| atom.translated(&shift)).collect()
        }
        None => Vec::new(),
    }
}

/// Number of lattice points along one axis of the half-open range `[min, max)`.
pub fn axis_steps(min: f64, max: f64, spacing: f64) -> usize {
    let span = max - min;
    if span <= 0.0 || spacing <= 0.0 {
        return 0;
    }
    (span / spacing).ceil() as usize
}
