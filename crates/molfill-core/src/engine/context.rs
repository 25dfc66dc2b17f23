use super::overlap::OverlapDetector;
use super::progress::ProgressReporter;
use crate::core::models::atom::AtomRecord;
use crate::core::models::pattern::Pattern;
use crate::core::shapes::Shape;
use crate::core::tables::RadiusTable;

/// Read-only inputs shared by every placement task of one run.
#[derive(Clone, Copy)]
pub struct FillContext<'a> {
    pub shape: &'a Shape,
    pub pattern: &'a Pattern,
    pub radii: &'a RadiusTable,
    pub tol: f64,
    pub reporter: &'a ProgressReporter<'a>,
    /// Fixed atoms in world coordinates that every copy must clear. Empty if none.
    pub base: &'a [AtomRecord],
}

impl<'a> FillContext<'a> {
    pub fn new(
        shape: &'a Shape,
        pattern: &'a Pattern,
        radii: &'a RadiusTable,
        tol: f64,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            shape,
            pattern,
            radii,
            tol,
            reporter,
            base: &[],
        }
    }

    pub fn with_base(mut self, base: &'a [AtomRecord]) -> Self {
        self.base = base;
        self
    }

    /// Largest radius among the pattern's and the base's atom types.
    pub fn max_radius(&self) -> f64 {
        let base_types = self.base.iter().map(|atom| atom.atom_type.as_str());
        self.radii
            .max_over(self.pattern.atom_types().chain(base_types))
            .unwrap_or(0.0)
    }

    /// A detector sized for this run, already holding the base atoms.
    pub fn detector(&self) -> OverlapDetector<'a> {
        let mut detector = OverlapDetector::new(self.radii, self.tol, self.max_radius());
        detector.insert(self.base);
        detector
    }
}
