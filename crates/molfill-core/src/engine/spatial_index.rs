use nalgebra::Point3;
use std::collections::HashMap;

const NONE: usize = usize::MAX;
const MIN_CELL_SIZE: f64 = 1e-6;

type CellKey = (i64, i64, i64);

/// A uniform grid of cubic cells with intrusive per-cell linked lists.
///
/// Each cell stores the index of its most recently inserted entry and `next` chains
/// the remaining entries of that cell. Any two points closer than the cell edge lie
/// in the same or adjacent cells, so a neighbour query visits at most 27 cells.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell: f64,
    heads: HashMap<CellKey, usize>,
    next: Vec<usize>,
}

impl SpatialIndex {
    pub fn new(cell: f64) -> Self {
        let cell = if cell.is_finite() {
            cell.max(MIN_CELL_SIZE)
        } else {
            MIN_CELL_SIZE
        };
        Self {
            cell,
            heads: HashMap::new(),
            next: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell
    }

    fn cell_key(&self, p: &Point3<f64>) -> CellKey {
        (
            (p.x / self.cell).floor() as i64,
            (p.y / self.cell).floor() as i64,
            (p.z / self.cell).floor() as i64,
        )
    }

    /// Registers entry `idx` at `pos`. Indices are expected to be dense.
    pub fn insert(&mut self, idx: usize, pos: &Point3<f64>) {
        let key = self.cell_key(pos);
        if idx >= self.next.len() {
            self.next.resize(idx + 1, NONE);
        }
        let head = self.heads.entry(key).or_insert(NONE);
        self.next[idx] = *head;
        *head = idx;
    }

    /// Calls `f` on every entry in the 27 cells around `pos` until it returns `true`.
    /// Returns whether any call did.
    pub fn any_neighbor<F>(&self, pos: &Point3<f64>, mut f: F) -> bool
    where
        F: FnMut(usize) -> bool,
    {
        let (ix, iy, iz) = self.cell_key(pos);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(&head) = self.heads.get(&(ix + dx, iy + dy, iz + dz)) {
                        let mut idx = head;
                        while idx != NONE {
                            if f(idx) {
                                return true;
                            }
                            idx = self.next[idx];
                        }
                    }
                }
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }
}
