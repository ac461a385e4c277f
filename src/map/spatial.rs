use std::collections::HashMap;

use glam::DVec2;

use crate::geo::Bounds;

/// Spatial index over feature bounding boxes.
/// Each feature is inserted into every cell its bbox overlaps, so a query
/// never misses a feature but may return ones that don't actually touch the
/// point (callers follow up with an exact test).
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, p: DVec2) -> (i32, i32) {
        let x = (p.x / self.cell_size).floor() as i32;
        let y = (p.y / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature bounds; the feature index is the iterator position.
    /// Empty bounds are left out of the grid entirely.
    pub fn build<'a>(bounds: impl Iterator<Item = &'a Bounds>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, b) in bounds.enumerate() {
            if b.is_empty() {
                continue;
            }
            let min_cell = grid.to_cell(b.min);
            let max_cell = grid.to_cell(b.max);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Candidate features whose bbox may contain `p`
    pub fn query_point(&self, p: DVec2) -> &[usize] {
        self.cells
            .get(&self.to_cell(p))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append candidate feature indices overlapping `bounds` into `results`.
    /// May contain duplicates; caller should dedup after all queries.
    pub fn query_into(&self, bounds: &Bounds, results: &mut Vec<usize>) {
        if bounds.is_empty() {
            return;
        }
        let min_cell = self.to_cell(bounds.min);
        let max_cell = self.to_cell(bounds.max);
        for y in min_cell.1..=max_cell.1 {
            for x in min_cell.0..=max_cell.0 {
                if let Some(indices) = self.cells.get(&(x, y)) {
                    results.extend_from_slice(indices);
                }
            }
        }
    }
}
