use std::collections::HashMap;

use glam::DVec2;
use rayon::prelude::*;

use crate::alloc::{Allocation, Child};
use crate::geo::{Bounds, Shape};
use crate::map::FeatureGrid;

/// Grid cell size in degrees for state hit-testing
const STATE_CELL_DEGREES: f64 = 2.0;

/// A state or county with its geometry
#[derive(Clone, Debug)]
pub struct Region {
    /// State name, or 5-digit county FIPS code
    pub id: String,
    pub name: String,
    pub shape: Shape,
    pub bounds: Bounds,
}

impl Region {
    pub fn new(id: impl Into<String>, name: impl Into<String>, shape: Shape) -> Self {
        let bounds = shape.bounds();
        Self {
            id: id.into(),
            name: name.into(),
            shape,
            bounds,
        }
    }

    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        self.bounds.contains(p) && self.shape.contains(p)
    }
}

/// Planar area weights keyed by region id. Built once, never mutated.
#[derive(Clone, Debug, Default)]
pub struct WeightTable(HashMap<String, f64>);

impl WeightTable {
    pub fn compute(regions: &[Region]) -> Self {
        Self(
            regions
                .par_iter()
                .map(|r| (r.id.clone(), r.shape.area()))
                .collect(),
        )
    }

    /// Unknown ids weigh nothing
    pub fn get(&self, id: &str) -> f64 {
        self.0.get(id).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Render-facing county estimates. Every selection overwrites the counties
/// it touches; counties never allocated read as zero.
#[derive(Clone, Debug, Default)]
pub struct Estimates(HashMap<String, u64>);

impl Estimates {
    pub fn merge(&mut self, shares: Allocation) {
        self.0.extend(shares);
    }

    pub fn get(&self, id: &str) -> u64 {
        self.0.get(id).copied().unwrap_or(0)
    }

    /// Sum of the estimates for the given ids
    pub fn total<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> u64 {
        ids.into_iter().map(|id| self.get(id)).sum()
    }
}

/// All states and counties loaded for the session
pub struct Atlas {
    states: Vec<Region>,
    counties: Vec<Region>,
    weights: WeightTable,
    state_grid: FeatureGrid,
}

impl Atlas {
    /// Index states for hit-testing and compute county weights
    pub fn new(states: Vec<Region>, counties: Vec<Region>) -> Self {
        let weights = WeightTable::compute(&counties);
        let state_grid = FeatureGrid::build(states.iter().map(|s| &s.bounds), STATE_CELL_DEGREES);
        Self {
            states,
            counties,
            weights,
            state_grid,
        }
    }

    pub fn states(&self) -> &[Region] {
        &self.states
    }

    pub fn counties(&self) -> &[Region] {
        &self.counties
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn has_counties(&self) -> bool {
        !self.counties.is_empty()
    }

    /// Indices of the counties whose FIPS code starts with `state_fips`,
    /// in load order
    pub fn counties_of(&self, state_fips: &str) -> Vec<usize> {
        if state_fips.is_empty() {
            return Vec::new();
        }
        self.counties
            .iter()
            .enumerate()
            .filter(|(_, c)| c.id.starts_with(state_fips))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Allocator input for a group of counties
    pub fn children(&self, counties: &[usize]) -> Vec<Child<'_>> {
        counties
            .iter()
            .filter_map(|&idx| self.counties.get(idx))
            .map(|c| Child {
                id: &c.id,
                weight: self.weights.get(&c.id),
            })
            .collect()
    }

    /// State under a lon/lat point
    pub fn state_at(&self, p: DVec2) -> Option<usize> {
        self.state_grid
            .query_point(p)
            .iter()
            .copied()
            .find(|&idx| self.states[idx].contains(p))
    }

    /// County under a lon/lat point, searching only `among`
    pub fn county_at(&self, p: DVec2, among: &[usize]) -> Option<usize> {
        among
            .iter()
            .copied()
            .find(|&idx| self.counties.get(idx).is_some_and(|c| c.contains(p)))
    }

    /// States whose bbox may overlap `view`, sorted and deduplicated
    pub fn states_in(&self, view: &Bounds) -> Vec<usize> {
        let mut hits = Vec::new();
        self.state_grid.query_into(view, &mut hits);
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Bounds covering every state
    pub fn bounds(&self) -> Bounds {
        self.states
            .iter()
            .fold(Bounds::EMPTY, |acc, s| acc.union(&s.bounds))
    }
}
