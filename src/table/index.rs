//! Geohash index over the representative points of table rows.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::geohash::GeohashBits;
use crate::table::row::Oid;

/// Statistics collected while building a geohash index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexBuildStats {
    /// Rows visited.
    pub rows_scanned: u64,

    /// Rows added to the index.
    pub rows_indexed: u64,

    /// Rows without a geometry.
    pub rows_without_geometry: u64,

    /// Rows with an empty geometry, or whose representative point lies outside the index
    /// domain.
    pub rows_skipped: u64,

    /// Distinct cells holding at least one row.
    pub cells: u64,
}

/// Rows grouped by the cell of their representative point, at a fixed step.
///
/// Cells are keyed by their left-justified bits, so every descendant of a coarser cell is a
/// contiguous key range.
#[derive(Debug, Clone)]
pub(crate) struct GeohashIndex {
    step: u8,
    cells: BTreeMap<u64, BTreeSet<Oid>>,
    stale: bool,
}

impl GeohashIndex {
    pub fn new(step: u8) -> Self {
        Self {
            step,
            cells: BTreeMap::new(),
            stale: false,
        }
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn insert(&mut self, cell: GeohashBits, oid: Oid) {
        debug_assert_eq!(cell.step(), self.step);
        self.cells.entry(cell.bits()).or_default().insert(oid);
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Every row in `cell` or any of its descendants. A cell finer than the index is widened
    /// to its ancestor at the index step.
    pub fn members(&self, cell: GeohashBits) -> impl Iterator<Item = Oid> + '_ {
        let cell = if cell.step() > self.step {
            cell.truncate(self.step).unwrap_or(cell)
        } else {
            cell
        };
        let (lo, hi) = cell.range();
        self.cells
            .range(lo..=hi)
            .flat_map(|(_, oids)| oids.iter().copied())
    }
}
