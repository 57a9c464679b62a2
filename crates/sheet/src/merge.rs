//! Merged cell regions and anchor resolution.

use crate::cell::CellRef;
use std::collections::HashMap;

/// A merged rectangular region, given as half-open row and column ranges
/// (`row_low..row_high`, `col_low..col_high`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergedRegion {
    pub row_low: u32,
    pub row_high: u32,
    pub col_low: u32,
    pub col_high: u32,
}

impl MergedRegion {
    #[must_use]
    pub const fn new(row_low: u32, row_high: u32, col_low: u32, col_high: u32) -> Self {
        Self {
            row_low,
            row_high,
            col_low,
            col_high,
        }
    }

    /// Build a region from inclusive first/last coordinates, as stored in
    /// `MERGEDCELLS` records.
    #[must_use]
    pub fn from_inclusive(first: CellRef, last: CellRef) -> Self {
        Self::new(
            first.row,
            last.row.saturating_add(1),
            first.col,
            last.col.saturating_add(1),
        )
    }

    /// Top-left cell of the region
    #[must_use]
    pub const fn anchor(&self) -> CellRef {
        CellRef::new(self.row_low, self.col_low)
    }

    #[must_use]
    pub fn contains(&self, cell: CellRef) -> bool {
        (self.row_low..self.row_high).contains(&cell.row)
            && (self.col_low..self.col_high).contains(&cell.col)
    }
}

/// Maps every cell covered by a merged region to that region's anchor.
///
/// Cells outside any region resolve to themselves, so resolving is
/// idempotent: `resolve(resolve(c)) == resolve(c)`.
#[derive(Debug, Clone, Default)]
pub struct MergeResolver {
    anchors: HashMap<CellRef, CellRef>,
}

impl MergeResolver {
    #[must_use]
    pub fn new(regions: &[MergedRegion]) -> Self {
        let mut anchors = HashMap::new();
        // Later regions win when regions overlap.
        for region in regions {
            let anchor = region.anchor();
            for row in region.row_low..region.row_high {
                for col in region.col_low..region.col_high {
                    anchors.insert(CellRef::new(row, col), anchor);
                }
            }
        }
        Self { anchors }
    }

    #[must_use]
    pub fn resolve(&self, cell: CellRef) -> CellRef {
        self.anchors.get(&cell).copied().unwrap_or(cell)
    }

    /// Number of cells covered by merged regions
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
