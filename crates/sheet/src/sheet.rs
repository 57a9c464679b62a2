use crate::cell::{CellRef, CellValue};
use crate::hyperlink::Hyperlink;
use crate::merge::{MergeResolver, MergedRegion};
use std::collections::HashMap;

/// A sheet representing a 2D grid of raw cells (row-major storage)
/// together with its formatting metadata.
///
/// Rows are kept padded to the same length, so every row of a sheet reports
/// [`col_count`](Sheet::col_count) cells.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
    merged_regions: Vec<MergedRegion>,
    number_formats: HashMap<CellRef, String>,
    hyperlinks: Vec<Hyperlink>,
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
            merged_regions: Vec::new(),
            number_formats: HashMap::new(),
            hyperlinks: Vec::new(),
        }
    }

    /// Create a sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let mut sheet = Sheet::new();
        sheet.data = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        sheet.pad_rows();
        sheet
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    /// Get a cell; cells outside the grid read as [`CellValue::Empty`]
    #[must_use]
    pub fn get(&self, cell: CellRef) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.data
            .get(cell.row as usize)
            .and_then(|row| row.get(cell.col as usize))
            .unwrap_or(EMPTY)
    }

    /// Set a cell, growing the grid as needed
    pub fn set(&mut self, cell: CellRef, value: CellValue) {
        self.ensure_size(cell.row as usize + 1, cell.col as usize + 1);
        self.data[cell.row as usize][cell.col as usize] = value;
    }

    /// Grow the grid to at least `rows` x `cols`, padding with empty cells
    pub fn ensure_size(&mut self, rows: usize, cols: usize) {
        let cols = cols.max(self.col_count());
        if self.data.len() < rows {
            self.data.resize_with(rows, Vec::new);
        }
        for row in &mut self.data {
            if row.len() < cols {
                row.resize(cols, CellValue::Empty);
            }
        }
    }

    fn pad_rows(&mut self) {
        let cols = self.data.iter().map(Vec::len).max().unwrap_or(0);
        let rows = self.data.len();
        self.ensure_size(rows, cols);
    }

    // ===== Merged Regions =====

    /// Merged regions, in the order they were declared
    #[must_use]
    pub fn merged_regions(&self) -> &[MergedRegion] {
        &self.merged_regions
    }

    pub fn add_merged_region(&mut self, region: MergedRegion) {
        self.merged_regions.push(region);
    }

    /// Build the anchor lookup for this sheet's merged regions
    #[must_use]
    pub fn merge_resolver(&self) -> MergeResolver {
        MergeResolver::new(&self.merged_regions)
    }

    // ===== Number Formats =====

    /// Number-format string recorded for a cell, if any
    #[must_use]
    pub fn number_format(&self, cell: CellRef) -> Option<&str> {
        self.number_formats.get(&cell).map(String::as_str)
    }

    pub fn set_number_format(&mut self, cell: CellRef, format: &str) {
        self.number_formats.insert(cell, format.to_string());
    }

    // ===== Hyperlinks =====

    #[must_use]
    pub fn hyperlinks(&self) -> &[Hyperlink] {
        &self.hyperlinks
    }

    pub fn add_hyperlink(&mut self, hyperlink: Hyperlink) {
        self.hyperlinks.push(hyperlink);
    }

    /// Hyperlink covering a cell; the last declared link wins on overlap
    #[must_use]
    pub fn hyperlink_at(&self, cell: CellRef) -> Option<&Hyperlink> {
        self.hyperlinks.iter().rev().find(|link| link.covers(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyperlink::HyperlinkTarget;

    #[test]
    fn test_from_data_pads_rows() {
        let sheet = Sheet::from_data(vec![vec!["a"], vec!["b", "c", "d"]]);
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.col_count(), 3);
        assert_eq!(sheet.get(CellRef::new(0, 1)), &CellValue::Empty);
        assert_eq!(sheet.get(CellRef::new(0, 2)), &CellValue::Empty);
    }

    #[test]
    fn test_get_outside_grid_is_empty() {
        let sheet = Sheet::from_data(vec![vec![1]]);
        assert_eq!(sheet.get(CellRef::new(5, 5)), &CellValue::Empty);
    }

    #[test]
    fn test_set_grows_grid() {
        let mut sheet = Sheet::with_name("CSG");
        sheet.set(CellRef::new(2, 1), CellValue::Number(0.075));
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.col_count(), 2);
        assert_eq!(sheet.get(CellRef::new(2, 1)), &CellValue::Number(0.075));
        assert_eq!(sheet.get(CellRef::new(0, 1)), &CellValue::Empty);
    }

    #[test]
    fn test_number_format_lookup() {
        let mut sheet = Sheet::new();
        sheet.set_number_format(CellRef::new(1, 1), "0.00%");
        assert_eq!(sheet.number_format(CellRef::new(1, 1)), Some("0.00%"));
        assert_eq!(sheet.number_format(CellRef::new(0, 0)), None);
    }

    #[test]
    fn test_hyperlink_at_last_wins() {
        let mut sheet = Sheet::new();
        for location in ["First!A1", "Second!A1"] {
            sheet.add_hyperlink(Hyperlink {
                first: CellRef::new(0, 0),
                last: CellRef::new(0, 3),
                target: HyperlinkTarget::Workbook {
                    location: location.to_string(),
                },
                display: None,
            });
        }
        let link = sheet.hyperlink_at(CellRef::new(0, 2)).unwrap();
        assert_eq!(link.target_sheet(), Some("Second"));
        assert!(sheet.hyperlink_at(CellRef::new(1, 0)).is_none());
    }
}
