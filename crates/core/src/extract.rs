//! Per-sheet extraction and the summary-sheet title lookup.

use crate::classify::{classify_rows, ClassifiedRows};
use crate::config::ExtractConfig;
use crate::decode::DecodeContext;
use crate::error::ExtractResult;
use crate::labels::ColumnLabels;
use crate::record::{assemble_record, ValueRecord};
use crate::value::{DecodedValue, Number};
use baremes_sheet::{Book, CellRef, DateMode, Sheet};
use indexmap::IndexMap;
use tracing::{debug, info};

/// Column of the summary sheet holding the sheet numbers
const SUMMARY_NUMBER_COLUMN: u32 = 2;
/// Column of the summary sheet holding the linked titles
const SUMMARY_TITLE_COLUMN: u32 = 3;

/// One classified sheet with its column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSheet {
    pub name: String,
    pub rows: ClassifiedRows,
    pub labels: ColumnLabels,
}

impl ExtractedSheet {
    /// Short variable names of the name row, per column
    pub fn names(&self) -> &[Option<String>] {
        &self.rows.names
    }

    /// Assemble and validate every value row.
    pub fn records(&self, config: &ExtractConfig) -> ExtractResult<Vec<ValueRecord>> {
        self.rows
            .values
            .iter()
            .map(|row| assemble_record(&self.name, &self.labels, row, &config.year_cells))
            .collect()
    }

    /// One line per note row, a blank separator when there are notes, then
    /// one line per description row.
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.note_lines();
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(self.description_lines());
        lines
    }

    pub fn note_lines(&self) -> Vec<String> {
        self.rows.notes.iter().map(|row| join_cells(row)).collect()
    }

    pub fn description_lines(&self) -> Vec<String> {
        self.rows.descriptions.iter().map(|row| join_cells(row)).collect()
    }
}

/// Non-empty cells of a text row joined with `" | "`
pub fn join_cells(row: &[Option<String>]) -> String {
    row.iter()
        .flatten()
        .filter(|cell| !cell.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Classify the rows of a sheet and fold its label rows.
pub fn extract_sheet(
    sheet: &Sheet,
    date_mode: DateMode,
    config: &ExtractConfig,
) -> ExtractResult<ExtractedSheet> {
    let ctx = DecodeContext::new(sheet, date_mode);
    let rows = classify_rows(&ctx, config)?;
    let labels = ColumnLabels::build(&rows.labels);
    debug!(
        sheet = sheet.name(),
        labels = rows.labels.len(),
        values = rows.values.len(),
        notes = rows.notes.len(),
        descriptions = rows.descriptions.len(),
        "sheet classified"
    );
    Ok(ExtractedSheet {
        name: sheet.name().to_string(),
        rows,
        labels,
    })
}

/// Map sheet names to their display titles, read from the summary sheets.
///
/// A summary row contributes when its third cell is an integer sheet number
/// and its fourth cell holds a title with an internal hyperlink; the link
/// target names the sheet.
pub fn sheet_titles(book: &Book, config: &ExtractConfig) -> ExtractResult<IndexMap<String, String>> {
    let mut titles = IndexMap::new();
    for sheet in book.sheets().filter(|sheet| config.is_summary_sheet(sheet.name())) {
        let ctx = DecodeContext::new(sheet, book.date_mode());
        for row in 0..ctx.row_count() {
            let number = ctx.read(CellRef::new(row, SUMMARY_NUMBER_COLUMN))?;
            if !matches!(number, DecodedValue::Number(Number::Int(_))) {
                continue;
            }
            let title_cell = CellRef::new(row, SUMMARY_TITLE_COLUMN);
            let Some(title) = ctx.read_text(title_cell)? else {
                continue;
            };
            if let Some(target) = sheet.hyperlink_at(title_cell).and_then(|link| link.target_sheet()) {
                titles.insert(target.to_string(), title);
            }
        }
    }
    info!(workbook = book.name(), titles = titles.len(), "summary titles read");
    Ok(titles)
}

/// Data sheets of a workbook: outline, summary and excluded sheets are left
/// out.
pub fn data_sheets<'a>(book: &'a Book, config: &'a ExtractConfig) -> impl Iterator<Item = &'a Sheet> {
    book.sheets().filter(move |sheet| {
        let name = sheet.name();
        !config.is_skipped_sheet(name)
            && !config.is_summary_sheet(name)
            && !config.is_excluded_sheet(book.name(), name)
    })
}
