use crate::biff::{self, SheetRecords, WorkbookGlobals};
use crate::book::Book;
use crate::cell::{CellRef, CellValue};
use crate::error::{Result, SheetError};
use crate::merge::MergedRegion;
use crate::sheet::Sheet;
use calamine::{open_workbook, CellErrorType, Data, Reader, Xls};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        // calamine only reports DateTime for cells carrying a date format;
        // the serial stays raw until the decoder applies the date mode.
        Data::DateTime(dt) => CellValue::Date(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(error_code(e)),
    }
}

/// BIFF error code of a calamine error cell
fn error_code(err: &CellErrorType) -> u8 {
    match err {
        CellErrorType::Null => 0x00,
        CellErrorType::Div0 => 0x07,
        CellErrorType::Value => 0x0F,
        CellErrorType::Ref => 0x17,
        CellErrorType::Name => 0x1D,
        CellErrorType::Num => 0x24,
        CellErrorType::NA => 0x2A,
        CellErrorType::GettingData => 0x2B,
    }
}

impl Book {
    /// Load every sheet of a legacy Excel 97-2003 (`.xls`, BIFF8) workbook.
    ///
    /// Cell values come from calamine. Number formats, hyperlinks and the
    /// date epoch are recovered by scanning the BIFF records directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is encrypted, or is not
    /// a BIFF8 workbook.
    pub fn from_xls<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let stream = biff::read_workbook_stream(path)?;
        let globals = biff::parse_workbook_globals(&stream)?;
        if globals.encrypted {
            return Err(SheetError::EncryptedWorkbook {
                path: path.display().to_string(),
            });
        }

        let mut workbook: Xls<BufReader<File>> = open_workbook(path)?;
        let sheet_names = workbook.sheet_names().to_owned();

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut book = Book::with_name(&name);
        book.set_date_mode(globals.date_mode);

        for sheet_name in sheet_names {
            let range = workbook.worksheet_range(&sheet_name)?;
            let mut sheet = Sheet::with_name(&sheet_name);

            let (start_row, start_col) = range.start().unwrap_or((0, 0));
            if let Some((end_row, end_col)) = range.end() {
                sheet.ensure_size(end_row as usize + 1, end_col as usize + 1);
            }
            for (row, col, value) in range.used_cells() {
                let cell = CellRef::new(start_row + row as u32, start_col + col as u32);
                sheet.set(cell, data_to_cell_value(value));
            }

            let records = scan_sheet_records(&stream, &globals, &sheet_name);
            match workbook.worksheet_merge_cells(&sheet_name) {
                Some(dimensions) => {
                    for dim in dimensions {
                        sheet.add_merged_region(MergedRegion::from_inclusive(
                            CellRef::new(dim.start.0, dim.start.1),
                            CellRef::new(dim.end.0, dim.end.1),
                        ));
                    }
                }
                None => {
                    for region in &records.merged {
                        sheet.add_merged_region(*region);
                    }
                }
            }
            for (cell, xf) in &records.cell_xf {
                sheet.set_number_format(*cell, globals.format_for_xf(*xf));
            }
            for link in records.hyperlinks {
                sheet.add_hyperlink(link);
            }

            tracing::debug!(
                sheet = %sheet_name,
                rows = sheet.row_count(),
                cols = sheet.col_count(),
                merged = sheet.merged_regions().len(),
                hyperlinks = sheet.hyperlinks().len(),
                "loaded sheet"
            );
            book.add_sheet(&sheet_name, sheet)?;
        }

        tracing::info!(path = %path.display(), sheets = book.sheet_count(), "loaded workbook");
        Ok(book)
    }
}

/// Scan a sheet's BIFF substream; a missing or unreadable substream only
/// loses formatting metadata, never cell values.
fn scan_sheet_records(stream: &[u8], globals: &WorkbookGlobals, sheet_name: &str) -> SheetRecords {
    let Some(bound) = globals.bound_sheet(sheet_name) else {
        tracing::warn!(sheet = %sheet_name, "sheet missing from BOUNDSHEET directory");
        return SheetRecords::default();
    };
    biff::parse_sheet_records(stream, bound.offset).unwrap_or_else(|err| {
        tracing::warn!(sheet = %sheet_name, "failed to scan sheet records: {err}");
        SheetRecords::default()
    })
}
