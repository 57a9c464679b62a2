//! Cell Decoder: raw cells to typed semantic values.

use crate::dates::format_date_serial;
use crate::error::{ExtractError, ExtractResult};
use crate::value::{DecodedValue, Number, Unit};
use baremes_sheet::{CellRef, CellValue, DateMode, MergeResolver, Sheet};
use std::fmt;

/// Number format of the few currency cells formatted with a grouped,
/// euro-suffixed layout that still hold bare numbers.
const GROUPED_PLAIN_FORMAT: &str = r"_-* #,##0\ _€_-;\-* #,##0\ _€_-;_-* \-??\ _€_-;_-@_-";

const PLAIN_FORMATS: &[&str] = &["0", "General", "GENERAL", "#,##0", GROUPED_PLAIN_FORMAT];

/// What a number format makes of a numeric cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    Plain,
    Amount(Unit),
}

/// Classify a number-format string, `None` when it is not recognized.
pub fn classify_number_format(format: &str) -> Option<NumberFormat> {
    if PLAIN_FORMATS.contains(&format) || format.ends_with("0.00") {
        Some(NumberFormat::Plain)
    } else if format.contains('€') {
        Some(NumberFormat::Amount(Unit::Eur))
    } else if format.contains("FRF") || format.contains(r"\F\R\F") {
        Some(NumberFormat::Amount(Unit::Frf))
    } else if format.ends_with('%') {
        Some(NumberFormat::Amount(Unit::Percent))
    } else {
        None
    }
}

/// Symbolic name of a BIFF error code
pub fn error_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0x00 => "#NULL!",
        0x07 => "#DIV/0!",
        0x0F => "#VALUE!",
        0x17 => "#REF!",
        0x1D => "#NAME?",
        0x24 => "#NUM!",
        0x2A => "#N/A",
        0x2B => "#GETTING_DATA",
        _ => return None,
    })
}

/// Sheet-qualified cell address used in diagnostics, e.g. `CSG!B12`
#[derive(Debug, Clone, Copy)]
pub struct CellAddress<'a> {
    pub sheet: &'a str,
    pub cell: CellRef,
}

impl fmt::Display for CellAddress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, self.cell)
    }
}

/// Decode one raw cell.
///
/// `format` only matters for numeric cells; `address` only feeds error
/// messages.
pub fn decode_value(
    raw: &CellValue,
    format: &str,
    date_mode: DateMode,
    address: CellAddress<'_>,
) -> ExtractResult<DecodedValue> {
    Ok(match raw {
        CellValue::Empty => DecodedValue::Null,
        CellValue::Text(s) if s.is_empty() => DecodedValue::Null,
        CellValue::Text(s) => DecodedValue::Text(s.clone()),
        CellValue::Boolean(b) => DecodedValue::Boolean(*b),
        CellValue::Error(code) => {
            let name = error_name(*code).ok_or_else(|| ExtractError::UnknownErrorCode {
                cell: address.to_string(),
                code: *code,
            })?;
            DecodedValue::Error(name)
        }
        CellValue::Date(serial) => {
            format_date_serial(*serial, date_mode).map_or(DecodedValue::Null, DecodedValue::Date)
        }
        CellValue::Number(n) => {
            let value = Number::from_f64(*n);
            match classify_number_format(format) {
                Some(NumberFormat::Plain) => DecodedValue::Number(value),
                Some(NumberFormat::Amount(unit)) => DecodedValue::Amount { value, unit },
                None => {
                    return Err(ExtractError::UnknownNumberFormat {
                        cell: address.to_string(),
                        format: format.to_string(),
                        value: value.to_string(),
                    })
                }
            }
        }
    })
}

/// Read-only context for decoding the cells of one sheet.
///
/// Every read goes through the sheet's merge anchors, so all cells of a
/// merged region decode to the anchor's value.
pub struct DecodeContext<'a> {
    sheet: &'a Sheet,
    resolver: MergeResolver,
    date_mode: DateMode,
}

impl<'a> DecodeContext<'a> {
    pub fn new(sheet: &'a Sheet, date_mode: DateMode) -> Self {
        Self {
            sheet,
            resolver: sheet.merge_resolver(),
            date_mode,
        }
    }

    pub fn sheet(&self) -> &'a Sheet {
        self.sheet
    }

    pub fn sheet_name(&self) -> &'a str {
        self.sheet.name()
    }

    pub fn address(&self, cell: CellRef) -> CellAddress<'a> {
        CellAddress {
            sheet: self.sheet.name(),
            cell,
        }
    }

    /// Number format of a cell, falling back to its merge anchor, then `General`
    pub fn number_format(&self, cell: CellRef) -> &'a str {
        self.sheet
            .number_format(cell)
            .or_else(|| self.sheet.number_format(self.resolver.resolve(cell)))
            .unwrap_or("General")
    }

    /// Decode a cell through its merge anchor.
    pub fn read(&self, cell: CellRef) -> ExtractResult<DecodedValue> {
        let anchor = self.resolver.resolve(cell);
        decode_value(
            self.sheet.get(anchor),
            self.number_format(cell),
            self.date_mode,
            self.address(cell),
        )
    }

    /// Read a cell as text: numbers, amounts and dates are rendered, null
    /// stays `None`, booleans and error markers are rejected.
    pub fn read_text(&self, cell: CellRef) -> ExtractResult<Option<String>> {
        match self.read(cell)? {
            DecodedValue::Null => Ok(None),
            DecodedValue::Text(s) | DecodedValue::Date(s) => Ok(Some(s)),
            value @ (DecodedValue::Number(_) | DecodedValue::Amount { .. }) => {
                Ok(Some(value.to_string()))
            }
            value @ (DecodedValue::Boolean(_) | DecodedValue::Error(_)) => {
                Err(ExtractError::ExpectedText {
                    cell: self.address(cell).to_string(),
                    found: format!("{} {value}", value.kind()),
                })
            }
        }
    }

    /// Decode every cell of a row
    pub fn read_row(&self, row: u32) -> ExtractResult<Vec<DecodedValue>> {
        (0..self.column_count())
            .map(|col| self.read(CellRef::new(row, col)))
            .collect()
    }

    /// Read every cell of a row as text
    pub fn read_text_row(&self, row: u32) -> ExtractResult<Vec<Option<String>>> {
        (0..self.column_count())
            .map(|col| self.read_text(CellRef::new(row, col)))
            .collect()
    }

    pub fn row_count(&self) -> u32 {
        self.sheet.row_count() as u32
    }

    pub fn column_count(&self) -> u32 {
        self.sheet.col_count() as u32
    }
}
