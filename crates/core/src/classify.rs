//! Row Classifier: assigns every row of a sheet to one semantic role.

use crate::config::ExtractConfig;
use crate::dates::{parse_date_or_year, DateCell};
use crate::decode::DecodeContext;
use crate::error::{ExtractError, ExtractResult};
use crate::value::{DecodedValue, Number};
use baremes_sheet::CellRef;
use chrono::{Datelike, NaiveDate};

/// Scan state. States only ever move forward, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RowState {
    Names,
    Labels,
    Values,
    Notes,
    Description,
}

impl RowState {
    fn next(self) -> Self {
        match self {
            RowState::Names => RowState::Labels,
            RowState::Labels => RowState::Values,
            RowState::Values => RowState::Notes,
            RowState::Notes | RowState::Description => RowState::Description,
        }
    }
}

/// A chronological data row
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRow {
    /// Zero-based sheet row
    pub row: u32,
    /// Date read from the first cell
    pub date: NaiveDate,
    pub cells: Vec<DecodedValue>,
}

/// Rows of one sheet, grouped by role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedRows {
    /// Short variable names, one per column
    pub names: Vec<Option<String>>,
    pub labels: Vec<Vec<Option<String>>>,
    pub values: Vec<ValueRow>,
    pub notes: Vec<Vec<Option<String>>>,
    pub descriptions: Vec<Vec<Option<String>>>,
    /// Final role of every kept row, in row order
    pub roles: Vec<(u32, RowState)>,
}

enum Outcome {
    /// The row belongs to the current state
    Keep,
    /// The row is neither kept nor classified
    Drop,
    /// The state ends; the row is classified again under the next one
    Advance,
}

/// Walk the sheet's rows top to bottom and classify each of them.
pub fn classify_rows(ctx: &DecodeContext<'_>, config: &ExtractConfig) -> ExtractResult<ClassifiedRows> {
    let mut out = ClassifiedRows::default();
    let mut state = RowState::Names;

    for row in 0..ctx.row_count() {
        loop {
            let outcome = match state {
                RowState::Names => {
                    out.names = ctx.read_text_row(row)?;
                    out.roles.push((row, state));
                    state = state.next();
                    break;
                }
                RowState::Labels => classify_label_row(ctx, config, row, &mut out)?,
                RowState::Values => classify_value_row(ctx, config, row, &mut out)?,
                RowState::Notes => {
                    let first = ctx.read(CellRef::new(row, 0))?;
                    if first
                        .as_str()
                        .is_some_and(|text| text.trim().eq_ignore_ascii_case("notes"))
                    {
                        out.notes.push(ctx.read_text_row(row)?);
                        Outcome::Keep
                    } else {
                        Outcome::Advance
                    }
                }
                RowState::Description => {
                    out.descriptions.push(ctx.read_text_row(row)?);
                    Outcome::Keep
                }
            };
            match outcome {
                Outcome::Keep => {
                    out.roles.push((row, state));
                    break;
                }
                Outcome::Drop => break,
                Outcome::Advance => {
                    state = state.next();
                    tracing::debug!(sheet = ctx.sheet_name(), row = row + 1, ?state, "row state advanced");
                }
            }
        }
    }

    Ok(out)
}

fn classify_label_row(
    ctx: &DecodeContext<'_>,
    config: &ExtractConfig,
    row: u32,
    out: &mut ClassifiedRows,
) -> ExtractResult<Outcome> {
    let first = ctx.read(CellRef::new(row, 0))?;
    if let DateCell::Date(_) = parse_date_or_year(&first, &config.year_cells) {
        return Ok(Outcome::Advance);
    }
    out.labels.push(ctx.read_text_row(row)?);
    Ok(Outcome::Keep)
}

fn classify_value_row(
    ctx: &DecodeContext<'_>,
    config: &ExtractConfig,
    row: u32,
    out: &mut ClassifiedRows,
) -> ExtractResult<Outcome> {
    let first = ctx.read(CellRef::new(row, 0))?;
    if !matches!(
        first,
        DecodedValue::Null
            | DecodedValue::Number(Number::Int(_))
            | DecodedValue::Text(_)
            | DecodedValue::Date(_)
    ) {
        return Ok(Outcome::Advance);
    }

    match parse_date_or_year(&first, &config.year_cells) {
        DateCell::Date(date) => {
            if date.year() >= config.max_year {
                return Err(ExtractError::DateOutOfRange {
                    sheet: ctx.sheet_name().to_string(),
                    row: row + 1,
                    date: date.to_string(),
                });
            }
            let cells = ctx.read_row(row)?;
            out.values.push(ValueRow { row, date, cells });
            Ok(Outcome::Keep)
        }
        DateCell::Blank => {
            let cells = ctx.read_row(row)?;
            if cells.iter().all(DecodedValue::is_blank) {
                Ok(Outcome::Drop)
            } else {
                Ok(Outcome::Advance)
            }
        }
        DateCell::NotADate => Ok(Outcome::Advance),
    }
}
