//! Value Row Assembler: value rows joined with column labels.

use crate::classify::ValueRow;
use crate::dates::{parse_date_or_year, parse_text_date, DateCell};
use crate::error::{ExtractError, ExtractResult};
use crate::labels::{ColumnLabels, LabelPath};
use crate::value::DecodedValue;
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::ops::RangeInclusive;

pub const ENTRY_DATE_LABEL: &str = "Date d'entrée en vigueur";
pub const LAW_REFERENCE_LABEL: &str = "Références législatives";
pub const PUBLICATION_DATE_LABEL: &str = "Parution au JO";
pub const NOTES_LABEL: &str = "Notes";

/// Canonical spelling of a historically inconsistent heading
pub fn canonical_label(label: &str) -> &str {
    match label {
        "Date d'effet" => ENTRY_DATE_LABEL,
        "Note" | "Remarques" => NOTES_LABEL,
        "Publication au JO" | "Publication  JO" | "Publication JO" => PUBLICATION_DATE_LABEL,
        "Référence"
        | "Référence législative"
        | "Références législatives ou BOI"
        | "Références législatives                  (taux d'appel)"
        | "Références législatives                  (taux de cotisation)" => LAW_REFERENCE_LABEL,
        other => other,
    }
}

/// Label path with its bare label renamed to the canonical spelling
pub fn canonical_path(label: &LabelPath) -> LabelPath {
    match label {
        LabelPath::Single(label) => LabelPath::Single(canonical_label(label).to_string()),
        composite @ LabelPath::Composite(_) => composite.clone(),
    }
}

/// Collapse whitespace runs and trim; empty text becomes `None`
pub fn clean_line(text: &str) -> Option<String> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

/// One chronological revision of a sheet's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRecord {
    /// Zero-based sheet row
    pub row: u32,
    pub start_date: NaiveDate,
    pub law_reference: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Every labeled cell, in column order, keyed by canonical label path
    pub values: IndexMap<LabelPath, DecodedValue>,
}

impl ValueRecord {
    pub fn get(&self, label: &LabelPath) -> Option<&DecodedValue> {
        self.values.get(label)
    }
}

/// Build and validate the record of one value row.
///
/// The entry date comes from the `Date d'entrée en vigueur` column when the
/// sheet has one, otherwise from the first cell of the row.
pub fn assemble_record(
    sheet: &str,
    labels: &ColumnLabels,
    row: &ValueRow,
    years: &RangeInclusive<i32>,
) -> ExtractResult<ValueRecord> {
    let mut values: IndexMap<LabelPath, DecodedValue> = IndexMap::new();
    for (col, label) in labels.iter() {
        let key = canonical_path(label);
        if values.contains_key(&key) {
            return Err(ExtractError::DuplicateLabel {
                sheet: sheet.to_string(),
                label: key.to_string(),
            });
        }
        let cell = row.cells.get(col).cloned().unwrap_or(DecodedValue::Null);
        values.insert(key, cell);
    }

    let mut record = ValueRecord {
        row: row.row,
        start_date: row.date,
        law_reference: None,
        publication_date: None,
        notes: None,
        values: IndexMap::new(),
    };
    // The first column stands in for a missing entry-date column.
    let date_key = values
        .keys()
        .find(|label| label.as_single() == Some(ENTRY_DATE_LABEL))
        .cloned()
        .or_else(|| labels.get(0).map(canonical_path));
    let mut failure = None;
    for (label, value) in &mut values {
        let result = if date_key.as_ref() == Some(label) {
            normalize_entry_date(&mut record, value, years)
        } else {
            normalize_field(&mut record, label, value)
        };
        if let Err(message) = result {
            failure = Some((label.to_string(), message));
            break;
        }
    }
    if let Some((field, message)) = failure {
        let rendered = values
            .iter()
            .map(|(label, value)| format!("  {label}: {value:?}"))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(ExtractError::invalid_record(
            sheet,
            row.row + 1,
            field,
            message,
            rendered,
        ));
    }

    record.values = values;
    Ok(record)
}

fn normalize_entry_date(
    record: &mut ValueRecord,
    value: &mut DecodedValue,
    years: &RangeInclusive<i32>,
) -> Result<(), String> {
    let DateCell::Date(date) = parse_date_or_year(value, years) else {
        return Err(format!("expected a date, got {} {value}", value.kind()));
    };
    record.start_date = date;
    *value = DecodedValue::Date(date.to_string());
    Ok(())
}

/// Validate one cell against its column and normalize it in place.
fn normalize_field(
    record: &mut ValueRecord,
    label: &LabelPath,
    value: &mut DecodedValue,
) -> Result<(), String> {
    match label.as_single() {
        Some(field @ (LAW_REFERENCE_LABEL | NOTES_LABEL)) => {
            let text = match &*value {
                DecodedValue::Null => None,
                DecodedValue::Text(s) | DecodedValue::Date(s) => clean_line(s),
                other => return Err(format!("expected text, got {} {other}", other.kind())),
            };
            *value = text.clone().map_or(DecodedValue::Null, DecodedValue::Text);
            if field == NOTES_LABEL {
                record.notes = text;
            } else {
                record.law_reference = text;
            }
        }
        Some(PUBLICATION_DATE_LABEL) => {
            let date = match &*value {
                DecodedValue::Null => None,
                DecodedValue::Text(s) | DecodedValue::Date(s) => match clean_line(s) {
                    None => None,
                    Some(s) => Some(parse_text_date(&s).ok_or_else(|| format!("invalid date {s:?}"))?),
                },
                other => return Err(format!("expected a date, got {} {other}", other.kind())),
            };
            *value = date.map_or(DecodedValue::Null, |date| DecodedValue::Date(date.to_string()));
            record.publication_date = date;
        }
        _ => {
            if matches!(&*value, DecodedValue::Text(s) if clean_line(s).is_none()) {
                *value = DecodedValue::Null;
            }
            if !matches!(
                value,
                DecodedValue::Null | DecodedValue::Number(_) | DecodedValue::Amount { .. }
            ) {
                return Err(format!(
                    "expected a number or an amount, got {} {value}",
                    value.kind()
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Unit};

    fn labels(paths: Vec<Option<LabelPath>>) -> ColumnLabels {
        let rows: Vec<Vec<Option<String>>> = {
            let depth = paths
                .iter()
                .map(|p| p.as_ref().map_or(0, |p| p.fragments().len()))
                .max()
                .unwrap_or(0);
            (0..depth)
                .map(|level| {
                    paths
                        .iter()
                        .map(|p| p.as_ref().and_then(|p| p.fragments().get(level).cloned()))
                        .collect()
                })
                .collect()
        };
        ColumnLabels::build(&rows)
    }

    fn composite(fragments: &[&str]) -> LabelPath {
        LabelPath::Composite(fragments.iter().map(|f| (*f).to_string()).collect())
    }

    fn value_row(cells: Vec<DecodedValue>) -> ValueRow {
        ValueRow {
            row: 5,
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            cells,
        }
    }

    fn text(s: &str) -> DecodedValue {
        DecodedValue::Text(s.to_string())
    }

    #[test]
    fn test_assembles_record() {
        let labels = labels(vec![
            Some(LabelPath::from("date")),
            Some(composite(&["Plafond", "Montant"])),
            Some(LabelPath::from("Références législatives")),
        ]);
        let row = value_row(vec![
            text("2020"),
            DecodedValue::Number(Number::Int(100)),
            text("Loi n°1"),
        ]);
        let record = assemble_record("CSG", &labels, &row, &(1914..=2020)).unwrap();
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(
            record.get(&LabelPath::from("date")),
            Some(&DecodedValue::Date("2020-01-01".to_string()))
        );
        assert_eq!(
            record.get(&composite(&["Plafond", "Montant"])),
            Some(&DecodedValue::Number(Number::Int(100)))
        );
        assert_eq!(record.law_reference.as_deref(), Some("Loi n°1"));
        assert_eq!(record.publication_date, None);
    }

    #[test]
    fn test_renames_and_normalizes_metadata() {
        let labels = labels(vec![
            Some(LabelPath::from("Date d'effet")),
            Some(LabelPath::from("Taux")),
            Some(LabelPath::from("Référence législative")),
            Some(LabelPath::from("Publication au JO")),
            Some(LabelPath::from("Remarques")),
        ]);
        let row = value_row(vec![
            DecodedValue::Date("1997-01-01".to_string()),
            DecodedValue::Amount {
                value: Number::Float(0.034),
                unit: Unit::Percent,
            },
            text("  Loi 96-1160\n art. 5 "),
            text("28/12/1996"),
            DecodedValue::Null,
        ]);
        let record = assemble_record("CSG", &labels, &row, &(1914..=2020)).unwrap();
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(1997, 1, 1).unwrap());
        assert_eq!(record.law_reference.as_deref(), Some("Loi 96-1160 art. 5"));
        assert_eq!(
            record.publication_date,
            NaiveDate::from_ymd_opt(1996, 12, 28)
        );
        assert_eq!(record.notes, None);
        assert_eq!(
            record.get(&LabelPath::from(PUBLICATION_DATE_LABEL)),
            Some(&DecodedValue::Date("1996-12-28".to_string()))
        );
        let keys: Vec<String> = record.values.keys().map(ToString::to_string).collect();
        assert_eq!(
            keys,
            vec![
                ENTRY_DATE_LABEL,
                "Taux",
                LAW_REFERENCE_LABEL,
                PUBLICATION_DATE_LABEL,
                NOTES_LABEL
            ]
        );
    }

    #[test]
    fn test_duplicate_label_after_rename() {
        let labels = labels(vec![
            Some(LabelPath::from("Note")),
            Some(LabelPath::from("Remarques")),
        ]);
        let row = value_row(vec![DecodedValue::Null, DecodedValue::Null]);
        assert!(matches!(
            assemble_record("CSG", &labels, &row, &(1914..=2020)),
            Err(ExtractError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_text_in_parameter_column_is_rejected() {
        let labels = labels(vec![Some(LabelPath::from("date")), Some(LabelPath::from("Taux"))]);
        let row = value_row(vec![text("2020"), text("nc")]);
        let err = assemble_record("CSG", &labels, &row, &(1914..=2020)).unwrap_err();
        match err {
            ExtractError::InvalidRecord {
                row, field, record, ..
            } => {
                assert_eq!(row, 6);
                assert_eq!(field, "Taux");
                assert!(record.contains("Taux"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_parameter_text_becomes_null() {
        let labels = labels(vec![Some(LabelPath::from("date")), Some(LabelPath::from("Taux"))]);
        let row = value_row(vec![text("2020"), text("  ")]);
        let record = assemble_record("CSG", &labels, &row, &(1914..=2020)).unwrap();
        assert_eq!(record.get(&LabelPath::from("Taux")), Some(&DecodedValue::Null));
    }

    #[test]
    fn test_invalid_entry_date() {
        let labels = labels(vec![
            Some(LabelPath::from("Année")),
            Some(LabelPath::from(ENTRY_DATE_LABEL)),
        ]);
        let row = value_row(vec![DecodedValue::Number(Number::Int(2020)), text("bientôt")]);
        assert!(matches!(
            assemble_record("CSG", &labels, &row, &(1914..=2020)),
            Err(ExtractError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_canonical_label() {
        assert_eq!(canonical_label("Publication  JO"), PUBLICATION_DATE_LABEL);
        assert_eq!(canonical_label("Références législatives ou BOI"), LAW_REFERENCE_LABEL);
        assert_eq!(canonical_label("Taux"), "Taux");
    }
}
