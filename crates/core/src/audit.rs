//! Duplicate variable-name audit across the data sheets of a workbook.

use crate::config::ExtractConfig;
use crate::decode::DecodeContext;
use crate::error::{ExtractError, ExtractResult};
use crate::extract::data_sheets;
use baremes_sheet::Book;
use indexmap::IndexMap;
use std::fmt;
use tracing::{debug, info};

/// Name-row entries that are not variables
const IGNORED_NAMES: &[&str] = &["date", "ref_leg", "jorf", "Notes", "notes", "date_ir"];

/// Names standing for another name
fn canonical_name(name: &str) -> &str {
    match name {
        "date_rev" => "date",
        other => other,
    }
}

/// Variable names used by more than one column of a workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateNamesReport {
    pub workbook: String,
    /// Duplicated name → sheets it appears in, in workbook order
    pub sheets_by_name: IndexMap<String, Vec<String>>,
}

impl DuplicateNamesReport {
    pub fn is_empty(&self) -> bool {
        self.sheets_by_name.is_empty()
    }

    /// Turn a non-empty report into an error.
    pub fn into_result(self) -> ExtractResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ExtractError::DuplicateVariableNames(self))
        }
    }
}

impl fmt::Display for DuplicateNamesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} variable name(s) used more than once in workbook {}:",
            self.sheets_by_name.len(),
            self.workbook
        )?;
        for (name, sheets) in &self.sheets_by_name {
            write!(f, "\n  {name}: {}", sheets.join(", "))?;
        }
        Ok(())
    }
}

/// Collect the variable names of every data sheet and report the ones used
/// more than once, in two sheets or twice in the same sheet.
pub fn audit_workbook(book: &Book, config: &ExtractConfig) -> ExtractResult<DuplicateNamesReport> {
    let mut occurrences: IndexMap<String, Vec<String>> = IndexMap::new();
    for sheet in data_sheets(book, config) {
        let ctx = DecodeContext::new(sheet, book.date_mode());
        if ctx.row_count() == 0 {
            continue;
        }
        for name in ctx.read_text_row(0)?.into_iter().flatten() {
            let name = canonical_name(name.trim());
            if name.is_empty() || IGNORED_NAMES.contains(&name) {
                continue;
            }
            occurrences
                .entry(name.to_string())
                .or_default()
                .push(sheet.name().to_string());
        }
        debug!(sheet = sheet.name(), "names collected");
    }

    let sheets_by_name: IndexMap<String, Vec<String>> = occurrences
        .into_iter()
        .filter(|(_, sheets)| sheets.len() > 1)
        .map(|(name, mut sheets)| {
            sheets.dedup();
            (name, sheets)
        })
        .collect();
    info!(
        workbook = book.name(),
        duplicates = sheets_by_name.len(),
        "variable names audited"
    );
    Ok(DuplicateNamesReport {
        workbook: book.name().to_string(),
        sheets_by_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use baremes_sheet::{CellValue, Sheet};

    fn names_sheet(names: &[&str]) -> Sheet {
        Sheet::from_data(vec![names
            .iter()
            .map(|name| CellValue::from(*name))
            .collect::<Vec<_>>()])
    }

    fn book() -> Book {
        let mut book = Book::with_name("Baremes IPP - prelevements sociaux");
        book.add_sheet("Sommaire", names_sheet(&["csg_act"])).unwrap();
        book.add_sheet("CSG", names_sheet(&["date", "csg_act", "ref_leg", "jorf"])).unwrap();
        book.add_sheet("CRDS", names_sheet(&["date_rev", "crds", "crds", "notes"])).unwrap();
        book.add_sheet("FILLON", names_sheet(&["date", "csg_act"])).unwrap();
        book.add_sheet("CSG bis", names_sheet(&["date", "csg_act", "", "date_ir"])).unwrap();
        book
    }

    #[test]
    fn test_reports_every_duplicate() {
        let report = audit_workbook(&book(), &ExtractConfig::default()).unwrap();
        assert_eq!(report.sheets_by_name.len(), 2);
        assert_eq!(report.sheets_by_name["csg_act"], vec!["CSG", "CSG bis"]);
        assert_eq!(report.sheets_by_name["crds"], vec!["CRDS"]);

        let message = report.to_string();
        assert!(message.contains("csg_act: CSG, CSG bis"));
        assert!(message.contains("crds: CRDS"));
        assert!(matches!(
            report.into_result(),
            Err(ExtractError::DuplicateVariableNames(_))
        ));
    }

    #[test]
    fn test_clean_workbook() {
        let mut book = Book::with_name("Baremes IPP - chomage");
        book.add_sheet("ARE", names_sheet(&["date", "are_taux"])).unwrap();
        book.add_sheet("ASS", names_sheet(&["date_rev", "ass_mont", "Notes"])).unwrap();
        let report = audit_workbook(&book, &ExtractConfig::default()).unwrap();
        assert!(report.is_empty());
        assert!(report.into_result().is_ok());
    }
}
