//! One YAML document per sheet.

use crate::config::ExtractConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::extract::{extract_sheet, sheet_titles, ExtractedSheet};
use crate::slug::slugify;
use crate::value::DecodedValue;
use baremes_sheet::Book;
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// A nested mapping mirroring the label hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Nested {
    Leaf(DecodedValue),
    Branch(IndexMap<String, Nested>),
}

/// Insert `leaf` at `path`, creating intermediate branches.
///
/// Two leaves may not share a path, nor may a leaf and a branch.
fn insert_path(
    map: &mut IndexMap<String, Nested>,
    path: &[String],
    leaf: DecodedValue,
    sheet: &str,
) -> ExtractResult<()> {
    let conflict = || ExtractError::LabelConflict {
        sheet: sheet.to_string(),
        label: path.join(" / "),
    };
    let Some((last, parents)) = path.split_last() else {
        return Ok(());
    };
    let mut current = map;
    for fragment in parents {
        let entry = current
            .entry(fragment.clone())
            .or_insert_with(|| Nested::Branch(IndexMap::new()));
        current = match entry {
            Nested::Branch(branch) => branch,
            Nested::Leaf(_) => return Err(conflict()),
        };
    }
    match current.get(last) {
        Some(Nested::Branch(_)) => return Err(conflict()),
        Some(Nested::Leaf(_)) => {
            return Err(ExtractError::DuplicateLabel {
                sheet: sheet.to_string(),
                label: path.join(" / "),
            })
        }
        None => {}
    }
    current.insert(last.clone(), Nested::Leaf(leaf));
    Ok(())
}

/// Document of one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetDocument {
    #[serde(rename = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Short Title")]
    pub short_title: String,
    #[serde(rename = "TaxIPP Names", skip_serializing_if = "IndexMap::is_empty")]
    pub taxipp_names: IndexMap<String, Nested>,
    #[serde(rename = "Values", skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<IndexMap<String, Nested>>,
    #[serde(rename = "Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SheetDocument {
    /// Build the document of an extracted sheet.
    ///
    /// Unlabeled columns between labeled ones are named
    /// `Colonne <n> sans titre`, `n` counting from 1. Values are the decoded
    /// cells as they stand; null cells are left out.
    pub fn build(sheet: &ExtractedSheet, title: Option<&str>) -> ExtractResult<Self> {
        let paths: Vec<Vec<String>> = sheet
            .labels
            .slots()
            .iter()
            .enumerate()
            .map(|(col, label)| match label {
                Some(label) => label.fragments().to_vec(),
                None => vec![format!("Colonne {} sans titre", col + 1)],
            })
            .collect();

        let mut taxipp_names = IndexMap::new();
        for (path, name) in paths.iter().zip(sheet.names()) {
            let Some(name) = name.as_deref().filter(|name| !name.is_empty()) else {
                continue;
            };
            insert_path(
                &mut taxipp_names,
                path,
                DecodedValue::Text(name.to_string()),
                &sheet.name,
            )?;
        }

        let mut values = Vec::with_capacity(sheet.rows.values.len());
        for row in &sheet.rows.values {
            let mut cells = IndexMap::new();
            for (path, cell) in paths.iter().zip(&row.cells) {
                if cell.is_blank() {
                    continue;
                }
                insert_path(&mut cells, path, cell.clone(), &sheet.name)?;
            }
            values.push(cells);
        }

        let joined = |lines: Vec<String>| (!lines.is_empty()).then(|| lines.join("\n"));
        Ok(Self {
            title: title.map(str::to_string),
            short_title: sheet.name.clone(),
            taxipp_names,
            values,
            notes: joined(sheet.note_lines()),
            description: joined(sheet.description_lines()),
        })
    }

    /// Serialize the document, keys in declaration order.
    pub fn to_yaml(&self) -> ExtractResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Outcome of exporting one workbook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Documents written, in sheet order
    pub written: Vec<PathBuf>,
    /// Sheets whose extraction failed
    pub failed: Vec<String>,
}

/// Write one document per sheet under `<target_dir>/<workbook name>/`.
///
/// A failing sheet is logged and skipped; only I/O errors on the workbook
/// directory abort the export.
pub fn export_workbook(book: &Book, config: &ExtractConfig, target_dir: &Path) -> ExtractResult<ExportReport> {
    let book_dir = target_dir.join(book.name());
    fs::create_dir_all(&book_dir)?;
    info!(workbook = book.name(), dir = %book_dir.display(), "exporting workbook");

    let mut report = ExportReport::default();
    let titles = sheet_titles(book, config).unwrap_or_else(|err| {
        error!(workbook = book.name(), %err, "failed to read the summary sheet");
        IndexMap::new()
    });

    for sheet in book.sheets() {
        let name = sheet.name();
        if config.is_skipped_sheet(name) || config.is_summary_sheet(name) {
            continue;
        }
        info!(sheet = name, "parsing sheet");
        let path = book_dir.join(format!("{}.yaml", slugify(name, '-')));
        let result = extract_sheet(sheet, book.date_mode(), config)
            .and_then(|extracted| {
                SheetDocument::build(&extracted, titles.get(name).map(String::as_str))
            })
            .and_then(|document| document.to_yaml())
            .and_then(|yaml| fs::write(&path, yaml).map_err(ExtractError::from));
        match result {
            Ok(()) => report.written.push(path),
            Err(err) => {
                error!(workbook = book.name(), sheet = name, %err, "failed to export sheet");
                report.failed.push(name.to_string());
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Unit};
    use baremes_sheet::{CellRef, CellValue, DateMode, Sheet};

    fn text(s: &str) -> CellValue {
        CellValue::from(s)
    }

    fn extracted(sheet: &Sheet) -> ExtractedSheet {
        extract_sheet(sheet, DateMode::Windows1900, &ExtractConfig::default()).unwrap()
    }

    fn csg() -> Sheet {
        let mut sheet = Sheet::from_data(vec![
            vec![text("date"), text("csg_act"), CellValue::Empty, text("csg_rem")],
            vec![text("Date"), text("Taux"), CellValue::Empty, text("Taux")],
            vec![CellValue::Empty, text("Activité"), CellValue::Empty, text("Remplacement")],
            vec![text("1998"), CellValue::Number(0.075), text("x"), CellValue::Number(0.062)],
            vec![text("Notes"), text("Voir CRDS")],
            vec![text("Source : IPP")],
        ]);
        sheet.set_name("CSG");
        sheet.set_number_format(CellRef::new(3, 1), "0.0%");
        sheet.set_number_format(CellRef::new(3, 3), "0.0%");
        sheet
    }

    #[test]
    fn test_document_shape() {
        let document = SheetDocument::build(&extracted(&csg()), Some("Taux de CSG")).unwrap();
        assert_eq!(document.title.as_deref(), Some("Taux de CSG"));
        assert_eq!(document.short_title, "CSG");

        let keys: Vec<&str> = document.taxipp_names.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Date", "Taux"]);
        let Some(Nested::Branch(taux)) = document.taxipp_names.get("Taux") else {
            panic!("expected a branch");
        };
        assert_eq!(
            taux.get("Activité"),
            Some(&Nested::Leaf(DecodedValue::Text("csg_act".to_string())))
        );

        assert_eq!(document.values.len(), 1);
        let row = &document.values[0];
        assert_eq!(
            row.get("Colonne 3 sans titre"),
            Some(&Nested::Leaf(DecodedValue::Text("x".to_string())))
        );
        let Some(Nested::Branch(taux)) = row.get("Taux") else {
            panic!("expected a branch");
        };
        assert_eq!(
            taux.get("Remplacement"),
            Some(&Nested::Leaf(DecodedValue::Amount {
                value: Number::Float(0.062),
                unit: Unit::Percent
            }))
        );
        assert_eq!(document.notes.as_deref(), Some("Notes | Voir CRDS"));
        assert_eq!(document.description.as_deref(), Some("Source : IPP"));
    }

    #[test]
    fn test_yaml_key_order() {
        let yaml = SheetDocument::build(&extracted(&csg()), None)
            .unwrap()
            .to_yaml()
            .unwrap();
        assert!(!yaml.contains("Title:\n") && !yaml.starts_with("Title"));
        let order: Vec<usize> = ["Short Title", "TaxIPP Names", "Values", "Notes", "Description"]
            .iter()
            .map(|key| yaml.find(&format!("{key}:")).unwrap())
            .collect();
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(yaml.contains("0.062 %"));
    }

    #[test]
    fn test_leaf_and_branch_conflict() {
        let mut map = IndexMap::new();
        let leaf = || DecodedValue::Text("a".to_string());
        insert_path(&mut map, &["A".to_string()], leaf(), "S").unwrap();
        assert!(matches!(
            insert_path(&mut map, &["A".to_string(), "B".to_string()], leaf(), "S"),
            Err(ExtractError::LabelConflict { .. })
        ));
        insert_path(&mut map, &["C".to_string(), "D".to_string()], leaf(), "S").unwrap();
        assert!(matches!(
            insert_path(&mut map, &["C".to_string()], leaf(), "S"),
            Err(ExtractError::LabelConflict { .. })
        ));
    }

    #[test]
    fn test_repeated_leaf_is_rejected() {
        let mut map = IndexMap::new();
        let path = ["Taux".to_string()];
        insert_path(&mut map, &path, DecodedValue::Text("a_1".to_string()), "S").unwrap();
        let err = insert_path(&mut map, &path, DecodedValue::Text("a_2".to_string()), "S").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::DuplicateLabel { ref sheet, ref label } if sheet == "S" && label == "Taux"
        ));
        assert_eq!(
            map.get("Taux"),
            Some(&Nested::Leaf(DecodedValue::Text("a_1".to_string())))
        );
    }

    #[test]
    fn test_sheet_with_repeated_label() {
        let mut sheet = Sheet::from_data(vec![
            vec![text("date"), text("a_1"), text("a_2")],
            vec![text("Date"), text("Taux"), text("Taux")],
            vec![text("1990"), CellValue::Number(1.0), CellValue::Number(2.0)],
        ]);
        sheet.set_name("Doublon");
        assert!(matches!(
            SheetDocument::build(&extracted(&sheet), None),
            Err(ExtractError::DuplicateLabel { .. })
        ));
    }
}
