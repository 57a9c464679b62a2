//! Extraction settings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const DEFAULT_ROOT_TEXT: &str = "\
Ce document présente l'ensemble de la législation permettant le calcul des contributions sociales, taxes sur
les salaires  et cotisations sociales. Il s'agit des barèmes bruts de la législation utilisés dans le
micro-simulateur de l'IPP, TAXIPP. Les sources législatives (texte de loi, numéro du décret ou arrêté) ainsi
que la date de publication au Journal Officiel de la République française (JORF) sont systématiquement
indiquées. La première ligne du fichier (masquée) indique le nom des paramètres dans TAXIPP.

Citer cette source :
Barèmes IPP: prélèvements sociaux, Institut des politiques publiques, avril 2014.

Auteurs :
Antoine Bozio, Julien Grenet, Malka Guillot, Laura Khoury et Marianne Tenand

Contacts :
marianne.tenand@ipp.eu; antoine.bozio@ipp.eu; malka.guillot@ipp.eu

Licence :
Licence ouverte / Open Licence
";

/// Settings of an extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Sheets whose name starts with one of these prefixes hold no parameters.
    pub skipped_sheet_prefixes: Vec<String>,
    /// Prefix of the summary sheet listing the titles of the other sheets.
    pub summary_sheet_prefix: String,
    /// Known non-parameter sheets, keyed by workbook file stem.
    pub excluded_sheets: IndexMap<String, Vec<String>>,
    /// Years accepted when the first cell of a row is a bare integer.
    pub year_cells: RangeInclusive<i32>,
    /// Value rows dated this year or later are rejected.
    pub max_year: i32,
    /// Title of the root node of the parameter tree.
    pub root_title: String,
    /// Text carried by the root node of the parameter tree.
    pub root_text: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        let mut excluded_sheets = IndexMap::new();
        excluded_sheets.insert(
            "Baremes IPP - prelevements sociaux".to_string(),
            ["ASSIETTE PU", "AUBRYI", "CNRACL", "FILLON"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        Self {
            skipped_sheet_prefixes: vec!["Abréviations".to_string(), "Outline".to_string()],
            summary_sheet_prefix: "Sommaire".to_string(),
            excluded_sheets,
            year_cells: 1914..=2020,
            max_year: 2601,
            root_title: "Barème IPP".to_string(),
            root_text: DEFAULT_ROOT_TEXT.to_string(),
        }
    }
}

impl ExtractConfig {
    /// Check whether a sheet is an outline or abbreviation page.
    pub fn is_skipped_sheet(&self, sheet_name: &str) -> bool {
        self.skipped_sheet_prefixes
            .iter()
            .any(|prefix| sheet_name.starts_with(prefix.as_str()))
    }

    /// Check whether a sheet is the workbook's summary.
    pub fn is_summary_sheet(&self, sheet_name: &str) -> bool {
        sheet_name.starts_with(self.summary_sheet_prefix.as_str())
    }

    /// Check whether a sheet is explicitly excluded for this workbook.
    pub fn is_excluded_sheet(&self, workbook: &str, sheet_name: &str) -> bool {
        self.excluded_sheets
            .get(workbook)
            .is_some_and(|sheets| sheets.iter().any(|name| name == sheet_name))
    }

    /// Lines of the root node text.
    pub fn root_text_lines(&self) -> Vec<String> {
        self.root_text.lines().map(str::to_string).collect()
    }
}
