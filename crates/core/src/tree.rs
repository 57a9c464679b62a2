//! Parameter Tree Assembler: workbook → sheet → variable → value leaves.

use crate::config::ExtractConfig;
use crate::error::ExtractResult;
use crate::extract::{data_sheets, extract_sheet, sheet_titles, ExtractedSheet};
use crate::record::{canonical_path, ValueRecord};
use crate::slug::slugify;
use crate::value::{DecodedValue, Unit};
use baremes_sheet::Book;
use chrono::NaiveDate;
use tracing::{info, warn};

/// Short names that never produce a variable
const PLACEHOLDER_NAMES: &[&str] = &["date"];

/// One historical revision of a variable
#[derive(Debug, Clone, PartialEq)]
pub struct ValueNode {
    /// Bare value; amounts are split into `value` and `unit`
    pub value: DecodedValue,
    pub unit: Option<Unit>,
    pub start_date: NaiveDate,
    pub publication_date: Option<NaiveDate>,
    pub law_reference: Option<String>,
    pub notes: Option<String>,
}

impl ValueNode {
    /// Leaf for one record's cell.
    pub fn new(cell: &DecodedValue, record: &ValueRecord) -> Self {
        let (value, unit) = match cell {
            DecodedValue::Amount { value, unit } => (DecodedValue::Number(*value), Some(*unit)),
            other => (other.clone(), None),
        };
        Self {
            value,
            unit,
            start_date: record.start_date,
            publication_date: record.publication_date,
            law_reference: record.law_reference.clone(),
            notes: record.notes.clone(),
        }
    }
}

/// A TaxIPP variable with its chronological values
#[derive(Debug, Clone, PartialEq)]
pub struct VariableNode {
    pub name: String,
    pub title: String,
    pub values: Vec<ValueNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetNode {
    pub name: String,
    pub title: String,
    pub text: Vec<String>,
    pub variables: Vec<VariableNode>,
}

impl SheetNode {
    /// Build the node of an extracted sheet.
    ///
    /// Every named column with a label path becomes a variable holding one
    /// value per record; fails on the first invalid value row.
    pub fn build(sheet: &ExtractedSheet, title: &str, config: &ExtractConfig) -> ExtractResult<Self> {
        let records = sheet.records(config)?;
        let mut variables = Vec::new();
        for (col, name) in sheet.names().iter().enumerate() {
            let Some(name) = name.as_deref().map(str::trim) else {
                continue;
            };
            if name.is_empty() || PLACEHOLDER_NAMES.contains(&name) {
                continue;
            }
            let Some(label) = sheet.labels.get(col) else {
                continue;
            };
            let key = canonical_path(label);
            let values = records
                .iter()
                .map(|record| ValueNode::new(record.get(&key).unwrap_or(&DecodedValue::Null), record))
                .collect();
            variables.push(VariableNode {
                name: slugify(name, '_'),
                title: label.title(),
                values,
            });
        }
        Ok(Self {
            name: slugify(&sheet.name, '_'),
            title: title.to_string(),
            text: sheet.text_lines(),
            variables,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RootNode {
    pub name: String,
    pub title: String,
    pub text: Vec<String>,
    pub sheets: Vec<SheetNode>,
}

impl RootNode {
    /// Empty root titled from the configuration
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            name: "root".to_string(),
            title: config.root_title.clone(),
            text: config.root_text_lines(),
            sheets: Vec::new(),
        }
    }

    /// Append a node per data sheet of a workbook.
    ///
    /// Sheets missing from the summary are skipped with a warning; any
    /// decoding or validation error aborts.
    pub fn append_workbook(&mut self, book: &Book, config: &ExtractConfig) -> ExtractResult<()> {
        info!(workbook = book.name(), "parsing workbook");
        let titles = sheet_titles(book, config)?;
        for sheet in data_sheets(book, config) {
            info!(sheet = sheet.name(), "parsing sheet");
            let extracted = extract_sheet(sheet, book.date_mode(), config)?;
            let Some(title) = titles.get(sheet.name()) else {
                warn!(workbook = book.name(), sheet = sheet.name(), "missing title for sheet in summary");
                continue;
            };
            self.sheets.push(SheetNode::build(&extracted, title, config)?);
        }
        Ok(())
    }

    /// Every value leaf, depth first
    pub fn values(&self) -> impl Iterator<Item = &ValueNode> {
        self.sheets
            .iter()
            .flat_map(|sheet| &sheet.variables)
            .flat_map(|variable| &variable.values)
    }
}

/// Borrowed view over any node of the tree.
#[derive(Debug, Clone, Copy)]
pub enum ParameterNode<'a> {
    Root(&'a RootNode),
    Sheet(&'a SheetNode),
    Variable(&'a VariableNode),
    Value(&'a ValueNode),
}

impl<'a> ParameterNode<'a> {
    /// Node type, used as the markup tag
    pub fn tag(&self) -> &'static str {
        match self {
            ParameterNode::Root(_) | ParameterNode::Sheet(_) => "NODE",
            ParameterNode::Variable(_) => "CODE",
            ParameterNode::Value(_) => "VALUE",
        }
    }

    /// Non-null attributes, sorted by name
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attributes: Vec<(&'static str, Option<String>)> = match self {
            ParameterNode::Root(RootNode { name, title, .. })
            | ParameterNode::Sheet(SheetNode { name, title, .. })
            | ParameterNode::Variable(VariableNode { name, title, .. }) => {
                vec![("name", Some(name.clone())), ("title", Some(title.clone()))]
            }
            ParameterNode::Value(value) => vec![
                ("law_reference", value.law_reference.clone()),
                ("notes", value.notes.clone()),
                ("publication_date", value.publication_date.map(|date| date.to_string())),
                ("start_date", Some(value.start_date.to_string())),
                ("unit", value.unit.map(|unit| unit.to_string())),
                ("value", (!value.value.is_null()).then(|| value.value.to_string())),
            ],
        };
        attributes.sort_by_key(|(name, _)| *name);
        attributes
            .into_iter()
            .filter_map(|(name, value)| value.map(|value| (name, value)))
            .collect()
    }

    pub fn text(&self) -> &'a [String] {
        match *self {
            ParameterNode::Root(root) => &root.text,
            ParameterNode::Sheet(sheet) => &sheet.text,
            ParameterNode::Variable(_) | ParameterNode::Value(_) => &[],
        }
    }

    pub fn children(&self) -> Vec<ParameterNode<'a>> {
        match *self {
            ParameterNode::Root(root) => root.sheets.iter().map(ParameterNode::Sheet).collect(),
            ParameterNode::Sheet(sheet) => sheet.variables.iter().map(ParameterNode::Variable).collect(),
            ParameterNode::Variable(variable) => variable.values.iter().map(ParameterNode::Value).collect(),
            ParameterNode::Value(_) => Vec::new(),
        }
    }
}
