//! Label Tree Builder: stacked header rows to per-column label paths.

use std::fmt;

/// Full multi-level heading of one column.
///
/// Headings with a single fragment stay a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LabelPath {
    Single(String),
    Composite(Vec<String>),
}

impl LabelPath {
    /// Build a path from accumulated fragments, `None` when there are none
    pub fn from_fragments(mut fragments: Vec<String>) -> Option<Self> {
        match fragments.len() {
            0 => None,
            1 => fragments.pop().map(LabelPath::Single),
            _ => Some(LabelPath::Composite(fragments)),
        }
    }

    pub fn fragments(&self) -> &[String] {
        match self {
            LabelPath::Single(label) => std::slice::from_ref(label),
            LabelPath::Composite(fragments) => fragments,
        }
    }

    /// The bare label of a single-fragment path
    pub fn as_single(&self) -> Option<&str> {
        match self {
            LabelPath::Single(label) => Some(label),
            LabelPath::Composite(_) => None,
        }
    }

    /// Fragments joined with `" - "`
    pub fn title(&self) -> String {
        self.fragments().join(" - ")
    }
}

impl fmt::Display for LabelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelPath::Single(label) => f.write_str(label),
            LabelPath::Composite(fragments) => write!(f, "({})", fragments.join(", ")),
        }
    }
}

impl From<&str> for LabelPath {
    fn from(label: &str) -> Self {
        LabelPath::Single(label.to_string())
    }
}

/// Label paths of a sheet, indexed by column.
///
/// Columns that never received a label hold `None`; the table stops at the
/// last labeled column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLabels {
    columns: Vec<Option<LabelPath>>,
}

impl ColumnLabels {
    /// Fold label rows into per-column label paths.
    ///
    /// A cell contributes its trimmed text unless it is blank or repeats the
    /// fragment already accumulated for that column. A blank cell continues
    /// the heading on its left when the column gets its own label further
    /// down.
    pub fn build(rows: &[Vec<Option<String>>]) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let trimmed: Vec<Vec<Option<&str>>> = rows
            .iter()
            .map(|row| {
                (0..width)
                    .map(|col| {
                        row.get(col)
                            .and_then(Option::as_deref)
                            .map(str::trim)
                            .filter(|label| !label.is_empty())
                    })
                    .collect()
            })
            .collect();

        let mut fragments: Vec<Vec<String>> = vec![Vec::new(); width];
        for (index, row) in trimmed.iter().enumerate() {
            let mut left: Option<&str> = None;
            for (col, cell) in row.iter().enumerate() {
                let label = match cell {
                    Some(label) => Some(*label),
                    None if trimmed[index + 1..].iter().any(|deeper| deeper[col].is_some()) => left,
                    None => None,
                };
                left = label;
                let Some(label) = label else {
                    continue;
                };
                let column = &mut fragments[col];
                if column.last().map(String::as_str) != Some(label) {
                    column.push(label.to_string());
                }
            }
        }

        let mut columns: Vec<Option<LabelPath>> =
            fragments.into_iter().map(LabelPath::from_fragments).collect();
        while columns.last().is_some_and(Option::is_none) {
            columns.pop();
        }
        Self { columns }
    }

    /// Number of columns up to the last labeled one
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, col: usize) -> Option<&LabelPath> {
        self.columns.get(col).and_then(Option::as_ref)
    }

    /// Every column slot, labeled or not
    pub fn slots(&self) -> &[Option<LabelPath>] {
        &self.columns
    }

    /// Labeled columns with their index
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LabelPath)> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(col, label)| label.as_ref().map(|label| (col, label)))
    }
}
