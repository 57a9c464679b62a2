//! Error types for the extraction engine.

use crate::audit::DuplicateNamesReport;
use baremes_sheet::SheetError;
use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur while extracting parameters from a workbook.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A numeric cell carries a number format outside the recognized set.
    #[error("Unexpected number format {format:?} at {cell} for value {value}")]
    UnknownNumberFormat {
        cell: String,
        format: String,
        value: String,
    },

    /// An error cell carries a code with no known symbolic name.
    #[error("Unknown error code 0x{code:02X} at {cell}")]
    UnknownErrorCode { cell: String, code: u8 },

    /// A cell read as text holds a boolean or an error marker.
    #[error("Expected text at {cell}, got {found}")]
    ExpectedText { cell: String, found: String },

    /// A value row carries a date at or past the year ceiling.
    #[error("Invalid date {date} in {sheet} at row {row}")]
    DateOutOfRange { sheet: String, row: u32, date: String },

    /// Two columns of a sheet share the same label path.
    #[error("Duplicate label {label:?} in sheet {sheet}")]
    DuplicateLabel { sheet: String, label: String },

    /// A value row failed structural validation.
    #[error("Invalid record in {sheet} at row {row}, field {field:?}: {message}\n{record}")]
    InvalidRecord {
        sheet: String,
        row: u32,
        field: String,
        message: String,
        record: String,
    },

    /// A label path is used both as a leaf and as a branch.
    #[error("Label {label:?} of sheet {sheet} is both a value and a group of values")]
    LabelConflict { sheet: String, label: String },

    /// The same variable name is used by several columns of a workbook.
    #[error("{0}")]
    DuplicateVariableNames(DuplicateNamesReport),

    /// Workbook loading error.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ExtractError {
    /// Create a record validation error.
    pub fn invalid_record(
        sheet: &str,
        row: u32,
        field: impl Into<String>,
        message: impl Into<String>,
        record: impl Into<String>,
    ) -> Self {
        Self::InvalidRecord {
            sheet: sheet.to_string(),
            row,
            field: field.into(),
            message: message.into(),
            record: record.into(),
        }
    }
}
