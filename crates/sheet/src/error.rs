use thiserror::Error;

/// Errors that can occur while loading or querying a workbook
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Sheet already exists: {name}")]
    SheetAlreadyExists { name: String },

    #[error("Workbook is encrypted: {path}")]
    EncryptedWorkbook { path: String },

    #[error("Unsupported BIFF version 0x{version:04X}; save the workbook as Excel 97-2003 (BIFF8)")]
    UnsupportedBiffVersion { version: u16 },

    #[error("Malformed BIFF stream: {0}")]
    Biff(String),

    #[error("XLS error: {0}")]
    Xls(#[from] calamine::XlsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
