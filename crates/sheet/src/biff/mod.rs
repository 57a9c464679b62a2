//! Low-level BIFF8 scanning of the `Workbook` stream.
//!
//! calamine decodes cell values; this module recovers what it drops:
//! number-format strings, hyperlinks, the date epoch and encryption.

mod globals;
mod records;
mod strings;
mod worksheet;

use std::io::{Read, Seek};
use std::path::Path;

pub(crate) use globals::{parse_workbook_globals, WorkbookGlobals};
pub(crate) use worksheet::{parse_sheet_records, SheetRecords};

use crate::error::{Result, SheetError};

/// Read the raw workbook stream out of an OLE compound file.
pub(crate) fn read_workbook_stream(path: &Path) -> Result<Vec<u8>> {
    let mut comp = cfb::open(path)?;
    let mut stream = open_workbook_stream(&mut comp)?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn open_workbook_stream<R: Read + Seek>(
    comp: &mut cfb::CompoundFile<R>,
) -> Result<cfb::Stream<R>> {
    for candidate in ["/Workbook", "/Book", "Workbook", "Book"] {
        if let Ok(stream) = comp.open_stream(candidate) {
            return Ok(stream);
        }
    }
    Err(SheetError::Biff(
        "missing workbook stream (expected `Workbook` or `Book`)".to_string(),
    ))
}
