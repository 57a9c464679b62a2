//! Workbook globals substream: sheet directory, number formats, XF table
//! and date mode.

use std::collections::HashMap;

use super::records::{self, read_u16, read_u32, SubstreamIter};
use super::strings::{parse_short_unicode_string, parse_unicode_string};
use crate::book::DateMode;
use crate::error::{Result, SheetError};

const RECORD_DATEMODE: u16 = 0x0022;
const RECORD_BOUNDSHEET: u16 = 0x0085;
const RECORD_XF: u16 = 0x00E0;
const RECORD_FORMAT: u16 = 0x041E;

const BOF_VERSION_BIFF8: u16 = 0x0600;

/// Built-in number formats that workbooks reference without a `FORMAT` record.
const BUILTIN_FORMATS: &[(u16, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (5, "$#,##0_);($#,##0)"),
    (6, "$#,##0_);[Red]($#,##0)"),
    (7, "$#,##0.00_);($#,##0.00)"),
    (8, "$#,##0.00_);[Red]($#,##0.00)"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "m/d/yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0_);(#,##0)"),
    (38, "#,##0_);[Red](#,##0)"),
    (39, "#,##0.00_);(#,##0.00)"),
    (40, "#,##0.00_);[Red](#,##0.00)"),
    (41, "_(* #,##0_);_(* (#,##0);_(* \"-\"_);_(@_)"),
    (42, "_($* #,##0_);_($* (#,##0);_($* \"-\"_);_(@_)"),
    (43, "_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);_(@_)"),
    (44, "_($* #,##0.00_);_($* (#,##0.00);_($* \"-\"??_);_(@_)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mm:ss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

/// An entry of the workbook's sheet directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoundSheet {
    pub(crate) name: String,
    /// Offset of the sheet's `BOF` record in the workbook stream
    pub(crate) offset: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct WorkbookGlobals {
    pub(crate) date_mode: DateMode,
    pub(crate) encrypted: bool,
    pub(crate) bound_sheets: Vec<BoundSheet>,
    formats: HashMap<u16, String>,
    xf_formats: Vec<u16>,
}

impl WorkbookGlobals {
    /// Number-format string for an XF index; unknown indices read as `General`
    pub(crate) fn format_for_xf(&self, xf: u16) -> &str {
        let Some(&format_id) = self.xf_formats.get(usize::from(xf)) else {
            return "General";
        };
        if let Some(format) = self.formats.get(&format_id) {
            return format;
        }
        BUILTIN_FORMATS
            .iter()
            .find(|(id, _)| *id == format_id)
            .map_or("General", |(_, format)| format)
    }

    pub(crate) fn bound_sheet(&self, name: &str) -> Option<&BoundSheet> {
        self.bound_sheets.iter().find(|sheet| sheet.name == name)
    }
}

pub(crate) fn parse_workbook_globals(stream: &[u8]) -> Result<WorkbookGlobals> {
    let Some(Ok(bof)) = records::BiffRecordIter::from_offset(stream, 0)
        .map_err(SheetError::Biff)?
        .next()
    else {
        return Err(SheetError::Biff("missing BOF record".to_string()));
    };
    if !records::is_bof_record(bof.record_id) {
        return Err(SheetError::Biff(format!(
            "expected BOF record, found 0x{:04X}",
            bof.record_id
        )));
    }
    let version = read_u16(bof.data, 0).unwrap_or(0);
    if bof.record_id != records::RECORD_BOF_BIFF8 || version != BOF_VERSION_BIFF8 {
        return Err(SheetError::UnsupportedBiffVersion { version });
    }

    let mut globals = WorkbookGlobals::default();
    for record in SubstreamIter::from_offset(stream, 0).map_err(SheetError::Biff)? {
        let data = record.data;
        match record.record_id {
            records::RECORD_FILEPASS => {
                // Payload bytes after FILEPASS are encrypted.
                globals.encrypted = true;
                break;
            }
            RECORD_DATEMODE => {
                if read_u16(data, 0).unwrap_or(0) != 0 {
                    globals.date_mode = DateMode::Mac1904;
                }
            }
            RECORD_BOUNDSHEET => {
                // BOUNDSHEET8: lbPlyPos (4), hsState (1), dt (1), stName
                let offset = read_u32(data, 0)
                    .ok_or_else(|| SheetError::Biff("truncated BOUNDSHEET record".to_string()))?;
                let (name, _) = data
                    .get(6..)
                    .ok_or_else(|| "truncated BOUNDSHEET record".to_string())
                    .and_then(parse_short_unicode_string)
                    .map_err(SheetError::Biff)?;
                globals.bound_sheets.push(BoundSheet {
                    name,
                    offset: offset as usize,
                });
            }
            RECORD_FORMAT => {
                let Some(id) = read_u16(data, 0) else {
                    continue;
                };
                match parse_unicode_string(&data[2..]) {
                    Ok((format, _)) => {
                        globals.formats.insert(id, format);
                    }
                    Err(err) => {
                        tracing::debug!("skipping malformed FORMAT record {id}: {err}");
                    }
                }
            }
            RECORD_XF => {
                // XF: ifnt (2), ifmt (2), ...
                globals.xf_formats.push(read_u16(data, 2).unwrap_or(0));
            }
            _ => {}
        }
    }

    Ok(globals)
}
