//! Worksheet substream scan for the metadata calamine does not surface:
//! per-cell XF indices, merged ranges and hyperlinks.

use super::records::{read_u16, read_u32, SubstreamIter};
use super::strings::parse_hyperlink_string;
use crate::cell::CellRef;
use crate::hyperlink::{Hyperlink, HyperlinkTarget};
use crate::merge::MergedRegion;

const RECORD_FORMULA: u16 = 0x0006;
const RECORD_RSTRING: u16 = 0x00D6;
const RECORD_MULRK: u16 = 0x00BD;
const RECORD_MULBLANK: u16 = 0x00BE;
const RECORD_MERGEDCELLS: u16 = 0x00E5;
const RECORD_LABELSST: u16 = 0x00FD;
const RECORD_HLINK: u16 = 0x01B8;
const RECORD_BLANK: u16 = 0x0201;
const RECORD_NUMBER: u16 = 0x0203;
const RECORD_LABEL: u16 = 0x0204;
const RECORD_BOOLERR: u16 = 0x0205;
const RECORD_RK: u16 = 0x027E;

const HLINK_FLAG_HAS_MONIKER: u32 = 0x0000_0001;
const HLINK_FLAG_HAS_LOCATION: u32 = 0x0000_0008;
const HLINK_FLAG_HAS_DISPLAY: u32 = 0x0000_0010;
const HLINK_FLAG_HAS_TARGET_FRAME: u32 = 0x0000_0080;

#[derive(Debug, Clone, Default)]
pub(crate) struct SheetRecords {
    /// XF index of every cell record, in stream order
    pub(crate) cell_xf: Vec<(CellRef, u16)>,
    pub(crate) merged: Vec<MergedRegion>,
    pub(crate) hyperlinks: Vec<Hyperlink>,
}

/// Scan the worksheet substream starting at `start` (its `BOF` record).
pub(crate) fn parse_sheet_records(stream: &[u8], start: usize) -> Result<SheetRecords, String> {
    let mut out = SheetRecords::default();

    for record in SubstreamIter::from_offset(stream, start)? {
        let data = record.data;
        match record.record_id {
            RECORD_FORMULA | RECORD_BLANK | RECORD_NUMBER | RECORD_LABEL | RECORD_BOOLERR
            | RECORD_RK | RECORD_RSTRING | RECORD_LABELSST => {
                let (Some(row), Some(col), Some(xf)) =
                    (read_u16(data, 0), read_u16(data, 2), read_u16(data, 4))
                else {
                    continue;
                };
                out.cell_xf
                    .push((CellRef::new(u32::from(row), u32::from(col)), xf));
            }
            RECORD_MULRK => push_multi_xf(&mut out.cell_xf, data, 6),
            RECORD_MULBLANK => push_multi_xf(&mut out.cell_xf, data, 2),
            RECORD_MERGEDCELLS => {
                let count = read_u16(data, 0).unwrap_or(0) as usize;
                for chunk in data.get(2..).unwrap_or_default().chunks_exact(8).take(count) {
                    let field = |i: usize| u32::from(u16::from_le_bytes([chunk[i], chunk[i + 1]]));
                    let (row_first, row_last) = (field(0), field(2));
                    let (col_first, col_last) = (field(4), field(6));
                    if row_first > row_last || col_first > col_last {
                        continue;
                    }
                    out.merged.push(MergedRegion::from_inclusive(
                        CellRef::new(row_first, col_first),
                        CellRef::new(row_last, col_last),
                    ));
                }
            }
            RECORD_HLINK => match decode_hlink_record(data) {
                Ok(link) => out.hyperlinks.push(link),
                Err(err) => {
                    tracing::warn!("failed to decode HLINK record at offset {}: {err}", record.offset);
                }
            },
            _ => {}
        }
    }

    Ok(out)
}

/// MULRK / MULBLANK: rw (2), colFirst (2), per-cell chunks, colLast (2).
/// Each chunk starts with the cell's XF index.
fn push_multi_xf(out: &mut Vec<(CellRef, u16)>, data: &[u8], chunk_len: usize) {
    if data.len() < 6 {
        return;
    }
    let (Some(row), Some(col_first)) = (read_u16(data, 0), read_u16(data, 2)) else {
        return;
    };
    let Some(col_last) = read_u16(data, data.len() - 2) else {
        return;
    };
    let chunks = data[4..data.len() - 2].chunks_exact(chunk_len);
    for (col, chunk) in (col_first..=col_last).zip(chunks) {
        let xf = u16::from_le_bytes([chunk[0], chunk[1]]);
        out.push((CellRef::new(u32::from(row), u32::from(col)), xf));
    }
}

fn decode_hlink_record(data: &[u8]) -> Result<Hyperlink, String> {
    // ref8 (8), guid (16), streamVersion (4), linkOpts (4)
    if data.len() < 32 {
        return Err("HLINK record too short".to_string());
    }
    let field = |i: usize| read_u16(data, i).map_or(0, u32::from);
    let first = CellRef::new(field(0), field(4));
    let last = CellRef::new(field(2), field(6));
    let link_opts = read_u32(data, 28).unwrap_or(0);
    let mut pos = 32usize;

    let read_string = |pos: &mut usize| -> Result<String, String> {
        let (s, consumed) = parse_hyperlink_string(data.get(*pos..).unwrap_or_default())?;
        *pos += consumed;
        Ok(s)
    };

    let mut display = None;
    if link_opts & HLINK_FLAG_HAS_DISPLAY != 0 {
        let s = read_string(&mut pos)?;
        display = (!s.is_empty()).then_some(s);
    }
    if link_opts & HLINK_FLAG_HAS_TARGET_FRAME != 0 {
        read_string(&mut pos)?;
    }

    let target = if link_opts & HLINK_FLAG_HAS_MONIKER != 0 {
        // URL and file monikers point outside the workbook.
        HyperlinkTarget::External
    } else if link_opts & HLINK_FLAG_HAS_LOCATION != 0 {
        HyperlinkTarget::Workbook {
            location: read_string(&mut pos)?,
        }
    } else {
        return Err("HLINK record is missing target information".to_string());
    };

    Ok(Hyperlink {
        first,
        last,
        target,
        display,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biff::records::{record, RECORD_BOF_BIFF8, RECORD_EOF};

    fn cell_header(row: u16, col: u16, xf: u16) -> Vec<u8> {
        [row.to_le_bytes(), col.to_le_bytes(), xf.to_le_bytes()].concat()
    }

    fn hlink_string(s: &str) -> Vec<u8> {
        let mut out = ((s.encode_utf16().count() + 1) as u32).to_le_bytes().to_vec();
        out.extend(s.encode_utf16().chain([0]).flat_map(u16::to_le_bytes));
        out
    }

    fn hlink(row: u16, col: u16, opts: u32, strings: &[&str]) -> Vec<u8> {
        let mut payload = [row, row, col, col]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect::<Vec<u8>>();
        payload.extend_from_slice(&[0; 16]);
        payload.extend_from_slice(&2u32.to_le_bytes());
        payload.extend_from_slice(&opts.to_le_bytes());
        for s in strings {
            payload.extend(hlink_string(s));
        }
        record(RECORD_HLINK, &payload)
    }

    fn sheet_stream(body: &[Vec<u8>]) -> Vec<u8> {
        let mut stream = record(RECORD_BOF_BIFF8, &[0x00, 0x06, 0x10, 0x00]);
        for rec in body {
            stream.extend_from_slice(rec);
        }
        stream.extend(record(RECORD_EOF, &[]));
        stream
    }

    #[test]
    fn collects_cell_xf_indices() {
        let mut number = cell_header(2, 1, 17);
        number.extend_from_slice(&0.055f64.to_le_bytes());
        let mut mulblank = vec![3, 0, 0, 0];
        mulblank.extend([20u16, 21, 22].iter().flat_map(|v| v.to_le_bytes()));
        mulblank.extend_from_slice(&2u16.to_le_bytes());
        let mut mulrk = vec![4, 0, 1, 0];
        for xf in [30u16, 31] {
            mulrk.extend_from_slice(&xf.to_le_bytes());
            mulrk.extend_from_slice(&[0; 4]);
        }
        mulrk.extend_from_slice(&2u16.to_le_bytes());

        let stream = sheet_stream(&[
            record(RECORD_NUMBER, &number),
            record(RECORD_MULBLANK, &mulblank),
            record(RECORD_MULRK, &mulrk),
        ]);
        let records = parse_sheet_records(&stream, 0).unwrap();
        assert_eq!(
            records.cell_xf,
            vec![
                (CellRef::new(2, 1), 17),
                (CellRef::new(3, 0), 20),
                (CellRef::new(3, 1), 21),
                (CellRef::new(3, 2), 22),
                (CellRef::new(4, 1), 30),
                (CellRef::new(4, 2), 31),
            ]
        );
    }

    #[test]
    fn collects_merged_regions() {
        let mut payload = 2u16.to_le_bytes().to_vec();
        for v in [0u16, 1, 0, 2, 5, 5, 1, 3] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let stream = sheet_stream(&[record(RECORD_MERGEDCELLS, &payload)]);
        let records = parse_sheet_records(&stream, 0).unwrap();
        assert_eq!(
            records.merged,
            vec![MergedRegion::new(0, 2, 0, 3), MergedRegion::new(5, 6, 1, 4)]
        );
    }

    #[test]
    fn decodes_internal_hyperlink_with_display() {
        let stream = sheet_stream(&[hlink(
            4,
            3,
            HLINK_FLAG_HAS_DISPLAY | HLINK_FLAG_HAS_LOCATION,
            &["CSG", "'Taux CSG'!A1"],
        )]);
        let records = parse_sheet_records(&stream, 0).unwrap();
        let link = &records.hyperlinks[0];
        assert_eq!(link.first, CellRef::new(4, 3));
        assert_eq!(link.display.as_deref(), Some("CSG"));
        assert_eq!(link.target_sheet(), Some("Taux CSG"));
    }

    #[test]
    fn moniker_links_are_external() {
        let stream = sheet_stream(&[hlink(0, 0, HLINK_FLAG_HAS_MONIKER, &[])]);
        let records = parse_sheet_records(&stream, 0).unwrap();
        assert_eq!(records.hyperlinks[0].target, HyperlinkTarget::External);
    }

    #[test]
    fn malformed_hyperlink_is_skipped() {
        let stream = sheet_stream(&[record(RECORD_HLINK, &[0; 10])]);
        assert!(parse_sheet_records(&stream, 0).unwrap().hyperlinks.is_empty());
    }
}
