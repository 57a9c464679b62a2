//! Record framing of a BIFF stream: a 4-byte header (id, payload length)
//! followed by the payload.

pub(crate) const RECORD_BOF_BIFF8: u16 = 0x0809;
pub(crate) const RECORD_BOF_BIFF5: u16 = 0x0009;
pub(crate) const RECORD_EOF: u16 = 0x000A;
/// Present in the globals when the workbook is password protected
pub(crate) const RECORD_FILEPASS: u16 = 0x002F;

const HEADER_LEN: usize = 4;

pub(crate) fn is_bof_record(record_id: u16) -> bool {
    matches!(record_id, RECORD_BOF_BIFF8 | RECORD_BOF_BIFF5)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BiffRecord<'a> {
    /// Position of the header within the stream
    pub(crate) offset: usize,
    pub(crate) record_id: u16,
    pub(crate) data: &'a [u8],
}

/// Walks the records of a stream from a starting position.
///
/// The first framing error is returned once, after which the walk ends.
pub(crate) struct BiffRecordIter<'a> {
    stream: &'a [u8],
    offset: usize,
}

impl<'a> BiffRecordIter<'a> {
    pub(crate) fn from_offset(stream: &'a [u8], offset: usize) -> Result<Self, String> {
        if offset > stream.len() {
            return Err(format!(
                "record walk starts at {offset}, past the {}-byte stream",
                stream.len()
            ));
        }
        Ok(Self { stream, offset })
    }

    fn fail(&mut self, message: String) -> Option<Result<BiffRecord<'a>, String>> {
        self.offset = self.stream.len();
        Some(Err(message))
    }
}

impl<'a> Iterator for BiffRecordIter<'a> {
    type Item = Result<BiffRecord<'a>, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset;
        if offset >= self.stream.len() {
            return None;
        }

        let Some(data_start) = offset.checked_add(HEADER_LEN) else {
            return self.fail(format!("record header at {offset} overflows the stream offset"));
        };
        let Some(header) = self.stream.get(offset..data_start) else {
            return self.fail(format!("stream ends inside the record header at {offset}"));
        };
        let record_id = u16::from_le_bytes([header[0], header[1]]);
        let len = usize::from(u16::from_le_bytes([header[2], header[3]]));

        let Some(data_end) = data_start.checked_add(len) else {
            return self.fail(format!(
                "record 0x{record_id:04X} at {offset}: payload length {len} overflows the stream offset"
            ));
        };
        let Some(data) = self.stream.get(data_start..data_end) else {
            return self.fail(format!(
                "record 0x{record_id:04X} at {offset} needs {len} payload bytes, {} left",
                self.stream.len() - data_start
            ));
        };

        self.offset = data_end;
        Some(Ok(BiffRecord {
            offset,
            record_id,
            data,
        }))
    }
}

/// Records of the substream opened by the `BOF` at `start_offset`.
///
/// Ends at the closing `EOF` (not yielded), at the next `BOF` when the
/// `EOF` is missing, or quietly at the first framing error.
pub(crate) struct SubstreamIter<'a> {
    iter: BiffRecordIter<'a>,
    start_offset: usize,
    finished: bool,
}

impl<'a> SubstreamIter<'a> {
    pub(crate) fn from_offset(stream: &'a [u8], start_offset: usize) -> Result<Self, String> {
        Ok(Self {
            iter: BiffRecordIter::from_offset(stream, start_offset)?,
            start_offset,
            finished: false,
        })
    }
}

impl<'a> Iterator for SubstreamIter<'a> {
    type Item = BiffRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let record = match self.iter.next() {
            Some(Ok(record))
                if record.record_id != RECORD_EOF
                    && !(record.offset != self.start_offset && is_bof_record(record.record_id)) =>
            {
                record
            }
            _ => {
                self.finished = true;
                return None;
            }
        };
        Some(record)
    }
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
pub(crate) fn record(id: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + payload.len());
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out
}
