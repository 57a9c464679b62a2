//! BIFF8 string decoding.

use super::records::{read_u16, read_u32};

const FLAG_HIGH_BYTE: u8 = 0x01;
const FLAG_EXT_ST: u8 = 0x04;
const FLAG_RICH_ST: u8 = 0x08;

/// Upper bound on declared string lengths, to reject garbage early.
const MAX_CHARS: usize = 0x0010_0000;

/// Decode `count` characters, either compressed (one byte per character,
/// Latin-1) or UTF-16LE. Returns the string and the number of bytes read.
fn decode_chars(input: &[u8], count: usize, high_byte: bool) -> Result<(String, usize), String> {
    if high_byte {
        let byte_len = count * 2;
        let bytes = input
            .get(..byte_len)
            .ok_or_else(|| "truncated UTF-16 string".to_string())?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok((String::from_utf16_lossy(&units), byte_len))
    } else {
        let bytes = input
            .get(..count)
            .ok_or_else(|| "truncated compressed string".to_string())?;
        Ok((bytes.iter().map(|b| char::from(*b)).collect(), count))
    }
}

/// Parse a `ShortXLUnicodeString` (8-bit length, flags, characters).
pub(crate) fn parse_short_unicode_string(input: &[u8]) -> Result<(String, usize), String> {
    let (&cch, rest) = input
        .split_first()
        .ok_or_else(|| "missing string length".to_string())?;
    let (&flags, rest) = rest
        .split_first()
        .ok_or_else(|| "missing string flags".to_string())?;
    let (s, consumed) = decode_chars(rest, usize::from(cch), flags & FLAG_HIGH_BYTE != 0)?;
    Ok((s, 2 + consumed))
}

/// Parse an `XLUnicodeRichExtendedString` (16-bit length, flags, optional
/// rich-text run count and extended data size, characters). Formatting runs
/// and extended data are skipped.
pub(crate) fn parse_unicode_string(input: &[u8]) -> Result<(String, usize), String> {
    let cch = usize::from(read_u16(input, 0).ok_or_else(|| "missing string length".to_string())?);
    let flags = *input
        .get(2)
        .ok_or_else(|| "missing string flags".to_string())?;
    let mut pos = 3usize;

    let mut trailing = 0usize;
    if flags & FLAG_RICH_ST != 0 {
        let runs = read_u16(input, pos).ok_or_else(|| "missing rich run count".to_string())?;
        trailing += usize::from(runs) * 4;
        pos += 2;
    }
    if flags & FLAG_EXT_ST != 0 {
        let ext = read_u32(input, pos).ok_or_else(|| "missing extended size".to_string())?;
        trailing += ext as usize;
        pos += 4;
    }

    let (s, consumed) = decode_chars(&input[pos..], cch, flags & FLAG_HIGH_BYTE != 0)?;
    Ok((s, pos + consumed + trailing))
}

/// Parse a hyperlink string: 32-bit character count (including the
/// terminating NUL) followed by UTF-16LE characters.
pub(crate) fn parse_hyperlink_string(input: &[u8]) -> Result<(String, usize), String> {
    let count = read_u32(input, 0).ok_or_else(|| "missing hyperlink string length".to_string())?
        as usize;
    if count > MAX_CHARS {
        return Err(format!("implausible hyperlink string length {count}"));
    }
    let (s, consumed) = decode_chars(&input[4..], count, true)?;
    let s = match s.find('\0') {
        Some(end) => s[..end].to_string(),
        None => s,
    };
    Ok((s, 4 + consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn short_string_compressed() {
        let mut data = vec![4u8, 0];
        data.extend_from_slice(b"CSG!");
        data.push(0xFF);
        assert_eq!(parse_short_unicode_string(&data).unwrap(), ("CSG!".to_string(), 6));
    }

    #[test]
    fn short_string_latin1() {
        let data = [3u8, 0, b'R', 0xE9, b'f'];
        assert_eq!(parse_short_unicode_string(&data).unwrap().0, "Réf");
    }

    #[test]
    fn unicode_string_utf16() {
        let mut data = vec![2u8, 0, FLAG_HIGH_BYTE];
        data.extend(utf16("€%"));
        assert_eq!(parse_unicode_string(&data).unwrap(), ("€%".to_string(), 7));
    }

    #[test]
    fn unicode_string_skips_rich_runs() {
        let mut data = vec![1u8, 0, FLAG_RICH_ST, 1, 0];
        data.push(b'0');
        data.extend_from_slice(&[0; 4]);
        assert_eq!(parse_unicode_string(&data).unwrap(), ("0".to_string(), 10));
    }

    #[test]
    fn hyperlink_string_drops_nul() {
        let mut data = 7u32.to_le_bytes().to_vec();
        data.extend(utf16("CSG!A1\0"));
        assert_eq!(parse_hyperlink_string(&data).unwrap(), ("CSG!A1".to_string(), 18));
    }

    #[test]
    fn truncated_string_is_an_error() {
        assert!(parse_short_unicode_string(&[5, 0, b'a']).is_err());
        assert!(parse_unicode_string(&[]).is_err());
    }
}
