use std::io::{self, Read, Write};

use crate::error::{HuffmanError, Result};
use crate::frequency::{FrequencyTable, SYMBOLS};

/// Width of every header field and packed word on disk.
pub const FIELD_LEN: usize = 8;

/// 256 frequency counters followed by the padding-bit count.
pub const HEADER_LEN: usize = SYMBOLS * FIELD_LEN + FIELD_LEN;

/// Largest padding a 64-bit packed word can carry.
pub const MAX_PADDING_BITS: u64 = u64::BITS as u64 - 1;

pub fn write_header<W: Write>(
    writer: &mut W,
    frequencies: &FrequencyTable,
    padding_bits: u32,
) -> io::Result<()> {
    for count in frequencies.counts() {
        writer.write_all(&count.to_le_bytes())?;
    }
    writer.write_all(&(padding_bits as u64).to_le_bytes())?;
    Ok(())
}

pub fn read_header<R: Read>(reader: &mut R) -> Result<(FrequencyTable, u32)> {
    let mut counts = [0u64; SYMBOLS];
    for count in counts.iter_mut() {
        *count = read_field(reader, "frequency table")?;
    }
    let padding_bits = read_field(reader, "padding count")?;
    if padding_bits > MAX_PADDING_BITS {
        return Err(HuffmanError::corrupt(format!(
            "padding count {} exceeds {} bits",
            padding_bits, MAX_PADDING_BITS
        )));
    }
    Ok((FrequencyTable::from_counts(counts), padding_bits as u32))
}

fn read_field<R: Read>(reader: &mut R, section: &str) -> Result<u64> {
    let mut bytes = [0u8; FIELD_LEN];
    reader.read_exact(&mut bytes).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            HuffmanError::corrupt(format!("header truncated inside the {}", section))
        }
        _ => HuffmanError::Io(e),
    })?;
    Ok(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_layout_is_counters_then_padding() {
        let frequencies = FrequencyTable::from_bytes(b"\x00\x00\x01\xff");
        let mut bytes = Vec::new();
        write_header(&mut bytes, &frequencies, 5).unwrap();

        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(&bytes[0..8], &2u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &1u64.to_le_bytes());
        assert_eq!(&bytes[255 * 8..256 * 8], &1u64.to_le_bytes());
        assert_eq!(&bytes[256 * 8..], &5u64.to_le_bytes());

        let (read_back, padding) = read_header(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(read_back, frequencies);
        assert_eq!(padding, 5);
    }

    #[test]
    fn truncated_header_is_corrupt() {
        let mut bytes = Vec::new();
        write_header(&mut bytes, &FrequencyTable::new(), 0).unwrap();
        bytes.truncate(HEADER_LEN - 3);
        let err = read_header(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, HuffmanError::Corrupt(msg) if msg.contains("padding count")));
    }

    #[test]
    fn oversized_padding_is_corrupt() {
        let mut bytes = Vec::new();
        write_header(&mut bytes, &FrequencyTable::new(), 0).unwrap();
        bytes[256 * 8..].copy_from_slice(&64u64.to_le_bytes());
        assert!(matches!(
            read_header(&mut Cursor::new(&bytes)),
            Err(HuffmanError::Corrupt(_))
        ));
    }
}
