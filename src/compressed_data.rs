use std::io::{self, Cursor, Write};

use crate::bit_vec::PackedBits;
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::metadata::{self, FIELD_LEN, HEADER_LEN};

/// Everything persisted for one compressed file:
/// `[256 x u64 counters][u64 padding][N x u64 words]`, all little-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedData {
    pub frequencies: FrequencyTable,
    pub packed: PackedBits<u64>,
}

impl CompressedData {
    /// Number of bytes the decoder will produce.
    pub fn original_len(&self) -> Result<u64> {
        self.frequencies.total()
    }

    pub fn serialized_len(&self) -> usize {
        HEADER_LEN + self.packed.words.len() * FIELD_LEN
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        metadata::write_header(writer, &self.frequencies, self.packed.padding_bits)?;
        for word in &self.packed.words {
            writer.write_all(&word.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn serialize(&self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.serialized_len());
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<CompressedData> {
        if bytes.len() < HEADER_LEN {
            return Err(HuffmanError::corrupt(format!(
                "{} bytes is shorter than the {}-byte header",
                bytes.len(),
                HEADER_LEN
            )));
        }
        let mut cursor = Cursor::new(bytes);
        let (frequencies, padding_bits) = metadata::read_header(&mut cursor)?;

        // the packed word count is implied by what is left
        let payload = &bytes[HEADER_LEN..];
        if payload.len() % FIELD_LEN != 0 {
            return Err(HuffmanError::corrupt(format!(
                "payload of {} bytes is not a whole number of words",
                payload.len()
            )));
        }
        let words = payload
            .chunks_exact(FIELD_LEN)
            .map(|chunk| {
                let mut word = [0u8; FIELD_LEN];
                word.copy_from_slice(chunk);
                u64::from_le_bytes(word)
            })
            .collect();

        Ok(CompressedData {
            frequencies,
            packed: PackedBits {
                words,
                padding_bits,
            },
        })
    }
}
