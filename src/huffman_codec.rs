use std::io::{Read, Write};

use tracing::{debug, info};

use crate::bit_vec::{BitReader, BitVec, PackedBits, Word};
use crate::code_table::{CodeTable, MAX_CODE_LEN};
use crate::compressed_data::CompressedData;
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::hufftree::{HuffNode, HuffmanTree};

/// Sizes of one whole-file run, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl CompressionStats {
    /// Compressed size as a fraction of the original; 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            0.0
        } else {
            self.compressed_bytes as f64 / self.original_bytes as f64
        }
    }
}

/// Packs every byte's code, in input order, into `W`-wide words.
pub fn pack_symbols<W: Word>(data: &[u8], table: &CodeTable) -> Result<PackedBits<W>> {
    let initial_words = (data.len() / std::mem::size_of::<W>()).max(2);
    let mut bit_vec = BitVec::with_capacity(initial_words)?;
    for &byte in data {
        let code = table.get(byte).ok_or(HuffmanError::MissingCode(byte))?;
        bit_vec.push_bits(code.bits, code.len as u32)?;
    }
    bit_vec.finish()
}

/// Walks `tree` bit by bit until `expected` symbols have been produced.
///
/// A lone-leaf tree never descends, so it reads no bits at all and repeats its
/// symbol; its stream must be empty. Otherwise the stream must hold exactly
/// the bits for `expected` symbols.
pub fn unpack_symbols<W: Word>(
    packed: &PackedBits<W>,
    tree: &HuffmanTree,
    expected: u64,
) -> Result<Vec<u8>> {
    let expected_len = usize::try_from(expected).map_err(|_| {
        HuffmanError::corrupt(format!("{} symbols do not fit in memory", expected))
    })?;

    if let HuffNode::Leaf { byte, .. } = &tree.root {
        ensure_no_payload(packed)?;
        let mut result = reserve_output(expected_len)?;
        result.resize(expected_len, *byte);
        return Ok(result);
    }

    let mut reader = BitReader::new(packed)?;
    // every symbol costs at least one bit
    if expected_len > reader.remaining() {
        return Err(HuffmanError::corrupt(format!(
            "{} symbols declared but only {} bits of data",
            expected_len,
            reader.remaining()
        )));
    }

    let mut result = reserve_output(expected_len)?;
    let mut current_node = &tree.root;
    while result.len() < expected_len {
        let bit = reader.next_bit().ok_or_else(|| {
            HuffmanError::corrupt(format!(
                "ran out of bits after {} of {} symbols",
                result.len(),
                expected_len
            ))
        })?;
        current_node = current_node
            .child(bit)
            .ok_or_else(|| HuffmanError::corrupt("walked past a leaf"))?;
        if let HuffNode::Leaf { byte, .. } = current_node {
            result.push(*byte);
            current_node = &tree.root;
        }
    }

    if reader.remaining() > 0 {
        return Err(HuffmanError::corrupt(format!(
            "{} data bits left after {} symbols",
            reader.remaining(),
            expected_len
        )));
    }
    Ok(result)
}

/// Degenerate trees are encoded without payload words.
fn ensure_no_payload<W: Word>(packed: &PackedBits<W>) -> Result<()> {
    if packed.words.is_empty() && packed.padding_bits == 0 {
        return Ok(());
    }
    Err(HuffmanError::corrupt(format!(
        "{} payload words with {} padding bits for a tree that reads no bits",
        packed.words.len(),
        packed.padding_bits
    )))
}

fn reserve_output(len: usize) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    result
        .try_reserve_exact(len)
        .map_err(|_| HuffmanError::OutOfMemory {
            what: "decoded output",
            requested: len,
        })?;
    Ok(result)
}

/// Static Huffman model for one frequency table: the tree plus its code
/// table. An all-zero table has neither, and a tree too deep to encode has no
/// code table; decoding only walks the tree.
#[derive(Debug, Clone)]
pub struct HuffmanCodec {
    frequencies: FrequencyTable,
    tree: Option<HuffmanTree>,
    encode_table: Option<CodeTable>,
}

impl HuffmanCodec {
    pub fn new(frequencies: FrequencyTable) -> Result<Self> {
        let tree = HuffmanTree::from_frequencies(&frequencies)?;
        let encode_table = match &tree {
            Some(tree) if tree.depth() <= MAX_CODE_LEN => Some(CodeTable::from_tree(tree)?),
            _ => None,
        };
        Ok(HuffmanCodec {
            frequencies,
            tree,
            encode_table,
        })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::new(FrequencyTable::from_bytes(data))
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    pub fn tree(&self) -> Option<&HuffmanTree> {
        self.tree.as_ref()
    }

    pub fn table(&self) -> Option<&CodeTable> {
        self.encode_table.as_ref()
    }

    /// Encodes `data`, whose histogram must equal this codec's table since
    /// the table is what the decoder rebuilds from.
    pub fn encode(&self, data: &[u8]) -> Result<CompressedData> {
        info!(bytes = data.len(), "encoding started");
        if FrequencyTable::from_bytes(data) != self.frequencies {
            return Err(HuffmanError::FrequencyMismatch);
        }

        let packed = match &self.tree {
            Some(tree) if !tree.is_single_leaf() => match &self.encode_table {
                Some(table) => pack_symbols(data, table)?,
                // reports which leaf is too deep
                None => pack_symbols(data, &CodeTable::from_tree(tree)?)?,
            },
            _ => PackedBits::default(),
        };
        debug!(
            words = packed.words.len(),
            padding_bits = packed.padding_bits,
            "packed payload"
        );

        Ok(CompressedData {
            frequencies: self.frequencies.clone(),
            packed,
        })
    }

    pub fn decode(&self, packed: &PackedBits<u64>) -> Result<Vec<u8>> {
        let expected = self.frequencies.total()?;
        info!(bytes = expected, words = packed.words.len(), "decoding started");
        match &self.tree {
            Some(tree) => unpack_symbols(packed, tree, expected),
            None => {
                ensure_no_payload(packed)?;
                Ok(Vec::new())
            }
        }
    }

    pub fn compress(data: &[u8]) -> Result<CompressedData> {
        Self::from_bytes(data)?.encode(data)
    }

    pub fn decompress(compressed: &CompressedData) -> Result<Vec<u8>> {
        Self::new(compressed.frequencies.clone())?.decode(&compressed.packed)
    }

    /// Reads all of `input`, compresses it and writes the file layout to
    /// `output`.
    pub fn encode_from_file<R: Read, W: Write>(mut input: R, mut output: W) -> Result<CompressionStats> {
        let mut data = Vec::new();
        input.read_to_end(&mut data)?;

        let compressed = Self::compress(&data)?;
        compressed.write_to(&mut output)?;
        output.flush()?;

        let stats = CompressionStats {
            original_bytes: data.len() as u64,
            compressed_bytes: compressed.serialized_len() as u64,
        };
        info!(
            original = stats.original_bytes,
            compressed = stats.compressed_bytes,
            ratio = stats.ratio(),
            "encoding finished"
        );
        Ok(stats)
    }

    /// Reads a compressed file from `input` and writes the original bytes to
    /// `output`.
    pub fn decode_from_file<R: Read, W: Write>(mut input: R, mut output: W) -> Result<CompressionStats> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;

        let compressed = CompressedData::deserialize(&bytes)?;
        let decoded = Self::decompress(&compressed)?;
        output.write_all(&decoded)?;
        output.flush()?;

        let stats = CompressionStats {
            original_bytes: decoded.len() as u64,
            compressed_bytes: bytes.len() as u64,
        };
        info!(
            decoded = stats.original_bytes,
            compressed = stats.compressed_bytes,
            "decoding finished"
        );
        Ok(stats)
    }
}
