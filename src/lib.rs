//! # huffpack
//!
//! Static Huffman compression for whole files held in memory.
//!
//! A compressed file is the 256-entry frequency table, the number of padding
//! bits in the last packed word, and the packed 64-bit words, all
//! little-endian. The decoder rebuilds the same tree from the table.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use huffpack::HuffmanCodec;
//! use std::fs::File;
//!
//! // Compress a file
//! let input = File::open("input.txt")?;
//! let output = File::create("compressed.huff")?;
//! HuffmanCodec::encode_from_file(input, output)?;
//!
//! // Decompress a file
//! let compressed = File::open("compressed.huff")?;
//! let decompressed = File::create("output.txt")?;
//! HuffmanCodec::decode_from_file(compressed, decompressed)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bit_vec;
pub mod code_table;
pub mod compressed_data;
pub mod error;
pub mod frequency;
pub mod huffman_codec;
pub mod hufftree;
pub mod metadata;

// Internal modules - not part of public API
mod min_heap;

// Re-export main types for convenience
pub use bit_vec::PackedBits;
pub use code_table::{Code, CodeTable};
pub use compressed_data::CompressedData;
pub use error::{HuffmanError, Result};
pub use frequency::FrequencyTable;
pub use huffman_codec::{CompressionStats, HuffmanCodec};
pub use hufftree::HuffmanTree;
