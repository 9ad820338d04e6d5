use crate::error::{HuffmanError, Result};

/// Number of distinct byte symbols.
pub const SYMBOLS: usize = 256;

/// Per-byte occurrence counts, indexed by symbol value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; SYMBOLS],
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable {
            counts: [0; SYMBOLS],
        }
    }

    pub fn from_counts(counts: [u64; SYMBOLS]) -> Self {
        FrequencyTable { counts }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut counts = [0u64; SYMBOLS];
        for &byte in bytes {
            counts[byte as usize] += 1;
        }
        FrequencyTable { counts }
    }

    pub fn get(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    pub fn counts(&self) -> &[u64; SYMBOLS] {
        &self.counts
    }

    /// Sum of all counters. A table read from disk may overflow; that is
    /// reported as corruption.
    pub fn total(&self) -> Result<u64> {
        self.counts
            .iter()
            .try_fold(0u64, |acc, &count| acc.checked_add(count))
            .ok_or_else(|| HuffmanError::corrupt("frequency table total overflows 64 bits"))
    }

    /// Non-zero `(symbol, count)` pairs in ascending symbol order.
    pub fn symbols(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.distinct() == 0
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}
