use std::fmt::Debug;

use tracing::trace;

use crate::error::{HuffmanError, Result};

/// Fixed-width unsigned word the packed stream is made of.
pub trait Word: Copy + Default + Debug + PartialEq {
    const BITS: u32;

    /// Keeps the low `BITS` bits of `bits`.
    fn from_bits(bits: u64) -> Self;

    fn to_bits(self) -> u64;
}

macro_rules! impl_word {
    ($($t:ty),*) => {
        $(
            impl Word for $t {
                const BITS: u32 = <$t>::BITS;

                #[inline]
                fn from_bits(bits: u64) -> Self {
                    bits as $t
                }

                #[inline]
                fn to_bits(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

impl_word!(u8, u16, u32, u64);

#[inline]
fn low_mask(n: u32) -> u64 {
    if n >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Finished bitstream: full words, the last one zero-padded in its low
/// `padding_bits` bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedBits<W: Word> {
    pub words: Vec<W>,
    pub padding_bits: u32,
}

impl<W: Word> PackedBits<W> {
    /// Number of meaningful bits, padding excluded.
    pub fn bit_len(&self) -> usize {
        (self.words.len() * W::BITS as usize).saturating_sub(self.padding_bits as usize)
    }
}

/// MSB-first bit accumulator that emits one word each time `W::BITS` bits
/// are collected.
#[derive(Debug)]
pub struct BitVec<W: Word> {
    words: Vec<W>,
    acc: u64,
    free: u32,
}

impl<W: Word> BitVec<W> {
    pub fn new() -> Self {
        BitVec {
            words: Vec::new(),
            acc: 0,
            free: W::BITS,
        }
    }

    pub fn with_capacity(words: usize) -> Result<Self> {
        let mut bit_vec = Self::new();
        bit_vec
            .words
            .try_reserve_exact(words)
            .map_err(|_| HuffmanError::OutOfMemory {
                what: "packed output",
                requested: words,
            })?;
        Ok(bit_vec)
    }

    pub fn bit_len(&self) -> usize {
        self.words.len() * W::BITS as usize + (W::BITS - self.free) as usize
    }

    /// Appends the low `bit_length` bits of `code`, most significant first.
    pub fn push_bits(&mut self, code: u64, bit_length: u32) -> Result<()> {
        debug_assert!(bit_length <= u64::BITS);
        let mut remaining = bit_length;
        while remaining > 0 {
            let take = remaining.min(self.free);
            let rest = remaining - take;
            let chunk = (code >> rest) & low_mask(take);
            // shifting by the full accumulator width leaves nothing behind
            self.acc = self.acc.checked_shl(take).unwrap_or(0) | chunk;
            self.free -= take;
            remaining = rest;
            if self.free == 0 {
                self.flush_word()?;
            }
        }
        Ok(())
    }

    fn flush_word(&mut self) -> Result<()> {
        self.grow()?;
        self.words.push(W::from_bits(self.acc));
        self.acc = 0;
        self.free = W::BITS;
        Ok(())
    }

    // capacity doubles when full
    fn grow(&mut self) -> Result<()> {
        if self.words.len() < self.words.capacity() {
            return Ok(());
        }
        let additional = self.words.capacity().max(2);
        let requested = self.words.capacity() + additional;
        self.words
            .try_reserve_exact(additional)
            .map_err(|_| HuffmanError::OutOfMemory {
                what: "packed output",
                requested,
            })?;
        trace!(capacity = self.words.capacity(), "packed output grew");
        Ok(())
    }

    /// Left-aligns the final partial word and records how many low bits of it
    /// are padding.
    pub fn finish(mut self) -> Result<PackedBits<W>> {
        let padding_bits = if self.free < W::BITS {
            let padding = self.free;
            self.acc <<= padding;
            self.flush_word()?;
            padding
        } else {
            0
        };
        Ok(PackedBits {
            words: self.words,
            padding_bits,
        })
    }
}

impl<W: Word> Default for BitVec<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads the meaningful bits of a [`PackedBits`] one at a time, MSB-first.
#[derive(Debug)]
pub struct BitReader<'a, W: Word> {
    words: &'a [W],
    position: usize,
    limit: usize,
}

impl<'a, W: Word> BitReader<'a, W> {
    pub fn new(packed: &'a PackedBits<W>) -> Result<Self> {
        if packed.padding_bits >= W::BITS {
            return Err(HuffmanError::corrupt(format!(
                "padding of {} bits does not fit a {}-bit word",
                packed.padding_bits,
                W::BITS
            )));
        }
        match packed.words.last() {
            None if packed.padding_bits > 0 => {
                return Err(HuffmanError::corrupt(format!(
                    "{} padding bits but no packed words",
                    packed.padding_bits
                )));
            }
            Some(last) if last.to_bits() & low_mask(packed.padding_bits) != 0 => {
                return Err(HuffmanError::corrupt("padding bits are not zero"));
            }
            _ => {}
        }
        Ok(BitReader {
            words: &packed.words,
            position: 0,
            limit: packed.bit_len(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn next_bit(&mut self) -> Option<bool> {
        if self.position >= self.limit {
            return None;
        }
        let word_bits = W::BITS as usize;
        let word = self.words[self.position / word_bits].to_bits();
        let shift = W::BITS - 1 - (self.position % word_bits) as u32;
        self.position += 1;
        Some((word >> shift) & 1 == 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn read_all<W: Word>(packed: &PackedBits<W>) -> Vec<bool> {
        let mut reader = BitReader::new(packed).unwrap();
        std::iter::from_fn(|| reader.next_bit()).collect()
    }

    fn bits_of(code: u64, len: u32) -> Vec<bool> {
        (0..len).rev().map(|i| (code >> i) & 1 == 1).collect()
    }

    #[test]
    fn partial_word_is_left_aligned_with_padding() {
        let mut bit_vec: BitVec<u8> = BitVec::new();
        bit_vec.push_bits(0b10, 2).unwrap();
        bit_vec.push_bits(0b0, 1).unwrap();
        bit_vec.push_bits(0b11, 2).unwrap();
        let packed = bit_vec.finish().unwrap();
        assert_eq!(packed.words, vec![0b1001_1000]);
        assert_eq!(packed.padding_bits, 3);
        assert_eq!(packed.bit_len() + packed.padding_bits as usize, 8);
    }

    #[test]
    fn exactly_full_word_has_no_padding() {
        let mut bit_vec: BitVec<u8> = BitVec::new();
        bit_vec.push_bits(0b101, 3).unwrap();
        bit_vec.push_bits(0b01100, 5).unwrap();
        assert_eq!(bit_vec.bit_len(), 8);
        let packed = bit_vec.finish().unwrap();
        assert_eq!(packed.words, vec![0b1010_1100]);
        assert_eq!(packed.padding_bits, 0);
    }

    #[test]
    fn code_split_across_words() {
        let mut bit_vec: BitVec<u8> = BitVec::new();
        bit_vec.push_bits(0b111111, 6).unwrap();
        bit_vec.push_bits(0b0101, 4).unwrap();
        let packed = bit_vec.finish().unwrap();
        assert_eq!(packed.words, vec![0b1111_1101, 0b0100_0000]);
        assert_eq!(packed.padding_bits, 6);
    }

    #[test]
    fn code_longer_than_a_word_spans_several() {
        let mut bit_vec: BitVec<u8> = BitVec::new();
        bit_vec.push_bits(0b1, 1).unwrap();
        bit_vec.push_bits(0xABCD, 16).unwrap();
        let packed = bit_vec.finish().unwrap();
        assert_eq!(packed.words, vec![0b1101_0101, 0b1110_0110, 0b1000_0000]);
        assert_eq!(packed.padding_bits, 7);
    }

    #[test]
    fn full_width_code_in_u64_words() {
        let mut bit_vec: BitVec<u64> = BitVec::new();
        bit_vec.push_bits(u64::MAX, 64).unwrap();
        bit_vec.push_bits(0b1, 1).unwrap();
        bit_vec.push_bits(0x8000_0000_0000_0001, 64).unwrap();
        let packed = bit_vec.finish().unwrap();
        assert_eq!(
            packed.words,
            vec![u64::MAX, 0xC000_0000_0000_0000, 0x8000_0000_0000_0000]
        );
        assert_eq!(packed.padding_bits, 63);
        assert_eq!(packed.bit_len(), 129);
    }

    #[test]
    fn empty_stream_has_no_words() {
        let packed = BitVec::<u64>::new().finish().unwrap();
        assert!(packed.words.is_empty());
        assert_eq!(packed.padding_bits, 0);
        assert!(read_all(&packed).is_empty());
    }

    #[test]
    fn output_grows_past_initial_capacity() {
        let mut bit_vec: BitVec<u16> = BitVec::with_capacity(1).unwrap();
        for i in 0..1000u64 {
            bit_vec.push_bits(i & 0x1f, 5).unwrap();
        }
        let packed = bit_vec.finish().unwrap();
        assert_eq!(packed.bit_len(), 5000);
        let bits = read_all(&packed);
        let expected: Vec<bool> = (0..1000u64).flat_map(|i| bits_of(i & 0x1f, 5)).collect();
        assert_eq!(bits, expected);
    }

    // every (free bits, code length) pair around the fits/split boundary
    #[test]
    fn boundary_lengths_neither_drop_nor_duplicate_bits() {
        for lead in 0..=8u32 {
            for len in 1..=17u32 {
                for pattern in [0u64, u64::MAX, 0xA5A5_A5A5_A5A5_A5A5, 0x5A5A_5A5A_5A5A_5A5A] {
                    let code = pattern & low_mask(len);
                    let lead_code = !pattern & low_mask(lead);
                    let mut bit_vec: BitVec<u8> = BitVec::new();
                    bit_vec.push_bits(lead_code, lead).unwrap();
                    bit_vec.push_bits(code, len).unwrap();
                    bit_vec.push_bits(0b1, 1).unwrap();
                    let packed = bit_vec.finish().unwrap();

                    let mut expected = bits_of(lead_code, lead);
                    expected.extend(bits_of(code, len));
                    expected.push(true);
                    assert_eq!(read_all(&packed), expected, "lead={lead} len={len}");
                    assert_eq!(
                        packed.padding_bits as usize,
                        (8 - expected.len() % 8) % 8
                    );
                }
            }
        }
    }

    #[test]
    fn reader_rejects_oversized_padding() {
        let packed = PackedBits {
            words: vec![0u8],
            padding_bits: 8,
        };
        assert!(matches!(BitReader::new(&packed), Err(HuffmanError::Corrupt(_))));
    }

    #[test]
    fn reader_rejects_padding_without_words() {
        let packed: PackedBits<u32> = PackedBits {
            words: vec![],
            padding_bits: 3,
        };
        assert!(matches!(BitReader::new(&packed), Err(HuffmanError::Corrupt(_))));
    }

    #[test]
    fn reader_rejects_non_zero_padding() {
        let packed = PackedBits {
            words: vec![0b1010_0001u8],
            padding_bits: 4,
        };
        assert!(matches!(BitReader::new(&packed), Err(HuffmanError::Corrupt(_))));
    }

    #[test]
    fn reader_stops_at_padding() {
        let packed = PackedBits {
            words: vec![0b1111_1111u8, 0b0100_0000],
            padding_bits: 6,
        };
        let mut reader = BitReader::new(&packed).unwrap();
        assert_eq!(reader.remaining(), 10);
        let bits: Vec<bool> = std::iter::from_fn(|| reader.next_bit()).collect();
        assert_eq!(bits.len(), 10);
        assert_eq!(&bits[8..], &[false, true]);
        assert_eq!(reader.remaining(), 0);
    }
}
