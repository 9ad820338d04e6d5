use std::fmt;

use tracing::debug;

use crate::error::{HuffmanError, Result};
use crate::frequency::SYMBOLS;
use crate::hufftree::{HuffNode, HuffmanTree};

/// Longest code a table entry can hold.
pub const MAX_CODE_LEN: usize = u64::BITS as usize;

/// Right-aligned bit pattern of `len` bits; 0 is left, 1 is right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code {
    pub bits: u64,
    pub len: u8,
}

impl Code {
    /// True when `self` is a bit-prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }
}

/// Symbol -> code lookup. Symbols absent from the tree have `len == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Code; SYMBOLS],
}

impl CodeTable {
    pub fn from_tree(tree: &HuffmanTree) -> Result<Self> {
        let mut codes = [Code::default(); SYMBOLS];
        match &tree.root {
            // a lone leaf has no path, give it the shortest valid code
            HuffNode::Leaf { byte, .. } => {
                codes[*byte as usize] = Code { bits: 0, len: 1 };
            }
            root => assign_codes(root, &mut codes, 0, 0)?,
        }

        let table = CodeTable { codes };
        for (byte, code) in table.iter() {
            debug!(byte, code = code.bits, len = code.len, "code table entry");
        }
        Ok(table)
    }

    pub fn get(&self, byte: u8) -> Option<Code> {
        let code = self.codes[byte as usize];
        (code.len > 0).then_some(code)
    }

    /// Coded symbols in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, code)| code.len > 0)
            .map(|(byte, code)| (byte as u8, *code))
    }

    pub fn max_len(&self) -> u8 {
        self.codes.iter().map(|code| code.len).max().unwrap_or(0)
    }
}

fn assign_codes(node: &HuffNode, codes: &mut [Code; SYMBOLS], bits: u64, depth: usize) -> Result<()> {
    match node {
        HuffNode::Leaf { byte, .. } => {
            if depth > MAX_CODE_LEN {
                return Err(HuffmanError::CodeTooLong { byte: *byte, depth });
            }
            codes[*byte as usize] = Code {
                bits,
                len: depth as u8,
            };
            Ok(())
        }
        HuffNode::Internal { left, right, .. } => {
            // shifted-out bits only matter past MAX_CODE_LEN, where the leaf check fires
            assign_codes(left, codes, bits.wrapping_shl(1), depth + 1)?;
            assign_codes(right, codes, bits.wrapping_shl(1) | 1, depth + 1)
        }
    }
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (byte, code) in self.iter() {
            writeln!(
                f,
                "{:?} ({:#04x}) -> {:0width$b} [{}]",
                byte as char,
                byte,
                code.bits,
                code.len,
                width = code.len as usize
            )?;
        }
        Ok(())
    }
}
