//! The static magnitude-class code table.
//!
//! Each magnitude class `n` (the bit length of a delta's magnitude) maps to a
//! fixed prefix code. The table merges two code families: six short codes of
//! two or three bits for classes 0 to 5, then codes of the form `1…10` that
//! grow by one bit per class from class 6 onward:
//!
//! | class | code           | bits |
//! |-------|----------------|------|
//! | 0     | `00`           | 2    |
//! | 1     | `010`          | 3    |
//! | 2     | `011`          | 3    |
//! | 3     | `100`          | 3    |
//! | 4     | `101`          | 3    |
//! | 5     | `110`          | 3    |
//! | 6     | `1110`         | 4    |
//! | 7     | `11110`        | 5    |
//! | …     | …              | …    |
//! | 14    | `111111111110` | 12   |
//!
//! The table is prefix-free. The all-ones 12-bit pattern is unassigned.

use crate::error::CodecError;

/// Number of entries in the table (classes `0..=14`).
pub const NUM_CLASSES: usize = 15;

/// Largest magnitude class the table can represent.
pub const MAX_CLASS: u32 = 14;

/// Length in bits of the longest prefix code.
pub const MAX_PREFIX_LEN: u8 = 12;

const PREFIX_BITS: [u16; NUM_CLASSES] = [
    0b00,
    0b010,
    0b011,
    0b100,
    0b101,
    0b110,
    0b1110,
    0b11110,
    0b111110,
    0b1111110,
    0b11111110,
    0b111111110,
    0b1111111110,
    0b11111111110,
    0b111111111110,
];

const PREFIX_LENS: [u8; NUM_CLASSES] = [2, 3, 3, 3, 3, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

/// A prefix code: the low `len` bits of `bits`, most significant bit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixCode {
    pub bits: u16,
    pub len: u8,
}

impl PrefixCode {
    /// Returns `true` if `self` is a bit-prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &PrefixCode) -> bool {
        if self.len > other.len {
            return false;
        }
        other.bits >> (other.len - self.len) == self.bits
    }
}

/// Returns the prefix code for magnitude class `class`.
pub fn code_for(class: u32) -> Result<PrefixCode, CodecError> {
    if class > MAX_CLASS {
        return Err(CodecError::TableIndex(class));
    }
    let idx = class as usize;
    Ok(PrefixCode {
        bits: PREFIX_BITS[idx],
        len: PREFIX_LENS[idx],
    })
}

/// Reverse lookup: the class whose code is exactly the low `len` bits of `bits`.
pub fn class_for(bits: u16, len: u8) -> Option<u32> {
    PREFIX_BITS
        .iter()
        .zip(PREFIX_LENS.iter())
        .position(|(&b, &l)| l == len && b == bits)
        .map(|idx| idx as u32)
}

/// Iterates over every `(class, code)` pair in class order.
pub fn codes() -> impl Iterator<Item = (u32, PrefixCode)> {
    PREFIX_BITS
        .iter()
        .zip(PREFIX_LENS.iter())
        .enumerate()
        .map(|(idx, (&bits, &len))| (idx as u32, PrefixCode { bits, len }))
}
