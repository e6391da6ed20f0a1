//! Byte packing of codewords for the serial link, and the matching reader.
//!
//! Each codeword is bit-reversed over a full 32-bit word, shifted so its
//! valid bits sit at the low end, and then popped one bit at a time (least
//! significant first) into an 8-bit accumulator. A byte is emitted every
//! time the accumulator fills, first accumulated bit in the MSB. The net
//! wire order is every codeword MSB first, one after another, with no
//! alignment between codewords.

use crate::config::PartialBytePolicy;
use crate::encoder::Codeword;

/// Width of the machine word the codeword is reversed over.
pub const WORD_BITS: u32 = 32;

/// Reverses the bit order of `value` over the full 32-bit word.
#[inline]
pub fn reverse_word(value: u32) -> u32 {
    value.reverse_bits()
}

/// A packed batch, ready for the byte transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBytes {
    /// The bytes to transmit.
    pub bytes: Vec<u8>,
    /// Number of meaningful bits in `bytes` (padding excluded).
    pub total_bits: usize,
    /// Number of codewords (samples) packed.
    pub count: usize,
    /// Trailing bits discarded under [`PartialBytePolicy::DropPartialByte`].
    pub dropped_bits: u8,
}

/// Rolling bit accumulator that turns codewords into whole bytes.
#[derive(Debug, Clone)]
pub struct BitPacker {
    bytes: Vec<u8>,
    /// Bits accumulated so far for the next byte.
    acc: u8,
    /// Number of valid bits in `acc` (0..=7).
    acc_bits: u8,
    count: usize,
    policy: PartialBytePolicy,
}

impl BitPacker {
    pub fn new(policy: PartialBytePolicy) -> Self {
        Self::with_capacity(0, policy)
    }

    /// Creates a packer with `capacity` bytes pre-allocated.
    pub fn with_capacity(capacity: usize, policy: PartialBytePolicy) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            acc: 0,
            acc_bits: 0,
            count: 0,
            policy,
        }
    }

    /// Total number of bits pushed so far.
    #[inline]
    pub fn len_bits(&self) -> usize {
        self.bytes.len() * 8 + self.acc_bits as usize
    }

    /// Number of bits waiting in the accumulator for a full byte.
    #[inline]
    pub fn pending_bits(&self) -> u8 {
        self.acc_bits
    }

    /// Pushes a single bit into the accumulator.
    #[inline]
    pub fn push_bit(&mut self, bit: bool) {
        self.acc = (self.acc << 1) | bit as u8;
        self.acc_bits += 1;
        if self.acc_bits == 8 {
            self.bytes.push(self.acc);
            self.acc = 0;
            self.acc_bits = 0;
        }
    }

    /// Pushes the valid bits of one codeword. A width above [`WORD_BITS`]
    /// is clamped to the full word.
    pub fn push_codeword(&mut self, cw: Codeword) {
        let n = (cw.num_valid_bits as u32).min(WORD_BITS);
        self.count += 1;
        if n == 0 {
            return;
        }
        let mut word = reverse_word(cw.value) >> (WORD_BITS - n);
        for _ in 0..n {
            self.push_bit(word & 1 == 1);
            word >>= 1;
        }
    }

    /// Flushes the accumulator according to the partial-byte policy.
    pub fn finish(mut self) -> PackedBytes {
        let total_bits = self.len_bits();
        let mut dropped_bits = 0;
        if self.acc_bits > 0 {
            match self.policy {
                PartialBytePolicy::PadPartialByte => {
                    self.bytes.push(self.acc << (8 - self.acc_bits));
                }
                PartialBytePolicy::DropPartialByte => {
                    log::warn!(
                        "dropping {} trailing bits of a {}-codeword batch",
                        self.acc_bits,
                        self.count
                    );
                    dropped_bits = self.acc_bits;
                }
            }
        }
        PackedBytes {
            total_bits: total_bits - dropped_bits as usize,
            bytes: self.bytes,
            count: self.count,
            dropped_bits,
        }
    }
}

/// Packs a whole codeword sequence in one go.
pub fn pack(codewords: &[Codeword], policy: PartialBytePolicy) -> PackedBytes {
    let total: usize = codewords
        .iter()
        .map(|cw| (cw.num_valid_bits as u32).min(WORD_BITS) as usize)
        .sum();
    let mut packer = BitPacker::with_capacity(total.div_ceil(8), policy);
    for &cw in codewords {
        packer.push_codeword(cw);
    }
    packer.finish()
}

/// A cursor for reading bits MSB first from packed bytes.
#[derive(Debug)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    /// Total number of valid bits.
    total_bits: usize,
    /// Current bit position (0-indexed from the start).
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a reader over the meaningful bits of a packed batch.
    pub fn new(packed: &'a PackedBytes) -> Self {
        Self::from_raw(&packed.bytes, packed.total_bits)
    }

    /// Creates a `BitReader` from raw bytes and a total bit count.
    /// The count is clamped to the bits actually present.
    pub fn from_raw(bytes: &'a [u8], total_bits: usize) -> Self {
        Self {
            bytes,
            total_bits: total_bits.min(bytes.len() * 8),
            pos: 0,
        }
    }

    /// Returns the number of bits remaining.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.total_bits.saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bits to read.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.total_bits
    }

    /// Reads a single bit. Returns `None` if exhausted.
    #[inline]
    pub fn read_bit(&mut self) -> Option<bool> {
        if self.pos >= self.total_bits {
            return None;
        }
        let byte_idx = self.pos / 8;
        let bit_idx = self.pos % 8;
        self.pos += 1;
        Some((self.bytes[byte_idx] >> (7 - bit_idx)) & 1 == 1)
    }

    /// Reads `n` bits (`n <= 32`) MSB first. Returns `None` if not enough bits remain.
    pub fn read_bits(&mut self, n: u8) -> Option<u32> {
        debug_assert!(n as u32 <= WORD_BITS);
        if self.remaining() < n as usize {
            return None;
        }
        let mut value: u32 = 0;
        for _ in 0..n {
            value = (value << 1) | (self.read_bit()? as u32);
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_word_is_full_width() {
        assert_eq!(reverse_word(1), 0x8000_0000);
        assert_eq!(reverse_word(0b110), 0x6000_0000);
        assert_eq!(reverse_word(0xFFFF_0000), 0x0000_FFFF);
        assert_eq!(reverse_word(reverse_word(0xDEAD_BEEF)), 0xDEAD_BEEF);
    }

    #[test]
    fn test_codeword_goes_out_msb_first() {
        let packed = pack(&[Codeword::new(0b1011_0001, 8)], PartialBytePolicy::PadPartialByte);
        assert_eq!(packed.bytes, vec![0b1011_0001]);
        assert_eq!(packed.total_bits, 8);
    }

    #[test]
    fn test_bits_above_valid_width_are_ignored() {
        let packed = pack(&[Codeword::new(0xFFFF_FF05, 4)], PartialBytePolicy::PadPartialByte);
        assert_eq!(packed.bytes, vec![0b0101_0000]);
    }

    #[test]
    fn test_packing_across_byte_boundaries() {
        let cws = [
            Codeword::new(0b101, 3),
            Codeword::new(0b11_0011, 6),
            Codeword::new(0b1111_000, 7),
        ];
        let packed = pack(&cws, PartialBytePolicy::PadPartialByte);
        // 101 110011 1111000 -> 10111001 11111000
        assert_eq!(packed.bytes, vec![0b1011_1001, 0b1111_1000]);
        assert_eq!(packed.total_bits, 16);
        assert_eq!(packed.count, 3);
        assert_eq!(packed.dropped_bits, 0);
    }

    #[test]
    fn test_exact_multiple_of_eight_has_no_padding() {
        let cws = vec![Codeword::new(0b1010, 4); 6];
        for policy in [PartialBytePolicy::PadPartialByte, PartialBytePolicy::DropPartialByte] {
            let packed = pack(&cws, policy);
            assert_eq!(packed.bytes, vec![0xAA; 3]);
            assert_eq!(packed.total_bits, 24);
            assert_eq!(packed.dropped_bits, 0);
        }
    }

    #[test]
    fn test_pad_partial_byte() {
        let cws = [Codeword::new(0xFF, 8), Codeword::new(0b101, 3)];
        let packed = pack(&cws, PartialBytePolicy::PadPartialByte);
        assert_eq!(packed.bytes, vec![0xFF, 0b1010_0000]);
        assert_eq!(packed.total_bits, 11);
        assert_eq!(packed.dropped_bits, 0);
    }

    #[test]
    fn test_drop_partial_byte() {
        let cws = [Codeword::new(0xFF, 8), Codeword::new(0b101, 3)];
        let packed = pack(&cws, PartialBytePolicy::DropPartialByte);
        assert_eq!(packed.bytes, vec![0xFF]);
        assert_eq!(packed.total_bits, 8);
        assert_eq!(packed.dropped_bits, 3);
    }

    #[test]
    fn test_empty_input() {
        let packed = pack(&[], PartialBytePolicy::PadPartialByte);
        assert!(packed.bytes.is_empty());
        assert_eq!(packed.total_bits, 0);
        assert_eq!(packed.count, 0);
    }

    #[test]
    fn test_incremental_packer_state() {
        let mut packer = BitPacker::new(PartialBytePolicy::PadPartialByte);
        packer.push_codeword(Codeword::new(0b00, 2));
        assert_eq!(packer.pending_bits(), 2);
        packer.push_codeword(Codeword::new(0b010_1, 4));
        assert_eq!(packer.pending_bits(), 6);
        packer.push_codeword(Codeword::new(0b011_10, 5));
        assert_eq!(packer.pending_bits(), 3);
        assert_eq!(packer.len_bits(), 11);
        let packed = packer.finish();
        // 00 0101 01110 -> 00010101 110(00000)
        assert_eq!(packed.bytes, vec![0b0001_0101, 0b1100_0000]);
    }

    #[test]
    fn test_widest_codeword() {
        let value = (0b111111111110 << 14) | 0x2AAA;
        let packed = pack(&[Codeword::new(value, 26)], PartialBytePolicy::PadPartialByte);
        let mut reader = BitReader::new(&packed);
        assert_eq!(reader.read_bits(26), Some(value));
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_codeword_wider_than_word_is_clamped() {
        let packed = pack(&[Codeword::new(1, 33)], PartialBytePolicy::PadPartialByte);
        assert_eq!(packed.bytes, vec![0, 0, 0, 1]);
        assert_eq!(packed.total_bits, 32);
        assert_eq!(packed.count, 1);
    }

    #[test]
    fn test_reader_stops_at_total_bits() {
        let packed = pack(&[Codeword::new(0b101, 3)], PartialBytePolicy::PadPartialByte);
        let mut reader = BitReader::new(&packed);
        assert_eq!(reader.remaining(), 3);
        assert_eq!(reader.read_bits(4), None);
        assert_eq!(reader.read_bits(3), Some(0b101));
        assert_eq!(reader.read_bit(), None);
    }

    #[test]
    fn test_reader_from_raw_clamps() {
        let bytes = [0b1000_0000];
        let mut reader = BitReader::from_raw(&bytes, 100);
        assert_eq!(reader.remaining(), 8);
        assert_eq!(reader.read_bit(), Some(true));
        assert_eq!(reader.read_bits(7), Some(0));
        assert!(reader.is_exhausted());
    }
}
