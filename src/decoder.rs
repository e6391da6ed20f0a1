//! Packed bytes back to deltas and samples.
//!
//! Every codeword is at least two bits long, so the bit count bounds how many
//! codewords a stream can hold regardless of the count it is asked for.

use crate::delta::{self, Delta, Sample};
use crate::error::DecodeError;
use crate::packer::{BitReader, PackedBytes};
use crate::table::{self, MAX_PREFIX_LEN};

/// The decoder: the mirror of [`SampleEncoder`](crate::SampleEncoder) and
/// [`BitPacker`](crate::BitPacker).
///
/// The packed stream carries no header, so the number of codewords comes
/// from out-of-band knowledge ([`PackedBytes::count`] or the configured batch
/// size). Zero padding at the end is never decoded as class-0 codewords.
///
/// A mantissa whose top bit is set decodes to a positive delta; otherwise it
/// is the one's complement of a negative delta's magnitude.
///
/// # Example
/// ```
/// use lec::{pack, Decoder, MantissaMode, PartialBytePolicy, SampleEncoder};
///
/// let codewords = SampleEncoder::new(MantissaMode::Corrected)
///     .encode(&[10, 0, -3])
///     .unwrap();
/// let packed = pack(&codewords, PartialBytePolicy::PadPartialByte);
/// assert_eq!(Decoder::decode_deltas(&packed).unwrap(), vec![10, 0, -3]);
/// ```
pub struct Decoder;

impl Decoder {
    /// Decodes all `packed.count` deltas.
    pub fn decode_deltas(packed: &PackedBytes) -> Result<Vec<Delta>, DecodeError> {
        Self::decode_raw(&packed.bytes, packed.total_bits, packed.count)
    }

    /// Decodes `count` deltas from raw bytes and a meaningful bit count.
    pub fn decode_raw(
        bytes: &[u8],
        total_bits: usize,
        count: usize,
    ) -> Result<Vec<Delta>, DecodeError> {
        let mut reader = BitReader::from_raw(bytes, total_bits);
        let mut out = Vec::with_capacity(count.min(total_bits / 2 + 1));
        for index in 0..count {
            out.push(Self::decode_one(&mut reader, index)?);
        }
        Ok(out)
    }

    /// Decodes the deltas and re-accumulates them into samples.
    pub fn decode_samples(
        packed: &PackedBytes,
        reference: i32,
    ) -> Result<Vec<Sample>, DecodeError> {
        let deltas = Self::decode_deltas(packed)?;
        delta::accumulate(&deltas, reference)
    }

    /// Returns an iterator that lazily decodes the deltas of a packed batch.
    pub fn iter(packed: &PackedBytes) -> DecoderIter<'_> {
        Self::iter_raw(&packed.bytes, packed.total_bits, packed.count)
    }

    /// Lazy counterpart of [`decode_raw`](Self::decode_raw).
    pub fn iter_raw(bytes: &[u8], total_bits: usize, count: usize) -> DecoderIter<'_> {
        DecoderIter {
            reader: BitReader::from_raw(bytes, total_bits),
            index: 0,
            count,
            done: false,
        }
    }

    /// Decodes one codeword: a prefix code, then `class` mantissa bits.
    fn decode_one(reader: &mut BitReader<'_>, index: usize) -> Result<Delta, DecodeError> {
        let class = Self::decode_class(reader, index)?;
        if class == 0 {
            return Ok(0);
        }
        let m = reader
            .read_bits(class as u8)
            .ok_or(DecodeError::UnexpectedEnd { index })? as Delta;
        if (m >> (class - 1)) & 1 == 1 {
            Ok(m)
        } else {
            Ok(m - ((1 << class) - 1))
        }
    }

    /// Walks the prefix one bit at a time until it matches a table entry.
    fn decode_class(reader: &mut BitReader<'_>, index: usize) -> Result<u32, DecodeError> {
        let mut bits: u16 = 0;
        for len in 1..=MAX_PREFIX_LEN {
            let bit = reader.read_bit().ok_or(DecodeError::UnexpectedEnd { index })?;
            bits = (bits << 1) | bit as u16;
            if let Some(class) = table::class_for(bits, len) {
                return Ok(class);
            }
        }
        Err(DecodeError::InvalidPrefix { index })
    }
}

// ── Lazy iterator ──────────────────────────────────────────────────────

/// A lazy iterator that yields the deltas of a packed batch.
pub struct DecoderIter<'a> {
    reader: BitReader<'a>,
    index: usize,
    count: usize,
    done: bool,
}

impl<'a> Iterator for DecoderIter<'a> {
    type Item = Result<Delta, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.index >= self.count {
            return None;
        }
        let result = Decoder::decode_one(&mut self.reader, self.index);
        self.index += 1;
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}
