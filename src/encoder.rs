//! Delta to codeword encoding.
//!
//! Each delta becomes a prefix code for its magnitude class followed by that
//! many mantissa bits.

use crate::config::MantissaMode;
use crate::delta::Delta;
use crate::error::CodecError;
use crate::table::{self, MAX_CLASS};

/// One encoded sample: a prefix code followed by `class` mantissa bits, held
/// in the low `num_valid_bits` bits of `value` (prefix most significant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codeword {
    pub value: u32,
    pub num_valid_bits: u8,
}

impl Codeword {
    pub fn new(value: u32, num_valid_bits: u8) -> Self {
        Self {
            value,
            num_valid_bits,
        }
    }
}

/// Returns the magnitude class of `delta`: the bit length of `|delta|`,
/// or `0` for a zero delta.
///
/// This equals `ceil(log2(|delta| + 1))`. The plain `ceil(log2(|delta|))`
/// is one short at exact powers of two and would leave the mantissa a bit
/// too narrow to carry the magnitude.
#[inline]
pub fn magnitude_class(delta: Delta) -> u32 {
    Delta::BITS - delta.unsigned_abs().leading_zeros()
}

/// The sample encoder: turns deltas into `(codeword, numValidBits)` pairs.
///
/// For each delta `d` with magnitude class `n`:
///
/// | delta    | mantissa (low `n` bits of)                                 |
/// |----------|------------------------------------------------------------|
/// | `d == 0` | none                                                       |
/// | `d > 0`  | `d`                                                        |
/// | `d < 0`  | `d - 1` (corrected) or the previous delta's magnitude (legacy) |
///
/// # Example
/// ```
/// use lec::{Codeword, MantissaMode, SampleEncoder};
///
/// let encoder = SampleEncoder::new(MantissaMode::Corrected);
/// let codewords = encoder.encode(&[10, 0, 2]).unwrap();
/// assert_eq!(codewords[0], Codeword::new(0b101_1010, 7));
/// assert_eq!(codewords[1], Codeword::new(0b00, 2));
/// assert_eq!(codewords[2], Codeword::new(0b011_10, 5));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleEncoder {
    mode: MantissaMode,
}

impl SampleEncoder {
    pub fn new(mode: MantissaMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MantissaMode {
        self.mode
    }

    /// Encodes every delta, or fails on the first one the table cannot hold.
    pub fn encode(&self, deltas: &[Delta]) -> Result<Vec<Codeword>, CodecError> {
        let mut out = Vec::with_capacity(deltas.len());
        self.encode_into(deltas, &mut out)?;
        Ok(out)
    }

    /// Like [`encode`](Self::encode), but writes into a caller-owned buffer.
    ///
    /// The buffer is left empty on error so a failed batch never reaches the
    /// packer half-encoded.
    pub fn encode_into(
        &self,
        deltas: &[Delta],
        out: &mut Vec<Codeword>,
    ) -> Result<(), CodecError> {
        out.clear();
        let mut prev: Delta = 0;
        for (index, &d) in deltas.iter().enumerate() {
            match self.encode_delta(index, d, prev) {
                Ok(cw) => {
                    log::trace!(
                        "codeword {:#b} numValidBits {}",
                        cw.value,
                        cw.num_valid_bits
                    );
                    out.push(cw);
                }
                Err(e) => {
                    out.clear();
                    return Err(e);
                }
            }
            prev = d;
        }
        Ok(())
    }

    // ── internal helpers ───────────────────────────────────────────────

    fn encode_delta(
        &self,
        index: usize,
        delta: Delta,
        prev: Delta,
    ) -> Result<Codeword, CodecError> {
        let class = magnitude_class(delta);
        if class > MAX_CLASS {
            return Err(CodecError::MagnitudeOverflow {
                index,
                delta,
                class,
            });
        }

        let prefix = table::code_for(class)?;
        let value = ((prefix.bits as u32) << class) | self.mantissa(delta, prev, class);
        Ok(Codeword::new(value, prefix.len + class as u8))
    }

    /// Low `class` bits of the mantissa source. `class` is at most 14 here.
    fn mantissa(&self, delta: Delta, prev: Delta, class: u32) -> u32 {
        if class == 0 {
            return 0;
        }
        let raw = if delta > 0 {
            delta as u64
        } else {
            match self.mode {
                MantissaMode::Corrected => (delta - 1) as u64,
                MantissaMode::Legacy => prev.unsigned_abs(),
            }
        };
        (raw & low_bits_mask(class)) as u32
    }
}

/// Bitmask with the lowest `n` bits set (`n < 64`).
#[inline]
fn low_bits_mask(n: u32) -> u64 {
    (1u64 << n) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrected() -> SampleEncoder {
        SampleEncoder::new(MantissaMode::Corrected)
    }

    fn legacy() -> SampleEncoder {
        SampleEncoder::new(MantissaMode::Legacy)
    }

    #[test]
    fn test_magnitude_class_boundaries() {
        assert_eq!(magnitude_class(0), 0);
        assert_eq!(magnitude_class(1), 1);
        assert_eq!(magnitude_class(-1), 1);
        assert_eq!(magnitude_class(2), 2);
        assert_eq!(magnitude_class(3), 2);
        assert_eq!(magnitude_class(4), 3);
        assert_eq!(magnitude_class(7), 3);
        assert_eq!(magnitude_class(8), 4);
        assert_eq!(magnitude_class(10), 4);
        assert_eq!(magnitude_class(16), 5);
        assert_eq!(magnitude_class(16383), 14);
        assert_eq!(magnitude_class(-16383), 14);
        assert_eq!(magnitude_class(16384), 15);
        assert_eq!(magnitude_class(Delta::MIN), 64);
    }

    #[test]
    fn test_magnitude_class_vs_float_log2() {
        // Bit length is ceil(log2(m + 1)) for every magnitude; plain
        // ceil(log2(m)) agrees except at powers of two, where it is one short.
        for m in 1u32..=16384 {
            let class = magnitude_class(m as Delta);
            let plus_one = ((m + 1) as f64).log2().ceil() as u32;
            assert_eq!(class, plus_one, "magnitude {}", m);

            let plain = (m as f64).log2().ceil() as u32;
            if m.is_power_of_two() {
                assert_eq!(plain + 1, class, "magnitude {}", m);
            } else {
                assert_eq!(plain, class, "magnitude {}", m);
            }
        }
    }

    #[test]
    fn test_zero_delta_is_class_zero_code() {
        for enc in [corrected(), legacy()] {
            let cws = enc.encode(&[0, 0, 0]).unwrap();
            assert!(cws.iter().all(|cw| *cw == Codeword::new(0b00, 2)));
        }
    }

    #[test]
    fn test_positive_deltas() {
        let cws = corrected().encode(&[1, 5, 10]).unwrap();
        // class 1: 010 + 1
        assert_eq!(cws[0], Codeword::new(0b010_1, 4));
        // class 3: 100 + 101
        assert_eq!(cws[1], Codeword::new(0b100_101, 6));
        // class 4: 101 + 1010
        assert_eq!(cws[2], Codeword::new(0b101_1010, 7));
    }

    #[test]
    fn test_corrected_negative_mantissa() {
        let cws = corrected().encode(&[-1, -5, -10]).unwrap();
        // -1: class 1, low bit of -2 = 0
        assert_eq!(cws[0], Codeword::new(0b010_0, 4));
        // -5: class 3, low 3 bits of -6 = 010
        assert_eq!(cws[1], Codeword::new(0b100_010, 6));
        // -10: class 4, low 4 bits of -11 = 0101
        assert_eq!(cws[2], Codeword::new(0b101_0101, 7));
    }

    #[test]
    fn test_legacy_negative_uses_previous_delta() {
        let cws = legacy().encode(&[6, -5, -3]).unwrap();
        assert_eq!(cws[0], Codeword::new(0b100_110, 6));
        // -5: class 3, low 3 bits of |6| = 110
        assert_eq!(cws[1], Codeword::new(0b100_110, 6));
        // -3: class 2, low 2 bits of |-5| = 01
        assert_eq!(cws[2], Codeword::new(0b011_01, 5));
    }

    #[test]
    fn test_legacy_first_negative_has_zero_previous() {
        let cws = legacy().encode(&[-7]).unwrap();
        assert_eq!(cws[0], Codeword::new(0b100_000, 6));
    }

    #[test]
    fn test_modes_agree_without_negatives() {
        let deltas: Vec<Delta> = (0..200).map(|i| (i * 13) % 97).collect();
        assert_eq!(
            corrected().encode(&deltas).unwrap(),
            legacy().encode(&deltas).unwrap()
        );
    }

    #[test]
    fn test_largest_class_encodes() {
        let cws = corrected().encode(&[16383, -16383, 8192]).unwrap();
        assert_eq!(cws[0].num_valid_bits, 26);
        assert_eq!(cws[0].value, (0b111111111110 << 14) | 16383);
        assert_eq!(cws[1].value, 0b111111111110 << 14);
        assert_eq!(cws[2].num_valid_bits, 26);
    }

    #[test]
    fn test_magnitude_overflow() {
        let err = corrected().encode(&[1, 2, 16384]).unwrap_err();
        match err {
            CodecError::MagnitudeOverflow {
                index,
                delta,
                class,
            } => {
                assert_eq!(index, 2);
                assert_eq!(delta, 16384);
                assert_eq!(class, 15);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(legacy().encode(&[-20_000]).is_err());
    }

    #[test]
    fn test_encode_into_clears_on_error() {
        let mut out = Vec::new();
        assert!(corrected().encode_into(&[1, 2, 3, 40_000], &mut out).is_err());
        assert!(out.is_empty());
        corrected().encode_into(&[1], &mut out).unwrap();
        assert_eq!(out.len(), 1);
    }
}
