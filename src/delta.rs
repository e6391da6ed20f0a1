//! Delta transform between raw samples and signed differences.
//!
//! `delta[0] = sample[0] - reference` and `delta[i] = sample[i] - sample[i - 1]`.
//! The reference is a configured baseline, not a real previous sample.

use crate::error::DecodeError;

/// A raw sensor reading.
pub type Sample = u16;

/// A signed difference between consecutive samples. Wide enough that the
/// difference of any sample and any `i32` reference never overflows.
pub type Delta = i64;

/// Computes the delta sequence for `samples` against `reference`.
pub fn deltas(samples: &[Sample], reference: i32) -> Vec<Delta> {
    let mut out = Vec::with_capacity(samples.len());
    deltas_into(samples, reference, &mut out);
    out
}

/// Like [`deltas`], but writes into a caller-owned buffer (cleared first).
pub fn deltas_into(samples: &[Sample], reference: i32, out: &mut Vec<Delta>) {
    out.clear();
    let mut prev = reference as Delta;
    for &s in samples {
        let cur = s as Delta;
        out.push(cur - prev);
        prev = cur;
    }
}

/// Re-accumulates deltas into samples: the inverse of [`deltas`].
///
/// Fails if a running sum leaves the `Sample` range.
pub fn accumulate(deltas: &[Delta], reference: i32) -> Result<Vec<Sample>, DecodeError> {
    let mut out = Vec::with_capacity(deltas.len());
    let mut acc = reference as Delta;
    for (index, &d) in deltas.iter().enumerate() {
        acc = acc
            .checked_add(d)
            .ok_or(DecodeError::SampleOutOfRange { index, value: acc })?;
        let sample =
            Sample::try_from(acc).map_err(|_| DecodeError::SampleOutOfRange { index, value: acc })?;
        out.push(sample);
    }
    Ok(out)
}
