//! Error types for the codec.
//!
//! Encoding failures abort the whole batch; nothing is handed to the transport
//! for a batch that produced a `CodecError`. The packer itself never fails.

use thiserror::Error;

use crate::delta::Delta;

/// Errors raised while configuring, encoding or transmitting a batch.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A delta's magnitude class exceeds the largest class in the code table.
    #[error("delta {delta} at index {index} needs magnitude class {class}, table supports at most 14")]
    MagnitudeOverflow { index: usize, delta: Delta, class: u32 },

    /// A class lookup fell outside the code table.
    #[error("magnitude class {0} is outside the code table")]
    TableIndex(u32),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The batch handed to the codec does not hold exactly `batch_size` samples.
    #[error("batch holds {actual} samples, expected {expected}")]
    BatchLength { expected: usize, actual: usize },

    /// An error from the byte transport (serial port, file, pipe...).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error parsing a JSON configuration document.
    #[error("Serde JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

/// Errors raised while reading a packed stream back into deltas or samples.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The packed stream ended in the middle of codeword `index`.
    #[error("unexpected end of packed stream at codeword {index}")]
    UnexpectedEnd { index: usize },

    /// Codeword `index` starts with a bit pattern that is not in the table.
    #[error("codeword {index} does not start with a valid prefix code")]
    InvalidPrefix { index: usize },

    /// Re-accumulating the deltas left the sample range.
    #[error("reconstructed sample {value} at index {index} is out of range")]
    SampleOutOfRange { index: usize, value: i64 },
}
