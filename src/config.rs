//! Codec configuration.
//!
//! A `CodecConfig` is built once at the application boundary (usually from a
//! JSON document) and handed to [`BatchCodec`](crate::pipeline::BatchCodec).
//! Every field has a serde default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::delta::Sample;
use crate::error::CodecError;

/// Batch size used by the deployed sensor nodes.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Largest accepted batch size. Buffers are allocated up front at this size.
pub const MAX_BATCH_SIZE: usize = 1 << 20;

/// Where a negative delta takes its mantissa bits from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MantissaMode {
    /// Wire-compatible with deployed nodes: a negative delta takes the low
    /// bits of the *previous* delta's magnitude. Streams with negative deltas
    /// do not decode back to the input values.
    Legacy,

    /// **Default:** a negative delta `d` takes the low bits of `d - 1` in
    /// two's complement, so the sign survives in the mantissa's top bit.
    #[default]
    Corrected,
}

/// What the packer does with 1 to 7 bits left over at the end of a batch.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PartialBytePolicy {
    /// Wire-compatible with deployed nodes: the trailing bits are never sent.
    DropPartialByte,

    /// **Default:** zero-pad the trailing bits to a full byte and emit it.
    #[default]
    PadPartialByte,
}

/// How the baseline for the first delta of a batch is chosen.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceStrategy {
    /// A constant baseline known to both ends of the link.
    Fixed { value: i32 },

    /// `trunc(ln(max sample))` of the batch, as deployed nodes compute it.
    /// Zero for an empty or all-zero batch.
    LogOfMax,
}

impl Default for ReferenceStrategy {
    fn default() -> Self {
        ReferenceStrategy::Fixed { value: 0 }
    }
}

impl ReferenceStrategy {
    /// Resolves the reference value for one batch.
    pub fn resolve(&self, samples: &[Sample]) -> i32 {
        match *self {
            ReferenceStrategy::Fixed { value } => value,
            ReferenceStrategy::LogOfMax => match samples.iter().copied().max() {
                Some(max) if max > 0 => (max as f64).ln() as i32,
                _ => 0,
            },
        }
    }
}

/// How many bytes one sample occupies on the acquisition link.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SampleWidth {
    /// **Default:** one byte per sample.
    #[default]
    Narrow,

    /// Two bytes per sample, most significant byte first.
    Wide,
}

impl SampleWidth {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleWidth::Narrow => 1,
            SampleWidth::Wide => 2,
        }
    }
}

/// The full configuration of one codec instance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// Exact number of samples in every batch, from 1 to [`MAX_BATCH_SIZE`].
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default)]
    pub reference: ReferenceStrategy,

    #[serde(default)]
    pub mantissa_mode: MantissaMode,

    #[serde(default)]
    pub partial_byte: PartialBytePolicy,

    #[serde(default)]
    pub sample_width: SampleWidth,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            reference: ReferenceStrategy::default(),
            mantissa_mode: MantissaMode::default(),
            partial_byte: PartialBytePolicy::default(),
            sample_width: SampleWidth::default(),
        }
    }
}

impl CodecConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        let config: CodecConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CodecError> {
        if self.batch_size == 0 {
            return Err(CodecError::Configuration(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.batch_size > MAX_BATCH_SIZE {
            return Err(CodecError::Configuration(format!(
                "batch_size {} exceeds the maximum of {}",
                self.batch_size, MAX_BATCH_SIZE
            )));
        }
        Ok(())
    }

    /// Settings compatible with deployed nodes: legacy mantissas, trailing bits dropped.
    pub fn legacy() -> Self {
        Self {
            mantissa_mode: MantissaMode::Legacy,
            partial_byte: PartialBytePolicy::DropPartialByte,
            ..Self::default()
        }
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
