//! Batch orchestration: acquire → delta → encode → pack → transmit.
//!
//! All scratch space lives in a caller-owned [`BatchBuffer`], so the encode
//! and pack stages never share hidden state. One batch must finish before the
//! next begins; the `&mut BatchBuffer` borrow enforces that.

use crate::config::CodecConfig;
use crate::decoder::Decoder;
use crate::delta::{self, Delta, Sample};
use crate::encoder::{Codeword, SampleEncoder};
use crate::error::CodecError;
use crate::packer::{self, PackedBytes};
use crate::transport::{self, ByteSink, ByteSource};

/// Caller-owned buffers for one in-flight batch, sized by the batch size.
#[derive(Debug, Clone, Default)]
pub struct BatchBuffer {
    samples: Vec<Sample>,
    deltas: Vec<Delta>,
    codewords: Vec<Codeword>,
}

impl BatchBuffer {
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            samples: Vec::with_capacity(batch_size),
            deltas: Vec::with_capacity(batch_size),
            codewords: Vec::with_capacity(batch_size),
        }
    }

    /// Replaces the buffered samples with a copy of `samples`.
    pub fn load(&mut self, samples: &[Sample]) {
        self.samples.clear();
        self.samples.extend_from_slice(samples);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Deltas of the last batch compressed through this buffer.
    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    /// Codewords of the last batch compressed through this buffer.
    pub fn codewords(&self) -> &[Codeword] {
        &self.codewords
    }
}

/// One compressed batch and the reference its first delta was taken against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    pub reference: i32,
    pub packed: PackedBytes,
}

/// Summary of one acquire/compress/transmit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub samples: usize,
    pub reference: i32,
    pub bytes_sent: usize,
    pub total_bits: usize,
    pub dropped_bits: u8,
}

/// The configured codec for fixed-size sample batches.
///
/// # Example
/// ```
/// use lec::{BatchCodec, CodecConfig};
///
/// let config = CodecConfig { batch_size: 3, ..CodecConfig::default() };
/// let codec = BatchCodec::new(config).unwrap();
///
/// let batch = codec.compress_samples(&[10, 10, 12]).unwrap();
/// assert_eq!(batch.packed.bytes, vec![0xB4, 0x38]);
/// assert_eq!(codec.decompress(&batch).unwrap(), vec![10, 10, 12]);
/// ```
#[derive(Debug, Clone)]
pub struct BatchCodec {
    config: CodecConfig,
    encoder: SampleEncoder,
}

impl BatchCodec {
    /// Validates `config` and builds the codec.
    pub fn new(config: CodecConfig) -> Result<Self, CodecError> {
        config.validate()?;
        Ok(Self {
            encoder: SampleEncoder::new(config.mantissa_mode),
            config,
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// A buffer sized for this codec's batches.
    pub fn new_buffer(&self) -> BatchBuffer {
        BatchBuffer::with_batch_size(self.config.batch_size)
    }

    /// Compresses the samples held in `buf`.
    ///
    /// The batch must hold exactly `batch_size` samples. On error nothing is
    /// returned for the batch: there is no partial output.
    pub fn compress(&self, buf: &mut BatchBuffer) -> Result<EncodedBatch, CodecError> {
        let BatchBuffer {
            samples,
            deltas,
            codewords,
        } = buf;

        if samples.len() != self.config.batch_size {
            return Err(CodecError::BatchLength {
                expected: self.config.batch_size,
                actual: samples.len(),
            });
        }

        let reference = self.config.reference.resolve(samples);
        delta::deltas_into(samples, reference, deltas);
        self.encoder.encode_into(deltas, codewords)?;
        let packed = packer::pack(codewords, self.config.partial_byte);

        log::debug!(
            "compressed {} samples (reference {}) into {} bytes / {} bits",
            samples.len(),
            reference,
            packed.bytes.len(),
            packed.total_bits
        );

        Ok(EncodedBatch { reference, packed })
    }

    /// Compresses a batch without keeping the scratch buffers around.
    pub fn compress_samples(&self, samples: &[Sample]) -> Result<EncodedBatch, CodecError> {
        let mut buf = BatchBuffer::with_batch_size(samples.len());
        buf.load(samples);
        self.compress(&mut buf)
    }

    /// Decodes a batch produced by [`compress`](Self::compress) back into samples.
    pub fn decompress(&self, batch: &EncodedBatch) -> Result<Vec<Sample>, CodecError> {
        Ok(Decoder::decode_samples(&batch.packed, batch.reference)?)
    }

    /// Reads exactly one batch of samples from `source` into `buf`.
    pub fn acquire<S: ByteSource + ?Sized>(
        &self,
        source: &mut S,
        buf: &mut BatchBuffer,
    ) -> Result<(), CodecError> {
        buf.samples.clear();
        for _ in 0..self.config.batch_size {
            let sample = transport::read_sample(source, self.config.sample_width)?;
            buf.samples.push(sample);
        }
        log::debug!(
            "acquired {} samples ({} bytes)",
            buf.samples.len(),
            buf.samples.len() * self.config.sample_width.bytes_per_sample()
        );
        Ok(())
    }

    /// Hands every packed byte of `batch` to `sink`.
    pub fn transmit<T: ByteSink + ?Sized>(
        &self,
        batch: &EncodedBatch,
        sink: &mut T,
    ) -> Result<(), CodecError> {
        transport::write_all(sink, &batch.packed.bytes)?;
        Ok(())
    }

    /// Runs one full cycle: acquire a batch, compress it, transmit it.
    ///
    /// Encoding completes before the first byte is written, so a batch that
    /// fails to encode sends nothing.
    pub fn run_batch<S, T>(
        &self,
        source: &mut S,
        sink: &mut T,
        buf: &mut BatchBuffer,
    ) -> Result<BatchReport, CodecError>
    where
        S: ByteSource + ?Sized,
        T: ByteSink + ?Sized,
    {
        self.acquire(source, buf)?;
        let batch = self.compress(buf)?;
        self.transmit(&batch, sink)?;
        Ok(BatchReport {
            samples: batch.packed.count,
            reference: batch.reference,
            bytes_sent: batch.packed.bytes.len(),
            total_bits: batch.packed.total_bits,
            dropped_bits: batch.packed.dropped_bits,
        })
    }
}
