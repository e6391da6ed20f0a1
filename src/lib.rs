//! # lec
//!
//! A lossless entropy codec for batches of sensor samples travelling over a
//! slow serial link.
//!
//! ## Algorithm overview
//!
//! Each batch flows one way through four stages:
//!
//! - **Delta transform**: every sample becomes its difference from the
//!   previous one (the first from a configured reference).
//! - **Magnitude classes**: a delta's class is the bit length of its
//!   magnitude, `0..=14`. A static 15-entry prefix-code table maps the class
//!   to a 2 to 12 bit code.
//! - **Sample encoding**: the codeword is the prefix code followed by `class`
//!   mantissa bits that pin down the exact value and its sign.
//! - **Bit packing**: codewords are concatenated MSB first with no alignment
//!   and sliced into bytes for the transport.
//!
//! The stream has no header: the decoder must know the batch size and the
//! reference out of band.
//!
//! ## Example
//!
//! ```rust
//! use lec::{BatchCodec, CodecConfig};
//!
//! let codec = BatchCodec::new(CodecConfig { batch_size: 5, ..CodecConfig::default() }).unwrap();
//!
//! let batch = codec.compress_samples(&[120, 121, 121, 119, 124]).unwrap();
//! println!("{} samples -> {} bytes", batch.packed.count, batch.packed.bytes.len());
//!
//! let samples = codec.decompress(&batch).unwrap();
//! assert_eq!(samples, vec![120, 121, 121, 119, 124]);
//! ```
//!
//! ## Serial loop
//!
//! Any `std::io::Read` / `std::io::Write` can stand in for the UART:
//!
//! ```rust
//! # use lec::{BatchCodec, CodecConfig};
//! # let codec = BatchCodec::new(CodecConfig { batch_size: 3, ..CodecConfig::default() }).unwrap();
//! let mut uart_rx = std::io::Cursor::new(vec![10u8, 10, 12]);
//! let mut uart_tx: Vec<u8> = Vec::new();
//! let mut buf = codec.new_buffer();
//!
//! let report = codec.run_batch(&mut uart_rx, &mut uart_tx, &mut buf).unwrap();
//! assert_eq!(report.bytes_sent, 2);
//! assert_eq!(uart_tx, vec![0xB4, 0x38]);
//! ```

pub mod config;
pub mod decoder;
pub mod delta;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod packer;
pub mod pipeline;
pub mod table;
pub mod transport;

// Re-export primary types at the crate root.
pub use config::{CodecConfig, MantissaMode, PartialBytePolicy, ReferenceStrategy, SampleWidth};
pub use decoder::{Decoder, DecoderIter};
pub use delta::{Delta, Sample};
pub use encoder::{magnitude_class, Codeword, SampleEncoder};
pub use error::{CodecError, DecodeError};
pub use packer::{pack, BitPacker, PackedBytes};
pub use pipeline::{BatchBuffer, BatchCodec, BatchReport, EncodedBatch};
pub use transport::{ByteSink, ByteSource};
