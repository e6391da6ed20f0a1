//! Byte-at-a-time transport seams.
//!
//! The codec never touches hardware. A serial driver (or a file, pipe or
//! in-memory buffer in tests) plugs in through these two traits. Every
//! `std::io::Read` / `std::io::Write` already implements them.

use std::io::{self, Read, Write};

use crate::config::SampleWidth;
use crate::delta::Sample;

/// Source of incoming bytes (`readByte`). May block.
pub trait ByteSource {
    fn read_byte(&mut self) -> io::Result<u8>;
}

/// Sink for outgoing bytes (`writeByte`). May block.
pub trait ByteSink {
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Flushes any buffering in the sink. The default does nothing.
    fn flush_bytes(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<R: Read> ByteSource for R {
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

impl<W: Write> ByteSink for W {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.write_all(&[byte])
    }

    fn flush_bytes(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// Reads one sample of the given wire width.
pub fn read_sample<S: ByteSource + ?Sized>(source: &mut S, width: SampleWidth) -> io::Result<Sample> {
    match width {
        SampleWidth::Narrow => Ok(source.read_byte()? as Sample),
        SampleWidth::Wide => {
            let hi = source.read_byte()?;
            let lo = source.read_byte()?;
            Ok(Sample::from_be_bytes([hi, lo]))
        }
    }
}

/// Writes every byte of `bytes`, then flushes the sink.
pub fn write_all<T: ByteSink + ?Sized>(sink: &mut T, bytes: &[u8]) -> io::Result<()> {
    for &b in bytes {
        sink.write_byte(b)?;
    }
    sink.flush_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_narrow_and_wide() {
        let mut src = Cursor::new(vec![0x7F, 0x12, 0x34]);
        assert_eq!(read_sample(&mut src, SampleWidth::Narrow).unwrap(), 0x7F);
        assert_eq!(read_sample(&mut src, SampleWidth::Wide).unwrap(), 0x1234);
        let err = read_sample(&mut src, SampleWidth::Narrow).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_write_all_to_vec() {
        let mut sink: Vec<u8> = Vec::new();
        write_all(&mut sink, &[1, 2, 3]).unwrap();
        assert_eq!(sink, vec![1, 2, 3]);
    }

    struct FailingSink;

    impl ByteSink for FailingSink {
        fn write_byte(&mut self, _byte: u8) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "link down"))
        }
    }

    #[test]
    fn test_write_error_propagates() {
        let err = write_all(&mut FailingSink, &[1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
