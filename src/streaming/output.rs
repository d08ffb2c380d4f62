//! Buffered output for streaming commands.
//!
//! Uses itoa for integer formatting to avoid allocation in the hot path.

use crate::error::StreamError;
use crate::streaming::buffers::DEFAULT_OUTPUT_BUFFER;
use std::io::{BufWriter, Write};

/// Line-oriented record writer.
pub struct RecordWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
}

impl<W: Write> RecordWriter<W> {
    /// Create a new RecordWriter with the default 2MB buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, output)
    }

    /// Create a new RecordWriter with specified buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
        }
    }

    /// Write a full line as-is with newline.
    #[inline]
    pub fn write_line(&mut self, line: &[u8]) -> Result<(), StreamError> {
        self.writer.write_all(line)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write `line`, a tab, and `1` or `0` for `flag`.
    #[inline]
    pub fn write_flagged(&mut self, line: &[u8], flag: bool) -> Result<(), StreamError> {
        self.writer.write_all(line)?;
        self.writer.write_all(b"\t")?;
        self.writer.write_all(self.itoa_buf.format(flag as u8).as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_flagged() {
        let mut output = Vec::new();
        {
            let mut writer = RecordWriter::new(&mut output);
            writer.write_flagged(b"chr1\t100\t200", true).unwrap();
            writer.write_flagged(b"chr1\t300\t400\tname", false).unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(output, b"chr1\t100\t200\t1\nchr1\t300\t400\tname\t0\n");
    }

    #[test]
    fn test_write_line() {
        let mut output = Vec::new();
        {
            let mut writer = RecordWriter::with_capacity(16, &mut output);
            writer.write_line(b"##fileformat=VCFv4.2").unwrap();
            writer.write_line(b"20\t14370\t.\tG\tA").unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(output, b"##fileformat=VCFv4.2\n20\t14370\t.\tG\tA\n");
    }
}
