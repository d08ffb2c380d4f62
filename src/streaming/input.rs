//! Seekable text input, plain or BGZF-compressed.
//!
//! Positions are `u64` in both cases: a byte offset for plain files and a
//! BGZF virtual position (compressed block offset << 16 | offset within the
//! block) for compressed ones. Plain gzip cannot be seeked and is rejected.

use crate::error::{Result, StreamError};
use crate::streaming::buffers::DEFAULT_INPUT_BUFFER;
use noodles::bgzf;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bgzf,
}

/// Sniff the gzip header for the BGZF `BC` extra subfield, then rewind.
pub fn detect_compression(file: &mut File) -> Result<Compression> {
    let mut header = [0u8; 12];
    let n = read_up_to(file, &mut header)?;
    file.seek(SeekFrom::Start(0))?;

    if n < 10 || header[0] != 0x1f || header[1] != 0x8b || header[2] != 0x08 {
        return Ok(Compression::None);
    }
    // FEXTRA
    if header[3] & 0x04 == 0 || n < 12 {
        return Ok(Compression::Gzip);
    }

    let xlen = u16::from_le_bytes([header[10], header[11]]) as usize;
    let mut extra = vec![0u8; xlen];
    file.seek(SeekFrom::Start(12))?;
    let got = read_up_to(file, &mut extra)?;
    file.seek(SeekFrom::Start(0))?;

    let extra = &extra[..got];
    let mut i = 0;
    while i + 4 <= extra.len() {
        let slen = u16::from_le_bytes([extra[i + 2], extra[i + 3]]) as usize;
        if extra[i] == b'B' && extra[i + 1] == b'C' && slen == 2 {
            return Ok(Compression::Bgzf);
        }
        i = i.saturating_add(4 + slen);
    }
    Ok(Compression::Gzip)
}

fn read_up_to(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// A buffered reader over a plain or BGZF file that can return to a
/// recorded position.
pub enum TextReader {
    Plain(BufReader<File>),
    Bgzf(bgzf::io::Reader<File>),
}

impl TextReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        match detect_compression(&mut file)? {
            Compression::None => Ok(TextReader::Plain(BufReader::with_capacity(
                DEFAULT_INPUT_BUFFER,
                file,
            ))),
            Compression::Bgzf => Ok(TextReader::Bgzf(bgzf::io::Reader::new(file))),
            Compression::Gzip => Err(StreamError::InvalidFormat(format!(
                "{} is gzip-compressed but not BGZF; recompress it with bgzip",
                path.display()
            ))),
        }
    }

    pub fn is_bgzf(&self) -> bool {
        matches!(self, TextReader::Bgzf(_))
    }

    /// Return to a position recorded by a [`SequenceIndex`](crate::index::SequenceIndex).
    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        match self {
            TextReader::Plain(reader) => {
                reader.seek(SeekFrom::Start(pos))?;
            }
            TextReader::Bgzf(reader) => {
                reader.seek(bgzf::VirtualPosition::from(pos))?;
            }
        }
        Ok(())
    }
}

impl Read for TextReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            TextReader::Plain(reader) => reader.read(buf),
            TextReader::Bgzf(reader) => reader.read(buf),
        }
    }
}

impl BufRead for TextReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            TextReader::Plain(reader) => reader.fill_buf(),
            TextReader::Bgzf(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            TextReader::Plain(reader) => reader.consume(amt),
            TextReader::Bgzf(reader) => reader.consume(amt),
        }
    }
}
