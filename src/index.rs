//! Sequence offset index for sorted, line-oriented files.
//!
//! Sources use it to jump straight to a sequence without rescanning the
//! file. A bgzipped file with a tabix (`.tbi`) or CSI (`.csi`) index next to
//! it takes the start of each sequence from that index. Anything else is
//! scanned once, recording where each sequence's block of data lines begins.
//! Memory is O(number of sequences) either way.

use crate::error::{Result, StreamError};
use crate::streaming::buffers::DEFAULT_LINE_BUFFER;
use crate::streaming::input::TextReader;
use crate::streaming::parsing::first_field;
use noodles::core::region::Interval;
use noodles::csi::BinningIndex;
use noodles::{bgzf, csi, tabix};
use rustc_hash::FxHashMap;
use std::ffi::OsString;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Where a sequence's block starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceEntry {
    /// Byte offset (plain) or BGZF virtual position of the first data line.
    pub offset: u64,
    /// 1-based line number of that line, when the file was scanned.
    pub line: Option<usize>,
    /// Number of data lines in the block, when the file was scanned.
    pub records: Option<usize>,
}

/// Start positions of every sequence, in file order.
#[derive(Debug, Clone, Default)]
pub struct SequenceIndex {
    entries: FxHashMap<String, SequenceEntry>,
    order: Vec<String>,
}

impl SequenceIndex {
    /// Build an index by scanning an uncompressed `reader` from its current
    /// position. Offsets count bytes from there.
    ///
    /// Lines for which `skip` returns true are ignored. A sequence that shows
    /// up in two separate blocks means the file is not sorted, which is
    /// reported as [`StreamError::Unordered`].
    pub fn build<R: BufRead>(
        mut reader: R,
        skip: fn(&[u8]) -> bool,
        source_name: &str,
    ) -> Result<Self> {
        Self::scan(&mut reader, |_, offset| offset, skip, source_name)
    }

    /// Scan a BGZF stream, recording virtual positions.
    pub fn build_bgzf<R: std::io::Read>(
        reader: &mut bgzf::io::Reader<R>,
        skip: fn(&[u8]) -> bool,
        source_name: &str,
    ) -> Result<Self> {
        Self::scan(
            reader,
            |r, _| u64::from(r.virtual_position()),
            skip,
            source_name,
        )
    }

    fn scan<R: BufRead>(
        reader: &mut R,
        tell: impl Fn(&R, u64) -> u64,
        skip: fn(&[u8]) -> bool,
        source_name: &str,
    ) -> Result<Self> {
        let mut index = SequenceIndex::default();
        let mut line = Vec::with_capacity(DEFAULT_LINE_BUFFER);
        let mut offset: u64 = 0;
        let mut line_num: usize = 0;
        let mut current: Option<String> = None;

        loop {
            line.clear();
            let line_offset = tell(&*reader, offset);
            let bytes_read = reader.read_until(b'\n', &mut line)?;
            if bytes_read == 0 {
                break;
            }
            line_num += 1;
            offset += bytes_read as u64;

            if skip(&line) {
                continue;
            }

            let seq = first_field(&line);
            if let Some(ref cur) = current {
                if cur.as_bytes() == seq {
                    if let Some(entry) = index.entries.get_mut(cur.as_str()) {
                        entry.records = entry.records.map(|n| n + 1);
                    }
                    continue;
                }
            }

            let seq = String::from_utf8_lossy(seq).into_owned();
            if index.entries.contains_key(&seq) {
                return Err(StreamError::unordered(
                    source_name,
                    format!(
                        "sequence '{}' at line {} was seen earlier (sequences must be contiguous)",
                        seq, line_num
                    ),
                ));
            }
            index.insert(
                seq.clone(),
                SequenceEntry {
                    offset: line_offset,
                    line: Some(line_num),
                    records: Some(1),
                },
            );
            current = Some(seq);
        }

        Ok(index)
    }

    /// Take sequence starts from a tabix or CSI index: the smallest chunk
    /// start of each reference sequence.
    pub fn from_binning_index<I: BinningIndex>(index: &I, source_name: &str) -> Result<Self> {
        let header = index.header().ok_or_else(|| {
            StreamError::InvalidFormat(format!(
                "index for {} does not list sequence names",
                source_name
            ))
        })?;

        let mut out = SequenceIndex::default();
        for (id, name) in header.reference_sequence_names().iter().enumerate() {
            let chunks = index.query(id, Interval::from(..))?;
            let Some(start) = chunks.iter().map(|chunk| chunk.start()).min() else {
                continue;
            };
            out.insert(
                name.to_string(),
                SequenceEntry {
                    offset: u64::from(start),
                    line: None,
                    records: None,
                },
            );
        }
        Ok(out)
    }

    /// Index a file on disk.
    ///
    /// A bgzipped file uses `<path>.tbi` or `<path>.csi` when present and is
    /// scanned otherwise.
    pub fn from_path<P: AsRef<Path>>(path: P, skip: fn(&[u8]) -> bool) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();

        match TextReader::open(path)? {
            TextReader::Plain(reader) => Self::build(reader, skip, &name),
            TextReader::Bgzf(mut reader) => {
                let tbi = with_suffix(path, ".tbi");
                if tbi.exists() {
                    return Self::from_binning_index(&tabix::fs::read(&tbi)?, &name);
                }
                let csi_path = with_suffix(path, ".csi");
                if csi_path.exists() {
                    return Self::from_binning_index(&csi::fs::read(&csi_path)?, &name);
                }
                Self::build_bgzf(&mut reader, skip, &name)
            }
        }
    }

    fn insert(&mut self, seq: String, entry: SequenceEntry) {
        self.entries.insert(seq.clone(), entry);
        self.order.push(seq);
    }

    /// Look up a sequence.
    #[inline]
    pub fn get(&self, seq: &str) -> Option<&SequenceEntry> {
        self.entries.get(seq)
    }

    /// Sequence names in file order.
    pub fn sequences(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// A seekable line reader that honors sequence jumps.
///
/// After [`IndexedLines::jump_to`] the reader yields only the lines of that
/// sequence and then reports exhaustion. Without a jump it yields every data
/// line in the file.
pub struct IndexedLines {
    reader: TextReader,
    index: SequenceIndex,
    skip: fn(&[u8]) -> bool,
    line: Vec<u8>,
    line_num: usize,
    selected: Option<String>,
    exhausted: bool,
}

impl IndexedLines {
    /// Open a plain or bgzipped file, index it, and position at its first line.
    pub fn open<P: AsRef<Path>>(path: P, skip: fn(&[u8]) -> bool) -> Result<Self> {
        let index = SequenceIndex::from_path(path.as_ref(), skip)?;
        Ok(Self {
            reader: TextReader::open(path.as_ref())?,
            index,
            skip,
            line: Vec::with_capacity(DEFAULT_LINE_BUFFER),
            line_num: 0,
            selected: None,
            exhausted: false,
        })
    }

    pub fn index(&self) -> &SequenceIndex {
        &self.index
    }

    /// Restrict reading to `seq`; an absent sequence leaves the reader exhausted.
    ///
    /// Entries taken from a tabix or CSI index carry no line numbers, so
    /// line numbers then count from the jump.
    pub fn jump_to(&mut self, seq: &str) -> Result<()> {
        self.selected = Some(seq.to_string());
        match self.index.get(seq) {
            Some(entry) => {
                self.reader.seek_to(entry.offset)?;
                self.line_num = entry.line.map_or(0, |line| line - 1);
                self.exhausted = false;
            }
            None => self.exhausted = true,
        }
        Ok(())
    }

    /// Advance to the next data line. Returns false once exhausted.
    pub fn advance(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        loop {
            self.line.clear();
            let bytes_read = self.reader.read_until(b'\n', &mut self.line)?;
            if bytes_read == 0 {
                self.exhausted = true;
                return Ok(false);
            }
            self.line_num += 1;

            if (self.skip)(&self.line) {
                continue;
            }
            if let Some(ref seq) = self.selected {
                if first_field(&self.line) != seq.as_bytes() {
                    self.exhausted = true;
                    return Ok(false);
                }
            }
            return Ok(true);
        }
    }

    /// The current line, without its line terminator.
    #[inline]
    pub fn line(&self) -> &[u8] {
        crate::streaming::parsing::trim_line_end(&self.line)
    }

    /// 1-based line number of the current line.
    #[inline]
    pub fn line_number(&self) -> usize {
        self.line_num
    }
}
