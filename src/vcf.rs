//! VCF reading and writing, for plain or bgzipped input.
//!
//! The header is parsed with noodles. Data lines take a fast path where
//! only the columns the sliding window needs are interpreted: CHROM, POS,
//! REF and the `END` key of INFO. Each data line is carried through verbatim
//! as the record payload and written back unchanged.

use crate::error::{Result, StreamError};
use crate::index::IndexedLines;
use crate::interval::VariantRecord;
use crate::source::{OrderedRecordSource, SequenceName};
use crate::streaming::buffers::{DEFAULT_LINE_BUFFER, DEFAULT_OUTPUT_BUFFER};
use crate::streaming::input::TextReader;
use crate::streaming::output::RecordWriter;
use crate::window::VariantSink;
use noodles::vcf;
use rustc_hash::FxHashMap;
use std::io::{BufRead, Write};
use std::path::Path;

/// The opaque payload of a VCF variant: its contig name and original line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfLine {
    pub chrom: String,
    pub line: String,
}

impl SequenceName for VcfLine {
    #[inline]
    fn sequence_name(&self) -> &str {
        &self.chrom
    }
}

pub type VcfRecord = VariantRecord<VcfLine>;

/// Contig name to rid mapping. Contigs declared in the header come first,
/// in declaration order; any other contig gets the next rid when first seen.
#[derive(Debug, Clone, Default)]
pub struct ContigTable {
    ids: FxHashMap<String, u32>,
    names: Vec<String>,
}

impl ContigTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the rid for `name`, registering it if new.
    pub fn rid(&mut self, name: &str) -> u32 {
        if let Some(&rid) = self.ids.get(name) {
            return rid;
        }
        let rid = self.names.len() as u32;
        self.ids.insert(name.to_string(), rid);
        self.names.push(name.to_string());
        rid
    }

    pub fn name(&self, rid: u32) -> Option<&str> {
        self.names.get(rid as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The VCF header: the raw lines, written back verbatim, and their parsed
/// form, which supplies the declared contig order.
#[derive(Debug, Clone, Default)]
pub struct VcfHeader {
    pub lines: Vec<String>,
    parsed: vcf::Header,
}

impl VcfHeader {
    /// Read the `##` meta lines through the `#CHROM` line.
    pub fn read<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut lines = Vec::new();
        let mut buf = String::with_capacity(DEFAULT_LINE_BUFFER);
        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 || !buf.starts_with('#') {
                break;
            }
            let line = buf.trim_end_matches(['\n', '\r']);
            let done = line.starts_with("#CHROM");
            lines.push(line.to_string());
            if done {
                break;
            }
        }

        let mut text = lines.join("\n");
        text.push('\n');
        let parsed: vcf::Header = text
            .parse()
            .map_err(|e| StreamError::InvalidFormat(format!("VCF header: {}", e)))?;

        Ok(Self { lines, parsed })
    }

    /// The parsed header.
    pub fn parsed(&self) -> &vcf::Header {
        &self.parsed
    }

    /// Contig IDs from the `##contig` lines, in header order.
    pub fn contigs(&self) -> Vec<&str> {
        self.parsed.contigs().keys().map(String::as_str).collect()
    }

    /// Append a meta-information line before the `#CHROM` line.
    ///
    /// Only the written lines change; the line is not parsed.
    pub fn push_meta(&mut self, line: impl Into<String>) {
        let pos = self
            .lines
            .iter()
            .position(|l| l.starts_with("#CHROM"))
            .unwrap_or(self.lines.len());
        self.lines.insert(pos, line.into());
    }
}

fn is_vcf_skip_line(line: &[u8]) -> bool {
    let line = crate::streaming::parsing::trim_line_end(line);
    line.is_empty() || line[0] == b'#'
}

/// Extract `END=` from an INFO column.
fn info_end(info: &str) -> Option<&str> {
    info.split(';').find_map(|kv| kv.strip_prefix("END="))
}

/// Parse one VCF data line, assigning its rid from `contigs`.
pub fn parse_variant(line: &str, line_num: usize, contigs: &mut ContigTable) -> Result<VcfRecord> {
    let fields: Vec<&str> = line.splitn(9, '\t').collect();
    if fields.len() < 8 {
        return Err(StreamError::Parse {
            line: line_num,
            message: format!("Expected at least 8 fields, got {}", fields.len()),
        });
    }

    let chrom = fields[0];
    let beg1: u64 = fields[1]
        .parse()
        .ok()
        .filter(|&p| p > 0)
        .ok_or_else(|| StreamError::Parse {
            line: line_num,
            message: format!("Invalid POS field: '{}'", fields[1]),
        })?;

    let ref_len = fields[3].len().max(1) as u64;
    let end1 = match info_end(fields[7]) {
        Some(end) => end.parse::<u64>().map_err(|_| StreamError::Parse {
            line: line_num,
            message: format!("Invalid END value: '{}'", end),
        })?,
        None => (beg1 - 1)
            .checked_add(ref_len)
            .ok_or_else(|| StreamError::Parse {
                line: line_num,
                message: format!(
                    "REF at POS {} extends past the end of the coordinate range",
                    beg1
                ),
            })?,
    };
    if end1 < beg1 {
        return Err(StreamError::Parse {
            line: line_num,
            message: format!("END ({}) is before POS ({})", end1, beg1),
        });
    }

    let rid = contigs.rid(chrom);
    Ok(VariantRecord::new(
        rid,
        beg1,
        end1,
        VcfLine {
            chrom: chrom.to_string(),
            line: line.to_string(),
        },
    ))
}

/// A sorted VCF file exposed as an [`OrderedRecordSource`].
pub struct VcfVariantSource {
    lines: IndexedLines,
    header: VcfHeader,
    contigs: ContigTable,
    name: String,
}

impl VcfVariantSource {
    /// Open a plain or bgzipped VCF file, read its header and index its
    /// contigs. A `.tbi` or `.csi` index next to a bgzipped file is used
    /// for jumps instead of a scan.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let header = VcfHeader::read(TextReader::open(path.as_ref())?)?;

        let mut contigs = ContigTable::new();
        for id in header.contigs() {
            contigs.rid(id);
        }

        Ok(Self {
            lines: IndexedLines::open(path.as_ref(), is_vcf_skip_line)?,
            header,
            contigs,
            name: path.as_ref().display().to_string(),
        })
    }

    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    pub fn contigs(&self) -> &ContigTable {
        &self.contigs
    }

    /// Contigs with data lines, in file order.
    pub fn sequences(&self) -> impl Iterator<Item = &String> {
        self.lines.index().sequences()
    }

    /// Display name of the underlying file.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl OrderedRecordSource<VcfRecord> for VcfVariantSource {
    fn jump_to_interval(&mut self, seq: &str) -> Result<()> {
        self.lines.jump_to(seq)
    }

    fn read(&mut self) -> Result<Option<VcfRecord>> {
        if !self.lines.advance()? {
            return Ok(None);
        }
        let line = std::str::from_utf8(self.lines.line()).map_err(|_| StreamError::Parse {
            line: self.lines.line_number(),
            message: "Line is not valid UTF-8".to_string(),
        })?;
        parse_variant(line, self.lines.line_number(), &mut self.contigs).map(Some)
    }
}

/// Writes the header once, then each exiting variant's original line.
pub struct VcfWriter<W: Write> {
    writer: RecordWriter<W>,
    written: usize,
}

impl<W: Write> VcfWriter<W> {
    /// Create a writer and emit `header`.
    pub fn new(output: W, header: &VcfHeader) -> Result<Self> {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, output, header)
    }

    /// Create a writer with a specified buffer size and emit `header`.
    pub fn with_capacity(capacity: usize, output: W, header: &VcfHeader) -> Result<Self> {
        let mut writer = RecordWriter::with_capacity(capacity, output);
        for line in &header.lines {
            writer.write_line(line.as_bytes())?;
        }
        Ok(Self { writer, written: 0 })
    }

    /// Number of records written.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }
}

impl<W: Write> VariantSink<VcfLine> for VcfWriter<W> {
    fn write(&mut self, record: VcfRecord) -> Result<()> {
        self.writer.write_line(record.payload.line.as_bytes())?;
        self.written += 1;
        Ok(())
    }
}
