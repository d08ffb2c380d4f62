//! BED region reader.
//!
//! BED uses 0-based, half-open coordinates. Records are converted to the
//! 1-based inclusive convention on read: `start1 = start + 1`, `end1 = end`.
//! A zero-length record (`start == end`) marks the position after `start`
//! and becomes the single base `start + 1`.

use crate::error::{Result, StreamError};
use crate::index::IndexedLines;
use crate::interval::{GenomicInterval, RegionRecord};
use crate::source::OrderedRecordSource;
use crate::streaming::parsing::{parse_bed3, should_skip_line};
use std::path::Path;

/// Parse one BED data line into a region.
pub fn parse_region(line: &[u8], line_num: usize) -> Result<RegionRecord> {
    let fields = parse_bed3(line).ok_or_else(|| StreamError::Parse {
        line: line_num,
        message: format!(
            "Expected chrom, start and end, got '{}'",
            String::from_utf8_lossy(line)
        ),
    })?;
    let (start, end) = (fields.start, fields.end);

    if start > end {
        return Err(StreamError::Parse {
            line: line_num,
            message: format!("Start ({}) > end ({})", start, end),
        });
    }

    let start1 = start.checked_add(1).ok_or_else(|| StreamError::Parse {
        line: line_num,
        message: format!("Start ({}) is out of range", start),
    })?;
    let chrom = String::from_utf8_lossy(fields.chrom).into_owned();
    let interval = GenomicInterval::new(chrom, start1, end.max(start1)).ok_or_else(|| {
        StreamError::Parse {
            line: line_num,
            message: format!("Invalid interval {}-{}", start, end),
        }
    })?;

    let mut record = RegionRecord::new(interval);
    if let Some(rest) = fields.rest {
        record.fields = String::from_utf8_lossy(rest)
            .split('\t')
            .map(str::to_string)
            .collect();
    }
    Ok(record)
}

/// A sorted BED file exposed as an [`OrderedRecordSource`].
///
/// Start positions must be non-decreasing within each chromosome; a
/// violation is reported as [`StreamError::Unordered`].
pub struct BedRegionSource {
    lines: IndexedLines,
    name: String,
    prev_chrom: String,
    prev_start1: Option<u64>,
}

impl BedRegionSource {
    /// Open and index a BED file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            lines: IndexedLines::open(path.as_ref(), should_skip_line)?,
            name: path.as_ref().display().to_string(),
            prev_chrom: String::new(),
            prev_start1: None,
        })
    }

    /// Chromosomes present in the file, in file order.
    pub fn sequences(&self) -> impl Iterator<Item = &String> {
        self.lines.index().sequences()
    }
}

impl OrderedRecordSource<RegionRecord> for BedRegionSource {
    fn jump_to_interval(&mut self, seq: &str) -> Result<()> {
        self.prev_start1 = None;
        self.lines.jump_to(seq)
    }

    fn read(&mut self) -> Result<Option<RegionRecord>> {
        if !self.lines.advance()? {
            return Ok(None);
        }
        let record = parse_region(self.lines.line(), self.lines.line_number())?;

        if record.chrom() != self.prev_chrom {
            // Chromosome blocks are contiguous (checked by the index).
            self.prev_chrom.clear();
            self.prev_chrom.push_str(record.chrom());
        } else if let Some(prev) = self.prev_start1 {
            if record.start1() < prev {
                return Err(StreamError::unordered(
                    &self.name,
                    format!(
                        "position {} at line {} comes after {} on {}",
                        record.start1() - 1,
                        self.lines.line_number(),
                        prev - 1,
                        record.chrom()
                    ),
                ));
            }
        }
        self.prev_start1 = Some(record.start1());
        Ok(Some(record))
    }
}
