//! Sort validation for sorted-stream inputs.
//!
//! The window engines treat unsorted input as fatal when they meet it, which
//! may be after part of the output was written. These helpers check a whole
//! file up front.

use crate::bed::BedRegionSource;
use crate::error::{Result, StreamError};
use crate::interval::VariantRecord;
use crate::source::OrderedRecordSource;
use std::path::Path;

/// Inline (rid, beg1) order validator for use within streaming loops.
#[derive(Debug, Default)]
pub struct SortValidator {
    prev: Option<(u32, u64)>,
    record_count: usize,
}

impl SortValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate that a record at (rid, beg1) maintains sort order.
    #[inline]
    pub fn validate(&mut self, rid: u32, beg1: u64, file_id: &str) -> Result<()> {
        self.record_count += 1;

        if let Some((prev_rid, prev_beg1)) = self.prev {
            if rid < prev_rid {
                return Err(StreamError::unordered(
                    file_id,
                    format!(
                        "contig rid {} at record {} comes after rid {}",
                        rid, self.record_count, prev_rid
                    ),
                ));
            }
            if rid == prev_rid && beg1 < prev_beg1 {
                return Err(StreamError::unordered(
                    file_id,
                    format!(
                        "position {} at record {} comes after {} on rid {}",
                        beg1, self.record_count, prev_beg1, rid
                    ),
                ));
            }
        }

        self.prev = Some((rid, beg1));
        Ok(())
    }

    /// Get the number of records validated.
    pub fn record_count(&self) -> usize {
        self.record_count
    }
}

/// Read a variant source to the end, checking (rid, beg1) order.
///
/// Returns the number of records.
pub fn verify_sorted_variants<P, S>(source: &mut S, file_id: &str) -> Result<usize>
where
    S: OrderedRecordSource<VariantRecord<P>>,
{
    let mut validator = SortValidator::new();
    while let Some(record) = source.read()? {
        validator.validate(record.rid, record.beg1, file_id)?;
    }
    Ok(validator.record_count())
}

/// Verify that a BED file is sorted: contiguous chromosomes and
/// non-decreasing starts. Returns the number of records.
pub fn verify_sorted_regions<P: AsRef<Path>>(path: P) -> Result<usize> {
    let mut source = BedRegionSource::from_path(path)?;
    let mut count = 0;
    while source.read()?.is_some() {
        count += 1;
    }
    Ok(count)
}
