//! The ordered record source abstraction.
//!
//! The sliding-window engines never touch a file format directly. They pull
//! records from an [`OrderedRecordSource`], which knows how to reposition at
//! the start of a sequence and how to hand out the next record in file order.

use crate::error::Result;
use crate::interval::{RegionRecord, VariantRecord};

/// A sorted record reader with sequence-level seeking.
pub trait OrderedRecordSource<T> {
    /// Reposition at the first record of `seq`.
    ///
    /// If the sequence is absent the source becomes exhausted until the next
    /// jump.
    fn jump_to_interval(&mut self, seq: &str) -> Result<()>;

    /// Read the next record, or `None` once the source is exhausted.
    fn read(&mut self) -> Result<Option<T>>;
}

impl<T, S: OrderedRecordSource<T> + ?Sized> OrderedRecordSource<T> for &mut S {
    fn jump_to_interval(&mut self, seq: &str) -> Result<()> {
        (**self).jump_to_interval(seq)
    }

    fn read(&mut self) -> Result<Option<T>> {
        (**self).read()
    }
}

/// Records that know which sequence they belong to.
pub trait SequenceName {
    fn sequence_name(&self) -> &str;
}

impl SequenceName for RegionRecord {
    #[inline]
    fn sequence_name(&self) -> &str {
        self.chrom()
    }
}

impl<P: SequenceName> SequenceName for VariantRecord<P> {
    #[inline]
    fn sequence_name(&self) -> &str {
        self.payload.sequence_name()
    }
}

/// An in-memory source over records already in sorted order.
///
/// Useful for tests and for callers that hold a small region set in memory.
#[derive(Debug, Clone)]
pub struct VecSource<T> {
    records: Vec<T>,
    pos: usize,
    /// Sequence selected by the last jump; `None` reads the whole vector.
    selected: Option<String>,
}

impl<T> VecSource<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            pos: 0,
            selected: None,
        }
    }

    /// Records not yet handed out (ignoring any sequence selection).
    pub fn remaining(&self) -> usize {
        self.records.len() - self.pos
    }
}

impl<T: SequenceName + Clone> OrderedRecordSource<T> for VecSource<T> {
    fn jump_to_interval(&mut self, seq: &str) -> Result<()> {
        self.pos = self
            .records
            .iter()
            .position(|r| r.sequence_name() == seq)
            .unwrap_or(self.records.len());
        self.selected = Some(seq.to_string());
        Ok(())
    }

    fn read(&mut self) -> Result<Option<T>> {
        let Some(record) = self.records.get(self.pos) else {
            return Ok(None);
        };
        if let Some(ref seq) = self.selected {
            if record.sequence_name() != seq {
                self.pos = self.records.len();
                return Ok(None);
            }
        }
        self.pos += 1;
        Ok(Some(record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::GenomicInterval;

    fn region(chrom: &str, start1: u64, end1: u64) -> RegionRecord {
        RegionRecord::new(GenomicInterval::new(chrom, start1, end1).unwrap())
    }

    #[test]
    fn test_vec_source_reads_in_order() {
        let mut src = VecSource::new(vec![region("chr1", 1, 5), region("chr2", 3, 9)]);

        assert_eq!(src.read().unwrap().unwrap().chrom(), "chr1");
        assert_eq!(src.read().unwrap().unwrap().chrom(), "chr2");
        assert!(src.read().unwrap().is_none());
    }

    #[test]
    fn test_vec_source_jump_stops_at_sequence_end() {
        let mut src = VecSource::new(vec![
            region("chr1", 1, 5),
            region("chr2", 3, 9),
            region("chr2", 10, 12),
            region("chr3", 1, 2),
        ]);

        src.jump_to_interval("chr2").unwrap();
        assert_eq!(src.read().unwrap().unwrap().start1(), 3);
        assert_eq!(src.read().unwrap().unwrap().start1(), 10);
        assert!(src.read().unwrap().is_none());
    }

    #[test]
    fn test_vec_source_jump_to_absent_sequence() {
        let mut src = VecSource::new(vec![region("chr1", 1, 5)]);

        src.jump_to_interval("chrX").unwrap();
        assert!(src.read().unwrap().is_none());

        src.jump_to_interval("chr1").unwrap();
        assert!(src.read().unwrap().is_some());
    }
}
