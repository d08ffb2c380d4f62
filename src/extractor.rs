//! Variant extraction pipeline.
//!
//! Reads variants from a sorted source, drops those rejected by a
//! [`RecordFilter`], and drives a [`VariantWindowBuffer`] record by record:
//! flush against the new arrival, then insert it. At end of stream the buffer
//! is drained and any unread records pass straight through.

use crate::config::DEFAULT_WINDOW_ALLOWANCE;
use crate::error::Result;
use crate::interval::{RegionRecord, VariantRecord};
use crate::matcher::{MatcherStats, RegionOverlapMatcher};
use crate::source::{OrderedRecordSource, SequenceName};
use crate::window::{OverlapPolicy, VariantSink, VariantWindowBuffer};
use std::fmt;

/// Decides whether a record enters the window.
pub trait RecordFilter<T> {
    fn keep(&mut self, record: &T) -> Result<bool>;
}

/// Keeps every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<T> RecordFilter<T> for AcceptAll {
    #[inline]
    fn keep(&mut self, _record: &T) -> Result<bool> {
        Ok(true)
    }
}

/// Drops variants that overlap a sorted set of excluded regions.
///
/// Variants arrive sorted, so the queries the matcher sees advance
/// monotonically along each chromosome.
pub struct RegionExclusion<S> {
    matcher: RegionOverlapMatcher<S>,
    excluded: usize,
}

impl<S: OrderedRecordSource<RegionRecord>> RegionExclusion<S> {
    pub fn new(regions: S) -> Self {
        Self {
            matcher: RegionOverlapMatcher::new(regions),
            excluded: 0,
        }
    }

    /// Number of variants dropped so far.
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    pub fn matcher_stats(&self) -> &MatcherStats {
        self.matcher.stats()
    }
}

impl<P, S> RecordFilter<VariantRecord<P>> for RegionExclusion<S>
where
    P: SequenceName,
    S: OrderedRecordSource<RegionRecord>,
{
    fn keep(&mut self, record: &VariantRecord<P>) -> Result<bool> {
        let hit = self
            .matcher
            .overlaps(record.sequence_name(), record.beg1, record.end1)?;
        if hit {
            self.excluded += 1;
        }
        Ok(!hit)
    }
}

/// Summary of one extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractStats {
    pub records_read: usize,
    pub records_filtered: usize,
    pub records_written: usize,
    pub overlapping_pairs: usize,
    pub max_buffered: usize,
}

impl fmt::Display for ExtractStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Read: {}, Filtered: {}, Written: {}, Overlapping pairs: {}, Max buffered: {}",
            self.records_read,
            self.records_filtered,
            self.records_written,
            self.overlapping_pairs,
            self.max_buffered
        )
    }
}

/// Drives a window buffer over a variant source.
pub struct VariantExtractor<S, F = AcceptAll> {
    source: S,
    filter: F,
    window_allowance: u64,
    /// Sequences to visit in order; empty means the whole source.
    sequences: Vec<String>,
    source_name: String,
}

impl<S> VariantExtractor<S, AcceptAll> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            filter: AcceptAll,
            window_allowance: DEFAULT_WINDOW_ALLOWANCE,
            sequences: Vec::new(),
            source_name: "input".to_string(),
        }
    }
}

impl<S, F> VariantExtractor<S, F> {
    /// Replace the record filter.
    pub fn with_filter<G>(self, filter: G) -> VariantExtractor<S, G> {
        VariantExtractor {
            source: self.source,
            filter,
            window_allowance: self.window_allowance,
            sequences: self.sequences,
            source_name: self.source_name,
        }
    }

    /// Set the window allowance in bases.
    pub fn window_allowance(mut self, bases: u64) -> Self {
        self.window_allowance = bases;
        self
    }

    /// Restrict extraction to these sequences, visited in the given order.
    ///
    /// The order must match the source's sequence order, otherwise the run
    /// fails as unordered input.
    pub fn sequences(mut self, sequences: Vec<String>) -> Self {
        self.sequences = sequences;
        self
    }

    /// Name used in error messages.
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Run the pipeline, writing every surviving variant to `exit` in order
    /// and reporting overlapping pairs to `policy`.
    ///
    /// An unordered input stops the run with an error; variants flushed
    /// before that point have already been written.
    pub fn run<P, E, O>(&mut self, exit: E, policy: O) -> Result<ExtractStats>
    where
        P: SequenceName,
        S: OrderedRecordSource<VariantRecord<P>>,
        F: RecordFilter<VariantRecord<P>>,
        E: VariantSink<P>,
        O: OverlapPolicy<P>,
    {
        let mut buffer = VariantWindowBuffer::with_policy(exit, policy)
            .window_allowance(self.window_allowance)
            .source_name(self.source_name.clone());
        let mut stats = ExtractStats::default();

        if self.sequences.is_empty() {
            self.process(&mut buffer, &mut stats)?;
        } else {
            let sequences = std::mem::take(&mut self.sequences);
            let visited = sequences.iter().try_for_each(|seq| {
                self.source.jump_to_interval(seq)?;
                self.process(&mut buffer, &mut stats)
            });
            self.sequences = sequences;
            visited?;
        }
        buffer.drain(&mut self.source)?;

        let window = buffer.stats();
        stats.records_written = window.flushed;
        stats.overlapping_pairs = window.overlaps;
        stats.max_buffered = window.max_buffered;
        Ok(stats)
    }

    fn process<P, E, O>(
        &mut self,
        buffer: &mut VariantWindowBuffer<P, E, O>,
        stats: &mut ExtractStats,
    ) -> Result<()>
    where
        P: SequenceName,
        S: OrderedRecordSource<VariantRecord<P>>,
        F: RecordFilter<VariantRecord<P>>,
        E: VariantSink<P>,
        O: OverlapPolicy<P>,
    {
        while let Some(record) = self.source.read()? {
            stats.records_read += 1;
            if !self.filter.keep(&record)? {
                stats.records_filtered += 1;
                continue;
            }
            buffer.flush(Some(&record))?;
            buffer.insert(record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::GenomicInterval;
    use crate::source::VecSource;
    use crate::vcf::{VcfLine, VcfRecord};
    use crate::window::OverlapCounter;

    fn var(rid: u32, chrom: &str, beg1: u64, end1: u64) -> VcfRecord {
        VariantRecord::new(
            rid,
            beg1,
            end1,
            VcfLine {
                chrom: chrom.to_string(),
                line: format!("{}\t{}", chrom, beg1),
            },
        )
    }

    fn lines(records: &[VcfRecord]) -> Vec<String> {
        records.iter().map(|r| r.payload.line.clone()).collect()
    }

    fn region(chrom: &str, start1: u64, end1: u64) -> RegionRecord {
        RegionRecord::new(GenomicInterval::new(chrom, start1, end1).unwrap())
    }

    #[test]
    fn test_extract_writes_every_record_once_in_order() {
        let input = vec![
            var(0, "1", 10, 10),
            var(0, "1", 20, 20),
            var(0, "1", 7000, 7000),
            var(1, "2", 5, 5),
            var(1, "2", 9, 9),
        ];
        let expected = lines(&input);

        let mut out = Vec::new();
        let mut extractor = VariantExtractor::new(VecSource::new(input));
        let stats = extractor.run(&mut out, OverlapCounter::default()).unwrap();

        assert_eq!(lines(&out), expected);
        assert_eq!(stats.records_read, 5);
        assert_eq!(stats.records_written, 5);
    }

    #[test]
    fn test_extract_counts_overlaps() {
        let input = vec![
            var(0, "1", 100, 110),
            var(0, "1", 105, 105),
            var(0, "1", 108, 120),
        ];
        let mut out = Vec::new();
        let mut counter = OverlapCounter::default();
        let stats = VariantExtractor::new(VecSource::new(input))
            .run(&mut out, &mut counter)
            .unwrap();

        assert_eq!(counter.pairs, 2); // (105, 100-110) and (108-120, 100-110)
        assert_eq!(stats.overlapping_pairs, 2);
    }

    #[test]
    fn test_extract_window_limits_detection() {
        let input = vec![var(0, "1", 100, 100), var(0, "1", 6000, 6000)];
        let mut out = Vec::new();
        let stats = VariantExtractor::new(VecSource::new(input))
            .window_allowance(5000)
            .run(&mut out, OverlapCounter::default())
            .unwrap();

        assert_eq!(stats.max_buffered, 1);
    }

    #[test]
    fn test_extract_unordered_stops_run() {
        let input = vec![var(0, "1", 10, 10), var(1, "2", 10, 10), var(0, "1", 20, 20)];
        let mut out = Vec::new();
        let err = VariantExtractor::new(VecSource::new(input))
            .run(&mut out, OverlapCounter::default())
            .unwrap_err();

        assert!(err.is_unordered());
        assert!(err.to_string().contains("1:20 (rid 0) arrived after contig 2"));
        // Only the variant flushed by the rid change was written
        assert_eq!(lines(&out), vec!["1\t10"]);
    }

    #[test]
    fn test_extract_with_region_exclusion() {
        let input = vec![
            var(0, "1", 50, 50),
            var(0, "1", 150, 160),
            var(0, "1", 300, 300),
            var(1, "2", 20, 20),
        ];
        let excluded = VecSource::new(vec![region("1", 140, 155), region("2", 1, 100)]);

        let mut out = Vec::new();
        let mut extractor =
            VariantExtractor::new(VecSource::new(input)).with_filter(RegionExclusion::new(excluded));
        let stats = extractor.run(&mut out, OverlapCounter::default()).unwrap();

        assert_eq!(lines(&out), vec!["1\t50", "1\t300"]);
        assert_eq!(stats.records_filtered, 2);
        assert_eq!(extractor.filter().excluded(), 2);
        assert_eq!(extractor.filter().matcher_stats().queries, 4);
    }

    #[test]
    fn test_extract_selected_sequences() {
        let input = vec![
            var(0, "1", 10, 10),
            var(1, "2", 10, 10),
            var(2, "3", 10, 10),
        ];
        let mut out = Vec::new();
        let stats = VariantExtractor::new(VecSource::new(input))
            .sequences(vec!["1".to_string(), "3".to_string()])
            .run(&mut out, OverlapCounter::default())
            .unwrap();

        assert_eq!(lines(&out), vec!["1\t10", "3\t10"]);
        assert_eq!(stats.records_read, 2);
    }
}
