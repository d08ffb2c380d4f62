//! Ordered region overlap matching.
//!
//! Answers "does chrom:start1-end1 hit any region in the set" for a stream of
//! queries that advances monotonically along each chromosome. Only regions
//! that can still matter for the current or a later query are kept in
//! memory; everything else stays in the region source.
//!
//! # Memory Complexity
//!
//! O(k) where k = number of regions spanning the current query, plus the
//! one region read past it.
//!
//! # Requirements
//!
//! Within a chromosome, successive queries must have non-decreasing `start1`.
//! Regions that ended before an earlier query are evicted, so a query that
//! steps backwards could miss them. Such a query is rejected with
//! [`StreamError::NonMonotonicQuery`] unless strict query order is disabled
//! in [`crate::config`].

use crate::config::is_strict_query_order;
use crate::error::{Result, StreamError};
use crate::interval::RegionRecord;
use crate::source::OrderedRecordSource;
use std::collections::VecDeque;
use std::fmt;

/// Counters for a matcher's lifetime.
#[derive(Debug, Clone, Default)]
pub struct MatcherStats {
    pub queries: usize,
    pub hits: usize,
    pub regions_read: usize,
    pub regions_evicted: usize,
    pub max_buffered: usize,
}

impl fmt::Display for MatcherStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Queries: {}, Hits: {}, Regions read: {}, Evicted: {}, Max buffered: {}",
            self.queries, self.hits, self.regions_read, self.regions_evicted, self.max_buffered
        )
    }
}

/// Overlap matcher over a sorted region source.
pub struct RegionOverlapMatcher<S> {
    source: S,
    /// Chromosome of the buffered regions; `None` before the first query.
    current_chrom: Option<String>,
    /// Regions of `current_chrom`, ascending by start1.
    buffer: VecDeque<RegionRecord>,
    last_start1: u64,
    stats: MatcherStats,
}

impl<S: OrderedRecordSource<RegionRecord>> RegionOverlapMatcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            current_chrom: None,
            buffer: VecDeque::new(),
            last_start1: 0,
            stats: MatcherStats::default(),
        }
    }

    /// Returns true if `chrom:start1-end1` overlaps a region in the source.
    pub fn overlaps(&mut self, chrom: &str, start1: u64, end1: u64) -> Result<bool> {
        let hit = self.query(chrom, start1, end1)?;
        self.stats.queries += 1;
        if hit {
            self.stats.hits += 1;
        }
        Ok(hit)
    }

    fn query(&mut self, chrom: &str, start1: u64, end1: u64) -> Result<bool> {
        if self.current_chrom.as_deref() != Some(chrom) {
            self.buffer.clear();
            self.current_chrom = Some(chrom.to_string());
            self.source.jump_to_interval(chrom)?;
            self.last_start1 = start1;
            return self.pull(start1, end1);
        }

        if start1 < self.last_start1 && is_strict_query_order() {
            return Err(StreamError::NonMonotonicQuery {
                chrom: chrom.to_string(),
                previous: self.last_start1,
                start1,
            });
        }
        self.last_start1 = start1;

        while let Some(front) = self.buffer.front() {
            // Ends before this query, so before every later one too
            if front.end1() < start1 {
                self.buffer.pop_front();
                self.stats.regions_evicted += 1;
                continue;
            }
            // Buffer is sorted by start1: the front decides
            return Ok(front.start1() <= end1);
        }

        self.pull(start1, end1)
    }

    /// Read regions until one starts past `end1` or the source runs out.
    fn pull(&mut self, start1: u64, end1: u64) -> Result<bool> {
        let mut overlaps = false;
        while let Some(region) = self.source.read()? {
            self.stats.regions_read += 1;
            if region.end1() < start1 {
                continue;
            }

            let past_query = region.start1() > end1;
            overlaps |= !past_query;
            self.buffer.push_back(region);
            self.stats.max_buffered = self.stats.max_buffered.max(self.buffer.len());

            if past_query {
                break;
            }
        }
        Ok(overlaps)
    }

    /// Chromosome of the last query.
    pub fn current_chrom(&self) -> Option<&str> {
        self.current_chrom.as_deref()
    }

    /// Number of buffered regions.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn stats(&self) -> &MatcherStats {
        &self.stats
    }

    pub fn into_source(self) -> S {
        self.source
    }
}
