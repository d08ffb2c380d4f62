//! Core record types for sorted genomic streams.
//!
//! All coordinates in this crate are 1-based and inclusive (`beg1`/`end1`),
//! the convention used by VCF. BED input is converted on read.

use std::cmp::Ordering;
use std::fmt;

/// A genomic interval with 1-based, inclusive coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomicInterval {
    pub chrom: String,
    pub start1: u64,
    pub end1: u64,
}

impl GenomicInterval {
    /// Create a new interval. Returns `None` if `start1 > end1`.
    #[inline]
    pub fn new(chrom: impl Into<String>, start1: u64, end1: u64) -> Option<Self> {
        if start1 > end1 {
            return None;
        }
        Some(Self {
            chrom: chrom.into(),
            start1,
            end1,
        })
    }

    /// Number of bases covered.
    #[inline]
    pub fn len(&self) -> u64 {
        self.end1 - self.start1 + 1
    }

    /// Always false: a valid interval covers at least one base.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check overlap with `start1..=end1` on the same chromosome.
    #[inline]
    pub fn overlaps(&self, start1: u64, end1: u64) -> bool {
        self.start1.max(start1) <= self.end1.min(end1)
    }

    /// Check overlap with another interval, including the chromosome.
    #[inline]
    pub fn overlaps_interval(&self, other: &GenomicInterval) -> bool {
        self.chrom == other.chrom && self.overlaps(other.start1, other.end1)
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start1, self.end1)
    }
}

/// A region read from a region file. Read-only once buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRecord {
    pub interval: GenomicInterval,
    /// Columns beyond the coordinates, kept verbatim.
    pub fields: Vec<String>,
}

impl RegionRecord {
    pub fn new(interval: GenomicInterval) -> Self {
        Self {
            interval,
            fields: Vec::new(),
        }
    }

    #[inline]
    pub fn chrom(&self) -> &str {
        &self.interval.chrom
    }

    #[inline]
    pub fn start1(&self) -> u64 {
        self.interval.start1
    }

    #[inline]
    pub fn end1(&self) -> u64 {
        self.interval.end1
    }
}

/// A variant with its contig rank (`rid`) and an opaque payload.
///
/// `rid` encodes contig order, so records compare by `rid` first and then by
/// `beg1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord<P> {
    pub rid: u32,
    pub beg1: u64,
    pub end1: u64,
    pub payload: P,
}

impl<P> VariantRecord<P> {
    pub fn new(rid: u32, beg1: u64, end1: u64, payload: P) -> Self {
        Self {
            rid,
            beg1,
            end1,
            payload,
        }
    }

    /// Compare stream positions by (rid, beg1).
    #[inline]
    pub fn position_cmp<Q>(&self, other: &VariantRecord<Q>) -> Ordering {
        self.rid
            .cmp(&other.rid)
            .then(self.beg1.cmp(&other.beg1))
    }

    /// Same contig and `max(beg1) <= min(end1)`.
    #[inline]
    pub fn overlaps<Q>(&self, other: &VariantRecord<Q>) -> bool {
        self.rid == other.rid && self.beg1.max(other.beg1) <= self.end1.min(other.end1)
    }
}

impl<P> fmt::Display for VariantRecord<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rid {} at {}-{}", self.rid, self.beg1, self.end1)
    }
}
