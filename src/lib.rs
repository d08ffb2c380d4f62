//! ordwin: sliding-window correlation of sorted genomic streams
//!
//! This library correlates sorted genomic records against other sorted
//! streams while holding only a small window of each in memory.
//!
//! # Features
//!
//! - **Ordered region matching**: answer overlap queries against a sorted
//!   region file, buffering only the regions near the current query
//! - **Windowed variant buffering**: detect overlaps between nearby variants
//!   and emit them in their original order
//! - **Fail-fast ordering**: unsorted input is a typed error, never silently
//!   reordered
//!
//! # Example
//!
//! ```rust,no_run
//! use ordwin::{BedRegionSource, RegionOverlapMatcher};
//!
//! let regions = BedRegionSource::from_path("excluded.bed").unwrap();
//! let mut matcher = RegionOverlapMatcher::new(regions);
//!
//! // Queries must advance along each chromosome
//! let hit = matcher.overlaps("chr1", 150, 160).unwrap();
//! println!("excluded: {}", hit);
//! ```

pub mod bed;
pub mod config;
pub mod error;
pub mod extractor;
pub mod index;
pub mod interval;
pub mod matcher;
pub mod source;
pub mod streaming;
pub mod vcf;
pub mod window;

// Re-export commonly used types
pub use bed::BedRegionSource;
pub use error::{Result, StreamError};
pub use extractor::{AcceptAll, ExtractStats, RecordFilter, RegionExclusion, VariantExtractor};
pub use interval::{GenomicInterval, RegionRecord, VariantRecord};
pub use matcher::RegionOverlapMatcher;
pub use source::{OrderedRecordSource, SequenceName, VecSource};
pub use vcf::{VcfRecord, VcfVariantSource, VcfWriter};
pub use window::{NoOverlapPolicy, OverlapCounter, OverlapPolicy, VariantSink, VariantWindowBuffer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bed::BedRegionSource;
    pub use crate::error::{Result, StreamError};
    pub use crate::extractor::{RecordFilter, RegionExclusion, VariantExtractor};
    pub use crate::interval::{GenomicInterval, RegionRecord, VariantRecord};
    pub use crate::matcher::RegionOverlapMatcher;
    pub use crate::source::{OrderedRecordSource, VecSource};
    pub use crate::vcf::{VcfVariantSource, VcfWriter};
    pub use crate::window::{OverlapPolicy, VariantSink, VariantWindowBuffer};
}
