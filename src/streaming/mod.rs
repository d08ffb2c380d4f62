//! Shared streaming utilities.
//!
//! This module provides the low-level pieces used by every reader and writer:
//! - Zero-allocation line parsing
//! - Buffer size constants
//! - Plain and BGZF input
//! - Buffered output formatting
//! - Sort validation

pub mod buffers;
pub mod input;
pub mod output;
pub mod parsing;
pub mod validation;

pub use input::TextReader;
pub use output::RecordWriter;
pub use parsing::{
    first_field, parse_bed3, parse_u64_fast, should_skip_line, trim_line_end, Bed3Fields,
};
pub use validation::{verify_sorted_regions, verify_sorted_variants, SortValidator};
