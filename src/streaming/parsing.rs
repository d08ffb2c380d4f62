//! Zero-allocation line parsing utilities.
//!
//! Shared by the BED and VCF readers and by the sequence offset index.

use memchr::{memchr, memchr_iter};

/// Fast u64 parsing - no allocation, no error formatting.
///
/// Returns None if the input is empty or contains non-digit characters.
#[inline(always)]
pub fn parse_u64_fast(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(d as u64)?;
    }
    Some(n)
}

/// Strip a trailing `\n` or `\r\n`.
#[inline(always)]
pub fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Return the first tab-delimited field (the sequence name for BED and VCF).
#[inline(always)]
pub fn first_field(line: &[u8]) -> &[u8] {
    let line = trim_line_end(line);
    match memchr(b'\t', line) {
        Some(tab) => &line[..tab],
        None => line,
    }
}

/// The three leading BED columns plus whatever follows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bed3Fields<'a> {
    pub chrom: &'a [u8],
    pub start: u64,
    pub end: u64,
    /// Columns after `end`, without the separating tab. `None` for BED3.
    pub rest: Option<&'a [u8]>,
}

/// Split a BED line into its first three columns and the remainder.
///
/// Returns None when a column is missing or a coordinate is not a number.
#[inline(always)]
pub fn parse_bed3(line: &[u8]) -> Option<Bed3Fields<'_>> {
    let line = trim_line_end(line);
    let mut tabs = memchr_iter(b'\t', line);
    let t1 = tabs.next()?;
    let t2 = tabs.next()?;
    let t3 = tabs.next();

    let start = parse_u64_fast(&line[t1 + 1..t2])?;
    let end = parse_u64_fast(&line[t2 + 1..t3.unwrap_or(line.len())])?;

    Some(Bed3Fields {
        chrom: &line[..t1],
        start,
        end,
        rest: t3.map(|t| &line[t + 1..]),
    })
}

/// Check if a BED line should be skipped (empty, comment, or header).
#[inline(always)]
pub fn should_skip_line(line: &[u8]) -> bool {
    let line = trim_line_end(line);
    line.is_empty() || line[0] == b'#' || line.starts_with(b"track") || line.starts_with(b"browser")
}
