//! Windowed variant buffer.
//!
//! Variants arrive sorted by (rid, beg1). The buffer keeps every variant that
//! could still overlap a future arrival, reports overlapping pairs to an
//! [`OverlapPolicy`], and hands variants to a [`VariantSink`] once they fall
//! behind the window.
//!
//! # Memory Complexity
//!
//! O(k) where k = number of variants within the window allowance of the
//! newest arrival.
//!
//! # Limitation
//!
//! Two variants on the same contig whose distance exceeds the window
//! allowance are never compared: the earlier one is flushed first. Callers
//! needing a stronger guarantee must raise the allowance.

use crate::config::DEFAULT_WINDOW_ALLOWANCE;
use crate::error::{Result, StreamError};
use crate::interval::VariantRecord;
use crate::source::{OrderedRecordSource, SequenceName};
use std::collections::VecDeque;
use std::fmt;

/// Receives variants leaving the buffer. Ownership moves to the sink.
pub trait VariantSink<P> {
    fn write(&mut self, record: VariantRecord<P>) -> Result<()>;
}

impl<P> VariantSink<P> for Vec<VariantRecord<P>> {
    fn write(&mut self, record: VariantRecord<P>) -> Result<()> {
        self.push(record);
        Ok(())
    }
}

impl<P, S: VariantSink<P> + ?Sized> VariantSink<P> for &mut S {
    fn write(&mut self, record: VariantRecord<P>) -> Result<()> {
        (**self).write(record)
    }
}

/// Hook invoked once per overlapping (incoming, buffered) pair.
///
/// The buffer does not interpret what the policy does. A policy may tag the
/// buffered record through its payload, count pairs, or do nothing.
pub trait OverlapPolicy<P> {
    fn on_overlap(&mut self, incoming: &VariantRecord<P>, buffered: &mut VariantRecord<P>);
}

/// The default policy: ignore overlaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlapPolicy;

impl<P> OverlapPolicy<P> for NoOverlapPolicy {
    #[inline]
    fn on_overlap(&mut self, _incoming: &VariantRecord<P>, _buffered: &mut VariantRecord<P>) {}
}

/// Counts overlapping pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapCounter {
    pub pairs: usize,
}

impl<P> OverlapPolicy<P> for OverlapCounter {
    #[inline]
    fn on_overlap(&mut self, _incoming: &VariantRecord<P>, _buffered: &mut VariantRecord<P>) {
        self.pairs += 1;
    }
}

impl<P, O: OverlapPolicy<P> + ?Sized> OverlapPolicy<P> for &mut O {
    #[inline]
    fn on_overlap(&mut self, incoming: &VariantRecord<P>, buffered: &mut VariantRecord<P>) {
        (**self).on_overlap(incoming, buffered)
    }
}

/// Counters for a buffer's lifetime.
#[derive(Debug, Clone, Default)]
pub struct WindowStats {
    pub inserted: usize,
    pub flushed: usize,
    pub overlaps: usize,
    pub max_buffered: usize,
}

impl fmt::Display for WindowStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Inserted: {}, Flushed: {}, Overlapping pairs: {}, Max buffered: {}",
            self.inserted, self.flushed, self.overlaps, self.max_buffered
        )
    }
}

/// Ordered, window-bounded buffer of variants.
pub struct VariantWindowBuffer<P, E, O = NoOverlapPolicy> {
    buffer: VecDeque<VariantRecord<P>>,
    window_allowance: u64,
    exit: E,
    policy: O,
    /// Highest rid inserted so far; an arrival below it is unordered.
    last_rid: Option<u32>,
    /// Contig name of `last_rid`, for error messages.
    last_seq: String,
    source_name: String,
    stats: WindowStats,
}

impl<P: SequenceName, E: VariantSink<P>> VariantWindowBuffer<P, E, NoOverlapPolicy> {
    /// Create a buffer with the default window allowance and no overlap policy.
    pub fn new(exit: E) -> Self {
        Self::with_policy(exit, NoOverlapPolicy)
    }
}

impl<P, E, O> VariantWindowBuffer<P, E, O>
where
    P: SequenceName,
    E: VariantSink<P>,
    O: OverlapPolicy<P>,
{
    pub fn with_policy(exit: E, policy: O) -> Self {
        Self {
            buffer: VecDeque::new(),
            window_allowance: DEFAULT_WINDOW_ALLOWANCE,
            exit,
            policy,
            last_rid: None,
            last_seq: String::new(),
            source_name: "input".to_string(),
            stats: WindowStats::default(),
        }
    }

    /// Set the window allowance in bases.
    pub fn window_allowance(mut self, bases: u64) -> Self {
        self.window_allowance = bases;
        self
    }

    /// Name used in unordered-input errors (usually the input file).
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Insert a variant, reporting overlaps with buffered variants on the
    /// same contig.
    ///
    /// The buffer stays sorted by (rid, beg1); the variant is placed after
    /// any buffered entry at the same position.
    pub fn insert(&mut self, record: VariantRecord<P>) -> Result<()> {
        if let Some(last) = self.last_rid {
            if record.rid < last {
                return Err(unordered(&self.source_name, &record, &self.last_seq));
            }
        }

        let mut insert_at = self.buffer.len();
        let mut found_slot = false;
        for (i, entry) in self.buffer.iter_mut().enumerate() {
            if record.rid < entry.rid {
                return Err(unordered(&self.source_name, &record, entry.sequence_name()));
            }
            if record.overlaps(&*entry) {
                self.policy.on_overlap(&record, entry);
                self.stats.overlaps += 1;
            }
            if !found_slot && record.position_cmp(&*entry).is_lt() {
                insert_at = i;
                found_slot = true;
            }
        }

        if self.last_rid != Some(record.rid) {
            self.last_rid = Some(record.rid);
            self.last_seq.clear();
            self.last_seq.push_str(record.sequence_name());
        }
        self.buffer.insert(insert_at, record);
        self.stats.inserted += 1;
        self.stats.max_buffered = self.stats.max_buffered.max(self.buffer.len());
        Ok(())
    }

    /// Flush variants that can no longer interact with anything to come.
    ///
    /// With a boundary, an entry leaves iff its rid is smaller than the
    /// boundary's, or it is on the same contig and
    /// `end1 < boundary.beg1 - min(window_allowance, boundary.beg1)`.
    /// Without a boundary every entry leaves, in buffer order.
    ///
    /// A buffered rid greater than the boundary's means the input is
    /// unordered; nothing is flushed in that case.
    pub fn flush(&mut self, boundary: Option<&VariantRecord<P>>) -> Result<()> {
        let Some(boundary) = boundary else {
            while let Some(entry) = self.buffer.pop_front() {
                self.emit(entry)?;
            }
            return Ok(());
        };

        if let Some(back) = self.buffer.back() {
            if back.rid > boundary.rid {
                return Err(unordered(&self.source_name, boundary, back.sequence_name()));
            }
        }

        let cutoff = boundary.beg1 - self.window_allowance.min(boundary.beg1);
        // Rotate once through the buffer: expired entries leave, the rest
        // return to the back in their original order.
        for _ in 0..self.buffer.len() {
            let Some(entry) = self.buffer.pop_front() else {
                break;
            };
            let expired =
                entry.rid < boundary.rid || (entry.rid == boundary.rid && entry.end1 < cutoff);
            if expired {
                self.emit(entry)?;
            } else {
                self.buffer.push_back(entry);
            }
        }
        Ok(())
    }

    /// End of stream: flush everything, then pass every record left in
    /// `source` straight to the sink.
    pub fn drain<S>(&mut self, source: &mut S) -> Result<()>
    where
        S: OrderedRecordSource<VariantRecord<P>>,
    {
        self.flush(None)?;
        while let Some(record) = source.read()? {
            self.emit(record)?;
        }
        Ok(())
    }

    #[inline]
    fn emit(&mut self, record: VariantRecord<P>) -> Result<()> {
        self.stats.flushed += 1;
        self.exit.write(record)
    }

    /// Number of buffered variants.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Buffered variants in order.
    pub fn iter(&self) -> impl Iterator<Item = &VariantRecord<P>> {
        self.buffer.iter()
    }

    pub fn stats(&self) -> &WindowStats {
        &self.stats
    }

    pub fn policy(&self) -> &O {
        &self.policy
    }

    pub fn exit(&self) -> &E {
        &self.exit
    }

    /// Consume the buffer, returning the sink and policy.
    ///
    /// Variants still buffered are dropped; call [`flush`](Self::flush) with
    /// `None` first to keep them.
    pub fn into_parts(self) -> (E, O) {
        (self.exit, self.policy)
    }
}

fn unordered<Q: SequenceName>(
    source_name: &str,
    record: &VariantRecord<Q>,
    seen_sequence: &str,
) -> StreamError {
    StreamError::unordered(
        source_name,
        format!(
            "variant at {}:{} (rid {}) arrived after contig {}",
            record.sequence_name(),
            record.beg1,
            record.rid,
            seen_sequence
        ),
    )
}
