//! Scan-based materialization: stream compaction and grouping.
//!
//! Both modes follow the same three-phase protocol:
//!
//! 1. **evaluate** - one flag per element (keep, or starts-a-group)
//! 2. **scan** - exclusive scan over the flags; for compaction the prefix
//!    is each survivor's output index, for grouping it carries the running
//!    group count and each element's enclosing-group start
//! 3. **scatter** - every survivor (or group representative) writes its
//!    single output slot
//!
//! Phases are separated by a barrier; within a phase all per-element work
//! is independent. Both modes preserve the input's relative order.

use rayon::prelude::*;

use crate::scan::{add_scan, exclusive_scan_with};

/// Half-open element range of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupSpan {
    pub start: usize,
    pub end: usize,
}

impl GroupSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// A grouped concrete sequence: the element buffer plus one span
/// descriptor per group, in input order. Spans partition `[0, len)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedSeq<V> {
    pub elems: Vec<V>,
    pub spans: Vec<GroupSpan>,
}

impl<V> GroupedSeq<V> {
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn group(&self, index: usize) -> &[V] {
        let span = self.spans[index];
        &self.elems[span.start..span.end]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[V]> {
        self.spans.iter().map(|span| &self.elems[span.start..span.end])
    }
}

/// A slot of a placeholder-aware sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<V> {
    Present(V),
    /// Tombstone: logically removed, not yet physically deleted.
    Missing,
}

impl<V> Slot<V> {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn present(self) -> Option<V> {
        match self {
            Self::Present(v) => Some(v),
            Self::Missing => None,
        }
    }
}

/// Shared output cursor for the scatter phase.
///
/// Each participating element owns exactly one slot index, so concurrent
/// writes never alias.
#[derive(Clone, Copy)]
struct SlotWriter<T>(*mut T);

// SAFETY: writers only store to disjoint indices of a buffer that outlives
// the scatter phase; the wrapper exists to move the base pointer into
// rayon closures.
unsafe impl<T: Send> Send for SlotWriter<T> {}
unsafe impl<T: Send> Sync for SlotWriter<T> {}

impl<T> SlotWriter<T> {
    fn new(ptr: *mut T) -> Self {
        Self(ptr)
    }

    /// # Safety
    ///
    /// `index` must be in bounds of the underlying buffer and owned by
    /// exactly one caller.
    unsafe fn write(&self, index: usize, value: T) {
        unsafe { self.0.add(index).write(value) };
    }
}

/// Stream compaction: keep exactly the elements satisfying `keep`, in
/// input order.
pub fn compact<V, F>(input: &[V], keep: F) -> Vec<V>
where
    V: Clone + Send + Sync,
    F: Fn(&V) -> bool + Sync,
{
    // Phase 1: evaluate.
    let flags: Vec<usize> = input.par_iter().map(|v| keep(v) as usize).collect();

    // Phase 2: scan. offsets[i] = kept count strictly before i.
    let (offsets, total) = add_scan(&flags);

    // Phase 3: scatter.
    let mut out: Vec<V> = Vec::with_capacity(total);
    let writer = SlotWriter::new(out.as_mut_ptr());
    (0..input.len()).into_par_iter().for_each(|i| {
        if flags[i] == 1 {
            // SAFETY: offsets[i] < total, and each kept element has a
            // distinct offset.
            unsafe { writer.write(offsets[i], input[i].clone()) };
        }
    });
    // SAFETY: exactly `total` slots were initialized, one per kept element.
    unsafe { out.set_len(total) };
    out
}

/// Compaction of an explicitly placeholder-marked sequence: drops the
/// tombstones, keeps present values in order.
pub fn compact_slots<V>(input: &[Slot<V>]) -> Vec<V>
where
    V: Clone + Send + Sync,
{
    let flags: Vec<usize> = input.par_iter().map(|slot| slot.is_present() as usize).collect();
    let (offsets, total) = add_scan(&flags);

    let mut out: Vec<V> = Vec::with_capacity(total);
    let writer = SlotWriter::new(out.as_mut_ptr());
    (0..input.len()).into_par_iter().for_each(|i| {
        if let Slot::Present(v) = &input[i] {
            // SAFETY: offsets[i] < total, one writer per present slot.
            unsafe { writer.write(offsets[i], v.clone()) };
        }
    });
    // SAFETY: exactly `total` slots were initialized.
    unsafe { out.set_len(total) };
    out
}

/// Per-element scan value for grouping: boundary count plus the position
/// of the most recent boundary. Combination is associative, so the scan
/// may run blocked.
#[derive(Debug, Clone, Copy)]
struct GroupAccum {
    boundaries: usize,
    last_start: Option<usize>,
}

impl GroupAccum {
    const IDENTITY: Self = Self { boundaries: 0, last_start: None };

    fn combine(a: &Self, b: &Self) -> Self {
        Self { boundaries: a.boundaries + b.boundaries, last_start: b.last_start.or(a.last_start) }
    }
}

/// Grouping fused with compaction: one boundary flag per adjacent pair,
/// one scan, one span descriptor scattered per group.
///
/// The spans partition `[0, input.len())` in order; `boundary(prev, next)`
/// returning true starts a new group at `next`, and the first element
/// always starts one.
pub fn compact_and_group<V, F>(input: &[V], boundary: F) -> GroupedSeq<V>
where
    V: Clone + Send + Sync,
    F: Fn(&V, &V) -> bool + Sync,
{
    let n = input.len();
    if n == 0 {
        return GroupedSeq { elems: Vec::new(), spans: Vec::new() };
    }

    // Phase 1: evaluate boundary flags over adjacent pairs.
    let flags: Vec<usize> =
        (0..n).into_par_iter().map(|i| if i == 0 { 1 } else { boundary(&input[i - 1], &input[i]) as usize }).collect();

    // Phase 2: scan with the span semigroup. scanned[i] combines all
    // elements strictly before i: its boundary count is i's group index
    // when i is a boundary, and its last_start is i's enclosing-group
    // start otherwise.
    let accums: Vec<GroupAccum> = flags
        .par_iter()
        .enumerate()
        .map(|(i, &flag)| GroupAccum { boundaries: flag, last_start: (flag == 1).then_some(i) })
        .collect();
    let (scanned, total) = exclusive_scan_with(&accums, GroupAccum::IDENTITY, GroupAccum::combine);
    let groups = total.boundaries;

    // Phase 3: scatter. A boundary at i owns the start slot of its own
    // group and the end slot of the previous one; the final end is fixed
    // up after the barrier.
    let mut starts = vec![0usize; groups];
    let mut ends = vec![0usize; groups];
    let start_writer = SlotWriter::new(starts.as_mut_ptr());
    let end_writer = SlotWriter::new(ends.as_mut_ptr());
    (0..n).into_par_iter().for_each(|i| {
        if flags[i] == 1 {
            let group = scanned[i].boundaries;
            // SAFETY: group < groups; each boundary owns these two slots.
            unsafe { start_writer.write(group, i) };
            if group > 0 {
                unsafe { end_writer.write(group - 1, i) };
            }
        }
    });
    ends[groups - 1] = n;

    let spans = starts.into_iter().zip(ends).map(|(start, end)| GroupSpan { start, end }).collect();
    GroupedSeq { elems: input.to_vec(), spans }
}
