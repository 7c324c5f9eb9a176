//! Execution-plan data model.
//!
//! A synthesized plan is an ordered list of entries followed by exactly
//! one terminal. Entries are either pure index arithmetic
//! ([`BoundsAdjust`], no data movement) or a scan-based materialization
//! pass producing a new concrete sequence. A plan is produced fresh per
//! rewrite request, immutable once synthesized, and consumed once by the
//! execution substrate.

use std::fmt;

use smallvec::SmallVec;

use sluice_ir::{Boundary, Combine, Positional, Predicate, StageDescriptor, StageKind, StageParams, Transform, Visitor};

// ============================================================================
// Bounds windows
// ============================================================================

/// Closed-form work distribution: pure index arithmetic folded into how
/// work items are handed to execution agents.
///
/// Work item `i` covers source indices `offset + i * pitch + k * stride`
/// for `k < width`. Ungrouped views have `windowed == false`, where an
/// item is a single element and `pitch` is the element step. Once a
/// fixed-width windowing folds in, `windowed` is set and each item is a
/// group of `width` elements (width 1 is still a group). `limit` caps the
/// item count; `None` runs to the end of the source. `cap` is the
/// exclusive source-index bound left behind by an element-level
/// truncation: it stays fixed once windows fold on top, so a truncated
/// trailing window cannot spill past the elements it was cut to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundsAdjust {
    pub offset: usize,
    pub stride: usize,
    pub width: usize,
    pub pitch: usize,
    pub limit: Option<usize>,
    pub cap: Option<usize>,
    pub windowed: bool,
}

impl BoundsAdjust {
    pub const IDENTITY: Self =
        Self { offset: 0, stride: 1, width: 1, pitch: 1, limit: None, cap: None, windowed: false };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Drop the first `count` work items.
    pub fn fold_skip(&mut self, count: usize) {
        self.offset += count * self.pitch;
        self.limit = self.limit.map(|l| l.saturating_sub(count));
    }

    /// Keep at most `count` work items. Before windowing, items are
    /// elements, so the truncation also pins the source-index cap.
    pub fn fold_take(&mut self, count: usize) {
        self.limit = Some(self.limit.map_or(count, |l| l.min(count)));
        if !self.windowed {
            let end = self.offset + count * self.pitch;
            self.cap = Some(self.cap.map_or(end, |c| c.min(end)));
        }
    }

    /// Keep every `step`-th work item.
    pub fn fold_step_by(&mut self, step: usize) {
        debug_assert!(step > 0);
        self.pitch *= step;
        self.limit = self.limit.map(|l| l.div_ceil(step));
    }

    /// Fold fixed-width windows over the current element view. Callers
    /// must not fold windows twice; nested grouping has no closed form.
    pub fn fold_chunks(&mut self, width: usize) {
        debug_assert!(width > 0);
        debug_assert!(!self.windowed, "nested windowing is rejected before folding");
        self.stride = self.pitch;
        self.width = width;
        self.pitch *= width;
        self.limit = self.limit.map(|l| l.div_ceil(width));
        self.windowed = true;
    }

    fn effective_len(&self, len: usize) -> usize {
        self.cap.map_or(len, |c| c.min(len))
    }

    /// Number of work items over a source of `len` elements: items whose
    /// first element is in range, capped by `limit`.
    pub fn item_count(&self, len: usize) -> usize {
        let len = self.effective_len(len);
        let available = if self.offset >= len { 0 } else { 1 + (len - self.offset - 1) / self.pitch };
        match self.limit {
            Some(limit) => available.min(limit),
            None => available,
        }
    }

    /// Source index of element `k` of work item `item`. May point past the
    /// end of the source for partial trailing windows; callers bound `k`
    /// via [`Self::item_width_at`].
    #[inline]
    pub fn element_index(&self, item: usize, k: usize) -> usize {
        self.offset + item * self.pitch + k * self.stride
    }

    /// Number of in-range elements of work item `item` over a source of
    /// `len` elements (the final window may be partial).
    pub fn item_width_at(&self, item: usize, len: usize) -> usize {
        let len = self.effective_len(len);
        (0..self.width).take_while(|&k| self.element_index(item, k) < len).count()
    }
}

impl Default for BoundsAdjust {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ============================================================================
// Access adapters
// ============================================================================

/// One element-access wrapper: a value transform or an index-reading one.
#[derive(Clone)]
pub enum AccessStage<V> {
    Value(Transform<V>),
    Positional(Positional<V>),
}

/// Element-access adapter: the chain of folded element-wise stages applied
/// at consumption time, by a materialization pass's evaluate phase or by
/// the terminal.
///
/// Positional entries always expect positions in the *current* pending
/// view: folding a trivial removal underneath them re-maps their index
/// argument, so the executor can hand every entry the same position.
#[derive(Clone)]
pub struct AccessAdapter<V> {
    stages: SmallVec<[AccessStage<V>; 2]>,
    skip_missing: bool,
}

impl<V> AccessAdapter<V> {
    pub fn empty() -> Self {
        Self { stages: SmallVec::new(), skip_missing: false }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn has_positional(&self) -> bool {
        self.stages.iter().any(|s| matches!(s, AccessStage::Positional(_)))
    }

    /// True when the adapter operates over a sequence that may still
    /// contain placeholder markers: transforms apply to present values
    /// only and placeholders propagate unchanged.
    pub fn skips_missing(&self) -> bool {
        self.skip_missing
    }

    pub fn mark_skip_missing(&mut self) {
        self.skip_missing = true;
    }

    pub fn push_value(&mut self, f: Transform<V>) {
        self.stages.push(AccessStage::Value(f));
    }

    pub fn push_positional(&mut self, f: Positional<V>) {
        self.stages.push(AccessStage::Positional(f));
    }

    /// Apply the chain to one element at view position `index`.
    pub fn apply(&self, index: usize, value: V) -> V {
        self.stages.iter().fold(value, |v, stage| match stage {
            AccessStage::Value(f) => f.apply(v),
            AccessStage::Positional(f) => f.apply(index, v),
        })
    }

    pub fn stages(&self) -> &[AccessStage<V>] {
        &self.stages
    }
}

impl<V: 'static> AccessAdapter<V> {
    /// Re-map positional entries after a skip fold: current-view position
    /// `i` was position `i + count` in the view the entries were folded
    /// against.
    pub fn remap_skip(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.remap(move |i| i + count);
    }

    /// Re-map positional entries after a step fold: current-view position
    /// `i` was position `i * step`.
    pub fn remap_step_by(&mut self, step: usize) {
        if step == 1 {
            return;
        }
        self.remap(move |i| i * step);
    }

    fn remap(&mut self, map: impl Fn(usize) -> usize + Clone + Send + Sync + 'static) {
        for stage in &mut self.stages {
            if let AccessStage::Positional(f) = stage {
                let inner = f.clone();
                let map = map.clone();
                *f = Positional::new(move |i, v| inner.apply(map(i), v));
            }
        }
    }
}

impl<V> fmt::Debug for AccessAdapter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessAdapter")
            .field("stages", &self.stages.len())
            .field("positional", &self.has_positional())
            .field("skip_missing", &self.skip_missing)
            .finish()
    }
}

// ============================================================================
// Materialization passes
// ============================================================================

/// Which materializer mode a pass invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MaterializeMode {
    Compact,
    CompactAndGroup,
}

/// Pass payload: the predicate or grouping function the scan evaluates.
#[derive(Clone)]
pub enum PassKind<V> {
    /// Stream compaction. `keep == None` removes only existing
    /// placeholders; `Some` fuses a fresh per-element predicate into the
    /// same scan.
    Compact { keep: Option<Predicate<V>> },
    /// Grouping fused with removal of non-representative elements: one
    /// scan computes boundaries, group count and spans.
    CompactAndGroup { boundary: Boundary<V> },
}

/// One invocation of the scan-based materializer. The adapter is applied
/// during the evaluate phase, so the pass writes post-transform values and
/// the new concrete sequence needs no further wrapping.
#[derive(Clone)]
pub struct MaterializePass<V> {
    pub kind: PassKind<V>,
    pub adapter: AccessAdapter<V>,
}

impl<V> MaterializePass<V> {
    pub fn mode(&self) -> MaterializeMode {
        match self.kind {
            PassKind::Compact { .. } => MaterializeMode::Compact,
            PassKind::CompactAndGroup { .. } => MaterializeMode::CompactAndGroup,
        }
    }
}

impl<V> fmt::Debug for MaterializePass<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterializePass").field("mode", &self.mode()).field("adapter", &self.adapter).finish()
    }
}

// ============================================================================
// Plan entries and terminals
// ============================================================================

/// One plan entry: index arithmetic or a materialization pass.
#[derive(Debug, Clone)]
pub enum PlanEntry<V> {
    Bounds(BoundsAdjust),
    Materialize(MaterializePass<V>),
}

/// Entry discriminant, for plan-shape assertions and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    Bounds,
    Compact,
    CompactAndGroup,
}

impl<V> PlanEntry<V> {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Bounds(_) => EntryKind::Bounds,
            Self::Materialize(pass) => match pass.mode() {
                MaterializeMode::Compact => EntryKind::Compact,
                MaterializeMode::CompactAndGroup => EntryKind::CompactAndGroup,
            },
        }
    }
}

/// The bulk operation that consumes the final sequence.
#[derive(Clone)]
pub enum TerminalOp<V> {
    /// Visit every element (or every element of every group) in order.
    ForEach(Visitor<V>),
    /// Fold all elements with an associative combine.
    Reduce { init: V, combine: Combine<V> },
    /// Materialize the final sequence.
    Collect,
}

impl<V> TerminalOp<V> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ForEach(_) => "for_each",
            Self::Reduce { .. } => "reduce",
            Self::Collect => "collect",
        }
    }
}

impl<V> fmt::Debug for TerminalOp<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The single terminal entry: the requested bulk operation plus the
/// element-access adapter it reads through.
#[derive(Debug, Clone)]
pub struct Terminal<V> {
    pub op: TerminalOp<V>,
    pub adapter: AccessAdapter<V>,
}

// ============================================================================
// Execution plans
// ============================================================================

/// A synthesized execution plan: ordered entries, then one terminal.
///
/// Immutable once synthesized; the substrate interprets it once. The plan
/// itself performs no I/O and owns no element data; the base sequence is
/// supplied at execution time.
#[derive(Clone)]
pub struct ExecutionPlan<V> {
    pub entries: Vec<PlanEntry<V>>,
    pub terminal: Terminal<V>,
}

impl<V> ExecutionPlan<V> {
    /// Number of materialization passes in the plan.
    pub fn pass_count(&self) -> usize {
        self.entries.iter().filter(|e| matches!(e, PlanEntry::Materialize(_))).count()
    }

    /// Ordered entry discriminants, for shape assertions.
    pub fn entry_kinds(&self) -> Vec<EntryKind> {
        self.entries.iter().map(PlanEntry::kind).collect()
    }
}

impl<V> fmt::Debug for ExecutionPlan<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionPlan")
            .field("entries", &self.entry_kinds())
            .field("terminal", &self.terminal.op)
            .field("terminal_adapter", &self.terminal.adapter)
            .finish()
    }
}

// ============================================================================
// Shape fingerprints
// ============================================================================

/// Hashable fingerprint of a stage list: kinds plus constant parameters,
/// captured callables ignored. Synthesis is a pure function of the stage
/// list, so this is the key a caller uses to memoize plans per distinct
/// pipeline shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineShape(Vec<ShapeAtom>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeAtom {
    pub kind: StageKind,
    pub arg: Option<usize>,
}

impl PipelineShape {
    pub fn of<V>(stages: &[StageDescriptor<V>]) -> Self {
        Self(
            stages
                .iter()
                .map(|stage| {
                    let arg = match &stage.params {
                        StageParams::Count { count } => Some(*count),
                        StageParams::Width { width } => Some(*width),
                        StageParams::Positional { limit, .. } => *limit,
                        StageParams::Source { elems } => Some(elems.len()),
                        _ => None,
                    };
                    ShapeAtom { kind: stage.kind, arg }
                })
                .collect(),
        )
    }

    pub fn atoms(&self) -> &[ShapeAtom] {
        &self.0
    }
}
