//! Plan synthesis: a single left-to-right pass over the stage list,
//! threading tombstone state.
//!
//! The hazard state machine has two states, `Clean` and `Hazarded`, and
//! its transition table is the pure function [`transition`] over
//! (state × classification), unit-testable per transition without
//! building a pipeline. The synthesizer interprets the resulting actions:
//! it keeps one pending bounds window and one pending access adapter,
//! flushes the window before every materialization pass, and hands the
//! adapter to the pass that consumes it.
//!
//! Materialization is eager: every rule that meets a hazard also emits
//! the pass that clears it, so synthesis started `Clean` never carries
//! `Hazarded` across a stage boundary. The `Hazarded` rows exist for
//! resumed synthesis over an upstream-hazarded suffix
//! ([`PipelineState::with_tombstoned`]) and stay total so no stage
//! combination is ever silently mis-planned.

use snafu::{ResultExt, ensure};
use tracing::debug;

use sluice_ir::{GroupingClass, HazardMetadata, RemovalClass, StageDescriptor, StageKind};

use crate::error::{EmptyPipelineSnafu, MalformedStageSnafu, MisplacedFactorySnafu, Result, UnsupportedCompositionSnafu};
use crate::plan::{
    AccessAdapter, BoundsAdjust, ExecutionPlan, MaterializePass, PassKind, PlanEntry, Terminal, TerminalOp,
};

/// Whether the sequence under construction still contains placeholder
/// markers that have not been physically removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TombstoneState {
    Clean,
    Hazarded,
}

/// What the synthesizer does with one stage, as decided by the transition
/// table. `precompact` means a plain compaction pass is emitted first to
/// clear existing placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    /// Emit a compaction pass carrying the stage's own predicate;
    /// `fused` additionally drops existing placeholders in the same scan.
    EmitCompact { fused: bool },
    /// Emit a grouping pass (grouping and removal of non-representatives
    /// fused into one scan). Adjacency over placeholders is meaningless,
    /// so a hazarded input is compacted first.
    EmitGroup { precompact: bool },
    /// Fold into the pending bounds window. Index arithmetic over a
    /// sequence that still contains placeholders would count them as real
    /// elements, so a hazarded input is compacted first.
    EmitFold { precompact: bool },
    /// Fold into the pending access adapter. `wrapped` marks the adapter
    /// placeholder-aware: transforms apply to present values only and the
    /// hazard survives the stage.
    FoldAccess { precompact: bool, wrapped: bool },
}

/// The hazard-state transition table: total over state × classification.
pub fn transition(state: TombstoneState, meta: &HazardMetadata) -> (TombstoneState, StageAction) {
    use TombstoneState::*;
    let hazarded = state == Hazarded;

    if meta.grouping == GroupingClass::NonTrivial {
        (Clean, StageAction::EmitGroup { precompact: hazarded })
    } else if meta.removal == RemovalClass::NonTrivial {
        (Clean, StageAction::EmitCompact { fused: hazarded })
    } else if meta.folds_to_bounds() {
        (Clean, StageAction::EmitFold { precompact: hazarded })
    } else if meta.position_aware {
        // Position-aware pass-through: corrupted index semantics over
        // placeholders force a compaction, then the stage folds normally.
        (Clean, StageAction::FoldAccess { precompact: hazarded, wrapped: false })
    } else if hazarded {
        (Hazarded, StageAction::FoldAccess { precompact: false, wrapped: true })
    } else {
        (Clean, StageAction::FoldAccess { precompact: false, wrapped: false })
    }
}

/// Synthesis scratch state: the ordered stage list plus the tombstone
/// flag it starts from.
pub struct PipelineState<V> {
    stages: Vec<StageDescriptor<V>>,
    tombstoned: TombstoneState,
}

impl<V: 'static> PipelineState<V> {
    pub fn new(stages: Vec<StageDescriptor<V>>) -> Self {
        Self { stages, tombstoned: TombstoneState::Clean }
    }

    /// Start synthesis from an explicit hazard state. `Hazarded` models
    /// resuming over a suffix whose upstream left placeholders behind.
    pub fn with_tombstoned(mut self, state: TombstoneState) -> Self {
        self.tombstoned = state;
        self
    }

    pub fn stages(&self) -> &[StageDescriptor<V>] {
        &self.stages
    }

    pub fn tombstoned(&self) -> TombstoneState {
        self.tombstoned
    }

    /// Run the synthesis pass and append the terminal.
    #[tracing::instrument(skip_all, fields(stages = self.stages.len(), terminal = op.name()))]
    pub fn synthesize(self, op: TerminalOp<V>) -> Result<ExecutionPlan<V>> {
        ensure!(!self.stages.is_empty(), EmptyPipelineSnafu);
        for (index, stage) in self.stages.iter().enumerate() {
            ensure!(stage.kind.is_factory() == (index == 0), MisplacedFactorySnafu { index });
        }

        let mut synthesizer = Synthesizer::new(self.tombstoned);
        for stage in &self.stages {
            synthesizer.apply_stage(stage)?;
        }
        Ok(synthesizer.finish(op))
    }
}

/// Synthesize an execution plan for a stage list starting clean.
pub fn synthesize<V: 'static>(stages: Vec<StageDescriptor<V>>, op: TerminalOp<V>) -> Result<ExecutionPlan<V>> {
    PipelineState::new(stages).synthesize(op)
}

struct Synthesizer<V> {
    state: TombstoneState,
    entries: Vec<PlanEntry<V>>,
    /// Pending index-arithmetic window; identity means nothing pending.
    bounds: BoundsAdjust,
    /// Pending element-access chain, consumed by the next pass or the
    /// terminal.
    adapter: AccessAdapter<V>,
    /// A grouping pass has been emitted: items are span descriptors now.
    grouped: bool,
}

impl<V: 'static> Synthesizer<V> {
    fn new(state: TombstoneState) -> Self {
        Self {
            state,
            entries: Vec::new(),
            bounds: BoundsAdjust::identity(),
            adapter: AccessAdapter::empty(),
            grouped: false,
        }
    }

    /// True when items are groups: after a grouping pass, or once a
    /// fixed-width windowing is folded into the pending bounds.
    fn grouped_view(&self) -> bool {
        self.grouped || self.bounds.windowed
    }

    fn flush_bounds(&mut self) {
        if !self.bounds.is_identity() {
            self.entries.push(PlanEntry::Bounds(self.bounds));
            self.bounds = BoundsAdjust::identity();
        }
    }

    fn emit_pass(&mut self, kind: PassKind<V>) {
        self.flush_bounds();
        let adapter = std::mem::replace(&mut self.adapter, AccessAdapter::empty());
        self.entries.push(PlanEntry::Materialize(MaterializePass { kind, adapter }));
        self.state = TombstoneState::Clean;
    }

    /// Plain compaction of existing placeholders, no new predicate.
    fn precompact(&mut self) {
        self.adapter.mark_skip_missing();
        self.emit_pass(PassKind::Compact { keep: None });
    }

    fn apply_stage(&mut self, stage: &StageDescriptor<V>) -> Result<()> {
        let meta = stage.metadata();
        let (next, action) = transition(self.state, &meta);
        debug!(stage = %stage, ?action, "synthesize stage");

        let precompact = matches!(
            action,
            StageAction::EmitGroup { precompact: true }
                | StageAction::EmitFold { precompact: true }
                | StageAction::FoldAccess { precompact: true, .. }
        );

        match stage.kind {
            StageKind::Source => {}

            StageKind::Map => {
                ensure!(
                    !self.grouped_view(),
                    UnsupportedCompositionSnafu { kind: stage.kind, context: "grouped sequence" }
                );
                let f = stage.params.value().context(MalformedStageSnafu { kind: stage.kind })?.clone();
                if matches!(action, StageAction::FoldAccess { wrapped: true, .. }) {
                    self.adapter.mark_skip_missing();
                }
                self.adapter.push_value(f);
            }

            StageKind::Filter => {
                ensure!(
                    !self.grouped_view(),
                    UnsupportedCompositionSnafu { kind: stage.kind, context: "grouped sequence" }
                );
                let keep = stage.params.keep().context(MalformedStageSnafu { kind: stage.kind })?.clone();
                if matches!(action, StageAction::EmitCompact { fused: true }) {
                    self.adapter.mark_skip_missing();
                }
                self.emit_pass(PassKind::Compact { keep: Some(keep) });
            }

            StageKind::ChunkBy => {
                ensure!(
                    !self.grouped_view(),
                    UnsupportedCompositionSnafu { kind: stage.kind, context: "grouped sequence (nested grouping)" }
                );
                let boundary = stage.params.boundary().context(MalformedStageSnafu { kind: stage.kind })?.clone();
                if precompact {
                    self.precompact();
                }
                self.emit_pass(PassKind::CompactAndGroup { boundary });
                self.grouped = true;
            }

            StageKind::Skip | StageKind::Take | StageKind::StepBy => {
                let count = stage.params.count().context(MalformedStageSnafu { kind: stage.kind })?;
                if precompact {
                    self.precompact();
                }
                match stage.kind {
                    StageKind::Skip => {
                        self.adapter.remap_skip(count);
                        self.bounds.fold_skip(count);
                    }
                    StageKind::Take => self.bounds.fold_take(count),
                    StageKind::StepBy => {
                        self.adapter.remap_step_by(count);
                        self.bounds.fold_step_by(count);
                    }
                    _ => unreachable!(),
                }
            }

            StageKind::Chunks => {
                ensure!(
                    !self.grouped_view(),
                    UnsupportedCompositionSnafu { kind: stage.kind, context: "grouped sequence (nested grouping)" }
                );
                // A positional fold under a windowing would need a
                // group-level index mapping that has no closed form here.
                ensure!(
                    !self.adapter.has_positional(),
                    UnsupportedCompositionSnafu { kind: stage.kind, context: "pending position-aware access" }
                );
                let width = stage.params.width().context(MalformedStageSnafu { kind: stage.kind })?;
                if precompact {
                    self.precompact();
                }
                self.bounds.fold_chunks(width);
            }

            StageKind::Enumerate | StageKind::ZipWith => {
                ensure!(
                    !self.grouped_view(),
                    UnsupportedCompositionSnafu { kind: stage.kind, context: "grouped sequence" }
                );
                let (f, limit) = stage.params.positional().context(MalformedStageSnafu { kind: stage.kind })?;
                let f = f.clone();
                if precompact {
                    self.precompact();
                }
                if let Some(limit) = limit {
                    self.bounds.fold_take(limit);
                }
                self.adapter.push_positional(f);
            }
        }

        self.state = next;
        Ok(())
    }

    fn finish(mut self, op: TerminalOp<V>) -> ExecutionPlan<V> {
        self.flush_bounds();
        let mut adapter = std::mem::replace(&mut self.adapter, AccessAdapter::empty());
        if self.state == TombstoneState::Hazarded {
            adapter.mark_skip_missing();
        }
        debug!(entries = self.entries.len(), "synthesis complete");
        ExecutionPlan { entries: self.entries, terminal: Terminal { op, adapter } }
    }
}
