//! Reference plan interpreter.
//!
//! Walks a synthesized plan over an in-memory source: bounds entries
//! compose into the current view (no data movement), materialization
//! passes realize the view through their adapter and produce a new
//! concrete sequence, and the terminal consumes whatever representation
//! is left. The base sequence flows through zero or more passes until the
//! terminal reads the final form.

use rayon::prelude::*;
use snafu::ensure;
use tracing::debug;

use sluice_plan::{AccessAdapter, BoundsAdjust, ExecutionPlan, PassKind, PlanEntry, Terminal, TerminalOp};

use crate::error::{PassOverWindowedViewSnafu, Result, UnsupportedOnGroupsSnafu};
use crate::materialize::{GroupedSeq, compact, compact_and_group};

/// What a terminal operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOutcome<V> {
    /// `for_each` ran to completion.
    Unit,
    /// `reduce` folded the final sequence.
    Reduced(V),
    /// `collect` over a flat final sequence.
    Collected(Vec<V>),
    /// `collect` over a grouped final sequence.
    Grouped(Vec<Vec<V>>),
}

enum Repr<V> {
    Flat(Vec<V>),
    Grouped(GroupedSeq<V>),
}

/// Interpret a plan over a concrete source sequence.
#[tracing::instrument(skip_all, fields(entries = plan.entries.len(), source = source.len()))]
pub fn execute<V>(plan: &ExecutionPlan<V>, source: &[V]) -> Result<SequenceOutcome<V>>
where
    V: Clone + Send + Sync + 'static,
{
    let mut repr = Repr::Flat(source.to_vec());
    let mut bounds = BoundsAdjust::identity();

    for entry in &plan.entries {
        match entry {
            PlanEntry::Bounds(next) => {
                // Synthesized plans flush a single window per segment. A
                // hand-assembled plan may stack them; realize the pending
                // view before re-slicing rather than composing windows.
                if !bounds.is_identity() {
                    repr = Repr::Flat(realize_flat(&repr, &bounds, &AccessAdapter::empty())?);
                }
                bounds = *next;
                debug!(?bounds, "bounds adjusted");
            }
            PlanEntry::Materialize(pass) => {
                let input = realize_flat(&repr, &bounds, &pass.adapter)?;
                debug!(mode = ?pass.mode(), input = input.len(), "materialize");
                repr = match &pass.kind {
                    PassKind::Compact { keep: Some(keep) } => Repr::Flat(compact(&input, |v| keep.eval(v))),
                    // A plain representation has no placeholders left to
                    // drop; pure compaction is the identity on it.
                    PassKind::Compact { keep: None } => Repr::Flat(input),
                    PassKind::CompactAndGroup { boundary } => {
                        Repr::Grouped(compact_and_group(&input, |a, b| boundary.eval(a, b)))
                    }
                };
                bounds = BoundsAdjust::identity();
            }
        }
    }

    run_terminal(repr, bounds, &plan.terminal)
}

/// Realize the current view as a flat element vector, reading through the
/// adapter (the evaluate phase of a pass, data-parallel per element).
fn realize_flat<V>(repr: &Repr<V>, bounds: &BoundsAdjust, adapter: &AccessAdapter<V>) -> Result<Vec<V>>
where
    V: Clone + Send + Sync,
{
    let Repr::Flat(elems) = repr else {
        return UnsupportedOnGroupsSnafu { operation: "materialize" }.fail();
    };
    ensure!(!bounds.windowed, PassOverWindowedViewSnafu);

    let count = bounds.item_count(elems.len());
    Ok((0..count)
        .into_par_iter()
        .map(|i| adapter.apply(i, elems[bounds.element_index(i, 0)].clone()))
        .collect())
}

fn run_terminal<V>(repr: Repr<V>, bounds: BoundsAdjust, terminal: &Terminal<V>) -> Result<SequenceOutcome<V>>
where
    V: Clone + Send + Sync,
{
    match repr {
        Repr::Flat(elems) if !bounds.windowed => {
            let count = bounds.item_count(elems.len());
            let view =
                (0..count).map(|i| terminal.adapter.apply(i, elems[bounds.element_index(i, 0)].clone()));
            match &terminal.op {
                TerminalOp::ForEach(visitor) => {
                    for value in view {
                        visitor.visit(&value);
                    }
                    Ok(SequenceOutcome::Unit)
                }
                TerminalOp::Reduce { init, combine } => {
                    Ok(SequenceOutcome::Reduced(view.fold(init.clone(), |acc, v| combine.apply(acc, v))))
                }
                TerminalOp::Collect => Ok(SequenceOutcome::Collected(view.collect())),
            }
        }

        // Windowed bounds: the final sequence is grouped by index
        // arithmetic alone. Positional access has no group-level meaning.
        Repr::Flat(elems) => {
            ensure!(
                !terminal.adapter.has_positional(),
                UnsupportedOnGroupsSnafu { operation: "positionally transform" }
            );
            let count = bounds.item_count(elems.len());
            let groups = (0..count).map(|i| {
                (0..bounds.item_width_at(i, elems.len()))
                    .map(|k| terminal.adapter.apply(i, elems[bounds.element_index(i, k)].clone()))
                    .collect::<Vec<_>>()
            });
            finish_groups(groups, &terminal.op)
        }

        Repr::Grouped(seq) => {
            ensure!(terminal.adapter.is_empty(), UnsupportedOnGroupsSnafu { operation: "transform" });
            ensure!(!bounds.windowed, UnsupportedOnGroupsSnafu { operation: "window" });
            let count = bounds.item_count(seq.len());
            let groups = (0..count).map(|i| seq.group(bounds.element_index(i, 0)).to_vec());
            finish_groups(groups, &terminal.op)
        }
    }
}

fn finish_groups<V>(
    groups: impl Iterator<Item = Vec<V>>,
    op: &TerminalOp<V>,
) -> Result<SequenceOutcome<V>> {
    match op {
        TerminalOp::ForEach(visitor) => {
            for group in groups {
                for value in &group {
                    visitor.visit(value);
                }
            }
            Ok(SequenceOutcome::Unit)
        }
        // Group descriptors are spans, not elements; folding them with an
        // element combine would be silently wrong.
        TerminalOp::Reduce { .. } => UnsupportedOnGroupsSnafu { operation: "reduce" }.fail(),
        TerminalOp::Collect => Ok(SequenceOutcome::Grouped(groups.collect())),
    }
}
