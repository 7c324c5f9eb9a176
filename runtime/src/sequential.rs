//! Sequential fallback evaluation.
//!
//! Evaluates the original pipeline stage by stage, one element at a time,
//! with no bulk primitives. This is the path a caller takes when the
//! rewriter reports a classification failure: correctness over
//! performance. It is also the test oracle for the bulk path, and the
//! only evaluator that can run opaque stages.

use sluice_ir::{Boundary, GroupedPipeline, Pipeline, StageView};
use sluice_plan::TerminalOp;

use crate::error::{Result, UnsupportedOnGroupsSnafu};
use crate::executor::SequenceOutcome;

enum State<V> {
    Flat(Vec<V>),
    Groups(Vec<Vec<V>>),
}

/// Evaluate a value pipeline sequentially.
#[tracing::instrument(skip_all)]
pub fn evaluate<V: Clone>(pipeline: &Pipeline<V>, op: &TerminalOp<V>) -> Result<SequenceOutcome<V>> {
    finish(walk(pipeline.stages())?, op)
}

/// Evaluate a grouped pipeline sequentially.
#[tracing::instrument(skip_all)]
pub fn evaluate_grouped<V: Clone>(pipeline: &GroupedPipeline<V>, op: &TerminalOp<V>) -> Result<SequenceOutcome<V>> {
    finish(walk(pipeline.stages())?, op)
}

fn walk<V: Clone>(views: Vec<StageView<'_, V>>) -> Result<State<V>> {
    let mut state = State::Flat(Vec::new());
    for view in views {
        state = apply(state, view)?;
    }
    Ok(state)
}

fn apply<V: Clone>(state: State<V>, view: StageView<'_, V>) -> Result<State<V>> {
    use StageView::*;

    Ok(match (state, view) {
        (_, Source { elems }) => State::Flat(elems.to_vec()),

        (State::Flat(v), Map { f }) => State::Flat(v.into_iter().map(|x| f.apply(x)).collect()),
        (State::Flat(v), Filter { keep }) => State::Flat(v.into_iter().filter(|x| keep.eval(x)).collect()),
        (State::Flat(v), Enumerate { f }) => {
            State::Flat(v.into_iter().enumerate().map(|(i, x)| f.apply(i, x)).collect())
        }
        (State::Flat(v), ZipWith { f, len }) => {
            State::Flat(v.into_iter().take(len).enumerate().map(|(i, x)| f.apply(i, x)).collect())
        }
        (State::Flat(v), Chunks { width }) => State::Groups(v.chunks(width).map(<[V]>::to_vec).collect()),
        (State::Flat(v), ChunkBy { boundary }) => State::Groups(chunk_by(v, boundary)),
        (State::Flat(v), Opaque { apply, .. }) => State::Flat(apply.apply(v)),

        (State::Flat(v), Skip { count }) => State::Flat(v.into_iter().skip(count).collect()),
        (State::Flat(v), Take { count }) => State::Flat(v.into_iter().take(count).collect()),
        (State::Flat(v), StepBy { step }) => State::Flat(v.into_iter().step_by(step).collect()),
        (State::Groups(g), Skip { count }) => State::Groups(g.into_iter().skip(count).collect()),
        (State::Groups(g), Take { count }) => State::Groups(g.into_iter().take(count).collect()),
        (State::Groups(g), StepBy { step }) => State::Groups(g.into_iter().step_by(step).collect()),

        (State::Groups(_), _) => return UnsupportedOnGroupsSnafu { operation: "apply a value stage to" }.fail(),
    })
}

fn chunk_by<V: Clone>(values: Vec<V>, boundary: &Boundary<V>) -> Vec<Vec<V>> {
    let mut groups = Vec::new();
    let mut current: Vec<V> = Vec::new();
    for value in values {
        if let Some(last) = current.last()
            && boundary.eval(last, &value)
        {
            groups.push(std::mem::take(&mut current));
        }
        current.push(value);
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

fn finish<V: Clone>(state: State<V>, op: &TerminalOp<V>) -> Result<SequenceOutcome<V>> {
    match state {
        State::Flat(values) => match op {
            TerminalOp::ForEach(visitor) => {
                for value in &values {
                    visitor.visit(value);
                }
                Ok(SequenceOutcome::Unit)
            }
            TerminalOp::Reduce { init, combine } => {
                Ok(SequenceOutcome::Reduced(values.into_iter().fold(init.clone(), |acc, v| combine.apply(acc, v))))
            }
            TerminalOp::Collect => Ok(SequenceOutcome::Collected(values)),
        },
        State::Groups(groups) => match op {
            TerminalOp::ForEach(visitor) => {
                for group in &groups {
                    for value in group {
                        visitor.visit(value);
                    }
                }
                Ok(SequenceOutcome::Unit)
            }
            TerminalOp::Reduce { .. } => UnsupportedOnGroupsSnafu { operation: "reduce" }.fail(),
            TerminalOp::Collect => Ok(SequenceOutcome::Grouped(groups)),
        },
    }
}
