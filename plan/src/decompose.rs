//! Pipeline decomposition.
//!
//! Walks a composed pipeline outward-to-base and produces the ordered
//! stage list the synthesizer consumes, innermost (factory) first. The
//! walk is an iterative unwrap over an explicit list, not a recursion, so
//! composition depth is bounded only by memory and the list is directly
//! indexable.
//!
//! Decomposition always terminates and fails only when it meets a stage
//! outside the closed vocabulary: that pipeline cannot be reasoned about,
//! and the caller must evaluate it sequentially instead.

use tracing::trace;

use sluice_ir::{GroupedPipeline, Pipeline, StageDescriptor, StageKind, StageParams, StageView};

use crate::error::{ClassificationSnafu, Result};

/// Decompose a value pipeline into its ordered stage list.
#[tracing::instrument(skip_all)]
pub fn decompose<V>(pipeline: &Pipeline<V>) -> Result<Vec<StageDescriptor<V>>> {
    from_views(pipeline.stages())
}

/// Decompose a grouped pipeline into its ordered stage list.
#[tracing::instrument(skip_all)]
pub fn decompose_grouped<V>(pipeline: &GroupedPipeline<V>) -> Result<Vec<StageDescriptor<V>>> {
    from_views(pipeline.stages())
}

fn from_views<V>(views: Vec<StageView<'_, V>>) -> Result<Vec<StageDescriptor<V>>> {
    let mut stages = Vec::with_capacity(views.len());

    for view in views {
        let descriptor = match view {
            StageView::Source { elems } => {
                StageDescriptor::new(StageKind::Source, StageParams::Source { elems: elems.clone() })
            }
            StageView::Map { f } => StageDescriptor::new(StageKind::Map, StageParams::Value { f: f.clone() }),
            StageView::Filter { keep } => {
                StageDescriptor::new(StageKind::Filter, StageParams::Keep { keep: keep.clone() })
            }
            StageView::Skip { count } => StageDescriptor::new(StageKind::Skip, StageParams::Count { count }),
            StageView::Take { count } => StageDescriptor::new(StageKind::Take, StageParams::Count { count }),
            StageView::StepBy { step } => StageDescriptor::new(StageKind::StepBy, StageParams::Count { count: step }),
            StageView::Chunks { width } => StageDescriptor::new(StageKind::Chunks, StageParams::Width { width }),
            StageView::ChunkBy { boundary } => {
                StageDescriptor::new(StageKind::ChunkBy, StageParams::Boundary { boundary: boundary.clone() })
            }
            StageView::Enumerate { f } => {
                StageDescriptor::new(StageKind::Enumerate, StageParams::Positional { f: f.clone(), limit: None })
            }
            StageView::ZipWith { f, len } => {
                StageDescriptor::new(StageKind::ZipWith, StageParams::Positional { f: f.clone(), limit: Some(len) })
            }
            StageView::Opaque { tag, .. } => return ClassificationSnafu { tag }.fail(),
        };

        trace!(stage = %descriptor, "decomposed");
        stages.push(descriptor);
    }

    Ok(stages)
}
