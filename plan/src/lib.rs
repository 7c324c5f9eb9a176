//! Plan synthesis for the Sluice pipeline rewriter.
//!
//! This crate turns a composed adaptor pipeline into an execution plan a
//! bulk-execution substrate can interpret:
//!
//! - [`decompose`] - walk a pipeline outward-to-base into an ordered,
//!   innermost-first stage list
//! - [`synthesize`] - thread tombstone state through the stage list and
//!   emit bounds adjustments, materialization passes and one terminal
//! - [`plan`] - the execution-plan data model (bounds windows, passes,
//!   access adapters, terminals)
//!
//! Synthesis is single-threaded, allocation-light and pure per stage
//! list: the same list always yields the same plan, so callers may
//! memoize by [`PipelineShape`].

pub mod decompose;
pub mod error;
pub mod plan;
pub mod synthesize;

#[cfg(test)]
pub mod test;

pub use decompose::{decompose, decompose_grouped};
pub use error::{Error, Result};
pub use plan::{
    AccessAdapter, AccessStage, BoundsAdjust, EntryKind, ExecutionPlan, MaterializeMode, MaterializePass,
    PassKind, PipelineShape, PlanEntry, Terminal, TerminalOp,
};
pub use synthesize::{PipelineState, StageAction, TombstoneState, synthesize, transition};
