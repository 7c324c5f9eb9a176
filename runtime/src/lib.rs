//! Reference execution substrate for Sluice execution plans.
//!
//! The planner only emits plans; this crate interprets them:
//!
//! - [`scan`] - blocked parallel exclusive scan, the primitive every
//!   materialization pass is built on
//! - [`materialize`] - scan-based stream compaction and grouping
//! - [`executor`] - walks a plan's entries over an in-memory source and
//!   applies the terminal operation
//! - [`sequential`] - non-bulk, stage-by-stage fallback evaluation of the
//!   original pipeline (the only path that can run stages outside the
//!   closed vocabulary)
//! - [`run`] - thin glue: decompose, synthesize, execute, falling back to
//!   sequential evaluation when classification fails
//!
//! Each materialization pass runs three data-parallel phases (evaluate,
//! scan, scatter) with a barrier between them; per-element work within a
//! phase is independent and each output slot has exactly one writer.

pub mod error;
pub mod executor;
pub mod materialize;
pub mod run;
pub mod scan;
pub mod sequential;

#[cfg(test)]
pub mod test;

pub use error::{Error, Result};
pub use executor::{SequenceOutcome, execute};
pub use materialize::{GroupSpan, GroupedSeq, Slot, compact, compact_and_group, compact_slots};
pub use run::{evaluate, evaluate_grouped};
pub use scan::{ScanConfig, exclusive_scan_with};
