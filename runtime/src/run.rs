//! End-to-end driving: decompose, synthesize, execute.
//!
//! Classification failures are not errors to the caller: the original
//! pipeline is still evaluable, just not in bulk, so this glue falls back
//! to the sequential evaluator. Composition failures are defects and
//! propagate.

use snafu::ResultExt;
use tracing::warn;

use sluice_ir::{GroupedPipeline, Pipeline};
use sluice_plan::{TerminalOp, decompose, decompose_grouped, synthesize};

use crate::error::{PlanSnafu, Result};
use crate::executor::{self, SequenceOutcome};
use crate::sequential;

/// Evaluate a value pipeline: bulk when rewritable, sequential otherwise.
pub fn evaluate<V>(pipeline: &Pipeline<V>, op: TerminalOp<V>) -> Result<SequenceOutcome<V>>
where
    V: Clone + Send + Sync + 'static,
{
    let stages = match decompose(pipeline) {
        Ok(stages) => stages,
        Err(sluice_plan::Error::Classification { tag }) => {
            warn!(stage = %tag, "pipeline is not bulk-rewritable; evaluating sequentially");
            return sequential::evaluate(pipeline, &op);
        }
        Err(other) => return Err(other).context(PlanSnafu),
    };
    let plan = synthesize(stages, op).context(PlanSnafu)?;
    executor::execute(&plan, pipeline.source())
}

/// Evaluate a grouped pipeline: bulk when rewritable, sequential otherwise.
pub fn evaluate_grouped<V>(pipeline: &GroupedPipeline<V>, op: TerminalOp<V>) -> Result<SequenceOutcome<V>>
where
    V: Clone + Send + Sync + 'static,
{
    let stages = match decompose_grouped(pipeline) {
        Ok(stages) => stages,
        Err(sluice_plan::Error::Classification { tag }) => {
            warn!(stage = %tag, "pipeline is not bulk-rewritable; evaluating sequentially");
            return sequential::evaluate_grouped(pipeline, &op);
        }
        Err(other) => return Err(other).context(PlanSnafu),
    };
    let plan = synthesize(stages, op).context(PlanSnafu)?;
    executor::execute(&plan, pipeline.source())
}
