//! Oracle property tests: the bulk path (decompose → synthesize →
//! execute) must agree with the sequential evaluator on every pipeline
//! the builder can express.

use proptest::prelude::*;

use sluice_ir::test::property::generators::{PipelineRecipe, arb_flat_recipe, arb_recipe};
use sluice_ir::Combine;
use sluice_plan::TerminalOp;

use crate::executor::SequenceOutcome;
use crate::materialize::compact;
use crate::scan::{ScanConfig, exclusive_scan_with_config};
use crate::{run, sequential};

fn bulk_vs_sequential(recipe: &PipelineRecipe, op: TerminalOp<i64>) -> (SequenceOutcome<i64>, SequenceOutcome<i64>) {
    match recipe {
        PipelineRecipe::Flat { .. } => {
            let pipeline = recipe.build_flat().unwrap();
            let seq = sequential::evaluate(&pipeline, &op).unwrap();
            let bulk = run::evaluate(&pipeline, op).unwrap();
            (bulk, seq)
        }
        PipelineRecipe::Grouped { .. } => {
            let pipeline = recipe.build_grouped().unwrap();
            let seq = sequential::evaluate_grouped(&pipeline, &op).unwrap();
            let bulk = run::evaluate_grouped(&pipeline, op).unwrap();
            (bulk, seq)
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(384))]

    /// Collecting through the synthesized plan equals sequential
    /// evaluation, elementwise and in order.
    #[test]
    fn collect_agrees_with_sequential(recipe in arb_recipe()) {
        let (bulk, seq) = bulk_vs_sequential(&recipe, TerminalOp::Collect);
        prop_assert_eq!(bulk, seq, "bulk != sequential for {:?}", recipe);
    }

    /// Reduction over the final flat sequence agrees with sequential
    /// evaluation.
    #[test]
    fn reduce_agrees_with_sequential(recipe in arb_flat_recipe()) {
        let op = TerminalOp::Reduce { init: 0i64, combine: Combine::new(|a, b| a + b) };
        let (bulk, seq) = bulk_vs_sequential(&recipe, op);
        prop_assert_eq!(bulk, seq);
    }

    /// Compaction equals the filter oracle on arbitrary inputs.
    #[test]
    fn compact_agrees_with_filter(input in proptest::collection::vec(-100i64..100, 0..200), modulus in 2i64..7) {
        let keep = |v: &i64| v.rem_euclid(modulus) == 0;
        let expected: Vec<i64> = input.iter().copied().filter(keep).collect();
        prop_assert_eq!(compact(&input, keep), expected);
    }

    /// The blocked parallel scan equals the sequential scan for every
    /// chunking.
    #[test]
    fn scan_is_chunking_invariant(
        input in proptest::collection::vec(0usize..10, 0..300),
        chunk in 1usize..64,
    ) {
        let seq = exclusive_scan_with_config(&input, 0, |a, b| a + b, &ScanConfig { sequential: true, chunk });
        let par = exclusive_scan_with_config(&input, 0, |a, b| a + b, &ScanConfig { sequential: false, chunk });
        prop_assert_eq!(seq, par);
    }
}
