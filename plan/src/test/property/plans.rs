//! Property tests over randomly built pipelines: every builder-made
//! pipeline synthesizes, the plan never reads through placeholders, and
//! the pass count is exactly the number of hazardous stages.

use proptest::prelude::*;

use sluice_ir::test::property::generators::{FlatStage, GroupStage, PipelineRecipe, arb_recipe};
use sluice_ir::{StageDescriptor, StageKind};

use crate::decompose::{decompose, decompose_grouped};
use crate::plan::{EntryKind, TerminalOp};
use crate::synthesize::{TombstoneState, synthesize};
use crate::test::helpers::placeholder_safe;

fn stages_of(recipe: &PipelineRecipe) -> Vec<StageDescriptor<i64>> {
    match recipe {
        PipelineRecipe::Flat { .. } => decompose(&recipe.build_flat().unwrap()).unwrap(),
        PipelineRecipe::Grouped { .. } => decompose_grouped(&recipe.build_grouped().unwrap()).unwrap(),
    }
}

/// Number of stages whose classification forces a materialization pass.
fn hazard_count(recipe: &PipelineRecipe) -> usize {
    let filters = |stages: &[FlatStage]| {
        stages.iter().filter(|s| matches!(s, FlatStage::FilterEven | FlatStage::FilterGt(_))).count()
    };
    match recipe {
        PipelineRecipe::Flat { stages, .. } => filters(stages),
        PipelineRecipe::Grouped { stages, group, .. } => {
            filters(stages) + usize::from(*group == GroupStage::ChunkByNeq)
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Builder-made pipelines always decompose and synthesize: the rule
    /// set is total over the registry's classification space.
    #[test]
    fn synthesis_is_total_over_builder_pipelines(recipe in arb_recipe()) {
        let stages = stages_of(&recipe);
        prop_assert!(stages[0].kind == StageKind::Source);
        let plan = synthesize(stages, TerminalOp::Collect);
        prop_assert!(plan.is_ok(), "synthesis failed: {:?} for {recipe:?}", plan.err());
    }

    /// No bounds entry or positional access ever sees a hazarded
    /// sequence without an intervening materialization pass.
    #[test]
    fn plans_never_read_through_placeholders(recipe in arb_recipe()) {
        let plan = synthesize(stages_of(&recipe), TerminalOp::Collect).unwrap();
        prop_assert!(placeholder_safe(&plan, TombstoneState::Clean));
    }

    /// Minimality: one pass per hazardous stage, never more. Each run of
    /// a hazardous stage plus its dependent followers collapses into the
    /// single pass emitted at the hazard.
    #[test]
    fn pass_count_matches_hazard_count(recipe in arb_recipe()) {
        let plan = synthesize(stages_of(&recipe), TerminalOp::Collect).unwrap();
        prop_assert_eq!(plan.pass_count(), hazard_count(&recipe));
    }

    /// Bounds entries only ever appear between passes, flushed: two
    /// adjacent bounds entries would mean a missed fold.
    #[test]
    fn bounds_entries_are_flushed_maximally(recipe in arb_recipe()) {
        let plan = synthesize(stages_of(&recipe), TerminalOp::Collect).unwrap();
        let kinds = plan.entry_kinds();
        for pair in kinds.windows(2) {
            prop_assert!(
                !(pair[0] == EntryKind::Bounds && pair[1] == EntryKind::Bounds),
                "adjacent bounds entries in {kinds:?}"
            );
        }
    }

    /// Synthesis is a pure function of the stage list: decomposing and
    /// synthesizing the same recipe twice yields the same plan shape.
    #[test]
    fn synthesis_is_deterministic(recipe in arb_recipe()) {
        let a = synthesize(stages_of(&recipe), TerminalOp::Collect).unwrap();
        let b = synthesize(stages_of(&recipe), TerminalOp::Collect).unwrap();
        prop_assert_eq!(a.entry_kinds(), b.entry_kinds());
    }
}
