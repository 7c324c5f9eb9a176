//! Static hazard registry for the closed stage vocabulary.
//!
//! Each stage kind is classified along three axes fixed at design time:
//! how it removes elements, how it groups them, and whether its output
//! depends on element positions. The classification is what makes
//! whole-pipeline rewriting decidable: the synthesizer's rule set is total
//! over this space, so any pipeline built from registered kinds gets a
//! plan.

use crate::stage::StageKind;

/// How a stage removes elements from its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemovalClass {
    /// The stage never drops elements.
    None,
    /// The surviving index set is a closed-form function of input length
    /// and static parameters (skip, take, step).
    Trivial,
    /// Survival requires evaluating a per-element predicate at runtime.
    NonTrivial,
}

/// How a stage groups elements of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupingClass {
    /// The stage does not group.
    None,
    /// Group boundaries are a pure function of position (fixed width).
    Trivial,
    /// Boundaries require comparing adjacent elements at runtime.
    NonTrivial,
}

/// Registry row: full hazard classification of one stage kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HazardMetadata {
    pub removal: RemovalClass,
    pub grouping: GroupingClass,
    /// True if the stage reads absolute or relative element positions, so
    /// it cannot run over a sequence still containing placeholder markers.
    pub position_aware: bool,
}

impl HazardMetadata {
    /// Registry lookup. Total over the closed vocabulary by construction;
    /// stages outside the vocabulary never reach this point (the
    /// decomposer rejects them first).
    pub const fn of(kind: StageKind) -> Self {
        use {GroupingClass as G, RemovalClass as R};
        match kind {
            StageKind::Source => Self::row(R::None, G::None, false),
            StageKind::Map => Self::row(R::None, G::None, false),
            StageKind::Filter => Self::row(R::NonTrivial, G::None, false),
            StageKind::Skip => Self::row(R::Trivial, G::None, false),
            StageKind::Take => Self::row(R::Trivial, G::None, false),
            StageKind::StepBy => Self::row(R::Trivial, G::None, false),
            StageKind::Chunks => Self::row(R::None, G::Trivial, false),
            StageKind::ChunkBy => Self::row(R::None, G::NonTrivial, false),
            StageKind::Enumerate => Self::row(R::None, G::None, true),
            // Zip truncates to the shorter side: a closed-form limit on the
            // output length, so trivial removal plus position awareness.
            StageKind::ZipWith => Self::row(R::Trivial, G::None, true),
        }
    }

    const fn row(removal: RemovalClass, grouping: GroupingClass, position_aware: bool) -> Self {
        Self { removal, grouping, position_aware }
    }

    /// True if the stage needs a materialization pass of its own
    /// (non-trivial removal or grouping).
    pub fn requires_materialization(&self) -> bool {
        self.removal == RemovalClass::NonTrivial || self.grouping == GroupingClass::NonTrivial
    }

    /// True if the stage folds into pure index arithmetic on a clean
    /// sequence (trivial removal or grouping).
    pub fn folds_to_bounds(&self) -> bool {
        !self.requires_materialization()
            && (self.removal == RemovalClass::Trivial || self.grouping == GroupingClass::Trivial)
    }

    /// True if the stage neither removes nor groups (pure element-wise,
    /// position-aware or not).
    pub fn is_elementwise(&self) -> bool {
        self.removal == RemovalClass::None && self.grouping == GroupingClass::None
    }

    /// True if the stage emits groups, trivially or not.
    pub fn groups(&self) -> bool {
        self.grouping != GroupingClass::None
    }
}
