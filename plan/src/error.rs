use snafu::Snafu;

use sluice_ir::StageKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// The pipeline contains a stage outside the closed vocabulary. Not
    /// retried; the caller is expected to fall back to sequential,
    /// one-element-at-a-time evaluation of the original pipeline.
    #[snafu(display("stage `{tag}` is not in the adaptor vocabulary; bulk rewriting is impossible"))]
    Classification { tag: String },

    /// A stage combination the synthesizer has no rule for. Cannot arise
    /// from builder-made pipelines; a hand-assembled stage list that
    /// violates the grouping discipline gets this instead of a plan that
    /// would read through corrupted positions.
    #[snafu(display("no synthesis rule for {kind} over a {context}"))]
    UnsupportedComposition { kind: StageKind, context: &'static str },

    /// The stage list was empty.
    #[snafu(display("stage list is empty: a pipeline starts with a factory"))]
    EmptyPipeline,

    /// A factory appeared anywhere but first, or the first stage was not
    /// a factory.
    #[snafu(display("factory misplaced at stage index {index}"))]
    MisplacedFactory { index: usize },

    /// A stage descriptor carried parameters of the wrong shape for its
    /// kind.
    #[snafu(display("malformed {kind} stage"))]
    MalformedStage { kind: StageKind, source: sluice_ir::Error },
}
