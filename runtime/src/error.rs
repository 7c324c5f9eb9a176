use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// The terminal or an adapter asked for something a grouped sequence
    /// cannot provide (group descriptors are spans, not elements).
    #[snafu(display("cannot {operation} a grouped sequence"))]
    UnsupportedOnGroups { operation: &'static str },

    /// A materialization pass reached a windowed view. Synthesized plans
    /// never do this; a hand-assembled plan that does is rejected rather
    /// than flattened silently.
    #[snafu(display("materialization pass over a windowed view"))]
    PassOverWindowedView,

    /// Plan synthesis failed while driving a pipeline end to end.
    #[snafu(display("plan synthesis failed"))]
    Plan { source: sluice_plan::Error },
}
