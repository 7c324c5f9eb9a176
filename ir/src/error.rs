use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A stage descriptor carried parameters of the wrong shape for its kind.
    #[snafu(display("stage parameter mismatch: expected {expected}, found {found}"))]
    ParamMismatch { expected: &'static str, found: &'static str },
}
