//! Stage kinds, captured parameters, and stage descriptors.
//!
//! A decomposed pipeline is an ordered list of [`StageDescriptor`]s. Each
//! descriptor pairs a kind from the closed vocabulary with the parameters
//! captured at pipeline construction; the hazard registry classifies the
//! kind, the parameters are only ever re-evaluated at execution time.

use std::fmt;
use std::sync::Arc;

use crate::error::{ParamMismatchSnafu, Result};
use crate::fns::{Boundary, Positional, Predicate, Transform};
use crate::registry::HazardMetadata;

/// The closed adaptor/factory vocabulary.
///
/// This is the fixed instruction set the rewriter reasons over. Every
/// variant has a registry row; adding a variant forces every exhaustive
/// match in the decomposer and synthesizer to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StageKind {
    /// Factory: a concrete element buffer. Always the first stage.
    Source,
    /// Element-wise value transform.
    Map,
    /// Per-element predicate filter.
    Filter,
    /// Drop the first `count` elements.
    Skip,
    /// Keep at most `count` elements.
    Take,
    /// Keep every `step`-th element.
    StepBy,
    /// Fixed-width windows.
    Chunks,
    /// Runtime-predicate group boundaries over adjacent elements.
    ChunkBy,
    /// Index-reading value transform.
    Enumerate,
    /// Pairwise combination with a second sequence, captured opaquely.
    ZipWith,
}

impl StageKind {
    /// Stable lowercase name, used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Map => "map",
            Self::Filter => "filter",
            Self::Skip => "skip",
            Self::Take => "take",
            Self::StepBy => "step_by",
            Self::Chunks => "chunks",
            Self::ChunkBy => "chunk_by",
            Self::Enumerate => "enumerate",
            Self::ZipWith => "zip_with",
        }
    }

    /// Factories have no base; everything else has exactly one.
    pub fn is_factory(&self) -> bool {
        matches!(self, Self::Source)
    }

    /// Hazard metadata for this kind (registry lookup).
    pub fn metadata(&self) -> HazardMetadata {
        HazardMetadata::of(*self)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Captured parameters for one stage.
///
/// Callables are `Arc`-shared with the pipeline they were captured from;
/// constants are copied. Accessors return an error instead of panicking so
/// a malformed hand-assembled descriptor surfaces as a typed failure.
#[derive(Clone)]
pub enum StageParams<V> {
    /// Factory element buffer.
    Source { elems: Arc<[V]> },
    /// `Skip`/`Take`/`StepBy` count.
    Count { count: usize },
    /// `Chunks` window width.
    Width { width: usize },
    /// `Filter` keep predicate.
    Keep { keep: Predicate<V> },
    /// `ChunkBy` boundary predicate.
    Boundary { boundary: Boundary<V> },
    /// `Map` value transform.
    Value { f: Transform<V> },
    /// `Enumerate`/`ZipWith` positional transform. `limit` bounds the
    /// output length when the captured second base is shorter than the
    /// input (zip truncation); `None` means unbounded.
    Positional { f: Positional<V>, limit: Option<usize> },
}

impl<V> StageParams<V> {
    /// Get the name of this parameter variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Source { .. } => "Source",
            Self::Count { .. } => "Count",
            Self::Width { .. } => "Width",
            Self::Keep { .. } => "Keep",
            Self::Boundary { .. } => "Boundary",
            Self::Value { .. } => "Value",
            Self::Positional { .. } => "Positional",
        }
    }

    /// Extract the factory element buffer.
    pub fn source(&self) -> Result<&Arc<[V]>> {
        match self {
            Self::Source { elems } => Ok(elems),
            _ => ParamMismatchSnafu { expected: "Source", found: self.type_name() }.fail(),
        }
    }

    /// Extract a count constant.
    pub fn count(&self) -> Result<usize> {
        match self {
            Self::Count { count } => Ok(*count),
            _ => ParamMismatchSnafu { expected: "Count", found: self.type_name() }.fail(),
        }
    }

    /// Extract a window width constant.
    pub fn width(&self) -> Result<usize> {
        match self {
            Self::Width { width } => Ok(*width),
            _ => ParamMismatchSnafu { expected: "Width", found: self.type_name() }.fail(),
        }
    }

    /// Extract a keep predicate.
    pub fn keep(&self) -> Result<&Predicate<V>> {
        match self {
            Self::Keep { keep } => Ok(keep),
            _ => ParamMismatchSnafu { expected: "Keep", found: self.type_name() }.fail(),
        }
    }

    /// Extract a group-boundary predicate.
    pub fn boundary(&self) -> Result<&Boundary<V>> {
        match self {
            Self::Boundary { boundary } => Ok(boundary),
            _ => ParamMismatchSnafu { expected: "Boundary", found: self.type_name() }.fail(),
        }
    }

    /// Extract a value transform.
    pub fn value(&self) -> Result<&Transform<V>> {
        match self {
            Self::Value { f } => Ok(f),
            _ => ParamMismatchSnafu { expected: "Value", found: self.type_name() }.fail(),
        }
    }

    /// Extract a positional transform and its optional length limit.
    pub fn positional(&self) -> Result<(&Positional<V>, Option<usize>)> {
        match self {
            Self::Positional { f, limit } => Ok((f, *limit)),
            _ => ParamMismatchSnafu { expected: "Positional", found: self.type_name() }.fail(),
        }
    }
}

impl<V> fmt::Debug for StageParams<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source { elems } => f.debug_struct("Source").field("len", &elems.len()).finish(),
            Self::Count { count } => f.debug_struct("Count").field("count", count).finish(),
            Self::Width { width } => f.debug_struct("Width").field("width", width).finish(),
            Self::Keep { .. } => f.write_str("Keep(..)"),
            Self::Boundary { .. } => f.write_str("Boundary(..)"),
            Self::Value { .. } => f.write_str("Value(..)"),
            Self::Positional { limit, .. } => f.debug_struct("Positional").field("limit", limit).finish(),
        }
    }
}

/// One node of a decomposed pipeline: kind plus captured parameters.
#[derive(Debug, Clone)]
pub struct StageDescriptor<V> {
    pub kind: StageKind,
    pub params: StageParams<V>,
}

impl<V> StageDescriptor<V> {
    pub fn new(kind: StageKind, params: StageParams<V>) -> Self {
        Self { kind, params }
    }

    /// Hazard metadata for this stage's kind.
    pub fn metadata(&self) -> HazardMetadata {
        self.kind.metadata()
    }
}

impl<V> fmt::Display for StageDescriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            StageParams::Count { count } => write!(f, "{}({count})", self.kind),
            StageParams::Width { width } => write!(f, "{}({width})", self.kind),
            _ => write!(f, "{}", self.kind),
        }
    }
}
