//! The composed pipeline value.
//!
//! A pipeline is an owned chain of adaptor nodes over a single factory.
//! The rewriter only ever asks three things of it: each node's kind tag,
//! its captured parameters, and its immediate base. These are exposed as an
//! innermost-first list of [`StageView`]s built by iterative unwrapping.
//!
//! Grouping adaptors change the element type from values to groups, so
//! [`Pipeline::chunks`] and [`Pipeline::chunk_by`] hand back a
//! [`GroupedPipeline`] that only offers group-level slicing. Compositions
//! the synthesizer has no rule for are therefore unrepresentable through
//! this API; they can only be produced by hand-assembling descriptor
//! lists.

use std::sync::Arc;

use crate::fns::{Boundary, OpaqueApply, Positional, Predicate, Transform};

enum Node<V> {
    Source { elems: Arc<[V]> },
    Map { f: Transform<V>, base: Box<Node<V>> },
    Filter { keep: Predicate<V>, base: Box<Node<V>> },
    Skip { count: usize, base: Box<Node<V>> },
    Take { count: usize, base: Box<Node<V>> },
    StepBy { step: usize, base: Box<Node<V>> },
    Chunks { width: usize, base: Box<Node<V>> },
    ChunkBy { boundary: Boundary<V>, base: Box<Node<V>> },
    Enumerate { f: Positional<V>, base: Box<Node<V>> },
    ZipWith { f: Positional<V>, len: usize, base: Box<Node<V>> },
    Opaque { tag: String, apply: OpaqueApply<V>, base: Box<Node<V>> },
}

impl<V> Node<V> {
    fn base(&self) -> Option<&Node<V>> {
        match self {
            Node::Source { .. } => None,
            Node::Map { base, .. }
            | Node::Filter { base, .. }
            | Node::Skip { base, .. }
            | Node::Take { base, .. }
            | Node::StepBy { base, .. }
            | Node::Chunks { base, .. }
            | Node::ChunkBy { base, .. }
            | Node::Enumerate { base, .. }
            | Node::ZipWith { base, .. }
            | Node::Opaque { base, .. } => Some(base),
        }
    }

    fn view(&self) -> StageView<'_, V> {
        match self {
            Node::Source { elems } => StageView::Source { elems },
            Node::Map { f, .. } => StageView::Map { f },
            Node::Filter { keep, .. } => StageView::Filter { keep },
            Node::Skip { count, .. } => StageView::Skip { count: *count },
            Node::Take { count, .. } => StageView::Take { count: *count },
            Node::StepBy { step, .. } => StageView::StepBy { step: *step },
            Node::Chunks { width, .. } => StageView::Chunks { width: *width },
            Node::ChunkBy { boundary, .. } => StageView::ChunkBy { boundary },
            Node::Enumerate { f, .. } => StageView::Enumerate { f },
            Node::ZipWith { f, len, .. } => StageView::ZipWith { f, len: *len },
            Node::Opaque { tag, apply, .. } => StageView::Opaque { tag: tag.as_str(), apply },
        }
    }

    /// Innermost-first stage views, built by iterative unwrapping.
    fn stages(&self) -> Vec<StageView<'_, V>> {
        let mut out = Vec::new();
        let mut node = self;
        loop {
            out.push(node.view());
            match node.base() {
                Some(base) => node = base,
                None => break,
            }
        }
        out.reverse();
        out
    }

    fn source(&self) -> &Arc<[V]> {
        let mut node = self;
        while let Some(base) = node.base() {
            node = base;
        }
        match node {
            Node::Source { elems } => elems,
            _ => unreachable!("factory is the only baseless node"),
        }
    }
}

/// Borrowed view of one pipeline stage: kind tag plus captured parameters.
pub enum StageView<'a, V> {
    Source { elems: &'a Arc<[V]> },
    Map { f: &'a Transform<V> },
    Filter { keep: &'a Predicate<V> },
    Skip { count: usize },
    Take { count: usize },
    StepBy { step: usize },
    Chunks { width: usize },
    ChunkBy { boundary: &'a Boundary<V> },
    Enumerate { f: &'a Positional<V> },
    ZipWith { f: &'a Positional<V>, len: usize },
    /// A stage outside the closed vocabulary. Unclassifiable; only the
    /// sequential fallback can evaluate it, through its captured closure.
    Opaque { tag: &'a str, apply: &'a OpaqueApply<V> },
}

/// A composed pipeline whose elements are plain values.
pub struct Pipeline<V> {
    node: Node<V>,
}

impl<V> Pipeline<V> {
    /// Factory over a concrete buffer.
    pub fn from_vec(elems: Vec<V>) -> Self {
        Self { node: Node::Source { elems: elems.into() } }
    }

    /// Factory over a generated sequence of `len` elements.
    pub fn generate(len: usize, f: impl Fn(usize) -> V) -> Self {
        Self { node: Node::Source { elems: (0..len).map(f).collect() } }
    }

    /// Element-wise value transform.
    pub fn map(self, f: impl Fn(V) -> V + Send + Sync + 'static) -> Self {
        Self { node: Node::Map { f: Transform::new(f), base: Box::new(self.node) } }
    }

    /// Keep elements satisfying the predicate.
    pub fn filter(self, keep: impl Fn(&V) -> bool + Send + Sync + 'static) -> Self {
        Self { node: Node::Filter { keep: Predicate::new(keep), base: Box::new(self.node) } }
    }

    /// Drop the first `count` elements.
    pub fn skip(self, count: usize) -> Self {
        Self { node: Node::Skip { count, base: Box::new(self.node) } }
    }

    /// Keep at most `count` elements.
    pub fn take(self, count: usize) -> Self {
        Self { node: Node::Take { count, base: Box::new(self.node) } }
    }

    /// Keep every `step`-th element, starting from the first.
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero, matching `Iterator::step_by`.
    pub fn step_by(self, step: usize) -> Self {
        assert!(step > 0, "step_by requires a non-zero step");
        Self { node: Node::StepBy { step, base: Box::new(self.node) } }
    }

    /// Index-reading value transform: `f` receives each element's position
    /// in this stage's input view.
    pub fn enumerate(self, f: impl Fn(usize, V) -> V + Send + Sync + 'static) -> Self {
        Self { node: Node::Enumerate { f: Positional::new(f), base: Box::new(self.node) } }
    }

    /// Combine with a second sequence by position, truncating to the
    /// shorter side. The second base is captured opaquely; the rewriter
    /// treats the whole stage as one position-aware unit.
    pub fn zip_with(self, other: Vec<V>, combine: impl Fn(V, V) -> V + Send + Sync + 'static) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        let len = other.len();
        let f = Positional::new(move |i, v| combine(v, other[i].clone()));
        Self { node: Node::ZipWith { f, len, base: Box::new(self.node) } }
    }

    /// Fixed-width windows. The element type becomes a group.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub fn chunks(self, width: usize) -> GroupedPipeline<V> {
        assert!(width > 0, "chunks requires a non-zero width");
        GroupedPipeline { node: Node::Chunks { width, base: Box::new(self.node) } }
    }

    /// Predicate-delimited groups: `boundary(prev, next)` returning true
    /// starts a new group at `next`. The element type becomes a group.
    pub fn chunk_by(self, boundary: impl Fn(&V, &V) -> bool + Send + Sync + 'static) -> GroupedPipeline<V> {
        GroupedPipeline { node: Node::ChunkBy { boundary: Boundary::new(boundary), base: Box::new(self.node) } }
    }

    /// Attach a custom stage outside the closed vocabulary. The rewriter
    /// cannot classify it; callers are expected to fall back to sequential
    /// evaluation, which runs `apply` on the materialized input.
    pub fn opaque(self, tag: impl Into<String>, apply: impl Fn(Vec<V>) -> Vec<V> + Send + Sync + 'static) -> Self {
        Self {
            node: Node::Opaque { tag: tag.into(), apply: OpaqueApply::new(apply), base: Box::new(self.node) },
        }
    }

    /// Innermost-first stage views (the factory is always first).
    pub fn stages(&self) -> Vec<StageView<'_, V>> {
        self.node.stages()
    }

    /// The factory's element buffer.
    pub fn source(&self) -> &Arc<[V]> {
        self.node.source()
    }
}

/// A composed pipeline whose elements are groups of values.
///
/// Produced by [`Pipeline::chunks`] and [`Pipeline::chunk_by`]. Only
/// group-level slicing remains available: per-value stages over groups
/// have no meaning in the rewriter's single-value model.
pub struct GroupedPipeline<V> {
    node: Node<V>,
}

impl<V> GroupedPipeline<V> {
    /// Drop the first `count` groups.
    pub fn skip(self, count: usize) -> Self {
        Self { node: Node::Skip { count, base: Box::new(self.node) } }
    }

    /// Keep at most `count` groups.
    pub fn take(self, count: usize) -> Self {
        Self { node: Node::Take { count, base: Box::new(self.node) } }
    }

    /// Keep every `step`-th group.
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero.
    pub fn step_by(self, step: usize) -> Self {
        assert!(step > 0, "step_by requires a non-zero step");
        Self { node: Node::StepBy { step, base: Box::new(self.node) } }
    }

    /// Innermost-first stage views (the factory is always first).
    pub fn stages(&self) -> Vec<StageView<'_, V>> {
        self.node.stages()
    }

    /// The factory's element buffer.
    pub fn source(&self) -> &Arc<[V]> {
        self.node.source()
    }
}
