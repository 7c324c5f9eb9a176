//! Callable wrappers for captured stage parameters.
//!
//! Every adaptor that needs to re-evaluate user code at execution time
//! captures it through one of these wrappers. They are `Arc`-shared so a
//! stage descriptor can be cloned out of a pipeline without cloning the
//! captured state, and immutable after capture.
//!
//! The wrappers deliberately expose only an `eval`/`apply` call surface:
//! the planner never introspects a callable, it only classifies the stage
//! kind that owns it.

use std::fmt;
use std::sync::Arc;

macro_rules! callable {
    ($(#[$doc:meta])* $name:ident, ($($arg:ident: $argty:ty),*) -> $out:ty, $method:ident) => {
        $(#[$doc])*
        pub struct $name<V>(Arc<dyn Fn($($argty),*) -> $out + Send + Sync>);

        impl<V> $name<V> {
            pub fn new(f: impl Fn($($argty),*) -> $out + Send + Sync + 'static) -> Self {
                Self(Arc::new(f))
            }

            #[inline]
            pub fn $method(&self, $($arg: $argty),*) -> $out {
                (self.0)($($arg),*)
            }
        }

        impl<V> Clone for $name<V> {
            fn clone(&self) -> Self {
                Self(Arc::clone(&self.0))
            }
        }

        impl<V> fmt::Debug for $name<V> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "(..)"))
            }
        }
    };
}

callable!(
    /// Per-element keep/drop predicate (non-trivial removal).
    Predicate, (value: &V) -> bool, eval
);

callable!(
    /// Element-wise value transform.
    Transform, (value: V) -> V, apply
);

callable!(
    /// Position-aware value transform: receives the element's index in the
    /// view the stage was applied to.
    Positional, (index: usize, value: V) -> V, apply
);

callable!(
    /// Group-boundary predicate over adjacent elements. Returns true when
    /// the right-hand element starts a new group.
    Boundary, (prev: &V, next: &V) -> bool, eval
);

callable!(
    /// Sequential application of a stage outside the closed vocabulary.
    ///
    /// Only the non-bulk fallback evaluator can run these; the rewriter
    /// reports them as unclassifiable.
    OpaqueApply, (input: Vec<V>) -> Vec<V>, apply
);

callable!(
    /// Terminal visitor for visit-all consumption.
    Visitor, (value: &V) -> (), visit
);

callable!(
    /// Associative terminal combine for reductions.
    Combine, (acc: V, value: V) -> V, apply
);
