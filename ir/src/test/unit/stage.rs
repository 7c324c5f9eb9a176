//! Unit tests for stage descriptors and parameter accessors.

use crate::error::Error;
use crate::fns::{Predicate, Transform};
use crate::stage::{StageDescriptor, StageKind, StageParams};

#[test]
fn count_accessor() {
    let params: StageParams<i64> = StageParams::Count { count: 3 };
    assert_eq!(params.count().unwrap(), 3);
}

#[test]
fn accessor_mismatch_is_typed() {
    let params: StageParams<i64> = StageParams::Width { width: 2 };
    let err = params.count().unwrap_err();
    assert_eq!(err, Error::ParamMismatch { expected: "Count", found: "Width" });
}

#[test]
fn callable_accessors() {
    let keep: StageParams<i64> = StageParams::Keep { keep: Predicate::new(|v: &i64| *v % 2 == 0) };
    assert!(keep.keep().unwrap().eval(&4));
    assert!(!keep.keep().unwrap().eval(&5));
    assert!(keep.value().is_err());

    let value: StageParams<i64> = StageParams::Value { f: Transform::new(|v: i64| v + 1) };
    assert_eq!(value.value().unwrap().apply(41), 42);
}

#[test]
fn source_accessor() {
    let params: StageParams<i64> = StageParams::Source { elems: vec![1, 2, 3].into() };
    assert_eq!(params.source().unwrap().len(), 3);
    assert!(params.boundary().is_err());
}

#[test]
fn descriptor_display_includes_constants() {
    let skip = StageDescriptor::<i64>::new(StageKind::Skip, StageParams::Count { count: 3 });
    assert_eq!(skip.to_string(), "skip(3)");

    let chunks = StageDescriptor::<i64>::new(StageKind::Chunks, StageParams::Width { width: 4 });
    assert_eq!(chunks.to_string(), "chunks(4)");

    let map = StageDescriptor::<i64>::new(StageKind::Map, StageParams::Value { f: Transform::new(|v| v) });
    assert_eq!(map.to_string(), "map");
}

#[test]
fn params_debug_elides_callables() {
    let keep: StageParams<i64> = StageParams::Keep { keep: Predicate::new(|_: &i64| true) };
    assert_eq!(format!("{keep:?}"), "Keep(..)");

    let count: StageParams<i64> = StageParams::Count { count: 7 };
    assert_eq!(format!("{count:?}"), "Count { count: 7 }");
}
