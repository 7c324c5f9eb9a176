//! Unit tests for pipeline decomposition.

use sluice_ir::{Pipeline, StageKind};

use crate::decompose::{decompose, decompose_grouped};
use crate::error::Error;

#[test]
fn order_is_innermost_first() {
    let pipeline = Pipeline::generate(10, |i| i as i64).map(|v| v + 1).filter(|v| *v > 3).skip(2);

    let stages = decompose(&pipeline).unwrap();
    let kinds: Vec<_> = stages.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, [StageKind::Source, StageKind::Map, StageKind::Filter, StageKind::Skip]);
}

#[test]
fn factory_carries_the_buffer() {
    let pipeline = Pipeline::from_vec(vec![7i64, 8, 9]);
    let stages = decompose(&pipeline).unwrap();
    assert_eq!(stages[0].params.source().unwrap().as_ref(), &[7, 8, 9]);
}

#[test]
fn grouped_pipeline_decomposes() {
    let pipeline = Pipeline::generate(9, |i| i as i64).chunks(3).skip(1);
    let stages = decompose_grouped(&pipeline).unwrap();
    let kinds: Vec<_> = stages.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, [StageKind::Source, StageKind::Chunks, StageKind::Skip]);
    assert_eq!(stages[1].params.width().unwrap(), 3);
}

#[test]
fn zip_with_captures_truncation_limit() {
    let pipeline = Pipeline::generate(10, |i| i as i64).zip_with(vec![1, 2, 3], |a, b| a + b);
    let stages = decompose(&pipeline).unwrap();
    let (_, limit) = stages[1].params.positional().unwrap();
    assert_eq!(limit, Some(3));
}

#[test]
fn enumerate_has_no_limit() {
    let pipeline = Pipeline::generate(4, |i| i as i64).enumerate(|i, v| v + i as i64);
    let stages = decompose(&pipeline).unwrap();
    let (_, limit) = stages[1].params.positional().unwrap();
    assert_eq!(limit, None);
}

#[test]
fn opaque_stage_is_unclassifiable() {
    let pipeline = Pipeline::from_vec(vec![1i64, 2]).opaque("custom-shuffle", |v| v).map(|v| v + 1);

    let err = decompose(&pipeline).unwrap_err();
    assert_eq!(err, Error::Classification { tag: "custom-shuffle".into() });
}
