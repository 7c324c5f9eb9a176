//! Unit tests for the scan-based materializer.

use crate::materialize::{GroupSpan, Slot, compact, compact_and_group, compact_slots};

#[test]
fn compact_preserves_order() {
    let input: Vec<i64> = (0..10).collect();
    assert_eq!(compact(&input, |v| v % 2 == 0), [0, 2, 4, 6, 8]);
}

#[test]
fn compact_matches_the_filter_oracle() {
    let input: Vec<i64> = (0..100).map(|i| (i * 31 + 7) % 23).collect();
    let keep = |v: &i64| *v % 3 != 1;

    let expected: Vec<i64> = input.iter().copied().filter(keep).collect();
    assert_eq!(compact(&input, keep), expected);
}

#[test]
fn compact_keeps_nothing() {
    let input: Vec<i64> = (0..10).collect();
    assert!(compact(&input, |_| false).is_empty());
}

#[test]
fn compact_keeps_everything() {
    let input: Vec<i64> = (0..10).collect();
    assert_eq!(compact(&input, |_| true), input);
}

#[test]
fn compact_empty_input() {
    assert!(compact::<i64, _>(&[], |_| true).is_empty());
}

#[test]
fn compact_slots_drops_tombstones() {
    let slots = [Slot::Present(1i64), Slot::Missing, Slot::Present(3), Slot::Missing, Slot::Present(5)];
    assert_eq!(compact_slots(&slots), [1, 3, 5]);
}

#[test]
fn compact_slots_all_missing() {
    let slots: Vec<Slot<i64>> = vec![Slot::Missing; 4];
    assert!(compact_slots(&slots).is_empty());
}

#[test]
fn grouping_by_runs_of_equal_values() {
    let input = vec![1i64, 1, 2, 2, 2, 3];
    let grouped = compact_and_group(&input, |a, b| a != b);

    assert_eq!(grouped.spans, [GroupSpan { start: 0, end: 2 }, GroupSpan { start: 2, end: 5 }, GroupSpan { start: 5, end: 6 }]);
    let groups: Vec<Vec<i64>> = grouped.iter().map(<[i64]>::to_vec).collect();
    assert_eq!(groups, [vec![1, 1], vec![2, 2, 2], vec![3]]);
}

#[test]
fn spans_partition_the_input() {
    let input: Vec<i64> = (0..64).map(|i| (i * 13 + 5) % 7).collect();
    let grouped = compact_and_group(&input, |a, b| a > b);

    // No gaps, no overlaps, full cover of [0, n).
    let mut cursor = 0;
    for span in &grouped.spans {
        assert_eq!(span.start, cursor);
        assert!(span.end > span.start);
        cursor = span.end;
    }
    assert_eq!(cursor, input.len());
}

#[test]
fn span_boundaries_match_the_predicate() {
    let input: Vec<i64> = (0..64).map(|i| (i * 13 + 5) % 7).collect();
    let boundary = |a: &i64, b: &i64| a > b;
    let grouped = compact_and_group(&input, boundary);

    for pair in grouped.spans.windows(2) {
        // The first element of each later group starts it for a reason.
        assert!(boundary(&input[pair[1].start - 1], &input[pair[1].start]));
    }
    for span in &grouped.spans {
        for i in span.start + 1..span.end {
            assert!(!boundary(&input[i - 1], &input[i]));
        }
    }
}

#[test]
fn every_element_its_own_group() {
    let input = vec![1i64, 2, 3];
    let grouped = compact_and_group(&input, |_, _| true);
    assert_eq!(grouped.len(), 3);
    assert!(grouped.spans.iter().all(|s| s.len() == 1));
}

#[test]
fn one_group_when_no_boundaries() {
    let input = vec![1i64, 2, 3, 4];
    let grouped = compact_and_group(&input, |_, _| false);
    assert_eq!(grouped.spans, [GroupSpan { start: 0, end: 4 }]);
    assert_eq!(grouped.group(0), [1, 2, 3, 4]);
}

#[test]
fn grouping_empty_input() {
    let grouped = compact_and_group::<i64, _>(&[], |_, _| true);
    assert!(grouped.is_empty());
    assert!(grouped.elems.is_empty());
}

#[test]
fn grouping_single_element() {
    let grouped = compact_and_group(&[7i64], |_, _| true);
    assert_eq!(grouped.spans, [GroupSpan { start: 0, end: 1 }]);
}
