//! Unit tests for the bounds-window composition algebra.

use test_case::test_case;

use crate::plan::BoundsAdjust;

fn window(build: impl FnOnce(&mut BoundsAdjust)) -> BoundsAdjust {
    let mut bounds = BoundsAdjust::identity();
    build(&mut bounds);
    bounds
}

#[test]
fn identity_covers_everything() {
    let bounds = BoundsAdjust::identity();
    assert!(bounds.is_identity());
    assert!(!bounds.windowed);
    assert_eq!(bounds.item_count(10), 10);
    assert_eq!(bounds.element_index(7, 0), 7);
}

#[test_case(3, 10, 7; "skip three of ten")]
#[test_case(0, 10, 10; "skip nothing")]
#[test_case(12, 10, 0; "skip past the end")]
fn skip_counts(count: usize, len: usize, expected: usize) {
    let bounds = window(|b| b.fold_skip(count));
    assert_eq!(bounds.item_count(len), expected);
    if expected > 0 {
        assert_eq!(bounds.element_index(0, 0), count);
    }
}

#[test_case(1, 10, 10; "unit step")]
#[test_case(3, 10, 4; "stride three over ten")]
#[test_case(4, 9, 3; "stride four over nine")]
fn step_counts(step: usize, len: usize, expected: usize) {
    let bounds = window(|b| b.fold_step_by(step));
    assert_eq!(bounds.item_count(len), expected);
}

#[test]
fn skip_then_step() {
    let bounds = window(|b| {
        b.fold_skip(2);
        b.fold_step_by(3);
    });
    // Items at source indices 2, 5, 8.
    assert_eq!(bounds.item_count(10), 3);
    assert_eq!(bounds.element_index(2, 0), 8);
}

#[test]
fn take_then_skip_keeps_the_overlap() {
    let bounds = window(|b| {
        b.fold_take(5);
        b.fold_skip(2);
    });
    // First five elements, then drop two of them.
    assert_eq!(bounds.offset, 2);
    assert_eq!(bounds.limit, Some(3));
    assert_eq!(bounds.item_count(10), 3);
}

#[test]
fn skip_then_take() {
    let bounds = window(|b| {
        b.fold_skip(2);
        b.fold_take(5);
    });
    assert_eq!(bounds.item_count(10), 5);
    assert_eq!(bounds.element_index(0, 0), 2);
}

#[test]
fn take_then_step_rounds_up() {
    let bounds = window(|b| {
        b.fold_take(5);
        b.fold_step_by(2);
    });
    // Elements 0, 2, 4 of the first five.
    assert_eq!(bounds.limit, Some(3));
    assert_eq!(bounds.item_count(100), 3);
}

#[test]
fn chunks_windows_the_view() {
    let bounds = window(|b| b.fold_chunks(3));
    assert!(bounds.windowed);
    assert_eq!(bounds.item_count(10), 4);
    // Windows 3, 3, 3 and a partial trailing 1.
    assert_eq!(bounds.item_width_at(0, 10), 3);
    assert_eq!(bounds.item_width_at(3, 10), 1);
    assert_eq!(bounds.element_index(1, 2), 5);
}

#[test]
fn step_then_chunks_strides_inside_windows() {
    let bounds = window(|b| {
        b.fold_step_by(2);
        b.fold_chunks(3);
    });
    // Window 0 covers 0, 2, 4; window 1 covers 6, 8, 10.
    assert_eq!(bounds.element_index(0, 2), 4);
    assert_eq!(bounds.element_index(1, 0), 6);
    assert_eq!(bounds.item_count(20), 4);
}

#[test]
fn chunks_then_slicing_works_on_windows() {
    let bounds = window(|b| {
        b.fold_chunks(3);
        b.fold_skip(1);
        b.fold_take(2);
    });
    // Windows starting at 3 and 6.
    assert_eq!(bounds.item_count(10), 2);
    assert_eq!(bounds.element_index(0, 0), 3);
    assert_eq!(bounds.element_index(1, 0), 6);
}

#[test]
fn chunks_then_step_skips_windows() {
    let bounds = window(|b| {
        b.fold_chunks(2);
        b.fold_step_by(2);
    });
    // Windows at 0 and 4.
    assert_eq!(bounds.element_index(1, 0), 4);
    assert_eq!(bounds.item_count(8), 2);
}

#[test]
fn take_then_chunks_caps_the_last_window() {
    let bounds = window(|b| {
        b.fold_take(5);
        b.fold_chunks(2);
    });
    // First five elements, windowed: [0,1], [2,3], [4]. The cap keeps
    // element 5 out of the trailing window.
    assert_eq!(bounds.item_count(10), 3);
    assert_eq!(bounds.item_width_at(2, 10), 1);
}

#[test]
fn take_after_chunks_keeps_whole_windows() {
    let bounds = window(|b| {
        b.fold_chunks(2);
        b.fold_take(2);
    });
    assert_eq!(bounds.item_count(10), 2);
    assert_eq!(bounds.item_width_at(1, 10), 2);
}

#[test]
fn stepped_take_pins_the_grid_cap() {
    let bounds = window(|b| {
        b.fold_step_by(2);
        b.fold_take(3);
        b.fold_chunks(2);
    });
    // Stepped view 0, 2, 4; windows [0,2] and [4].
    assert_eq!(bounds.item_count(10), 2);
    assert_eq!(bounds.item_width_at(0, 10), 2);
    assert_eq!(bounds.item_width_at(1, 10), 1);
}

#[test]
fn take_zero_empties_the_view() {
    let bounds = window(|b| b.fold_take(0));
    assert_eq!(bounds.item_count(10), 0);
}
