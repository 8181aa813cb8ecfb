#![allow(missing_docs)]
//! Host-level tests for the dither curve.

use sign_glow::dither::{DITHER_SIZE, compute_dither_curve};

#[test]
fn first_level_is_the_brightest() {
    let curve = compute_dither_curve::<DITHER_SIZE>(100);
    let brightest = curve.levels().iter().copied().max();
    assert_eq!(brightest, Some(curve.levels()[0]));
    assert_eq!(curve.levels()[0], 96);
}

#[test]
fn curve_matches_the_logarithmic_table() {
    let curve = compute_dither_curve::<DITHER_SIZE>(0x64);
    assert_eq!(curve.levels(), &[96, 93, 89, 85, 81, 75, 69, 62, 54, 42, 27, 0]);
}

#[test]
fn curve_is_non_increasing_and_ends_dark() {
    let curve = compute_dither_curve::<DITHER_SIZE>(100);
    for pair in curve.levels().windows(2) {
        assert!(pair[0] >= pair[1], "{:?}", curve.levels());
    }
    assert_eq!(curve.levels()[DITHER_SIZE - 1], 0);
}

#[test]
fn curve_is_deterministic() {
    assert_eq!(
        compute_dither_curve::<DITHER_SIZE>(0x64),
        compute_dither_curve::<DITHER_SIZE>(0x64)
    );
}

#[test]
fn lookups_stay_in_the_curve_for_any_index_and_offset() {
    let curve = compute_dither_curve::<DITHER_SIZE>(100);
    for group_index in [0, 1, 11, 12, 20, 1_000, usize::MAX] {
        for offset in [0, 1, 11, 12, 99, usize::MAX] {
            let brightness = curve.brightness_at(group_index, offset);
            assert!(curve.levels().contains(&brightness));
        }
    }
}

#[test]
fn offset_moves_gradient_one_group_per_step() {
    let curve = compute_dither_curve::<DITHER_SIZE>(100);
    for offset in 0..30 {
        for group_index in 0..20 {
            assert_eq!(
                curve.brightness_at(group_index + 1, offset + 1),
                curve.brightness_at(group_index, offset)
            );
        }
    }
    // Group 0 at offset 0 is the brightest.
    assert_eq!(curve.brightness_at(0, 0), 96);
    assert_eq!(curve.brightness_at(0, DITHER_SIZE), 96);
    assert_eq!(curve.brightness_at(1, 0), 0);
}
