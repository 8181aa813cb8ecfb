#![allow(missing_docs)]
//! Host-level tests for HSV conversion, combo tables, and the power budget.

use sign_glow::geometry::PIXEL_COUNT;
use sign_glow::led_strip::{
    Current, Frame1d, Gamma, Hsv, MILLIAMPS_PER_LED, RGB8, SignFrame, colors,
    generate_combo_table, to_rgb_frame,
};

#[test]
fn black_and_white_convert_exactly() {
    assert_eq!(Hsv::BLACK.to_rgb8(), RGB8::new(0, 0, 0));
    assert_eq!(Hsv::new(123, 0, 255).to_rgb8(), colors::WHITE);
}

#[test]
fn hue_zero_is_red() {
    assert_eq!(Hsv::new(0, 255, 255).to_rgb8(), RGB8::new(255, 0, 0));
}

#[test]
fn green_hue_is_mostly_green() {
    let rgb = Hsv::new(96, 255, 255).to_rgb8();
    assert_eq!(rgb.g, 255);
    assert!(rgb.r < 64 && rgb.b < 128, "{rgb:?}");
}

#[test]
fn linear_full_budget_table_is_identity() {
    let table = generate_combo_table(Gamma::Linear, 255);
    for (index, &value) in table.iter().enumerate() {
        assert_eq!(usize::from(value), index);
    }
}

#[test]
fn gamma_table_darkens_midtones() {
    let table = generate_combo_table(Gamma::Gamma2_2, 255);
    assert_eq!(table[0], 0);
    assert_eq!(table[255], 255);
    assert!(table[128] < 128);
}

#[test]
fn sign_budget_limits_brightness() {
    let worst_case = MILLIAMPS_PER_LED * u32::try_from(PIXEL_COUNT).expect("small");
    assert_eq!(Current::Milliamps(1000).max_brightness(worst_case), 137);
    assert_eq!(Current::Milliamps(5000).max_brightness(worst_case), 255);
    assert_eq!(Current::Unlimited.max_brightness(worst_case), 255);
    assert_eq!(Current::default(), Current::Milliamps(1000));
}

#[test]
fn frame_set_ignores_out_of_range_pixels() {
    let mut frame = SignFrame::new();
    frame.set(PIXEL_COUNT, Hsv::new(1, 2, 3));
    assert_eq!(frame, SignFrame::new());

    frame.set_all(&[0, 30, 200], Hsv::new(0, 0, 255));
    assert_eq!(frame[0].val, 255);
    assert_eq!(frame[30].val, 255);
    assert_eq!(frame[15], Hsv::BLACK);
}

#[test]
fn rgb_frame_applies_combo_table() {
    let frame = Frame1d::<2>::filled(Hsv::new(0, 0, 255));
    let table = generate_combo_table(Gamma::Linear, 100);
    let rgb = to_rgb_frame(&frame, &table);
    assert_eq!(rgb, [RGB8::new(100, 100, 100); 2]);
}
