#![allow(missing_docs)]
//! Host-level tests for the microphone envelope and the VU meters.

use sign_glow::animation::MAX_BRIGHTNESS;
use sign_glow::audio::{
    BASELINE_GLOW, MeterScale, SAMPLE_COUNT, intensity_brightness, intensity_from_envelope,
    render_basic_meter, render_intensity_meter, sample_envelope,
};
use sign_glow::calibration::Calibration;
use sign_glow::geometry::{LETTERS, ROWS};
use sign_glow::led_strip::{Hsv, SignFrame};

/// A microphone that swings between `low` and `high`.
fn square_wave(low: u16, high: u16) -> impl FnMut() -> u16 {
    let mut count = 0_usize;
    move || {
        count += 1;
        if count % 2 == 0 { high } else { low }
    }
}

#[test]
fn envelope_is_peak_to_peak_less_offset() {
    let mut calibration = Calibration::default();
    assert_eq!(sample_envelope(&mut square_wave(500, 530), &calibration), 30);

    calibration.set_mic_offset(10);
    assert_eq!(sample_envelope(&mut square_wave(500, 530), &calibration), 20);

    calibration.set_mic_offset(100);
    assert_eq!(sample_envelope(&mut square_wave(500, 530), &calibration), 0);
}

#[test]
fn envelope_takes_exactly_one_window_of_samples() {
    let mut reads = 0;
    let mut mic = || {
        reads += 1;
        512_u16
    };
    assert_eq!(sample_envelope(&mut mic, &Calibration::default()), 0);
    assert_eq!(reads, SAMPLE_COUNT);
}

#[test]
fn intensity_is_zero_at_or_below_baseline() {
    let calibration = Calibration::default();
    for envelope in [0, 1, 2, 3] {
        assert_eq!(
            intensity_from_envelope(envelope, &calibration, MeterScale::Basic),
            0,
            "{envelope}"
        );
    }
}

#[test]
fn intensity_is_monotone_and_clamped() {
    let calibration = Calibration::default();
    for scale in [MeterScale::Basic, MeterScale::Intensity] {
        let mut previous = 0;
        for envelope in 0..=u16::MAX {
            let intensity = intensity_from_envelope(envelope, &calibration, scale);
            assert!(intensity >= previous, "{envelope}");
            assert!(intensity <= scale.max_step());
            previous = intensity;
        }
        assert_eq!(
            intensity_from_envelope(u16::MAX, &calibration, scale),
            scale.max_step()
        );
    }
}

#[test]
fn ten_times_baseline_reads_about_ten() {
    // scaling 10 * log10(31 / 3) = 10.14
    let calibration = Calibration::default();
    assert_eq!(intensity_from_envelope(31, &calibration, MeterScale::Basic), 10);
}

#[test]
fn ten_times_baseline_lights_two_rows_and_part_of_the_third() {
    let calibration = Calibration::default();
    let envelope = sample_envelope(&mut square_wave(500, 530), &calibration);
    assert_eq!(envelope, 30);
    let intensity = intensity_from_envelope(envelope, &calibration, MeterScale::Basic);
    assert_eq!(intensity, 10);

    let mut frame = SignFrame::new();
    render_basic_meter(&mut frame, intensity);
    for row in &ROWS[..2] {
        for &pixel in row.as_slice() {
            assert_eq!(frame[usize::from(pixel)].val, MAX_BRIGHTNESS);
        }
    }
    for &pixel in ROWS[2].as_slice() {
        assert_eq!(frame[usize::from(pixel)], Hsv::new(96, 255, MAX_BRIGHTNESS / 2));
    }
    for row in &ROWS[3..] {
        for &pixel in row.as_slice() {
            assert_eq!(frame[usize::from(pixel)].val, BASELINE_GLOW);
        }
    }
}

#[test]
fn meter_scales_have_expected_tops() {
    assert_eq!(MeterScale::Basic.max_step(), 19);
    assert_eq!(MeterScale::Intensity.max_step(), 20);
}

#[test]
fn basic_meter_intensity_ten_fills_two_rows_and_part_of_third() {
    let mut frame = SignFrame::new();
    render_basic_meter(&mut frame, 10);

    for row in &ROWS[..2] {
        for &pixel in row.as_slice() {
            assert_eq!(frame[usize::from(pixel)], Hsv::new(96, 255, MAX_BRIGHTNESS));
        }
    }
    for &pixel in ROWS[2].as_slice() {
        assert_eq!(frame[usize::from(pixel)].val, MAX_BRIGHTNESS / 2);
    }
    for row in &ROWS[3..] {
        for &pixel in row.as_slice() {
            assert_eq!(frame[usize::from(pixel)].val, BASELINE_GLOW);
        }
    }
}

#[test]
fn basic_meter_silence_leaves_letters_glowing() {
    let mut frame = SignFrame::filled(Hsv::new(0, 0, 255));
    render_basic_meter(&mut frame, 0);
    for &pixel in LETTERS[1].as_slice() {
        assert_eq!(frame[usize::from(pixel)], Hsv::new(160, 255, BASELINE_GLOW));
    }
    for &pixel in LETTERS[0].as_slice() {
        assert_eq!(frame[usize::from(pixel)], Hsv::new(96, 255, BASELINE_GLOW));
    }
}

#[test]
fn basic_meter_top_row_turns_yellow() {
    let mut frame = SignFrame::new();
    render_basic_meter(&mut frame, MeterScale::Basic.max_step());
    for &pixel in ROWS[4].as_slice() {
        assert_eq!(frame[usize::from(pixel)].hue, 64);
        assert_eq!(frame[usize::from(pixel)].val, MAX_BRIGHTNESS / 4 * 3);
    }
}

#[test]
fn intensity_meter_brightness_ramps_from_glow_to_max() {
    assert_eq!(intensity_brightness(0), BASELINE_GLOW);
    assert_eq!(intensity_brightness(10), 58);
    assert_eq!(intensity_brightness(20), MAX_BRIGHTNESS);
    assert_eq!(intensity_brightness(200), MAX_BRIGHTNESS);

    let mut frame = SignFrame::new();
    render_intensity_meter(&mut frame, 10);
    for &pixel in LETTERS[2].as_slice() {
        assert_eq!(frame[usize::from(pixel)], Hsv::new(96, 255, 58));
    }
}
