//! Microphone envelope and the two VU meter renderings.
//!
//! A burst of samples gives a peak-to-peak envelope; its ratio to the calibrated baseline,
//! on a log scale, gives a small integer intensity that the meters display.

use libm::log10f;

use crate::animation::{LETTER_HUES, MAX_BRIGHTNESS};
use crate::calibration::Calibration;
use crate::geometry::{LETTERS, ROWS};
use crate::led_strip::{Hsv, SignFrame};

/// Samples per envelope measurement.
pub const SAMPLE_COUNT: usize = 32;

/// Upper bound of a raw analog reading.
pub const ANALOG_MAX: u16 = 1024;

/// Brightness of every letter before the basic meter draws its rows, and the floor of
/// the intensity meter.
pub const BASELINE_GLOW: u8 = 0x10;

/// Brightness of the four sub-steps within one meter row.
pub const BRIGHTNESS_GRADIENT: [u8; 4] = [
    MAX_BRIGHTNESS / 4,
    MAX_BRIGHTNESS / 2,
    MAX_BRIGHTNESS / 4 * 3,
    MAX_BRIGHTNESS,
];

/// Hue of each meter row, bottom first: green up to yellow, then red.
pub const COLOR_GRADIENT: [u8; 6] = [96, 96, 96, 96, 64, 0];

const LEVEL_TOLERANCE: f32 = 1e-4;

const STEPS_PER_ROW: usize = BRIGHTNESS_GRADIENT.len();
const INTENSITY_STEPS: u8 = 20;

/// A source of raw microphone samples in `0..=ANALOG_MAX`.
pub trait MicSource {
    /// Take one sample.
    fn read_sample(&mut self) -> u16;
}

impl<F: FnMut() -> u16> MicSource for F {
    fn read_sample(&mut self) -> u16 {
        self()
    }
}

/// How many discrete steps a meter can show.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, defmt::Format)]
pub enum MeterScale {
    /// Five rows of four sub-steps each.
    Basic,
    /// Twenty brightness steps.
    Intensity,
}

impl MeterScale {
    /// Largest intensity this meter shows.
    #[must_use]
    pub const fn max_step(self) -> u8 {
        match self {
            #[expect(clippy::cast_possible_truncation, reason = "5 rows x 4 steps")]
            Self::Basic => (ROWS.len() * STEPS_PER_ROW - 1) as u8,
            Self::Intensity => INTENSITY_STEPS,
        }
    }
}

/// Peak-to-peak amplitude over [`SAMPLE_COUNT`] samples, less the calibrated offset,
/// never below zero.
pub fn sample_envelope(mic: &mut impl MicSource, calibration: &Calibration) -> u16 {
    let mut min = ANALOG_MAX;
    let mut max = 0;
    for _ in 0..SAMPLE_COUNT {
        let sample = mic.read_sample();
        min = min.min(sample);
        max = max.max(sample);
    }
    let swing = i32::from(max.saturating_sub(min));
    let envelope = swing.saturating_sub(calibration.mic_offset()).max(0);
    u16::try_from(envelope).unwrap_or(u16::MAX)
}

/// `scaling * log10(envelope / baseline)`, truncated and clamped to the meter's range.
/// Silence (a zero envelope) and anything at or below the baseline give 0.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "level is within 0..max_step when cast"
)]
pub fn intensity_from_envelope(envelope: u16, calibration: &Calibration, scale: MeterScale) -> u8 {
    let ratio = f32::from(envelope) / calibration.baseline_level();
    let level = calibration.scaling_factor() * log10f(ratio);
    if !level.is_finite() || level <= 0.0 {
        return 0;
    }
    // Exact decades of the baseline land on whole steps despite float rounding.
    let level = level + LEVEL_TOLERANCE;
    let max_step = scale.max_step();
    if level >= f32::from(max_step) {
        return max_step;
    }
    level as u8
}

/// Letters glow dimly; then the bottom `intensity / 4` rows fill, with the next row at a
/// partial brightness.
pub fn render_basic_meter(frame: &mut SignFrame, intensity: u8) {
    for (letter, hue) in LETTERS.iter().zip(LETTER_HUES) {
        frame.set_all(letter.as_slice(), Hsv::new(hue, u8::MAX, BASELINE_GLOW));
    }
    let lit = usize::from(intensity.min(MeterScale::Basic.max_step()));
    for step in 0..lit {
        let row_index = step / STEPS_PER_ROW;
        let (Some(row), Some(&hue), Some(&brightness)) = (
            ROWS.get(row_index),
            COLOR_GRADIENT.get(row_index),
            BRIGHTNESS_GRADIENT.get(step % STEPS_PER_ROW),
        ) else {
            break;
        };
        frame.set_all(row.as_slice(), Hsv::new(hue, u8::MAX, brightness));
    }
}

/// All three letters at a brightness between [`BASELINE_GLOW`] and [`MAX_BRIGHTNESS`].
pub fn render_intensity_meter(frame: &mut SignFrame, intensity: u8) {
    let brightness = intensity_brightness(intensity);
    for (letter, hue) in LETTERS.iter().zip(LETTER_HUES) {
        frame.set_all(letter.as_slice(), Hsv::new(hue, u8::MAX, brightness));
    }
}

/// Brightness the intensity meter uses for `intensity`.
#[must_use]
pub fn intensity_brightness(intensity: u8) -> u8 {
    let step = u16::from(intensity.min(INTENSITY_STEPS));
    let span = u16::from(MAX_BRIGHTNESS - BASELINE_GLOW);
    let brightness = span * step / u16::from(INTENSITY_STEPS) + u16::from(BASELINE_GLOW);
    u8::try_from(brightness).unwrap_or(MAX_BRIGHTNESS)
}
