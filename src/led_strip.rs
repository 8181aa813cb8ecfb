//! The sign's pixel buffer and the WS2812 strip it is flushed to.
//!
//! Rendering happens in HSV: every mode thinks in hue, saturation, and brightness, and
//! the conversion to RGB (plus gamma and power-budget scaling) happens once per flush.
//!
//! # Example: Fill a Frame
//!
//! ```rust
//! use sign_glow::led_strip::{Frame1d, Gamma, Current, Hsv, generate_combo_table, to_rgb_frame};
//!
//! let mut frame = Frame1d::<4>::new();
//! frame.set(1, Hsv::new(0, 0, 255)); // white
//! frame.set(9, Hsv::new(0, 0, 255)); // past the end: ignored
//!
//! let combo_table = generate_combo_table(Gamma::Linear, Current::Unlimited.max_brightness(240));
//! let rgb = to_rgb_frame(&frame, &combo_table);
//! assert_eq!(rgb[1].r, 255);
//! assert_eq!(rgb[0].r, 0);
//! ```

/// Predefined RGB color constants from the `smart_leds` crate.
#[doc(inline)]
pub use smart_leds::colors;

/// RGB color type sent to the strip.
pub use smart_leds::RGB8;

use core::ops::{Deref, DerefMut};
use smart_leds::hsv::hsv2rgb;

use crate::geometry::PIXEL_COUNT;

// ============================================================================
// HSV Color
// ============================================================================

/// One pixel in the cylindrical hue/saturation/brightness model, each channel `0..=255`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Hsv {
    /// Hue around the color wheel (0 red, 64 yellow, 96 green, 160 blue).
    pub hue: u8,
    /// Saturation; 0 is white.
    pub sat: u8,
    /// Brightness ("value"); 0 is off.
    pub val: u8,
}

impl Hsv {
    /// Off.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a color from hue, saturation, and brightness.
    #[must_use]
    pub const fn new(hue: u8, sat: u8, val: u8) -> Self {
        Self { hue, sat, val }
    }

    /// Convert to [`RGB8`] using the `smart_leds` spectrum conversion.
    #[must_use]
    pub fn to_rgb8(self) -> RGB8 {
        hsv2rgb(smart_leds::hsv::Hsv {
            hue: self.hue,
            sat: self.sat,
            val: self.val,
        })
    }
}

// ============================================================================
// Frame1d
// ============================================================================

/// [`Hsv`] pixel data for an `N`-pixel strip, in strip order.
///
/// Frames deref to `[Hsv; N]`. Use [`set`](Self::set) when the index comes from a table,
/// so an out-of-range index is dropped instead of panicking.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Frame1d<const N: usize>(pub [Hsv; N]);

/// The frame for the whole sign.
pub type SignFrame = Frame1d<PIXEL_COUNT>;

impl<const N: usize> Frame1d<N> {
    /// Create a new blank (all black) frame.
    #[must_use]
    pub const fn new() -> Self {
        Self([Hsv::BLACK; N])
    }

    /// Create a frame filled with a single color.
    #[must_use]
    pub const fn filled(color: Hsv) -> Self {
        Self([color; N])
    }

    /// Set one pixel. Indices past the end are ignored.
    pub fn set(&mut self, pixel: usize, color: Hsv) {
        if let Some(slot) = self.0.get_mut(pixel) {
            *slot = color;
        }
    }

    /// Set every pixel listed in `pixels` to `color`.
    pub fn set_all(&mut self, pixels: &[u8], color: Hsv) {
        for &pixel in pixels {
            self.set(usize::from(pixel), color);
        }
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Hsv) {
        self.0 = [color; N];
    }
}

impl<const N: usize> Deref for Frame1d<N> {
    type Target = [Hsv; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> DerefMut for Frame1d<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const N: usize> Default for Frame1d<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Gamma Correction
// ============================================================================

/// Gamma correction mode for the strip.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Gamma {
    /// Linear gamma (no correction). The dither curve is already logarithmic, so the
    /// sign uses this by default.
    #[default]
    Linear,
    /// Standard gamma 2.2 correction for perceived brightness.
    Gamma2_2,
}

/// Gamma 2.2 lookup table for 8-bit values.
/// Pre-computed to avoid floating point math: corrected = (value/255)^2.2 * 255
const GAMMA_2_2_TABLE: [u8; 256] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2,
    3, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 8, 8, 8, 9, 9, 9, 10, 10, 11, 11,
    11, 12, 12, 13, 13, 13, 14, 14, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 21, 22, 22, 23,
    23, 24, 25, 25, 26, 26, 27, 28, 28, 29, 30, 30, 31, 32, 33, 33, 34, 35, 35, 36, 37, 38, 39, 39,
    40, 41, 42, 43, 43, 44, 45, 46, 47, 48, 49, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61,
    62, 63, 64, 65, 66, 67, 68, 69, 70, 71, 73, 74, 75, 76, 77, 78, 79, 81, 82, 83, 84, 85, 87, 88,
    89, 90, 91, 93, 94, 95, 97, 98, 99, 100, 102, 103, 105, 106, 107, 109, 110, 111, 113, 114, 116,
    117, 119, 120, 121, 123, 124, 126, 127, 129, 130, 132, 133, 135, 137, 138, 140, 141, 143, 145,
    146, 148, 149, 151, 153, 154, 156, 158, 159, 161, 163, 165, 166, 168, 170, 172, 173, 175, 177,
    179, 181, 182, 184, 186, 188, 190, 192, 194, 196, 197, 199, 201, 203, 205, 207, 209, 211, 213,
    215, 217, 219, 221, 223, 225, 227, 229, 231, 234, 236, 238, 240, 242, 244, 246, 248, 251, 253,
    255,
];

/// Combine gamma correction and brightness scaling into one lookup table, so that
/// `combo_table[channel]` is the value written to the strip.
#[must_use]
pub const fn generate_combo_table(gamma: Gamma, max_brightness: u8) -> [u8; 256] {
    let mut result = [0u8; 256];
    let mut index = 0;
    while index < 256 {
        let corrected = match gamma {
            Gamma::Linear => index as u16,
            Gamma::Gamma2_2 => GAMMA_2_2_TABLE[index] as u16,
        };
        // (value * brightness) / 255 never exceeds 255
        result[index] = ((corrected * max_brightness as u16) / 255) as u8;
        index += 1;
    }
    result
}

/// Convert a frame to corrected RGB, ready for the wire.
#[must_use]
pub fn to_rgb_frame<const N: usize>(frame: &Frame1d<N>, combo_table: &[u8; 256]) -> [RGB8; N] {
    let correct = |channel: u8| combo_table.get(usize::from(channel)).copied().unwrap_or(0);
    frame.0.map(|color| {
        let rgb = color.to_rgb8();
        RGB8::new(correct(rgb.r), correct(rgb.g), correct(rgb.b))
    })
}

// ============================================================================
// Power budget
// ============================================================================

/// Worst-case draw of one WS2812 at full white, in milliamps.
pub const MILLIAMPS_PER_LED: u32 = 60;

/// Current budget for the strip.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Current {
    /// Limit brightness so that all LEDs at full white stay within this many milliamps.
    Milliamps(u16),
    /// No limit; brightness stays at 100%.
    Unlimited,
}

impl Default for Current {
    fn default() -> Self {
        Self::Milliamps(1000)
    }
}

impl Current {
    /// Maximum channel value that keeps `worst_case_ma` within the budget.
    ///
    /// Returns 255 (full brightness) for [`Unlimited`](Self::Unlimited).
    #[must_use]
    pub const fn max_brightness(self, worst_case_ma: u32) -> u8 {
        assert!(worst_case_ma > 0, "worst_case_ma must be positive");
        match self {
            Self::Milliamps(ma) => {
                let scale = (ma as u32 * 255) / worst_case_ma;
                if scale > 255 { 255 } else { scale as u8 }
            }
            Self::Unlimited => 255,
        }
    }
}

// ============================================================================
// Device strip
// ============================================================================

#[cfg(not(feature = "host"))]
pub use device::LedStrip;

#[cfg(not(feature = "host"))]
mod device {
    use embassy_rp::Peri;
    use embassy_rp::dma::Channel;
    use embassy_rp::pio::{Common, Instance, PioPin, StateMachine};
    use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};

    use super::{Current, Frame1d, Gamma, MILLIAMPS_PER_LED, generate_combo_table, to_rgb_frame};

    /// A WS2812 strip on one PIO state machine, written synchronously from the poll loop.
    pub struct LedStrip<'d, PIO: Instance, const SM: usize, const N: usize> {
        driver: PioWs2812<'d, PIO, SM, N>,
        combo_table: [u8; 256],
    }

    impl<'d, PIO: Instance, const SM: usize, const N: usize> LedStrip<'d, PIO, SM, N> {
        /// Load the WS2812 program and bind the strip to `pin`.
        pub fn new(
            common: &mut Common<'d, PIO>,
            state_machine: StateMachine<'d, PIO, SM>,
            dma: Peri<'d, impl Channel>,
            pin: Peri<'d, impl PioPin>,
            gamma: Gamma,
            max_current: Current,
        ) -> Self {
            let program = PioWs2812Program::new(common);
            let driver = PioWs2812::new(common, state_machine, dma, pin, &program);
            #[expect(clippy::cast_possible_truncation, reason = "strip lengths are small")]
            let worst_case_ma = MILLIAMPS_PER_LED * N as u32;
            let max_brightness = max_current.max_brightness(worst_case_ma);
            defmt::info!(
                "LedStrip: {} LEDs, max brightness {}",
                N,
                max_brightness
            );
            Self {
                driver,
                combo_table: generate_combo_table(gamma, max_brightness),
            }
        }

        /// Convert, correct, and send a whole frame.
        pub async fn write_frame(&mut self, frame: &Frame1d<N>) {
            let rgb = to_rgb_frame(frame, &self.combo_table);
            self.driver.write(&rgb).await;
        }
    }
}
