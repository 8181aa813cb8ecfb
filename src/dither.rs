//! A small logarithmic brightness table for smooth travelling gradients.
//!
//! The chase modes only have a handful of brightness levels to work with. A logarithmic
//! ramp looks smoother to the eye than a linear one, so the curve falls off slowly near
//! full brightness and quickly near the dim end.
//!
//! # Example
//!
//! ```rust
//! use sign_glow::dither::{DITHER_SIZE, compute_dither_curve};
//!
//! let curve = compute_dither_curve::<DITHER_SIZE>(100);
//! assert_eq!(curve.levels()[0], 96);
//! assert_eq!(curve.levels()[DITHER_SIZE - 1], 0);
//! // Advancing the offset shifts the gradient by one group.
//! assert_eq!(curve.brightness_at(3, 1), curve.brightness_at(2, 0));
//! ```

use libm::{floorf, log10f};

/// Number of brightness levels used by the chase modes.
pub const DITHER_SIZE: usize = 12;

/// Precomputed, non-increasing brightness levels. Index 0 is the brightest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DitherCurve<const N: usize> {
    levels: [u8; N],
}

impl<const N: usize> DitherCurve<N> {
    /// The brightness levels, brightest first.
    #[must_use]
    pub const fn levels(&self) -> &[u8; N] {
        &self.levels
    }

    /// Brightness for the group at `group_index` when the gradient has advanced by
    /// `offset` frames.
    ///
    /// Incrementing `offset` moves the whole gradient one group towards higher indices,
    /// wrapping every `N` groups.
    #[must_use]
    pub fn brightness_at(&self, group_index: usize, offset: usize) -> u8 {
        let position = N - group_index % N + offset % N;
        self.levels.get(position % N).copied().unwrap_or(0)
    }
}

/// Compute the `N`-level curve `floor(max * log10(N - i) / log10(N + 1))`.
///
/// Level 0 is the brightest, just under `max_brightness`; the last level is dark.
#[must_use]
pub fn compute_dither_curve<const N: usize>(max_brightness: u8) -> DitherCurve<N> {
    const { assert!(N > 0, "dither curve needs at least one level") };
    #[expect(clippy::cast_precision_loss, reason = "N is a small table size")]
    let denominator = log10f((N + 1) as f32);
    let max = f32::from(max_brightness);
    let mut levels = [0u8; N];
    for (index, level) in levels.iter_mut().enumerate() {
        #[expect(clippy::cast_precision_loss, reason = "N is a small table size")]
        let remaining = (N - index) as f32;
        let value = floorf(max * (log10f(remaining) / denominator)).clamp(0.0, max);
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "clamped to 0..=max_brightness above"
        )]
        let value = value as u8;
        *level = value;
    }
    DitherCurve { levels }
}
