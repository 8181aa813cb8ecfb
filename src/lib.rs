//! Animated and audio-reactive lighting for a 31-pixel, three-letter sign on Pico 1 and 2.
//!
//! The sign is one WS2812 strip threaded behind three letters. The library splits into a
//! pure core that builds and tests on the host, and the device layers that talk to the
//! Pico peripherals.
//!
//! # Glossary
//!
//! - **Grouping:** a named partition of the pixel addresses (letter, row, column, forward
//!   or backward diagonal). See [`geometry`].
//! - **Dither curve:** a 12-step logarithmic brightness table used by the chase modes. See
//!   [`dither`].
//! - **Mode:** one of 12 mutually exclusive renderings, cycled by the select button. See
//!   [`animation::Mode`].
//! - **Envelope:** the peak-to-peak microphone amplitude over a 32 sample window.
//! - **Intensity:** the clamped logarithmic step count derived from the envelope. See
//!   [`audio`].
#![cfg_attr(not(feature = "host"), no_std)]
#![cfg_attr(not(feature = "host"), no_main)]

// Compile-time checks: exactly one board must be selected (unless testing with host feature)
#[cfg(all(not(any(feature = "pico1", feature = "pico2")), not(feature = "host")))]
compile_error!("Must enable exactly one board feature: 'pico1' or 'pico2'");

#[cfg(all(feature = "pico1", feature = "pico2"))]
compile_error!("Cannot enable both 'pico1' and 'pico2' features simultaneously");

// Compile-time check: the firmware targets the ARM cores (unless testing with host feature)
#[cfg(all(not(feature = "arm"), not(feature = "host")))]
compile_error!("Must enable the 'arm' architecture feature");

pub mod animation;
pub mod audio;
// Board glue requires embassy_rp and is excluded when testing on host
#[cfg(not(feature = "host"))]
pub mod board;
pub mod button;
pub mod calibration;
pub mod console;
pub mod dither;
pub mod eeprom;
mod error;
#[cfg(not(feature = "host"))]
pub mod flash_array;
pub mod geometry;
pub mod led_strip;
pub mod sign;
#[cfg(feature = "host")]
pub mod to_png;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
