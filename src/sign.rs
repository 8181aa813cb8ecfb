//! The sign controller: one poll cycle of the main loop, with the hardware at arm's length.
//!
//! [`Sign`] owns the animation engine, the calibration, and the mode selection. The
//! caller reads the button and potentiometer, hands them in as [`PollInputs`], and
//! flushes [`Sign::frame`] to the strip whenever [`PollOutcome::rendered`] is set.
//!
//! # Example
//!
//! ```rust
//! use embassy_time::Instant;
//! use sign_glow::animation::Mode;
//! use sign_glow::eeprom::RamEeprom;
//! use sign_glow::sign::{PollInputs, Sign};
//!
//! let mut eeprom = RamEeprom::new();
//! let mut sign = Sign::load(&mut eeprom, 1)?;
//! let mut mic = || 512_u16;
//!
//! let inputs = PollInputs { advance: true, raw_control: 0, now: Instant::from_millis(0) };
//! let outcome = sign.poll(inputs, &mut mic, &mut eeprom)?;
//! assert!(outcome.mode_changed);
//! assert_eq!(sign.mode(), Mode::Solid);
//! assert!(outcome.rendered);
//! # Ok::<(), sign_glow::Error>(())
//! ```

use embassy_time::{Duration, Instant};

use crate::Result;
use crate::animation::{AnimationEngine, Mode, clamp_to_u8, map_range};
use crate::audio::{self, ANALOG_MAX, MicSource};
use crate::button::BUTTON_DEBOUNCE_DELAY;
use crate::calibration::{Calibration, CalibrationField, ModeSelector};
use crate::console::{self, ConsoleIo};
use crate::eeprom::Eeprom;
use crate::led_strip::{Current, Gamma, SignFrame};

// ============================================================================
// Configuration
// ============================================================================

/// Compile-time settings for the sign hardware.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SignConfig {
    /// Gamma applied when flushing to the strip.
    pub gamma: Gamma,
    /// Power budget for the whole strip.
    pub max_current: Current,
    /// Debounce window of the mode button.
    pub debounce: Duration,
}

impl SignConfig {
    /// Linear gamma, a 1 A budget, and a 100 ms debounce.
    pub const DEFAULT: Self = Self {
        gamma: Gamma::Linear,
        max_current: Current::Milliamps(1000),
        debounce: BUTTON_DEBOUNCE_DELAY,
    };
}

impl Default for SignConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ============================================================================
// Poll cycle
// ============================================================================

/// Inputs sampled by the caller for one poll cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollInputs {
    /// A debounced press edge of the mode button.
    pub advance: bool,
    /// Potentiometer reading in `0..=ANALOG_MAX`.
    pub raw_control: u16,
    /// When the inputs were sampled.
    pub now: Instant,
}

/// What one poll cycle did.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PollOutcome {
    /// The mode advanced this cycle.
    pub mode_changed: bool,
    /// The frame was redrawn and should be flushed.
    pub rendered: bool,
    /// The microphone reading, for the meter modes.
    pub meter: Option<MeterReading>,
}

/// One envelope measurement and the intensity derived from it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MeterReading {
    /// Peak-to-peak amplitude less the offset.
    pub envelope: u16,
    /// Meter step shown.
    pub intensity: u8,
}

/// Animation state plus the persisted settings it depends on.
pub struct Sign {
    engine: AnimationEngine,
    calibration: Calibration,
    selector: ModeSelector,
}

impl Sign {
    /// Assemble a sign from already loaded settings. `seed` drives the random mode.
    #[must_use]
    pub fn new(calibration: Calibration, selector: ModeSelector, seed: u64) -> Self {
        Self {
            engine: AnimationEngine::new(seed),
            calibration,
            selector,
        }
    }

    /// Load the calibration and the selected mode from storage.
    ///
    /// # Errors
    ///
    /// Returns the storage error if a read fails.
    pub fn load(eeprom: &mut impl Eeprom, seed: u64) -> Result<Self> {
        let calibration = Calibration::load(eeprom)?;
        let selector = ModeSelector::load(eeprom)?;
        Ok(Self::new(calibration, selector, seed))
    }

    /// The selected mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.selector.mode()
    }

    /// The calibration in effect.
    #[must_use]
    pub const fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// The pixel buffer as last rendered.
    #[must_use]
    pub const fn frame(&self) -> &SignFrame {
        self.engine.frame()
    }

    /// The animation engine, for inspecting per-mode state.
    #[must_use]
    pub const fn engine(&self) -> &AnimationEngine {
        &self.engine
    }

    /// Run one poll cycle: advance the mode on a button edge, then render the selected
    /// mode.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the new mode cannot be stored. The mode still
    /// advances and the next cycle renders it.
    pub fn poll(
        &mut self,
        inputs: PollInputs,
        mic: &mut impl MicSource,
        eeprom: &mut impl Eeprom,
    ) -> Result<PollOutcome> {
        let mut outcome = PollOutcome::default();
        if inputs.advance {
            self.selector.advance(eeprom)?;
            outcome.mode_changed = true;
        }

        let control = control_from_raw(inputs.raw_control);
        let calibration = &self.calibration;
        let meter = &mut outcome.meter;
        outcome.rendered = self.engine.render(self.selector.mode(), control, inputs.now, |scale| {
            let envelope = audio::sample_envelope(mic, calibration);
            let intensity = audio::intensity_from_envelope(envelope, calibration, scale);
            *meter = Some(MeterReading {
                envelope,
                intensity,
            });
            intensity
        });
        Ok(outcome)
    }

    /// Serve the calibration console if a byte is waiting.
    ///
    /// # Errors
    ///
    /// See [`console::service`].
    pub fn service_console(
        &mut self,
        io: &mut impl ConsoleIo,
        eeprom: &mut impl Eeprom,
    ) -> Result<Option<CalibrationField>> {
        console::service(io, &mut self.calibration, eeprom)
    }
}

/// Rescale a raw potentiometer reading (`0..=ANALOG_MAX`) to the `0..=255` control value.
///
/// ```rust
/// use sign_glow::sign::control_from_raw;
///
/// assert_eq!(control_from_raw(0), 0);
/// assert_eq!(control_from_raw(1023), 254);
/// assert_eq!(control_from_raw(1024), 255);
/// ```
#[must_use]
pub fn control_from_raw(raw: u16) -> u8 {
    clamp_to_u8(map_range(
        i32::from(raw),
        0,
        i32::from(ANALOG_MAX),
        0,
        i32::from(u8::MAX),
    ))
}
