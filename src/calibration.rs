//! Microphone calibration and the persisted mode selection.
//!
//! Both live in the [`Eeprom`] at fixed addresses:
//!
//! | key            | address | size | encoding          |
//! |----------------|---------|------|-------------------|
//! | mode index     | 0       | 1    | `u8`              |
//! | baseline level | 1       | 4    | `f32` little end. |
//! | scaling factor | 5       | 4    | `f32` little end. |
//! | mic offset     | 9       | 4    | `i32` little end. |
//!
//! Stored values pass through the same validating setters as console input, so erased
//! storage (all `0xFF`: a NaN float, an out-of-range offset and mode) boots with the
//! defaults.
//!
//! # Example
//!
//! ```rust
//! use sign_glow::calibration::{Calibration, CalibrationField};
//! use sign_glow::eeprom::RamEeprom;
//!
//! let mut eeprom = RamEeprom::new();
//! let mut calibration = Calibration::load(&mut eeprom)?;
//! assert_eq!(calibration.baseline_level(), 3.0);
//!
//! assert_eq!(calibration.set_baseline_level(7.0), 7.0);
//! assert_eq!(calibration.set_baseline_level(-5.0), 7.0); // rejected
//! calibration.persist(CalibrationField::BaselineLevel, &mut eeprom)?;
//!
//! assert_eq!(Calibration::load(&mut eeprom)?.baseline_level(), 7.0);
//! # Ok::<(), sign_glow::Error>(())
//! ```

use core::fmt;

use crate::Result;
use crate::animation::Mode;
use crate::eeprom::Eeprom;

/// Storage address of the mode index.
pub const MODE_ADDRESS: usize = 0;
/// Storage address of the baseline level.
pub const BASELINE_LEVEL_ADDRESS: usize = 1;
/// Storage address of the scaling factor.
pub const SCALING_FACTOR_ADDRESS: usize = 5;
/// Storage address of the microphone offset.
pub const MIC_OFFSET_ADDRESS: usize = 9;

/// Default envelope that reads as silence.
pub const DEFAULT_BASELINE_LEVEL: f32 = 3.0;
/// Default gain applied to the log-ratio.
pub const DEFAULT_SCALING_FACTOR: f32 = 10.0;
/// Default constant subtracted from each envelope.
pub const DEFAULT_MIC_OFFSET: i32 = 0;
/// Microphone offsets must stay below the analog range.
pub const MIC_OFFSET_LIMIT: i32 = 1024;

// ============================================================================
// Calibration
// ============================================================================

/// The three microphone calibration parameters. Only the setters mutate them, and the
/// setters leave the current value in place when given something invalid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    baseline_level: f32,
    scaling_factor: f32,
    mic_offset: i32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            baseline_level: DEFAULT_BASELINE_LEVEL,
            scaling_factor: DEFAULT_SCALING_FACTOR,
            mic_offset: DEFAULT_MIC_OFFSET,
        }
    }
}

impl Calibration {
    /// Read all three parameters from storage, keeping the default for any stored value
    /// that the setters reject.
    ///
    /// # Errors
    ///
    /// Returns the storage error if a read fails.
    pub fn load(eeprom: &mut impl Eeprom) -> Result<Self> {
        let mut calibration = Self::default();
        calibration.set_baseline_level(f32::from_le_bytes(read_word(
            eeprom,
            BASELINE_LEVEL_ADDRESS,
        )?));
        calibration.set_scaling_factor(f32::from_le_bytes(read_word(
            eeprom,
            SCALING_FACTOR_ADDRESS,
        )?));
        calibration.set_mic_offset(i32::from_le_bytes(read_word(eeprom, MIC_OFFSET_ADDRESS)?));
        Ok(calibration)
    }

    /// Envelope level that maps to intensity 0.
    #[must_use]
    pub const fn baseline_level(&self) -> f32 {
        self.baseline_level
    }

    /// Gain applied to `log10(envelope / baseline)`.
    #[must_use]
    pub const fn scaling_factor(&self) -> f32 {
        self.scaling_factor
    }

    /// Constant subtracted from every envelope.
    #[must_use]
    pub const fn mic_offset(&self) -> i32 {
        self.mic_offset
    }

    /// Accept a finite, positive baseline. Returns the value now in effect.
    pub fn set_baseline_level(&mut self, value: f32) -> f32 {
        if is_positive_finite(value) {
            self.baseline_level = value;
        }
        self.baseline_level
    }

    /// Accept a finite, positive scaling factor. Returns the value now in effect.
    pub fn set_scaling_factor(&mut self, value: f32) -> f32 {
        if is_positive_finite(value) {
            self.scaling_factor = value;
        }
        self.scaling_factor
    }

    /// Accept an offset in `0..MIC_OFFSET_LIMIT`. Returns the value now in effect.
    pub fn set_mic_offset(&mut self, value: i32) -> i32 {
        if (0..MIC_OFFSET_LIMIT).contains(&value) {
            self.mic_offset = value;
        }
        self.mic_offset
    }

    /// Apply a console number to `field`. Offsets truncate towards zero.
    pub fn set(&mut self, field: CalibrationField, value: f32) -> Setting {
        match field {
            CalibrationField::BaselineLevel => {
                let accepted = is_positive_finite(value);
                Setting {
                    accepted,
                    value: FieldValue::Float(self.set_baseline_level(value)),
                }
            }
            CalibrationField::ScalingFactor => {
                let accepted = is_positive_finite(value);
                Setting {
                    accepted,
                    value: FieldValue::Float(self.set_scaling_factor(value)),
                }
            }
            CalibrationField::MicOffset => {
                #[expect(clippy::cast_possible_truncation, reason = "saturating float to int")]
                let offset = value as i32;
                let accepted = value.is_finite() && (0..MIC_OFFSET_LIMIT).contains(&offset);
                Setting {
                    accepted,
                    value: FieldValue::Integer(self.set_mic_offset(offset)),
                }
            }
        }
    }

    /// The current value of `field`.
    #[must_use]
    pub const fn get(&self, field: CalibrationField) -> FieldValue {
        match field {
            CalibrationField::BaselineLevel => FieldValue::Float(self.baseline_level),
            CalibrationField::ScalingFactor => FieldValue::Float(self.scaling_factor),
            CalibrationField::MicOffset => FieldValue::Integer(self.mic_offset),
        }
    }

    /// Write the current value of `field` to its storage address.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the write fails.
    pub fn persist(&self, field: CalibrationField, eeprom: &mut impl Eeprom) -> Result<()> {
        let bytes = match self.get(field) {
            FieldValue::Float(value) => value.to_le_bytes(),
            FieldValue::Integer(value) => value.to_le_bytes(),
        };
        eeprom.write(field.address(), &bytes)
    }
}

fn is_positive_finite(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn read_word(eeprom: &mut impl Eeprom, address: usize) -> Result<[u8; 4]> {
    let mut word = [0u8; 4];
    eeprom.read(address, &mut word)?;
    Ok(word)
}

/// One of the three calibration parameters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, defmt::Format)]
pub enum CalibrationField {
    /// See [`Calibration::baseline_level`].
    BaselineLevel,
    /// See [`Calibration::scaling_factor`].
    ScalingFactor,
    /// See [`Calibration::mic_offset`].
    MicOffset,
}

impl CalibrationField {
    /// All three, in console order.
    pub const ALL: [Self; 3] = [Self::BaselineLevel, Self::ScalingFactor, Self::MicOffset];

    /// Storage address of this parameter.
    #[must_use]
    pub const fn address(self) -> usize {
        match self {
            Self::BaselineLevel => BASELINE_LEVEL_ADDRESS,
            Self::ScalingFactor => SCALING_FACTOR_ADDRESS,
            Self::MicOffset => MIC_OFFSET_ADDRESS,
        }
    }

    /// Human-readable name used by the console.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BaselineLevel => "mic base level",
            Self::ScalingFactor => "scaling factor",
            Self::MicOffset => "mic offset",
        }
    }
}

/// A calibration value as shown on the console.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue {
    /// Baseline level or scaling factor.
    Float(f32),
    /// Microphone offset.
    Integer(i32),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(value) => write!(f, "{value:.2}"),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

/// Outcome of [`Calibration::set`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Setting {
    /// Whether the input replaced the previous value.
    pub accepted: bool,
    /// The value now in effect.
    pub value: FieldValue,
}

// ============================================================================
// Mode selector
// ============================================================================

/// The selected [`Mode`], persisted at [`MODE_ADDRESS`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ModeSelector {
    mode: Mode,
}

impl ModeSelector {
    /// Start at `mode` without touching storage.
    #[must_use]
    pub const fn new(mode: Mode) -> Self {
        Self { mode }
    }

    /// Read the stored mode. An out-of-range index (including erased storage) selects the
    /// first mode.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the read fails.
    pub fn load(eeprom: &mut impl Eeprom) -> Result<Self> {
        let mut index = [0u8; 1];
        eeprom.read(MODE_ADDRESS, &mut index)?;
        let [index] = index;
        Ok(Self::new(Mode::from_index(index).unwrap_or(Mode::LettersStatic)))
    }

    /// The selected mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Select the next mode (wrapping) and store it if the stored byte differs.
    ///
    /// The mode changes even when the write fails.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the write fails.
    pub fn advance(&mut self, eeprom: &mut impl Eeprom) -> Result<Mode> {
        self.mode = self.mode.next();
        eeprom.update(MODE_ADDRESS, &[self.mode.index()])?;
        Ok(self.mode)
    }
}

impl Default for ModeSelector {
    fn default() -> Self {
        Self::new(Mode::LettersStatic)
    }
}
