//! Line-oriented calibration console over a serial link.
//!
//! The console is polled: [`service`] returns immediately unless a byte is waiting. A
//! waiting byte selects an option:
//!
//! - newline: print the current calibration and the help line
//! - `b` / `B`: set the mic base level
//! - `f` / `F`: set the mic scaling factor
//! - `o` / `O`: set the mic offset
//!
//! The three setters prompt for a number and block until it is terminated by a newline.
//! Input accepts digits and decimal points, up to [`NUMBER_INPUT_LIMIT`] characters;
//! anything else is dropped silently. The number ends at a second decimal point, so
//! `1.2.3` reads as `1.2`. Accepted values are stored immediately.
//!
//! # Example
//!
//! ```text
//! > b
//! b
//! Current mic base level: 3.00
//! Enter new mic base level: 4.5
//! New mic base level: 4.50
//! ```

use core::fmt::{self, Write};

use heapless::String;

use crate::calibration::{Calibration, CalibrationField};
use crate::eeprom::Eeprom;
use crate::{Error, Result};

/// Characters kept from one number entry; the rest are ignored.
pub const NUMBER_INPUT_LIMIT: usize = 5;

/// The byte stream the console talks over.
pub trait ConsoleIo: Write {
    /// `true` when at least one byte can be read without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Console`] if the transport fails.
    fn read_ready(&mut self) -> Result<bool>;

    /// Wait for and return the next byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Console`] if the transport fails.
    fn read_byte(&mut self) -> Result<u8>;
}

/// Print the loaded calibration and the help line. Used at startup.
///
/// # Errors
///
/// Returns [`Error::Console`] if the transport fails.
pub fn print_summary(io: &mut impl ConsoleIo, calibration: &Calibration) -> Result<()> {
    emit(
        io,
        format_args!(
            "Mic base level: {}  Mic scaling factor: {}  Mic offset: {}\n",
            calibration.get(CalibrationField::BaselineLevel),
            calibration.get(CalibrationField::ScalingFactor),
            calibration.get(CalibrationField::MicOffset),
        ),
    )?;
    emit(
        io,
        format_args!(
            "Enter 'b' to set mic base level, 'f' to set mic scaling factor, or 'o' to set mic offset.\n"
        ),
    )
}

/// Handle one pending option byte, if any. Returns the field that was changed.
///
/// # Errors
///
/// Returns [`Error::Console`] if the transport fails, or the storage error if an
/// accepted value cannot be stored. The new value stays in effect either way.
pub fn service(
    io: &mut impl ConsoleIo,
    calibration: &mut Calibration,
    eeprom: &mut impl Eeprom,
) -> Result<Option<CalibrationField>> {
    if !io.read_ready()? {
        return Ok(None);
    }
    let option = io.read_byte()?;
    let field = match option {
        b'\n' => {
            print_summary(io, calibration)?;
            return Ok(None);
        }
        b'\r' => return Ok(None),
        b'b' | b'B' => CalibrationField::BaselineLevel,
        b'f' | b'F' => CalibrationField::ScalingFactor,
        b'o' | b'O' => CalibrationField::MicOffset,
        other => {
            emit(io, format_args!("{}\n", char::from(other)))?;
            return Ok(None);
        }
    };
    emit(io, format_args!("{}\n", char::from(option)))?;

    let label = field.label();
    emit(
        io,
        format_args!("Current {label}: {}\n", calibration.get(field)),
    )?;
    emit(io, format_args!("Enter new {label}: "))?;
    let number = read_number(io)?;

    let setting = calibration.set(field, number);
    emit(io, format_args!("New {label}: {}\n", setting.value))?;
    if !setting.accepted {
        return Ok(None);
    }
    calibration.persist(field, eeprom)?;
    Ok(Some(field))
}

/// Read a newline-terminated number, echoing each kept character. Parsing stops at a
/// second decimal point.
fn read_number(io: &mut impl ConsoleIo) -> Result<f32> {
    let mut text: String<NUMBER_INPUT_LIMIT> = String::new();
    loop {
        let byte = io.read_byte()?;
        match byte {
            b'\n' => {
                emit(io, format_args!("\n"))?;
                return Ok(parse_decimal(&text));
            }
            b'0'..=b'9' | b'.' => {
                if text.push(char::from(byte)).is_ok() {
                    emit(io, format_args!("{}", char::from(byte)))?;
                }
            }
            _ => {}
        }
    }
}

/// Parse the leading decimal number in `text`, like C's `atof`: digits with an optional
/// decimal point. Anything unparsable, including an empty string, is `0.0`.
///
/// ```rust
/// use sign_glow::console::parse_decimal;
///
/// assert_eq!(parse_decimal("12.5"), 12.5);
/// assert_eq!(parse_decimal(".5"), 0.5);
/// assert_eq!(parse_decimal("7."), 7.0);
/// assert_eq!(parse_decimal(""), 0.0);
/// ```
#[must_use]
pub fn parse_decimal(text: &str) -> f32 {
    let mut whole = 0.0f32;
    let mut fraction = 0.0f32;
    let mut scale = 1.0f32;
    let mut after_point = false;
    for character in text.chars() {
        match (character, character.to_digit(10)) {
            ('.', _) if !after_point => after_point = true,
            (_, Some(digit)) => {
                #[expect(clippy::cast_precision_loss, reason = "single decimal digit")]
                let digit = digit as f32;
                if after_point {
                    scale /= 10.0;
                    fraction += digit * scale;
                } else {
                    whole = whole * 10.0 + digit;
                }
            }
            _ => break,
        }
    }
    whole + fraction
}

fn emit(io: &mut impl ConsoleIo, args: fmt::Arguments<'_>) -> Result<()> {
    io.write_fmt(args).map_err(|_| Error::Console)
}
