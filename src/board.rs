//! Pico peripherals behind the sign's input traits: the ADC for the potentiometer and
//! microphone, and a buffered UART for the calibration console.

use core::fmt;

use defmt::warn;
use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_rp::uart::BufferedUart;
use embedded_io::{Read, ReadReady, Write};

use crate::audio::{ANALOG_MAX, MicSource};
use crate::console::ConsoleIo;
use crate::{Error, Result};

// The RP ADC is 12-bit; the sign works on a 10-bit scale.
const ADC_SHIFT: u32 = 2;

// ============================================================================
// Analog inputs
// ============================================================================

/// The ADC with the potentiometer and microphone channels.
pub struct AnalogInputs<'d> {
    adc: Adc<'d, Blocking>,
    control: Channel<'d>,
    mic: Channel<'d>,
}

impl<'d> AnalogInputs<'d> {
    /// Bundle the ADC with its two channels.
    #[must_use]
    pub const fn new(adc: Adc<'d, Blocking>, control: Channel<'d>, mic: Channel<'d>) -> Self {
        Self { adc, control, mic }
    }

    /// Potentiometer position in `0..=ANALOG_MAX`.
    pub fn read_control(&mut self) -> u16 {
        read_scaled(&mut self.adc, &mut self.control)
    }

    /// A [`MicSource`] borrowing the ADC.
    pub fn mic(&mut self) -> Microphone<'_, 'd> {
        Microphone {
            adc: &mut self.adc,
            channel: &mut self.mic,
        }
    }
}

/// The microphone channel, sampled on demand.
pub struct Microphone<'a, 'd> {
    adc: &'a mut Adc<'d, Blocking>,
    channel: &'a mut Channel<'d>,
}

impl MicSource for Microphone<'_, '_> {
    fn read_sample(&mut self) -> u16 {
        read_scaled(self.adc, self.channel)
    }
}

/// A failed conversion reads as the bottom of the scale.
fn read_scaled(adc: &mut Adc<'_, Blocking>, channel: &mut Channel<'_>) -> u16 {
    match adc.blocking_read(channel) {
        Ok(raw) => (raw >> ADC_SHIFT).min(ANALOG_MAX),
        Err(err) => {
            warn!("ADC read failed: {}", err);
            0
        }
    }
}

// ============================================================================
// Serial console
// ============================================================================

/// The calibration console on a buffered UART.
pub struct UartConsole {
    uart: BufferedUart,
}

impl UartConsole {
    /// Wrap a configured UART.
    #[must_use]
    pub const fn new(uart: BufferedUart) -> Self {
        Self { uart }
    }
}

impl ConsoleIo for UartConsole {
    fn read_ready(&mut self) -> Result<bool> {
        self.uart.read_ready().map_err(|_| Error::Console)
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        loop {
            if self.uart.read(&mut byte).map_err(|_| Error::Console)? == 1 {
                let [byte] = byte;
                return Ok(byte);
            }
        }
    }
}

impl fmt::Write for UartConsole {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        self.uart.write_all(text.as_bytes()).map_err(|_| fmt::Error)
    }
}
