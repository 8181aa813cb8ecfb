//! A debounced push button, polled from the main loop.
//!
//! See [`Button`] for usage example.

use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;

// ============================================================================
// Constants
// ============================================================================

/// How long the raw level must hold still before it is believed.
pub const BUTTON_DEBOUNCE_DELAY: Duration = Duration::from_millis(100);

// ============================================================================
// PressedTo - How the button is wired
// ============================================================================

/// Describes how the button is physically wired.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, defmt::Format)]
pub enum PressedTo {
    /// Button connects pin to voltage (3.3V) when pressed.
    /// Uses internal pull-down resistor. Pin reads HIGH when pressed.
    ///
    /// Note: The original Pico 2 (RP2350) has a known silicon bug with pull-down resistors
    /// that can cause pins to stay HIGH after button release. Use ToGround instead.
    Voltage,

    /// Button connects pin to ground (GND) when pressed.
    /// Uses internal pull-up resistor. Pin reads LOW when pressed.
    /// Recommended for Pico 2 due to pull-down resistor bug.
    Ground,
}

// ============================================================================
// Debouncer
// ============================================================================

/// Turns raw button samples into debounced press events.
///
/// Every change of the raw level restarts the debounce window. Once the level has held
/// for longer than the window it becomes the debounced state, and a transition to
/// pressed is reported exactly once.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ButtonDebouncer {
    delay: Duration,
    last_raw: bool,
    last_change: Instant,
    pressed: bool,
}

impl ButtonDebouncer {
    /// A released button with the given debounce window.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_raw: false,
            last_change: Instant::MIN,
            pressed: false,
        }
    }

    /// The debounced state.
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feed one raw sample taken at `now`. Returns `true` on the debounced press edge.
    pub fn update(&mut self, raw_pressed: bool, now: Instant) -> bool {
        if raw_pressed != self.last_raw {
            self.last_raw = raw_pressed;
            self.last_change = now;
        }
        if now.saturating_duration_since(self.last_change) > self.delay
            && raw_pressed != self.pressed
        {
            self.pressed = raw_pressed;
            return self.pressed;
        }
        false
    }
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new(BUTTON_DEBOUNCE_DELAY)
    }
}

// ============================================================================
// Button Virtual Device
// ============================================================================

/// A debounced button on any [`InputPin`].
///
/// # Hardware Requirements
///
/// The button can be wired in two ways:
/// - [`PressedTo::Voltage`]: Button connects pin to 3.3V when pressed (uses pull-down)
/// - [`PressedTo::Ground`]: Button connects pin to GND when pressed (uses pull-up)
///
/// **Important**: Pico 2 (RP2350) has a known silicon bug (erratum E9) with pull-down
/// resistors that can leave the pin reading HIGH after release. Wire buttons to GND and
/// use [`PressedTo::Ground`] on Pico 2.
///
/// # Example
///
/// ```rust,ignore
/// # #![no_std]
/// # #![no_main]
/// use embassy_time::Instant;
/// use sign_glow::button::{Button, PressedTo};
/// # #[panic_handler]
/// # fn panic(_info: &core::panic::PanicInfo) -> ! { loop {} }
///
/// fn example(p: embassy_rp::Peripherals) {
///     let mut button = Button::on_pin(p.PIN_2, PressedTo::Voltage);
///     loop {
///         if button.poll_press(Instant::now()) {
///             // advance the mode
///         }
///     }
/// }
/// ```
pub struct Button<P> {
    input: P,
    pressed_to: PressedTo,
    debouncer: ButtonDebouncer,
}

impl<P: InputPin> Button<P> {
    /// Wrap an already configured input.
    #[must_use]
    pub fn new(input: P, pressed_to: PressedTo, delay: Duration) -> Self {
        Self {
            input,
            pressed_to,
            debouncer: ButtonDebouncer::new(delay),
        }
    }

    /// Returns whether the button is currently pressed (raw, not debounced). A pin that
    /// cannot be read counts as released.
    pub fn is_pressed(&mut self) -> bool {
        let level = match self.pressed_to {
            PressedTo::Voltage => self.input.is_high(),
            PressedTo::Ground => self.input.is_low(),
        };
        level.unwrap_or(false)
    }

    /// Sample the pin. Returns `true` once per debounced press.
    pub fn poll_press(&mut self, now: Instant) -> bool {
        let raw_pressed = self.is_pressed();
        self.debouncer.update(raw_pressed, now)
    }
}

#[cfg(not(feature = "host"))]
impl<'a> Button<embassy_rp::gpio::Input<'a>> {
    /// Configure `pin` as an input with the pull that matches its wiring.
    ///
    /// - [`PressedTo::Voltage`]: Uses internal pull-down (button to 3.3V)
    /// - [`PressedTo::Ground`]: Uses internal pull-up (button to GND)
    #[must_use]
    pub fn on_pin<T: embassy_rp::gpio::Pin>(
        pin: embassy_rp::Peri<'a, T>,
        pressed_to: PressedTo,
    ) -> Self {
        use embassy_rp::gpio::{Input, Pull};

        let pull = match pressed_to {
            PressedTo::Voltage => Pull::Down,
            PressedTo::Ground => Pull::Up,
        };
        Self::new(Input::new(pin, pull), pressed_to, BUTTON_DEBOUNCE_DELAY)
    }
}
