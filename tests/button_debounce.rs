#![allow(missing_docs)]
//! Host-level tests for button debouncing.

use core::convert::Infallible;
use std::cell::Cell;
use std::rc::Rc;

use embassy_time::{Duration, Instant};
use embedded_hal::digital::{ErrorType, InputPin};
use sign_glow::button::{BUTTON_DEBOUNCE_DELAY, Button, ButtonDebouncer, PressedTo};

fn at(millis: u64) -> Instant {
    Instant::from_millis(millis)
}

#[test]
fn clean_press_fires_once_after_the_window() {
    let mut debouncer = ButtonDebouncer::default();
    assert!(!debouncer.update(true, at(1_000)));
    assert!(!debouncer.update(true, at(1_100)));
    assert!(debouncer.update(true, at(1_101)));
    assert!(debouncer.is_pressed());
    assert!(!debouncer.update(true, at(1_500)));
}

#[test]
fn release_is_not_a_press() {
    let mut debouncer = ButtonDebouncer::default();
    debouncer.update(true, at(0));
    assert!(debouncer.update(true, at(200)));
    assert!(!debouncer.update(false, at(300)));
    assert!(!debouncer.update(false, at(401)));
    assert!(!debouncer.is_pressed());
}

#[test]
fn bounces_restart_the_window() {
    let mut debouncer = ButtonDebouncer::new(Duration::from_millis(100));
    let mut fired = 0;
    for (millis, raw) in [(0, true), (30, false), (60, true), (90, false), (120, true)] {
        fired += usize::from(debouncer.update(raw, at(millis)));
    }
    assert_eq!(fired, 0);
    assert!(!debouncer.update(true, at(220)));
    assert!(debouncer.update(true, at(221)));
}

#[test]
fn second_press_needs_a_release_between() {
    let mut debouncer = ButtonDebouncer::default();
    let mut presses = 0;
    let mut now = 0;
    for raw in [true, true, false, false, true, true] {
        now += 150;
        presses += usize::from(debouncer.update(raw, at(now)));
    }
    assert_eq!(presses, 2);
}

/// A pin whose level the test controls.
#[derive(Clone)]
struct FakePin(Rc<Cell<bool>>);

impl ErrorType for FakePin {
    type Error = Infallible;
}

impl InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }
}

#[test]
fn button_to_ground_presses_on_low() {
    let level = Rc::new(Cell::new(true));
    let mut button = Button::new(FakePin(level.clone()), PressedTo::Ground, BUTTON_DEBOUNCE_DELAY);
    assert!(!button.is_pressed());
    assert!(!button.poll_press(at(0)));

    level.set(false);
    assert!(button.is_pressed());
    assert!(!button.poll_press(at(10)));
    assert!(button.poll_press(at(111)));
    assert!(!button.poll_press(at(500)));
}

#[test]
fn button_to_voltage_presses_on_high() {
    let level = Rc::new(Cell::new(false));
    let mut button = Button::new(FakePin(level.clone()), PressedTo::Voltage, BUTTON_DEBOUNCE_DELAY);
    level.set(true);
    assert!(!button.poll_press(at(0)));
    assert!(button.poll_press(at(101)));
}
