//! The twelve rendering modes and the engine that owns the sign's pixel buffer.
//!
//! Each mode keeps its own frame clock (last render time and animation offset) for the
//! life of the program. Switching to another mode and back resumes the animation where
//! it left off. Timed modes only draw when their period has elapsed, so every mode runs
//! at its own frame rate from the same poll loop without a scheduler.
//!
//! # Example
//!
//! ```rust
//! use embassy_time::Instant;
//! use sign_glow::animation::{AnimationEngine, Mode};
//!
//! let mut engine = AnimationEngine::new(7);
//!
//! // Solid renders on every call and never samples the microphone.
//! assert!(engine.render(Mode::Solid, 160, Instant::from_millis(0), |_| 0));
//! assert_eq!(engine.frame()[0].hue, 160);
//! ```

use embassy_time::{Duration, Instant};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::audio::{self, MeterScale};
use crate::dither::{DITHER_SIZE, DitherCurve, compute_dither_curve};
use crate::geometry::{self, Grouping, LETTERS, PIXEL_COUNT};
use crate::led_strip::{Hsv, SignFrame};

/// Brightest value any mode asks for. Keeps the 31 pixels inside a USB power budget.
pub const MAX_BRIGHTNESS: u8 = 0x64;

/// Number of selectable modes.
pub const MODE_COUNT: usize = 12;

/// Green.
pub const HUE_GREEN: u8 = 96;
/// Blue.
pub const HUE_BLUE: u8 = 160;
/// The warm yellow used by [`Mode::YellowToWhite`].
pub const HUE_WARM_YELLOW: u8 = 32;

/// Resting hue of each letter: green, blue, green.
pub const LETTER_HUES: [u8; geometry::LETTER_COUNT] = [HUE_GREEN, HUE_BLUE, HUE_GREEN];

const STEADY_BRIGHTNESS: u8 = 0x40;
const LETTERS_PERIOD: Duration = Duration::from_millis(200);
const CHASE_PERIOD: Duration = Duration::from_millis(100);
const LETTER_SWAY: usize = 8;

// ============================================================================
// Mode
// ============================================================================

/// The selectable renderings, in button order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, defmt::Format)]
pub enum Mode {
    /// Green, blue, green letters with a slow hue sway.
    LettersStatic,
    /// Every pixel at the control hue.
    Solid,
    /// Dither gradient running along the strip in blocks of [`DITHER_SIZE`].
    StripChase,
    /// Dither gradient sweeping across the columns.
    ColumnChase,
    /// Columns spread across the hue wheel, drifting; control sets the speed.
    VerticalRainbow,
    /// A fresh random hue on every pixel; control sets the interval.
    Random,
    /// Dither gradient climbing the rows.
    RowChase,
    /// Dither gradient across the `/` diagonals.
    ForwardDiagonalChase,
    /// Dither gradient across the `\` diagonals.
    BackwardDiagonalChase,
    /// Rows fill green to red with microphone level.
    BasicVuMeter,
    /// Letter brightness follows microphone level.
    IntensityVuMeter,
    /// Warm yellow fading towards white as the control rises.
    YellowToWhite,
}

impl Mode {
    /// Every mode, in button order.
    pub const ALL: [Self; MODE_COUNT] = [
        Self::LettersStatic,
        Self::Solid,
        Self::StripChase,
        Self::ColumnChase,
        Self::VerticalRainbow,
        Self::Random,
        Self::RowChase,
        Self::ForwardDiagonalChase,
        Self::BackwardDiagonalChase,
        Self::BasicVuMeter,
        Self::IntensityVuMeter,
        Self::YellowToWhite,
    ];

    /// Position of this mode in button order (`0..MODE_COUNT`).
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// The mode at `index`, or `None` when `index >= MODE_COUNT`.
    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// The mode selected by the next button press; wraps to the first mode.
    #[must_use]
    pub fn next(self) -> Self {
        Self::from_index(self.index().wrapping_add(1)).unwrap_or(Self::LettersStatic)
    }

    /// Meter scale for the microphone-driven modes.
    #[must_use]
    pub const fn meter_scale(self) -> Option<MeterScale> {
        match self {
            Self::BasicVuMeter => Some(MeterScale::Basic),
            Self::IntensityVuMeter => Some(MeterScale::Intensity),
            _ => None,
        }
    }
}

// ============================================================================
// Frame clock
// ============================================================================

/// A mode's private animation phase.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct FrameClock {
    last_render: Option<Instant>,
    offset: usize,
}

impl FrameClock {
    /// `true` when more than `period` has passed since the last render. The first call
    /// only starts the clock.
    fn tick(&mut self, now: Instant, period: Duration) -> bool {
        match self.last_render {
            None => {
                self.last_render = Some(now);
                false
            }
            Some(last) => self.tick_since(last, now, period),
        }
    }

    /// Like [`tick`](Self::tick), but the very first call is due immediately.
    fn tick_immediate(&mut self, now: Instant, period: Duration) -> bool {
        match self.last_render {
            None => {
                self.last_render = Some(now);
                true
            }
            Some(last) => self.tick_since(last, now, period),
        }
    }

    fn tick_since(&mut self, last: Instant, now: Instant, period: Duration) -> bool {
        if now.saturating_duration_since(last) > period {
            self.last_render = Some(now);
            true
        } else {
            false
        }
    }

    fn advance(&mut self) {
        self.offset = self.offset.wrapping_add(1);
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Owns the pixel buffer, the dither curve, and one [`FrameClock`] per mode.
pub struct AnimationEngine {
    frame: SignFrame,
    dither: DitherCurve<DITHER_SIZE>,
    clocks: [FrameClock; MODE_COUNT],
    rng: SmallRng,
}

impl AnimationEngine {
    /// Create an engine with a blank frame. `seed` drives [`Mode::Random`].
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            frame: SignFrame::new(),
            dither: compute_dither_curve(MAX_BRIGHTNESS),
            clocks: [FrameClock::default(); MODE_COUNT],
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// The pixel buffer as last rendered.
    #[must_use]
    pub const fn frame(&self) -> &SignFrame {
        &self.frame
    }

    /// The dither curve shared by the chase modes.
    #[must_use]
    pub const fn dither(&self) -> &DitherCurve<DITHER_SIZE> {
        &self.dither
    }

    /// Animation offset of `mode`, which persists while other modes are active.
    #[must_use]
    pub fn offset(&self, mode: Mode) -> usize {
        self.clocks
            .get(usize::from(mode.index()))
            .map_or(0, |clock| clock.offset)
    }

    /// Draw one poll cycle of `mode`. Returns `true` when the pixel buffer was redrawn and
    /// should be flushed.
    ///
    /// `control` is the potentiometer rescaled to `0..=255`. `intensity` is only called
    /// by the two meter modes, so the microphone is sampled only when it is needed.
    pub fn render(
        &mut self,
        mode: Mode,
        control: u8,
        now: Instant,
        intensity: impl FnOnce(MeterScale) -> u8,
    ) -> bool {
        let Some(clock) = self.clocks.get_mut(usize::from(mode.index())) else {
            return false;
        };
        let frame = &mut self.frame;
        let dither = &self.dither;
        match mode {
            Mode::LettersStatic => render_letters(frame, clock, now),
            Mode::Solid => {
                frame.fill(Hsv::new(control, u8::MAX, STEADY_BRIGHTNESS));
                true
            }
            Mode::StripChase => render_strip_chase(frame, dither, clock, control, now),
            Mode::ColumnChase => {
                render_group_chase(frame, dither, clock, Grouping::Column, control, now)
            }
            Mode::RowChase => render_group_chase(frame, dither, clock, Grouping::Row, control, now),
            Mode::ForwardDiagonalChase => {
                render_group_chase(frame, dither, clock, Grouping::ForwardDiagonal, control, now)
            }
            Mode::BackwardDiagonalChase => {
                render_group_chase(frame, dither, clock, Grouping::BackwardDiagonal, control, now)
            }
            Mode::VerticalRainbow => render_rainbow(frame, clock, control, now),
            Mode::Random => render_random(frame, &mut self.rng, clock, control, now),
            Mode::YellowToWhite => {
                render_yellow_to_white(frame, control);
                true
            }
            Mode::BasicVuMeter => {
                audio::render_basic_meter(frame, intensity(MeterScale::Basic));
                true
            }
            Mode::IntensityVuMeter => {
                audio::render_intensity_meter(frame, intensity(MeterScale::Intensity));
                true
            }
        }
    }
}

fn render_letters(frame: &mut SignFrame, clock: &mut FrameClock, now: Instant) -> bool {
    if !clock.tick(now, LETTERS_PERIOD) {
        return false;
    }
    // Triangle wave 0..=LETTER_SWAY..0 keeps the letters near green and blue.
    let phase = clock.offset % (LETTER_SWAY * 2);
    let sway = if phase < LETTER_SWAY {
        phase
    } else {
        LETTER_SWAY * 2 - phase
    };
    #[expect(clippy::cast_possible_truncation, reason = "sway is at most LETTER_SWAY")]
    let sway = sway as u8;
    for (letter, hue) in LETTERS.iter().zip(LETTER_HUES) {
        frame.set_all(
            letter.as_slice(),
            Hsv::new(hue.wrapping_add(sway), u8::MAX, STEADY_BRIGHTNESS),
        );
    }
    clock.advance();
    true
}

fn render_strip_chase(
    frame: &mut SignFrame,
    dither: &DitherCurve<DITHER_SIZE>,
    clock: &mut FrameClock,
    hue: u8,
    now: Instant,
) -> bool {
    if !clock.tick(now, CHASE_PERIOD) {
        return false;
    }
    for pixel in 0..PIXEL_COUNT {
        let brightness = dither.brightness_at(pixel % DITHER_SIZE, clock.offset);
        frame.set(pixel, Hsv::new(hue, u8::MAX, brightness));
    }
    clock.advance();
    true
}

fn render_group_chase(
    frame: &mut SignFrame,
    dither: &DitherCurve<DITHER_SIZE>,
    clock: &mut FrameClock,
    grouping: Grouping,
    hue: u8,
    now: Instant,
) -> bool {
    if !clock.tick(now, CHASE_PERIOD) {
        return false;
    }
    for (group_index, pixels) in geometry::groups(grouping) {
        let brightness = dither.brightness_at(group_index, clock.offset);
        frame.set_all(pixels, Hsv::new(hue, u8::MAX, brightness));
    }
    clock.advance();
    true
}

fn render_rainbow(frame: &mut SignFrame, clock: &mut FrameClock, control: u8, now: Instant) -> bool {
    if !clock.tick(now, control_period(control, 20, 2000)) {
        return false;
    }
    for (column, pixels) in geometry::groups(Grouping::Column) {
        let hue = column.wrapping_mul(10).wrapping_add(clock.offset) % 255;
        #[expect(clippy::cast_possible_truncation, reason = "reduced modulo 255")]
        let hue = hue as u8;
        frame.set_all(pixels, Hsv::new(hue, u8::MAX, STEADY_BRIGHTNESS));
    }
    clock.advance();
    true
}

fn render_random(
    frame: &mut SignFrame,
    rng: &mut SmallRng,
    clock: &mut FrameClock,
    control: u8,
    now: Instant,
) -> bool {
    if !clock.tick_immediate(now, control_period(control, 100, 5000)) {
        return false;
    }
    for pixel in frame.iter_mut() {
        *pixel = Hsv::new(rng.random(), u8::MAX, MAX_BRIGHTNESS / 2);
    }
    true
}

fn render_yellow_to_white(frame: &mut SignFrame, control: u8) {
    let control = i32::from(control);
    let saturation = map_range(control, 0, 255, 255, 32);
    let brightness = map_range(control, 0, 255, 40, 160);
    frame.fill(Hsv::new(
        HUE_WARM_YELLOW,
        clamp_to_u8(saturation),
        clamp_to_u8(brightness),
    ));
}

/// Frame period selected by the control, from `fastest_ms` (control 0) to `slowest_ms`
/// (control 255).
fn control_period(control: u8, fastest_ms: i32, slowest_ms: i32) -> Duration {
    let millis = map_range(i32::from(control), 0, 255, fastest_ms, slowest_ms);
    Duration::from_millis(u64::try_from(millis).unwrap_or(0))
}

/// Linearly rescale `value` from `in_min..=in_max` to `out_min..=out_max` with integer
/// math, truncating towards zero. Values outside the input range extrapolate.
///
/// ```rust
/// use sign_glow::animation::map_range;
///
/// assert_eq!(map_range(512, 0, 1024, 0, 255), 127);
/// assert_eq!(map_range(0, 0, 255, 255, 32), 255);
/// assert_eq!(map_range(255, 0, 255, 40, 160), 160);
/// ```
#[must_use]
pub fn map_range(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    let in_span = i64::from(in_max) - i64::from(in_min);
    if in_span == 0 {
        return out_min;
    }
    let scaled = (i64::from(value) - i64::from(in_min)) * (i64::from(out_max) - i64::from(out_min))
        / in_span
        + i64::from(out_min);
    i32::try_from(scaled).unwrap_or(if scaled < 0 { i32::MIN } else { i32::MAX })
}

/// Saturate into `0..=255`.
#[must_use]
pub fn clamp_to_u8(value: i32) -> u8 {
    u8::try_from(value.clamp(0, i32::from(u8::MAX))).unwrap_or(u8::MAX)
}
