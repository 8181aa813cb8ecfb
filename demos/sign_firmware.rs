#![allow(missing_docs)]
#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};

use defmt::{debug, error, info};
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Pull;
use embassy_rp::peripherals::{PIO0, UART0};
use embassy_rp::pio::{self, Pio};
use embassy_rp::uart::{self, BufferedInterruptHandler, BufferedUart};
use embassy_time::Instant;
use sign_glow::{
    Result,
    board::{AnalogInputs, UartConsole},
    audio::MicSource,
    button::{Button, PressedTo},
    console,
    flash_array::FlashEeprom,
    geometry::PIXEL_COUNT,
    led_strip::LedStrip,
    sign::{PollInputs, Sign, SignConfig},
};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => pio::InterruptHandler<PIO0>;
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

const CONFIG: SignConfig = SignConfig::DEFAULT;

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    // Strip on GPIO2, select button on GPIO10 (to ground), pot on ADC0, mic on ADC1.
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let mut strip = LedStrip::<_, 0, PIXEL_COUNT>::new(
        &mut common,
        sm0,
        p.DMA_CH0,
        p.PIN_2,
        CONFIG.gamma,
        CONFIG.max_current,
    );
    let mut button = Button::on_pin(p.PIN_10, PressedTo::Ground);
    let mut analog = AnalogInputs::new(
        Adc::new_blocking(p.ADC, adc::Config::default()),
        Channel::new_pin(p.PIN_26, Pull::None),
        Channel::new_pin(p.PIN_27, Pull::None),
    );

    static TX_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    static RX_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        TX_BUFFER.init([0; 256]),
        RX_BUFFER.init([0; 64]),
        uart::Config::default(),
    );
    let mut console_io = UartConsole::new(uart);

    let mut eeprom = FlashEeprom::new(p.FLASH)?;
    // Seed the random mode from microphone noise.
    let seed = (0..4).fold(Instant::now().as_ticks(), |seed, _| {
        (seed << 16) ^ u64::from(analog.mic().read_sample())
    });
    let mut sign = Sign::load(&mut eeprom, seed)?;
    info!("Sign: starting in mode {}", sign.mode());
    if let Err(err) = console::print_summary(&mut console_io, sign.calibration()) {
        error!("Console: {}", err);
    }

    loop {
        let now = Instant::now();
        let advance = button.poll_press(now);
        let raw_control = analog.read_control();

        match sign.service_console(&mut console_io, &mut eeprom) {
            Ok(Some(field)) => info!("Calibration: stored {}", field),
            Ok(None) => {}
            Err(err) => error!("Console: {}", err),
        }

        let inputs = PollInputs {
            advance,
            raw_control,
            now,
        };
        match sign.poll(inputs, &mut analog.mic(), &mut eeprom) {
            Ok(outcome) => {
                if outcome.mode_changed {
                    info!("Sign: mode {}", sign.mode());
                }
                if let Some(reading) = outcome.meter {
                    debug!("{} - {}", reading.envelope, reading.intensity);
                }
                if outcome.rendered {
                    strip.write_frame(sign.frame()).await;
                }
            }
            Err(err) => error!("Sign: {}", err),
        }

        embassy_futures::yield_now().await;
    }
}
