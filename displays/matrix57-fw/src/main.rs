//! Matrix57 Firmware
//!
//! Firmware for the 5x7 LED dot-matrix module (STM32F042K6).
//! Receives commands from the master over the two-wire bit-serial link and
//! multiplexes them onto the matrix through the shift-register chain.
//!
//! Pin map:
//!
//! | Pin | Use |
//! |-----|-----|
//! | PA0 | link data in, pulled up (high at power-on selects demo mode) |
//! | PA1 | link clock in (EXTI1) |
//! | PA4 | shift-register data |
//! | PA5 | shift-register clock |
//! | PA6 | blanking |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_stm32::bind_interrupts;
use embassy_stm32::exti::{self, ExtiInput};
use embassy_stm32::gpio::{Input, Output, Pull, Speed};
use {defmt_rtt as _, panic_probe as _};

use matrix57_core::{
    DemoSequencer, DisplayConfig, DisplayController, FastTick, LinkIsr, LinkShared, ParserEvent,
};
use matrix57_display::{BuiltinFont, ShiftRegisterOutput};
use matrix57_hal::{Edge, InputPin};
use matrix57_hal_stm32f0::{configure_periodic_tick, ClockLine, FastTicker, Sense, ShiftPin};

bind_interrupts!(struct Irqs {
    EXTI0_1 => exti::InterruptHandler<embassy_stm32::interrupt::typelevel::EXTI0_1>;
});

type Matrix = ShiftRegisterOutput<ShiftPin<'static>, ShiftPin<'static>, ShiftPin<'static>>;

/// Fast tick events, written by the tick task only
static FAST_TICK: FastTick = FastTick::new();

/// Link mailbox between the edge task and the main loop
static LINK: LinkShared = LinkShared::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Matrix57 firmware starting...");

    let p = embassy_stm32::init(Default::default());

    let config = DisplayConfig {
        pin_end_is_top: cfg!(feature = "pin-end-top"),
        ..DisplayConfig::default()
    };

    // Shift-register chain: blank stays high until the first column
    let output = ShiftRegisterOutput::new(
        ShiftPin::new(Output::new(p.PA4, embassy_stm32::gpio::Level::High, Speed::Low)),
        ShiftPin::new(Output::new(p.PA5, embassy_stm32::gpio::Level::Low, Speed::Low)),
        ShiftPin::new(Output::new(p.PA6, embassy_stm32::gpio::Level::High, Speed::Low)),
    );

    // Link (PA1=clock, PA0=data); data is pulled up, so no master means demo
    let data = Sense::new(Input::new(p.PA0, Pull::Up));
    let clock = ExtiInput::new(p.PA1, p.EXTI1, Pull::Down, Irqs);
    let demo = data.is_high();

    spawner
        .spawn(tick_task(configure_periodic_tick(config.fast_tick_hz)))
        .unwrap();

    if demo {
        info!("Link data high at power-on, running demo");
    } else {
        spawner
            .spawn(link_task(ClockLine::new(clock, Edge::Any), data))
            .unwrap();
    }

    spawner.spawn(main_loop(config, output, demo)).unwrap();

    info!(
        "All tasks spawned ({} Hz columns, pin end top: {})",
        config.column_hz(),
        config.pin_end_is_top
    );
}

/// Periodic interrupt: counts fast ticks
#[embassy_executor::task]
async fn tick_task(mut ticker: FastTicker) {
    info!("Tick task started ({} us)", ticker.period().as_micros());

    loop {
        ticker.next().await;
        FAST_TICK.on_fast_tick();
    }
}

/// Link clock edges: shifts bits into the mailbox
#[embassy_executor::task]
async fn link_task(mut clock: ClockLine<'static>, data: Sense<'static>) {
    info!("Link task started");

    let mut isr = LinkIsr::new(&LINK);
    loop {
        let level = clock.wait().await;
        isr.on_clock_edge(level.is_high(), data.is_high());
    }
}

/// Cooperative main loop
#[embassy_executor::task]
async fn main_loop(config: DisplayConfig, output: Matrix, demo: bool) {
    info!("Main loop started");

    let mut controller = DisplayController::new(config, &FAST_TICK, &LINK, output, BuiltinFont);
    let mut sequencer = demo.then(DemoSequencer::new);

    loop {
        let pass = controller.poll();

        if let Some(event) = pass.event {
            log_event(event);
        }

        if pass.pattern {
            if let Some(sequencer) = sequencer.as_mut() {
                let before = sequencer.current();
                for byte in sequencer.step() {
                    log_event(controller.inject(byte));
                }
                if sequencer.current() != before {
                    debug!("Demo: {:?}", sequencer.current());
                }
            }
        }

        if pass.heartbeat {
            let stats = controller.link_stats();
            trace!(
                "Heartbeat: mode={:?} bytes={} resyncs={} dropped={} coalesced={}",
                controller.state().mode(),
                stats.bytes,
                stats.resyncs,
                stats.dropped_edges,
                controller.timebase().coalesced()
            );
        }

        yield_now().await;
    }
}

fn log_event(event: ParserEvent) {
    match event {
        ParserEvent::Command(opcode) => debug!("Command: {:?}", opcode),
        ParserEvent::UnknownOpcode(byte) => warn!("Unknown opcode: {=u8:#x}", byte),
        ParserEvent::MessageStored { len } => debug!("Message stored ({} chars)", len),
        ParserEvent::FrameLoaded => debug!("Frame loaded"),
        ParserEvent::ParameterApplied(parameter, value) => {
            debug!("{:?} = {}", parameter, value)
        }
        ParserEvent::ParameterRejected(parameter, value) => {
            warn!("{:?}: unsupported value {}", parameter, value)
        }
        ParserEvent::PairLoaded {
            first,
            second,
            flipped,
        } => debug!("Pair loaded: {=u8:#x} {=u8:#x} flipped={}", first, second, flipped),
        other => trace!("{:?}", other),
    }
}
