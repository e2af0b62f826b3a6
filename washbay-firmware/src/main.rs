//! Washbay - wash station sequencer firmware
//!
//! Main firmware binary for RP2040-based wash station controllers.
//! Runs every station's pump/washer sequence concurrently, driven by
//! single-byte commands on the serial console.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::Pwm;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use washbay_core::scheduler::SequencerController;
use washbay_core::traits::ActuatorPort;

mod board;
mod channels;
mod console;
mod stations;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Washbay firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Enable lines, two channels per PWM slice
    let (en0, en1) = board::split_enable(Pwm::new_output_ab(
        p.PWM_SLICE2,
        p.PIN_4,
        p.PIN_5,
        board::pwm_config(),
    ));
    let (en2, en3) = board::split_enable(Pwm::new_output_ab(
        p.PWM_SLICE3,
        p.PIN_6,
        p.PIN_7,
        board::pwm_config(),
    ));
    let (en4, en5) = board::split_enable(Pwm::new_output_ab(
        p.PWM_SLICE4,
        p.PIN_8,
        p.PIN_9,
        board::pwm_config(),
    ));

    let mut actuators: board::ActuatorTable = [
        board::channel(Output::new(p.PIN_10, Level::Low), Output::new(p.PIN_11, Level::Low), en0),
        board::channel(Output::new(p.PIN_12, Level::Low), Output::new(p.PIN_13, Level::Low), en1),
        board::channel(Output::new(p.PIN_14, Level::Low), Output::new(p.PIN_15, Level::Low), en2),
        board::channel(Output::new(p.PIN_16, Level::Low), Output::new(p.PIN_17, Level::Low), en3),
        board::channel(Output::new(p.PIN_18, Level::Low), Output::new(p.PIN_19, Level::Low), en4),
        board::channel(Output::new(p.PIN_20, Level::Low), Output::new(p.PIN_21, Level::Low), en5),
    ];

    for (i, actuator) in actuators.iter_mut().enumerate() {
        if let Err(e) = actuator.init() {
            error!("Channel {} failed to initialize: {:?}", i, e);
        }
    }
    info!("{} H-bridge channels idle", board::CHANNEL_COUNT);

    // Station table from stations.toml, validated again at runtime
    let controller = match stations::load().and_then(|s| SequencerController::new(&s)) {
        Ok(controller) => {
            info!(
                "Configuration loaded: {} stations",
                controller.sequencers().len()
            );
            controller
        }
        Err(e) => {
            // build.rs rejects bad configs, so this means the two disagree
            error!("Invalid station configuration: {:?}", e);
            for actuator in actuators.iter_mut() {
                let _ = actuator.stop();
            }
            loop {
                Timer::after_secs(60).await;
            }
        }
    };

    // Console UART, 115200 8N1
    let uart_config = UartConfig::default();

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for console");

    // Spawn tasks
    spawner.spawn(tasks::tick_task()).unwrap();
    spawner.spawn(tasks::command_rx_task(rx)).unwrap();
    spawner.spawn(tasks::status_tx_task(tx)).unwrap();
    spawner
        .spawn(tasks::controller_task(controller, actuators))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
