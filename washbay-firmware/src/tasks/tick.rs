//! Tick task for time-based updates
//!
//! Drives the sequencers: every tick the controller checks whether any
//! station's current stage has run its course.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};

use washbay_core::traits::MonotonicClock;

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u32 = 20;

/// Signal to notify controller of tick
///
/// Carries no timestamp; the controller reads the clock when it handles
/// the tick.
pub static TICK_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Milliseconds since boot from the embassy time driver
///
/// Truncated to 32 bits; the sequencers tolerate the wrap.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

/// Tick task - sends periodic tick signals
#[embassy_executor::task]
pub async fn tick_task() {
    info!("Tick task started");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS as u64));

    loop {
        ticker.next().await;
        TICK_SIGNAL.signal(());
    }
}
