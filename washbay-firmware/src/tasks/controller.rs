//! Main controller task
//!
//! Owns the sequencer controller and every actuator. Commands from the
//! console and ticks from the tick task are handled one at a time, so no
//! locking is needed around either.

use defmt::*;
use embassy_futures::select::{select, Either};

use washbay_core::scheduler::{Command, Notifications, SequencerController};
use washbay_core::state::Notification;
use washbay_core::traits::MonotonicClock;

use crate::board::ActuatorTable;
use crate::channels::{StatusLine, COMMAND_CHANNEL, STATUS_CHANNEL};
use crate::tasks::tick::{EmbassyClock, TICK_SIGNAL};

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(mut controller: SequencerController, mut actuators: ActuatorTable) {
    info!("Controller task started");

    let clock = EmbassyClock;
    publish(StatusLine::Ready);

    loop {
        match select(COMMAND_CHANNEL.receive(), TICK_SIGNAL.wait()).await {
            Either::First(command) => {
                let now_ms = clock.now_ms();
                match command {
                    Command::StopAll => {
                        warn!("Emergency stop");
                        publish(StatusLine::EmergencyStop);

                        let events = controller.handle(command, now_ms, &mut actuators);
                        // Idle stations report Cancelled too, only faults are worth a line
                        report(&events, |n| n.event.is_error());

                        publish(StatusLine::AllStopped);
                    }
                    _ => {
                        let events = controller.handle(command, now_ms, &mut actuators);
                        report(&events, |_| true);
                    }
                }
            }

            Either::Second(()) => {
                let events = controller.tick_all(clock.now_ms(), &mut actuators);
                report(&events, |_| true);
            }
        }
    }
}

/// Log every notification and forward the selected ones to the console
fn report(events: &Notifications, forward: impl Fn(&Notification) -> bool) {
    for n in events {
        if n.event.is_error() {
            warn!("Station {}: {:?}", n.station.0, n.event);
        } else {
            info!("Station {}: {:?}", n.station.0, n.event);
        }

        if forward(n) {
            publish(StatusLine::Station(*n));
        }
    }
}

/// Queue a status line, dropping it if the console is backed up
fn publish(status: StatusLine) {
    if STATUS_CHANNEL.try_send(status).is_err() {
        warn!("Status channel full, dropping {:?}", status);
    }
}
