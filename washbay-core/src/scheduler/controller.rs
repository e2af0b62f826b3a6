//! Sequencer controller
//!
//! Owns one [`StationSequencer`] per physical station, routes start/stop
//! requests to them and advances all of them from a single control loop.
//!
//! The controller holds no locks. It is meant to be driven from one task;
//! a multi-threaded host must serialize every call through one mutex
//! around the whole controller.

use heapless::Vec;

use super::sequencer::StationSequencer;
use crate::config::{validate_stations, ConfigError, StationConfig, StationId, MAX_STATIONS};
use crate::state::{Notification, SequencerError, SequencerEvent};
use crate::traits::{ActuatorBank, MonotonicClock};

/// Notifications produced by one controller call (at most one per station)
pub type Notifications = Vec<Notification, MAX_STATIONS>;

/// Requests accepted from the host's command interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Start a station's sequence
    Start(StationId),
    /// Stop one station
    Stop(StationId),
    /// Emergency stop: stop every station
    StopAll,
}

/// Controller coordinating every station
#[derive(Debug, Clone)]
pub struct SequencerController {
    /// One sequencer per station, fixed at construction
    stations: Vec<StationSequencer, MAX_STATIONS>,
}

impl SequencerController {
    /// Create a controller
    ///
    /// Refuses to construct if any table or the station set as a whole is
    /// invalid (duplicate ids, actuators shared between stations).
    pub fn new(configs: &[StationConfig]) -> Result<Self, ConfigError> {
        validate_stations(configs)?;

        let mut stations = Vec::new();
        for config in configs {
            stations
                .push(StationSequencer::new(config.clone()))
                .map_err(|_| ConfigError::TooManyStations)?;
        }

        Ok(Self { stations })
    }

    /// Start a station
    ///
    /// Fails with `UnknownStation` if the id is not configured and passes
    /// `AlreadyRunning` through unchanged. A refused request leaves every
    /// sequencer untouched.
    pub fn request_start<B: ActuatorBank + ?Sized>(
        &mut self,
        id: StationId,
        now_ms: u32,
        bank: &mut B,
    ) -> Result<Notification, SequencerError> {
        let seq = self.find_mut(id).ok_or(SequencerError::UnknownStation)?;
        let event = seq.start(now_ms, bank)?;
        Ok(Notification::new(id, event))
    }

    /// Stop one station
    pub fn request_stop<B: ActuatorBank + ?Sized>(
        &mut self,
        id: StationId,
        bank: &mut B,
    ) -> Result<Notification, SequencerError> {
        let seq = self.find_mut(id).ok_or(SequencerError::UnknownStation)?;
        Ok(Notification::new(id, seq.cancel(bank)))
    }

    /// Emergency stop
    ///
    /// Cancels every station, idle ones included. Always succeeds.
    pub fn request_stop_all<B: ActuatorBank + ?Sized>(&mut self, bank: &mut B) -> Notifications {
        let mut out = Notifications::new();
        for seq in self.stations.iter_mut() {
            let event = seq.cancel(bank);
            let _ = out.push(Notification::new(seq.id(), event));
        }
        out
    }

    /// Advance every station by at most one stage
    pub fn tick_all<B: ActuatorBank + ?Sized>(
        &mut self,
        now_ms: u32,
        bank: &mut B,
    ) -> Notifications {
        let mut out = Notifications::new();
        for seq in self.stations.iter_mut() {
            if let Some(event) = seq.tick(now_ms, bank) {
                let _ = out.push(Notification::new(seq.id(), event));
            }
        }
        out
    }

    /// [`tick_all`](Self::tick_all) using a clock for the timestamp
    pub fn poll<C, B>(&mut self, clock: &C, bank: &mut B) -> Notifications
    where
        C: MonotonicClock + ?Sized,
        B: ActuatorBank + ?Sized,
    {
        self.tick_all(clock.now_ms(), bank)
    }

    /// Execute a host command
    ///
    /// Every outcome, refusals included, comes back as a notification.
    pub fn handle<B: ActuatorBank + ?Sized>(
        &mut self,
        command: Command,
        now_ms: u32,
        bank: &mut B,
    ) -> Notifications {
        let result = match command {
            Command::Start(id) => (id, self.request_start(id, now_ms, bank)),
            Command::Stop(id) => (id, self.request_stop(id, bank)),
            Command::StopAll => return self.request_stop_all(bank),
        };

        let notification = match result {
            (_, Ok(n)) => n,
            (id, Err(SequencerError::ActuatorFault(e))) => {
                Notification::new(id, SequencerEvent::Faulted(e))
            }
            (id, Err(e)) => Notification::rejected(id, e),
        };

        let mut out = Notifications::new();
        let _ = out.push(notification);
        out
    }

    /// Configured station ids, in configuration order
    pub fn station_ids(&self) -> impl Iterator<Item = StationId> + '_ {
        self.stations.iter().map(|s| s.id())
    }

    /// Sequencer for a station
    pub fn sequencer(&self, id: StationId) -> Option<&StationSequencer> {
        self.stations.iter().find(|s| s.id() == id)
    }

    /// All sequencers
    pub fn sequencers(&self) -> &[StationSequencer] {
        &self.stations
    }

    /// Check if any station is running
    pub fn any_running(&self) -> bool {
        self.stations.iter().any(|s| s.is_running())
    }

    fn find_mut(&mut self, id: StationId) -> Option<&mut StationSequencer> {
        self.stations.iter_mut().find(|s| s.id() == id)
    }
}
