//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use washbay_core::scheduler::Command;
use washbay_core::state::Notification;

/// Channel capacity for console commands
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Channel capacity for status lines
const STATUS_CHANNEL_SIZE: usize = 16;

/// Something worth a line on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum StatusLine {
    /// Startup banner with usage hint
    Ready,
    /// Emergency stop requested
    EmergencyStop,
    /// Emergency stop completed
    AllStopped,
    /// Event reported by the controller
    Station(Notification),
}

/// Commands parsed from the serial console
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Status lines waiting to be written to the console
pub static STATUS_CHANNEL: Channel<CriticalSectionRawMutex, StatusLine, STATUS_CHANNEL_SIZE> =
    Channel::new();
