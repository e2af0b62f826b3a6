//! Serial console text protocol
//!
//! Single-byte commands in, one text line per status out:
//!
//! - `'1'..='9'` start the station with that id
//! - `'0'` stops every station
//! - CR and LF are ignored

use core::fmt::Write;

use heapless::String;
use washbay_core::config::StationId;
use washbay_core::scheduler::Command;
use washbay_core::state::{SequencerError, SequencerEvent};

use crate::channels::StatusLine;

/// Longest status line, terminator included
pub const LINE_LEN: usize = 64;

/// Outcome of decoding one received byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Input {
    Command(Command),
    /// Line terminator
    Skip,
    /// Not a command byte
    Unknown(u8),
}

/// Decode one received byte
pub fn parse_byte(byte: u8) -> Input {
    match byte {
        b'0' => Input::Command(Command::StopAll),
        b'1'..=b'9' => Input::Command(Command::Start(StationId(byte - b'0'))),
        b'\r' | b'\n' => Input::Skip,
        other => Input::Unknown(other),
    }
}

/// Render a status line, CRLF terminated
pub fn format_line(status: &StatusLine) -> String<LINE_LEN> {
    let mut line = String::new();

    // Lines are sized for the longest message, a failed write only truncates
    let _ = match status {
        StatusLine::Ready => write!(
            line,
            "Send '1'-'9' to run a wash station, '0' to stop all."
        ),
        StatusLine::EmergencyStop => write!(line, "Emergency STOP received!"),
        StatusLine::AllStopped => write!(line, "All Motors STOPPED"),
        StatusLine::Station(n) => {
            let id = n.station.0;
            match n.event {
                SequencerEvent::Started => write!(line, "Starting Wash Station {}...", id),
                SequencerEvent::StageAdvanced(stage) => {
                    write!(line, "Wash Station {} stage {}", id, stage + 1)
                }
                SequencerEvent::Finished => write!(line, "Wash Station {} DONE", id),
                SequencerEvent::Cancelled => write!(line, "Wash Station {} STOPPED", id),
                SequencerEvent::Rejected(SequencerError::UnknownStation) => {
                    write!(line, "No Wash Station {}", id)
                }
                SequencerEvent::Rejected(SequencerError::AlreadyRunning) => {
                    write!(line, "Wash Station {} already running", id)
                }
                SequencerEvent::Rejected(SequencerError::ActuatorFault(_))
                | SequencerEvent::Faulted(_) => write!(line, "Wash Station {} FAULT, stopped", id),
            }
        }
    };

    let _ = line.push_str("\r\n");
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use washbay_core::state::Notification;

    #[test]
    fn test_parse_bytes() {
        assert_eq!(parse_byte(b'0'), Input::Command(Command::StopAll));
        assert_eq!(
            parse_byte(b'3'),
            Input::Command(Command::Start(StationId(3)))
        );
        assert_eq!(parse_byte(b'\n'), Input::Skip);
        assert_eq!(parse_byte(b'x'), Input::Unknown(b'x'));
    }

    #[test]
    fn test_status_lines() {
        let done = StatusLine::Station(Notification::new(StationId(1), SequencerEvent::Finished));
        assert_eq!(format_line(&done).as_str(), "Wash Station 1 DONE\r\n");

        let started = StatusLine::Station(Notification::new(StationId(2), SequencerEvent::Started));
        assert_eq!(format_line(&started).as_str(), "Starting Wash Station 2...\r\n");

        assert_eq!(
            format_line(&StatusLine::AllStopped).as_str(),
            "All Motors STOPPED\r\n"
        );
    }
}
