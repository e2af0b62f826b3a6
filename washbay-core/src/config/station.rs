//! Station configuration and cross-station validation

use heapless::Vec;

use super::ConfigError;
use crate::scheduler::stage::{StageTable, MAX_TABLE_ACTUATORS};
use crate::traits::ActuatorId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum stations per controller
pub const MAX_STATIONS: usize = 8;

/// Station identity as seen by the command interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationId(pub u8);

/// One physical station: its identity and its sequence
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationConfig {
    /// Station identity
    pub id: StationId,
    /// Sequence run on every start
    pub table: StageTable,
}

impl StationConfig {
    /// Create a station config
    pub fn new(id: StationId, table: StageTable) -> Self {
        Self { id, table }
    }
}

/// Validate a full set of stations
///
/// Checks that ids are unique and that no actuator is driven by two
/// stations, since two sequencers would otherwise race on it.
pub fn validate_stations(stations: &[StationConfig]) -> Result<(), ConfigError> {
    if stations.is_empty() {
        return Err(ConfigError::NoStations);
    }
    if stations.len() > MAX_STATIONS {
        return Err(ConfigError::TooManyStations);
    }

    let mut owners: Vec<(ActuatorId, StationId), { MAX_STATIONS * MAX_TABLE_ACTUATORS }> =
        Vec::new();

    for (i, station) in stations.iter().enumerate() {
        if stations[..i].iter().any(|s| s.id == station.id) {
            return Err(ConfigError::DuplicateStation(station.id));
        }

        for &actuator in station.table.actuators() {
            if let Some(&(_, first)) = owners.iter().find(|(a, _)| *a == actuator) {
                return Err(ConfigError::SharedActuator {
                    actuator,
                    first,
                    second: station.id,
                });
            }
            // Capacity is sized for the worst case, so this cannot fail
            let _ = owners.push((actuator, station.id));
        }
    }

    Ok(())
}
