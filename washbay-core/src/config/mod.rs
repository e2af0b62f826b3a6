//! Configuration types
//!
//! Static station configuration, resolved once at startup. The controller
//! refuses to start if any of it is structurally invalid.

pub mod recipe;
pub mod station;

pub use recipe::{
    WashRecipe, DEFAULT_PUMP_SPEED, DEFAULT_WASHER_SPEED, PUMP_STAGE_MS, WASH_STAGE_MS,
};
pub use station::{validate_stations, StationConfig, StationId, MAX_STATIONS};

use crate::traits::ActuatorId;

/// Configuration errors
///
/// Detected while building stage tables or constructing the controller.
/// Any of these is fatal to initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A stage table has no stages
    EmptyStageTable,
    /// A stage has a zero duration
    ZeroDuration {
        /// Offending stage index
        stage: u8,
    },
    /// A stage is longer than the clock can measure
    DurationTooLong {
        /// Offending stage index
        stage: u8,
    },
    /// More stages than a table can hold
    TooManyStages,
    /// More commands than a stage can hold
    TooManyCommands,
    /// More distinct actuators than a table can hold
    TooManyActuators,
    /// The same actuator is commanded twice within one stage
    DuplicateActuatorInStage(ActuatorId),
    /// No stations configured
    NoStations,
    /// More stations than the controller can hold
    TooManyStations,
    /// Two stations share an id
    DuplicateStation(StationId),
    /// One actuator is referenced by two stations
    SharedActuator {
        /// Actuator referenced twice
        actuator: ActuatorId,
        /// Station that claimed it first
        first: StationId,
        /// Station that claimed it again
        second: StationId,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyStageTable => write!(f, "stage table is empty"),
            Self::ZeroDuration { stage } => write!(f, "stage {} has zero duration", stage),
            Self::DurationTooLong { stage } => write!(f, "stage {} is too long", stage),
            Self::TooManyStages => write!(f, "too many stages"),
            Self::TooManyCommands => write!(f, "too many commands in one stage"),
            Self::TooManyActuators => write!(f, "too many actuators in one table"),
            Self::DuplicateActuatorInStage(id) => {
                write!(f, "actuator {} commanded twice in one stage", id.0)
            }
            Self::NoStations => write!(f, "no stations configured"),
            Self::TooManyStations => write!(f, "too many stations"),
            Self::DuplicateStation(id) => write!(f, "station {} defined twice", id.0),
            Self::SharedActuator {
                actuator,
                first,
                second,
            } => write!(
                f,
                "actuator {} used by stations {} and {}",
                actuator.0, first.0, second.0
            ),
        }
    }
}
