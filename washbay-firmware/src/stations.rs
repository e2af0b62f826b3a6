//! Station recipes generated from stations.toml

use heapless::Vec;
use washbay_core::config::{ConfigError, StationConfig, StationId, WashRecipe, MAX_STATIONS};
use washbay_core::traits::ActuatorId;

include!(concat!(env!("OUT_DIR"), "/stations.rs"));

/// Expand every recipe into a station config
pub fn load() -> Result<Vec<StationConfig, MAX_STATIONS>, ConfigError> {
    let mut stations = Vec::new();
    for (id, recipe) in STATION_RECIPES {
        let table = recipe.stage_table()?;
        stations
            .push(StationConfig::new(*id, table))
            .map_err(|_| ConfigError::TooManyStations)?;
    }
    Ok(stations)
}
