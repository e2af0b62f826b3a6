//! Decoding stage tables from the wire
#![cfg(feature = "serde")]

use serde::Serialize;

use washbay_core::config::{ConfigError, StationConfig, StationId, WashRecipe};
use washbay_core::scheduler::{SequencerController, StageTable};
use washbay_core::state::SequencerEvent;
use washbay_core::traits::{ActuatorBank, ActuatorCommand, ActuatorError, ActuatorId};

/// Stage as it is laid out on the wire
#[derive(Serialize)]
struct RawStage {
    commands: Vec<(ActuatorId, ActuatorCommand)>,
    duration_ms: u32,
}

/// Table as it is laid out on the wire
#[derive(Serialize)]
struct RawTable {
    stages: Vec<RawStage>,
}

/// Table carrying a stale actuator list next to its stages
#[derive(Serialize)]
struct RawTableWithActuators {
    stages: Vec<RawStage>,
    actuators: Vec<ActuatorId>,
}

#[derive(Default)]
struct Outputs([ActuatorCommand; 4]);

impl ActuatorBank for Outputs {
    fn command(&mut self, id: ActuatorId, cmd: ActuatorCommand) -> Result<(), ActuatorError> {
        self.0[id.0 as usize] = cmd;
        Ok(())
    }
}

fn decode(raw: &impl Serialize) -> postcard::Result<StageTable> {
    let bytes = postcard::to_allocvec(raw).unwrap();
    postcard::from_bytes(&bytes)
}

fn pump_only(duration_ms: u32) -> RawStage {
    RawStage {
        commands: vec![(ActuatorId(0), ActuatorCommand::forward(170))],
        duration_ms,
    }
}

#[test]
fn test_table_survives_encoding() {
    let table = WashRecipe::new(ActuatorId(0), ActuatorId(1))
        .stage_table()
        .unwrap();
    let bytes = postcard::to_allocvec(&table).unwrap();
    let decoded: StageTable = postcard::from_bytes(&bytes).unwrap();

    assert_eq!(decoded, table);
    assert_eq!(decoded.actuators(), &[ActuatorId(0), ActuatorId(1)]);
}

#[test]
fn test_empty_table_rejected() {
    assert!(decode(&RawTable { stages: vec![] }).is_err());
}

#[test]
fn test_zero_duration_rejected() {
    let raw = RawTable {
        stages: vec![pump_only(5_000), pump_only(0)],
    };
    assert!(decode(&raw).is_err());
}

#[test]
fn test_duplicate_actuator_in_stage_rejected() {
    let raw = RawTable {
        stages: vec![RawStage {
            commands: vec![
                (ActuatorId(0), ActuatorCommand::forward(170)),
                (ActuatorId(0), ActuatorCommand::reverse(170)),
            ],
            duration_ms: 1_000,
        }],
    };
    assert!(decode(&raw).is_err());
}

#[test]
fn test_actuator_list_rebuilt_from_stages() {
    let table = decode(&RawTable {
        stages: vec![pump_only(5_000)],
    })
    .unwrap();
    assert_eq!(table.actuators(), &[ActuatorId(0)]);

    let mut ctrl = SequencerController::new(&[StationConfig::new(StationId(1), table)]).unwrap();
    let mut outputs = Outputs::default();
    ctrl.request_start(StationId(1), 0, &mut outputs).unwrap();
    assert_eq!(outputs.0[0], ActuatorCommand::forward(170));

    let events = ctrl.request_stop_all(&mut outputs);
    assert_eq!(events[0].event, SequencerEvent::Cancelled);
    assert!(outputs.0[0].is_idle());
}

#[test]
fn test_trailing_actuator_list_is_not_trusted() {
    // An older encoding with an empty actuator list after the stages
    let raw = RawTableWithActuators {
        stages: vec![pump_only(5_000)],
        actuators: vec![],
    };
    let bytes = postcard::to_allocvec(&raw).unwrap();
    let table: StageTable = postcard::from_bytes(&bytes).unwrap();
    assert_eq!(table.actuators(), &[ActuatorId(0)]);
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::ZeroDuration { stage: 1 };
    assert_eq!(err.to_string(), "stage 1 has zero duration");
}
