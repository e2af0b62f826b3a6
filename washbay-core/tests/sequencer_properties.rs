//! Timing and cancellation properties over arbitrary stage tables

use std::collections::HashMap;

use proptest::prelude::*;

use washbay_core::config::{StationConfig, StationId};
use washbay_core::scheduler::{SequencerController, Stage, StageTable, StationSequencer};
use washbay_core::state::{SequencerError, SequencerEvent, State};
use washbay_core::traits::{ActuatorBank, ActuatorCommand, ActuatorError, ActuatorId, Direction};

/// Actuator bank backed by a map, logging every write
#[derive(Default)]
struct MapBank {
    outputs: HashMap<ActuatorId, ActuatorCommand>,
    log: Vec<(ActuatorId, ActuatorCommand)>,
}

impl MapBank {
    fn output(&self, id: ActuatorId) -> ActuatorCommand {
        self.outputs.get(&id).copied().unwrap_or_default()
    }
}

impl ActuatorBank for MapBank {
    fn command(&mut self, id: ActuatorId, cmd: ActuatorCommand) -> Result<(), ActuatorError> {
        self.outputs.insert(id, cmd);
        self.log.push((id, cmd));
        Ok(())
    }
}

fn command_strategy() -> impl Strategy<Value = ActuatorCommand> {
    (
        prop_oneof![Just(Direction::Forward), Just(Direction::Reverse)],
        1u16..=255,
    )
        .prop_map(|(direction, speed)| ActuatorCommand::new(direction, speed))
}

/// Stage commanding any subset of actuators `base..base + 4`
fn stage_strategy(base: u8) -> impl Strategy<Value = Stage> {
    (
        1u32..20_000,
        proptest::collection::vec(proptest::option::of(command_strategy()), 4),
    )
        .prop_map(move |(duration, slots)| {
            let commands: Vec<_> = slots
                .into_iter()
                .enumerate()
                .filter_map(|(i, cmd)| cmd.map(|c| (ActuatorId(base + i as u8), c)))
                .collect();
            Stage::new(duration, &commands).unwrap()
        })
}

fn table_strategy(base: u8) -> impl Strategy<Value = StageTable> {
    proptest::collection::vec(stage_strategy(base), 1..8)
        .prop_map(|stages| StageTable::new(&stages).unwrap())
}

fn sequencer(table: &StageTable) -> StationSequencer {
    StationSequencer::new(StationConfig::new(StationId(1), table.clone()))
}

proptest! {
    #[test]
    fn run_applies_every_stage_in_order(table in table_strategy(0), start in any::<u32>()) {
        let mut seq = sequencer(&table);
        let mut bank = MapBank::default();
        prop_assert_eq!(seq.start(start, &mut bank), Ok(SequencerEvent::Started));

        let mut boundary = start;
        for (index, stage) in table.stages().iter().enumerate() {
            boundary = boundary.wrapping_add(stage.duration_ms());

            let writes = bank.log.len();
            prop_assert_eq!(seq.tick(boundary.wrapping_sub(1), &mut bank), None);
            prop_assert_eq!(bank.log.len(), writes);

            let expected = if index + 1 < table.len() {
                SequencerEvent::StageAdvanced((index + 1) as u8)
            } else {
                SequencerEvent::Finished
            };
            prop_assert_eq!(seq.tick(boundary, &mut bank), Some(expected));
        }

        prop_assert_eq!(boundary, start.wrapping_add(table.total_duration_ms()));
        prop_assert_eq!(seq.state(), State::Idle);

        let mut expected: Vec<_> = table
            .stages()
            .iter()
            .flat_map(|s| s.commands().iter().copied())
            .collect();
        expected.extend(table.actuators().iter().map(|&id| (id, ActuatorCommand::idle())));
        prop_assert_eq!(&bank.log, &expected);
    }

    #[test]
    fn ticks_inside_a_stage_are_noops(
        table in table_strategy(0),
        start in any::<u32>(),
        offsets in proptest::collection::vec(any::<u32>(), 1..16),
    ) {
        let mut seq = sequencer(&table);
        let mut bank = MapBank::default();
        seq.start(start, &mut bank).unwrap();

        let duration = table.stages()[0].duration_ms();
        let writes = bank.log.len();
        for offset in offsets {
            let now = start.wrapping_add(offset % duration);
            prop_assert_eq!(seq.tick(now, &mut bank), None);
        }

        prop_assert_eq!(bank.log.len(), writes);
        prop_assert_eq!(seq.current_stage(), Some(0));
    }

    #[test]
    fn ticks_behind_the_stage_start_are_noops(
        table in table_strategy(0),
        start in any::<u32>(),
        lag in 1u32..1_000_000,
    ) {
        let mut seq = sequencer(&table);
        let mut bank = MapBank::default();
        seq.start(start, &mut bank).unwrap();

        let writes = bank.log.len();
        prop_assert_eq!(seq.tick(start.wrapping_sub(lag), &mut bank), None);
        prop_assert_eq!(bank.log.len(), writes);
        prop_assert_eq!(seq.current_stage(), Some(0));
    }

    #[test]
    fn cancel_idles_every_actuator(
        table in table_strategy(0),
        start in any::<u32>(),
        cancel_after in 0u32..150_000,
        period in 1u32..2_000,
    ) {
        let mut seq = sequencer(&table);
        let mut bank = MapBank::default();
        seq.start(start, &mut bank).unwrap();

        let mut elapsed = 0;
        while elapsed < cancel_after {
            seq.tick(start.wrapping_add(elapsed), &mut bank);
            elapsed += period;
        }

        prop_assert_eq!(seq.cancel(&mut bank), SequencerEvent::Cancelled);
        prop_assert_eq!(seq.state(), State::Idle);
        for &id in table.actuators() {
            prop_assert!(bank.output(id).is_idle());
        }

        let writes = bank.log.len();
        for later in [1u32, 10_000, 1_000_000] {
            prop_assert_eq!(seq.tick(start.wrapping_add(elapsed + later), &mut bank), None);
        }
        prop_assert_eq!(bank.log.len(), writes);
    }

    #[test]
    fn start_while_running_changes_nothing(
        table in table_strategy(0),
        into_run in 0u32..100_000,
    ) {
        let mut ctrl =
            SequencerController::new(&[StationConfig::new(StationId(1), table.clone())]).unwrap();
        let mut bank = MapBank::default();
        ctrl.request_start(StationId(1), 0, &mut bank).unwrap();

        let mut now = 0;
        while now < into_run {
            now += 500;
            ctrl.tick_all(now, &mut bank);
        }
        prop_assume!(ctrl.any_running());

        let seq = ctrl.sequencer(StationId(1)).unwrap();
        let stage = seq.current_stage();
        let started = seq.stage_started_ms();
        let outputs = bank.outputs.clone();
        let writes = bank.log.len();

        prop_assert_eq!(
            ctrl.request_start(StationId(1), now, &mut bank),
            Err(SequencerError::AlreadyRunning)
        );

        let seq = ctrl.sequencer(StationId(1)).unwrap();
        prop_assert_eq!(seq.current_stage(), stage);
        prop_assert_eq!(seq.stage_started_ms(), started);
        prop_assert_eq!(&bank.outputs, &outputs);
        prop_assert_eq!(bank.log.len(), writes);
    }

    #[test]
    fn stop_all_on_idle_controller_only_idles(
        first in table_strategy(0),
        second in table_strategy(4),
    ) {
        let mut ctrl = SequencerController::new(&[
            StationConfig::new(StationId(1), first),
            StationConfig::new(StationId(2), second),
        ])
        .unwrap();
        let mut bank = MapBank::default();

        let events = ctrl.request_stop_all(&mut bank);
        prop_assert_eq!(events.len(), 2);
        prop_assert!(events.iter().all(|n| n.event == SequencerEvent::Cancelled));
        prop_assert!(bank.log.iter().all(|(_, cmd)| cmd.is_idle()));
        prop_assert!(!ctrl.any_running());
    }

    #[test]
    fn stations_run_independently(
        first in table_strategy(0),
        second in table_strategy(4),
        offset in 0u32..10_000,
    ) {
        let mut ctrl = SequencerController::new(&[
            StationConfig::new(StationId(1), first.clone()),
            StationConfig::new(StationId(2), second.clone()),
        ])
        .unwrap();
        let mut bank = MapBank::default();

        ctrl.request_start(StationId(1), 0, &mut bank).unwrap();
        ctrl.request_start(StationId(2), offset, &mut bank).unwrap();
        ctrl.request_stop(StationId(1), &mut bank).unwrap();

        for &id in first.actuators() {
            prop_assert!(bank.output(id).is_idle());
        }
        prop_assert!(ctrl.sequencer(StationId(2)).unwrap().is_running());
        for &(id, cmd) in second.stages()[0].commands() {
            prop_assert_eq!(bank.output(id), cmd);
        }
    }
}
