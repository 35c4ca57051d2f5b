//! Capability seams between the synchronizer and the host machines.
//!
//! The synchronizer never touches a machine directly; it talks to these
//! narrow traits. [`FsmTargets`] is the live implementation doing the
//! name-addressed writes against whatever the registry currently holds, and
//! [`RecordingTargets`] is the double that records every write for tests.

use anyhow::Result;
use collector_fsm::{Action, EventTarget, FsmError};

use crate::machines::{MachineKind, MachineRegistry};

const SUMMON_STATE: &str = "Summon?";
const SUMMON_THRESHOLD_INDEX: usize = 1;
const ENEMIES_MAX_VAR: &str = "Enemies Max";

const PHASE_STATE: &str = "Phase 2";
const WAVE_MIN_INDEX: usize = 0;
const WAVE_MAX_INDEX: usize = 1;
const PHASE_FLAG_VAR: &str = "Phase 2";
const SPAWN_MIN_VAR: &str = "Spawn Min";
const SPAWN_MAX_VAR: &str = "Spawn Max";

const STUN_STATE: &str = "Stun";
const STAGGER_EVENT: &str = "STUN";
const STAGGER_PRESENT_LEN: usize = 5;
const STAGGER_ABSENT_LEN: usize = 4;
const STAGGER_INSERT_INDEX: usize = 1;

/// Receives the concurrent-enemy cutoff.
pub trait SpawnLimitTarget {
    fn set_spawn_cutoff(&mut self, cutoff: i64) -> Result<()>;
}

/// Receives the minions-per-wave pair.
pub trait WaveConfigTarget {
    /// Writes the pair into the wave-configuration step. Returns false when
    /// no step was present to receive it.
    fn set_wave_bounds(&mut self, min: i64, max: i64) -> Result<bool>;

    /// Whether the fight has progressed past its first phase. The live
    /// spawn bounds are only consulted by the host from phase 2 on.
    fn phase_two_started(&self) -> bool;

    /// Writes the pair into the bounds the live encounter reads.
    fn set_live_spawn_bounds(&mut self, min: i64, max: i64) -> Result<()>;
}

/// Receives the stagger on/off toggle.
pub trait StunBehaviorTarget {
    fn set_stagger_enabled(&mut self, enabled: bool) -> Result<()>;
}

pub trait EncounterTargets: SpawnLimitTarget + WaveConfigTarget + StunBehaviorTarget {}

impl<T: SpawnLimitTarget + WaveConfigTarget + StunBehaviorTarget> EncounterTargets for T {}

/// Live implementation over the machine registry.
///
/// Every write path is a silent no-op while its machine is absent; that is
/// the expected state whenever the player is outside the encounter. Once a
/// machine is registered, its inner states, actions, and variables are
/// assumed present, and a miss propagates as an error.
pub struct FsmTargets<'a> {
    registry: &'a MachineRegistry,
}

impl<'a> FsmTargets<'a> {
    pub fn new(registry: &'a MachineRegistry) -> Self {
        FsmTargets { registry }
    }
}

impl SpawnLimitTarget for FsmTargets<'_> {
    fn set_spawn_cutoff(&mut self, cutoff: i64) -> Result<()> {
        let Some(control) = self.registry.get(MachineKind::Control) else {
            return Ok(());
        };
        let mut fsm = control.borrow_mut();
        match fsm.action_mut(SUMMON_STATE, SUMMON_THRESHOLD_INDEX)? {
            Action::IntCompare { compare_to, .. } => *compare_to = cutoff,
            other => {
                return Err(kind_mismatch(
                    MachineKind::Control,
                    SUMMON_STATE,
                    SUMMON_THRESHOLD_INDEX,
                    "int_compare",
                    other.kind_name(),
                ));
            }
        }
        fsm.write_int(ENEMIES_MAX_VAR, cutoff)?;
        Ok(())
    }
}

impl WaveConfigTarget for FsmTargets<'_> {
    fn set_wave_bounds(&mut self, min: i64, max: i64) -> Result<bool> {
        let Some(phase_control) = self.registry.get(MachineKind::PhaseControl) else {
            return Ok(false);
        };
        let mut fsm = phase_control.borrow_mut();
        for (index, bound) in [(WAVE_MIN_INDEX, min), (WAVE_MAX_INDEX, max)] {
            match fsm.action_mut(PHASE_STATE, index)? {
                Action::SetInt { value, .. } => *value = bound,
                other => {
                    return Err(kind_mismatch(
                        MachineKind::PhaseControl,
                        PHASE_STATE,
                        index,
                        "set_int",
                        other.kind_name(),
                    ));
                }
            }
        }
        Ok(true)
    }

    fn phase_two_started(&self) -> bool {
        match self.registry.get(MachineKind::DamageControl) {
            // A flag the host has not defined yet reads as not started.
            Some(damage_control) => damage_control
                .borrow()
                .read_bool(PHASE_FLAG_VAR)
                .unwrap_or(false),
            None => false,
        }
    }

    fn set_live_spawn_bounds(&mut self, min: i64, max: i64) -> Result<()> {
        let Some(control) = self.registry.get(MachineKind::Control) else {
            return Ok(());
        };
        let mut fsm = control.borrow_mut();
        fsm.write_int(SPAWN_MIN_VAR, min)?;
        fsm.write_int(SPAWN_MAX_VAR, max)?;
        Ok(())
    }
}

impl StunBehaviorTarget for FsmTargets<'_> {
    fn set_stagger_enabled(&mut self, enabled: bool) -> Result<()> {
        let Some(stun_control) = self.registry.get(MachineKind::StunControl) else {
            return Ok(());
        };
        let mut fsm = stun_control.borrow_mut();

        // The machine exposes no flag for this behavior; presence of the
        // stagger trigger is inferred from the action count alone (5 with,
        // 4 without). Assumption: nothing else ever resizes this list.
        let count = fsm.action_count(STUN_STATE)?;
        if !enabled && count == STAGGER_PRESENT_LEN {
            let index = fsm
                .state(STUN_STATE)?
                .actions
                .iter()
                .position(is_stagger_trigger)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "state {STUN_STATE:?} holds {count} actions but no {STAGGER_EVENT} trigger"
                    )
                })?;
            fsm.remove_action(STUN_STATE, index)?;
        } else if enabled && count == STAGGER_ABSENT_LEN {
            fsm.insert_action(STUN_STATE, STAGGER_INSERT_INDEX, stagger_trigger())?;
        }
        Ok(())
    }
}

fn is_stagger_trigger(action: &Action) -> bool {
    matches!(action, Action::SendEvent { event, .. } if event == STAGGER_EVENT)
}

fn stagger_trigger() -> Action {
    Action::SendEvent {
        target: EventTarget::SelfMachine,
        event: STAGGER_EVENT.to_string(),
        delay: 0.0,
        every_frame: false,
    }
}

fn kind_mismatch(
    machine: MachineKind,
    state: &str,
    index: usize,
    expected: &'static str,
    found: &'static str,
) -> anyhow::Error {
    FsmError::ActionKindMismatch {
        machine: machine.fsm_name().to_string(),
        state: state.to_string(),
        index,
        expected,
        found,
    }
    .into()
}

/// Write recorded by [`RecordingTargets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetWrite {
    SpawnCutoff { cutoff: i64 },
    WaveBounds { min: i64, max: i64 },
    LiveSpawnBounds { min: i64, max: i64 },
    StaggerEnabled { enabled: bool },
}

/// Test double standing in for the live machines.
#[derive(Debug, Default)]
pub struct RecordingTargets {
    phase_two: bool,
    wave_step_present: bool,
    writes: Vec<TargetWrite>,
}

impl RecordingTargets {
    pub fn new() -> Self {
        RecordingTargets {
            phase_two: false,
            wave_step_present: true,
            writes: Vec::new(),
        }
    }

    pub fn with_phase_two(started: bool) -> Self {
        let mut targets = Self::new();
        targets.phase_two = started;
        targets
    }

    pub fn without_wave_step(mut self) -> Self {
        self.wave_step_present = false;
        self
    }

    pub fn writes(&self) -> &[TargetWrite] {
        &self.writes
    }
}

impl SpawnLimitTarget for RecordingTargets {
    fn set_spawn_cutoff(&mut self, cutoff: i64) -> Result<()> {
        self.writes.push(TargetWrite::SpawnCutoff { cutoff });
        Ok(())
    }
}

impl WaveConfigTarget for RecordingTargets {
    fn set_wave_bounds(&mut self, min: i64, max: i64) -> Result<bool> {
        if !self.wave_step_present {
            return Ok(false);
        }
        self.writes.push(TargetWrite::WaveBounds { min, max });
        Ok(true)
    }

    fn phase_two_started(&self) -> bool {
        self.phase_two
    }

    fn set_live_spawn_bounds(&mut self, min: i64, max: i64) -> Result<()> {
        self.writes.push(TargetWrite::LiveSpawnBounds { min, max });
        Ok(())
    }
}

impl StunBehaviorTarget for RecordingTargets {
    fn set_stagger_enabled(&mut self, enabled: bool) -> Result<()> {
        self.writes.push(TargetWrite::StaggerEnabled { enabled });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encounter;
    use crate::machines::MachineRegistry;
    use collector_fsm::Fsm;

    fn full_registry() -> MachineRegistry {
        let graph = encounter::build();
        let mut registry = MachineRegistry::new();
        registry.set(MachineKind::Control, graph.control.clone());
        registry.set(MachineKind::PhaseControl, graph.phase_control.clone());
        registry.set(MachineKind::DamageControl, graph.damage_control.clone());
        registry.set(MachineKind::StunControl, graph.stun_control.clone());
        registry
    }

    #[test]
    fn spawn_cutoff_reaches_threshold_and_variable() {
        let registry = full_registry();
        FsmTargets::new(&registry).set_spawn_cutoff(10).unwrap();

        let control = registry.get(MachineKind::Control).unwrap();
        let fsm = control.borrow();
        assert_eq!(
            fsm.action(SUMMON_STATE, SUMMON_THRESHOLD_INDEX).unwrap(),
            &Action::IntCompare {
                variable: "Enemies".to_string(),
                compare_to: 10,
            }
        );
        assert_eq!(fsm.read_int(ENEMIES_MAX_VAR), Ok(10));
    }

    #[test]
    fn wave_bounds_fill_the_ordered_slots() {
        let registry = full_registry();
        let wrote = FsmTargets::new(&registry).set_wave_bounds(5, 9).unwrap();
        assert!(wrote);

        let phase_control = registry.get(MachineKind::PhaseControl).unwrap();
        let fsm = phase_control.borrow();
        let min = fsm.action(PHASE_STATE, WAVE_MIN_INDEX).unwrap();
        let max = fsm.action(PHASE_STATE, WAVE_MAX_INDEX).unwrap();
        assert!(matches!(min, Action::SetInt { value: 5, .. }));
        assert!(matches!(max, Action::SetInt { value: 9, .. }));
    }

    #[test]
    fn every_write_is_a_no_op_without_machines() {
        let registry = MachineRegistry::new();
        let mut targets = FsmTargets::new(&registry);
        targets.set_spawn_cutoff(10).unwrap();
        assert!(!targets.set_wave_bounds(5, 9).unwrap());
        targets.set_live_spawn_bounds(5, 9).unwrap();
        targets.set_stagger_enabled(false).unwrap();
        assert!(!targets.phase_two_started());
    }

    #[test]
    fn phase_two_reads_the_damage_control_flag() {
        let registry = full_registry();
        assert!(!FsmTargets::new(&registry).phase_two_started());

        registry
            .get(MachineKind::DamageControl)
            .unwrap()
            .borrow_mut()
            .write_bool(PHASE_FLAG_VAR, true)
            .unwrap();
        assert!(FsmTargets::new(&registry).phase_two_started());
    }

    #[test]
    fn stagger_toggle_is_idempotent_over_repeated_calls() {
        let registry = full_registry();
        let stun_control = registry.get(MachineKind::StunControl).unwrap();

        let mut targets = FsmTargets::new(&registry);
        targets.set_stagger_enabled(false).unwrap();
        assert_eq!(stun_control.borrow().action_count(STUN_STATE).unwrap(), 4);
        targets.set_stagger_enabled(false).unwrap();
        assert_eq!(stun_control.borrow().action_count(STUN_STATE).unwrap(), 4);

        targets.set_stagger_enabled(true).unwrap();
        assert_eq!(stun_control.borrow().action_count(STUN_STATE).unwrap(), 5);
        targets.set_stagger_enabled(true).unwrap();
        assert_eq!(stun_control.borrow().action_count(STUN_STATE).unwrap(), 5);
    }

    #[test]
    fn stagger_removal_finds_the_trigger_after_a_toggle_cycle() {
        let registry = full_registry();
        let stun_control = registry.get(MachineKind::StunControl).unwrap();

        let mut targets = FsmTargets::new(&registry);
        // A disable/enable cycle moves the trigger to the insert slot.
        targets.set_stagger_enabled(false).unwrap();
        targets.set_stagger_enabled(true).unwrap();
        assert!(is_stagger_trigger(
            stun_control
                .borrow()
                .action(STUN_STATE, STAGGER_INSERT_INDEX)
                .unwrap()
        ));

        targets.set_stagger_enabled(false).unwrap();
        let fsm = stun_control.borrow();
        assert_eq!(fsm.action_count(STUN_STATE).unwrap(), 4);
        assert!(!fsm
            .state(STUN_STATE)
            .unwrap()
            .actions
            .iter()
            .any(is_stagger_trigger));
    }

    #[test]
    fn misshaped_threshold_action_is_an_error() {
        let mut control = Fsm::new("Jar Collector", "Control");
        control.add_state(
            SUMMON_STATE,
            vec![Action::opaque("Wait"), Action::opaque("Wait")],
        );
        control.define_int(ENEMIES_MAX_VAR, 4);

        let mut registry = MachineRegistry::new();
        registry.set(MachineKind::Control, control.into_handle());

        let err = FsmTargets::new(&registry).set_spawn_cutoff(10).unwrap_err();
        assert!(err.to_string().contains("expected int_compare"));
    }

    #[test]
    fn recording_targets_capture_the_write_sequence() {
        let mut targets = RecordingTargets::with_phase_two(true);
        targets.set_spawn_cutoff(10).unwrap();
        assert!(targets.set_wave_bounds(5, 9).unwrap());
        targets.set_live_spawn_bounds(5, 9).unwrap();
        targets.set_stagger_enabled(true).unwrap();

        assert_eq!(
            targets.writes(),
            &[
                TargetWrite::SpawnCutoff { cutoff: 10 },
                TargetWrite::WaveBounds { min: 5, max: 9 },
                TargetWrite::LiveSpawnBounds { min: 5, max: 9 },
                TargetWrite::StaggerEnabled { enabled: true },
            ]
        );
    }
}
