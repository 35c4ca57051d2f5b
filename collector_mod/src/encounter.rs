//! Simulated Jar Collector object graph.
//!
//! Rebuilds the four encounter machines with the states, action lists, and
//! variables the synchronizer addresses, so the demo binary and the tests
//! can drive the mod without the host game. Action lists around the touched
//! slots are padded with the host's own opaque steps so indices line up with
//! the live machines.

use anyhow::{Context, Result};
use collector_fsm::{Action, EventTarget, Fsm, FsmHandle};

use crate::machines::{MachineKind, BOSS_OBJECT};

pub struct EncounterGraph {
    pub control: FsmHandle,
    pub phase_control: FsmHandle,
    pub damage_control: FsmHandle,
    pub stun_control: FsmHandle,
}

impl EncounterGraph {
    pub fn handle(&self, kind: MachineKind) -> FsmHandle {
        match kind {
            MachineKind::Control => self.control.clone(),
            MachineKind::PhaseControl => self.phase_control.clone(),
            MachineKind::DamageControl => self.damage_control.clone(),
            MachineKind::StunControl => self.stun_control.clone(),
        }
    }

    pub fn by_fsm_name(&self, name: &str) -> Option<FsmHandle> {
        MachineKind::from_fsm_name(name).map(|kind| self.handle(kind))
    }

    /// Host-side progression: the fight reaches (or leaves) phase 2.
    pub fn set_phase_two(&self, started: bool) -> Result<()> {
        self.damage_control
            .borrow_mut()
            .write_bool("Phase 2", started)
            .context("flipping the Damage Control phase flag")
    }
}

pub fn build() -> EncounterGraph {
    EncounterGraph {
        control: control().into_handle(),
        phase_control: phase_control().into_handle(),
        damage_control: damage_control().into_handle(),
        stun_control: stun_control().into_handle(),
    }
}

fn control() -> Fsm {
    let mut fsm = Fsm::new(BOSS_OBJECT, "Control");
    fsm.add_state("Init", vec![Action::opaque("Wait")]);
    fsm.add_state(
        "Summon?",
        vec![
            Action::opaque("Trigger2dEvent"),
            Action::IntCompare {
                variable: "Enemies".to_string(),
                compare_to: 4,
            },
            Action::opaque("SendRandomEventV3"),
        ],
    );
    fsm.add_state(
        "Spawn",
        vec![
            Action::opaque("FlingObjectsFromGlobalPool"),
            Action::opaque("Wait"),
        ],
    );
    fsm.define_int("Enemies", 0);
    fsm.define_int("Enemies Max", 4);
    fsm.define_int("Spawn Min", 2);
    fsm.define_int("Spawn Max", 3);
    fsm
}

fn phase_control() -> Fsm {
    let mut fsm = Fsm::new(BOSS_OBJECT, "Phase Control");
    fsm.add_state("Init", vec![Action::opaque("Wait")]);
    fsm.add_state(
        "Phase 2",
        vec![
            Action::SetInt {
                target_variable: "Spawn Min".to_string(),
                value: 2,
            },
            Action::SetInt {
                target_variable: "Spawn Max".to_string(),
                value: 3,
            },
            Action::opaque("SendEventByName"),
        ],
    );
    fsm
}

fn damage_control() -> Fsm {
    let mut fsm = Fsm::new(BOSS_OBJECT, "Damage Control");
    fsm.add_state(
        "Check Phase",
        vec![Action::opaque("IntCompare"), Action::opaque("SetBoolValue")],
    );
    fsm.define_bool("Phase 2", false);
    fsm
}

fn stun_control() -> Fsm {
    let mut fsm = Fsm::new(BOSS_OBJECT, "Stun Control");
    fsm.add_state("Idle", vec![Action::opaque("Wait")]);
    fsm.add_state(
        "Stun",
        vec![
            Action::opaque("SetCollider"),
            Action::opaque("Tk2dPlayAnimation"),
            Action::SendEvent {
                target: EventTarget::SelfMachine,
                event: "STUN".to_string(),
                delay: 0.0,
                every_frame: false,
            },
            Action::opaque("Wait"),
            Action::opaque("SendEventByName"),
        ],
    );
    fsm
}
