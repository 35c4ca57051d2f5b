//! Holder for the encounter's live machine handles.
//!
//! The registry is a pure holder: a slot per named machine, populated while
//! the player is inside the encounter and emptied on the way out. It does no
//! validation beyond name identity.

use std::collections::BTreeMap;

use collector_fsm::FsmHandle;

/// Game object that owns all four machines.
pub const BOSS_OBJECT: &str = "Jar Collector";

/// Scenes in which the encounter's machines stay alive.
pub const ENCOUNTER_SCENES: [&str; 2] = ["GG_Collector", "GG_Collector_V"];

pub fn is_encounter_scene(scene: &str) -> bool {
    ENCOUNTER_SCENES.contains(&scene)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MachineKind {
    Control,
    PhaseControl,
    DamageControl,
    StunControl,
}

impl MachineKind {
    pub const ALL: [MachineKind; 4] = [
        MachineKind::Control,
        MachineKind::PhaseControl,
        MachineKind::DamageControl,
        MachineKind::StunControl,
    ];

    /// Exact machine name as the host reports it.
    pub fn fsm_name(self) -> &'static str {
        match self {
            MachineKind::Control => "Control",
            MachineKind::PhaseControl => "Phase Control",
            MachineKind::DamageControl => "Damage Control",
            MachineKind::StunControl => "Stun Control",
        }
    }

    pub fn from_fsm_name(name: &str) -> Option<Self> {
        MachineKind::ALL.into_iter().find(|kind| kind.fsm_name() == name)
    }
}

#[derive(Debug, Default)]
pub struct MachineRegistry {
    slots: BTreeMap<MachineKind, FsmHandle>,
}

impl MachineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, kind: MachineKind, handle: FsmHandle) {
        self.slots.insert(kind, handle);
    }

    pub fn get(&self, kind: MachineKind) -> Option<FsmHandle> {
        self.slots.get(&kind).cloned()
    }

    pub fn clear_all(&mut self) {
        self.slots.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn registered(&self) -> impl Iterator<Item = MachineKind> + '_ {
        self.slots.keys().copied()
    }
}
