//! Inbound host events and how the mod reacts to them.
//!
//! These two event shapes are the entire inbound contract. The embedder's
//! dispatcher calls [`CollectorMod::handle_event`] from the host's single
//! update thread; the mod never subscribes to anything itself.

use anyhow::Result;
use collector_fsm::FsmHandle;

use crate::machines::{self, MachineKind};
use crate::CollectorMod;

#[derive(Debug, Clone)]
pub enum HostEvent {
    /// A machine on some game object just became active.
    FsmEnabled { object_name: String, fsm: FsmHandle },
    /// The host finished switching scenes.
    SceneChanged { to: String },
}

impl CollectorMod {
    pub fn handle_event(&mut self, event: HostEvent) -> Result<()> {
        match event {
            HostEvent::FsmEnabled { object_name, fsm } => {
                if object_name != machines::BOSS_OBJECT {
                    return Ok(());
                }
                let kind = MachineKind::from_fsm_name(&fsm.borrow().fsm_name);
                if let Some(kind) = kind {
                    self.registry_mut().set(kind, fsm);
                    self.log_event(format!("machine.enabled {}", kind.fsm_name()));
                }
                // Re-apply everything, not just the newly registered
                // machine's fields: propagation across machines depends on
                // whichever handles are current.
                self.apply_all()
            }
            HostEvent::SceneChanged { to } => {
                if !machines::is_encounter_scene(&to) {
                    if !self.registry().is_empty() {
                        self.log_event(format!("machines.cleared {to}"));
                    }
                    self.registry_mut().clear_all();
                }
                Ok(())
            }
        }
    }
}
