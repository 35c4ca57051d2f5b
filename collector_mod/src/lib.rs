//! Tuning mod for the Jar Collector boss encounter.
//!
//! The host game scripts the encounter with four visual-scripting machines;
//! this crate keeps a settings record and synchronizes it into those
//! machines whenever they come alive. The embedder constructs one
//! [`CollectorMod`], feeds it host lifecycle events, and wires the menu
//! adapter into its settings toolkit.

use anyhow::Result;

pub mod cli;
pub mod encounter;
pub mod lifecycle;
pub mod machines;
pub mod menu;
pub mod runtime;
pub mod settings;
pub mod sync;
pub mod targets;

pub use lifecycle::HostEvent;
pub use settings::Settings;

use machines::MachineRegistry;
use targets::FsmTargets;

/// One mod instance: the settings record, the machine registry, and a log
/// of everything the mod did, owned by whoever loaded the mod.
pub struct CollectorMod {
    settings: Settings,
    registry: MachineRegistry,
    events: Vec<String>,
}

impl CollectorMod {
    pub fn new(settings: Settings) -> Self {
        CollectorMod {
            settings,
            registry: MachineRegistry::new(),
            events: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &MachineRegistry {
        &self.registry
    }

    /// Record handed to the host for saving.
    pub fn snapshot(&self) -> Settings {
        self.settings.clone()
    }

    /// Record handed back by the host at load. Blobs are hand-editable, so
    /// every field is clamped back into its menu range.
    pub fn restore(&mut self, mut settings: Settings) {
        settings.clamp_into_ranges();
        self.settings = settings;
        self.log_event("settings.restored");
    }

    /// Applies every settings field onto the currently registered machines.
    pub fn apply_all(&mut self) -> Result<()> {
        let mut targets = FsmTargets::new(&self.registry);
        sync::apply_all(&mut self.settings, &mut targets)?;
        self.log_event("settings.apply");
        Ok(())
    }

    pub fn store_spawn_cutoff(&mut self, value: i64) -> Result<()> {
        self.settings.set_spawn_cutoff(value);
        let mut targets = FsmTargets::new(&self.registry);
        sync::apply_spawn_cutoff(&self.settings, &mut targets)?;
        self.log_event(format!("settings.spawn_cutoff {}", self.settings.spawn_cutoff));
        Ok(())
    }

    pub fn store_min_minions_per_wave(&mut self, value: i64) -> Result<()> {
        self.settings.set_min_minions_per_wave(value);
        let mut targets = FsmTargets::new(&self.registry);
        sync::apply_wave_bounds(&mut self.settings, &mut targets)?;
        self.log_event(format!(
            "settings.wave_bounds {} {}",
            self.settings.min_minions_per_wave, self.settings.max_minions_per_wave
        ));
        Ok(())
    }

    pub fn store_max_minions_per_wave(&mut self, value: i64) -> Result<()> {
        self.settings.set_max_minions_per_wave(value);
        let mut targets = FsmTargets::new(&self.registry);
        sync::apply_wave_bounds(&mut self.settings, &mut targets)?;
        self.log_event(format!(
            "settings.wave_bounds {} {}",
            self.settings.min_minions_per_wave, self.settings.max_minions_per_wave
        ));
        Ok(())
    }

    pub fn store_disable_stagger(&mut self, value: bool) -> Result<()> {
        self.settings.disable_stagger = value;
        let mut targets = FsmTargets::new(&self.registry);
        sync::apply_stagger(&self.settings, &mut targets)?;
        self.log_event(format!("settings.disable_stagger {value}"));
        Ok(())
    }

    pub fn reset_to_defaults(&mut self) -> Result<()> {
        self.settings.reset_to_defaults();
        self.log_event("settings.reset");
        self.apply_all()
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub(crate) fn log_event(&mut self, label: impl Into<String>) {
        self.events.push(label.into());
    }

    pub(crate) fn registry_mut(&mut self) -> &mut MachineRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machines::MachineKind;

    #[test]
    fn store_applies_against_registered_machines_synchronously() {
        let graph = encounter::build();
        let mut collector = CollectorMod::new(Settings::default());
        collector
            .registry_mut()
            .set(MachineKind::Control, graph.control.clone());

        collector.store_spawn_cutoff(10).unwrap();

        assert_eq!(collector.settings().spawn_cutoff, 10);
        assert_eq!(graph.control.borrow().read_int("Enemies Max"), Ok(10));
    }

    #[test]
    fn apply_with_nothing_registered_leaves_the_record_alone() {
        let mut collector = CollectorMod::new(Settings::default());
        collector.apply_all().unwrap();
        assert_eq!(collector.settings(), &Settings::default());
    }

    #[test]
    fn restore_clamps_and_snapshot_round_trips() {
        let mut collector = CollectorMod::new(Settings::default());
        collector.restore(Settings {
            spawn_cutoff: 500,
            min_minions_per_wave: 6,
            max_minions_per_wave: 1,
            disable_stagger: true,
        });

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.spawn_cutoff, 20);
        assert_eq!(snapshot.min_minions_per_wave, 6);
        assert_eq!(snapshot.max_minions_per_wave, 6);
        assert!(snapshot.disable_stagger);
    }

    #[test]
    fn mod_actions_leave_a_readable_event_trail() {
        let mut collector = CollectorMod::new(Settings::default());
        collector.store_min_minions_per_wave(5).unwrap();
        collector.reset_to_defaults().unwrap();

        assert_eq!(
            collector.events(),
            &[
                "settings.wave_bounds 5 5".to_string(),
                "settings.reset".to_string(),
                "settings.apply".to_string(),
            ]
        );
    }
}
