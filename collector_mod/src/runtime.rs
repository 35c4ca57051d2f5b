//! Scenario replay driver behind the demo binary.
//!
//! Builds the simulated encounter graph, feeds a step list through the
//! lifecycle and menu adapters, and writes the resulting event log and
//! machine snapshot as JSON reports.

use std::collections::BTreeMap;
use std::fs;

use anyhow::{bail, Context, Result};
use collector_fsm::Fsm;
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::encounter::{self, EncounterGraph};
use crate::machines::{MachineKind, BOSS_OBJECT};
use crate::menu::{self, EntryId, MenuValue};
use crate::{CollectorMod, HostEvent, Settings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// The host switches to `scene`.
    EnterScene { scene: String },
    /// One of the boss machines becomes active.
    EnableMachine { machine: String },
    /// Host-side fight progression: the phase 2 flag flips.
    SetPhaseTwo { started: bool },
    /// The player drags a slider; `entry` is the toolkit widget id.
    StoreSlider { entry: String, value: i64 },
    /// The player flips the stagger option.
    StoreToggle { entry: String, value: bool },
    /// The player presses the reset button.
    ResetMenu,
}

/// The sequence replayed when no scenario file is given: enter the arena,
/// bring every machine up, retune mid-fight, then leave and re-enter.
pub fn builtin_demo() -> Vec<ScenarioStep> {
    let mut steps = vec![ScenarioStep::EnterScene {
        scene: "GG_Collector".to_string(),
    }];
    for kind in MachineKind::ALL {
        steps.push(ScenarioStep::EnableMachine {
            machine: kind.fsm_name().to_string(),
        });
    }
    steps.extend([
        ScenarioStep::StoreSlider {
            entry: "spawnCutoff".to_string(),
            value: 10,
        },
        ScenarioStep::StoreSlider {
            entry: "minNumMinionsPerWave".to_string(),
            value: 5,
        },
        ScenarioStep::SetPhaseTwo { started: true },
        ScenarioStep::StoreSlider {
            entry: "maxNumMinionsPerWave".to_string(),
            value: 8,
        },
        ScenarioStep::StoreToggle {
            entry: "disableStagger".to_string(),
            value: true,
        },
        ScenarioStep::EnterScene {
            scene: "Town".to_string(),
        },
        ScenarioStep::EnterScene {
            scene: "GG_Collector_V".to_string(),
        },
        ScenarioStep::EnableMachine {
            machine: "Control".to_string(),
        },
        ScenarioStep::EnableMachine {
            machine: "Phase Control".to_string(),
        },
    ]);
    steps
}

pub fn execute(args: Args) -> Result<()> {
    let mut settings = Settings::default();
    if let Some(path) = args.settings.as_ref() {
        let blob = fs::read_to_string(path)
            .with_context(|| format!("reading settings blob from {}", path.display()))?;
        settings = serde_json::from_str(&blob)
            .with_context(|| format!("parsing settings blob from {}", path.display()))?;
    }

    let steps = match args.scenario.as_ref() {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading scenario from {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing scenario from {}", path.display()))?
        }
        None => builtin_demo(),
    };

    let graph = encounter::build();
    let mut collector = CollectorMod::new(Settings::default());
    collector.restore(settings);

    for (index, step) in steps.iter().enumerate() {
        if args.verbose {
            println!("[collector_mod] step {index}: {step:?}");
        }
        run_step(&mut collector, &graph, step)
            .with_context(|| format!("replaying scenario step {index}"))?;
    }

    let settings = collector.snapshot();
    println!(
        "[collector_mod] replayed {} steps; {} machines registered; cutoff {}, wave {}..{}, stagger {}",
        steps.len(),
        collector.registry().registered().count(),
        settings.spawn_cutoff,
        settings.min_minions_per_wave,
        settings.max_minions_per_wave,
        if settings.disable_stagger { "off" } else { "on" },
    );

    if let Some(path) = args.event_log_json.as_ref() {
        let log = build_event_log(collector.events());
        let json = serde_json::to_string_pretty(&log).context("serializing event log to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing event log to {}", path.display()))?;
        println!("Saved event log to {}", path.display());
    }

    if let Some(path) = args.state_json.as_ref() {
        let report = build_state_report(&collector, &graph);
        let json = serde_json::to_string_pretty(&report).context("serializing snapshot to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing snapshot to {}", path.display()))?;
        println!("Saved snapshot to {}", path.display());
    }

    if let Some(path) = args.save_settings.as_ref() {
        let json =
            serde_json::to_string_pretty(&settings).context("serializing settings blob to JSON")?;
        fs::write(path, &json)
            .with_context(|| format!("writing settings blob to {}", path.display()))?;
        println!("Saved settings blob to {}", path.display());
    }

    Ok(())
}

fn run_step(collector: &mut CollectorMod, graph: &EncounterGraph, step: &ScenarioStep) -> Result<()> {
    match step {
        ScenarioStep::EnterScene { scene } => collector.handle_event(HostEvent::SceneChanged {
            to: scene.clone(),
        }),
        ScenarioStep::EnableMachine { machine } => {
            let Some(fsm) = graph.by_fsm_name(machine) else {
                bail!("scenario enables unknown machine {machine:?}");
            };
            collector.handle_event(HostEvent::FsmEnabled {
                object_name: BOSS_OBJECT.to_string(),
                fsm,
            })
        }
        ScenarioStep::SetPhaseTwo { started } => graph.set_phase_two(*started),
        ScenarioStep::StoreSlider { entry, value } => {
            menu::store(collector, entry_id(entry)?, MenuValue::Int(*value))
        }
        ScenarioStep::StoreToggle { entry, value } => {
            menu::store(collector, entry_id(entry)?, MenuValue::Flag(*value))
        }
        ScenarioStep::ResetMenu => {
            let refreshed = menu::reset(collector)?;
            for id in refreshed {
                let value = menu::load(collector, id)?;
                println!("[collector_mod] refresh {} -> {value:?}", id.menu_id());
            }
            Ok(())
        }
    }
}

fn entry_id(entry: &str) -> Result<EntryId> {
    EntryId::from_menu_id(entry)
        .with_context(|| format!("scenario references unknown menu entry {entry:?}"))
}

#[derive(Debug, Serialize)]
struct EventLogEntry {
    sequence: u32,
    label: String,
}

#[derive(Debug, Serialize)]
struct EventLog {
    events: Vec<EventLogEntry>,
}

fn build_event_log(events: &[String]) -> EventLog {
    EventLog {
        events: events
            .iter()
            .enumerate()
            .map(|(index, label)| EventLogEntry {
                sequence: index as u32,
                label: label.clone(),
            })
            .collect(),
    }
}

#[derive(Debug, Serialize)]
struct StateReport {
    settings: Settings,
    registered: Vec<String>,
    machines: BTreeMap<String, Fsm>,
}

fn build_state_report(collector: &CollectorMod, graph: &EncounterGraph) -> StateReport {
    let machines = MachineKind::ALL
        .into_iter()
        .map(|kind| (kind.fsm_name().to_string(), graph.handle(kind).borrow().clone()))
        .collect();

    StateReport {
        settings: collector.snapshot(),
        registered: collector
            .registry()
            .registered()
            .map(|kind| kind.fsm_name().to_string())
            .collect(),
        machines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_demo_ends_retuned_and_repopulated() {
        let graph = encounter::build();
        let mut collector = CollectorMod::new(Settings::default());

        for step in builtin_demo() {
            run_step(&mut collector, &graph, &step).unwrap();
        }

        // Only Control and Phase Control come back after re-entry.
        let report = build_state_report(&collector, &graph);
        assert_eq!(report.registered, vec!["Control", "Phase Control"]);

        let control = graph.control.borrow();
        assert_eq!(control.read_int("Enemies Max"), Ok(10));
        // Written while phase 2 was live during the first visit.
        assert_eq!(control.read_int("Spawn Min"), Ok(5));
        assert_eq!(control.read_int("Spawn Max"), Ok(8));

        // Stagger stayed disabled: four actions in the stun state.
        assert_eq!(graph.stun_control.borrow().action_count("Stun").unwrap(), 4);

        let settings = collector.snapshot();
        assert_eq!(settings.spawn_cutoff, 10);
        assert_eq!(settings.min_minions_per_wave, 5);
        assert_eq!(settings.max_minions_per_wave, 8);
        assert!(settings.disable_stagger);
    }

    #[test]
    fn scenario_steps_round_trip_through_json() {
        let steps = builtin_demo();
        let json = serde_json::to_string(&steps).unwrap();
        let parsed: Vec<ScenarioStep> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, steps);
    }

    #[test]
    fn unknown_names_in_a_scenario_are_reported() {
        let graph = encounter::build();
        let mut collector = CollectorMod::new(Settings::default());

        let err = run_step(
            &mut collector,
            &graph,
            &ScenarioStep::EnableMachine {
                machine: "Corpse Control".to_string(),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown machine"));

        let err = run_step(
            &mut collector,
            &graph,
            &ScenarioStep::StoreSlider {
                entry: "spawncutoff".to_string(),
                value: 10,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown menu entry"));
    }
}
