//! Bridge between the settings record and the host's settings-menu toolkit.
//!
//! The toolkit renders whatever [`entries`] describes and calls back through
//! [`load`] and [`store`]; a store pushes the new value onto the machines
//! before it returns, so the menu never shows a value the encounter is not
//! already using.

use anyhow::Result;
use thiserror::Error;

use crate::settings::{MAX_MINIONS_RANGE, MIN_MINIONS_RANGE, SPAWN_CUTOFF_RANGE};
use crate::CollectorMod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryId {
    SpawnCutoff,
    MinMinionsPerWave,
    MaxMinionsPerWave,
    DisableStagger,
    ResetToDefaults,
}

impl EntryId {
    /// Widget id as the host toolkit knows it.
    pub fn menu_id(self) -> &'static str {
        match self {
            EntryId::SpawnCutoff => "spawnCutoff",
            EntryId::MinMinionsPerWave => "minNumMinionsPerWave",
            EntryId::MaxMinionsPerWave => "maxNumMinionsPerWave",
            EntryId::DisableStagger => "disableStagger",
            EntryId::ResetToDefaults => "resetToDefaults",
        }
    }

    pub fn from_menu_id(id: &str) -> Option<Self> {
        [
            EntryId::SpawnCutoff,
            EntryId::MinMinionsPerWave,
            EntryId::MaxMinionsPerWave,
            EntryId::DisableStagger,
            EntryId::ResetToDefaults,
        ]
        .into_iter()
        .find(|entry| entry.menu_id() == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Slider { min: i64, max: i64, whole_numbers: bool },
    /// Rendered as a true/false horizontal option.
    Toggle,
    Button,
}

#[derive(Debug, Clone, Copy)]
pub struct MenuEntry {
    pub id: EntryId,
    pub label: &'static str,
    pub description: &'static str,
    pub control: Control,
}

/// The menu, top to bottom.
pub fn entries() -> [MenuEntry; 5] {
    [
        MenuEntry {
            id: EntryId::SpawnCutoff,
            label: "Minion Spawn Cutoff",
            description: "",
            control: slider(SPAWN_CUTOFF_RANGE),
        },
        MenuEntry {
            id: EntryId::MinMinionsPerWave,
            label: "Min Minions Per Wave",
            description: "",
            control: slider(MIN_MINIONS_RANGE),
        },
        MenuEntry {
            id: EntryId::MaxMinionsPerWave,
            label: "Max Minions Per Wave",
            description: "",
            control: slider(MAX_MINIONS_RANGE),
        },
        MenuEntry {
            id: EntryId::DisableStagger,
            label: "Disable Stagger",
            description: "Prevents stagger",
            control: Control::Toggle,
        },
        MenuEntry {
            id: EntryId::ResetToDefaults,
            label: "Reset To Defaults",
            description: "",
            control: Control::Button,
        },
    ]
}

fn slider((min, max): (i64, i64)) -> Control {
    Control::Slider {
        min,
        max,
        whole_numbers: true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuValue {
    Int(i64),
    Flag(bool),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("menu entry {0:?} does not carry a value")]
    NoValue(EntryId),
    #[error("menu entry {id:?} expected a {expected} value")]
    WrongShape { id: EntryId, expected: &'static str },
}

/// Value the widget should currently display.
pub fn load(collector: &CollectorMod, id: EntryId) -> Result<MenuValue, MenuError> {
    let settings = collector.settings();
    match id {
        EntryId::SpawnCutoff => Ok(MenuValue::Int(settings.spawn_cutoff)),
        EntryId::MinMinionsPerWave => Ok(MenuValue::Int(settings.min_minions_per_wave)),
        EntryId::MaxMinionsPerWave => Ok(MenuValue::Int(settings.max_minions_per_wave)),
        EntryId::DisableStagger => Ok(MenuValue::Flag(settings.disable_stagger)),
        EntryId::ResetToDefaults => Err(MenuError::NoValue(EntryId::ResetToDefaults)),
    }
}

/// Stores a widget value and synchronously applies the matching field.
pub fn store(collector: &mut CollectorMod, id: EntryId, value: MenuValue) -> Result<()> {
    match (id, value) {
        (EntryId::SpawnCutoff, MenuValue::Int(v)) => collector.store_spawn_cutoff(v),
        (EntryId::MinMinionsPerWave, MenuValue::Int(v)) => collector.store_min_minions_per_wave(v),
        (EntryId::MaxMinionsPerWave, MenuValue::Int(v)) => collector.store_max_minions_per_wave(v),
        (EntryId::DisableStagger, MenuValue::Flag(v)) => collector.store_disable_stagger(v),
        (EntryId::ResetToDefaults, _) => Err(MenuError::NoValue(EntryId::ResetToDefaults).into()),
        (id, MenuValue::Int(_)) => Err(MenuError::WrongShape { id, expected: "flag" }.into()),
        (id, MenuValue::Flag(_)) => Err(MenuError::WrongShape { id, expected: "int" }.into()),
    }
}

/// The reset button: restore defaults, re-apply, and report every widget
/// whose displayed value must be reloaded through [`load`].
pub fn reset(collector: &mut CollectorMod) -> Result<[EntryId; 4]> {
    collector.reset_to_defaults()?;
    Ok([
        EntryId::SpawnCutoff,
        EntryId::MinMinionsPerWave,
        EntryId::MaxMinionsPerWave,
        EntryId::DisableStagger,
    ])
}
