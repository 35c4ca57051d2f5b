//! The persisted settings record.
//!
//! The mod loader owns persistence: it hands the record back as an opaque
//! JSON blob at load and asks for it again at save. This module only keeps
//! the in-memory values inside their menu ranges and holds the one record
//! invariant: the max wave bound never sits below the min bound.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SPAWN_CUTOFF: i64 = 4;
pub const DEFAULT_MIN_MINIONS: i64 = 2;
pub const DEFAULT_MAX_MINIONS: i64 = 3;

pub const SPAWN_CUTOFF_RANGE: (i64, i64) = (4, 20);
pub const MIN_MINIONS_RANGE: (i64, i64) = (2, 40);
pub const MAX_MINIONS_RANGE: (i64, i64) = (3, 40);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub spawn_cutoff: i64,
    pub min_minions_per_wave: i64,
    pub max_minions_per_wave: i64,
    pub disable_stagger: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            spawn_cutoff: DEFAULT_SPAWN_CUTOFF,
            min_minions_per_wave: DEFAULT_MIN_MINIONS,
            max_minions_per_wave: DEFAULT_MAX_MINIONS,
            disable_stagger: false,
        }
    }
}

impl Settings {
    pub fn set_spawn_cutoff(&mut self, value: i64) {
        self.spawn_cutoff = clamp_into(value, SPAWN_CUTOFF_RANGE);
    }

    pub fn set_min_minions_per_wave(&mut self, value: i64) {
        self.min_minions_per_wave = clamp_into(value, MIN_MINIONS_RANGE);
        self.raise_max_to_min();
    }

    pub fn set_max_minions_per_wave(&mut self, value: i64) {
        self.max_minions_per_wave = clamp_into(value, MAX_MINIONS_RANGE);
        self.raise_max_to_min();
    }

    /// The max wave bound is raised, never the min lowered.
    pub fn raise_max_to_min(&mut self) {
        if self.max_minions_per_wave < self.min_minions_per_wave {
            self.max_minions_per_wave = self.min_minions_per_wave;
        }
    }

    /// Mirrors the menu's reset button: only the cutoff and the max wave
    /// bound return to defaults. The min bound and the stagger flag keep
    /// the player's values.
    pub fn reset_to_defaults(&mut self) {
        self.spawn_cutoff = DEFAULT_SPAWN_CUTOFF;
        self.max_minions_per_wave = DEFAULT_MAX_MINIONS;
    }

    /// Restored blobs are hand-editable on disk, so every field is clamped
    /// back into its menu range before use.
    pub fn clamp_into_ranges(&mut self) {
        self.spawn_cutoff = clamp_into(self.spawn_cutoff, SPAWN_CUTOFF_RANGE);
        self.min_minions_per_wave = clamp_into(self.min_minions_per_wave, MIN_MINIONS_RANGE);
        self.max_minions_per_wave = clamp_into(self.max_minions_per_wave, MAX_MINIONS_RANGE);
        self.raise_max_to_min();
    }
}

fn clamp_into(value: i64, (low, high): (i64, i64)) -> i64 {
    value.clamp(low, high)
}
