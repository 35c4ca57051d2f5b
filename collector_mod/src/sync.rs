//! Pushes the settings record onto whatever machines are reachable.
//!
//! Each apply step tolerates absent machines (the target implementation
//! no-ops), so applying outside the encounter is free. The one write-back
//! into the settings record is the max-wave-bound raise.

use anyhow::Result;

use crate::settings::Settings;
use crate::targets::{EncounterTargets, SpawnLimitTarget, StunBehaviorTarget, WaveConfigTarget};

/// Applies every field, in a fixed order. Invoked on each machine
/// registration so cross-machine propagation always sees current handles.
pub fn apply_all(settings: &mut Settings, targets: &mut impl EncounterTargets) -> Result<()> {
    apply_spawn_cutoff(settings, targets)?;
    apply_wave_bounds(settings, targets)?;
    apply_stagger(settings, targets)?;
    Ok(())
}

pub fn apply_spawn_cutoff(settings: &Settings, targets: &mut impl SpawnLimitTarget) -> Result<()> {
    targets.set_spawn_cutoff(settings.spawn_cutoff)
}

/// Ordering invariant: raise the stored max to the min first, then write the
/// pair into the wave-configuration step, and only then — when that step was
/// present and phase 2 has started — propagate the same pair into the bounds
/// the live encounter reads.
pub fn apply_wave_bounds(settings: &mut Settings, targets: &mut impl WaveConfigTarget) -> Result<()> {
    settings.raise_max_to_min();
    let min = settings.min_minions_per_wave;
    let max = settings.max_minions_per_wave;

    let wrote_wave_step = targets.set_wave_bounds(min, max)?;
    if wrote_wave_step && targets.phase_two_started() {
        targets.set_live_spawn_bounds(min, max)?;
    }
    Ok(())
}

pub fn apply_stagger(settings: &Settings, targets: &mut impl StunBehaviorTarget) -> Result<()> {
    targets.set_stagger_enabled(!settings.disable_stagger)
}
