use std::fs;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::tempdir;

#[test]
fn fixture_scenario_produces_the_expected_snapshot() -> Result<()> {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let scenario = manifest_dir.join("tests/fixtures/encounter_scenario.json");
    assert!(scenario.is_file(), "missing fixture {}", scenario.display());

    let temp_dir = tempdir().context("creating temporary directory for reports")?;
    let state_path = temp_dir.path().join("state.json");
    let event_log_path = temp_dir.path().join("events.json");

    let status = Command::new(env!("CARGO_BIN_EXE_collector_mod"))
        .args([
            "--scenario",
            scenario.to_str().context("scenario path is not valid UTF-8")?,
            "--state-json",
            state_path.to_str().context("state path is not valid UTF-8")?,
            "--event-log-json",
            event_log_path
                .to_str()
                .context("event log path is not valid UTF-8")?,
        ])
        .status()
        .context("executing collector_mod scenario replay")?;
    assert!(status.success(), "collector_mod exited with {status:?}");

    let state: Value = serde_json::from_str(
        &fs::read_to_string(&state_path).context("reading snapshot report")?,
    )
    .context("parsing snapshot report")?;

    assert_eq!(
        state.pointer("/settings"),
        Some(&serde_json::json!({
            "spawn_cutoff": 12,
            "min_minions_per_wave": 6,
            "max_minions_per_wave": 9,
            "disable_stagger": true,
        }))
    );

    // After leaving and re-entering, only two machines came back.
    assert_eq!(
        state.pointer("/registered"),
        Some(&serde_json::json!(["Control", "Phase Control"]))
    );

    let int_at = |pointer: &str| state.pointer(pointer).and_then(Value::as_i64);
    assert_eq!(int_at("/machines/Control/variables/ints/Enemies Max"), Some(12));
    assert_eq!(
        int_at("/machines/Control/states/1/actions/1/compare_to"),
        Some(12),
        "summon threshold should follow the cutoff"
    );
    // Live bounds were propagated while phase 2 was active.
    assert_eq!(int_at("/machines/Control/variables/ints/Spawn Min"), Some(6));
    assert_eq!(int_at("/machines/Control/variables/ints/Spawn Max"), Some(9));

    // Wave-configuration slots hold the corrected pair.
    assert_eq!(
        int_at("/machines/Phase Control/states/1/actions/0/value"),
        Some(6)
    );
    assert_eq!(
        int_at("/machines/Phase Control/states/1/actions/1/value"),
        Some(9)
    );

    // Stagger disabled: the stun state is down to four actions.
    let stun_actions = state
        .pointer("/machines/Stun Control/states/1/actions")
        .and_then(Value::as_array)
        .context("stun action list missing from snapshot")?;
    assert_eq!(stun_actions.len(), 4);

    let events: Value = serde_json::from_str(
        &fs::read_to_string(&event_log_path).context("reading event log")?,
    )
    .context("parsing event log")?;
    let labels: Vec<&str> = events
        .pointer("/events")
        .and_then(Value::as_array)
        .context("event log missing events array")?
        .iter()
        .filter_map(|entry| entry.pointer("/label").and_then(Value::as_str))
        .collect();

    assert!(labels.contains(&"machine.enabled Control"));
    assert!(labels.contains(&"machines.cleared Town"));
    assert!(labels.contains(&"settings.wave_bounds 6 9"));

    Ok(())
}
