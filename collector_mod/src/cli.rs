use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Replays Jar Collector encounter scenarios against the simulated machines",
    version
)]
pub struct Args {
    /// Settings blob (JSON) to restore before the replay
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Scenario JSON to replay instead of the built-in demo
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Path to write the mod event log as JSON
    #[arg(long)]
    pub event_log_json: Option<PathBuf>,

    /// Path to write the final machine/settings snapshot as JSON
    #[arg(long)]
    pub state_json: Option<PathBuf>,

    /// Path to write the settings blob after the replay
    #[arg(long)]
    pub save_settings: Option<PathBuf>,

    /// Print each replayed step
    #[arg(long)]
    pub verbose: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
