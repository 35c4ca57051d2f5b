use anyhow::Result;

use collector_mod::{cli, runtime};

fn main() -> Result<()> {
    runtime::execute(cli::parse())
}
