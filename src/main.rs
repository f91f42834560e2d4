use anyhow::{Context, Result};
use lattice_relation::scenario::{run, Scenario};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    // Read one JSON scenario from stdin
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    let scenario: Scenario = serde_json::from_str(buf.trim()).context("invalid scenario JSON")?;

    let report = run(scenario).context("scenario failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
