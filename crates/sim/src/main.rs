use std::sync::Arc;

use anyhow::Context;

use agora_sim::{RunOptions, Scenario, StdoutSink, run_scenario};

/// Scenario path, used when no CLI argument is given.
const SCENARIO_ENV: &str = "AGORA_SCENARIO";
/// Optional path for a JSON copy of the run report.
const REPORT_ENV: &str = "AGORA_REPORT";

fn main() -> anyhow::Result<()> {
    agora_observability::init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(SCENARIO_ENV).ok())
        .with_context(|| format!("usage: agora-sim <scenario.json> (or set {SCENARIO_ENV})"))?;

    let scenario =
        Scenario::from_path(&path).with_context(|| format!("failed to load scenario {path}"))?;
    let options = RunOptions::from_env().context("invalid run options")?;

    let report = run_scenario(&scenario, options, Arc::new(StdoutSink))
        .with_context(|| format!("simulation of {path} failed"))?;

    if let Ok(report_path) = std::env::var(REPORT_ENV) {
        let file = std::fs::File::create(&report_path)
            .with_context(|| format!("failed to create report {report_path}"))?;
        serde_json::to_writer_pretty(file, &report).context("failed to write report")?;
    }

    tracing::info!(
        run_id = %report.run_id,
        items_bought = report.items_bought(),
        published = report.stats.published,
        buffered = report.stats.buffered,
        "done"
    );
    Ok(())
}
