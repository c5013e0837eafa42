//! mysql-lab binary: provisions the two-instance migration lab end to end.

use anyhow::Context;
use mysql_lab::{DockerEngine, LabConfig, LogProgressReporter, ProvisionPipeline};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = LabConfig::load(Path::new(".")).context("loading lab configuration")?;
    let engine = Arc::new(DockerEngine::new());
    let pipeline = ProvisionPipeline::new(engine, config);

    let report = pipeline
        .run(&LogProgressReporter)
        .await
        .context("provisioning pipeline failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.all_succeeded() {
        std::process::exit(1);
    }
    Ok(())
}
