// privbridged: privileged host daemon entry point.

use anyhow::Context;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("starting privbridge host daemon");
    privbridge_host::runtime::run_standalone()
        .await
        .context("host daemon terminated unexpectedly")
}
