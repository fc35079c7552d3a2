use anyhow::Context;
use tracing::{info, warn};

use campus_hub::bootstrap::config::{load_app_config, ConfigSource};
use campus_hub::bootstrap::run::run_app;
use campus_hub::bootstrap::tracing::init_tracing_subscriber;

fn main() -> anyhow::Result<()> {
    let (config, source) = load_app_config()?;

    // The log directory comes from config, so the source is reported afterwards.
    init_tracing_subscriber(&config)?;
    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "configuration loaded"),
        ConfigSource::Defaults(path) => {
            warn!(path = %path.display(), "config file not found, using defaults")
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    runtime.block_on(run_app(config))
}
