use anyhow::Context;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};

pub fn configure_logging() -> anyhow::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::time());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let subscriber = Registry::default().with(filter).with(stdout_log);

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set global tracing subscriber")
}
