use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const CLI_PREFIX: &str = "tapclock";

const DEFAULT_LEVEL: &str = "info";

/// Installs the global subscriber. Every command is short lived, so each event is one compact
/// line without span timings. Logs always go to daily files under `<application dir>/logs`,
/// stdout only gets a copy when `show_std` is set.
pub fn enable_logging(
    prefix: &str,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(prefix)
        .build(application_data_path.join("logs"))?;

    let filter = log_filter(log_level, std::env::var("RUST_LOG").ok());
    let file = fmt::layer()
        .compact()
        .with_ansi(false)
        .with_target(false)
        .with_writer(appender);
    let stdout = show_std.then(|| fmt::layer().compact().with_target(false));

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(file)
        .with(stdout)
        .try_init()?;
    Ok(())
}

/// Directive restricted to this crate. An explicit level wins over `RUST_LOG`.
fn log_filter(log_level: Option<LevelFilter>, env_level: Option<String>) -> String {
    let level = log_level
        .map(|v| v.to_string())
        .or(env_level)
        .unwrap_or_else(|| DEFAULT_LEVEL.into());
    format!("{}={level}", env!("CARGO_PKG_NAME").replace("-", "_"))
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .compact()
        .init()
});
