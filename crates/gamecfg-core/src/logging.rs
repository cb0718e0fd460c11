//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/gamecfg/logs/`
/// Log level is controlled by `GAMECFG_LOG` environment variable.
///
/// # Examples
/// ```bash
/// GAMECFG_LOG=debug gamecfg show PalWorldSettings.ini
/// GAMECFG_LOG=gamecfg_dialect=trace gamecfg validate PalWorldSettings.ini
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "gamecfg.log");

    // Default to info, allow override via GAMECFG_LOG
    let env_filter = EnvFilter::try_from_env("GAMECFG_LOG").unwrap_or_else(|_| {
        EnvFilter::new("gamecfg=info,gamecfg_core=info,gamecfg_dialect=info,gamecfg_app=info,warn")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("gamecfg {} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log directory: {}", log_dir.display());

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("gamecfg").join("logs"))
}
