use std::fs;

use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "checkin-server";

/// Installs the global subscriber. `RUST_LOG` wins over the `info` default.
/// With a log directory, output goes to a daily rolling file and the
/// returned guard must live until shutdown to flush it.
pub fn init_logging(log_format: &str, log_dir: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = log_format.eq_ignore_ascii_case("json");

    let Some(dir) = log_dir else {
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let installed = if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        installed.map_err(|err| anyhow!("failed to install tracing subscriber: {}", err))?;
        return Ok(None);
    };

    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|err| anyhow!("failed to install tracing subscriber: {}", err))?;
    Ok(Some(guard))
}
