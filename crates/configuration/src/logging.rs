use crate::error::ConfigError;
use crate::settings::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global tracing subscriber.
///
/// Events go to stderr, and additionally to a daily rolling file when
/// `config.directory` is set. The returned guard flushes the file writer on drop,
/// so the caller must hold it for the lifetime of the process.
pub fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>, ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_timer(timer())
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "solpnl.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_timer(timer()).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    Ok(guard)
}

/// RFC 3339 timestamps in UTC. Reading the local offset is unreliable once the
/// runtime's worker threads exist, so local time is not used.
fn timer() -> ChronoUtc {
    ChronoUtc::rfc_3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use tracing_subscriber::fmt::format::Writer;
    use tracing_subscriber::fmt::time::FormatTime;

    #[test]
    fn timestamps_format_while_other_threads_are_running() {
        let (release, parked) = mpsc::channel::<()>();
        let worker = std::thread::spawn(move || {
            let _ = parked.recv();
        });

        let mut stamp = String::new();
        let formatted = timer().format_time(&mut Writer::new(&mut stamp));

        release.send(()).unwrap();
        worker.join().unwrap();

        assert!(formatted.is_ok());
        assert!(stamp.contains('T'), "not an RFC 3339 timestamp: {stamp}");
        assert!(stamp.ends_with('Z') || stamp.ends_with("+00:00"), "not UTC: {stamp}");
    }
}
