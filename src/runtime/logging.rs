use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LoggingSettings, default_log_path};

/// Install the file logger. The terminal belongs to the UI, so nothing is
/// written to stdout or stderr. Returns the log file path when logging is on.
pub fn init(settings: &LoggingSettings) -> Option<PathBuf> {
    if !settings.enabled {
        return None;
    }

    let log_path = settings.file.clone().or_else(default_log_path)?;
    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = match File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("lyrebird: failed to create log file at {}: {e}", log_path.display());
            return None;
        }
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .ok()?;

    Some(log_path)
}
