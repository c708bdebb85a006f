/// The common module holds process-wide plumbing shared by every entry point: the crate version
/// and logging setup.
use crate::error::{Result, ZencpError};
use directories::ProjectDirs;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, EnvFilter};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static LOGGING_INITIALIZED: OnceLock<Mutex<HashSet<Option<String>>>> = OnceLock::new();

/// Directory the log file is written to. macOS has no state dir, so the cache dir is used there.
pub fn log_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "zencp").ok_or_else(|| ZencpError::Logging("Failed to get project directories".to_string()))?;
    let dir = if cfg!(target_os = "macos") {
        proj_dirs.cache_dir()
    } else {
        proj_dirs.state_dir().unwrap_or(proj_dirs.cache_dir())
    };
    Ok(dir.to_path_buf())
}

/// Installs the global tracing subscriber. `output` is either "stderr" or "file". Once a call for
/// a `logger_name` has succeeded, later calls with the same name do nothing; a failed call can be
/// retried.
pub fn initialize_logging(logger_name: Option<&str>, output: &str) -> Result<()> {
    if output != "stderr" && output != "file" {
        return Err(ZencpError::Logging(format!("Unknown log output: {output}")));
    }

    let registry = LOGGING_INITIALIZED.get_or_init(|| Mutex::new(HashSet::new()));
    let mut initialized = registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let key = logger_name.map(|s| s.to_string());
    if initialized.contains(&key) {
        return Ok(());
    }

    let log_despite_testing = std::env::var("LOG_TEST").is_ok();
    let is_testing = std::env::var("CARGO_TEST").is_ok();
    if is_testing && !log_despite_testing {
        initialized.insert(key);
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = if output == "stderr" {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(!log_despite_testing)
            .with_thread_ids(log_despite_testing)
            .with_line_number(log_despite_testing)
            .with_file(log_despite_testing)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let dir = log_dir()?;
        fs::create_dir_all(&dir)?;
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix("zencp")
            .filename_suffix("log")
            .build(&dir)
            .map_err(|e| ZencpError::Logging(format!("Failed to open log file in {}: {e}", dir.display())))?;
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(file_appender)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    // Only a name whose subscriber was actually installed counts as initialized.
    installed.map_err(|e| ZencpError::Logging(e.to_string()))?;
    initialized.insert(key);
    Ok(())
}
