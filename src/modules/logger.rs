use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const ENV_LOG_DIR: &str = "OBJECT_REGISTRY_UI_LOG_DIR";

const LOG_FILE_PREFIX: &str = "object-registry-ui.log";
const DEFAULT_FILTER: &str = "info,tower_http=info,hyper=warn,reqwest=warn";

// Local wall-clock timestamps with millisecond precision
struct LocalTimer;

impl fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Where log output goes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    /// Daily rolling file directory; console only when `None`
    pub dir: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = lookup(ENV_LOG_DIR)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);
        Self { dir }
    }
}

/// Make sure `dir` exists and can take new files
fn prepare_log_dir(dir: &Path) -> Result<(), String> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create log directory {}: {}", dir.display(), e))?;
    }
    if !is_log_dir_writable(dir) {
        return Err(format!("Log directory {} is not writable", dir.display()));
    }
    Ok(())
}

/// Initialize logging: console always, plus a daily rolling file when
/// `OBJECT_REGISTRY_UI_LOG_DIR` points at a usable directory.
pub fn init_logger() {
    init_with(&LogSettings::from_env());
}

pub fn init_with(settings: &LogSettings) {
    // Capture `log` crate records
    let _ = tracing_log::LogTracer::init();

    let mut file_guard: Option<WorkerGuard> = None;
    let file_layer = settings.dir.as_deref().and_then(|dir| match prepare_log_dir(dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_guard = Some(guard);
            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(LocalTimer),
            )
        }
        Err(e) => {
            eprintln!("{}, logging to console only", e);
            None
        }
    });

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_timer(LocalTimer))
        .with(file_layer)
        .try_init();

    match file_guard {
        Some(guard) => {
            // The writer must live for the whole process
            std::mem::forget(guard);
            info!(dir = ?settings.dir, "logging initialized (console + file)");
        }
        None => info!("logging initialized (console)"),
    }
}

fn is_log_dir_writable(dir: &Path) -> bool {
    let probe = dir.join(".write_test");
    let written = fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&probe)
        .and_then(|mut f| f.write_all(b"ok"))
        .is_ok();

    if written {
        let _ = fs::remove_file(probe);
    }
    written
}
