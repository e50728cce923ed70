use std::{
    fs::{self, DirEntry},
    path::Path,
    time::{Duration, SystemTime},
};

use anyhow::{Context, Result, bail};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{self, RollingFileAppender},
};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::{Directive, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use uuid::Uuid;

use crate::config::{LoggingConfig, LoggingRotation};

const LOG_FILE_PREFIX: &str = "lfa-insights.log";

/// Targets the service logs under. Each one gets an `info` directive unless
/// `logging.filter` already says something about it.
const SERVICE_TARGETS: [&str; 3] = ["ai_gateway", "server", "insights"];

/// Keeps the non-blocking writer alive; dropping it flushes pending lines.
pub struct LoggingGuard {
    _flush: WorkerGuard,
    run_id: String,
}

impl LoggingGuard {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

pub fn init_tracing(logging: &LoggingConfig) -> Result<LoggingGuard> {
    if logging.dir.as_os_str().is_empty() {
        bail!("logging.dir cannot be empty");
    }
    let filter = build_env_filter(&logging.filter)?;

    fs::create_dir_all(&logging.dir)
        .with_context(|| format!("failed to create log dir {}", logging.dir.display()))?;
    let sweep = sweep_expired_logs(&logging.dir, logging.retention_days, SystemTime::now());

    let (writer, flush) = tracing_appender::non_blocking(rolling_appender(
        &logging.dir,
        &logging.rotation,
    ));
    let json_file = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .with_span_list(true)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter);
    let stderr_warnings = logging.stderr_warn_enabled.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(json_file)
        .with(stderr_warnings)
        .try_init()
        .context("failed to install tracing subscriber")?;

    let run_id = Uuid::now_v7().to_string();
    tracing::info!(
        target: "logging",
        run_id = %run_id,
        dir = %logging.dir.display(),
        filter = %logging.filter,
        rotation = ?logging.rotation,
        retention_days = logging.retention_days,
        expired_removed = sweep.removed,
        "logging_initialized"
    );
    for warning in &sweep.warnings {
        tracing::warn!(target: "logging", warning = %warning, "log_retention_warning");
    }

    Ok(LoggingGuard {
        _flush: flush,
        run_id,
    })
}

/// Parses `logging.filter` and layers the service target defaults on top.
fn build_env_filter(filter: &str) -> Result<EnvFilter> {
    if filter.trim().is_empty() {
        bail!("logging.filter cannot be empty");
    }
    let mut env_filter = EnvFilter::try_new(filter)
        .with_context(|| format!("invalid logging.filter '{filter}'"))?;
    for target in targets_without_directive(filter) {
        let directive: Directive = format!("{target}=info")
            .parse()
            .with_context(|| format!("invalid default directive for target '{target}'"))?;
        env_filter = env_filter.add_directive(directive);
    }
    Ok(env_filter)
}

fn targets_without_directive(filter: &str) -> Vec<&'static str> {
    let mentioned: Vec<&str> = filter
        .split(',')
        .filter_map(|directive| directive.split(['=', '[']).next())
        .map(str::trim)
        .collect();
    SERVICE_TARGETS
        .into_iter()
        .filter(|target| {
            !mentioned.iter().any(|named| {
                *named == *target
                    || named
                        .strip_prefix(*target)
                        .is_some_and(|rest| rest.starts_with("::"))
            })
        })
        .collect()
}

fn rolling_appender(dir: &Path, rotation: &LoggingRotation) -> RollingFileAppender {
    match rotation {
        LoggingRotation::Daily => rolling::daily(dir, LOG_FILE_PREFIX),
        LoggingRotation::Hourly => rolling::hourly(dir, LOG_FILE_PREFIX),
    }
}

#[derive(Debug, Default)]
struct RetentionSweep {
    removed: usize,
    warnings: Vec<String>,
}

/// Deletes service log files last modified more than `retention_days` before
/// `now`. Files without the service prefix are never touched.
fn sweep_expired_logs(dir: &Path, retention_days: usize, now: SystemTime) -> RetentionSweep {
    let window = Duration::from_secs(retention_days.saturating_mul(86_400) as u64);
    let cutoff = now.checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH);
    let mut sweep = RetentionSweep::default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            sweep
                .warnings
                .push(format!("cannot list {}: {err}", dir.display()));
            return sweep;
        }
    };

    let service_logs = entries
        .flatten()
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX));
    for entry in service_logs {
        match last_modified(&entry) {
            Ok(Some(modified)) if modified <= cutoff => match fs::remove_file(entry.path()) {
                Ok(()) => sweep.removed += 1,
                Err(err) => sweep
                    .warnings
                    .push(format!("cannot remove {}: {err}", entry.path().display())),
            },
            Ok(_) => {}
            Err(err) => sweep
                .warnings
                .push(format!("cannot stat {}: {err}", entry.path().display())),
        }
    }

    sweep
}

/// `None` for anything that is not a regular file.
fn last_modified(entry: &DirEntry) -> std::io::Result<Option<SystemTime>> {
    let metadata = entry.metadata()?;
    if !metadata.is_file() {
        return Ok(None);
    }
    metadata.modified().map(Some)
}
