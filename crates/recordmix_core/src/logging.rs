//! Logging bootstrap for hosts embedding recordmix.
//!
//! # Responsibility
//! - Start the rolling file logger once per process from a `LoggingConfig`.
//! - Record panics as single-line `event=panic_captured` entries.
//!
//! # Invariants
//! - Repeating `init_logging` with an equivalent config is a no-op.
//! - A config naming another level or directory is rejected once active.
//! - Nothing in this module panics.
//!
//! Library code only emits through the `log` facade; without this bootstrap
//! those events go to whatever logger the host installed.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::panic::PanicHookInfo;
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "recordmix";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: LevelFilter,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

/// Logging settings, typically deserialized from the host's config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`, case-insensitive.
    #[serde(default = "default_level_string")]
    pub level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
}

impl LoggingConfig {
    /// Config using the build-mode default level.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: default_level_string(),
            log_dir: log_dir.into(),
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    fn level_filter(&self) -> Result<LevelFilter, String> {
        let raw = self.level.trim();
        let canonical = if raw.eq_ignore_ascii_case("warning") {
            "warn"
        } else {
            raw
        };
        match canonical.parse::<LevelFilter>() {
            Ok(LevelFilter::Off) | Err(_) => Err(format!(
                "unsupported log level `{raw}`; expected trace|debug|info|warn|error"
            )),
            Ok(level) => Ok(level),
        }
    }

    fn checked_dir(&self) -> Result<PathBuf, String> {
        let dir = self.log_dir.as_path();
        if dir.as_os_str().is_empty() {
            Err("log_dir cannot be empty".to_string())
        } else if dir.is_relative() {
            Err(format!("log_dir must be absolute, got `{}`", dir.display()))
        } else {
            Ok(dir.to_path_buf())
        }
    }
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Starts process logging, or confirms the active logger matches `config`.
///
/// # Errors
/// - Unsupported level, or an empty or relative `log_dir`.
/// - The directory cannot be created or the backend fails to start.
/// - Logging is already active with a different level or directory.
pub fn init_logging(config: &LoggingConfig) -> Result<(), String> {
    let level = config.level_filter()?;
    let log_dir = config.checked_dir()?;

    let active = ACTIVE.get_or_try_init(|| start(level, log_dir.clone()))?;
    if active.log_dir != log_dir {
        return Err(format!(
            "logging already writes to `{}`; refusing to switch to `{}`",
            active.log_dir.display(),
            log_dir.display()
        ));
    }
    if active.level != level {
        return Err(format!(
            "logging already runs at `{}`; refusing to switch to `{}`",
            active.level, level
        ));
    }
    Ok(())
}

/// Active `(level, log_dir)`, or `None` before `init_logging` succeeds.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

fn start(level: LevelFilter, log_dir: PathBuf) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&log_dir)
        .map_err(|err| format!("cannot create log directory `{}`: {err}", log_dir.display()))?;

    let spec = LogSpecification::builder().default(level).build();
    let handle = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("logger backend failed to start: {err}"))?;

    if PANIC_HOOK.set(()).is_ok() {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            log_panic(info);
            previous(info);
        }));
    }

    info!(
        "event=logging_init module=logging status=ok level={} log_dir={} version={}",
        level,
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        log_dir,
        _handle: handle,
    })
}

fn log_panic(info: &PanicHookInfo<'_>) {
    let location = info
        .location()
        .map_or_else(|| "unknown".to_string(), |at| format!("{}:{}", at.file(), at.line()));
    let payload: &str = info
        .payload()
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    error!(
        "event=panic_captured module=logging status=error location={} payload={}",
        location,
        single_line(payload, PANIC_PAYLOAD_LIMIT)
    );
}

/// Flattens line breaks and caps `text` at `limit` chars, marking the cut.
fn single_line(text: &str, limit: usize) -> String {
    let mut line: String = text
        .chars()
        .take(limit)
        .map(|ch| if matches!(ch, '\n' | '\r') { ' ' } else { ch })
        .collect();
    if text.chars().nth(limit).is_some() {
        line.push_str("...");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, single_line, LoggingConfig};
    use log::LevelFilter;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn scratch_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("recordmix-logging-{label}-{}", Uuid::new_v4()))
    }

    #[test]
    fn level_parsing_is_lenient_about_case_and_warning() {
        let config = LoggingConfig::new("/tmp/recordmix");
        assert_eq!(
            config.clone().with_level("INFO").level_filter(),
            Ok(LevelFilter::Info)
        );
        assert_eq!(
            config.clone().with_level(" warning ").level_filter(),
            Ok(LevelFilter::Warn)
        );
        assert!(config.clone().with_level("verbose").level_filter().is_err());
        assert!(config.with_level("off").level_filter().is_err());
    }

    #[test]
    fn log_dir_must_be_absolute_and_non_empty() {
        let err = LoggingConfig::new("logs/dev")
            .checked_dir()
            .expect_err("relative dir must be rejected");
        assert!(err.contains("absolute"));
        assert!(LoggingConfig::new("").checked_dir().is_err());
    }

    #[test]
    fn single_line_flattens_and_truncates() {
        assert_eq!(single_line("a\nb\rc", 10), "a b c");
        assert_eq!(single_line("line1\nline2", 8), "line1 li...");
        assert_eq!(single_line("exact", 5), "exact");
    }

    #[test]
    fn config_deserializes_with_default_level() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{"log_dir": "/var/log/recordmix"}"#).expect("config");
        assert_eq!(config.level, super::default_log_level());
        assert_eq!(config.log_dir, PathBuf::from("/var/log/recordmix"));
    }

    #[test]
    fn repeated_init_accepts_same_config_and_rejects_changes() {
        let log_dir = scratch_dir("idempotent");
        let config = LoggingConfig::new(log_dir.clone()).with_level("info");

        init_logging(&config).expect("first init should succeed");
        init_logging(&config.clone().with_level("INFO")).expect("same config should be a no-op");

        let level_error = init_logging(&config.clone().with_level("debug"))
            .expect_err("level change should fail");
        assert!(level_error.contains("refusing to switch"));

        let other_dir = LoggingConfig::new(scratch_dir("moved")).with_level("info");
        let dir_error = init_logging(&other_dir).expect_err("directory change should fail");
        assert!(dir_error.contains("refusing to switch"));

        assert_eq!(logging_status(), Some((LevelFilter::Info, log_dir)));
    }
}
