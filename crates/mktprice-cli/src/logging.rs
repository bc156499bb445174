//! Console and run-log subscriber setup.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context as _;
use mktprice_core::config::{DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::GlobalArgs;

const VERBOSE_FILTER: &str = "info,mktprice=debug,mktprice_core=debug,mktprice_market=debug";

/// Where the run log goes and what it lets through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogSettings {
    pub dir: PathBuf,
    pub level: String,
}

impl From<&mktprice_core::AppConfig> for LogSettings {
    fn from(config: &mktprice_core::AppConfig) -> Self {
        Self {
            dir: config.log_dir.clone(),
            level: config.log_level.clone(),
        }
    }
}

impl LogSettings {
    /// Settings read straight from `lookup`, for runs whose configuration
    /// failed to load.
    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let dir = non_empty("MKTPRICE_LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_owned());
        let level =
            non_empty("MKTPRICE_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());
        Self {
            dir: PathBuf::from(dir),
            level,
        }
    }
}

/// Installs the global subscriber and returns the run-log path.
///
/// The console gets `warn` and above with `--quiet`; the run log always gets
/// everything the env filter lets through.
pub(crate) fn init(
    settings: &LogSettings,
    command: &str,
    global: &GlobalArgs,
) -> anyhow::Result<PathBuf> {
    let env_filter = if global.verbose {
        EnvFilter::try_new(VERBOSE_FILTER)?
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(settings.level.clone()))
            .with_context(|| format!("invalid log level '{}'", settings.level))?
    };

    std::fs::create_dir_all(&settings.dir)
        .with_context(|| format!("failed to create log dir {}", settings.dir.display()))?;
    let path = log_file_path(&settings.dir, command, chrono::Local::now());
    let file = File::create(&path)
        .with_context(|| format!("failed to create run log {}", path.display()))?;

    let console_level = if global.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::TRACE
    };
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_level);
    let run_log = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(run_log)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(path)
}

/// `<log_dir>/<command>_<YYYYmmdd_HHMMSS>.log`
pub(crate) fn log_file_path<Tz>(dir: &Path, command: &str, now: chrono::DateTime<Tz>) -> PathBuf
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    dir.join(format!("{command}_{}.log", now.format("%Y%m%d_%H%M%S")))
}
