//! Logging configuration module
//!
//! Redis-style log lines (`pid:<level> <timestamp> <message>`) on stderr or an
//! optional log file. Credentials that appear in directive logs are redacted.

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::{LazyLock, Mutex};

use log::{LevelFilter, Log, Metadata, Record};
use regex::Regex;

use crate::config::BootstrapConfig;
use crate::error::{Error, Result};

/// Redis-style log levels mapped to Rust log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedisLogLevel {
    Debug,
    Verbose,
    Notice,
    Warning,
    Nothing,
}

impl RedisLogLevel {
    /// Parse Redis-style log level string; unknown values fall back to notice
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => Self::Debug,
            "verbose" => Self::Verbose,
            "notice" => Self::Notice,
            "warning" => Self::Warning,
            "nothing" => Self::Nothing,
            _ => Self::Notice,
        }
    }

    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::Debug,
            Self::Verbose => LevelFilter::Info,
            Self::Notice => LevelFilter::Info,
            Self::Warning => LevelFilter::Warn,
            Self::Nothing => LevelFilter::Off,
        }
    }
}

// `sentinel auth-pass <group> <password>` carries the secret in the second argument
static AUTH_PASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\bauth-pass\s+\S+\s+)\S+").expect("valid auth-pass pattern")
});

static SECRET_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(requirepass|masterauth|auth)(\s+)\S+").expect("valid secret pattern")
});

/// Replace credentials following known secret-bearing keywords
pub fn sanitize_message(msg: &str) -> Cow<'_, str> {
    let first = AUTH_PASS.replace_all(msg, "${1}[REDACTED]");
    if let Cow::Owned(s) = SECRET_ARG.replace_all(&first, "${1}${2}[REDACTED]") {
        return Cow::Owned(s);
    }
    first
}

/// Logger writing to a file when configured, stderr otherwise
pub struct BootstrapLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl BootstrapLogger {
    pub fn new(config: &BootstrapConfig) -> Result<Self> {
        let level = RedisLogLevel::parse(&config.loglevel).to_level_filter();

        let file = match &config.logfile {
            Some(path) => {
                let f = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| Error::LogFile {
                        path: path.clone(),
                        source,
                    })?;
                Some(Mutex::new(f))
            }
            None => None,
        };

        Ok(Self { level, file })
    }

    fn format_record(&self, record: &Record) -> String {
        let level_char = match record.level() {
            log::Level::Error => '!',
            log::Level::Warn => '#',
            log::Level::Info => '*',
            log::Level::Debug => '-',
            log::Level::Trace => '.',
        };

        let msg = record.args().to_string();
        format!(
            "{}:{} {} {}\n",
            std::process::id(),
            level_char,
            unix_seconds(),
            sanitize_message(&msg)
        )
    }
}

impl Log for BootstrapLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let formatted = self.format_record(record);

        if let Some(ref file) = self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.write_all(formatted.as_bytes());
            }
        } else {
            eprint!("{}", formatted);
        }
    }

    fn flush(&self) {
        if let Some(ref file) = self.file
            && let Ok(mut f) = file.lock()
        {
            let _ = f.flush();
        }
    }
}

fn unix_seconds() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Install the logger.
///
/// Fails without installing anything if the log file cannot be opened, and
/// fails if a logger is already installed.
pub fn init_logging(config: &BootstrapConfig) -> Result<()> {
    let logger = Box::new(BootstrapLogger::new(config)?);
    let level = RedisLogLevel::parse(&config.loglevel).to_level_filter();

    log::set_boxed_logger(logger)?;
    log::set_max_level(level);

    Ok(())
}
