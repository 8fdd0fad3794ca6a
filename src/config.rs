//! Bootstrap configuration

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::assembler::Rule;
use crate::{redis, sentinel};

/// ACL file mounted by the operator when `ACL_MODE=true`
pub const ACL_FILE: &str = "/etc/redis/user.acl";

/// Which config file grammar is being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Redis,
    Sentinel,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Redis => "redis",
            Dialect::Sentinel => "sentinel",
        }
    }

    /// Where the server expects its config file
    pub fn target_path(&self) -> &'static str {
        match self {
            Dialect::Redis => "/etc/redis/redis.conf",
            Dialect::Sentinel => "/etc/redis/sentinel.conf",
        }
    }

    /// Operator override file included when present and `EXTERNAL_CONFIG_FILE` is unset
    pub fn default_external_config(&self) -> &'static str {
        match self {
            Dialect::Redis => "/etc/redis/external.conf.d/redis-additional.conf",
            Dialect::Sentinel => "/etc/redis/external.conf.d/redis-sentinel-additional.conf",
        }
    }

    /// Static text every generated file starts with
    pub fn preamble(&self) -> &'static str {
        match self {
            Dialect::Redis => redis::PREAMBLE,
            Dialect::Sentinel => sentinel::PREAMBLE,
        }
    }

    /// Rule blocks, in the order their directives are emitted
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            Dialect::Redis => redis::RULES,
            Dialect::Sentinel => sentinel::RULES,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "sentinel" => Ok(Self::Sentinel),
            _ => Err(format!("Unknown dialect: {}", s)),
        }
    }
}

/// Settings for one bootstrap run
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub dialect: Dialect,
    /// File to write (default: the dialect's target path)
    pub output: PathBuf,
    /// Print the rendered file instead of writing it
    pub dry_run: bool,
    /// Log level (default: "notice")
    pub loglevel: String,
    /// Log file path (default: stderr)
    pub logfile: Option<PathBuf>,
}

impl BootstrapConfig {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            output: PathBuf::from(dialect.target_path()),
            dry_run: false,
            loglevel: "notice".to_string(),
            logfile: None,
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}
