use std::path::{Path, PathBuf};

use clap::{CommandFactory, FromArgMatches, Parser};

use crate::config::{BootstrapConfig, Dialect};

#[derive(Parser, Debug)]
#[command(name = "redis-bootstrap")]
#[command(version)]
#[command(
    about = "Generate redis.conf or sentinel.conf from the pod environment before the server starts",
    long_about = None
)]
pub struct Cli {
    /// Generate sentinel.conf (implied when the binary name contains "sentinel")
    #[arg(long)]
    pub sentinel: bool,

    /// Write to this path instead of the dialect's default
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the generated config to stdout instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (debug, verbose, notice, warning, nothing)
    #[arg(long, default_value = "notice")]
    pub loglevel: String,

    /// Log file path (default: stderr)
    #[arg(long, value_name = "PATH")]
    pub logfile: Option<PathBuf>,
}

impl Cli {
    /// Parse the process arguments; exits on `--help` or bad usage
    pub fn load_config() -> BootstrapConfig {
        let program = std::env::args_os().next().unwrap_or_default();
        Cli::parse().into_config(Path::new(&program))
    }

    /// Parse the process arguments for an entrypoint bound to one dialect
    pub fn load_config_as(dialect: Dialect) -> BootstrapConfig {
        let matches = Self::command_for(dialect).get_matches();
        let mut cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
        cli.sentinel = dialect == Dialect::Sentinel;
        cli.into_config(Path::new(dialect.as_str()))
    }

    /// Command definition carrying the entrypoint's own name in help and usage
    pub fn command_for(dialect: Dialect) -> clap::Command {
        let name = match dialect {
            Dialect::Redis => "redis-bootstrap",
            Dialect::Sentinel => "sentinel-bootstrap",
        };
        Cli::command().name(name).bin_name(name)
    }

    /// Sentinel if requested by flag or by invoking a `*sentinel*` binary
    pub fn dialect(&self, program: &Path) -> Dialect {
        let is_sentinel_binary = program
            .file_name()
            .is_some_and(|name| name.to_string_lossy().contains("sentinel"));

        if self.sentinel || is_sentinel_binary {
            Dialect::Sentinel
        } else {
            Dialect::Redis
        }
    }

    pub fn into_config(self, program: &Path) -> BootstrapConfig {
        let mut config = BootstrapConfig::new(self.dialect(program));

        if let Some(output) = self.output {
            config.output = output;
        }
        config.dry_run = self.dry_run;
        config.loglevel = self.loglevel;
        config.logfile = self.logfile;

        config
    }
}
