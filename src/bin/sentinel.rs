//! Sentinel entrypoint
//!
//! Always renders sentinel.conf, whatever the binary is called.

use std::process::ExitCode;

use redis_bootstrap::Dialect;
use redis_bootstrap::cli::Cli;

fn main() -> ExitCode {
    let config = Cli::load_config_as(Dialect::Sentinel);
    redis_bootstrap::bootstrap_main::start(&config)
}
