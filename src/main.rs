use std::process::ExitCode;

use redis_bootstrap::cli::Cli;

fn main() -> ExitCode {
    // Dialect follows `--sentinel` or a binary name containing "sentinel"
    let config = Cli::load_config();
    redis_bootstrap::bootstrap_main::start(&config)
}
