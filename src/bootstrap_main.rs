//! Bootstrap startup
//!
//! Shared by the redis and sentinel entrypoints: logging, then one
//! assemble-and-commit pass against the real environment and host.

use std::process::ExitCode;

use log::error;

use crate::assembler::{RuleContext, run};
use crate::cluster::HostTopology;
use crate::config::BootstrapConfig;
use crate::env::ProcessEnv;
use crate::error::Error;
use crate::logging::{RedisLogLevel, init_logging};

/// Generate the config file; a failed commit maps to exit code 1
pub fn start(config: &BootstrapConfig) -> ExitCode {
    match init_logging(config) {
        Ok(()) => {}
        Err(e @ Error::LogFile { .. }) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            // Nothing is installed yet; fall back to env_logger on stderr
            env_logger::Builder::new()
                .filter_level(RedisLogLevel::parse(&config.loglevel).to_level_filter())
                .init();
        }
        Err(e) => eprintln!("Warning: Failed to initialize logging: {}", e),
    }

    let env = ProcessEnv;
    let topology = HostTopology::new();
    let ctx = RuleContext::new(&env, &topology);

    match run(config, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            log::logger().flush();
            ExitCode::FAILURE
        }
    }
}
