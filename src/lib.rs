//! Config bootstrap for operator-managed Redis and Sentinel pods.
//!
//! Runs once per container start, before the server process, and renders the
//! server's config file from a static preamble, the environment injected by
//! the operator, and facts discovered inside the pod.

pub mod assembler;
pub mod bootstrap_main;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod document;
pub mod env;
pub mod error;
pub mod logging;
pub mod redis;
pub mod sentinel;

pub use assembler::{Rule, RuleContext, assemble, run};
pub use cluster::{HostTopology, TopologyProvider};
pub use config::{BootstrapConfig, Dialect};
pub use document::{ConfigDocument, Directive};
pub use env::{Environment, MapEnv, ProcessEnv};
pub use error::{Error, Result};
