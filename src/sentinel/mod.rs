//! sentinel.conf assembly

pub mod config;
mod rules;

pub use config::MonitorSettings;
pub use rules::RULES;

/// Static defaults from the upstream sentinel.conf
pub static PREAMBLE: &str = include_str!("../templates/sentinel.conf");

/// Fixed TLS listener port; sentinel's TLS port does not follow `SENTINEL_PORT`
pub const SENTINEL_TLS_PORT: &str = "26379";
