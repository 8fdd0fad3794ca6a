//! redis.conf assembly
//!
//! Rule order matters: networking is decided after TLS, the operator include
//! comes after every static directive, and the cluster announce identity is
//! appended after the include.

mod rules;

use std::path::PathBuf;

use crate::cluster::NODES_CONF_FILE;
use crate::env::Environment;

pub use rules::RULES;

/// Static defaults from the upstream redis.conf that no input overrides
pub static PREAMBLE: &str = include_str!("../templates/redis.conf");

/// Inputs shared by several rule blocks, resolved once per rule
#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub persistence_enabled: bool,
    pub data_dir: String,
    pub node_conf_dir: String,
    pub major_version: String,
    pub cluster_mode: bool,
    pub tls_enabled: bool,
    pub nodeport: bool,
}

impl RedisSettings {
    pub fn from_env(env: &dyn Environment) -> Self {
        Self {
            persistence_enabled: env.value_or("PERSISTENCE_ENABLED", "false") == "true",
            data_dir: env.value_or("DATA_DIR", "/data"),
            node_conf_dir: env.value_or("NODE_CONF_DIR", "/node-conf"),
            major_version: env.value_or("REDIS_MAJOR_VERSION", "v7"),
            cluster_mode: env.get("SETUP_MODE").is_some_and(|m| m == "cluster"),
            tls_enabled: env.is_true("TLS_MODE"),
            nodeport: env.is_true("NODEPORT"),
        }
    }

    /// Redis 7 can announce hostnames instead of IPs
    pub fn is_v7(&self) -> bool {
        self.major_version == "v7"
    }

    /// Value of the `cluster-config-file` directive
    pub fn cluster_config_file(&self) -> String {
        format!("{}/{}", self.node_conf_dir, NODES_CONF_FILE)
    }

    pub fn nodes_conf_path(&self) -> PathBuf {
        PathBuf::from(&self.node_conf_dir).join(NODES_CONF_FILE)
    }
}
