//! Sentinel monitor settings
//!
//! Values are forwarded verbatim into sentinel.conf; sentinel itself rejects
//! malformed numbers at startup.

use crate::env::Environment;

/// Monitoring parameters for the single master group a sentinel pod watches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Master group name (default "mymaster")
    pub group: String,
    /// Master IP address (default "0.0.0.0")
    pub ip: String,
    /// Master port (default 6379)
    pub port: String,
    /// Quorum for ODOWN detection (default 2)
    pub quorum: String,
    /// Milliseconds before marking as SDOWN (default 30000)
    pub down_after_ms: String,
    /// Number of replicas to reconfigure in parallel (default 1)
    pub parallel_syncs: String,
    /// Failover timeout in milliseconds (default 180000)
    pub failover_timeout: String,
    /// "yes" or "no" (default "no")
    pub resolve_hostnames: String,
    /// "yes" or "no" (default "no")
    pub announce_hostnames: String,
    /// Password for the monitored master, if set (possibly empty)
    pub auth_pass: Option<String>,
    /// Sentinel identity, if set
    pub myid: Option<String>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            group: "mymaster".to_string(),
            ip: "0.0.0.0".to_string(),
            port: "6379".to_string(),
            quorum: "2".to_string(),
            down_after_ms: "30000".to_string(),
            parallel_syncs: "1".to_string(),
            failover_timeout: "180000".to_string(),
            resolve_hostnames: "no".to_string(),
            announce_hostnames: "no".to_string(),
            auth_pass: None,
            myid: None,
        }
    }
}

impl MonitorSettings {
    pub fn from_env(env: &dyn Environment) -> Self {
        let defaults = Self::default();
        Self {
            group: env.value_or("MASTER_GROUP_NAME", &defaults.group),
            ip: env.value_or("IP", &defaults.ip),
            port: env.value_or("PORT", &defaults.port),
            quorum: env.value_or("QUORUM", &defaults.quorum),
            down_after_ms: env.value_or("DOWN_AFTER_MILLISECONDS", &defaults.down_after_ms),
            parallel_syncs: env.value_or("PARALLEL_SYNCS", &defaults.parallel_syncs),
            failover_timeout: env.value_or("FAILOVER_TIMEOUT", &defaults.failover_timeout),
            resolve_hostnames: env.value_or("RESOLVE_HOSTNAMES", &defaults.resolve_hostnames),
            announce_hostnames: env.value_or("ANNOUNCE_HOSTNAMES", &defaults.announce_hostnames),
            auth_pass: env.get("MASTER_PASSWORD"),
            myid: env.get("SENTINEL_ID"),
        }
    }

    /// Announce the master by the configured address only when both hostname flags are on
    pub fn announces_hostnames(&self) -> bool {
        self.announce_hostnames == "yes" && self.resolve_hostnames == "yes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;

    #[test]
    fn test_monitor_defaults() {
        let settings = MonitorSettings::from_env(&MapEnv::new());

        assert_eq!(settings, MonitorSettings::default());
        assert_eq!(settings.down_after_ms, "30000");
        assert_eq!(settings.failover_timeout, "180000");
        assert_eq!(settings.parallel_syncs, "1");
        assert!(!settings.announces_hostnames());
    }

    #[test]
    fn test_monitor_from_env() {
        let env = MapEnv::new()
            .with("MASTER_GROUP_NAME", "cache")
            .with("IP", "redis-replication-leader")
            .with("QUORUM", "3")
            .with("MASTER_PASSWORD", "")
            .with("RESOLVE_HOSTNAMES", "yes")
            .with("ANNOUNCE_HOSTNAMES", "yes");
        let settings = MonitorSettings::from_env(&env);

        assert_eq!(settings.group, "cache");
        assert_eq!(settings.ip, "redis-replication-leader");
        assert_eq!(settings.quorum, "3");
        assert_eq!(settings.auth_pass.as_deref(), Some(""));
        assert_eq!(settings.myid, None);
        assert!(settings.announces_hostnames());
    }
}
