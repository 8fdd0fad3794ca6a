//! Runtime topology discovery
//!
//! Facts only known inside the running pod: its routable IP, its hostname, and
//! the state of any nodes.conf left behind by a previous incarnation.

use std::path::Path;
use std::process::Command;

use log::info;

use crate::cluster::nodes_conf::{PatchOutcome, patch_nodes_conf};
use crate::error::{Error, Result};

/// Capabilities the assemblers need from the host
pub trait TopologyProvider {
    /// The pod's IP as reported by the host, trimmed
    fn discover_self_ip(&self) -> Result<String>;

    /// The pod's hostname, if it can be determined
    fn pod_hostname(&self) -> Option<String>;

    /// Point the `myself` entry of the topology file at `new_ip`
    fn patch_self_entry(&self, path: &Path, new_ip: &str) -> Result<PatchOutcome>;
}

/// Discovery backed by `hostname -i` and the local filesystem
#[derive(Debug, Clone)]
pub struct HostTopology {
    program: String,
    args: Vec<String>,
}

impl Default for HostTopology {
    fn default() -> Self {
        Self::with_command("hostname", &["-i"])
    }
}

impl HostTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different command to report the pod IP
    pub fn with_command(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TopologyProvider for HostTopology {
    fn discover_self_ip(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| Error::Discovery(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(Error::Discovery(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let ip = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if ip.is_empty() {
            return Err(Error::Discovery(format!(
                "{} produced no output",
                self.program
            )));
        }
        Ok(ip)
    }

    fn pod_hostname(&self) -> Option<String> {
        hostname::get()
            .ok()
            .map(|h| h.to_string_lossy().into_owned())
            .filter(|h| !h.is_empty())
    }

    fn patch_self_entry(&self, path: &Path, new_ip: &str) -> Result<PatchOutcome> {
        patch_nodes_conf(path, new_ip)
    }
}

/// Discovery through `inner` that never touches the topology file
pub struct ReadOnlyTopology<'a> {
    inner: &'a dyn TopologyProvider,
}

impl<'a> ReadOnlyTopology<'a> {
    pub fn new(inner: &'a dyn TopologyProvider) -> Self {
        Self { inner }
    }
}

impl TopologyProvider for ReadOnlyTopology<'_> {
    fn discover_self_ip(&self) -> Result<String> {
        self.inner.discover_self_ip()
    }

    fn pod_hostname(&self) -> Option<String> {
        self.inner.pod_hostname()
    }

    fn patch_self_entry(&self, path: &Path, new_ip: &str) -> Result<PatchOutcome> {
        info!("Dry run: would point self entry in {:?} at {}", path, new_ip);
        Ok(PatchOutcome::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discover_trims_output() {
        let topology = HostTopology::with_command("echo", &["  10.1.2.3  "]);
        assert_eq!(topology.discover_self_ip().unwrap(), "10.1.2.3");
    }

    #[test]
    fn test_discover_missing_command() {
        let topology = HostTopology::with_command("redis-bootstrap-no-such-binary", &[]);
        assert!(matches!(
            topology.discover_self_ip(),
            Err(Error::Discovery(_))
        ));
    }

    #[test]
    fn test_discover_non_zero_exit() {
        let topology = HostTopology::with_command("false", &[]);
        assert!(matches!(
            topology.discover_self_ip(),
            Err(Error::Discovery(_))
        ));
    }

    #[test]
    fn test_discover_empty_output() {
        let topology = HostTopology::with_command("true", &[]);
        assert!(matches!(
            topology.discover_self_ip(),
            Err(Error::Discovery(_))
        ));
    }

    #[test]
    fn test_read_only_topology_leaves_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nodes.conf");
        let before = "abc 10.0.0.1:6379@16379 myself,master - 0 0 1 connected\n";
        fs::write(&path, before).unwrap();

        let host = HostTopology::with_command("echo", &["10.0.0.9"]);
        let topology = ReadOnlyTopology::new(&host);

        assert_eq!(topology.discover_self_ip().unwrap(), "10.0.0.9");
        assert_eq!(
            topology.patch_self_entry(&path, "10.0.0.9").unwrap(),
            PatchOutcome::Skipped
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }
}
