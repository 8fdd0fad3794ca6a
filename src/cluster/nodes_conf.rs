//! nodes.conf self-entry patching
//!
//! The cluster state file is owned by the server. Before the server starts,
//! the only edit made here is swapping the IPv4 address on the line flagged
//! `myself` for the pod's current address, since pod IPs change across restarts:
//! ```text
//! <node-id> <ip:port@cport> myself,master - 0 0 1 connected 0-5460
//! ```
//! Every other byte of the file is preserved.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use log::{debug, info};
use regex::bytes::{NoExpand, Regex};

use crate::document::write_atomic;
use crate::error::{Error, Result};

/// Flag identifying the local node's line
pub const SELF_MARKER: &[u8] = b"myself";

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}").expect("valid IPv4 pattern")
});

/// What happened to the topology file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// No file yet: a fresh member
    Missing,
    /// No line carries the self marker
    NoSelfEntry,
    /// Self entry has no IPv4 literal, or already has the new address
    Unchanged,
    Patched,
    /// Dry run: the file was not opened
    Skipped,
}

/// Replace the first IPv4 literal on the first `myself` line.
///
/// Returns `None` when nothing would change.
pub fn patch_self_entry_bytes(content: &[u8], new_ip: &str) -> Option<Vec<u8>> {
    let mut offset = 0;
    for line in content.split_inclusive(|b| *b == b'\n') {
        if contains(line, SELF_MARKER) {
            let patched = IPV4.replacen(line, 1, NoExpand(new_ip.as_bytes()));
            if &*patched == line {
                return None;
            }

            let mut out = Vec::with_capacity(content.len() + new_ip.len());
            out.extend_from_slice(&content[..offset]);
            out.extend_from_slice(&patched);
            out.extend_from_slice(&content[offset + line.len()..]);
            return Some(out);
        }
        offset += line.len();
    }
    None
}

/// Patch the self entry of the topology file at `path` in place.
///
/// A missing file is not an error.
pub fn patch_nodes_conf(path: &Path, new_ip: &str) -> Result<PatchOutcome> {
    if !path.exists() {
        debug!("No cluster topology file at {:?}, nothing to patch", path);
        return Ok(PatchOutcome::Missing);
    }

    let to_topology_err = |source| Error::Topology {
        path: path.to_path_buf(),
        source,
    };

    let content = fs::read(path).map_err(to_topology_err)?;

    if !content
        .split(|b| *b == b'\n')
        .any(|line| contains(line, SELF_MARKER))
    {
        return Ok(PatchOutcome::NoSelfEntry);
    }

    let Some(patched) = patch_self_entry_bytes(&content, new_ip) else {
        return Ok(PatchOutcome::Unchanged);
    };

    write_atomic(path, &patched).map_err(to_topology_err)?;
    info!("Updated self entry in {:?} to {}", path, new_ip);
    Ok(PatchOutcome::Patched)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const NODES: &str = "\
e7d1eecce10fd6bb5eb35b9f99a514335d9ba9ca 10.0.0.2:6379@16379 master - 0 1426238316232 2 connected 5461-10922
67ed2db8d677e59ec4a4cefb06858cf2a1a89fa1 10.0.0.1:6379@16379 myself,master - 0 0 1 connected 0-5460
292f8b365bb7edb5e285caf0b7e6ddc7265d2f4f 10.0.0.3:6379@16379 master - 0 1426238318243 3 connected 10923-16383
vars currentEpoch 3 lastVoteEpoch 0
";

    #[test]
    fn test_patch_only_touches_self_line() {
        let patched = patch_self_entry_bytes(NODES.as_bytes(), "10.0.0.9").unwrap();
        let patched = String::from_utf8(patched).unwrap();

        let expected = NODES.replace(
            "67ed2db8d677e59ec4a4cefb06858cf2a1a89fa1 10.0.0.1:",
            "67ed2db8d677e59ec4a4cefb06858cf2a1a89fa1 10.0.0.9:",
        );
        assert_eq!(patched, expected);
    }

    #[test]
    fn test_patch_replaces_first_literal_only() {
        let content = b"abc 10.0.0.1:6379@16379,10.0.0.1 myself,master\n";
        let patched = patch_self_entry_bytes(content, "10.0.0.9").unwrap();
        assert_eq!(patched, b"abc 10.0.0.9:6379@16379,10.0.0.1 myself,master\n");
    }

    #[test]
    fn test_patch_same_ip_is_noop() {
        assert_eq!(patch_self_entry_bytes(NODES.as_bytes(), "10.0.0.1"), None);
    }

    #[test]
    fn test_patch_without_ipv4_on_self_line() {
        let content = b"abc :0@0 myself,master - 0 0 0 connected\n";
        assert_eq!(patch_self_entry_bytes(content, "10.0.0.9"), None);
    }

    #[test]
    fn test_patch_keeps_crlf_and_missing_trailing_newline() {
        let content = b"a 1.1.1.1:1@2 master\r\nb 2.2.2.2:1@2 myself,master";
        let patched = patch_self_entry_bytes(content, "10.0.0.9").unwrap();
        assert_eq!(patched, b"a 1.1.1.1:1@2 master\r\nb 10.0.0.9:1@2 myself,master");
    }

    #[test]
    fn test_replacement_is_literal() {
        let content = b"a 1.1.1.1:1@2 myself\n";
        let patched = patch_self_entry_bytes(content, "$0").unwrap();
        assert_eq!(patched, b"a $0:1@2 myself\n");
    }

    #[test]
    fn test_patch_nodes_conf_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nodes.conf");
        assert_eq!(
            patch_nodes_conf(&path, "10.0.0.9").unwrap(),
            PatchOutcome::Missing
        );
        assert!(!path.exists());
    }

    #[test]
    fn test_patch_nodes_conf_rewrites_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nodes.conf");
        fs::write(&path, NODES).unwrap();

        assert_eq!(
            patch_nodes_conf(&path, "10.0.0.9").unwrap(),
            PatchOutcome::Patched
        );
        let after = fs::read_to_string(&path).unwrap();
        assert!(after.contains("10.0.0.9:6379@16379 myself,master"));
        assert!(after.contains("10.0.0.2:6379@16379 master"));
        assert!(after.ends_with("vars currentEpoch 3 lastVoteEpoch 0\n"));

        // Second run with the same address leaves the file alone
        assert_eq!(
            patch_nodes_conf(&path, "10.0.0.9").unwrap(),
            PatchOutcome::Unchanged
        );
    }

    #[test]
    fn test_patch_nodes_conf_without_self_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nodes.conf");
        fs::write(&path, "vars currentEpoch 0 lastVoteEpoch 0\n").unwrap();

        assert_eq!(
            patch_nodes_conf(&path, "10.0.0.9").unwrap(),
            PatchOutcome::NoSelfEntry
        );
    }
}
