//! Cluster topology handling
//!
//! Pod IP discovery and the nodes.conf self-entry fixup done before a cluster
//! member starts.

pub mod nodes_conf;
pub mod topology;

pub use nodes_conf::{PatchOutcome, patch_nodes_conf};
pub use topology::{HostTopology, ReadOnlyTopology, TopologyProvider};

/// Name of the topology file inside `NODE_CONF_DIR`
pub const NODES_CONF_FILE: &str = "nodes.conf";
