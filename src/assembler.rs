//! Config assembly
//!
//! Each dialect is an ordered list of [`Rule`]s. A rule looks at the
//! environment and the topology provider and returns the directives for its
//! block; the assembler concatenates them in list order onto the dialect's
//! preamble. Output order therefore never depends on environment iteration.

use std::io::Write;
use std::path::Path;

use log::{debug, info};

use crate::cluster::{ReadOnlyTopology, TopologyProvider};
use crate::config::{ACL_FILE, BootstrapConfig, Dialect};
use crate::directive;
use crate::document::{ConfigDocument, Directive};
use crate::env::Environment;
use crate::error::Result;

/// Inputs available to every rule
pub struct RuleContext<'a> {
    pub env: &'a dyn Environment,
    pub topology: &'a dyn TopologyProvider,
}

impl<'a> RuleContext<'a> {
    pub fn new(env: &'a dyn Environment, topology: &'a dyn TopologyProvider) -> Self {
        Self { env, topology }
    }
}

/// A named block of directives
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&RuleContext<'_>) -> Vec<Directive>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Rule").field(&self.name).finish()
    }
}

/// Run every rule of `dialect` in order and collect the result
pub fn assemble(dialect: Dialect, path: &Path, ctx: &RuleContext<'_>) -> ConfigDocument {
    let mut doc = ConfigDocument::new(path, dialect.preamble());
    for rule in dialect.rules() {
        let directives = (rule.apply)(ctx);
        debug!("{} rule '{}': {} directives", dialect, rule.name, directives.len());
        doc.extend(directives);
    }
    doc
}

/// Assemble and commit (or print, for a dry run) the config for one container start
pub fn run(config: &BootstrapConfig, ctx: &RuleContext<'_>) -> Result<()> {
    info!(
        "Generating {} config at {:?}",
        config.dialect, config.output
    );

    if config.dry_run {
        let topology = ReadOnlyTopology::new(ctx.topology);
        let ctx = RuleContext::new(ctx.env, &topology);
        let doc = assemble(config.dialect, &config.output, &ctx);

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(doc.render().as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    assemble(config.dialect, &config.output, ctx).commit()?;

    if config.dialect == Dialect::Sentinel {
        info!("Starting sentinel service .....");
    }
    Ok(())
}

/// `aclfile` when `ACL_MODE=true`
pub(crate) fn acl_file(ctx: &RuleContext<'_>) -> Vec<Directive> {
    if ctx.env.is_true("ACL_MODE") {
        vec![directive!("aclfile", ACL_FILE)]
    } else {
        info!("ACL_MODE is not true, skipping ACL file modification");
        Vec::new()
    }
}

/// `include` for the operator override file, if it exists
pub(crate) fn external_include(ctx: &RuleContext<'_>, default_path: &str) -> Vec<Directive> {
    let path = ctx.env.value_or("EXTERNAL_CONFIG_FILE", default_path);
    if Path::new(&path).exists() {
        vec![directive!("include", path)]
    } else {
        debug!("No external config at {}", path);
        Vec::new()
    }
}

/// Certificate, key and CA paths plus optional client auth.
///
/// Paths are passed through unchecked; the server validates them at startup.
pub(crate) fn tls_material(env: &dyn Environment) -> Vec<Directive> {
    vec![
        directive!("tls-cert-file", env.value_or("REDIS_TLS_CERT", "")),
        directive!("tls-key-file", env.value_or("REDIS_TLS_CERT_KEY", "")),
        directive!("tls-ca-cert-file", env.value_or("REDIS_TLS_CA_KEY", "")),
        directive!("tls-auth-clients", "optional"),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    use crate::cluster::{PatchOutcome, TopologyProvider};
    use crate::error::{Error, Result};

    /// In-memory topology that records patch requests
    #[derive(Debug, Default)]
    pub struct FakeTopology {
        pub ip: Option<String>,
        pub hostname: Option<String>,
        pub patched: RefCell<Vec<(PathBuf, String)>>,
    }

    impl FakeTopology {
        pub fn new(ip: &str, hostname: &str) -> Self {
            Self {
                ip: Some(ip.to_string()),
                hostname: Some(hostname.to_string()),
                patched: RefCell::new(Vec::new()),
            }
        }

        pub fn unavailable() -> Self {
            Self::default()
        }
    }

    impl TopologyProvider for FakeTopology {
        fn discover_self_ip(&self) -> Result<String> {
            self.ip
                .clone()
                .ok_or_else(|| Error::Discovery("hostname: not found".to_string()))
        }

        fn pod_hostname(&self) -> Option<String> {
            self.hostname.clone()
        }

        fn patch_self_entry(&self, path: &Path, new_ip: &str) -> Result<PatchOutcome> {
            self.patched
                .borrow_mut()
                .push((path.to_path_buf(), new_ip.to_string()));
            Ok(PatchOutcome::Patched)
        }
    }

    /// Rendered lines after the preamble
    pub fn lines(rendered: &str, preamble: &str) -> Vec<String> {
        rendered
            .strip_prefix(preamble)
            .expect("output starts with preamble")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeTopology;
    use super::*;
    use crate::cluster::HostTopology;
    use crate::env::MapEnv;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_acl_file_requires_exact_true() {
        let topology = FakeTopology::unavailable();
        let on = MapEnv::new().with("ACL_MODE", "true");
        let off = MapEnv::new().with("ACL_MODE", "yes");

        assert_eq!(
            acl_file(&RuleContext::new(&on, &topology)),
            vec![directive!("aclfile", "/etc/redis/user.acl")]
        );
        assert!(acl_file(&RuleContext::new(&off, &topology)).is_empty());
    }

    #[test]
    fn test_external_include_only_when_file_exists() {
        let dir = tempdir().unwrap();
        let extra = dir.path().join("redis-additional.conf");
        let env = MapEnv::new().with("EXTERNAL_CONFIG_FILE", extra.to_str().unwrap());
        let topology = FakeTopology::unavailable();
        let ctx = RuleContext::new(&env, &topology);

        assert!(external_include(&ctx, "/nonexistent").is_empty());

        fs::write(&extra, "maxclients 100\n").unwrap();
        assert_eq!(
            external_include(&ctx, "/nonexistent"),
            vec![directive!("include", extra.to_str().unwrap())]
        );
    }

    #[test]
    fn test_run_commits_and_dry_run_does_not() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("sentinel.conf");
        let env = MapEnv::new();
        let topology = FakeTopology::unavailable();
        let ctx = RuleContext::new(&env, &topology);

        let mut config = BootstrapConfig::new(Dialect::Sentinel);
        config.output = output.clone();
        config.dry_run = true;
        run(&config, &ctx).unwrap();
        assert!(!output.exists());

        config.dry_run = false;
        run(&config, &ctx).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with(Dialect::Sentinel.preamble()));
        assert!(written.contains("port 26379\n"));
    }

    #[test]
    fn test_dry_run_keeps_nodes_conf() {
        let dir = tempdir().unwrap();
        let nodes_conf = dir.path().join("nodes.conf");
        let before = "abc 10.0.0.1:6379@16379 myself,master - 0 0 1 connected\n";
        fs::write(&nodes_conf, before).unwrap();

        let env = MapEnv::new()
            .with("SETUP_MODE", "cluster")
            .with("NODE_CONF_DIR", dir.path().to_str().unwrap());
        let topology = HostTopology::with_command("echo", &["10.0.0.9"]);
        let ctx = RuleContext::new(&env, &topology);

        let mut config = BootstrapConfig::new(Dialect::Redis);
        config.output = dir.path().join("redis.conf");
        config.dry_run = true;
        run(&config, &ctx).unwrap();

        assert_eq!(fs::read_to_string(&nodes_conf).unwrap(), before);
        assert!(!config.output.exists());

        config.dry_run = false;
        run(&config, &ctx).unwrap();
        assert!(
            fs::read_to_string(&nodes_conf)
                .unwrap()
                .starts_with("abc 10.0.0.9:6379@16379 myself")
        );
    }

    #[test]
    fn test_run_propagates_commit_failure() {
        let dir = tempdir().unwrap();
        let env = MapEnv::new();
        let topology = FakeTopology::unavailable();
        let ctx = RuleContext::new(&env, &topology);

        let mut config = BootstrapConfig::new(Dialect::Redis);
        config.output = dir.path().join("missing").join("redis.conf");
        assert!(matches!(
            run(&config, &ctx),
            Err(crate::error::Error::Commit { .. })
        ));
    }
}
