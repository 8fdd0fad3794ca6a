use log::{info, warn};

use crate::assembler::{Rule, RuleContext, acl_file, external_include, tls_material};
use crate::config::Dialect;
use crate::directive;
use crate::document::Directive;
use crate::redis::RedisSettings;

/// Max memory limit forwarded from the custom resource
const MAX_MEMORY_VAR: &str = "REDIS_MAX_MEMORY";

pub const RULES: &[Rule] = &[
    Rule {
        name: "authentication",
        apply: authentication,
    },
    Rule {
        name: "mode",
        apply: mode,
    },
    Rule {
        name: "tls",
        apply: tls,
    },
    Rule {
        name: "acl",
        apply: acl_file,
    },
    Rule {
        name: "persistence",
        apply: persistence,
    },
    Rule {
        name: "networking",
        apply: networking,
    },
    Rule {
        name: "external-include",
        apply: include,
    },
    Rule {
        name: "cluster-announce",
        apply: cluster_announce,
    },
    Rule {
        name: "max-memory",
        apply: max_memory,
    },
];

/// Auth is only enabled for a non-empty password
fn authentication(ctx: &RuleContext<'_>) -> Vec<Directive> {
    match ctx.env.non_empty("REDIS_PASSWORD") {
        Some(password) => vec![
            directive!("masterauth", &password),
            directive!("requirepass", password),
            directive!("protected-mode", "yes"),
        ],
        None => {
            warn!("Redis is running without password which is not recommended");
            vec![directive!("protected-mode", "no")]
        }
    }
}

fn mode(ctx: &RuleContext<'_>) -> Vec<Directive> {
    let settings = RedisSettings::from_env(ctx.env);
    if !settings.cluster_mode {
        info!("Setting up redis in standalone mode");
        return Vec::new();
    }

    let directives = vec![
        directive!("cluster-enabled", "yes"),
        directive!("cluster-node-timeout", "5000"),
        directive!("cluster-require-full-coverage", "no"),
        directive!("cluster-migration-barrier", "1"),
        directive!("cluster-config-file", settings.cluster_config_file()),
    ];

    // The pod IP changes across restarts; a stale self entry would be gossiped
    match ctx.topology.discover_self_ip() {
        Ok(pod_ip) => {
            let path = settings.nodes_conf_path();
            if let Err(e) = ctx.topology.patch_self_entry(&path, &pod_ip) {
                warn!("Failed to update {:?}: {}", path, e);
            }
        }
        Err(e) => warn!("Failed to get pod IP: {}", e),
    }

    directives
}

fn tls(ctx: &RuleContext<'_>) -> Vec<Directive> {
    let settings = RedisSettings::from_env(ctx.env);
    if !settings.tls_enabled {
        info!("Running without TLS mode");
        return Vec::new();
    }

    let mut directives = tls_material(ctx.env);
    directives.push(directive!("tls-replication", "yes"));

    if settings.cluster_mode {
        directives.push(directive!("tls-cluster", "yes"));
        if settings.is_v7() {
            directives.push(directive!("cluster-preferred-endpoint-type", "hostname"));
        }
    }
    directives
}

fn persistence(ctx: &RuleContext<'_>) -> Vec<Directive> {
    let settings = RedisSettings::from_env(ctx.env);
    if !settings.persistence_enabled {
        info!("Running without persistence mode");
        return Vec::new();
    }

    // Key casing kept as shipped; redis lowercases directive names when parsing
    vec![
        directive!("save", "900 1"),
        directive!("save", "300 10"),
        directive!("save", "60 10000"),
        directive!("Appendonly", "yes"),
        directive!("Appendfilename", "\"Appendonly.aof\""),
        directive!("dir", settings.data_dir),
    ]
}

fn networking(ctx: &RuleContext<'_>) -> Vec<Directive> {
    let settings = RedisSettings::from_env(ctx.env);
    let redis_port = ctx.env.value_or("REDIS_PORT", "6379");

    let mut directives = if settings.tls_enabled {
        vec![
            directive!("port", "0"),
            directive!("tls-port", redis_port),
        ]
    } else {
        vec![directive!("port", redis_port)]
    };

    // Announce ports only mean something to cluster peers
    if settings.nodeport && settings.cluster_mode {
        let pod = ctx
            .topology
            .pod_hostname()
            .unwrap_or_default()
            .replace('-', "_");

        if let Some(port) = ctx.env.non_empty(&format!("announce_port_{}", pod)) {
            directives.push(directive!("cluster-announce-port", port));
        }
        if let Some(port) = ctx.env.non_empty(&format!("announce_bus_port_{}", pod)) {
            directives.push(directive!("cluster-announce-bus-port", port));
        }
    }
    directives
}

fn include(ctx: &RuleContext<'_>) -> Vec<Directive> {
    external_include(ctx, Dialect::Redis.default_external_config())
}

fn cluster_announce(ctx: &RuleContext<'_>) -> Vec<Directive> {
    let settings = RedisSettings::from_env(ctx.env);
    if !settings.cluster_mode {
        return Vec::new();
    }

    let Some(pod_hostname) = ctx.topology.pod_hostname() else {
        warn!("Could not determine pod hostname, skipping cluster announce");
        return Vec::new();
    };

    let announce_ip = if settings.nodeport {
        ctx.env.get("HOST_IP").unwrap_or_default()
    } else {
        ctx.topology.discover_self_ip().unwrap_or_else(|e| {
            warn!("Failed to get pod IP for cluster-announce-ip: {}", e);
            String::new()
        })
    };

    let mut directives = Vec::new();
    if !announce_ip.is_empty() {
        directives.push(directive!("cluster-announce-ip", announce_ip));
    }
    if settings.is_v7() {
        directives.push(directive!("cluster-announce-hostname", pod_hostname));
    }
    directives
}

fn max_memory(ctx: &RuleContext<'_>) -> Vec<Directive> {
    ctx.env
        .non_empty(MAX_MEMORY_VAR)
        .map(|limit| vec![directive!("maxmemory", limit)])
        .unwrap_or_default()
}
