use log::{info, warn};

use crate::assembler::{Rule, RuleContext, acl_file, external_include, tls_material};
use crate::config::Dialect;
use crate::directive;
use crate::document::Directive;
use crate::sentinel::{MonitorSettings, SENTINEL_TLS_PORT};

pub const RULES: &[Rule] = &[
    Rule {
        name: "authentication",
        apply: authentication,
    },
    Rule {
        name: "monitor",
        apply: monitor,
    },
    Rule {
        name: "networking",
        apply: networking,
    },
    Rule {
        name: "acl",
        apply: acl_file,
    },
    Rule {
        name: "tls",
        apply: tls,
    },
    Rule {
        name: "external-include",
        apply: include,
    },
];

/// Unlike redis, an explicitly empty password still turns auth on
fn authentication(ctx: &RuleContext<'_>) -> Vec<Directive> {
    match ctx.env.get("REDIS_PASSWORD") {
        Some(password) => vec![
            directive!("masterauth", &password),
            directive!("requirepass", password),
            directive!("protected-mode", "yes"),
        ],
        None => {
            warn!("Sentinel is running without password which is not recommended");
            vec![directive!("protected-mode", "no")]
        }
    }
}

fn monitor(ctx: &RuleContext<'_>) -> Vec<Directive> {
    let m = MonitorSettings::from_env(ctx.env);

    let mut directives = vec![
        directive!("sentinel monitor", &m.group, &m.ip, &m.port, &m.quorum),
        directive!("sentinel down-after-milliseconds", &m.group, &m.down_after_ms),
        directive!("sentinel parallel-syncs", &m.group, &m.parallel_syncs),
        directive!("sentinel failover-timeout", &m.group, &m.failover_timeout),
        directive!("sentinel resolve-hostnames", &m.resolve_hostnames),
        directive!("sentinel announce-hostnames", &m.announce_hostnames),
    ];

    if let Some(pass) = &m.auth_pass {
        directives.push(directive!("sentinel auth-pass", &m.group, pass));
    }

    // Written as given; no SHA1 derivation of the identity
    if let Some(id) = &m.myid {
        directives.push(directive!("sentinel myid", id));
    }

    if m.announces_hostnames() {
        directives.push(directive!("sentinel announce-ip", &m.ip));
    }
    directives
}

fn networking(ctx: &RuleContext<'_>) -> Vec<Directive> {
    vec![directive!(
        "port",
        ctx.env.value_or("SENTINEL_PORT", "26379")
    )]
}

fn tls(ctx: &RuleContext<'_>) -> Vec<Directive> {
    if !ctx.env.is_true("TLS_MODE") {
        info!("Running sentinel without TLS mode");
        return Vec::new();
    }

    let mut directives = vec![
        directive!("port", "0"),
        directive!("tls-port", SENTINEL_TLS_PORT),
    ];
    directives.extend(tls_material(ctx.env));
    directives
}

fn include(ctx: &RuleContext<'_>) -> Vec<Directive> {
    external_include(ctx, Dialect::Sentinel.default_external_config())
}
