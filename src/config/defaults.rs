//! Embedded bootstrap configuration.
//!
//! Used until the first remote document is committed, so the security
//! applier always has usable trust material.

use std::collections::BTreeMap;

use crate::config::schema::{ChainedServer, ClientSettings, Configuration, Masquerade, TrustedCa};

const DIGICERT_HIGH_ASSURANCE_EV_ROOT: &str =
    include_str!("../../certs/digicert_high_assurance_ev_root_ca.pem");
const ISRG_ROOT_X1: &str = include_str!("../../certs/isrg_root_x1.pem");

/// Build the compiled-in configuration.
pub fn default_configuration() -> Configuration {
    Configuration {
        client: ClientSettings {
            chained_servers: default_chained_servers(),
            masquerade_sets: default_masquerade_sets(),
            extra: BTreeMap::new(),
        },
        trusted_cas: default_trusted_cas(),
        instance_id: String::new(),
        version_tag: String::new(),
    }
}

fn default_chained_servers() -> Vec<ChainedServer> {
    vec![ChainedServer {
        addr: "fallback.getiantem.org:443".to_string(),
        pipelined: true,
        weight: 1,
        qos: 10,
        trusted: true,
        ..Default::default()
    }]
}

fn default_masquerade_sets() -> BTreeMap<String, Vec<Masquerade>> {
    let cloudfront = [
        ("cloudfront.net", "54.182.0.1"),
        ("d1.cloudfront.net", "54.182.0.2"),
    ]
    .into_iter()
    .map(|(domain, ip)| Masquerade {
        domain: domain.to_string(),
        ip_address: ip.to_string(),
    })
    .collect();

    BTreeMap::from([("cloudfront".to_string(), cloudfront)])
}

fn default_trusted_cas() -> Vec<TrustedCa> {
    vec![
        TrustedCa {
            common_name: "DigiCert High Assurance EV Root CA".to_string(),
            cert: DIGICERT_HIGH_ASSURANCE_EV_ROOT.to_string(),
        },
        TrustedCa {
            common_name: "ISRG Root X1".to_string(),
            cert: ISRG_ROOT_X1.to_string(),
        },
    ]
}
