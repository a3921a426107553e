//! Remote configuration schema definitions.
//!
//! Field names are the wire contract of the cloud configuration document.
//! Every collection is ordered (`Vec`, `BTreeMap`) so that the derived
//! `PartialEq` is a deterministic field-by-field comparison in which list
//! order is significant.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Keys the core does not interpret, kept so they take part in equality.
pub type ExtraFields = BTreeMap<String, serde_yaml::Value>;

/// Masquerade sets keyed by set name.
pub type MasqueradeSets = BTreeMap<String, Vec<Masquerade>>;

/// Root of the cloud configuration document.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Configuration {
    /// Proxy client settings (chained servers, masquerades).
    #[serde(default, deserialize_with = "null_as_default")]
    pub client: ClientSettings,

    /// Certificate authorities trusted for fronted connections.
    #[serde(default, rename = "trustedcas", deserialize_with = "null_as_default")]
    pub trusted_cas: Vec<TrustedCa>,

    /// Opaque instance identifier.
    #[serde(default, rename = "instanceid")]
    pub instance_id: String,

    /// Opaque version tag.
    #[serde(default, rename = "firetweetversion")]
    pub version_tag: String,
}

/// Client settings block.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ClientSettings {
    /// Chained proxy servers. At least one is required for a usable config.
    #[serde(
        default,
        rename = "chainedservers",
        alias = "chainedServers",
        deserialize_with = "null_as_default"
    )]
    pub chained_servers: Vec<ChainedServer>,

    /// Domain-fronting masquerades grouped by set.
    #[serde(
        default,
        rename = "masqueradesets",
        alias = "masqueradeSets",
        deserialize_with = "null_as_default"
    )]
    pub masquerade_sets: MasqueradeSets,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A chained proxy server entry.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainedServer {
    /// Host and port of the server.
    pub addr: String,

    /// PEM certificate presented by the server.
    pub cert: String,

    #[serde(rename = "authtoken")]
    pub auth_token: String,

    pub pipelined: bool,

    pub weight: i32,

    pub qos: i32,

    pub trusted: bool,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A front domain paired with the address to dial.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Masquerade {
    pub domain: String,

    #[serde(default, rename = "ipaddress")]
    pub ip_address: String,
}

/// Trusted certificate authority record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct TrustedCa {
    #[serde(default, rename = "commonname")]
    pub common_name: String,

    /// PEM-encoded certificate.
    pub cert: String,
}

/// A YAML null (`key: ~` or `key:` with no value) reads as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counts and identity strings for log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSummary {
    pub chained_servers: usize,
    pub masquerade_sets: usize,
    pub masquerades: usize,
    pub trusted_cas: usize,
    pub instance_id: String,
    pub version_tag: String,
}

impl Configuration {
    /// PEM strings of the trusted CAs, in document order.
    pub fn trusted_certs(&self) -> Vec<&str> {
        self.trusted_cas.iter().map(|ca| ca.cert.as_str()).collect()
    }

    /// Summarize the configuration without exposing certificate material.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            chained_servers: self.client.chained_servers.len(),
            masquerade_sets: self.client.masquerade_sets.len(),
            masquerades: self.client.masquerade_sets.values().map(Vec::len).sum(),
            trusted_cas: self.trusted_cas.len(),
            instance_id: self.instance_id.clone(),
            version_tag: self.version_tag.clone(),
        }
    }
}
