mod file;

pub use file::{from_file, from_str, Format};

use std::net::Ipv4Addr;
use std::path::PathBuf;

use ipnetwork::IpNetwork;
use log::info;
use serde::{Deserialize, Serialize};

use crate::filter::Family;
use crate::utils::parse_prefix;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("files with extension '{0}' are not supported (acceptable values are yaml, yml, toml, json)")]
    UnsupportedFormat(String),
    #[error("YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("router ID {0} is not in valid dotted quad notation")]
    InvalidRouterId(String),
    #[error("{0} is not a valid IPv4 or IPv6 prefix in CIDR notation")]
    InvalidPrefix(String),
}

/// Config file representation of this router and all of its peers
#[derive(Clone, Debug, Deserialize)]
pub struct GlobalConfig {
    pub asn: u32,
    #[serde(rename = "router-id")]
    pub router_id: String,
    // Prefixes originated by this router
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default, deserialize_with = "file::deserialize_peers")]
    pub peers: Vec<(String, PeerRecord)>,
    // IRR server queried for AS-Set expansion
    #[serde(
        default = "file::Defaults::irrdb",
        deserialize_with = "file::deserialize_irrdb"
    )]
    pub irrdb: String,
    // RPKI-to-router server handed through to the daemon config
    #[serde(
        default = "file::Defaults::rtrserver",
        deserialize_with = "file::deserialize_rtrserver"
    )]
    pub rtrserver: String,
}

/// Config file representation of a single peer network
///
/// Policy and action fields are kept as written so that unsupported values
/// are reported against the peer that carries them.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PeerRecord {
    pub asn: u32,
    #[serde(default, rename = "as-set")]
    pub as_set: String,
    #[serde(default, rename = "maxpfx4")]
    pub max_prefix4: u64,
    #[serde(default, rename = "maxpfx6")]
    pub max_prefix6: u64,
    #[serde(default, rename = "pfxlimitaction")]
    pub limit_action: String,
    #[serde(default, rename = "pfxfilter4")]
    pub filter4: Vec<String>,
    #[serde(default, rename = "pfxfilter6")]
    pub filter6: Vec<String>,
    #[serde(default, rename = "import")]
    pub import_policy: String,
    #[serde(default, rename = "export")]
    pub export_policy: String,
    #[serde(default, rename = "localpref")]
    pub local_pref: u32,
    #[serde(default)]
    pub neighbors: Vec<String>,
    #[serde(default)]
    pub multihop: bool,
    #[serde(default)]
    pub passive: bool,
    #[serde(default)]
    pub disabled: bool,
    // Pull max-prefix limits from PeeringDB
    #[serde(default, rename = "automaxpfx")]
    pub auto_max_prefix: bool,
    // Build prefix filters from the IRR via the peer's PeeringDB AS-Set
    #[serde(default, rename = "autopfxfilter")]
    pub auto_prefix_filter: bool,
    // Filter language snippets run before the generated import/export logic
    #[serde(default, rename = "preimport")]
    pub pre_import: Option<String>,
    #[serde(default, rename = "preexport")]
    pub pre_export: Option<String>,
    #[serde(default)]
    pub prepends: u32,
}

/// Validated global settings, the part of a config shared by every peer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GlobalSettings {
    pub asn: u32,
    pub router_id: Ipv4Addr,
    pub irrdb: String,
    pub rtrserver: String,
    pub prefixes4: Vec<IpNetwork>,
    pub prefixes6: Vec<IpNetwork>,
}

impl GlobalConfig {
    /// Check router ID and originated prefixes, splitting the latter per family
    pub fn settings(&self) -> Result<GlobalSettings, ConfigError> {
        info!("Using IRRDB server {}", self.irrdb);
        info!("Using RTR server {}", self.rtrserver);

        let router_id: Ipv4Addr = self
            .router_id
            .parse()
            .map_err(|_| ConfigError::InvalidRouterId(self.router_id.clone()))?;

        let mut prefixes4 = Vec::new();
        let mut prefixes6 = Vec::new();
        for prefix in &self.prefixes {
            let network =
                parse_prefix(prefix).ok_or_else(|| ConfigError::InvalidPrefix(prefix.clone()))?;
            match Family::of(prefix) {
                Family::Ipv4 => prefixes4.push(network),
                Family::Ipv6 => prefixes6.push(network),
            }
        }

        Ok(GlobalSettings {
            asn: self.asn,
            router_id,
            irrdb: self.irrdb.clone(),
            rtrserver: self.rtrserver.clone(),
            prefixes4,
            prefixes6,
        })
    }
}
