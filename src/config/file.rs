use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use log::debug;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use super::{ConfigError, GlobalConfig, PeerRecord};

/// Supported configuration encodings, chosen by file extension
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        match extension {
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            "json" => Ok(Format::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let word = match self {
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
            Format::Json => "JSON",
        };
        write!(f, "{}", word)
    }
}

/// Parse a YAML, TOML or JSON config file (by extension) and return a GlobalConfig
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<GlobalConfig, ConfigError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    debug!("Using {} configuration format", format);
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_str(&contents, format)
}

pub fn from_str(contents: &str, format: Format) -> Result<GlobalConfig, ConfigError> {
    let config = match format {
        Format::Yaml => serde_yaml::from_str(contents)?,
        Format::Toml => toml::from_str(contents)?,
        Format::Json => serde_json::from_str(contents)?,
    };
    Ok(config)
}

pub(super) struct Defaults {}

impl Defaults {
    pub(super) fn irrdb() -> String {
        "rr.ntt.net".to_string()
    }

    pub(super) fn rtrserver() -> String {
        "127.0.0.1".to_string()
    }
}

/// Peers keep their file order so generated output is deterministic
pub(super) fn deserialize_peers<'de, D>(deserializer: D) -> Result<Vec<(String, PeerRecord)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PeersVisitor(PhantomData<PeerRecord>);

    impl<'de> Visitor<'de> for PeersVisitor {
        type Value = Vec<(String, PeerRecord)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of peer name to peer config")
        }

        fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut seen = HashSet::new();
            let mut peers = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, peer)) = access.next_entry::<String, PeerRecord>()? {
                if !seen.insert(name.clone()) {
                    return Err(de::Error::custom(format!("Duplicate peer: '{}'", name)));
                }
                peers.push((name, peer));
            }
            Ok(peers)
        }

        // `peers: ~` in YAML or an explicit null in JSON
        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(PeersVisitor(PhantomData))
}

/// Empty strings in a config file count as "not set"
pub(super) fn deserialize_or_default<'de, D>(deserializer: D, default: fn() -> String) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()).unwrap_or_else(default))
}

pub(super) fn deserialize_irrdb<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_or_default(deserializer, Defaults::irrdb)
}

pub(super) fn deserialize_rtrserver<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_or_default(deserializer, Defaults::rtrserver)
}
