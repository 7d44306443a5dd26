//! Clients for the external registries a peer can be enriched from
//!
//! * [`PeeringDb`]: per-ASN metadata (AS-Set macro, advertised prefix counts)
//! * [`Bgpq4`]: AS-Set expansion into prefix filter sets via an IRR server
//!
//! Both sit behind a trait so the resolver can be driven by fakes.

mod bgpq4;
mod parse;
mod peeringdb;

pub use bgpq4::Bgpq4;
pub use parse::{parse_prefix_list, ParseError};
pub use peeringdb::PeeringDb;

use std::time::Duration;

use async_trait::async_trait;

use crate::filter::Family;

/// Registry metadata for an autonomous system
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AsnRecord {
    pub name: String,
    pub as_set: String,
    pub max_prefix4: u64,
    pub max_prefix6: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("PeeringDB request for AS{asn}: {source}")]
    Http {
        asn: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("PeeringDB returned HTTP {status} for AS{asn}")]
    Status { asn: u32, status: u16 },
    #[error("PeeringDB response for AS{asn} is malformed: {source}")]
    Decode {
        asn: u32,
        #[source]
        source: serde_json::Error,
    },
    #[error("PeeringDB has no network record for AS{0} (this peer might not have a PeeringDB page)")]
    NoRecord(u32),
    #[error("PeeringDB record for AS{0} has no IRR AS-Set")]
    EmptyAsSet(u32),
    #[error("running {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("unreadable {program} output for {as_set}: {source}")]
    Parse {
        program: String,
        as_set: String,
        #[source]
        source: ParseError,
    },
    #[error("{as_set} expanded to an invalid prefix: {reason}")]
    InvalidPrefix { as_set: String, reason: String },
}

/// Lookup of per-ASN metadata
#[async_trait]
pub trait AsnRegistry {
    async fn fetch(&self, asn: u32) -> Result<AsnRecord, RegistryError>;
}

/// Expansion of an AS-Set macro into the prefixes registered under it
#[async_trait]
pub trait PrefixExpander {
    /// Prefixes for `as_set` in `family`, in the order the registry returned them
    async fn expand(
        &self,
        as_set: &str,
        family: Family,
        irr_host: &str,
    ) -> Result<Vec<String>, RegistryError>;
}

/// The object part of a possibly source-qualified macro
/// E.g. "RIPE::AS-EXAMPLE" -> "AS-EXAMPLE"
///
/// Only the segment right after the source is kept, anything past a second
/// `::` is dropped: "RIPE::AS-A::AS-B" -> "AS-A"
pub fn as_set_object(as_set: &str) -> &str {
    let mut segments = as_set.split("::");
    match (segments.next(), segments.next()) {
        (Some(_source), Some(object)) => object,
        _ => as_set,
    }
}
