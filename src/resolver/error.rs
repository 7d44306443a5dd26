use crate::filter::Family;
use crate::registry::RegistryError;

/// A peer config that cannot be turned into a policy
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("Peer {peer} {reason}")]
pub struct ValidationError {
    pub peer: String,
    pub reason: Reason,
}

impl ValidationError {
    pub fn new(peer: &str, reason: Reason) -> Self {
        Self {
            peer: peer.to_string(),
            reason,
        }
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Reason {
    #[error("has an invalid pfxlimitaction '{0}'. Acceptable values are warn, block, restart, and disable")]
    LimitAction(String),
    #[error("has a cone filtered import policy and has no AS-Set defined. Set autopfxfilter to true to enable automatic IRRDB imports")]
    MissingAsSet,
    #[error("has a cone filtered import policy and has no prefix filters defined. Set autopfxfilter to true to enable automatic IRRDB imports")]
    MissingPrefixFilters,
    #[error("has no max-prefix limits configured. Set automaxpfx to true to pull from PeeringDB")]
    MissingMaxPrefix,
    #[error("has an invalid import policy '{0}'. Acceptable values are 'any', 'cone', or 'none'")]
    Import(String),
    #[error("has an invalid export policy '{0}'. Acceptable values are 'any', 'cone', or 'none'")]
    Export(String),
    #[error("has no neighbor addresses")]
    NoNeighbors,
    #[error("has a neighbor address (addr: {0}) that is not a valid IPv4 or IPv6 address")]
    Neighbor(String),
    #[error("has a prefix filter entry '{0}' that is not a valid prefix in CIDR notation")]
    FilterEntry(String),
    #[error("has a prefix filter entry '{0}' that is not an {1} prefix")]
    FilterFamily(String, Family),
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Peer {peer} (AS{asn}): {source}")]
    Registry {
        peer: String,
        asn: u32,
        #[source]
        source: RegistryError,
    },
}

impl ResolveError {
    /// Name of the peer that failed to resolve
    pub fn peer(&self) -> &str {
        match self {
            ResolveError::Invalid(err) => &err.peer,
            ResolveError::Registry { peer, .. } => peer,
        }
    }
}
