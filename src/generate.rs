use log::{debug, info};
use serde::Serialize;

use crate::config::{GlobalConfig, GlobalSettings};
use crate::error::Error;
use crate::filter::{compile, CompiledPeer};
use crate::registry::{AsnRegistry, PrefixExpander};
use crate::resolver::{ResolvedPeerPolicy, Resolver};

/// A peer ready to be written out
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PeerOutput {
    pub policy: ResolvedPeerPolicy,
    pub compiled: CompiledPeer,
}

/// Everything produced from one config, peers in config order
#[derive(Clone, Debug, PartialEq)]
pub struct Generated {
    pub global: GlobalSettings,
    pub peers: Vec<PeerOutput>,
}

/// Validate global settings, then resolve and compile each peer in turn
///
/// The first failing peer aborts the whole run; nothing is returned for the
/// peers that succeeded before it.
pub async fn generate<R, E>(config: &GlobalConfig, resolver: &Resolver<R, E>) -> Result<Generated, Error>
where
    R: AsnRegistry + Sync,
    E: PrefixExpander + Sync,
{
    let global = config.settings()?;
    debug!(
        "Originating {} IPv4 and {} IPv6 prefixes",
        global.prefixes4.len(),
        global.prefixes6.len()
    );

    let mut peers = Vec::with_capacity(config.peers.len());
    for (name, record) in &config.peers {
        debug!("Resolving peer {} (AS{})", name, record.asn);
        let policy = resolver.resolve(name, record, config).await?;
        let compiled = compile(&policy, global.asn);
        peers.push(PeerOutput { policy, compiled });
    }
    info!("Generated policy for {} peers", peers.len());

    Ok(Generated { global, peers })
}
