//! Peer policy resolution
//!
//! Turns a [`PeerRecord`] as written in the config file into a
//! [`ResolvedPeerPolicy`]: defaults applied, invariants checked and, when
//! asked for, max-prefix limits and prefix filters pulled from the registries.
//! The input record is never modified.

mod error;

pub use error::{Reason, ResolveError, ValidationError};

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

use crate::config::{GlobalConfig, PeerRecord};
use crate::filter::{Family, Policy, PrefixLimitAction, PrefixPattern};
use crate::registry::{AsnRecord, AsnRegistry, PrefixExpander, RegistryError};

/// Max-prefix limits applied to upstream (import `any`) sessions
pub const UPSTREAM_MAX_PREFIX4: u64 = 1_000_000;
pub const UPSTREAM_MAX_PREFIX6: u64 = 100_000;

pub const DEFAULT_LOCAL_PREF: u32 = 100;

/// A peer with defaults filled in, registry data merged and invariants checked
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedPeerPolicy {
    pub name: String,
    pub asn: u32,
    pub as_set: String,
    pub max_prefix4: u64,
    pub max_prefix6: u64,
    pub limit_action: PrefixLimitAction,
    pub filter4: Vec<PrefixPattern>,
    pub filter6: Vec<PrefixPattern>,
    pub import: Policy,
    pub export: Policy,
    pub local_pref: u32,
    pub neighbors: Vec<IpAddr>,
    pub multihop: bool,
    pub passive: bool,
    pub disabled: bool,
    pub auto_max_prefix: bool,
    pub auto_prefix_filter: bool,
    pub pre_import: Option<String>,
    pub pre_export: Option<String>,
    pub prepends: u32,
    // Last time registry data was merged in, for operators reading the output
    pub query_time: Option<DateTime<Utc>>,
}

impl ResolvedPeerPolicy {
    pub fn max_prefix(&self, family: Family) -> u64 {
        match family {
            Family::Ipv4 => self.max_prefix4,
            Family::Ipv6 => self.max_prefix6,
        }
    }

    pub fn filter(&self, family: Family) -> &[PrefixPattern] {
        match family {
            Family::Ipv4 => &self.filter4,
            Family::Ipv6 => &self.filter6,
        }
    }
}

/// Resolves peers against a metadata registry and a prefix expander
pub struct Resolver<R, E> {
    registry: R,
    expander: E,
}

impl<R, E> Resolver<R, E>
where
    R: AsnRegistry + Sync,
    E: PrefixExpander + Sync,
{
    pub fn new(registry: R, expander: E) -> Self {
        Self { registry, expander }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn expander(&self) -> &E {
        &self.expander
    }

    /// Resolve one peer
    ///
    /// Every local check on the record runs before the first registry query,
    /// so a misconfigured peer never causes network traffic.
    pub async fn resolve(
        &self,
        name: &str,
        peer: &PeerRecord,
        global: &GlobalConfig,
    ) -> Result<ResolvedPeerPolicy, ResolveError> {
        let invalid = |reason| ValidationError::new(name, reason);

        let limit_action = if peer.limit_action.is_empty() {
            PrefixLimitAction::default()
        } else {
            peer.limit_action
                .parse()
                .map_err(|_| invalid(Reason::LimitAction(peer.limit_action.clone())))?
        };

        // Parsed here, but only rejected after enrichment
        let import = peer.import_policy.parse::<Policy>().ok();
        let export = peer.export_policy.parse::<Policy>().ok();

        if import == Some(Policy::Cone) && !peer.auto_prefix_filter {
            if peer.as_set.is_empty() {
                return Err(invalid(Reason::MissingAsSet).into());
            } else if !peer.as_set.starts_with("AS") {
                warn!(
                    "AS-Set for {} (as-set: {}) doesn't start with 'AS' and might be invalid",
                    name, peer.as_set
                );
            }
            if peer.filter4.is_empty() || peer.filter6.is_empty() {
                return Err(invalid(Reason::MissingPrefixFilters).into());
            }
        }

        let (mut max_prefix4, mut max_prefix6) = (peer.max_prefix4, peer.max_prefix6);
        match import {
            Some(Policy::Any) => {
                warn!(
                    "Peer {} is an upstream session, setting max-prefix limits to {} IPv4 and {} IPv6",
                    name, UPSTREAM_MAX_PREFIX4, UPSTREAM_MAX_PREFIX6
                );
                max_prefix4 = UPSTREAM_MAX_PREFIX4;
                max_prefix6 = UPSTREAM_MAX_PREFIX6;
            }
            Some(Policy::Cone) if !peer.auto_max_prefix => {
                if max_prefix4 == 0 || max_prefix6 == 0 {
                    return Err(invalid(Reason::MissingMaxPrefix).into());
                }
            }
            _ => (),
        }

        let local_pref = if peer.local_pref == 0 {
            DEFAULT_LOCAL_PREF
        } else {
            peer.local_pref
        };

        let mut lookup = Lookup::new(&self.registry, peer.asn);
        let mut query_time = None;
        let mut as_set = peer.as_set.clone();

        if peer.auto_max_prefix {
            if import == Some(Policy::Any) {
                info!(
                    "Keeping upstream max-prefix limits for AS{} over PeeringDB values",
                    peer.asn
                );
            } else {
                let record = lookup.get().await.map_err(|e| registry_error(name, peer, e))?;
                max_prefix4 = record.max_prefix4;
                max_prefix6 = record.max_prefix6;
                info!("AutoMaxPfx AS{} MaxPfx4: {}", peer.asn, max_prefix4);
                info!("AutoMaxPfx AS{} MaxPfx6: {}", peer.asn, max_prefix6);
                query_time = Some(Utc::now());
            }
        }

        let mut filters = None;
        if peer.auto_prefix_filter {
            let record = lookup.get().await.map_err(|e| registry_error(name, peer, e))?;
            if record.as_set.is_empty() {
                return Err(registry_error(name, peer, RegistryError::EmptyAsSet(peer.asn)));
            }
            let registry_as_set = record.as_set;

            info!("Running IRRDB query for AS{}", peer.asn);
            let filter4 = self
                .expand(&registry_as_set, Family::Ipv4, &global.irrdb)
                .await
                .map_err(|e| registry_error(name, peer, e))?;
            let filter6 = self
                .expand(&registry_as_set, Family::Ipv6, &global.irrdb)
                .await
                .map_err(|e| registry_error(name, peer, e))?;
            info!("AutoPfxFilter AS{} IPv4 entries: {}", peer.asn, filter4.len());
            info!("AutoPfxFilter AS{} IPv6 entries: {}", peer.asn, filter6.len());

            if as_set.is_empty() {
                as_set = registry_as_set;
            }
            filters = Some((filter4, filter6));
            query_time = Some(Utc::now());
        }

        let import = import.ok_or_else(|| invalid(Reason::Import(peer.import_policy.clone())))?;
        let export = export.ok_or_else(|| invalid(Reason::Export(peer.export_policy.clone())))?;

        if peer.neighbors.is_empty() {
            return Err(invalid(Reason::NoNeighbors).into());
        }
        let neighbors = peer
            .neighbors
            .iter()
            .map(|addr| {
                addr.parse::<IpAddr>()
                    .map_err(|_| invalid(Reason::Neighbor(addr.clone())))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (filter4, filter6) = match filters {
            Some(filters) => filters,
            None => (
                configured_filter(name, &peer.filter4, Family::Ipv4)?,
                configured_filter(name, &peer.filter6, Family::Ipv6)?,
            ),
        };

        info!(
            "Policy for AS{}: import {}, export {}",
            peer.asn, import, export
        );

        Ok(ResolvedPeerPolicy {
            name: name.to_string(),
            asn: peer.asn,
            as_set,
            max_prefix4,
            max_prefix6,
            limit_action,
            filter4,
            filter6,
            import,
            export,
            local_pref,
            neighbors,
            multihop: peer.multihop,
            passive: peer.passive,
            disabled: peer.disabled,
            auto_max_prefix: peer.auto_max_prefix,
            auto_prefix_filter: peer.auto_prefix_filter,
            pre_import: peer.pre_import.clone(),
            pre_export: peer.pre_export.clone(),
            prepends: peer.prepends,
            query_time,
        })
    }

    async fn expand(
        &self,
        as_set: &str,
        family: Family,
        irr_host: &str,
    ) -> Result<Vec<PrefixPattern>, RegistryError> {
        self.expander
            .expand(as_set, family, irr_host)
            .await?
            .iter()
            .map(|entry| {
                let pattern = entry.parse::<PrefixPattern>().map_err(|reason| {
                    RegistryError::InvalidPrefix {
                        as_set: as_set.to_string(),
                        reason,
                    }
                })?;
                if pattern.family() != family {
                    return Err(RegistryError::InvalidPrefix {
                        as_set: as_set.to_string(),
                        reason: format!("{} is not an {} prefix", entry, family),
                    });
                }
                Ok(pattern)
            })
            .collect()
    }
}

fn registry_error(name: &str, peer: &PeerRecord, source: RegistryError) -> ResolveError {
    ResolveError::Registry {
        peer: name.to_string(),
        asn: peer.asn,
        source,
    }
}

fn configured_filter(
    name: &str,
    entries: &[String],
    family: Family,
) -> Result<Vec<PrefixPattern>, ValidationError> {
    entries
        .iter()
        .map(|entry| {
            let pattern = entry
                .parse::<PrefixPattern>()
                .map_err(|_| ValidationError::new(name, Reason::FilterEntry(entry.clone())))?;
            if pattern.family() != family {
                return Err(ValidationError::new(
                    name,
                    Reason::FilterFamily(entry.clone(), family),
                ));
            }
            Ok(pattern)
        })
        .collect()
}

/// Registry record for one peer, fetched on first use
///
/// Lives for a single resolution: max-prefix and prefix filter enrichment
/// share one query, peers never share a record.
struct Lookup<'a, R> {
    registry: &'a R,
    asn: u32,
    record: Option<AsnRecord>,
}

impl<'a, R: AsnRegistry + Sync> Lookup<'a, R> {
    fn new(registry: &'a R, asn: u32) -> Self {
        Self {
            registry,
            asn,
            record: None,
        }
    }

    async fn get(&mut self) -> Result<AsnRecord, RegistryError> {
        if let Some(record) = &self.record {
            return Ok(record.clone());
        }
        let record = self.registry.fetch(self.asn).await?;
        self.record = Some(record.clone());
        Ok(record)
    }
}
