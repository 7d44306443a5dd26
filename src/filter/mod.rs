//! Filter policy compilation
//!
//! Derives the per-session import/export behavior of a resolved peer. Pure:
//! the same policy always compiles to the same sessions.
//!
//! | Import | Behavior                                                  |
//! |--------|-----------------------------------------------------------|
//! | any    | accept all, tag as upstream-received                      |
//! | cone   | accept routes matching the family's prefix filter, tag as peer-received |
//! | none   | reject all                                                |
//!
//! | Export | Re-advertised routes                                      |
//! |--------|-----------------------------------------------------------|
//! | any    | self-originated, upstream, peer and downstream tagged     |
//! | cone   | self-originated and downstream tagged                     |
//! | none   | nothing beyond the daemon defaults                        |

mod community;
mod policy;
mod prefix;

pub use community::{Community, CommunityList, RouteTag, TAG_FUNCTION};
pub use policy::{Family, Policy, PrefixLimitAction};
pub use prefix::PrefixPattern;

use std::net::IpAddr;

use serde::Serialize;

use crate::resolver::ResolvedPeerPolicy;

/// What happens to routes received on a session
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ImportAction {
    AcceptAll {
        tag: RouteTag,
        community: Community,
    },
    AcceptMatching {
        tag: RouteTag,
        community: Community,
        prefixes: Vec<PrefixPattern>,
    },
    RejectAll,
}

impl ImportAction {
    fn for_policy(policy: Policy, prefixes: &[PrefixPattern], local_asn: u32) -> Self {
        match policy {
            Policy::Any => ImportAction::AcceptAll {
                tag: RouteTag::Upstream,
                community: RouteTag::Upstream.community(local_asn),
            },
            Policy::Cone => ImportAction::AcceptMatching {
                tag: RouteTag::Peer,
                community: RouteTag::Peer.community(local_asn),
                prefixes: prefixes.to_vec(),
            },
            Policy::None => ImportAction::RejectAll,
        }
    }

    /// Community attached to accepted routes
    pub fn community(&self) -> Option<Community> {
        match self {
            ImportAction::AcceptAll { community, .. } => Some(*community),
            ImportAction::AcceptMatching { community, .. } => Some(*community),
            ImportAction::RejectAll => None,
        }
    }
}

/// Which routes are advertised on a session, by relationship tag
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportAction {
    pub tags: Vec<RouteTag>,
    pub communities: CommunityList,
}

impl ExportAction {
    fn for_policy(policy: Policy, local_asn: u32) -> Self {
        let tags = match policy {
            Policy::Any => vec![
                RouteTag::Originated,
                RouteTag::Upstream,
                RouteTag::Peer,
                RouteTag::Downstream,
            ],
            Policy::Cone => vec![RouteTag::Originated, RouteTag::Downstream],
            Policy::None => vec![],
        };
        let communities = CommunityList(tags.iter().map(|t| t.community(local_asn)).collect());
        Self { tags, communities }
    }

    pub fn accepts(&self, tag: RouteTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Everything needed to render one BGP session of a peer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionDescriptor {
    pub neighbor: IpAddr,
    pub family: Family,
    pub import: ImportAction,
    pub export: ExportAction,
    pub max_prefix: u64,
    pub limit_action: PrefixLimitAction,
    pub prepends: u32,
    pub local_pref: u32,
    pub multihop: bool,
    pub passive: bool,
    pub disabled: bool,
    pub pre_import: Option<String>,
    pub pre_export: Option<String>,
}

/// A peer's sessions, one per neighbor address in configured order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompiledPeer {
    pub name: String,
    pub asn: u32,
    pub sessions: Vec<SessionDescriptor>,
}

impl CompiledPeer {
    pub fn sessions_for(&self, family: Family) -> impl Iterator<Item = &SessionDescriptor> {
        self.sessions.iter().filter(move |s| s.family == family)
    }
}

pub fn compile(policy: &ResolvedPeerPolicy, local_asn: u32) -> CompiledPeer {
    let export = ExportAction::for_policy(policy.export, local_asn);
    let sessions = policy
        .neighbors
        .iter()
        .map(|neighbor| {
            let family = Family::of(&neighbor.to_string());
            SessionDescriptor {
                neighbor: *neighbor,
                family,
                import: ImportAction::for_policy(policy.import, policy.filter(family), local_asn),
                export: export.clone(),
                max_prefix: policy.max_prefix(family),
                limit_action: policy.limit_action,
                prepends: policy.prepends,
                local_pref: policy.local_pref,
                multihop: policy.multihop,
                passive: policy.passive,
                disabled: policy.disabled,
                pre_import: policy.pre_import.clone(),
                pre_export: policy.pre_export.clone(),
            }
        })
        .collect();
    CompiledPeer {
        name: policy.name.clone(),
        asn: policy.asn,
        sessions,
    }
}
