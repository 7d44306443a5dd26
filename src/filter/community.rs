use std::fmt;
use std::slice::Iter;

use serde::{Serialize, Serializer};

/// Route relationship markers attached on import and matched on export
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteTag {
    /// Originated by this router
    Originated,
    /// Learned from a transit provider
    Upstream,
    /// Learned from a settlement-free peer
    Peer,
    /// Learned from a customer
    Downstream,
}

impl RouteTag {
    /// Second data part of the large community carried by this tag
    pub fn value(self) -> u32 {
        match self {
            RouteTag::Originated => 1,
            RouteTag::Upstream => 2,
            RouteTag::Peer => 3,
            RouteTag::Downstream => 4,
        }
    }

    pub fn community(self, local_asn: u32) -> Community {
        Community::LARGE(local_asn, TAG_FUNCTION, self.value())
    }
}

impl fmt::Display for RouteTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let word = match self {
            RouteTag::Originated => "originated",
            RouteTag::Upstream => "upstream",
            RouteTag::Peer => "peer",
            RouteTag::Downstream => "downstream",
        };
        write!(f, "{}", word)
    }
}

/// First data part shared by every relationship tag
pub const TAG_FUNCTION: u32 = 1000;

#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum Community {
    // RFC 8092 (global administrator, local data 1, local data 2)
    LARGE(u32, u32, u32),
}

impl fmt::Display for Community {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Community::LARGE(global, data1, data2) => {
                write!(f, "{}:{}:{}", global, data1, data2)
            }
        }
    }
}

impl Serialize for Community {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct CommunityList(pub Vec<Community>);

impl CommunityList {
    pub fn iter(&self) -> Iter<Community> {
        self.0.iter()
    }

    pub fn contains(&self, community: &Community) -> bool {
        self.0.contains(community)
    }
}

impl fmt::Display for CommunityList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let communities = self
            .0
            .iter()
            .map(std::string::ToString::to_string)
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "{}", communities)
    }
}
