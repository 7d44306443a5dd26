use std::fmt;
use std::str::FromStr;

use ipnetwork::IpNetwork;
use serde::{Serialize, Serializer};

use super::Family;
use crate::utils::parse_prefix;

/// One entry of a prefix filter set
///
/// Either an exact prefix (E.g. "192.0.2.0/24") or a prefix with an accepted
/// length range in BIRD set syntax (E.g. "198.51.100.0/22{22,24}",
/// "198.51.100.0/22+", "198.51.100.0/22-").
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PrefixPattern {
    pub network: IpNetwork,
    // Accepted prefix lengths (low, high), when not exact
    pub range: Option<(u8, u8)>,
}

impl PrefixPattern {
    pub fn family(&self) -> Family {
        match self.network {
            IpNetwork::V4(_) => Family::Ipv4,
            IpNetwork::V6(_) => Family::Ipv6,
        }
    }

    fn max_length(&self) -> u8 {
        match self.network {
            IpNetwork::V4(_) => 32,
            IpNetwork::V6(_) => 128,
        }
    }
}

impl FromStr for PrefixPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Not a valid prefix pattern: '{}'", s);
        let s = s.trim();
        let (prefix, range) = if let Some(prefix) = s.strip_suffix('+') {
            (prefix, Some(RangeSpec::OrLonger))
        } else if let Some(prefix) = s.strip_suffix('-') {
            (prefix, Some(RangeSpec::OrShorter))
        } else if let Some(i) = s.find('{') {
            let bounds = s[i + 1..].strip_suffix('}').ok_or_else(invalid)?;
            let (low, high) = bounds.split_once(',').ok_or_else(invalid)?;
            let low: u8 = low.trim().parse().map_err(|_| invalid())?;
            let high: u8 = high.trim().parse().map_err(|_| invalid())?;
            (&s[..i], Some(RangeSpec::Explicit(low, high)))
        } else {
            (s, None)
        };

        let network = parse_prefix(prefix).ok_or_else(invalid)?;
        let mut pattern = Self {
            network,
            range: None,
        };
        let length = network.prefix();
        pattern.range = match range {
            None => None,
            Some(RangeSpec::OrLonger) => Some((length, pattern.max_length())),
            Some(RangeSpec::OrShorter) => Some((0, length)),
            Some(RangeSpec::Explicit(low, high)) => {
                if low > high || high > pattern.max_length() {
                    return Err(invalid());
                }
                Some((low, high))
            }
        };
        Ok(pattern)
    }
}

enum RangeSpec {
    OrLonger,
    OrShorter,
    Explicit(u8, u8),
}

impl fmt::Display for PrefixPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.range {
            Some((low, high)) => write!(f, "{}{{{},{}}}", self.network, low, high),
            None => write!(f, "{}", self.network),
        }
    }
}

impl Serialize for PrefixPattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_prefix() {
        let pattern: PrefixPattern = "192.0.2.0/24".parse().unwrap();
        assert_eq!(pattern.range, None);
        assert_eq!(pattern.family(), Family::Ipv4);
        assert_eq!(&pattern.to_string(), "192.0.2.0/24");
    }

    #[test]
    fn test_ranges() {
        let pattern: PrefixPattern = "198.51.100.0/22{22,24}".parse().unwrap();
        assert_eq!(pattern.range, Some((22, 24)));
        assert_eq!(&pattern.to_string(), "198.51.100.0/22{22,24}");

        let pattern: PrefixPattern = "2001:db8::/32+".parse().unwrap();
        assert_eq!(pattern.range, Some((32, 128)));
        assert_eq!(pattern.family(), Family::Ipv6);

        let pattern: PrefixPattern = "192.0.2.0/24-".parse().unwrap();
        assert_eq!(pattern.range, Some((0, 24)));
    }

    #[test]
    fn test_invalid_patterns() {
        for s in &[
            "",
            "192.0.2.0",
            "192.0.2.0/24{24}",
            "192.0.2.0/24{25,24}",
            "192.0.2.0/24{24,33}",
            "192.0.2.0/24{24,25",
            "AS-EXAMPLE",
        ] {
            assert!(s.parse::<PrefixPattern>().is_err(), "{} should not parse", s);
        }
    }
}
