use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Import/Export policy for a peer
///
/// The set is closed: any other value in a peer config is a validation error.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Policy {
    /// Accept (or advertise) everything
    Any,
    /// Restrict to the peer's registered customer cone
    Cone,
    /// Accept (or advertise) nothing
    None,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let word = match self {
            Policy::Any => "any",
            Policy::Cone => "cone",
            Policy::None => "none",
        };
        write!(f, "{}", word)
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(Policy::Any),
            "cone" => Ok(Policy::Cone),
            "none" => Ok(Policy::None),
            _ => Err(format!("Unsupported policy: '{}'", s)),
        }
    }
}

impl Serialize for Policy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// What the daemon does when a session exceeds its max-prefix limit
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PrefixLimitAction {
    Disable,
    Restart,
    Block,
    Warn,
}

impl Default for PrefixLimitAction {
    fn default() -> Self {
        PrefixLimitAction::Disable
    }
}

impl fmt::Display for PrefixLimitAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use PrefixLimitAction::*;
        let word = match self {
            Disable => "disable",
            Restart => "restart",
            Block => "block",
            Warn => "warn",
        };
        write!(f, "{}", word)
    }
}

impl FromStr for PrefixLimitAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disable" => Ok(PrefixLimitAction::Disable),
            "restart" => Ok(PrefixLimitAction::Restart),
            "block" => Ok(PrefixLimitAction::Block),
            "warn" => Ok(PrefixLimitAction::Warn),
            _ => Err(format!("Unsupported prefix limit action: '{}'", s)),
        }
    }
}

impl Serialize for PrefixLimitAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Address family of a session or prefix list
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Family {
    Ipv4,
    Ipv6,
}

impl Family {
    /// Classify a textual address or prefix: anything containing ':' is IPv6
    pub fn of(addr: &str) -> Self {
        if addr.contains(':') {
            Family::Ipv6
        } else {
            Family::Ipv4
        }
    }

    /// Numeric family as used on the bgpq4 command line (`-A4`/`-A6`)
    pub fn number(self) -> u8 {
        match self {
            Family::Ipv4 => 4,
            Family::Ipv6 => 6,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Family::Ipv4 => write!(f, "IPv4"),
            Family::Ipv6 => write!(f, "IPv6"),
        }
    }
}

impl Serialize for Family {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(match self {
            Family::Ipv4 => "ipv4",
            Family::Ipv6 => "ipv6",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!("any".parse::<Policy>(), Ok(Policy::Any));
        assert_eq!("cone".parse::<Policy>(), Ok(Policy::Cone));
        assert_eq!("none".parse::<Policy>(), Ok(Policy::None));
        assert!("ANY".parse::<Policy>().is_err());
        assert!("".parse::<Policy>().is_err());
        assert!("transit".parse::<Policy>().is_err());
    }

    #[test]
    fn test_parse_limit_action() {
        assert_eq!(
            "restart".parse::<PrefixLimitAction>(),
            Ok(PrefixLimitAction::Restart)
        );
        assert_eq!("warn".parse::<PrefixLimitAction>(), Ok(PrefixLimitAction::Warn));
        assert!("shutdown".parse::<PrefixLimitAction>().is_err());
        assert_eq!(PrefixLimitAction::default(), PrefixLimitAction::Disable);
    }

    #[test]
    fn test_family_of() {
        assert_eq!(Family::of("192.0.2.1"), Family::Ipv4);
        assert_eq!(Family::of("2001:db8::1"), Family::Ipv6);
        assert_eq!(Family::of("2001:db8::/32"), Family::Ipv6);
        assert_eq!(Family::of("::ffff:192.0.2.1"), Family::Ipv6);
        assert_eq!(Family::Ipv6.number(), 6);
        assert_eq!(&Family::Ipv4.to_string(), "IPv4");
    }
}
