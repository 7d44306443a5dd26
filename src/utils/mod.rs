use ipnetwork::IpNetwork;

/// Parse a CIDR prefix (E.g. "192.0.2.0/24")
/// A bare address without a mask length is not a prefix
pub fn parse_prefix(prefix: &str) -> Option<IpNetwork> {
    if !prefix.contains('/') {
        return None;
    }
    prefix.trim().parse().ok()
}

/// Make a peer name safe to use in a file name
/// E.g. "Hurricane Electric / HE.net" -> "HURRICANE_ELECTRIC_-_HE.NET"
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | '/'))
        .collect::<String>()
        .to_uppercase()
        .replace(' ', "_")
        .replace('/', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefix() {
        assert_eq!(
            parse_prefix("192.0.2.0/24"),
            Some("192.0.2.0/24".parse().unwrap())
        );
        assert!(parse_prefix("2001:db8::/32").is_some());
        assert!(parse_prefix("192.0.2.0").is_none());
        assert!(parse_prefix("192.0.2.0/33").is_none());
        assert!(parse_prefix("example/24").is_none());
        assert!(parse_prefix("").is_none());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("example"), "EXAMPLE");
        assert_eq!(
            normalize("Hurricane Electric / HE.net"),
            "HURRICANE_ELECTRIC_-_HE.NET"
        );
        assert_eq!(normalize("Café (AS65001)"), "CAF_AS65001");
    }
}
