//! Parser for the bracketed prefix lists printed by `bgpq4 -b`
//!
//! ```text
//! NN = [
//!     192.0.2.0/24,
//!     198.51.100.0/22{22,24}
//! ];
//! ```
//!
//! list    := NAME "=" "[" entries? "]" ";"?
//! entries := entry ("," entry)* ","?
//!
//! Whitespace (including newlines) may appear between any two tokens.
//! The list name is not checked; bgpq4 names it `NN` unless told otherwise.

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("expected '<name> = [' before the prefix list")]
    MissingHeader,
    #[error("prefix list is missing its opening '['")]
    MissingOpen,
    #[error("prefix list is missing its closing ']'")]
    MissingClose,
    #[error("empty entry at position {0} of the prefix list")]
    EmptyEntry(usize),
    #[error("malformed entry '{0}' in the prefix list")]
    MalformedEntry(String),
    #[error("unexpected trailing content '{0}' after the prefix list")]
    TrailingContent(String),
}

pub fn parse_prefix_list(output: &str) -> Result<Vec<String>, ParseError> {
    let open = output.find('[').ok_or(ParseError::MissingOpen)?;

    let header = output[..open].trim_end();
    let name = header
        .strip_suffix('=')
        .ok_or(ParseError::MissingHeader)?
        .trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(ParseError::MissingHeader);
    }

    let rest = &output[open + 1..];
    let close = rest.find(']').ok_or(ParseError::MissingClose)?;
    let body = rest[..close].trim();

    let tail = rest[close + 1..].trim();
    let tail = tail.strip_prefix(';').unwrap_or(tail).trim();
    if !tail.is_empty() {
        return Err(ParseError::TrailingContent(tail.to_string()));
    }

    if body.is_empty() {
        return Ok(Vec::new());
    }
    let body = body.strip_suffix(',').unwrap_or(body);

    split_entries(body)
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let entry = raw.trim();
            if entry.is_empty() {
                Err(ParseError::EmptyEntry(i))
            } else if entry.contains(|c: char| c.is_whitespace() || c == '[') {
                Err(ParseError::MalformedEntry(entry.to_string()))
            } else {
                Ok(entry.to_string())
            }
        })
        .collect()
}

// Split on commas outside of `{low,high}` length ranges
fn split_entries(body: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(&body[start..i]);
                start = i + 1;
            }
            _ => (),
        }
    }
    entries.push(&body[start..]);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4_list() {
        let output = "NN = [\n    192.0.2.0/24,\n    198.51.100.0/22{22,24}\n];\n";
        assert_eq!(
            parse_prefix_list(output).unwrap(),
            vec![
                "192.0.2.0/24".to_string(),
                "198.51.100.0/22{22,24}".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_ipv6_list() {
        let output = "NN = [\n    2001:db8::/32,\n    2001:db8:1000::/36\n];";
        assert_eq!(
            parse_prefix_list(output).unwrap(),
            vec!["2001:db8::/32".to_string(), "2001:db8:1000::/36".to_string()]
        );
    }

    #[test]
    fn test_parse_single_line_and_trailing_comma() {
        assert_eq!(
            parse_prefix_list("AS_EXAMPLE = [ 192.0.2.0/24, ];").unwrap(),
            vec!["192.0.2.0/24".to_string()]
        );
    }

    #[test]
    fn test_parse_empty_list() {
        assert_eq!(parse_prefix_list("NN = [\n];\n").unwrap(), Vec::<String>::new());
        assert_eq!(parse_prefix_list("NN = [];").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_prefix_list(""), Err(ParseError::MissingOpen));
        assert_eq!(
            parse_prefix_list("ERROR: unable to connect"),
            Err(ParseError::MissingOpen)
        );
        assert_eq!(
            parse_prefix_list("[ 192.0.2.0/24 ];"),
            Err(ParseError::MissingHeader)
        );
        assert_eq!(
            parse_prefix_list("NN = [\n    192.0.2.0/24,\n"),
            Err(ParseError::MissingClose)
        );
        assert_eq!(
            parse_prefix_list("NN = [ 192.0.2.0/24,, 198.51.100.0/24 ];"),
            Err(ParseError::EmptyEntry(1))
        );
        assert_eq!(
            parse_prefix_list("NN = [ 192.0.2.0/24 198.51.100.0/24 ];"),
            Err(ParseError::MalformedEntry(
                "192.0.2.0/24 198.51.100.0/24".to_string()
            ))
        );
        assert_eq!(
            parse_prefix_list("NN = [ 192.0.2.0/24 ];\nNN2 = [];"),
            Err(ParseError::TrailingContent("NN2 = [];".to_string()))
        );
    }
}
