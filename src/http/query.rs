//! Percent-decoding and query-string parsing
//!
//! Activity names arrive percent-encoded in the request path, and emails
//! arrive as form-encoded query values. Both must be decoded before the
//! store is consulted.

/// Decode a percent-encoded path segment.
///
/// Malformed escapes (`%G1`, trailing `%2`) are passed through literally.
/// `+` is not treated specially in paths.
pub fn percent_decode(input: &str) -> String {
    decode_bytes(input, false)
}

/// Decode a form-encoded query component (`%XX` escapes plus `+` as space)
pub fn decode_component(input: &str) -> String {
    decode_bytes(input, true)
}

/// Look up a query parameter by name, form-decoding keys and values.
///
/// A key without `=` yields an empty value, matching how permissive query
/// parsers treat `?email`. Returns `None` when the parameter is absent,
/// which the API layer turns into a 422.
pub fn query_param(raw_query: Option<&str>, name: &str) -> Option<String> {
    let raw_query = raw_query?;

    for pair in raw_query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if decode_component(key) == name {
            return Some(decode_component(value));
        }
    }
    None
}

fn decode_bytes(input: &str, plus_as_space: bool) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    out.push((hi << 4) | lo);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode_space() {
        assert_eq!(percent_decode("Programming%20Class"), "Programming Class");
        assert_eq!(percent_decode("Chess%20Club"), "Chess Club");
    }

    #[test]
    fn test_percent_decode_passthrough() {
        assert_eq!(percent_decode("Gym Class"), "Gym Class");
        assert_eq!(percent_decode(""), "");
        // '+' stays literal in path segments
        assert_eq!(percent_decode("a+b"), "a+b");
    }

    #[test]
    fn test_percent_decode_malformed() {
        assert_eq!(percent_decode("50%"), "50%");
        assert_eq!(percent_decode("%2"), "%2");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn test_decode_component_plus_and_escape() {
        assert_eq!(decode_component("a+b"), "a b");
        assert_eq!(
            decode_component("test%40mergington.edu"),
            "test@mergington.edu"
        );
    }

    #[test]
    fn test_query_param_present() {
        assert_eq!(
            query_param(Some("email=test@mergington.edu"), "email"),
            Some("test@mergington.edu".to_string())
        );
        assert_eq!(
            query_param(Some("a=1&email=x%40y&b=2"), "email"),
            Some("x@y".to_string())
        );
    }

    #[test]
    fn test_query_param_empty_value() {
        assert_eq!(query_param(Some("email="), "email"), Some(String::new()));
        assert_eq!(query_param(Some("email"), "email"), Some(String::new()));
    }

    #[test]
    fn test_query_param_absent() {
        assert_eq!(query_param(Some("name=Chess"), "email"), None);
        assert_eq!(query_param(None, "email"), None);
    }
}
