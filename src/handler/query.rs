//! Query string decoding and re-encoding
//!
//! Decoding is strict: a `%` that is not followed by two hex digits, or bytes
//! that do not form UTF-8 once decoded, reject the whole query. Encoding goes
//! through `form_urlencoded` so the `params` line re-parses to the same pairs.

use url::form_urlencoded;

use crate::error::RequestError;

/// Decoded `(key, value)` pairs in request order
pub type QueryPairs = Vec<(String, String)>;

/// Parse a raw query string (without the leading `?`)
///
/// Empty segments (`a=1&&b=2`) are skipped and a segment without `=` yields an
/// empty value.
pub fn parse_query(raw: &str) -> Result<QueryPairs, RequestError> {
    raw.split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            Ok((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

/// Re-encode pairs as `application/x-www-form-urlencoded`
pub fn encode_query(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Value of the first pair named `key`
pub fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn decode_component(input: &str) -> Result<String, RequestError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_value);
                let lo = bytes.get(i + 2).copied().and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 3;
                    }
                    _ => {
                        return Err(RequestError::MalformedQuery(format!(
                            "invalid percent escape in '{input}'"
                        )))
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).map_err(|_| {
        RequestError::MalformedQuery(format!("'{input}' does not decode to UTF-8"))
    })
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
