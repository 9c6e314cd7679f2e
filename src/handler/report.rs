// Report rendering
// Builds the plain-text body echoed back for every request

use hyper::HeaderMap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::query::{encode_query, first_value};

const MARKER: &str = "hullatrulla ";
const KAESE_PARAM: &str = "kaese";
const NOT_PRESENT: &str = "not present";

/// Everything that ends up in a response body
pub struct Report<'a> {
    /// Request target exactly as received
    pub url: &'a str,
    pub params: &'a [(String, String)],
    pub headers: &'a HeaderMap,
    /// Raw stdout of the command, embedded without re-encoding
    pub output: &'a [u8],
}

impl Report<'_> {
    pub fn render(&self) -> Vec<u8> {
        let kaese = first_value(self.params, KAESE_PARAM).unwrap_or(NOT_PRESENT);
        let head = format!(
            "{MARKER}\nurl {}\nparams {}\nK  {kaese}\nheaders {}\n{MARKER}\nHello World. Output is ",
            self.url,
            encode_query(self.params),
            render_headers(self.headers),
        );

        let mut body = Vec::with_capacity(head.len() + self.output.len() + 1);
        body.extend_from_slice(head.as_bytes());
        body.extend_from_slice(self.output);
        body.push(b'\n');
        body
    }
}

/// Render headers as a JSON object with sorted names
///
/// Repeated headers are joined with ", "; non-UTF-8 bytes are replaced.
pub fn render_headers(headers: &HeaderMap) -> String {
    let mut sorted: BTreeMap<&str, String> = BTreeMap::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        sorted.insert(name.as_str(), joined);
    }

    let object: Map<String, Value> = sorted
        .into_iter()
        .map(|(name, value)| (name.to_string(), Value::String(value)))
        .collect();
    Value::Object(object).to_string()
}
