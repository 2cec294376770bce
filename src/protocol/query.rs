//! Query string handling
//!
//! Splitting is lazy about decoding: values stay raw until a handler asks
//! for free text via [`QueryParams::text`].

use std::str::FromStr;

use crate::error::{Result, WayfarerError};

/// Parsed `key` / `key=value` pairs in request order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams<'a> {
    pairs: Vec<(&'a str, Option<&'a str>)>,
}

impl<'a> QueryParams<'a> {
    /// Split on `&`; a segment without `=` or with nothing after it has no value
    pub fn parse(query: &'a str) -> Self {
        let pairs = query
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, "")) => (key, None),
                Some((key, value)) => (key, Some(value)),
                None => (segment, None),
            })
            .collect();
        Self { pairs }
    }

    /// Raw lookup: `None` if absent, `Some(None)` if present without a value.
    /// Later duplicates win.
    pub fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Typed lookup; a present parameter must carry a parseable value
    pub fn parse_value<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(Some(raw)) => raw
                .parse()
                .map(Some)
                .map_err(|_| WayfarerError::invalid(format!("invalid value for {}", key))),
            Some(None) => Err(WayfarerError::invalid(format!("missing value for {}", key))),
        }
    }

    /// Percent-decoded free text; a present parameter must be non-empty
    pub fn text(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Some(raw)) => Ok(Some(decode_component(raw))),
            Some(None) => Err(WayfarerError::invalid(format!("missing value for {}", key))),
        }
    }
}

/// Percent-decode a URL component, treating `+` as a space
///
/// Malformed escapes are kept as-is; invalid UTF-8 is replaced lossily.
pub fn decode_component(input: &str) -> String {
    let spaced = input.replace('+', " ");
    let decoded = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&decoded).into_owned()
}
