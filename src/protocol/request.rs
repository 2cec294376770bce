//! Request parsing
//!
//! Splits one raw receive buffer into method, path, query and body
//! without copying.

use crate::error::{Result, WayfarerError};

use super::QueryParams;

/// Blank line between headers and body
const BODY_SEPARATOR: &[u8] = b"\r\n\r\n";

/// Request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,

    /// Any verb other than `GET`
    Post,
}

/// A parsed request borrowing from the receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub method: Method,

    /// Request path without the query and without leading/trailing `/`
    pub path: &'a str,

    /// Raw query string (after `?`), possibly empty
    pub query: &'a str,

    /// POST payload (never empty for POST); empty for GET
    pub body: &'a [u8],
}

impl<'a> Request<'a> {
    /// Parse a request from the valid bytes of a receive buffer
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < 3 {
            return Err(WayfarerError::malformed(format!(
                "request too short: {} bytes",
                buf.len()
            )));
        }

        let method = if &buf[..3] == b"GET" {
            Method::Get
        } else {
            Method::Post
        };

        // Target sits between the first and second space of the request line
        let start = buf
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| WayfarerError::malformed("missing request target"))?
            + 1;
        let len = buf[start..]
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| WayfarerError::malformed("unterminated request target"))?;
        let target = std::str::from_utf8(&buf[start..start + len])
            .map_err(|_| WayfarerError::malformed("request target is not UTF-8"))?;

        let (path, query) = match target.find('?') {
            Some(idx) => (&target[..idx], &target[idx + 1..]),
            None => (target, ""),
        };

        let body: &[u8] = match method {
            Method::Get => &[],
            Method::Post => {
                let idx = find(buf, BODY_SEPARATOR)
                    .ok_or_else(|| WayfarerError::malformed("missing header terminator"))?;
                let body = &buf[idx + BODY_SEPARATOR.len()..];
                if body.is_empty() {
                    return Err(WayfarerError::malformed("empty body"));
                }
                body
            }
        };

        Ok(Self {
            method,
            path: path.trim_matches('/'),
            query,
            body,
        })
    }

    /// Path segments, e.g. `users/7/visits` → `["users", "7", "visits"]`
    pub fn segments(&self) -> std::str::Split<'a, char> {
        self.path.split('/')
    }

    /// Split the query string into parameters (no decoding)
    pub fn query_params(&self) -> QueryParams<'a> {
        QueryParams::parse(self.query)
    }
}

/// Parse the id segment of a path
///
/// A missing or non-numeric id is reported as `NotFound`, not a bad request.
pub fn parse_id(segment: Option<&str>) -> Result<u32> {
    segment
        .and_then(|s| s.parse().ok())
        .ok_or(WayfarerError::NotFound)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
