//! Response definitions
//!
//! Represents responses to clients and frames them onto the wire.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::WayfarerError;

const CONTENT_TYPE_HEADER: &[u8] = b"Content-Type: application/json; charset=utf-8\r\n";
const EMPTY_OBJECT: &[u8] = b"{}";

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Status {
    Ok = 200,
    BadRequest = 400,
    NotFound = 404,
}

impl Status {
    pub fn code(self) -> u16 {
        self as u16
    }

    fn status_line(self) -> &'static [u8] {
        match self {
            Status::Ok => b"HTTP/1.1 200 OK\r\n",
            Status::BadRequest => b"HTTP/1.1 400 Bad Request\r\n",
            Status::NotFound => b"HTTP/1.1 404 Not Found\r\n",
        }
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// JSON body; error responses carry none
    pub body: Option<Bytes>,
}

impl Response {
    /// Create an OK response with a JSON body
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: Status::Ok,
            body: Some(body.into()),
        }
    }

    /// Create the OK response for a successful write: `{}`
    pub fn written() -> Self {
        Self::ok(Bytes::from_static(EMPTY_OBJECT))
    }

    /// Create a BAD_REQUEST response
    pub fn bad_request() -> Self {
        Self {
            status: Status::BadRequest,
            body: None,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            body: None,
        }
    }

    /// Map a handling error onto its fixed response
    pub fn from_error(error: &WayfarerError) -> Self {
        match error {
            WayfarerError::NotFound => Self::not_found(),
            _ => Self::bad_request(),
        }
    }

    /// Append the framed response to `buf`
    pub fn encode_into(&self, buf: &mut BytesMut, server_name: &str) {
        let body: &[u8] = self.body.as_deref().unwrap_or(&[]);
        let length = body.len().to_string();

        buf.reserve(128 + server_name.len() + body.len());
        buf.put_slice(self.status.status_line());
        buf.put_slice(CONTENT_TYPE_HEADER);
        buf.put_slice(b"Server: ");
        buf.put_slice(server_name.as_bytes());
        buf.put_slice(b"\r\nContent-Length: ");
        buf.put_slice(length.as_bytes());
        buf.put_slice(b"\r\n\r\n");
        buf.put_slice(body);
    }

    /// Frame the response into a fresh buffer
    pub fn encode(&self, server_name: &str) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode_into(&mut buf, server_name);
        buf.freeze()
    }
}
