//! Protocol Module
//!
//! Minimal HTTP/1.1 subset for client-server communication.
//!
//! ## Request Format
//! ```text
//! <VERB> /<path>[?<query>] HTTP/1.1\r\n
//! <headers...>\r\n
//! \r\n
//! <body>                               (POST only, required)
//! ```
//! Only `GET` is recognized; every other verb is treated as `POST`.
//! One read holds one whole request; headers are never interpreted.
//!
//! ## Response Format
//! ```text
//! HTTP/1.1 <code> <reason>\r\n
//! Content-Type: application/json; charset=utf-8\r\n
//! Server: <name>\r\n
//! Content-Length: <n>\r\n
//! \r\n
//! <body>
//! ```
//!
//! ### Status Codes
//! - 200: OK
//! - 400: Bad Request (malformed request, validation failure)
//! - 404: Not Found (unknown id, unparseable id)

mod request;
mod query;
mod response;

pub use request::{parse_id, Method, Request};
pub use query::{decode_component, QueryParams};
pub use response::{Response, Status};
