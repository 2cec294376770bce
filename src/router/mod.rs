//! Router Module
//!
//! Maps parsed requests onto engine operations.
//!
//! ## Routes
//! ```text
//! GET  users/{id}              GET  locations/{id}          GET  visits/{id}
//! GET  users/{id}/visits       GET  locations/{id}/avg
//! POST users/new               POST locations/new           POST visits/new
//! POST users/{id}              POST locations/{id}          POST visits/{id}
//! ```
//! Anything else is a 404.

mod payload;
pub mod validation;

mod users;
mod locations;
mod visits;

use std::sync::Arc;

use crate::engine::Engine;
use crate::error::{Result, WayfarerError};
use crate::protocol::{Method, Request, Response};

pub use payload::Payload;

/// Dispatches requests to the per-resource handlers
pub struct Router {
    engine: Arc<Engine>,
}

impl Router {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Parse and route one raw request; every failure becomes its fixed response
    pub fn handle(&self, raw: &[u8]) -> Response {
        match Request::parse(raw).and_then(|request| self.route(&request)) {
            Ok(response) => response,
            Err(e) => {
                tracing::trace!("Request rejected: {}", e);
                Response::from_error(&e)
            }
        }
    }

    /// Route a parsed request
    pub fn route(&self, request: &Request<'_>) -> Result<Response> {
        let mut segments = request.segments();
        let resource = segments.next().unwrap_or("");
        let first = segments.next();
        let second = segments.next();
        if segments.next().is_some() {
            return Err(WayfarerError::NotFound);
        }

        let engine = self.engine.as_ref();
        match (resource, request.method) {
            ("users", Method::Get) => match second {
                None => users::get(engine, first),
                Some("visits") => users::visits(engine, first, &request.query_params()),
                Some(_) => Err(WayfarerError::NotFound),
            },
            ("users", Method::Post) => match (first, second) {
                (Some("new"), None) => users::create(engine, request.body),
                (_, None) => users::update(engine, first, request.body),
                _ => Err(WayfarerError::NotFound),
            },

            ("locations", Method::Get) => match second {
                None => locations::get(engine, first),
                Some("avg") => locations::average(engine, first, &request.query_params()),
                Some(_) => Err(WayfarerError::NotFound),
            },
            ("locations", Method::Post) => match (first, second) {
                (Some("new"), None) => locations::create(engine, request.body),
                (_, None) => locations::update(engine, first, request.body),
                _ => Err(WayfarerError::NotFound),
            },

            ("visits", Method::Get) => match second {
                None => visits::get(engine, first),
                Some(_) => Err(WayfarerError::NotFound),
            },
            ("visits", Method::Post) => match (first, second) {
                (Some("new"), None) => visits::create(engine, request.body),
                (_, None) => visits::update(engine, first, request.body),
                _ => Err(WayfarerError::NotFound),
            },

            _ => Err(WayfarerError::NotFound),
        }
    }
}
