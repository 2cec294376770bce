//! Visit entity

use serde::{Deserialize, Serialize};

/// A stored visit: one account at one place at one time
///
/// Wire names are `user` / `location` for the two owner ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: u32,

    #[serde(rename = "location")]
    pub place: u32,

    #[serde(rename = "user")]
    pub account: u32,

    pub visited_at: i64,
    pub mark: u8,
}

/// Partial visit update; `None` leaves the field untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitUpdate {
    pub place: Option<u32>,
    pub account: Option<u32>,
    pub visited_at: Option<i64>,
    pub mark: Option<u8>,
}

impl VisitUpdate {
    pub fn is_empty(&self) -> bool {
        self.place.is_none() && self.account.is_none() && self.visited_at.is_none() && self.mark.is_none()
    }
}

/// One row of an account's visit listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountVisit {
    pub mark: u8,
    pub visited_at: i64,
    pub place: String,
}
