//! Field validation
//!
//! Each check returns the value it accepted so handlers can chain them.
//! String lengths count characters, not bytes.

use crate::error::{Result, WayfarerError};
use crate::model::Gender;

pub const MAX_EMAIL_LENGTH: usize = 100;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_COUNTRY_LENGTH: usize = 50;
pub const MAX_CITY_LENGTH: usize = 50;

/// 1930-01-01 ..= 1999-01-01
pub const MIN_BIRTH_DATE: i64 = -1_262_304_000;
pub const MAX_BIRTH_DATE: i64 = 915_148_800;

/// 2000-01-01 ..= 2015-01-01
pub const MIN_VISITED_AT: i64 = 946_684_800;
pub const MAX_VISITED_AT: i64 = 1_420_070_400;

pub const MIN_MARK: u8 = 0;
pub const MAX_MARK: u8 = 5;

fn max_chars(value: String, max: usize, field: &str) -> Result<String> {
    if value.chars().count() > max {
        return Err(WayfarerError::invalid(format!("{} longer than {} characters", field, max)));
    }
    Ok(value)
}

fn within(value: i64, min: i64, max: i64, field: &str) -> Result<i64> {
    if value < min || value > max {
        return Err(WayfarerError::invalid(format!("{} {} outside [{}, {}]", field, value, min, max)));
    }
    Ok(value)
}

pub fn email(value: String) -> Result<String> {
    max_chars(value, MAX_EMAIL_LENGTH, "email")
}

pub fn name(value: String) -> Result<String> {
    max_chars(value, MAX_NAME_LENGTH, "name")
}

pub fn country(value: String) -> Result<String> {
    max_chars(value, MAX_COUNTRY_LENGTH, "country")
}

pub fn city(value: String) -> Result<String> {
    max_chars(value, MAX_CITY_LENGTH, "city")
}

pub fn gender(value: &str) -> Result<Gender> {
    Gender::from_token(value).ok_or_else(|| WayfarerError::invalid(format!("invalid gender {:?}", value)))
}

pub fn birth_date(value: i64) -> Result<i64> {
    within(value, MIN_BIRTH_DATE, MAX_BIRTH_DATE, "birth_date")
}

pub fn visited_at(value: i64) -> Result<i64> {
    within(value, MIN_VISITED_AT, MAX_VISITED_AT, "visited_at")
}

pub fn mark(value: u8) -> Result<u8> {
    if !(MIN_MARK..=MAX_MARK).contains(&value) {
        return Err(WayfarerError::invalid(format!("mark {} outside [{}, {}]", value, MIN_MARK, MAX_MARK)));
    }
    Ok(value)
}
