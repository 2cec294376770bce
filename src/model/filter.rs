//! Query filters
//!
//! Date bounds are exclusive on both sides. Age is `from_age <= age < to_age`.

use super::{Account, Gender, Place};

/// Filters for a place's average mark
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AverageFilter {
    pub from_date: Option<i64>,
    pub to_date: Option<i64>,
    pub from_age: Option<i32>,
    pub to_age: Option<i32>,
    pub gender: Option<Gender>,
}

impl AverageFilter {
    /// Whether matching needs the visiting account at all
    pub fn needs_account(&self) -> bool {
        self.from_age.is_some() || self.to_age.is_some() || self.gender.is_some()
    }

    pub fn matches_account(&self, account: &Account) -> bool {
        if let Some(from_age) = self.from_age {
            if account.age < f64::from(from_age) {
                return false;
            }
        }
        if let Some(to_age) = self.to_age {
            if account.age >= f64::from(to_age) {
                return false;
            }
        }
        match self.gender {
            Some(gender) => account.gender == gender,
            None => true,
        }
    }
}

/// Filters for an account's visit listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitsFilter {
    pub from_date: Option<i64>,
    pub to_date: Option<i64>,
    pub country: Option<String>,
    pub to_distance: Option<i32>,
}

impl VisitsFilter {
    pub fn matches_place(&self, place: &Place) -> bool {
        if let Some(country) = &self.country {
            if &place.country != country {
                return false;
            }
        }
        match self.to_distance {
            Some(to_distance) => place.distance < to_distance,
            None => true,
        }
    }
}
