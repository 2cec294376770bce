//! Account entity

use serde::{Deserialize, Serialize};

use super::{Owner, VisitRef};

const SECONDS_PER_YEAR: f64 = 365.25 * 86_400.0;

/// Age in fractional years at the reference timestamp `now`
pub fn age_at(birth_date: i64, now: i64) -> f64 {
    (now - birth_date) as f64 / SECONDS_PER_YEAR
}

/// Binary gender, serialized as `"m"` / `"f"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "m" => Some(Gender::Male),
            "f" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
        }
    }
}

/// A stored account
///
/// Serializes to its public projection; `age` and `visits` stay internal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: u32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: i64,

    /// Derived from `birth_date` and the engine's reference timestamp
    #[serde(skip)]
    pub age: f64,

    #[serde(skip)]
    pub visits: Vec<VisitRef>,
}

/// Complete field set for creating an account (also the import format)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountRecord {
    pub id: u32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: i64,
}

impl Account {
    pub fn from_record(record: AccountRecord, now: i64) -> Self {
        Self {
            id: record.id,
            age: age_at(record.birth_date, now),
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            gender: record.gender,
            birth_date: record.birth_date,
            visits: Vec::new(),
        }
    }
}

impl Owner for Account {
    fn visits(&self) -> &[VisitRef] {
        &self.visits
    }

    fn visits_mut(&mut self) -> &mut Vec<VisitRef> {
        &mut self.visits
    }
}

/// Partial account update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<i64>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.gender.is_none()
            && self.birth_date.is_none()
    }

    pub fn apply(self, account: &mut Account, now: i64) {
        if let Some(email) = self.email {
            account.email = email;
        }
        if let Some(first_name) = self.first_name {
            account.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            account.last_name = last_name;
        }
        if let Some(gender) = self.gender {
            account.gender = gender;
        }
        if let Some(birth_date) = self.birth_date {
            account.birth_date = birth_date;
            account.age = age_at(birth_date, now);
        }
    }
}
