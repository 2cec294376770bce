//! Place entity

use serde::{Deserialize, Serialize};

use super::{Owner, VisitRef};

/// A stored place
///
/// Also the create/import record: `visits` is neither read nor written as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: u32,
    pub place: String,
    pub country: String,
    pub city: String,
    pub distance: i32,

    #[serde(skip)]
    pub visits: Vec<VisitRef>,
}

impl Owner for Place {
    fn visits(&self) -> &[VisitRef] {
        &self.visits
    }

    fn visits_mut(&mut self) -> &mut Vec<VisitRef> {
        &mut self.visits
    }
}

/// Partial place update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceUpdate {
    pub place: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub distance: Option<i32>,
}

impl PlaceUpdate {
    pub fn is_empty(&self) -> bool {
        self.place.is_none() && self.country.is_none() && self.city.is_none() && self.distance.is_none()
    }

    pub fn apply(self, place: &mut Place) {
        if let Some(name) = self.place {
            place.place = name;
        }
        if let Some(country) = self.country {
            place.country = country;
        }
        if let Some(city) = self.city {
            place.city = city;
        }
        if let Some(distance) = self.distance {
            place.distance = distance;
        }
    }
}
