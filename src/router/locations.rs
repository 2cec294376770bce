//! `locations` handlers

use crate::engine::Engine;
use crate::error::{Result, WayfarerError};
use crate::model::{AverageFilter, Place, PlaceUpdate};
use crate::protocol::{parse_id, QueryParams, Response};

use super::payload::{required, Payload};
use super::validation;

/// `GET locations/{id}`
pub fn get(engine: &Engine, id: Option<&str>) -> Result<Response> {
    let id = parse_id(id)?;
    let body = engine
        .with_place(id, |place| serde_json::to_vec(place))
        .ok_or(WayfarerError::NotFound)??;
    Ok(Response::ok(body))
}

/// `GET locations/{id}/avg?fromDate&toDate&fromAge&toAge&gender`
pub fn average(engine: &Engine, id: Option<&str>, params: &QueryParams<'_>) -> Result<Response> {
    let id = parse_id(id)?;
    let gender = match params.get("gender") {
        None => None,
        Some(token) => Some(validation::gender(token.unwrap_or(""))?),
    };
    let filter = AverageFilter {
        from_date: params.parse_value("fromDate")?,
        to_date: params.parse_value("toDate")?,
        from_age: params.parse_value("fromAge")?,
        to_age: params.parse_value("toAge")?,
        gender,
    };

    let avg = engine.average_mark(id, &filter)?;
    Ok(Response::ok(format!("{{\"avg\":{:.5}}}", avg)))
}

/// `POST locations/new`
pub fn create(engine: &Engine, body: &[u8]) -> Result<Response> {
    let payload = Payload::parse(body)?;
    let place = Place {
        id: required(payload.int("id")?, "id")?,
        place: required(payload.text("place")?, "place")?,
        country: validation::country(required(payload.text("country")?, "country")?)?,
        city: validation::city(required(payload.text("city")?, "city")?)?,
        distance: required(payload.int("distance")?, "distance")?,
        visits: Vec::new(),
    };

    engine.create_place(place)?;
    Ok(Response::written())
}

/// `POST locations/{id}`
pub fn update(engine: &Engine, id: Option<&str>, body: &[u8]) -> Result<Response> {
    let id = parse_id(id)?;
    if !engine.place_exists(id) {
        return Err(WayfarerError::NotFound);
    }

    let payload = Payload::parse(body)?;
    let update = PlaceUpdate {
        place: payload.text("place")?,
        country: payload.text("country")?.map(validation::country).transpose()?,
        city: payload.text("city")?.map(validation::city).transpose()?,
        distance: payload.int("distance")?,
    };
    if update.is_empty() {
        return Err(WayfarerError::invalid("update carries no known fields"));
    }

    engine.update_place(id, update)?;
    Ok(Response::written())
}
