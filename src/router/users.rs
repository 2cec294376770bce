//! `users` handlers

use serde::Serialize;

use crate::engine::Engine;
use crate::error::{Result, WayfarerError};
use crate::model::{AccountRecord, AccountUpdate, AccountVisit, VisitsFilter};
use crate::protocol::{parse_id, QueryParams, Response};

use super::payload::{required, Payload};
use super::validation;

#[derive(Serialize)]
struct VisitListing<'a> {
    visits: &'a [AccountVisit],
}

/// `GET users/{id}`
pub fn get(engine: &Engine, id: Option<&str>) -> Result<Response> {
    let id = parse_id(id)?;
    let body = engine
        .with_account(id, |account| serde_json::to_vec(account))
        .ok_or(WayfarerError::NotFound)??;
    Ok(Response::ok(body))
}

/// `GET users/{id}/visits?fromDate&toDate&country&toDistance`
pub fn visits(engine: &Engine, id: Option<&str>, params: &QueryParams<'_>) -> Result<Response> {
    let id = parse_id(id)?;
    let filter = VisitsFilter {
        from_date: params.parse_value("fromDate")?,
        to_date: params.parse_value("toDate")?,
        country: params.text("country")?,
        to_distance: params.parse_value("toDistance")?,
    };

    let visits = engine.account_visits(id, &filter)?;
    let body = serde_json::to_vec(&VisitListing { visits: &visits })?;
    Ok(Response::ok(body))
}

/// `POST users/new`
pub fn create(engine: &Engine, body: &[u8]) -> Result<Response> {
    let payload = Payload::parse(body)?;
    let record = AccountRecord {
        id: required(payload.int("id")?, "id")?,
        email: validation::email(required(payload.text("email")?, "email")?)?,
        first_name: validation::name(required(payload.text("first_name")?, "first_name")?)?,
        last_name: validation::name(required(payload.text("last_name")?, "last_name")?)?,
        gender: validation::gender(&required(payload.text("gender")?, "gender")?)?,
        birth_date: validation::birth_date(required(payload.int("birth_date")?, "birth_date")?)?,
    };

    engine.create_account(record)?;
    Ok(Response::written())
}

/// `POST users/{id}`
pub fn update(engine: &Engine, id: Option<&str>, body: &[u8]) -> Result<Response> {
    let id = parse_id(id)?;
    if !engine.account_exists(id) {
        return Err(WayfarerError::NotFound);
    }

    let payload = Payload::parse(body)?;
    let update = AccountUpdate {
        email: payload.text("email")?.map(validation::email).transpose()?,
        first_name: payload.text("first_name")?.map(validation::name).transpose()?,
        last_name: payload.text("last_name")?.map(validation::name).transpose()?,
        gender: payload
            .text("gender")?
            .map(|g| validation::gender(&g))
            .transpose()?,
        birth_date: payload
            .int("birth_date")?
            .map(validation::birth_date)
            .transpose()?,
    };
    if update.is_empty() {
        return Err(WayfarerError::invalid("update carries no known fields"));
    }

    engine.update_account(id, update)?;
    Ok(Response::written())
}
