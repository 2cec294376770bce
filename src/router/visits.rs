//! `visits` handlers

use crate::engine::Engine;
use crate::error::{Result, WayfarerError};
use crate::model::{Visit, VisitUpdate};
use crate::protocol::{parse_id, Response};

use super::payload::{required, Payload};
use super::validation;

/// `GET visits/{id}`
pub fn get(engine: &Engine, id: Option<&str>) -> Result<Response> {
    let id = parse_id(id)?;
    let body = engine
        .with_visit(id, |visit| serde_json::to_vec(visit))
        .ok_or(WayfarerError::NotFound)??;
    Ok(Response::ok(body))
}

/// `POST visits/new`
pub fn create(engine: &Engine, body: &[u8]) -> Result<Response> {
    let payload = Payload::parse(body)?;
    let visit = Visit {
        id: required(payload.int("id")?, "id")?,
        place: existing_place(engine, required(payload.int("location")?, "location")?)?,
        account: existing_account(engine, required(payload.int("user")?, "user")?)?,
        visited_at: validation::visited_at(required(payload.int("visited_at")?, "visited_at")?)?,
        mark: validation::mark(required(payload.int("mark")?, "mark")?)?,
    };

    engine.create_visit(visit)?;
    Ok(Response::written())
}

/// `POST visits/{id}`
pub fn update(engine: &Engine, id: Option<&str>, body: &[u8]) -> Result<Response> {
    let id = parse_id(id)?;
    if !engine.visit_exists(id) {
        return Err(WayfarerError::NotFound);
    }

    let payload = Payload::parse(body)?;
    let update = VisitUpdate {
        place: payload
            .int("location")?
            .map(|place| existing_place(engine, place))
            .transpose()?,
        account: payload
            .int("user")?
            .map(|account| existing_account(engine, account))
            .transpose()?,
        visited_at: payload
            .int("visited_at")?
            .map(validation::visited_at)
            .transpose()?,
        mark: payload.int("mark")?.map(validation::mark).transpose()?,
    };
    if update.is_empty() {
        return Err(WayfarerError::invalid("update carries no known fields"));
    }

    engine.update_visit(id, update)?;
    Ok(Response::written())
}

fn existing_place(engine: &Engine, id: u32) -> Result<u32> {
    if !engine.place_exists(id) {
        return Err(WayfarerError::invalid(format!("place {} does not exist", id)));
    }
    Ok(id)
}

fn existing_account(engine: &Engine, id: u32) -> Result<u32> {
    if !engine.account_exists(id) {
        return Err(WayfarerError::invalid(format!("account {} does not exist", id)));
    }
    Ok(id)
}
