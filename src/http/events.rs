//! Event endpoints, nested under a calendar

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    routing::get,
};

use super::{AppState, parse_body, parse_id};
use crate::outcome::Outcome;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/calendars/{calendar_id}/events",
            get(list_events).post(create_event),
        )
        .route(
            "/calendars/{calendar_id}/events/{event_id}",
            get(read_event)
                .put(put_event)
                .patch(patch_event)
                .delete(delete_event),
        )
}

fn ids(calendar_id: &str, event_id: &str) -> Result<(i64, i64), Outcome> {
    Ok((
        parse_id("calendar_id", calendar_id)?,
        parse_id("event_id", event_id)?,
    ))
}

/// GET /calendars/{calendar_id}/events
async fn list_events(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let calendar_id = parse_id("calendar_id", &calendar_id)?;
    Ok(state.run(move |services| services.events(calendar_id).list()).await)
}

/// POST /calendars/{calendar_id}/events
async fn create_event(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let calendar_id = parse_id("calendar_id", &calendar_id)?;
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.events(calendar_id).create(&body)).await)
}

/// GET /calendars/{calendar_id}/events/{event_id}
async fn read_event(
    State(state): State<AppState>,
    Path((calendar_id, event_id)): Path<(String, String)>,
) -> Result<Outcome, Outcome> {
    let (calendar_id, event_id) = ids(&calendar_id, &event_id)?;
    Ok(state
        .run(move |services| services.events(calendar_id).read_by_id(event_id))
        .await)
}

/// PUT /calendars/{calendar_id}/events/{event_id}
async fn put_event(
    State(state): State<AppState>,
    Path((calendar_id, event_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let (calendar_id, event_id) = ids(&calendar_id, &event_id)?;
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.events(calendar_id).put_by_id(event_id, &body))
        .await)
}

/// PATCH /calendars/{calendar_id}/events/{event_id}
async fn patch_event(
    State(state): State<AppState>,
    Path((calendar_id, event_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let (calendar_id, event_id) = ids(&calendar_id, &event_id)?;
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.events(calendar_id).patch_by_id(event_id, &body))
        .await)
}

/// DELETE /calendars/{calendar_id}/events/{event_id}
async fn delete_event(
    State(state): State<AppState>,
    Path((calendar_id, event_id)): Path<(String, String)>,
) -> Result<Outcome, Outcome> {
    let (calendar_id, event_id) = ids(&calendar_id, &event_id)?;
    Ok(state
        .run(move |services| services.events(calendar_id).delete_by_id(event_id))
        .await)
}
