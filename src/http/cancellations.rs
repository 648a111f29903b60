//! Cancellation endpoints: keyed by event under a calendar, and the flat
//! `/cancellations` collection over the same records.

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
            "/calendars/{calendar_id}/events/{event_id}/cancellations",
            get(read_event_cancellation)
                .post(cancel_event)
                .put(put_event_cancellation)
                .patch(patch_event_cancellation)
                .delete(uncancel_event),
        )
        .route(
            "/cancellations",
            get(list_cancellations).post(create_cancellation),
        )
        .route(
            "/cancellations/{cancellation_id}",
            get(read_cancellation)
                .put(put_cancellation)
                .patch(patch_cancellation)
                .delete(delete_cancellation),
        )
}

fn event_ids(calendar_id: &str, event_id: &str) -> Result<(i64, i64), Outcome> {
    Ok((
        parse_id("calendar_id", calendar_id)?,
        parse_id("event_id", event_id)?,
    ))
}

/// GET /calendars/{calendar_id}/events/{event_id}/cancellations
async fn read_event_cancellation(
    State(state): State<AppState>,
    Path((calendar_id, event_id)): Path<(String, String)>,
) -> Result<Outcome, Outcome> {
    let (calendar_id, event_id) = event_ids(&calendar_id, &event_id)?;
    Ok(state
        .run(move |services| services.event_cancellations(calendar_id, event_id).read())
        .await)
}

/// POST /calendars/{calendar_id}/events/{event_id}/cancellations
async fn cancel_event(
    State(state): State<AppState>,
    Path((calendar_id, event_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let (calendar_id, event_id) = event_ids(&calendar_id, &event_id)?;
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.event_cancellations(calendar_id, event_id).create(&body))
        .await)
}

/// PUT /calendars/{calendar_id}/events/{event_id}/cancellations
async fn put_event_cancellation(
    State(state): State<AppState>,
    Path((calendar_id, event_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let (calendar_id, event_id) = event_ids(&calendar_id, &event_id)?;
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.event_cancellations(calendar_id, event_id).put(&body))
        .await)
}

/// PATCH /calendars/{calendar_id}/events/{event_id}/cancellations
async fn patch_event_cancellation(
    State(state): State<AppState>,
    Path((calendar_id, event_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let (calendar_id, event_id) = event_ids(&calendar_id, &event_id)?;
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.event_cancellations(calendar_id, event_id).patch(&body))
        .await)
}

/// DELETE /calendars/{calendar_id}/events/{event_id}/cancellations
async fn uncancel_event(
    State(state): State<AppState>,
    Path((calendar_id, event_id)): Path<(String, String)>,
) -> Result<Outcome, Outcome> {
    let (calendar_id, event_id) = event_ids(&calendar_id, &event_id)?;
    Ok(state
        .run(move |services| services.event_cancellations(calendar_id, event_id).delete())
        .await)
}

/// GET /cancellations
async fn list_cancellations(State(state): State<AppState>) -> Outcome {
    state.run(|services| services.cancellations().list()).await
}

/// POST /cancellations
async fn create_cancellation(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.cancellations().create(&body)).await)
}

/// GET /cancellations/{cancellation_id}
async fn read_cancellation(
    State(state): State<AppState>,
    Path(cancellation_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let id = parse_id("cancellation_id", &cancellation_id)?;
    Ok(state.run(move |services| services.cancellations().read_by_id(id)).await)
}

/// PUT /cancellations/{cancellation_id}
async fn put_cancellation(
    State(state): State<AppState>,
    Path(cancellation_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let id = parse_id("cancellation_id", &cancellation_id)?;
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.cancellations().put_by_id(id, &body))
        .await)
}

/// PATCH /cancellations/{cancellation_id}
async fn patch_cancellation(
    State(state): State<AppState>,
    Path(cancellation_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let id = parse_id("cancellation_id", &cancellation_id)?;
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.cancellations().patch_by_id(id, &body))
        .await)
}

/// DELETE /cancellations/{cancellation_id}
async fn delete_cancellation(
    State(state): State<AppState>,
    Path(cancellation_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let id = parse_id("cancellation_id", &cancellation_id)?;
    Ok(state
        .run(move |services| services.cancellations().delete_by_id(id))
        .await)
}
