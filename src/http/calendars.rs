//! Calendar endpoints

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
        .route("/calendars", get(list_calendars).post(create_calendar))
        .route(
            "/calendars/{calendar_id}",
            get(read_calendar)
                .put(put_calendar)
                .patch(patch_calendar)
                .delete(delete_calendar),
        )
}

/// GET /calendars
async fn list_calendars(State(state): State<AppState>) -> Outcome {
    state.run(|services| services.calendars().list()).await
}

/// POST /calendars
async fn create_calendar(State(state): State<AppState>, body: Bytes) -> Result<Outcome, Outcome> {
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.calendars().create(&body)).await)
}

/// GET /calendars/{calendar_id}
async fn read_calendar(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let id = parse_id("calendar_id", &calendar_id)?;
    Ok(state.run(move |services| services.calendars().read_by_id(id)).await)
}

/// PUT /calendars/{calendar_id}
async fn put_calendar(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let id = parse_id("calendar_id", &calendar_id)?;
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.calendars().put_by_id(id, &body)).await)
}

/// PATCH /calendars/{calendar_id}
async fn patch_calendar(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let id = parse_id("calendar_id", &calendar_id)?;
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.calendars().patch_by_id(id, &body)).await)
}

/// DELETE /calendars/{calendar_id}
async fn delete_calendar(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let id = parse_id("calendar_id", &calendar_id)?;
    Ok(state.run(move |services| services.calendars().delete_by_id(id)).await)
}
