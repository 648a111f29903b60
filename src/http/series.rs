//! Recurring series endpoints, nested under a calendar

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
            "/calendars/{calendar_id}/series",
            get(list_series).post(create_series),
        )
        .route(
            "/calendars/{calendar_id}/series/{series_id}",
            get(read_series)
                .put(put_series)
                .patch(patch_series)
                .delete(delete_series),
        )
}

fn ids(calendar_id: &str, series_id: &str) -> Result<(i64, i64), Outcome> {
    Ok((
        parse_id("calendar_id", calendar_id)?,
        parse_id("series_id", series_id)?,
    ))
}

/// GET /calendars/{calendar_id}/series
async fn list_series(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let calendar_id = parse_id("calendar_id", &calendar_id)?;
    Ok(state.run(move |services| services.series(calendar_id).list()).await)
}

/// POST /calendars/{calendar_id}/series
async fn create_series(
    State(state): State<AppState>,
    Path(calendar_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let calendar_id = parse_id("calendar_id", &calendar_id)?;
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.series(calendar_id).create(&body)).await)
}

/// GET /calendars/{calendar_id}/series/{series_id}
async fn read_series(
    State(state): State<AppState>,
    Path((calendar_id, series_id)): Path<(String, String)>,
) -> Result<Outcome, Outcome> {
    let (calendar_id, series_id) = ids(&calendar_id, &series_id)?;
    Ok(state
        .run(move |services| services.series(calendar_id).read_by_id(series_id))
        .await)
}

/// PUT /calendars/{calendar_id}/series/{series_id}
async fn put_series(
    State(state): State<AppState>,
    Path((calendar_id, series_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let (calendar_id, series_id) = ids(&calendar_id, &series_id)?;
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.series(calendar_id).put_by_id(series_id, &body))
        .await)
}

/// PATCH /calendars/{calendar_id}/series/{series_id}
async fn patch_series(
    State(state): State<AppState>,
    Path((calendar_id, series_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let (calendar_id, series_id) = ids(&calendar_id, &series_id)?;
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.series(calendar_id).patch_by_id(series_id, &body))
        .await)
}

/// DELETE /calendars/{calendar_id}/series/{series_id}
async fn delete_series(
    State(state): State<AppState>,
    Path((calendar_id, series_id)): Path<(String, String)>,
) -> Result<Outcome, Outcome> {
    let (calendar_id, series_id) = ids(&calendar_id, &series_id)?;
    Ok(state
        .run(move |services| services.series(calendar_id).delete_by_id(series_id))
        .await)
}
