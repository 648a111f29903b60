//! Payment override endpoints

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
            "/payment_overrides",
            get(list_payment_overrides).post(create_payment_override),
        )
        .route(
            "/payment_overrides/{payment_override_id}",
            get(read_payment_override)
                .put(put_payment_override)
                .patch(patch_payment_override)
                .delete(delete_payment_override),
        )
}

/// GET /payment_overrides
async fn list_payment_overrides(State(state): State<AppState>) -> Outcome {
    state.run(|services| services.payment_overrides().list()).await
}

/// POST /payment_overrides
async fn create_payment_override(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.payment_overrides().create(&body))
        .await)
}

/// GET /payment_overrides/{payment_override_id}
async fn read_payment_override(
    State(state): State<AppState>,
    Path(payment_override_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let id = parse_id("payment_override_id", &payment_override_id)?;
    Ok(state
        .run(move |services| services.payment_overrides().read_by_id(id))
        .await)
}

/// PUT /payment_overrides/{payment_override_id}
async fn put_payment_override(
    State(state): State<AppState>,
    Path(payment_override_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let id = parse_id("payment_override_id", &payment_override_id)?;
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.payment_overrides().put_by_id(id, &body))
        .await)
}

/// PATCH /payment_overrides/{payment_override_id}
async fn patch_payment_override(
    State(state): State<AppState>,
    Path(payment_override_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let id = parse_id("payment_override_id", &payment_override_id)?;
    let body = parse_body(&body)?;
    Ok(state
        .run(move |services| services.payment_overrides().patch_by_id(id, &body))
        .await)
}

/// DELETE /payment_overrides/{payment_override_id}
async fn delete_payment_override(
    State(state): State<AppState>,
    Path(payment_override_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let id = parse_id("payment_override_id", &payment_override_id)?;
    Ok(state
        .run(move |services| services.payment_overrides().delete_by_id(id))
        .await)
}
