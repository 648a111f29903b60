//! User endpoints

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
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{user_id}",
            get(read_user).put(put_user).patch(patch_user).delete(delete_user),
        )
}

/// GET /users
async fn list_users(State(state): State<AppState>) -> Outcome {
    state.run(|services| services.users().list()).await
}

/// POST /users
async fn create_user(State(state): State<AppState>, body: Bytes) -> Result<Outcome, Outcome> {
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.users().create(&body)).await)
}

/// GET /users/{user_id}
async fn read_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let id = parse_id("user_id", &user_id)?;
    Ok(state.run(move |services| services.users().read_by_id(id)).await)
}

/// PUT /users/{user_id}
async fn put_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let id = parse_id("user_id", &user_id)?;
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.users().put_by_id(id, &body)).await)
}

/// PATCH /users/{user_id}
async fn patch_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let id = parse_id("user_id", &user_id)?;
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.users().patch_by_id(id, &body)).await)
}

/// DELETE /users/{user_id}
async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let id = parse_id("user_id", &user_id)?;
    Ok(state.run(move |services| services.users().delete_by_id(id)).await)
}
