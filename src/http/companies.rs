//! Company endpoints

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
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/{company_id}",
            get(read_company)
                .put(put_company)
                .patch(patch_company)
                .delete(delete_company),
        )
}

/// GET /companies
async fn list_companies(State(state): State<AppState>) -> Outcome {
    state.run(|services| services.companies().list()).await
}

/// POST /companies
async fn create_company(State(state): State<AppState>, body: Bytes) -> Result<Outcome, Outcome> {
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.companies().create(&body)).await)
}

/// GET /companies/{company_id}
async fn read_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let id = parse_id("company_id", &company_id)?;
    Ok(state.run(move |services| services.companies().read_by_id(id)).await)
}

/// PUT /companies/{company_id}
async fn put_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let id = parse_id("company_id", &company_id)?;
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.companies().put_by_id(id, &body)).await)
}

/// PATCH /companies/{company_id}
async fn patch_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    body: Bytes,
) -> Result<Outcome, Outcome> {
    let id = parse_id("company_id", &company_id)?;
    let body = parse_body(&body)?;
    Ok(state.run(move |services| services.companies().patch_by_id(id, &body)).await)
}

/// DELETE /companies/{company_id}
async fn delete_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Outcome, Outcome> {
    let id = parse_id("company_id", &company_id)?;
    Ok(state.run(move |services| services.companies().delete_by_id(id)).await)
}
