//! REST surface over the resource façades.

pub mod calendars;
pub mod cancellations;
pub mod companies;
pub mod events;
pub mod payment_overrides;
pub mod series;
pub mod users;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::outcome::Outcome;
use crate::service::{ServiceError, Services};
use crate::validation::ValidationError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    services: Services,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Runs a façade call on the blocking pool; SQLite access is synchronous.
    pub async fn run<F>(&self, operation: F) -> Outcome
    where
        F: FnOnce(&Services) -> Outcome + Send + 'static,
    {
        let services = self.services.clone();
        match tokio::task::spawn_blocking(move || operation(&services)).await {
            Ok(outcome) => outcome,
            Err(err) => Outcome::failure(
                format!("Request failed: {err}"),
                json!({ "kind": "Internal", "message": err.to_string() }),
                500,
            ),
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

fn rejected(err: ValidationError) -> Outcome {
    ServiceError::from(err).into_outcome()
}

/// Path ids must be integers; anything else fails validation on that param.
pub fn parse_id(param: &str, raw: &str) -> Result<i64, Outcome> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| rejected(ValidationError::invalid(param, Some(&Value::from(raw)))))
}

/// An empty body reads as `{}` so field checks report the first missing param.
pub fn parse_body(bytes: &Bytes) -> Result<Value, Outcome> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|_| {
        let raw = String::from_utf8_lossy(bytes);
        rejected(ValidationError::invalid("body", Some(&Value::from(raw.as_ref()))))
    })
}

pub fn router(services: Services) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    Router::new()
        .merge(calendars::router())
        .merge(events::router())
        .merge(series::router())
        .merge(cancellations::router())
        .merge(users::router())
        .merge(companies::router())
        .merge(payment_overrides::router())
        .with_state(AppState::new(services))
        .layer(cors)
        .layer(trace)
}
