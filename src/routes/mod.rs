// Route exports
pub mod discovery;
pub mod interactions;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::config::DiscoverySettings;
use crate::core::{validate_limit, RankError, Ranker};
use crate::models::{ErrorResponse, Profile};
use crate::services::{CacheManager, PostgresClient, PostgresError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<CacheManager>,
    pub ranker: Ranker,
    pub discovery: DiscoverySettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(discovery::configure)
            .configure(interactions::configure),
    );
}

/// JSON error returned for payloads actix cannot extract
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

pub(crate) fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

pub(crate) fn invalid_argument(err: RankError) -> HttpResponse {
    bad_request("Invalid argument", err.to_string())
}

pub(crate) fn storage_error(context: &str, err: PostgresError) -> HttpResponse {
    tracing::error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: context.to_string(),
        message: err.to_string(),
        status_code: 500,
    })
}

/// Requested limit, rejected when non-positive and capped at `max`
pub(crate) fn effective_limit(limit: i64, max: usize) -> Result<usize, HttpResponse> {
    validate_limit(limit)
        .map(|limit| limit.min(max))
        .map_err(invalid_argument)
}

/// Requested limit, or the configured default when the client sent none
pub(crate) fn requested_limit(
    limit: Option<i64>,
    discovery: &DiscoverySettings,
    max: usize,
) -> Result<usize, HttpResponse> {
    let default = i64::try_from(discovery.default_limit).unwrap_or(i64::MAX);
    effective_limit(limit.unwrap_or(default), max)
}

/// Load the requester's profile; unknown users map to 404
pub(crate) async fn load_requester(state: &AppState, user_id: &str) -> Result<Profile, HttpResponse> {
    match state.postgres.get_profile(user_id).await {
        Ok(profile) => Ok(profile),
        Err(PostgresError::NotFound(_)) => Err(HttpResponse::NotFound().json(ErrorResponse {
            error: "User not found".to_string(),
            message: format!("No profile for user {}", user_id),
            status_code: 404,
        })),
        Err(e) => Err(storage_error("Failed to fetch user profile", e)),
    }
}
