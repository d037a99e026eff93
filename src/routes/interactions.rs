use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use validator::Validate;

use crate::core::Clock;
use crate::models::{
    ExclusionsResponse, InteractionKind, RecordInteractionRequest, RecordInteractionResponse,
    UserQuery,
};
use crate::routes::{bad_request, storage_error, AppState};
use crate::services::{CacheKey, PostgresError};

/// Configure interaction routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/interactions", web::post().to(record_interaction))
        .route("/interactions/excluded", web::get().to(get_exclusions));
}

/// Record interaction endpoint
///
/// POST /api/v1/interactions
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "targetUserId": "string",
///   "kind": "viewed|liked|super_liked|passed|blocked"
/// }
/// ```
async fn record_interaction(
    state: web::Data<AppState>,
    req: web::Json<RecordInteractionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }
    if req.user_id == req.target_user_id {
        return bad_request(
            "Invalid interaction",
            "Cannot interact with your own profile".to_string(),
        );
    }

    let interaction_id = match state
        .postgres
        .record_interaction(&req.user_id, &req.target_user_id, req.kind)
        .await
    {
        Ok(id) => id,
        Err(PostgresError::InvalidInput(message)) => {
            return bad_request("Invalid interaction", message)
        }
        Err(e) => return storage_error("Failed to record interaction", e),
    };

    let today = state.ranker.clock().now().date_naive();
    for key in stale_daily_keys(&req, today) {
        if let Err(e) = state.cache.delete(&key).await {
            tracing::warn!("Failed to invalidate {}: {}", key, e);
        }
    }

    tracing::debug!(
        "Recorded interaction: {} -> {} ({:?})",
        req.user_id,
        req.target_user_id,
        req.kind
    );

    HttpResponse::Ok().json(RecordInteractionResponse {
        success: true,
        interaction_id: interaction_id.to_string(),
    })
}

/// Cached daily lists the new interaction makes stale
///
/// The actor's list always loses the target. A block also hides the actor
/// from the target, so the target's list is dropped too.
fn stale_daily_keys(req: &RecordInteractionRequest, today: NaiveDate) -> Vec<String> {
    let mut keys = vec![CacheKey::daily(&req.user_id, today)];
    if req.kind == InteractionKind::Blocked {
        keys.push(CacheKey::daily(&req.target_user_id, today));
    }
    keys
}

/// Get the exclusion set for a user
///
/// GET /api/v1/interactions/excluded?userId={userId}
///
/// Returns the profile ids discovery currently hides from the user, for
/// client-side synchronization and debugging purposes.
async fn get_exclusions(state: web::Data<AppState>, query: web::Query<UserQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let now = state.ranker.clock().now();
    match state.postgres.get_exclusions(&query.user_id, now).await {
        Ok(excluded) => {
            let mut excluded_profiles: Vec<String> = excluded.into_iter().collect();
            excluded_profiles.sort();
            HttpResponse::Ok().json(ExclusionsResponse {
                user_id: query.user_id.clone(),
                count: excluded_profiles.len(),
                excluded_profiles,
            })
        }
        Err(e) => storage_error("Failed to fetch exclusions", e),
    }
}
