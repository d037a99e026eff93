use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use validator::Validate;

use crate::core::discovery::{
    check_radius, check_random_limit, check_window, Page, DAILY_LIMIT_RANGE, NEW_PROFILE_DAYS,
    RECENTLY_ACTIVE_HOURS,
};
use crate::core::{calculate_bounding_box, Clock};
use crate::models::{
    BrowseRequest, CandidateResponse, DailyMatchesQuery, DailyMatchesResponse, DiscoveryResponse,
    HealthResponse, NearbyQuery, NewProfilesQuery, Profile, RandomQuery, RecentlyActiveQuery,
};
use crate::routes::{
    bad_request, effective_limit, invalid_argument, load_requester, requested_limit,
    storage_error, AppState,
};
use crate::services::{CacheKey, PoolQuery};

/// Configure health and discovery routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/discovery/daily-matches", web::get().to(daily_matches))
        .route("/discovery/browse", web::post().to(browse))
        .route("/discovery/nearby", web::get().to(nearby))
        .route("/discovery/recently-active", web::get().to(recently_active))
        .route("/discovery/new-profiles", web::get().to(new_profiles))
        .route("/discovery/random", web::get().to(random));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);
    let cache_healthy = state.cache.health_check().await;

    let status = if pg_healthy && cache_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Candidate pool plus exclusions for a requester
///
/// When `radius_km` is set the pool is narrowed by a bounding box first;
/// profiles without coordinates are still returned.
async fn load_pool(
    state: &AppState,
    requester: &Profile,
    mut query: PoolQuery<'_>,
    radius_km: Option<f64>,
) -> Result<(Vec<Profile>, HashSet<String>), HttpResponse> {
    if let (Some(radius), Some((lat, lon))) = (radius_km, requester.location()) {
        query.bbox = Some(calculate_bounding_box(lat, lon, radius));
    }

    let now = state.ranker.clock().now();
    let (pool, exclusions) = tokio::join!(
        state.postgres.get_candidate_pool(&query),
        state.postgres.get_exclusions(&requester.id, now),
    );

    let pool = pool.map_err(|e| storage_error("Failed to query candidates", e))?;
    let exclusions = exclusions.map_err(|e| storage_error("Failed to fetch exclusions", e))?;

    Ok((pool, exclusions))
}

fn page_response(page: Page<'_>, skip: usize, limit: usize, today: NaiveDate) -> DiscoveryResponse {
    DiscoveryResponse {
        profiles: page
            .candidates
            .iter()
            .map(|c| CandidateResponse::from_ranked(c, today))
            .collect(),
        total_count: page.total,
        skip,
        limit,
    }
}

/// Daily matches endpoint
///
/// GET /api/v1/discovery/daily-matches?userId={userId}&limit={10-20}
///
/// The full day's list is computed once per UTC day and cached under
/// `daily:{userId}:{date}`; the limit only truncates it.
async fn daily_matches(
    state: web::Data<AppState>,
    query: web::Query<DailyMatchesQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return bad_request("Validation failed", errors.to_string());
    }
    let limit = match effective_limit(query.limit, *DAILY_LIMIT_RANGE.end()) {
        Ok(limit) => limit.max(*DAILY_LIMIT_RANGE.start()),
        Err(resp) => return resp,
    };

    let user_id = &query.user_id;
    let today = state.ranker.clock().now().date_naive();
    let cache_key = CacheKey::daily(user_id, today);

    if let Ok(mut cached) = state.cache.get::<DailyMatchesResponse>(&cache_key).await {
        tracing::debug!("Serving cached daily matches for {}", user_id);
        cached.matches.truncate(limit);
        cached.total_count = cached.matches.len();
        return HttpResponse::Ok().json(cached);
    }

    let requester = match load_requester(&state, user_id).await {
        Ok(profile) => profile,
        Err(resp) => return resp,
    };
    let radius = requester.preferences.max_distance_km;
    let pool_query = PoolQuery::new(user_id, state.discovery.pool_size);
    let (pool, exclusions) = match load_pool(&state, &requester, pool_query, radius).await {
        Ok(loaded) => loaded,
        Err(resp) => return resp,
    };

    let daily = match state.ranker.daily_matches(
        &requester,
        &pool,
        &exclusions,
        *DAILY_LIMIT_RANGE.end(),
    ) {
        Ok(daily) => daily,
        Err(e) => return invalid_argument(e),
    };

    let mut response = DailyMatchesResponse {
        matches: daily
            .candidates
            .iter()
            .map(|c| CandidateResponse::from_ranked(c, today))
            .collect(),
        total_count: daily.candidates.len(),
        refreshes_at: daily.refreshes_at,
    };

    if let Err(e) = state.cache.set(&cache_key, &response).await {
        tracing::warn!("Failed to cache daily matches for {}: {}", user_id, e);
    }

    response.matches.truncate(limit);
    response.total_count = response.matches.len();

    tracing::info!(
        "Returning {} daily matches for user {} (from {} candidates)",
        response.total_count,
        user_id,
        pool.len()
    );

    HttpResponse::Ok().json(response)
}

/// Browse with filters endpoint
///
/// POST /api/v1/discovery/browse
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "filters": { "minAge": 25, "maxAge": 35, "maxDistanceKm": 50 },
///   "skip": 0,
///   "limit": 20
/// }
/// ```
///
/// Premium filters from non-premium users are ignored.
async fn browse(state: web::Data<AppState>, req: web::Json<BrowseRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for browse request: {:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }
    if let Err(e) = req.filters.check_bounds() {
        return invalid_argument(e);
    }
    let limit = match requested_limit(req.limit, &state.discovery, state.discovery.max_limit) {
        Ok(limit) => limit,
        Err(resp) => return resp,
    };

    let requester = match load_requester(&state, &req.user_id).await {
        Ok(profile) => profile,
        Err(resp) => return resp,
    };
    let radius = req
        .filters
        .max_distance_km
        .or(requester.preferences.max_distance_km);
    let pool_query = PoolQuery::new(&req.user_id, state.discovery.pool_size);
    let (pool, exclusions) = match load_pool(&state, &requester, pool_query, radius).await {
        Ok(loaded) => loaded,
        Err(resp) => return resp,
    };

    let today = state.ranker.clock().now().date_naive();
    match state
        .ranker
        .browse(&requester, &pool, &exclusions, &req.filters, req.skip, limit)
    {
        Ok(page) => HttpResponse::Ok().json(page_response(page, req.skip, limit, today)),
        Err(e) => invalid_argument(e),
    }
}

/// Nearby endpoint
///
/// GET /api/v1/discovery/nearby?userId={userId}&radiusKm={1-500}
async fn nearby(state: web::Data<AppState>, query: web::Query<NearbyQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return bad_request("Validation failed", errors.to_string());
    }
    if let Err(e) = check_radius(query.radius_km) {
        return invalid_argument(e);
    }
    let limit = match requested_limit(query.limit, &state.discovery, state.discovery.max_limit) {
        Ok(limit) => limit,
        Err(resp) => return resp,
    };

    let requester = match load_requester(&state, &query.user_id).await {
        Ok(profile) => profile,
        Err(resp) => return resp,
    };
    if requester.location().is_none() {
        return bad_request(
            "Location required",
            "Set your location to discover people nearby".to_string(),
        );
    }

    let pool_query = PoolQuery::new(&query.user_id, state.discovery.pool_size);
    let (pool, exclusions) =
        match load_pool(&state, &requester, pool_query, Some(query.radius_km)).await {
            Ok(loaded) => loaded,
            Err(resp) => return resp,
        };

    let today = state.ranker.clock().now().date_naive();
    match state
        .ranker
        .nearby(&requester, &pool, &exclusions, query.radius_km, query.skip, limit)
    {
        Ok(page) => HttpResponse::Ok().json(page_response(page, query.skip, limit, today)),
        Err(e) => invalid_argument(e),
    }
}

/// Recently active endpoint
///
/// GET /api/v1/discovery/recently-active?userId={userId}&hours={1-168}
async fn recently_active(
    state: web::Data<AppState>,
    query: web::Query<RecentlyActiveQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return bad_request("Validation failed", errors.to_string());
    }
    if let Err(e) = check_window("hours", query.hours, &RECENTLY_ACTIVE_HOURS) {
        return invalid_argument(e);
    }
    let limit = match requested_limit(query.limit, &state.discovery, state.discovery.max_limit) {
        Ok(limit) => limit,
        Err(resp) => return resp,
    };

    let requester = match load_requester(&state, &query.user_id).await {
        Ok(profile) => profile,
        Err(resp) => return resp,
    };
    let now = state.ranker.clock().now();
    let mut pool_query = PoolQuery::new(&query.user_id, state.discovery.pool_size);
    pool_query.active_since = Some(now - Duration::hours(query.hours));
    let radius = requester.preferences.max_distance_km;
    let (pool, exclusions) = match load_pool(&state, &requester, pool_query, radius).await {
        Ok(loaded) => loaded,
        Err(resp) => return resp,
    };

    match state.ranker.recently_active(
        &requester,
        &pool,
        &exclusions,
        query.hours,
        query.skip,
        limit,
    ) {
        Ok(page) => {
            HttpResponse::Ok().json(page_response(page, query.skip, limit, now.date_naive()))
        }
        Err(e) => invalid_argument(e),
    }
}

/// New profiles endpoint
///
/// GET /api/v1/discovery/new-profiles?userId={userId}&days={1-30}
async fn new_profiles(
    state: web::Data<AppState>,
    query: web::Query<NewProfilesQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return bad_request("Validation failed", errors.to_string());
    }
    if let Err(e) = check_window("days", query.days, &NEW_PROFILE_DAYS) {
        return invalid_argument(e);
    }
    let limit = match requested_limit(query.limit, &state.discovery, state.discovery.max_limit) {
        Ok(limit) => limit,
        Err(resp) => return resp,
    };

    let requester = match load_requester(&state, &query.user_id).await {
        Ok(profile) => profile,
        Err(resp) => return resp,
    };
    let now = state.ranker.clock().now();
    let mut pool_query = PoolQuery::new(&query.user_id, state.discovery.pool_size);
    pool_query.created_since = Some(now - Duration::days(query.days));
    let radius = requester.preferences.max_distance_km;
    let (pool, exclusions) = match load_pool(&state, &requester, pool_query, radius).await {
        Ok(loaded) => loaded,
        Err(resp) => return resp,
    };

    match state
        .ranker
        .new_profiles(&requester, &pool, &exclusions, query.days, query.skip, limit)
    {
        Ok(page) => {
            HttpResponse::Ok().json(page_response(page, query.skip, limit, now.date_naive()))
        }
        Err(e) => invalid_argument(e),
    }
}

/// Random discovery endpoint
///
/// GET /api/v1/discovery/random?userId={userId}&limit={1-50}
///
/// Samples from at most `discovery.pool_size` recently active profiles.
async fn random(state: web::Data<AppState>, query: web::Query<RandomQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return bad_request("Validation failed", errors.to_string());
    }
    let limit = match requested_limit(query.limit, &state.discovery, usize::MAX) {
        Ok(limit) => limit,
        Err(resp) => return resp,
    };
    if let Err(e) = check_random_limit(limit) {
        return invalid_argument(e);
    }

    let requester = match load_requester(&state, &query.user_id).await {
        Ok(profile) => profile,
        Err(resp) => return resp,
    };
    let radius = requester.preferences.max_distance_km;
    let pool_query = PoolQuery::new(&query.user_id, state.discovery.pool_size);
    let (pool, exclusions) = match load_pool(&state, &requester, pool_query, radius).await {
        Ok(loaded) => loaded,
        Err(resp) => return resp,
    };

    let today = state.ranker.clock().now().date_naive();
    let sample = {
        let mut rng = rand::thread_rng();
        state
            .ranker
            .random(&requester, &pool, &exclusions, limit, &mut rng)
    };

    match sample {
        Ok(sample) => {
            let profiles: Vec<CandidateResponse> = sample
                .iter()
                .map(|c| CandidateResponse::from_ranked(c, today))
                .collect();
            HttpResponse::Ok().json(DiscoveryResponse {
                total_count: profiles.len(),
                profiles,
                skip: 0,
                limit,
            })
        }
        Err(e) => invalid_argument(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{handle_json_payload_error, handle_query_payload_error, test_support};
    use actix_web::{http::StatusCode, test, App};

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(test_support::state()))
                    .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                    .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
                    .configure(crate::routes::configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_daily_matches_rejects_zero_limit() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/discovery/daily-matches?userId=u1&limit=0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_missing_user_id_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/discovery/random?limit=5")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_browse_rejects_inverted_age_range() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/v1/discovery/browse")
            .set_json(serde_json::json!({
                "userId": "u1",
                "filters": { "minAge": 40, "maxAge": 30 }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_nearby_rejects_large_radius() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/v1/discovery/nearby?userId=u1&radiusKm=900")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_window_parameters_validated() {
        let app = app!();
        for uri in [
            "/api/v1/discovery/recently-active?userId=u1&hours=500",
            "/api/v1/discovery/new-profiles?userId=u1&days=0",
            "/api/v1/discovery/random?userId=u1&limit=80",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }
}
