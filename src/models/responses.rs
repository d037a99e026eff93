use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{Profile, RankedCandidate};
use crate::models::enums::{Gender, RelationshipType};

/// Public view of a ranked candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResponse {
    pub user_id: String,
    pub name: String,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub bio: Option<String>,
    pub current_city: Option<String>,
    pub relationship_type_seeking: Option<RelationshipType>,
    pub distance_km: Option<f64>,
    pub compatibility_score: f64,
    pub shared_interests: Vec<String>,
    pub is_verified: bool,
    pub last_active_at: Option<DateTime<Utc>>,
}

impl CandidateResponse {
    pub fn from_ranked(ranked: &RankedCandidate<'_>, today: NaiveDate) -> Self {
        let profile: &Profile = ranked.profile;
        Self {
            user_id: profile.id.clone(),
            name: profile.name.clone(),
            age: profile.age_on(today),
            gender: profile.gender,
            bio: profile.bio.clone(),
            current_city: profile.current_city.clone(),
            relationship_type_seeking: profile.relationship_type_seeking,
            distance_km: ranked.distance_km.map(|d| (d * 10.0).round() / 10.0),
            compatibility_score: (ranked.score * 100.0).round() / 100.0,
            shared_interests: ranked.shared_interests.clone(),
            is_verified: profile.verified(),
            last_active_at: profile.last_active_at,
        }
    }
}

/// Response for paginated discovery endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResponse {
    pub profiles: Vec<CandidateResponse>,
    pub total_count: usize,
    pub skip: usize,
    pub limit: usize,
}

/// Response for daily matches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMatchesResponse {
    pub matches: Vec<CandidateResponse>,
    pub total_count: usize,
    pub refreshes_at: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Record interaction response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInteractionResponse {
    pub success: bool,
    pub interaction_id: String,
}

/// Exclusion set for a requester, for client-side sync and debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionsResponse {
    pub user_id: String,
    pub excluded_profiles: Vec<String>,
    pub count: usize,
}
