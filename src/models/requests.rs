use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::InteractionKind;
use crate::models::filters::DiscoveryFilters;

/// Query string for the daily matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DailyMatchesQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_daily_limit")]
    pub limit: i64,
}

fn default_daily_limit() -> i64 {
    20
}

/// Request body for browsing with filters
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BrowseRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(nested)]
    #[serde(default)]
    pub filters: DiscoveryFilters,
    #[serde(default)]
    pub skip: usize,
    /// Falls back to `discovery.default_limit` when absent
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Query string for nearby discovery
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_radius_km", rename = "radiusKm", alias = "radius_km")]
    pub radius_km: f64,
    #[serde(default)]
    pub skip: usize,
    /// Falls back to `discovery.default_limit` when absent
    #[serde(default)]
    pub limit: Option<i64>,
}

fn default_radius_km() -> f64 {
    50.0
}

/// Query string for recently-active discovery
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecentlyActiveQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_hours")]
    pub hours: i64,
    #[serde(default)]
    pub skip: usize,
    /// Falls back to `discovery.default_limit` when absent
    #[serde(default)]
    pub limit: Option<i64>,
}

fn default_hours() -> i64 {
    24
}

/// Query string for new-profile discovery
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProfilesQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_days")]
    pub days: i64,
    #[serde(default)]
    pub skip: usize,
    /// Falls back to `discovery.default_limit` when absent
    #[serde(default)]
    pub limit: Option<i64>,
}

fn default_days() -> i64 {
    7
}

/// Query string for random discovery
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RandomQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    /// Falls back to `discovery.default_limit` when absent
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Query string carrying only the requester
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Request to record an interaction
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordInteractionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_user_id", rename = "targetUserId")]
    pub target_user_id: String,
    pub kind: InteractionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_request_defaults() {
        let req: BrowseRequest = serde_json::from_str(r#"{"userId": "u1"}"#).unwrap();
        assert_eq!(req.limit, None);
        assert_eq!(req.skip, 0);
        assert!(req.filters.min_age.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_browse_request_validates_nested_filters() {
        let req: BrowseRequest =
            serde_json::from_str(r#"{"userId": "u1", "filters": {"maxDistanceKm": 900}}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_user_id_rejected() {
        let req = UserQuery { user_id: String::new() };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_interaction_kind_parsing() {
        let req: RecordInteractionRequest = serde_json::from_str(
            r#"{"userId": "a", "targetUserId": "b", "kind": "super_liked"}"#,
        )
        .unwrap();
        assert_eq!(req.kind, InteractionKind::SuperLiked);
    }
}
