use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::RankError;
use crate::models::enums::{
    BodyType, ChildrenStatus, DrinkingHabit, EducationLevel, Gender, RelationshipType, Religion,
    SmokingHabit,
};

/// Explicit overrides of the requester's stored preferences ("browse with filters")
///
/// Basic filters replace the stored preference when present. Premium filters
/// only take effect for premium requesters and are ignored for everyone else.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryFilters {
    #[validate(range(min = 18, max = 100))]
    #[serde(default)]
    pub min_age: Option<u8>,
    #[validate(range(min = 18, max = 100))]
    #[serde(default)]
    pub max_age: Option<u8>,
    #[serde(default)]
    pub genders: Option<Vec<Gender>>,
    #[serde(default)]
    pub relationship_types: Option<Vec<RelationshipType>>,
    #[validate(range(min = 1.0, max = 500.0))]
    #[serde(default)]
    pub max_distance_km: Option<f64>,
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub verified_only: bool,

    // Premium
    #[serde(default)]
    pub education_levels: Option<Vec<EducationLevel>>,
    #[validate(range(min = 100, max = 250))]
    #[serde(default)]
    pub min_height_cm: Option<u16>,
    #[validate(range(min = 100, max = 250))]
    #[serde(default)]
    pub max_height_cm: Option<u16>,
    #[serde(default)]
    pub body_types: Option<Vec<BodyType>>,
    #[serde(default)]
    pub drinking_habits: Option<Vec<DrinkingHabit>>,
    #[serde(default)]
    pub smoking_habits: Option<Vec<SmokingHabit>>,
    #[serde(default)]
    pub children_status: Option<Vec<ChildrenStatus>>,
    #[serde(default)]
    pub religions: Option<Vec<Religion>>,
}

impl DiscoveryFilters {
    /// Filters that only premium requesters may apply
    pub fn has_premium_filters(&self) -> bool {
        self.education_levels.is_some()
            || self.min_height_cm.is_some()
            || self.max_height_cm.is_some()
            || self.body_types.is_some()
            || self.drinking_habits.is_some()
            || self.smoking_habits.is_some()
            || self.children_status.is_some()
            || self.religions.is_some()
    }

    /// Reject inverted ranges and impossible distances.
    ///
    /// Runs for every filter field, premium or not, before any scoring.
    pub fn check_bounds(&self) -> Result<(), RankError> {
        if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min > max {
                return Err(RankError::InvalidArgument(format!(
                    "min_age ({}) is greater than max_age ({})",
                    min, max
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min_height_cm, self.max_height_cm) {
            if min > max {
                return Err(RankError::InvalidArgument(format!(
                    "min_height_cm ({}) is greater than max_height_cm ({})",
                    min, max
                )));
            }
        }
        if let Some(km) = self.max_distance_km {
            if !km.is_finite() || km < 0.0 {
                return Err(RankError::InvalidArgument(format!(
                    "max_distance_km must be a non-negative number, got {}",
                    km
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_are_valid() {
        assert!(DiscoveryFilters::default().check_bounds().is_ok());
        assert!(!DiscoveryFilters::default().has_premium_filters());
    }

    #[test]
    fn test_inverted_age_range() {
        let filters = DiscoveryFilters {
            min_age: Some(35),
            max_age: Some(25),
            ..Default::default()
        };
        assert!(matches!(filters.check_bounds(), Err(RankError::InvalidArgument(_))));
    }

    #[test]
    fn test_inverted_height_range() {
        let filters = DiscoveryFilters {
            min_height_cm: Some(190),
            max_height_cm: Some(160),
            ..Default::default()
        };
        assert!(filters.check_bounds().is_err());
        assert!(filters.has_premium_filters());
    }

    #[test]
    fn test_nan_distance_rejected() {
        let filters = DiscoveryFilters {
            max_distance_km: Some(f64::NAN),
            ..Default::default()
        };
        assert!(filters.check_bounds().is_err());
    }

    #[test]
    fn test_request_validation_limits_age() {
        let filters = DiscoveryFilters {
            min_age: Some(16),
            ..Default::default()
        };
        assert!(filters.validate().is_err());
    }
}
