use crate::core::RankError;
use crate::models::{
    ChildrenStatus, DealBreaker, DiscoveryFilters, DrinkingHabit, Gender, MustHave, Profile,
    RelationshipType, SmokingHabit,
};

/// Hard-filter criteria after merging explicit filters over stored preferences
///
/// Built once per request, then checked against every candidate.
#[derive(Debug, Clone)]
pub struct Criteria<'a> {
    pub min_age: u8,
    pub max_age: u8,
    pub genders: &'a [Gender],
    pub relationship_types: &'a [RelationshipType],
    pub max_distance_km: Option<f64>,
    pub city: Option<String>,
    pub verified_only: bool,
    pub deal_breakers: &'a [DealBreaker],
    pub must_haves: &'a [MustHave],
    /// Present only when the requester is premium and supplied filters
    pub premium: Option<&'a DiscoveryFilters>,
}

impl<'a> Criteria<'a> {
    /// Merge `filters` over the requester's stored preferences.
    ///
    /// Fails with `InvalidArgument` on malformed filters or preferences, or
    /// when the merged age range is inverted.
    pub fn resolve(
        requester: &'a Profile,
        filters: Option<&'a DiscoveryFilters>,
    ) -> Result<Self, RankError> {
        let prefs = &requester.preferences;
        prefs.check_bounds()?;
        if let Some(f) = filters {
            f.check_bounds()?;
        }

        let min_age = filters.and_then(|f| f.min_age).unwrap_or(prefs.min_age);
        let max_age = filters.and_then(|f| f.max_age).unwrap_or(prefs.max_age);
        if min_age > max_age {
            return Err(RankError::InvalidArgument(format!(
                "effective age range is inverted: {} > {}",
                min_age, max_age
            )));
        }

        let premium = match filters {
            Some(f) if f.has_premium_filters() && !requester.is_premium => {
                tracing::debug!(
                    "Ignoring premium filters for non-premium requester {}",
                    requester.id
                );
                None
            }
            Some(f) if f.has_premium_filters() => Some(f),
            _ => None,
        };

        Ok(Self {
            min_age,
            max_age,
            genders: filters
                .and_then(|f| f.genders.as_deref())
                .unwrap_or(prefs.preferred_genders.as_slice()),
            relationship_types: filters
                .and_then(|f| f.relationship_types.as_deref())
                .unwrap_or(prefs.preferred_relationship_types.as_slice()),
            max_distance_km: filters
                .and_then(|f| f.max_distance_km)
                .or(prefs.max_distance_km),
            city: filters
                .and_then(|f| f.city.as_deref())
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty()),
            verified_only: filters.map(|f| f.verified_only).unwrap_or(false),
            deal_breakers: &prefs.deal_breakers,
            must_haves: &prefs.must_haves,
            premium,
        })
    }

    /// Stage 1 hard filter, excluding identity/exclusion checks and must-haves
    ///
    /// `age` is the candidate's derived age; `distance_km` is `None` when
    /// either side lacks coordinates, in which case distance never excludes.
    pub fn admits(&self, candidate: &Profile, age: u8, distance_km: Option<f64>) -> bool {
        if age < self.min_age || age > self.max_age {
            return false;
        }

        if !self.genders.is_empty()
            && !candidate.gender.is_some_and(|g| self.genders.contains(&g))
        {
            return false;
        }

        if !self.relationship_types.is_empty()
            && !candidate
                .relationship_type_seeking
                .is_some_and(|r| self.relationship_types.contains(&r))
        {
            return false;
        }

        if let (Some(max), Some(d)) = (self.max_distance_km, distance_km) {
            if d > max {
                return false;
            }
        }

        if let Some(city) = &self.city {
            let in_city = candidate
                .current_city
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(city.as_str()));
            if !in_city {
                return false;
            }
        }

        if self.deal_breakers.iter().any(|d| hits_deal_breaker(d, candidate)) {
            return false;
        }

        if self.verified_only && !candidate.verified() {
            return false;
        }

        match self.premium {
            Some(filters) => matches_premium_filters(candidate, filters),
            None => true,
        }
    }

    /// Whether the candidate meets every must-have of the requester
    pub fn must_haves_met(&self, requester: &Profile, candidate: &Profile) -> bool {
        self.must_haves
            .iter()
            .all(|m| meets_must_have(m, requester, candidate))
    }
}

/// Whether `candidate` triggers the deal-breaker
pub fn hits_deal_breaker(deal_breaker: &DealBreaker, candidate: &Profile) -> bool {
    match deal_breaker {
        DealBreaker::Smoking => matches!(
            candidate.smoking_habit,
            Some(SmokingHabit::Occasionally | SmokingHabit::Regularly)
        ),
        DealBreaker::Drinking => matches!(
            candidate.drinking_habit,
            Some(DrinkingHabit::Regularly | DrinkingHabit::Heavily)
        ),
        DealBreaker::HasChildren => candidate.children_status == Some(ChildrenStatus::HasChildren),
        DealBreaker::Attribute(value) => value.is_held_by(candidate),
    }
}

/// Whether `candidate` satisfies the must-have; an unknown attribute fails
pub fn meets_must_have(must_have: &MustHave, requester: &Profile, candidate: &Profile) -> bool {
    match must_have {
        MustHave::SameReligion => {
            candidate.religion.is_some() && candidate.religion == requester.religion
        }
        MustHave::SameEducation => {
            candidate.education_level.is_some()
                && candidate.education_level == requester.education_level
        }
        MustHave::NonSmoker => matches!(
            candidate.smoking_habit,
            Some(SmokingHabit::Never | SmokingHabit::Quit)
        ),
        // Only an explicit "has children" fails this one
        MustHave::NoChildren => candidate.children_status != Some(ChildrenStatus::HasChildren),
        MustHave::Attribute(value) => value.is_held_by(candidate),
    }
}

/// Check premium filter fields; an unknown attribute never satisfies a set filter
pub fn matches_premium_filters(candidate: &Profile, filters: &DiscoveryFilters) -> bool {
    fn in_set<T: PartialEq>(set: &Option<Vec<T>>, value: Option<T>) -> bool {
        match set {
            Some(allowed) => value.is_some_and(|v| allowed.contains(&v)),
            None => true,
        }
    }

    if filters.min_height_cm.is_some() || filters.max_height_cm.is_some() {
        let Some(height) = candidate.height_cm else {
            return false;
        };
        if filters.min_height_cm.is_some_and(|min| height < min)
            || filters.max_height_cm.is_some_and(|max| height > max)
        {
            return false;
        }
    }

    in_set(&filters.education_levels, candidate.education_level)
        && in_set(&filters.body_types, candidate.body_type)
        && in_set(&filters.drinking_habits, candidate.drinking_habit)
        && in_set(&filters.smoking_habits, candidate.smoking_habit)
        && in_set(&filters.children_status, candidate.children_status)
        && in_set(&filters.religions, candidate.religion)
}
