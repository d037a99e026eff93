use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::RankError;
use crate::models::enums::{
    BodyType, ChildrenStatus, DrinkingHabit, EducationLevel, Gender, PersonalityType,
    RelationshipType, Religion, Sexuality, SmokingHabit,
};

/// User profile as read from the profile repository
///
/// The ranker only reads profiles. Age is not stored: use [`Profile::age_on`]
/// with the ranker's clock so it never drifts from the date of birth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub sexuality: Option<Sexuality>,
    #[serde(default)]
    pub height_cm: Option<u16>,
    #[serde(default)]
    pub body_type: Option<BodyType>,
    #[serde(default)]
    pub current_city: Option<String>,
    #[serde(default)]
    pub current_country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub relationship_type_seeking: Option<RelationshipType>,
    #[serde(default)]
    pub drinking_habit: Option<DrinkingHabit>,
    #[serde(default)]
    pub smoking_habit: Option<SmokingHabit>,
    #[serde(default)]
    pub children_status: Option<ChildrenStatus>,
    #[serde(default)]
    pub religion: Option<Religion>,
    #[serde(default)]
    pub education_level: Option<EducationLevel>,
    #[serde(default)]
    pub personality_type: Option<PersonalityType>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_photo_verified: bool,
    #[serde(default)]
    pub is_video_verified: bool,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default = "default_true")]
    pub is_discoverable: bool,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub profile_completion_percentage: u8,
    #[serde(default)]
    pub preferences: PreferenceSet,
}

fn default_true() -> bool { true }

impl Profile {
    /// Age in whole years on `today`, derived from the date of birth
    pub fn age_on(&self, today: NaiveDate) -> Option<u8> {
        let dob = self.date_of_birth?;
        let mut years = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        u8::try_from(years).ok()
    }

    /// Coordinates, only when both halves are present and finite
    pub fn location(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    /// Any verification path (manual, photo or video) counts
    pub fn verified(&self) -> bool {
        self.is_verified || self.is_photo_verified || self.is_video_verified
    }
}

/// Matching preferences embedded in a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSet {
    #[serde(default = "default_min_age")]
    pub min_age: u8,
    #[serde(default = "default_max_age")]
    pub max_age: u8,
    #[serde(default)]
    pub preferred_genders: Vec<Gender>,
    #[serde(default)]
    pub preferred_relationship_types: Vec<RelationshipType>,
    #[serde(default)]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub deal_breakers: Vec<DealBreaker>,
    #[serde(default)]
    pub must_haves: Vec<MustHave>,
    /// Relative sub-score weights chosen by the user, replacing the configured ones
    #[serde(default)]
    pub match_weights: Option<ScoringWeights>,
}

fn default_min_age() -> u8 { 18 }
fn default_max_age() -> u8 { 100 }

impl Default for PreferenceSet {
    fn default() -> Self {
        Self {
            min_age: default_min_age(),
            max_age: default_max_age(),
            preferred_genders: Vec::new(),
            preferred_relationship_types: Vec::new(),
            max_distance_km: None,
            deal_breakers: Vec::new(),
            must_haves: Vec::new(),
            match_weights: None,
        }
    }
}

impl PreferenceSet {
    /// Reject stored preferences that break their own invariants
    pub fn check_bounds(&self) -> Result<(), RankError> {
        if self.min_age > self.max_age {
            return Err(RankError::InvalidArgument(format!(
                "preferred age range is inverted: {} > {}",
                self.min_age, self.max_age
            )));
        }
        if let Some(km) = self.max_distance_km {
            if !km.is_finite() || km < 0.0 {
                return Err(RankError::InvalidArgument(format!(
                    "preferred max distance must be a non-negative number, got {}",
                    km
                )));
            }
        }
        if let Some(weights) = &self.match_weights {
            weights.check()?;
        }
        Ok(())
    }
}

/// A concrete attribute value, used by explicit deal-breakers and must-haves
///
/// Wire form: `{"attribute": "religion", "value": "islam"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Drinking(DrinkingHabit),
    Smoking(SmokingHabit),
    Children(ChildrenStatus),
    Religion(Religion),
    Education(EducationLevel),
    BodyType(BodyType),
}

impl AttributeValue {
    /// Whether the profile's corresponding attribute holds exactly this value
    pub fn is_held_by(&self, profile: &Profile) -> bool {
        match *self {
            AttributeValue::Drinking(v) => profile.drinking_habit == Some(v),
            AttributeValue::Smoking(v) => profile.smoking_habit == Some(v),
            AttributeValue::Children(v) => profile.children_status == Some(v),
            AttributeValue::Religion(v) => profile.religion == Some(v),
            AttributeValue::Education(v) => profile.education_level == Some(v),
            AttributeValue::BodyType(v) => profile.body_type == Some(v),
        }
    }
}

/// Attribute values that unconditionally exclude a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealBreaker {
    /// Smokes occasionally or regularly
    Smoking,
    /// Drinks regularly or heavily
    Drinking,
    #[serde(alias = "no_kids")]
    HasChildren,
    Attribute(AttributeValue),
}

/// Attributes a candidate is required to have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MustHave {
    SameReligion,
    SameEducation,
    /// Never smoked, or quit
    NonSmoker,
    NoChildren,
    Attribute(AttributeValue),
}

/// What to do with a candidate that misses a must-have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MustHavePolicy {
    /// Drop the candidate in the hard-filter stage
    #[default]
    Strict,
    /// Keep the candidate but rank it below every candidate meeting all must-haves
    Lenient,
}

/// Kind of interaction recorded in the interaction log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "interaction_kind", rename_all = "snake_case")]
pub enum InteractionKind {
    Viewed,
    Liked,
    SuperLiked,
    Passed,
    Blocked,
}

/// Candidate produced by the ranker; never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate<'a> {
    pub profile: &'a Profile,
    pub score: f64,
    pub distance_km: Option<f64>,
    pub must_haves_met: bool,
    pub shared_interests: Vec<String>,
}

/// Geospatial bounding box
///
/// `min_lon > max_lon` means the box wraps across the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    #[inline]
    pub fn crosses_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }
}

/// Weights of the compatibility sub-scores; the defaults sum to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub overlap: f64,
    pub lifestyle: f64,
    pub proximity: f64,
    pub age: f64,
    pub personality: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            overlap: 0.35,
            lifestyle: 0.25,
            proximity: 0.20,
            age: 0.15,
            personality: 0.05,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.overlap + self.lifestyle + self.proximity + self.age + self.personality
    }

    /// Weights must be finite, non-negative and not all zero
    pub fn check(&self) -> Result<(), RankError> {
        let values = [self.overlap, self.lifestyle, self.proximity, self.age, self.personality];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) || self.sum() <= 0.0 {
            return Err(RankError::InvalidArgument(format!(
                "scoring weights must be finite, non-negative and not all zero: {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Rescale so the weights sum to 1, keeping their ratios
    pub fn normalized(&self) -> Self {
        let sum = self.sum();
        if sum <= 0.0 || !sum.is_finite() {
            return *self;
        }
        Self {
            overlap: self.overlap / sum,
            lifestyle: self.lifestyle / sum,
            proximity: self.proximity / sum,
            age: self.age / sum,
            personality: self.personality / sum,
        }
    }
}

/// Additive score boosts, in score points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostSettings {
    pub active_last_hour: f64,
    pub active_last_day: f64,
    pub active_last_week: f64,
    pub completion_high: f64,
    pub completion_mid: f64,
    pub verified: f64,
}

impl Default for BoostSettings {
    fn default() -> Self {
        Self {
            active_last_hour: 5.0,
            active_last_day: 3.0,
            active_last_week: 1.0,
            completion_high: 3.0,
            completion_mid: 1.0,
            verified: 2.0,
        }
    }
}
