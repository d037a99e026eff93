use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::core::compatibility::pair;
use crate::models::{BoostSettings, Profile, ScoringWeights};

/// Sub-score used when a signal is unknown on either side
const NEUTRAL: f64 = 0.5;

/// Overlap sub-score when either side left a list empty
const EMPTY_LIST_OVERLAP: f64 = 0.3;

/// How far `last_active_at` may run ahead of the clock and still earn a boost
const CLOCK_SKEW_MINUTES: i64 = 5;

/// Per-candidate inputs already derived by the hard-filter stage
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext {
    pub requester_age: Option<u8>,
    pub candidate_age: u8,
    pub distance_km: Option<f64>,
    /// Radius the proximity score decays over
    pub radius_km: f64,
}

/// Calculate the base compatibility score (0-100) of a candidate
///
/// score = 100 * (
///     overlap * 0.35 +       # shared interests, hobbies, values
///     lifestyle * 0.25 +     # drinking/smoking/children/religion/education tables
///     proximity * 0.20 +     # closer = higher, neutral when unknown
///     age * 0.15 +           # smaller age gap = higher
///     personality * 0.05
/// )
///
/// Returns the score together with the shared interests and hobbies.
pub fn calculate_match_score(
    requester: &Profile,
    candidate: &Profile,
    ctx: &ScoreContext,
    weights: &ScoringWeights,
) -> (f64, Vec<String>) {
    let (overlap, shared) = overlap_score(requester, candidate);
    let lifestyle = lifestyle_score(requester, candidate);
    let proximity = proximity_score(ctx.distance_km, ctx.radius_km);
    let age = age_gap_score(ctx.requester_age, ctx.candidate_age);
    let personality = personality_score(requester, candidate);

    let total = (overlap * weights.overlap
        + lifestyle * weights.lifestyle
        + proximity * weights.proximity
        + age * weights.age
        + personality * weights.personality)
        * 100.0;

    (total.clamp(0.0, 100.0), shared)
}

/// Non-negative boost for recent activity, completeness and verification
pub fn quality_boost(candidate: &Profile, now: DateTime<Utc>, boosts: &BoostSettings) -> f64 {
    let mut boost = 0.0;

    if let Some(last_active) = candidate.last_active_at {
        let minutes = (now - last_active).num_minutes();
        // Small skew ahead of the clock counts as active now; further ahead is bogus
        let hours = if minutes < -CLOCK_SKEW_MINUTES {
            f64::INFINITY
        } else {
            minutes.max(0) as f64 / 60.0
        };
        if hours < 1.0 {
            boost += boosts.active_last_hour;
        } else if hours < 24.0 {
            boost += boosts.active_last_day;
        } else if hours < 168.0 {
            boost += boosts.active_last_week;
        }
    }

    if candidate.profile_completion_percentage >= 90 {
        boost += boosts.completion_high;
    } else if candidate.profile_completion_percentage >= 70 {
        boost += boosts.completion_mid;
    }

    if candidate.verified() {
        boost += boosts.verified;
    }

    boost.max(0.0)
}

/// Add boosts to a base score without exceeding 100 or dropping below the base
#[inline]
pub fn apply_boost(base: f64, boost: f64) -> f64 {
    (base + boost.max(0.0)).min(100.0).max(base)
}

/// Jaccard similarity of two lists, case-insensitive
fn jaccard(a: &[String], b: &[String]) -> (f64, BTreeSet<String>) {
    if a.is_empty() || b.is_empty() {
        return (EMPTY_LIST_OVERLAP, BTreeSet::new());
    }

    let left: BTreeSet<String> = a.iter().map(|s| s.trim().to_lowercase()).collect();
    let right: BTreeSet<String> = b.iter().map(|s| s.trim().to_lowercase()).collect();

    let shared: BTreeSet<String> = left.intersection(&right).cloned().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return (0.0, shared);
    }

    (shared.len() as f64 / union as f64, shared)
}

/// Mean overlap of interests, hobbies and values (0-1)
fn overlap_score(requester: &Profile, candidate: &Profile) -> (f64, Vec<String>) {
    let (interests, mut shared) = jaccard(&requester.interests, &candidate.interests);
    let (hobbies, shared_hobbies) = jaccard(&requester.hobbies, &candidate.hobbies);
    let (values, _) = jaccard(&requester.values, &candidate.values);

    shared.extend(shared_hobbies);

    ((interests + hobbies + values) / 3.0, shared.into_iter().collect())
}

/// Mean of the known pairwise lifestyle compatibilities (0-1)
fn lifestyle_score(requester: &Profile, candidate: &Profile) -> f64 {
    let known: Vec<f64> = [
        pair(requester.drinking_habit, candidate.drinking_habit),
        pair(requester.smoking_habit, candidate.smoking_habit),
        pair(requester.children_status, candidate.children_status),
        pair(requester.religion, candidate.religion),
        pair(requester.education_level, candidate.education_level),
    ]
    .into_iter()
    .flatten()
    .collect();

    if known.is_empty() {
        return NEUTRAL;
    }

    known.iter().sum::<f64>() / known.len() as f64
}

/// Proximity score (0-1)
/// Closer distance = higher score, exponentially decaying, zero at the radius
#[inline]
pub fn proximity_score(distance_km: Option<f64>, radius_km: f64) -> f64 {
    let Some(distance) = distance_km else {
        return NEUTRAL;
    };
    if radius_km <= 0.0 || distance >= radius_km {
        return 0.0;
    }

    (-distance / (radius_km * 0.5)).exp()
}

/// Age-gap score (0-1); neutral when the requester's age is unknown
#[inline]
pub fn age_gap_score(requester_age: Option<u8>, candidate_age: u8) -> f64 {
    let Some(requester_age) = requester_age else {
        return NEUTRAL;
    };

    match requester_age.abs_diff(candidate_age) {
        0 => 1.0,
        1..=2 => 0.9,
        3..=5 => 0.7,
        6..=10 => 0.5,
        _ => 0.3,
    }
}

#[inline]
fn personality_score(requester: &Profile, candidate: &Profile) -> f64 {
    match (requester.personality_type, candidate.personality_type) {
        (Some(a), Some(b)) if a == b => 0.8,
        (Some(_), Some(_)) => 0.6,
        _ => NEUTRAL,
    }
}
