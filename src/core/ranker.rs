use std::cmp::Ordering;
use std::collections::HashSet;

use crate::core::{
    clock::{Clock, SystemClock},
    distance::profile_distance,
    error::RankError,
    filters::Criteria,
    scoring::{apply_boost, calculate_match_score, quality_boost, ScoreContext},
};
use crate::models::{
    BoostSettings, DiscoveryFilters, MustHavePolicy, Profile, RankedCandidate, ScoringWeights,
};

/// Radius the proximity score decays over when the requester set no maximum distance
pub const DEFAULT_PROXIMITY_RADIUS_KM: f64 = 100.0;

/// Points subtracted from candidates missing a must-have under the lenient policy.
/// Equal to the top of the score range, so a penalized score is never above an
/// unpenalized one.
pub const MUST_HAVE_PENALTY: f64 = 100.0;

/// Upper bound (exclusive) of the seeded per-day boost used by daily matches
pub const DEFAULT_DAILY_JITTER: f64 = 2.0;

/// Sort order applied to surviving candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Score descending, then recency, completion and id
    Score,
    /// Distance ascending (unknown last), then the `Score` order
    Distance,
}

/// Match candidate ranker - implements the filter, score and rank pipeline
///
/// # Pipeline Stages
/// 1. Hard filter: exclusions, self, age, gender, relationship type,
///    distance, deal-breakers, verification, premium filters, must-haves
///    (strict policy)
/// 2. Compatibility scoring plus additive quality boosts
/// 3. Deterministic ordering and truncation
///
/// The ranker is pure: it reads its inputs and the clock, and writes nothing.
#[derive(Debug, Clone)]
pub struct Ranker<C = SystemClock> {
    weights: ScoringWeights,
    boosts: BoostSettings,
    must_have_policy: MustHavePolicy,
    default_radius_km: f64,
    daily_jitter: f64,
    clock: C,
}

impl Ranker<SystemClock> {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            boosts: BoostSettings::default(),
            must_have_policy: MustHavePolicy::default(),
            default_radius_km: DEFAULT_PROXIMITY_RADIUS_KM,
            daily_jitter: DEFAULT_DAILY_JITTER,
            clock: SystemClock,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default())
    }
}

impl Default for Ranker<SystemClock> {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

impl<C: Clock> Ranker<C> {
    /// Replace the time source
    pub fn with_clock<D: Clock>(self, clock: D) -> Ranker<D> {
        Ranker {
            weights: self.weights,
            boosts: self.boosts,
            must_have_policy: self.must_have_policy,
            default_radius_km: self.default_radius_km,
            daily_jitter: self.daily_jitter,
            clock,
        }
    }

    pub fn with_boosts(mut self, boosts: BoostSettings) -> Self {
        self.boosts = boosts;
        self
    }

    pub fn with_must_have_policy(mut self, policy: MustHavePolicy) -> Self {
        self.must_have_policy = policy;
        self
    }

    pub fn with_default_radius_km(mut self, radius_km: f64) -> Self {
        self.default_radius_km = radius_km;
        self
    }

    pub fn with_daily_jitter(mut self, jitter: f64) -> Self {
        self.daily_jitter = jitter.max(0.0);
        self
    }

    pub fn daily_jitter(&self) -> f64 {
        self.daily_jitter
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn must_have_policy(&self) -> MustHavePolicy {
        self.must_have_policy
    }

    /// Rank candidates for a requester
    ///
    /// # Arguments
    /// * `requester` - The requesting profile, with its preference set
    /// * `candidate_pool` - Eligible profiles fetched by the caller; may be empty
    /// * `exclusions` - Profile ids to always drop
    /// * `filters` - Optional overrides of the stored preferences
    /// * `limit` - Maximum number of results; must be at least 1
    ///
    /// # Returns
    /// At most `limit` candidates, best first. An empty pool, or one where
    /// nothing survives filtering, yields an empty vector.
    pub fn rank<'a>(
        &self,
        requester: &Profile,
        candidate_pool: &'a [Profile],
        exclusions: &HashSet<String>,
        filters: Option<&DiscoveryFilters>,
        limit: usize,
    ) -> Result<Vec<RankedCandidate<'a>>, RankError> {
        if limit == 0 {
            return Err(RankError::InvalidArgument(
                "limit must be at least 1".to_string(),
            ));
        }

        let mut ranked = self.evaluate(requester, candidate_pool, exclusions, filters, |_| 0.0)?;
        sort_candidates(&mut ranked, RankOrder::Score);
        ranked.truncate(limit);

        Ok(ranked)
    }

    /// Filter and score every candidate without ordering or truncating
    ///
    /// `extra_boost` adds mode-specific, non-negative points to each
    /// survivor's score before the must-have penalty; the daily rotation uses it.
    pub fn evaluate<'a, I, F>(
        &self,
        requester: &Profile,
        candidate_pool: I,
        exclusions: &HashSet<String>,
        filters: Option<&DiscoveryFilters>,
        extra_boost: F,
    ) -> Result<Vec<RankedCandidate<'a>>, RankError>
    where
        I: IntoIterator<Item = &'a Profile>,
        F: Fn(&Profile) -> f64,
    {
        let criteria = Criteria::resolve(requester, filters)?;

        let now = self.clock.now();
        let today = now.date_naive();
        let requester_age = requester.age_on(today);
        let radius_km = criteria.max_distance_km.unwrap_or(self.default_radius_km);
        let weights = requester
            .preferences
            .match_weights
            .map(|w| w.normalized())
            .unwrap_or(self.weights);

        let mut ranked = Vec::new();
        let mut examined = 0usize;

        for candidate in candidate_pool {
            examined += 1;

            if candidate.id == requester.id
                || exclusions.contains(&candidate.id)
                || !candidate.is_discoverable
            {
                continue;
            }

            // Age must be known to prove it lies in range
            let Some(age) = candidate.age_on(today) else {
                continue;
            };

            let distance_km = profile_distance(requester, candidate);
            if !criteria.admits(candidate, age, distance_km) {
                continue;
            }

            let must_haves_met = criteria.must_haves_met(requester, candidate);
            if !must_haves_met && self.must_have_policy == MustHavePolicy::Strict {
                continue;
            }

            let ctx = ScoreContext {
                requester_age,
                candidate_age: age,
                distance_km,
                radius_km,
            };
            let (base, shared_interests) =
                calculate_match_score(requester, candidate, &ctx, &weights);
            let boost = quality_boost(candidate, now, &self.boosts) + extra_boost(candidate).max(0.0);
            let mut score = apply_boost(base, boost);
            if !must_haves_met {
                score -= MUST_HAVE_PENALTY;
            }

            ranked.push(RankedCandidate {
                profile: candidate,
                score,
                distance_km,
                must_haves_met,
                shared_interests,
            });
        }

        tracing::debug!(
            "Ranker kept {} of {} candidates for {}",
            ranked.len(),
            examined,
            requester.id
        );

        Ok(ranked)
    }
}

/// Sort ranked candidates into a total, deterministic order
pub fn sort_candidates(candidates: &mut [RankedCandidate<'_>], order: RankOrder) {
    candidates.sort_by(|a, b| match order {
        RankOrder::Score => compare_by_score(a, b),
        RankOrder::Distance => compare_distance(a.distance_km, b.distance_km)
            .then_with(|| compare_by_score(a, b)),
    });
}

fn compare_by_score(a: &RankedCandidate<'_>, b: &RankedCandidate<'_>) -> Ordering {
    b.must_haves_met
        .cmp(&a.must_haves_met)
        .then_with(|| b.score.total_cmp(&a.score))
        // `None` sorts before `Some`, so reversing puts unknown activity last
        .then_with(|| b.profile.last_active_at.cmp(&a.profile.last_active_at))
        .then_with(|| {
            b.profile
                .profile_completion_percentage
                .cmp(&a.profile.profile_completion_percentage)
        })
        .then_with(|| a.profile.id.cmp(&b.profile.id))
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
