//! Discovery modes built on the ranker.
//!
//! Each mode validates its own parameters, narrows the pool, and then runs
//! the same filter and score pipeline as [`Ranker::rank`]. Only the pool
//! construction and the final ordering differ.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::{Rng, SeedableRng};

use crate::core::{
    clock::Clock,
    distance::{calculate_bounding_box, is_within_bounding_box, profile_distance},
    error::RankError,
    ranker::{sort_candidates, RankOrder, Ranker},
};
use crate::models::{DiscoveryFilters, Profile, RankedCandidate};

/// Window the daily match count is clamped to
pub const DAILY_LIMIT_RANGE: RangeInclusive<usize> = 10..=20;

/// Largest accepted nearby radius in kilometers
pub const MAX_NEARBY_RADIUS_KM: f64 = 500.0;

pub const RECENTLY_ACTIVE_HOURS: RangeInclusive<i64> = 1..=168;
pub const NEW_PROFILE_DAYS: RangeInclusive<i64> = 1..=30;
pub const MAX_RANDOM_LIMIT: usize = 50;

/// One page of ranked candidates plus the number that survived filtering
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub candidates: Vec<RankedCandidate<'a>>,
    pub total: usize,
}

/// Today's matches and the instant they rotate
#[derive(Debug, Clone)]
pub struct DailyMatches<'a> {
    pub candidates: Vec<RankedCandidate<'a>>,
    pub refreshes_at: DateTime<Utc>,
}

impl<C: Clock> Ranker<C> {
    /// Browse with explicit filters, paginated by `skip`/`limit`
    pub fn browse<'a>(
        &self,
        requester: &Profile,
        candidate_pool: &'a [Profile],
        exclusions: &HashSet<String>,
        filters: &DiscoveryFilters,
        skip: usize,
        limit: usize,
    ) -> Result<Page<'a>, RankError> {
        require_limit(limit)?;

        let mut ranked = self.evaluate(requester, candidate_pool, exclusions, Some(filters), |_| 0.0)?;
        sort_candidates(&mut ranked, RankOrder::Score);

        Ok(paginate(ranked, skip, limit))
    }

    /// Today's curated matches
    ///
    /// The limit is clamped into [`DAILY_LIMIT_RANGE`]. `exclusions` must hold
    /// today's likes and passes plus blocks. Each candidate gets a freshness
    /// boost seeded by (requester, UTC date, candidate), so repeated calls on
    /// the same day agree and the order rotates at midnight UTC.
    pub fn daily_matches<'a>(
        &self,
        requester: &Profile,
        candidate_pool: &'a [Profile],
        exclusions: &HashSet<String>,
        limit: usize,
    ) -> Result<DailyMatches<'a>, RankError> {
        require_limit(limit)?;
        let limit = limit.clamp(*DAILY_LIMIT_RANGE.start(), *DAILY_LIMIT_RANGE.end());

        let now = self.clock().now();
        let today = now.date_naive();
        let jitter = self.daily_jitter();

        let mut ranked = self.evaluate(requester, candidate_pool, exclusions, None, |candidate| {
            daily_boost(&requester.id, today, &candidate.id, jitter)
        })?;
        sort_candidates(&mut ranked, RankOrder::Score);
        ranked.truncate(limit);

        Ok(DailyMatches {
            candidates: ranked,
            refreshes_at: next_midnight(now),
        })
    }

    /// Candidates within `radius_km`, closest first
    pub fn nearby<'a>(
        &self,
        requester: &Profile,
        candidate_pool: &'a [Profile],
        exclusions: &HashSet<String>,
        radius_km: f64,
        skip: usize,
        limit: usize,
    ) -> Result<Page<'a>, RankError> {
        require_limit(limit)?;
        check_radius(radius_km)?;
        let Some((lat, lon)) = requester.location() else {
            return Err(RankError::InvalidArgument(
                "nearby discovery requires the requester's location".to_string(),
            ));
        };

        let bbox = calculate_bounding_box(lat, lon, radius_km);
        let in_radius = candidate_pool.iter().filter(|c| {
            c.location()
                .is_some_and(|(clat, clon)| is_within_bounding_box(clat, clon, &bbox))
                && profile_distance(requester, c).is_some_and(|d| d <= radius_km)
        });
        let filters = DiscoveryFilters {
            max_distance_km: Some(radius_km),
            ..Default::default()
        };

        let mut ranked = self.evaluate(requester, in_radius, exclusions, Some(&filters), |_| 0.0)?;
        sort_candidates(&mut ranked, RankOrder::Distance);

        Ok(paginate(ranked, skip, limit))
    }

    /// Candidates active within the last `hours`
    pub fn recently_active<'a>(
        &self,
        requester: &Profile,
        candidate_pool: &'a [Profile],
        exclusions: &HashSet<String>,
        hours: i64,
        skip: usize,
        limit: usize,
    ) -> Result<Page<'a>, RankError> {
        require_limit(limit)?;
        check_window("hours", hours, &RECENTLY_ACTIVE_HOURS)?;

        let cutoff = self.clock().now() - Duration::hours(hours);
        let active = candidate_pool
            .iter()
            .filter(|c| c.last_active_at.is_some_and(|t| t >= cutoff));

        let mut ranked = self.evaluate(requester, active, exclusions, None, |_| 0.0)?;
        sort_candidates(&mut ranked, RankOrder::Score);

        Ok(paginate(ranked, skip, limit))
    }

    /// Candidates who joined within the last `days`
    pub fn new_profiles<'a>(
        &self,
        requester: &Profile,
        candidate_pool: &'a [Profile],
        exclusions: &HashSet<String>,
        days: i64,
        skip: usize,
        limit: usize,
    ) -> Result<Page<'a>, RankError> {
        require_limit(limit)?;
        check_window("days", days, &NEW_PROFILE_DAYS)?;

        let cutoff = self.clock().now() - Duration::days(days);
        let fresh = candidate_pool.iter().filter(|c| c.created_at >= cutoff);

        let mut ranked = self.evaluate(requester, fresh, exclusions, None, |_| 0.0)?;
        sort_candidates(&mut ranked, RankOrder::Score);

        Ok(paginate(ranked, skip, limit))
    }

    /// Uniform sample of the filtered candidates, without replacement
    ///
    /// Not deterministic. Reservoir sampling keeps a single pass over the
    /// survivors, but the caller still bounds the pool it loads.
    pub fn random<'a, R>(
        &self,
        requester: &Profile,
        candidate_pool: &'a [Profile],
        exclusions: &HashSet<String>,
        limit: usize,
        rng: &mut R,
    ) -> Result<Vec<RankedCandidate<'a>>, RankError>
    where
        R: Rng + ?Sized,
    {
        require_limit(limit)?;
        check_random_limit(limit)?;

        let survivors = self.evaluate(requester, candidate_pool, exclusions, None, |_| 0.0)?;
        let mut sample = survivors.into_iter().choose_multiple(rng, limit);
        sample.shuffle(rng);

        Ok(sample)
    }
}

fn require_limit(limit: usize) -> Result<(), RankError> {
    if limit == 0 {
        return Err(RankError::InvalidArgument(
            "limit must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Nearby radius must lie in (0, [`MAX_NEARBY_RADIUS_KM`]]
pub fn check_radius(radius_km: f64) -> Result<(), RankError> {
    if !radius_km.is_finite() || radius_km <= 0.0 || radius_km > MAX_NEARBY_RADIUS_KM {
        return Err(RankError::InvalidArgument(format!(
            "radius must be in (0, {}] km, got {}",
            MAX_NEARBY_RADIUS_KM, radius_km
        )));
    }
    Ok(())
}

pub fn check_random_limit(limit: usize) -> Result<(), RankError> {
    if limit > MAX_RANDOM_LIMIT {
        return Err(RankError::InvalidArgument(format!(
            "random discovery returns at most {} profiles, got {}",
            MAX_RANDOM_LIMIT, limit
        )));
    }
    Ok(())
}

/// Time window parameter must lie in `range`
pub fn check_window(name: &str, value: i64, range: &RangeInclusive<i64>) -> Result<(), RankError> {
    if !range.contains(&value) {
        return Err(RankError::InvalidArgument(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )));
    }
    Ok(())
}

fn paginate(ranked: Vec<RankedCandidate<'_>>, skip: usize, limit: usize) -> Page<'_> {
    let total = ranked.len();
    let candidates = ranked.into_iter().skip(skip).take(limit).collect();
    Page { candidates, total }
}

/// Seeded freshness boost in `[0, jitter)`
pub fn daily_boost(requester_id: &str, day: NaiveDate, candidate_id: &str, jitter: f64) -> f64 {
    if jitter <= 0.0 {
        return 0.0;
    }

    let mut hasher = blake3::Hasher::new();
    hasher.update(requester_id.as_bytes());
    hasher.update(&[0]);
    hasher.update(day.to_string().as_bytes());
    hasher.update(&[0]);
    hasher.update(candidate_id.as_bytes());

    let mut rng = StdRng::from_seed(*hasher.finalize().as_bytes());
    rng.gen_range(0.0..jitter)
}

/// Start of the next UTC day
pub fn next_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now + Duration::days(1))
}
