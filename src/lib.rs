//! Kindred Discovery - match candidate ranking for the Kindred dating app
//!
//! The core is a pure filter, score and rank pipeline ([`Ranker`]) with the
//! discovery modes built on top of it. The service layer loads pools and
//! exclusion sets from PostgreSQL, caches daily matches, and serves them
//! over HTTP.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    distance::{calculate_bounding_box, haversine_distance},
    Clock, FixedClock, RankError, RankOrder, Ranker, SystemClock,
};
pub use models::{
    DiscoveryFilters, MustHavePolicy, PreferenceSet, Profile, RankedCandidate, ScoringWeights,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let bbox = calculate_bounding_box(-26.2041, 28.0473, 10.0);
        assert!(bbox.min_lat < -26.2041);
        assert!(haversine_distance(0.0, 0.0, 0.0, 0.0) < f64::EPSILON);
    }
}
