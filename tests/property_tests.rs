// Property tests for the ranker's universal guarantees

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use kindred_discovery::core::{distance::haversine_distance, FixedClock, Ranker};
use kindred_discovery::models::{
    DiscoveryFilters, Gender, MustHave, MustHavePolicy, PreferenceSet, Profile, RelationshipType,
    SmokingHabit,
};
use proptest::prelude::*;
use std::collections::HashSet;

const ORIGIN: (f64, f64) = (-33.9249, 18.4241);

const INTERESTS: [&str; 6] = ["hiking", "jazz", "cooking", "surfing", "chess", "yoga"];

const SMOKING: [SmokingHabit; 5] = [
    SmokingHabit::Never,
    SmokingHabit::Occasionally,
    SmokingHabit::Regularly,
    SmokingHabit::Quit,
    SmokingHabit::PreferNotToSay,
];

const RELATIONSHIPS: [RelationshipType; 4] = [
    RelationshipType::CasualDating,
    RelationshipType::SeriousRelationship,
    RelationshipType::Marriage,
    RelationshipType::Friendship,
];

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 18, 0, 0).unwrap()
}

#[derive(Debug, Clone)]
struct CandidateSeed {
    age: i32,
    offset: Option<(f64, f64)>,
    interests: Vec<usize>,
    smoking: usize,
    male: bool,
    active_hours_ago: Option<i64>,
    completion: u8,
    verified: bool,
    relationship: Option<usize>,
    excluded: bool,
}

fn candidate_seed() -> impl Strategy<Value = CandidateSeed> {
    (
        18i32..70,
        proptest::option::of((-2.0f64..2.0, -2.0f64..2.0)),
        proptest::collection::vec(0usize..INTERESTS.len(), 0..4),
        0usize..SMOKING.len(),
        any::<bool>(),
        proptest::option::of(0i64..400),
        0u8..=100,
        any::<bool>(),
        proptest::option::of(0usize..RELATIONSHIPS.len()),
        prop::bool::weighted(0.2),
    )
        .prop_map(
            |(age, offset, interests, smoking, male, active_hours_ago, completion, verified, relationship, excluded)| {
                CandidateSeed {
                    age,
                    offset,
                    interests,
                    smoking,
                    male,
                    active_hours_ago,
                    completion,
                    verified,
                    relationship,
                    excluded,
                }
            },
        )
}

fn build_profile(id: String, seed: &CandidateSeed) -> Profile {
    Profile {
        id,
        name: "Candidate".to_string(),
        bio: None,
        date_of_birth: NaiveDate::from_ymd_opt(now().year() - seed.age, 1, 1),
        gender: Some(if seed.male { Gender::Male } else { Gender::Female }),
        sexuality: None,
        height_cm: None,
        body_type: None,
        current_city: None,
        current_country: None,
        latitude: seed.offset.map(|(dlat, _)| ORIGIN.0 + dlat),
        longitude: seed.offset.map(|(_, dlon)| ORIGIN.1 + dlon),
        relationship_type_seeking: seed.relationship.map(|i| RELATIONSHIPS[i]),
        drinking_habit: None,
        smoking_habit: Some(SMOKING[seed.smoking]),
        children_status: None,
        religion: None,
        education_level: None,
        personality_type: None,
        interests: seed.interests.iter().map(|i| INTERESTS[*i].to_string()).collect(),
        hobbies: vec![],
        values: vec![],
        is_verified: seed.verified,
        is_photo_verified: false,
        is_video_verified: false,
        is_premium: false,
        is_discoverable: true,
        last_active_at: seed.active_hours_ago.map(|h| now() - Duration::hours(h)),
        created_at: now() - Duration::days(90),
        profile_completion_percentage: seed.completion,
        preferences: PreferenceSet::default(),
    }
}

fn requester(min_age: u8, span: u8, max_distance_km: f64, must_haves: Vec<MustHave>) -> Profile {
    let seed = CandidateSeed {
        age: 32,
        offset: Some((0.0, 0.0)),
        interests: vec![0, 1, 2],
        smoking: 0,
        male: true,
        active_hours_ago: Some(0),
        completion: 100,
        verified: true,
        relationship: None,
        excluded: false,
    };
    let mut me = build_profile("me".to_string(), &seed);
    me.preferences = PreferenceSet {
        min_age,
        max_age: min_age.saturating_add(span).min(100),
        preferred_genders: vec![Gender::Female],
        max_distance_km: Some(max_distance_km),
        must_haves,
        ..Default::default()
    };
    me
}

fn build_pool(seeds: &[CandidateSeed]) -> (Vec<Profile>, HashSet<String>) {
    let pool: Vec<Profile> = seeds
        .iter()
        .enumerate()
        .map(|(i, s)| build_profile(format!("c{:03}", i), s))
        .collect();
    let exclusions = seeds
        .iter()
        .enumerate()
        .filter(|(_, s)| s.excluded)
        .map(|(i, _)| format!("c{:03}", i))
        .collect();
    (pool, exclusions)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256, ..ProptestConfig::default()
    })]

    #[test]
    fn ranked_output_respects_hard_filters(
        seeds in proptest::collection::vec(candidate_seed(), 0..40),
        min_age in 18u8..50,
        span in 0u8..30,
        max_distance_km in 5.0f64..250.0,
        limit in 1usize..30,
    ) {
        let me = requester(min_age, span, max_distance_km, vec![]);
        let (pool, exclusions) = build_pool(&seeds);
        let ranker = Ranker::with_default_weights().with_clock(FixedClock(now()));

        let ranked = ranker.rank(&me, &pool, &exclusions, None, limit).unwrap();
        let today = now().date_naive();

        prop_assert!(ranked.len() <= limit);
        for r in &ranked {
            prop_assert!(r.profile.id != me.id);
            prop_assert!(!exclusions.contains(&r.profile.id), "{} is excluded", r.profile.id);

            let age = r.profile.age_on(today).unwrap();
            prop_assert!(age >= me.preferences.min_age && age <= me.preferences.max_age);
            prop_assert_eq!(r.profile.gender, Some(Gender::Female));

            if let Some((lat, lon)) = r.profile.location() {
                let d = haversine_distance(ORIGIN.0, ORIGIN.1, lat, lon);
                prop_assert!(d <= max_distance_km, "{} km > {} km", d, max_distance_km);
            }
            prop_assert!((0.0..=100.0).contains(&r.score));
        }
    }

    #[test]
    fn ranked_output_is_ordered_and_reproducible(
        seeds in proptest::collection::vec(candidate_seed(), 0..40),
        limit in 1usize..30,
    ) {
        let me = requester(18, 82, 250.0, vec![]);
        let (pool, exclusions) = build_pool(&seeds);
        let ranker = Ranker::with_default_weights().with_clock(FixedClock(now()));

        let first = ranker.rank(&me, &pool, &exclusions, None, limit).unwrap();
        let second = ranker.rank(&me, &pool, &exclusions, None, limit).unwrap();
        prop_assert_eq!(&first, &second);

        for pair in first.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                match (pair[0].profile.last_active_at, pair[1].profile.last_active_at) {
                    (Some(a), Some(b)) => prop_assert!(a >= b),
                    (None, Some(_)) => prop_assert!(false, "unknown activity sorted first"),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn lenient_policy_ranks_violators_last(
        seeds in proptest::collection::vec(candidate_seed(), 0..40),
    ) {
        let me = requester(18, 82, 250.0, vec![MustHave::NonSmoker]);
        let (pool, exclusions) = build_pool(&seeds);
        let strict = Ranker::with_default_weights().with_clock(FixedClock(now()));
        let lenient = strict.clone().with_must_have_policy(MustHavePolicy::Lenient);

        let strict_ranked = strict.rank(&me, &pool, &exclusions, None, 100).unwrap();
        prop_assert!(strict_ranked.iter().all(|r| r.must_haves_met));

        let lenient_ranked = lenient.rank(&me, &pool, &exclusions, None, 100).unwrap();
        let met = lenient_ranked.iter().take_while(|r| r.must_haves_met).count();
        prop_assert_eq!(met, strict_ranked.len());
        prop_assert!(lenient_ranked[met..].iter().all(|r| !r.must_haves_met));
        for pair in lenient_ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn browse_honors_verified_and_relationship_filters(
        seeds in proptest::collection::vec(candidate_seed(), 0..40),
        accepted in proptest::collection::vec(0usize..RELATIONSHIPS.len(), 0..3),
        verified_only in any::<bool>(),
    ) {
        let me = requester(18, 82, 250.0, vec![]);
        let (pool, exclusions) = build_pool(&seeds);
        let ranker = Ranker::with_default_weights().with_clock(FixedClock(now()));
        let accepted: Vec<RelationshipType> = accepted.iter().map(|i| RELATIONSHIPS[*i]).collect();
        let filters = DiscoveryFilters {
            relationship_types: Some(accepted.clone()),
            verified_only,
            ..Default::default()
        };

        let page = ranker.browse(&me, &pool, &exclusions, &filters, 0, 100).unwrap();

        for r in &page.candidates {
            if verified_only {
                prop_assert!(r.profile.verified());
            }
            if !accepted.is_empty() {
                prop_assert!(
                    r.profile.relationship_type_seeking.is_some_and(|t| accepted.contains(&t)),
                    "{:?} not in {:?}", r.profile.relationship_type_seeking, accepted
                );
            }
        }

        // Nothing admissible is dropped when neither filter constrains
        if !verified_only && accepted.is_empty() {
            let unfiltered = ranker.rank(&me, &pool, &exclusions, None, 100).unwrap();
            prop_assert_eq!(page.total, unfiltered.len());
        }
    }
}
