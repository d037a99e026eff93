// Unit tests for Kindred discovery

use chrono::{Duration, NaiveDate, Utc};
use kindred_discovery::core::{
    compatibility::{pair, Compatibility},
    distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box},
    filters::{hits_deal_breaker, matches_premium_filters, meets_must_have, Criteria},
    scoring::{age_gap_score, apply_boost, calculate_match_score, proximity_score, ScoreContext},
};
use kindred_discovery::models::{
    AttributeValue, BodyType, ChildrenStatus, DealBreaker, DiscoveryFilters, DrinkingHabit,
    EducationLevel, Gender, MustHave, PreferenceSet, Profile, Religion, ScoringWeights,
    SmokingHabit,
};

fn create_test_profile(id: &str) -> Profile {
    Profile {
        id: id.to_string(),
        name: "Test".to_string(),
        bio: None,
        date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 1),
        gender: Some(Gender::Female),
        sexuality: None,
        height_cm: Some(170),
        body_type: Some(BodyType::Athletic),
        current_city: Some("Durban".to_string()),
        current_country: Some("ZA".to_string()),
        latitude: Some(-29.8587),
        longitude: Some(31.0218),
        relationship_type_seeking: None,
        drinking_habit: Some(DrinkingHabit::SocialDrinker),
        smoking_habit: Some(SmokingHabit::Never),
        children_status: Some(ChildrenStatus::WantsChildren),
        religion: Some(Religion::Christianity),
        education_level: Some(EducationLevel::Bachelors),
        personality_type: None,
        interests: vec!["surfing".to_string(), "reading".to_string()],
        hobbies: vec![],
        values: vec![],
        is_verified: true,
        is_photo_verified: false,
        is_video_verified: false,
        is_premium: false,
        is_discoverable: true,
        last_active_at: Some(Utc::now() - Duration::hours(1)),
        created_at: Utc::now() - Duration::days(30),
        profile_completion_percentage: 80,
        preferences: PreferenceSet::default(),
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(-29.8587, 31.0218, -29.8587, 31.0218);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_cape_town_to_stellenbosch() {
    // Roughly 40-50 km
    let distance = haversine_distance(-33.9249, 18.4241, -33.9321, 18.8602);
    assert!(distance > 35.0 && distance < 50.0, "got {}", distance);
}

#[test]
fn test_haversine_is_symmetric() {
    let there = haversine_distance(-33.9249, 18.4241, -26.2041, 28.0473);
    let back = haversine_distance(-26.2041, 28.0473, -33.9249, 18.4241);
    assert!((there - back).abs() < 1e-9);
}

#[test]
fn test_point_within_bbox() {
    let bbox = calculate_bounding_box(-29.8587, 31.0218, 10.0);

    assert!(is_within_bounding_box(-29.8587, 31.0218, &bbox));
    assert!(is_within_bounding_box(-29.85, 31.02, &bbox));
    assert!(!is_within_bounding_box(-26.2, 28.0, &bbox));
    assert!(!is_within_bounding_box(bbox.max_lat + 0.01, 31.0218, &bbox));
}

#[test]
fn test_compatibility_lookups() {
    assert_eq!(SmokingHabit::Never.compatibility(SmokingHabit::Never), Some(1.0));
    assert_eq!(
        DrinkingHabit::Never.compatibility(DrinkingHabit::Heavily),
        DrinkingHabit::Heavily.compatibility(DrinkingHabit::Never)
    );
    assert_eq!(pair(Some(Religion::Atheist), None), None);
    assert_eq!(
        EducationLevel::PreferNotToSay.compatibility(EducationLevel::Masters),
        None
    );
}

#[test]
fn test_deal_breaker_forms() {
    let mut candidate = create_test_profile("c");

    assert!(!hits_deal_breaker(&DealBreaker::Smoking, &candidate));
    candidate.smoking_habit = Some(SmokingHabit::Regularly);
    assert!(hits_deal_breaker(&DealBreaker::Smoking, &candidate));

    let religion = DealBreaker::Attribute(AttributeValue::Religion(Religion::Christianity));
    assert!(hits_deal_breaker(&religion, &candidate));

    candidate.children_status = Some(ChildrenStatus::HasChildren);
    let no_kids: DealBreaker = serde_json::from_str(r#""no_kids""#).unwrap();
    assert!(hits_deal_breaker(&no_kids, &candidate));
}

#[test]
fn test_must_have_unknown_attribute_fails() {
    let requester = create_test_profile("r");
    let mut candidate = create_test_profile("c");

    assert!(meets_must_have(&MustHave::SameReligion, &requester, &candidate));
    candidate.religion = None;
    assert!(!meets_must_have(&MustHave::SameReligion, &requester, &candidate));

    candidate.children_status = None;
    assert!(meets_must_have(&MustHave::NoChildren, &requester, &candidate));
}

#[test]
fn test_premium_height_filter() {
    let mut candidate = create_test_profile("c");
    let filters = DiscoveryFilters {
        min_height_cm: Some(160),
        max_height_cm: Some(175),
        ..Default::default()
    };

    assert!(matches_premium_filters(&candidate, &filters));
    candidate.height_cm = Some(180);
    assert!(!matches_premium_filters(&candidate, &filters));
    candidate.height_cm = None;
    assert!(!matches_premium_filters(&candidate, &filters));
}

#[test]
fn test_criteria_resolution() {
    let mut requester = create_test_profile("r");
    requester.preferences.preferred_genders = vec![Gender::Male];
    let filters = DiscoveryFilters {
        genders: Some(vec![Gender::Female]),
        city: Some("  DURBAN ".to_string()),
        religions: Some(vec![Religion::Islam]),
        ..Default::default()
    };

    let criteria = Criteria::resolve(&requester, Some(&filters)).unwrap();
    assert_eq!(criteria.genders, &[Gender::Female]);
    assert_eq!(criteria.city.as_deref(), Some("durban"));
    assert!(criteria.premium.is_none());

    let candidate = create_test_profile("c");
    assert!(criteria.admits(&candidate, 30, Some(5.0)));
}

#[test]
fn test_match_score_within_valid_range() {
    let requester = create_test_profile("r");
    let candidate = create_test_profile("c");
    let ctx = ScoreContext {
        requester_age: Some(31),
        candidate_age: 29,
        distance_km: Some(12.0),
        radius_km: 50.0,
    };

    let (score, shared) =
        calculate_match_score(&requester, &candidate, &ctx, &ScoringWeights::default());
    assert!((0.0..=100.0).contains(&score));
    assert_eq!(shared, vec!["reading", "surfing"]);
}

#[test]
fn test_closer_candidates_score_higher() {
    assert!(proximity_score(Some(2.0), 50.0) > proximity_score(Some(20.0), 50.0));
    assert!(proximity_score(Some(20.0), 50.0) > proximity_score(Some(45.0), 50.0));
}

#[test]
fn test_age_gap_buckets_monotonic() {
    let scores: Vec<f64> = [30u8, 32, 35, 40, 50]
        .iter()
        .map(|age| age_gap_score(Some(30), *age))
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_boost_capped_at_hundred() {
    assert_eq!(apply_boost(97.5, 10.0), 100.0);
    assert_eq!(apply_boost(100.0, 5.0), 100.0);
}
