// Model exports
pub mod domain;
pub mod enums;
pub mod filters;
pub mod requests;
pub mod responses;

pub use domain::{
    AttributeValue, BoostSettings, BoundingBox, DealBreaker, InteractionKind,
    MustHave, MustHavePolicy, PreferenceSet, Profile, RankedCandidate, ScoringWeights,
};
pub use enums::{
    BodyType, ChildrenStatus, DrinkingHabit, EducationLevel, Gender, PersonalityType,
    RelationshipType, Religion, Sexuality, SmokingHabit,
};
pub use filters::DiscoveryFilters;
pub use requests::{
    BrowseRequest, DailyMatchesQuery, NearbyQuery, NewProfilesQuery, RandomQuery,
    RecentlyActiveQuery, RecordInteractionRequest, UserQuery,
};
pub use responses::{
    CandidateResponse, DailyMatchesResponse, DiscoveryResponse, ErrorResponse,
    ExclusionsResponse, HealthResponse, RecordInteractionResponse,
};
