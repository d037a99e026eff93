// Core algorithm exports
pub mod clock;
pub mod compatibility;
pub mod discovery;
pub mod distance;
pub mod error;
pub mod filters;
pub mod ranker;
pub mod scoring;

pub use clock::{Clock, FixedClock, SystemClock};
pub use discovery::{DailyMatches, Page};
pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use error::{validate_limit, RankError};
pub use filters::Criteria;
pub use ranker::{sort_candidates, RankOrder, Ranker};
pub use scoring::calculate_match_score;
