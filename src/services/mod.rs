// Service exports
pub mod cache;
pub mod postgres;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use postgres::{PoolQuery, PostgresClient, PostgresError};
