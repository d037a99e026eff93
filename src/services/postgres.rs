use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BoundingBox, InteractionKind, PreferenceSet, Profile};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Shape of a candidate pool fetch
///
/// Every cutoff is optional; the row cap is not. Profiles without
/// coordinates always pass the bounding box, the ranker decides what to do
/// with them.
#[derive(Debug, Clone)]
pub struct PoolQuery<'a> {
    pub requester_id: &'a str,
    pub bbox: Option<BoundingBox>,
    pub active_since: Option<DateTime<Utc>>,
    pub created_since: Option<DateTime<Utc>>,
    pub limit: usize,
}

impl<'a> PoolQuery<'a> {
    pub fn new(requester_id: &'a str, limit: usize) -> Self {
        Self {
            requester_id,
            bbox: None,
            active_since: None,
            created_since: None,
            limit,
        }
    }
}

const PROFILE_COLUMNS: &str = r#"
    id, name, bio, date_of_birth, gender, sexuality, height_cm, body_type,
    current_city, current_country, latitude, longitude, relationship_type_seeking,
    drinking_habit, smoking_habit, children_status, religion, education_level,
    personality_type, interests, hobbies, "values", is_verified, is_photo_verified,
    is_video_verified, is_premium, is_discoverable, last_active_at, created_at,
    profile_completion_percentage, preferences
"#;

/// PostgreSQL repository for profiles and the interaction log
///
/// Loads requesters and candidate pools for the ranker and derives the
/// per-request exclusion set from recorded likes, passes and blocks.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Pool that connects on first use; migrations are not run
    pub fn connect_lazy(database_url: &str) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Fetch a single profile by id
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, PostgresError> {
        let query = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("profile {}", user_id)))?;

        Ok(profile_from_row(&row)?)
    }

    /// Fetch discoverable profiles other than the requester
    ///
    /// Most recently active first, capped at `query.limit` rows.
    pub async fn get_candidate_pool(
        &self,
        query: &PoolQuery<'_>,
    ) -> Result<Vec<Profile>, PostgresError> {
        let limit = i64::try_from(query.limit)
            .map_err(|_| PostgresError::InvalidInput(format!("pool size {}", query.limit)))?;

        let sql = format!(
            r#"
            SELECT {}
            FROM profiles
            WHERE is_discoverable
              AND id <> $1
              AND ($2::float8 IS NULL
                   OR latitude IS NULL OR longitude IS NULL
                   OR (latitude BETWEEN $2 AND $3
                       AND CASE WHEN $4::float8 <= $5::float8
                                THEN longitude BETWEEN $4 AND $5
                                ELSE longitude >= $4 OR longitude <= $5
                           END))
              AND ($6::timestamptz IS NULL OR last_active_at >= $6)
              AND ($7::timestamptz IS NULL OR created_at >= $7)
            ORDER BY last_active_at DESC NULLS LAST, id
            LIMIT $8
            "#,
            PROFILE_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(query.requester_id)
            .bind(query.bbox.map(|b| b.min_lat))
            .bind(query.bbox.map(|b| b.max_lat))
            .bind(query.bbox.map(|b| b.min_lon))
            .bind(query.bbox.map(|b| b.max_lon))
            .bind(query.active_since)
            .bind(query.created_since)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let profiles = rows
            .iter()
            .map(profile_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Loaded candidate pool of {} profiles for {}",
            profiles.len(),
            query.requester_id
        );

        Ok(profiles)
    }

    /// Record an interaction
    ///
    /// Uses INSERT ... ON CONFLICT so repeating the same interaction only
    /// refreshes its timestamp. Returns the interaction's id.
    pub async fn record_interaction(
        &self,
        user_id: &str,
        target_user_id: &str,
        kind: InteractionKind,
    ) -> Result<Uuid, PostgresError> {
        if user_id == target_user_id {
            return Err(PostgresError::InvalidInput(
                "cannot interact with own profile".to_string(),
            ));
        }

        let query = r#"
            INSERT INTO interactions (id, user_id, target_user_id, kind, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id, target_user_id, kind)
            DO UPDATE SET created_at = EXCLUDED.created_at
            RETURNING id
        "#;

        let id: Uuid = sqlx::query_scalar(query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(target_user_id)
            .bind(kind)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(
            "Recorded interaction: {} -> {} ({:?})",
            user_id,
            target_user_id,
            kind
        );

        Ok(id)
    }

    /// Profile ids to exclude for `user_id` as of `now`
    ///
    /// Likes, super likes and passes since the start of the current UTC day,
    /// plus blocks in either direction regardless of age.
    pub async fn get_exclusions(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<HashSet<String>, PostgresError> {
        let query = r#"
            SELECT target_user_id AS id
            FROM interactions
            WHERE user_id = $1
              AND kind IN ('liked', 'super_liked', 'passed')
              AND created_at >= $2
            UNION
            SELECT target_user_id AS id
            FROM interactions
            WHERE user_id = $1 AND kind = 'blocked'
            UNION
            SELECT user_id AS id
            FROM interactions
            WHERE target_user_id = $1 AND kind = 'blocked'
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(start_of_day(now))
            .fetch_all(&self.pool)
            .await?;

        let excluded = rows
            .iter()
            .map(|row| row.try_get::<String, _>("id"))
            .collect::<Result<HashSet<_>, _>>()?;

        tracing::debug!("User {} has {} excluded profiles", user_id, excluded.len());

        Ok(excluded)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Midnight UTC at the start of `now`'s day
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

fn profile_from_row(row: &PgRow) -> Result<Profile, sqlx::Error> {
    let height_cm: Option<i16> = row.try_get("height_cm")?;
    let completion: i16 = row.try_get("profile_completion_percentage")?;
    let preferences: Json<PreferenceSet> = row.try_get("preferences")?;

    Ok(Profile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        bio: row.try_get("bio")?,
        date_of_birth: row.try_get("date_of_birth")?,
        gender: row.try_get("gender")?,
        sexuality: row.try_get("sexuality")?,
        height_cm: height_cm.and_then(|h| u16::try_from(h).ok()),
        body_type: row.try_get("body_type")?,
        current_city: row.try_get("current_city")?,
        current_country: row.try_get("current_country")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        relationship_type_seeking: row.try_get("relationship_type_seeking")?,
        drinking_habit: row.try_get("drinking_habit")?,
        smoking_habit: row.try_get("smoking_habit")?,
        children_status: row.try_get("children_status")?,
        religion: row.try_get("religion")?,
        education_level: row.try_get("education_level")?,
        personality_type: row.try_get("personality_type")?,
        interests: row.try_get("interests")?,
        hobbies: row.try_get("hobbies")?,
        values: row.try_get("values")?,
        is_verified: row.try_get("is_verified")?,
        is_photo_verified: row.try_get("is_photo_verified")?,
        is_video_verified: row.try_get("is_video_verified")?,
        is_premium: row.try_get("is_premium")?,
        is_discoverable: row.try_get("is_discoverable")?,
        last_active_at: row.try_get("last_active_at")?,
        created_at: row.try_get("created_at")?,
        profile_completion_percentage: completion.clamp(0, 100) as u8,
        preferences: preferences.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_start_of_day() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 15, 42, 9).unwrap();
        assert_eq!(
            start_of_day(now),
            Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_pool_query_defaults() {
        let query = PoolQuery::new("user123", 500);
        assert_eq!(query.requester_id, "user123");
        assert!(query.bbox.is_none());
        assert!(query.active_since.is_none());
        assert_eq!(query.limit, 500);
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL at DATABASE_URL"]
    async fn test_candidate_pool_across_antimeridian() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let client = PostgresClient::from_settings(&url, Some(2), Some(1), None, None)
            .await
            .expect("Failed to connect");

        for (id, lon) in [("am-east", 179.90), ("am-west", -179.95), ("am-far", 175.0)] {
            sqlx::query(
                "INSERT INTO profiles (id, name, latitude, longitude) VALUES ($1, $1, -17.7, $2)
                 ON CONFLICT (id) DO UPDATE SET longitude = EXCLUDED.longitude",
            )
            .bind(id)
            .bind(lon)
            .execute(&client.pool)
            .await
            .unwrap();
        }

        let mut query = PoolQuery::new("am-requester", 1000);
        query.bbox = Some(crate::core::calculate_bounding_box(-17.7, 179.95, 50.0));
        let ids: HashSet<String> = client
            .get_candidate_pool(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert!(ids.contains("am-east"));
        assert!(ids.contains("am-west"));
        assert!(!ids.contains("am-far"));
    }

    #[test]
    fn test_interaction_kind_debug() {
        assert_eq!(format!("{:?}", InteractionKind::SuperLiked), "SuperLiked");
    }
}
