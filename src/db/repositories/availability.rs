use crate::entities::{availability_cache, prelude::*};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};

pub struct AvailabilityCacheRepository {
    conn: DatabaseConnection,
}

impl AvailabilityCacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, cache_key: &str) -> Result<Option<availability_cache::Model>> {
        let row = AvailabilityCache::find_by_id(cache_key.to_string())
            .one(&self.conn)
            .await?;
        Ok(row)
    }

    /// Inserts the entry, or overwrites payload and timestamp when the key
    /// already exists. `movie_id` is only set on first insert.
    pub async fn upsert(
        &self,
        cache_key: &str,
        movie_id: Option<i64>,
        payload_json: String,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let active_model = availability_cache::ActiveModel {
            cache_key: Set(cache_key.to_string()),
            movie_id: Set(movie_id),
            payload_json: Set(payload_json),
            updated_at: Set(updated_at.to_rfc3339()),
        };

        AvailabilityCache::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(availability_cache::Column::CacheKey)
                    .update_columns([
                        availability_cache::Column::PayloadJson,
                        availability_cache::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(AvailabilityCache::find().count(&self.conn).await?)
    }
}
