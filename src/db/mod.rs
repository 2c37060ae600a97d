use crate::domain::{MoodLabel, MovieResult, NewMovie};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use crate::entities::availability_cache::Model as AvailabilityCacheEntry;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn availability_repo(&self) -> repositories::availability::AvailabilityCacheRepository {
        repositories::availability::AvailabilityCacheRepository::new(self.conn.clone())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    fn mood_repo(&self) -> repositories::mood::MoodRepository {
        repositories::mood::MoodRepository::new(self.conn.clone())
    }

    pub async fn get_availability_entry(
        &self,
        cache_key: &str,
    ) -> Result<Option<AvailabilityCacheEntry>> {
        self.availability_repo().get(cache_key).await
    }

    pub async fn upsert_availability_entry(
        &self,
        cache_key: &str,
        movie_id: Option<i64>,
        payload_json: String,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.availability_repo()
            .upsert(cache_key, movie_id, payload_json, updated_at)
            .await
    }

    pub async fn count_availability_entries(&self) -> Result<u64> {
        self.availability_repo().count().await
    }

    pub async fn movies_by_genres(
        &self,
        genres: &[String],
        limit: u64,
        offset: u64,
    ) -> Result<Vec<MovieResult>> {
        self.catalog_repo()
            .find_by_genres(genres, limit, offset)
            .await
    }

    pub async fn latest_movies(&self, limit: u64, offset: u64) -> Result<Vec<MovieResult>> {
        self.catalog_repo().latest(limit, offset).await
    }

    pub async fn add_movie(&self, movie: &NewMovie) -> Result<i64> {
        self.catalog_repo().add(movie).await
    }

    pub async fn genres_for_mood(&self, mood: &str) -> Result<Vec<String>> {
        self.mood_repo().genres_for_mood(mood).await
    }

    pub async fn list_moods(&self) -> Result<Vec<MoodLabel>> {
        self.mood_repo().list_moods().await
    }

    pub async fn add_mood(&self, label: &str) -> Result<i32> {
        self.mood_repo().add_mood(label).await
    }

    pub async fn add_mood_genre(&self, mood: &str, genre: &str) -> Result<()> {
        self.mood_repo().add_mapping(mood, genre).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap()
    }

    fn movie(title: &str, genres: &[&str], poster: Option<&str>, day: u32) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            year: Some(2000),
            genres: genres.iter().map(ToString::to_string).collect(),
            poster_url: poster.map(ToString::to_string),
            date_added: Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_availability_upsert_overwrites_payload() {
        let store = memory_store().await;
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();

        store
            .upsert_availability_entry("k", Some(7), "{\"a\":1}".to_string(), t0)
            .await
            .unwrap();
        store
            .upsert_availability_entry("k", Some(9), "{\"a\":2}".to_string(), t1)
            .await
            .unwrap();

        let entry = store.get_availability_entry("k").await.unwrap().unwrap();
        assert_eq!(entry.payload_json, "{\"a\":2}");
        assert_eq!(entry.updated_at, t1.to_rfc3339());
        assert_eq!(entry.movie_id, Some(7));
        assert_eq!(store.count_availability_entries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_availability_entry() {
        let store = memory_store().await;
        assert!(store.get_availability_entry("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_movies_by_genres_ranks_posters_then_recency() {
        let store = memory_store().await;
        store
            .add_movie(&movie("Old Poster", &["Comedy"], Some("p.jpg"), 1))
            .await
            .unwrap();
        store
            .add_movie(&movie("New Bare", &["Comedy", "Drama"], None, 20))
            .await
            .unwrap();
        store
            .add_movie(&movie("New Poster", &["Family"], Some("q.jpg"), 10))
            .await
            .unwrap();
        store
            .add_movie(&movie("Unrelated", &["Horror"], Some("h.jpg"), 30))
            .await
            .unwrap();

        let genres = vec!["Comedy".to_string(), "Family".to_string()];
        let results = store.movies_by_genres(&genres, 10, 0).await.unwrap();
        let titles: Vec<_> = results.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["New Poster", "Old Poster", "New Bare"]);
        assert_eq!(results[2].genres, vec!["Comedy", "Drama"]);

        let page_two = store.movies_by_genres(&genres, 2, 2).await.unwrap();
        assert_eq!(page_two.len(), 1);
        assert_eq!(page_two[0].title, "New Bare");
    }

    #[tokio::test]
    async fn test_movies_by_genres_empty_list() {
        let store = memory_store().await;
        store
            .add_movie(&movie("Any", &["Comedy"], None, 1))
            .await
            .unwrap();
        assert!(store.movies_by_genres(&[], 10, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mood_mappings_round_trip() {
        let store = memory_store().await;
        store.add_mood("Happy").await.unwrap();
        store.add_mood_genre("happy", "Comedy").await.unwrap();
        store.add_mood_genre("happy", "Music").await.unwrap();
        store.add_mood_genre("sad", "Drama").await.unwrap();

        assert_eq!(
            store.genres_for_mood("happy").await.unwrap(),
            vec!["Comedy", "Music"]
        );
        let moods = store.list_moods().await.unwrap();
        assert_eq!(moods.len(), 1);
        assert_eq!(moods[0].mood_label, "Happy");
    }
}
