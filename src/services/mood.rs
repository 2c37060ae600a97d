//! Mood text to movie recommendations.
//!
//! Resolution runs through tiers (DB mapping, built-in table, external
//! discovery, unfiltered catalog). A failing tier is logged and the next one
//! takes over.

use crate::clients::tmdb::TmdbClient;
use crate::config::MoodConfig;
use crate::constants::moods;
use crate::db::Store;
use crate::domain::{MoodLabel, MovieResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoodError {
    #[error("Mood input is required")]
    MissingMoodText,
}

/// External catalog consulted when the local catalog runs short.
#[async_trait::async_trait]
pub trait DiscoverySource: Send + Sync {
    async fn discover(&self, genres: &[String], page: u64) -> anyhow::Result<Vec<MovieResult>>;
}

#[async_trait::async_trait]
impl DiscoverySource for TmdbClient {
    async fn discover(&self, genres: &[String], page: u64) -> anyhow::Result<Vec<MovieResult>> {
        self.discover_movies(genres, page).await
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodQuery {
    pub mood_text: Option<String>,
    pub limit: Option<u64>,
    pub page: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoodResults {
    pub mood: String,
    pub genres: Vec<String>,
    pub movies: Vec<MovieResult>,
}

/// Maps free text onto a mood key.
///
/// An exact mood name wins, then the first mood with a trigger contained in
/// the text, then the text itself.
///
/// ```rust
/// use moodreel::services::mood::resolve_mood;
///
/// assert_eq!(resolve_mood("  Happy "), "happy");
/// assert_eq!(resolve_mood("want something spooky"), "scared");
/// assert_eq!(resolve_mood("Western"), "western");
/// ```
#[must_use]
pub fn resolve_mood(text: &str) -> String {
    let text = text.trim().to_lowercase();

    let known = moods::SYNONYMS
        .iter()
        .map(|(mood, _)| *mood)
        .chain(moods::GENRES.iter().map(|(mood, _)| *mood));
    if let Some(mood) = known.into_iter().find(|m| *m == text) {
        return mood.to_string();
    }

    moods::SYNONYMS
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| text.contains(t)))
        .map_or(text, |(mood, _)| (*mood).to_string())
}

/// Genres from the built-in table; empty for unknown moods.
#[must_use]
pub fn static_genres(mood: &str) -> Vec<String> {
    moods::GENRES
        .iter()
        .find(|(m, _)| *m == mood)
        .map(|(_, genres)| genres.iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}

/// Appends `incoming` records whose merge key is not yet present.
fn merge_into(target: &mut Vec<MovieResult>, incoming: Vec<MovieResult>) {
    let mut seen: HashSet<String> = target.iter().map(MovieResult::merge_key).collect();
    for movie in incoming {
        if seen.insert(movie.merge_key()) {
            target.push(movie);
        }
    }
}

pub struct MoodService {
    store: Store,
    discovery: Arc<dyn DiscoverySource>,
    config: MoodConfig,
}

impl MoodService {
    #[must_use]
    pub fn new(store: Store, discovery: Arc<dyn DiscoverySource>, config: MoodConfig) -> Self {
        Self {
            store,
            discovery,
            config,
        }
    }

    fn clamp_limit(&self, limit: Option<u64>) -> u64 {
        limit
            .filter(|l| *l > 0)
            .unwrap_or(self.config.default_limit)
            .clamp(1, self.config.max_limit.max(1))
    }

    async fn genres_for(&self, mood: &str) -> Vec<String> {
        match self.store.genres_for_mood(mood).await {
            Ok(genres) if !genres.is_empty() => return genres,
            Ok(_) => debug!("No mapped genres for mood '{}'", mood),
            Err(e) => warn!("Mood genre lookup failed for '{}': {}", mood, e),
        }
        static_genres(mood)
    }

    pub async fn analyze_mood(&self, query: &MoodQuery) -> Result<MoodResults, MoodError> {
        let text = query
            .mood_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(MoodError::MissingMoodText)?;

        let limit = self.clamp_limit(query.limit);
        let page = query.page.unwrap_or(1).max(1);
        let offset = (page - 1).saturating_mul(limit);

        let mood = resolve_mood(text);
        let genres = self.genres_for(&mood).await;

        let mut movies = if genres.is_empty() {
            vec![]
        } else {
            self.store
                .movies_by_genres(&genres, limit, offset)
                .await
                .unwrap_or_else(|e| {
                    warn!("Catalog query failed for mood '{}': {}", mood, e);
                    vec![]
                })
        };

        let local_count = movies.len();
        if (local_count as u64) < limit && !genres.is_empty() {
            match self.discovery.discover(&genres, page).await {
                Ok(found) => {
                    metrics::counter!("mood_discovery_fallbacks_total").increment(1);
                    debug!(
                        "Discovery returned {} record(s) for mood '{}'",
                        found.len(),
                        mood
                    );
                    merge_into(&mut movies, found);
                }
                Err(e) => warn!("Discovery failed for mood '{}': {}", mood, e),
            }
        }

        if movies.is_empty() {
            movies = self
                .store
                .latest_movies(limit, offset)
                .await
                .unwrap_or_else(|e| {
                    warn!("Unfiltered catalog query failed: {}", e);
                    vec![]
                });
        }

        movies.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

        info!(
            "Mood '{}' resolved to {} genre(s), {} movie(s) ({} local)",
            mood,
            genres.len(),
            movies.len(),
            local_count
        );

        Ok(MoodResults {
            mood,
            genres,
            movies,
        })
    }

    pub async fn list_moods(&self) -> anyhow::Result<Vec<MoodLabel>> {
        self.store.list_moods().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewMovie, Provenance};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeDiscovery {
        movies: Vec<MovieResult>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeDiscovery {
        fn returning(movies: Vec<MovieResult>) -> Arc<Self> {
            Arc::new(Self {
                movies,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                movies: vec![],
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl DiscoverySource for FakeDiscovery {
        async fn discover(&self, _genres: &[String], _page: u64) -> anyhow::Result<Vec<MovieResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("tmdb down");
            }
            Ok(self.movies.clone())
        }
    }

    fn external(id: Option<i64>, title: &str) -> MovieResult {
        MovieResult {
            id,
            title: title.to_string(),
            year: Some(2020),
            genres: vec!["Comedy".to_string()],
            poster: String::new(),
            trailer_link: String::new(),
            reviews: vec![],
            source: Provenance::ExternalDiscovery,
        }
    }

    async fn seeded_store() -> (Store, i64) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        let id = store
            .add_movie(&NewMovie {
                title: "Local Laughs".to_string(),
                year: Some(2015),
                genres: vec!["Comedy".to_string()],
                poster_url: Some("p.jpg".to_string()),
                ..NewMovie::default()
            })
            .await
            .unwrap();
        (store, id)
    }

    fn query(text: &str) -> MoodQuery {
        MoodQuery {
            mood_text: Some(text.to_string()),
            ..MoodQuery::default()
        }
    }

    #[test]
    fn test_resolve_mood_tiers() {
        assert_eq!(resolve_mood("SAD"), "sad");
        assert_eq!(resolve_mood("feeling kind of chill tonight"), "relaxed");
        assert_eq!(resolve_mood("  Film Noir "), "film noir");
    }

    #[test]
    fn test_static_genres() {
        assert_eq!(static_genres("scared"), vec!["Horror", "Thriller", "Mystery"]);
        assert!(static_genres("film noir").is_empty());
    }

    #[tokio::test]
    async fn test_missing_text_is_rejected() {
        let (store, _) = seeded_store().await;
        let service = MoodService::new(store, FakeDiscovery::returning(vec![]), MoodConfig::default());

        assert_eq!(
            service.analyze_mood(&MoodQuery::default()).await.unwrap_err(),
            MoodError::MissingMoodText
        );
        assert_eq!(
            service.analyze_mood(&query("   ")).await.unwrap_err(),
            MoodError::MissingMoodText
        );
    }

    #[tokio::test]
    async fn test_local_results_win_merge() {
        let (store, id) = seeded_store().await;
        let discovery = FakeDiscovery::returning(vec![
            external(Some(id), "Same Id From Tmdb"),
            external(None, "Fresh Find"),
            external(None, "Fresh Find"),
        ]);
        let service = MoodService::new(store, discovery.clone(), MoodConfig::default());

        let results = service.analyze_mood(&query("happy")).await.unwrap();

        let titles: Vec<_> = results.movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Local Laughs", "Fresh Find"]);
        assert_eq!(results.movies[0].source, Provenance::Local);
        assert_eq!(discovery.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_full_page_skips_discovery() {
        let (store, _) = seeded_store().await;
        let discovery = FakeDiscovery::returning(vec![external(Some(999), "Extra")]);
        let service = MoodService::new(store, discovery.clone(), MoodConfig::default());

        let q = MoodQuery {
            limit: Some(1),
            ..query("happy")
        };
        let results = service.analyze_mood(&q).await.unwrap();
        assert_eq!(results.movies.len(), 1);
        assert_eq!(discovery.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_db_mapping_takes_precedence() {
        let (store, _) = seeded_store().await;
        store.add_mood_genre("happy", "Documentary").await.unwrap();
        let service = MoodService::new(store, FakeDiscovery::failing(), MoodConfig::default());

        let results = service.analyze_mood(&query("happy")).await.unwrap();
        assert_eq!(results.genres, vec!["Documentary"]);
        // Nothing matches and discovery fails, so the unfiltered page is used.
        assert_eq!(results.movies.len(), 1);
        assert_eq!(results.movies[0].title, "Local Laughs");
    }

    #[tokio::test]
    async fn test_unknown_mood_falls_back_to_catalog() {
        let (store, _) = seeded_store().await;
        let discovery = FakeDiscovery::returning(vec![external(Some(5), "Never")]);
        let service = MoodService::new(store, discovery.clone(), MoodConfig::default());

        let results = service.analyze_mood(&query("xyzzy")).await.unwrap();
        assert!(results.genres.is_empty());
        assert_eq!(results.movies.len(), 1);
        assert_eq!(discovery.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let (store, _) = seeded_store().await;
        let many: Vec<_> = (0..150).map(|i| external(Some(1000 + i), "Bulk")).collect();
        let service = MoodService::new(store, FakeDiscovery::returning(many), MoodConfig::default());

        let q = MoodQuery {
            limit: Some(500),
            ..query("happy")
        };
        assert_eq!(service.analyze_mood(&q).await.unwrap().movies.len(), 100);

        let q = MoodQuery {
            limit: Some(0),
            ..query("happy")
        };
        assert_eq!(service.analyze_mood(&q).await.unwrap().movies.len(), 30);
    }
}
