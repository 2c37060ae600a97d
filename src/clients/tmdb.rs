use crate::config::TmdbConfig;
use crate::domain::{MovieResult, Provenance};
use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use url::Url;

const YOUTUBE_WATCH: &str = "https://www.youtube.com/watch?v=";

/// TMDB genre taxonomy in both directions.
#[derive(Debug, Clone, Default)]
pub struct GenreMaps {
    by_name: HashMap<String, i64>,
    by_id: HashMap<i64, String>,
}

impl GenreMaps {
    fn from_genres(genres: Vec<TmdbGenre>) -> Self {
        let mut maps = Self::default();
        for genre in genres {
            maps.by_name.insert(genre.name.to_lowercase(), genre.id);
            maps.by_id.insert(genre.id, genre.name);
        }
        maps
    }

    /// Ids for the given names, case-insensitive. Unknown names are dropped.
    #[must_use]
    pub fn ids_for(&self, names: &[String]) -> Vec<i64> {
        names
            .iter()
            .filter_map(|n| self.by_name.get(&n.to_lowercase()).copied())
            .collect()
    }

    #[must_use]
    pub fn name_for(&self, id: i64) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbVideo {
    #[serde(default)]
    key: String,
    #[serde(default)]
    site: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    results: Vec<TmdbVideo>,
}

pub struct TmdbClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    image_base: String,
    language: String,
    enrich_trailers: bool,
    trailer_concurrency: usize,
    max_trailer_enrichment: usize,
    genres: OnceCell<GenreMaps>,
}

impl TmdbClient {
    #[must_use]
    pub fn new(client: Client, config: &TmdbConfig) -> Self {
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!("TMDB API key is missing; discovery fallback is disabled");
        }

        Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base: config.image_base.clone(),
            language: config.language.clone(),
            enrich_trailers: config.enrich_trailers,
            trailer_concurrency: config.trailer_concurrency.max(1),
            max_trailer_enrichment: config.max_trailer_enrichment,
            genres: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, api_key: &str, path: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .with_context(|| format!("Invalid TMDB url for {path}"))?;
        url.query_pairs_mut()
            .append_pair("api_key", api_key)
            .append_pair("language", &self.language);
        Ok(url)
    }

    async fn load_genre_maps(&self, api_key: &str) -> Result<GenreMaps> {
        let url = self.endpoint(api_key, "/genre/movie/list")?;
        debug!("Loading TMDB genre list");

        let response: GenreListResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(GenreMaps::from_genres(response.genres))
    }

    /// The genre taxonomy, fetched once per process. Empty without an API key.
    pub async fn genre_maps(&self) -> Result<GenreMaps> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(GenreMaps::default());
        };

        let maps = self
            .genres
            .get_or_try_init(|| self.load_genre_maps(api_key))
            .await?;
        Ok(maps.clone())
    }

    pub async fn discover_by_genre_ids(&self, genre_ids: &[i64], page: u64) -> Result<Vec<TmdbMovie>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(vec![]);
        };
        if genre_ids.is_empty() {
            return Ok(vec![]);
        }

        let with_genres = genre_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut url = self.endpoint(api_key, "/discover/movie")?;
        url.query_pairs_mut()
            .append_pair("with_genres", &with_genres)
            .append_pair("sort_by", "popularity.desc")
            .append_pair("include_adult", "false")
            .append_pair("include_video", "false")
            .append_pair("page", &page.max(1).to_string());

        debug!(%with_genres, page, "Discovering TMDB movies");

        let response: DiscoverResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.results)
    }

    /// First YouTube trailer, else any YouTube video, else empty.
    pub async fn fetch_trailer_url(&self, movie_id: i64) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(String::new());
        };

        let url = self.endpoint(api_key, &format!("/movie/{movie_id}/videos"))?;
        let response: VideosResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let youtube = |v: &&TmdbVideo| v.site == "YouTube" && !v.key.is_empty();
        let video = response
            .results
            .iter()
            .filter(youtube)
            .find(|v| v.kind == "Trailer")
            .or_else(|| response.results.iter().find(youtube));

        Ok(video.map_or_else(String::new, |v| format!("{YOUTUBE_WATCH}{}", v.key)))
    }

    #[must_use]
    pub fn shape_movie(&self, movie: TmdbMovie, maps: &GenreMaps) -> MovieResult {
        let title = movie
            .title
            .filter(|t| !t.is_empty())
            .or(movie.original_title.filter(|t| !t.is_empty()))
            .unwrap_or_else(|| "Untitled".to_string());

        let year = movie
            .release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok());

        MovieResult {
            id: Some(movie.id),
            title,
            year,
            genres: movie
                .genre_ids
                .iter()
                .filter_map(|id| maps.name_for(*id).map(ToString::to_string))
                .collect(),
            poster: movie
                .poster_path
                .filter(|p| !p.is_empty())
                .map(|p| format!("{}{p}", self.image_base))
                .unwrap_or_default(),
            trailer_link: String::new(),
            reviews: movie.overview.filter(|o| !o.is_empty()).into_iter().collect(),
            source: Provenance::ExternalDiscovery,
        }
    }

    /// Fills `trailer_link` for the leading records, keeping their order.
    pub async fn enrich_trailers(&self, movies: &mut [MovieResult]) {
        if !self.enrich_trailers || !self.is_enabled() {
            return;
        }

        let ids: Vec<Option<i64>> = movies
            .iter()
            .take(self.max_trailer_enrichment)
            .map(|m| m.id)
            .collect();

        let links: Vec<String> = futures::stream::iter(ids)
            .map(|id| async move {
                let Some(id) = id else {
                    return String::new();
                };
                self.fetch_trailer_url(id).await.unwrap_or_else(|e| {
                    debug!("Trailer lookup failed for TMDB movie {}: {}", id, e);
                    String::new()
                })
            })
            .buffered(self.trailer_concurrency)
            .collect()
            .await;

        for (movie, link) in movies.iter_mut().zip(links) {
            movie.trailer_link = link;
        }
    }

    /// Genre names to shaped, trailer-enriched discovery results.
    pub async fn discover_movies(&self, genres: &[String], page: u64) -> Result<Vec<MovieResult>> {
        if !self.is_enabled() || genres.is_empty() {
            return Ok(vec![]);
        }

        let maps = self.genre_maps().await?;
        let ids = maps.ids_for(genres);
        if ids.is_empty() {
            debug!("No TMDB genre ids for {:?}", genres);
            return Ok(vec![]);
        }

        let raw = self.discover_by_genre_ids(&ids, page).await?;
        let mut movies: Vec<MovieResult> = raw
            .into_iter()
            .map(|m| self.shape_movie(m, &maps))
            .collect();

        self.enrich_trailers(&mut movies).await;
        Ok(movies)
    }
}
