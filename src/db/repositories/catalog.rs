use crate::domain::{MovieResult, NewMovie, Provenance};
use crate::entities::{movies, prelude::*};
use anyhow::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, Set,
};

/// Rows without a poster sort after rows with one.
const MISSING_POSTER_FIRST_KEY: &str = "(poster_url IS NULL OR poster_url = '')";

pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model_to_movie(model: movies::Model) -> MovieResult {
        MovieResult {
            id: Some(model.id),
            title: model.title,
            year: model.year,
            genres: model
                .genre
                .map(|g| {
                    g.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            poster: model.poster_url.unwrap_or_default(),
            trailer_link: model.trailer_url.unwrap_or_default(),
            reviews: model
                .review
                .filter(|r| !r.trim().is_empty())
                .into_iter()
                .collect(),
            source: Provenance::Local,
        }
    }

    fn ranked(query: Select<Movies>, limit: u64, offset: u64) -> Select<Movies> {
        query
            .order_by_asc(Expr::cust(MISSING_POSTER_FIRST_KEY))
            .order_by_desc(movies::Column::DateAdded)
            .order_by_desc(movies::Column::Id)
            .limit(limit)
            .offset(offset)
    }

    /// Movies whose genre text contains any of `genres`, poster-first then
    /// newest first.
    pub async fn find_by_genres(
        &self,
        genres: &[String],
        limit: u64,
        offset: u64,
    ) -> Result<Vec<MovieResult>> {
        if genres.is_empty() {
            return Ok(vec![]);
        }

        let condition = genres
            .iter()
            .fold(Condition::any(), |cond, genre| {
                cond.add(movies::Column::Genre.contains(genre))
            });

        let rows = Self::ranked(Movies::find().filter(condition), limit, offset)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model_to_movie).collect())
    }

    pub async fn latest(&self, limit: u64, offset: u64) -> Result<Vec<MovieResult>> {
        let rows = Self::ranked(Movies::find(), limit, offset)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model_to_movie).collect())
    }

    pub async fn add(&self, movie: &NewMovie) -> Result<i64> {
        let active_model = movies::ActiveModel {
            title: Set(movie.title.clone()),
            year: Set(movie.year),
            genre: Set((!movie.genres.is_empty()).then(|| movie.genres.join(", "))),
            poster_url: Set(movie.poster_url.clone()),
            trailer_url: Set(movie.trailer_url.clone()),
            review: Set(movie.review.clone()),
            date_added: Set(movie
                .date_added
                .unwrap_or_else(chrono::Utc::now)
                .to_rfc3339()),
            ..Default::default()
        };

        let result = Movies::insert(active_model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }
}
