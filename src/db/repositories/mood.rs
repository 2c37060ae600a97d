use crate::domain::MoodLabel;
use crate::entities::{mood_genre_map, moods, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

pub struct MoodRepository {
    conn: DatabaseConnection,
}

impl MoodRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Genre names mapped to `mood`, in insertion order.
    pub async fn genres_for_mood(&self, mood: &str) -> Result<Vec<String>> {
        let rows = MoodGenreMap::find()
            .filter(mood_genre_map::Column::Mood.eq(mood))
            .order_by_asc(mood_genre_map::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|r| r.genre).collect())
    }

    pub async fn list_moods(&self) -> Result<Vec<MoodLabel>> {
        let rows = Moods::find()
            .order_by_asc(moods::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|m| MoodLabel {
                id: m.id,
                mood_label: m.mood_label,
            })
            .collect())
    }

    pub async fn add_mood(&self, label: &str) -> Result<i32> {
        let active_model = moods::ActiveModel {
            mood_label: Set(label.trim().to_string()),
            ..Default::default()
        };

        let result = Moods::insert(active_model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn add_mapping(&self, mood: &str, genre: &str) -> Result<()> {
        let active_model = mood_genre_map::ActiveModel {
            mood: Set(mood.trim().to_lowercase()),
            genre: Set(genre.trim().to_string()),
            ..Default::default()
        };

        MoodGenreMap::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }
}
