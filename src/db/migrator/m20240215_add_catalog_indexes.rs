use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mood_genre_map_mood")
                    .table(MoodGenreMap::Table)
                    .col(MoodGenreMap::Mood)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_movies_date_added")
                    .table(Movies::Table)
                    .col(Movies::DateAdded)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_availability_cache_movie_id")
                    .table(AvailabilityCache::Table)
                    .col(AvailabilityCache::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_availability_cache_movie_id")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_movies_date_added")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_mood_genre_map_mood")
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum MoodGenreMap {
    Table,
    Mood,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    DateAdded,
}

#[derive(DeriveIden)]
enum AvailabilityCache {
    Table,
    MovieId,
}
