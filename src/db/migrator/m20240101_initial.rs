use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Spelled out so the id becomes SQLite's INTEGER rowid alias.
        manager
            .create_table(
                Table::create()
                    .table(CatalogMovies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CatalogMovies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CatalogMovies::Title).string().not_null())
                    .col(ColumnDef::new(CatalogMovies::Year).integer().null())
                    .col(ColumnDef::new(CatalogMovies::Genre).string().null())
                    .col(ColumnDef::new(CatalogMovies::PosterUrl).string().null())
                    .col(ColumnDef::new(CatalogMovies::TrailerUrl).string().null())
                    .col(ColumnDef::new(CatalogMovies::Review).text().null())
                    .col(ColumnDef::new(CatalogMovies::DateAdded).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Moods)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(MoodGenreMap)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AvailabilityCache)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AvailabilityCache).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MoodGenreMap).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Moods).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movies).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CatalogMovies {
    #[sea_orm(iden = "movies")]
    Table,
    Id,
    Title,
    Year,
    Genre,
    PosterUrl,
    TrailerUrl,
    Review,
    DateAdded,
}
