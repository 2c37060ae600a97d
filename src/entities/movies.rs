use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    /// Comma-separated genre names, e.g. "Action, Thriller".
    pub genre: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub review: Option<String>,
    pub date_added: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
