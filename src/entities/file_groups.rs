use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A named collection of files. `total_files` and `total_size` are kept in
/// step with the member rows inside the same transaction that changes them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub owner_id: i64,
    pub created_at: DateTimeUtc,
    pub total_files: i32,
    pub total_size: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::files::Entity")]
    Files,
    #[sea_orm(has_many = "super::file_links::Entity")]
    FileLinks,
}

impl Related<super::files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl Related<super::file_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
