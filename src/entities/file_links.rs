use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    #[sea_orm(string_value = "file")]
    File,
    #[sea_orm(string_value = "group")]
    Group,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub link_code: String,
    pub link_type: LinkKind,
    pub file_id: Option<i32>,
    pub group_id: Option<i32>,
    pub owner_id: i64,
    pub created_at: DateTimeUtc,
    pub clicks: i64,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::files::Entity",
        from = "Column::FileId",
        to = "super::files::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Files,
    #[sea_orm(
        belongs_to = "super::file_groups::Entity",
        from = "Column::GroupId",
        to = "super::file_groups::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    FileGroups,
}

impl Related<super::files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl Related<super::file_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
