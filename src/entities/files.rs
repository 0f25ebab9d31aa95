use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[sea_orm(string_value = "document")]
    Document,
    #[sea_orm(string_value = "photo")]
    Photo,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "audio")]
    Audio,
    #[sea_orm(string_value = "voice")]
    Voice,
    #[sea_orm(string_value = "video_note")]
    VideoNote,
}

impl MediaKind {
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Document => "Document",
            MediaKind::Photo => "Photo",
            MediaKind::Video => "Video",
            MediaKind::Audio => "Audio",
            MediaKind::Voice => "Voice",
            MediaKind::VideoNote => "Video note",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub group_id: i32,
    pub serial_number: i32,
    #[sea_orm(unique)]
    pub unique_id: String,
    pub file_name: String,
    pub file_type: MediaKind,
    pub file_size: i64,
    #[sea_orm(column_type = "Text")]
    pub storage_ref: String,
    pub uploader_id: i64,
    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::file_groups::Entity",
        from = "Column::GroupId",
        to = "super::file_groups::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    FileGroups,
    #[sea_orm(has_many = "super::file_links::Entity")]
    FileLinks,
}

impl Related<super::file_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileGroups.def()
    }
}

impl Related<super::file_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
