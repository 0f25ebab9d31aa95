use crate::api::error::AppError;
use crate::entities::{file_links::LinkKind, prelude::*, *};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use super::{FileService, GROUP_PREVIEW_LIMIT, types::GroupDetails};

impl FileService {
    pub(super) async fn owned_group<C: ConnectionTrait>(
        conn: &C,
        owner_id: i64,
        name: &str,
    ) -> Result<file_groups::Model, AppError> {
        FileGroups::find()
            .filter(file_groups::Column::Name.eq(name))
            .filter(file_groups::Column::OwnerId.eq(owner_id))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group '{}' not found", name)))
    }

    pub async fn find_group(
        &self,
        owner_id: i64,
        name: &str,
    ) -> Result<file_groups::Model, AppError> {
        Self::owned_group(&self.db, owner_id, name).await
    }

    /// Newest first.
    pub async fn list_groups(&self, owner_id: i64) -> Result<Vec<file_groups::Model>, AppError> {
        let groups = FileGroups::find()
            .filter(file_groups::Column::OwnerId.eq(owner_id))
            .order_by_desc(file_groups::Column::CreatedAt)
            .order_by_desc(file_groups::Column::Id)
            .all(&self.db)
            .await?;
        Ok(groups)
    }

    pub async fn group_details(
        &self,
        owner_id: i64,
        name: &str,
    ) -> Result<GroupDetails, AppError> {
        let group = Self::owned_group(&self.db, owner_id, name).await?;

        let preview = Files::find()
            .filter(files::Column::GroupId.eq(group.id))
            .order_by_asc(files::Column::SerialNumber)
            .limit(GROUP_PREVIEW_LIMIT)
            .all(&self.db)
            .await?;

        let link = FileLinks::find()
            .filter(file_links::Column::GroupId.eq(group.id))
            .filter(file_links::Column::LinkType.eq(LinkKind::Group))
            .filter(file_links::Column::OwnerId.eq(owner_id))
            .filter(file_links::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;

        Ok(GroupDetails {
            group,
            preview,
            link,
        })
    }

    pub async fn list_files(
        &self,
        owner_id: i64,
        name: &str,
    ) -> Result<(file_groups::Model, Vec<files::Model>), AppError> {
        let group = Self::owned_group(&self.db, owner_id, name).await?;
        let files = Self::group_files(&self.db, group.id).await?;
        Ok((group, files))
    }

    pub async fn find_file(
        &self,
        owner_id: i64,
        name: &str,
        serial_number: i32,
    ) -> Result<files::Model, AppError> {
        let group = Self::owned_group(&self.db, owner_id, name).await?;
        Files::find()
            .filter(files::Column::GroupId.eq(group.id))
            .filter(files::Column::SerialNumber.eq(serial_number))
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "File #{} not found in group '{}'",
                    serial_number, name
                ))
            })
    }

    /// Members of a group in serial order. No owner check; link holders use it.
    pub async fn group_files<C: ConnectionTrait>(
        conn: &C,
        group_id: i32,
    ) -> Result<Vec<files::Model>, AppError> {
        let files = Files::find()
            .filter(files::Column::GroupId.eq(group_id))
            .order_by_asc(files::Column::SerialNumber)
            .all(conn)
            .await?;
        Ok(files)
    }
}
