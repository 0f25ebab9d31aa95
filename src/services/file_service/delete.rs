use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, TransactionTrait};

use super::FileService;

impl FileService {
    /// Removes one file and its links, and takes it out of the group totals,
    /// all in one transaction.
    pub async fn delete_file(
        &self,
        owner_id: i64,
        group_name: &str,
        serial_number: i32,
    ) -> Result<files::Model, AppError> {
        let txn = self.db.begin().await?;

        let group = Self::owned_group(&txn, owner_id, group_name).await?;
        let file = Files::find()
            .filter(files::Column::GroupId.eq(group.id))
            .filter(files::Column::SerialNumber.eq(serial_number))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "File #{} not found in group '{}'",
                    serial_number, group_name
                ))
            })?;

        FileLinks::delete_many()
            .filter(file_links::Column::FileId.eq(file.id))
            .exec(&txn)
            .await?;

        file.clone().delete(&txn).await?;

        FileGroups::update_many()
            .col_expr(
                file_groups::Column::TotalFiles,
                Expr::col(file_groups::Column::TotalFiles).sub(1),
            )
            .col_expr(
                file_groups::Column::TotalSize,
                Expr::col(file_groups::Column::TotalSize).sub(file.file_size),
            )
            .filter(file_groups::Column::Id.eq(group.id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        tracing::info!(
            "🗑️ Deleted file #{} '{}' from group '{}'",
            file.serial_number,
            file.file_name,
            group_name
        );
        Ok(file)
    }

    /// Removes a group with every file and link that hangs off it.
    pub async fn delete_group(
        &self,
        owner_id: i64,
        group_name: &str,
    ) -> Result<file_groups::Model, AppError> {
        let txn = self.db.begin().await?;

        let group = Self::owned_group(&txn, owner_id, group_name).await?;

        let file_ids: Vec<i32> = Files::find()
            .filter(files::Column::GroupId.eq(group.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|f| f.id)
            .collect();

        let mut links = Condition::any().add(file_links::Column::GroupId.eq(group.id));
        if !file_ids.is_empty() {
            links = links.add(file_links::Column::FileId.is_in(file_ids));
        }
        FileLinks::delete_many().filter(links).exec(&txn).await?;

        Files::delete_many()
            .filter(files::Column::GroupId.eq(group.id))
            .exec(&txn)
            .await?;

        group.clone().delete(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            "🗑️ Deleted group '{}' ({} files) for owner {}",
            group.name,
            group.total_files,
            owner_id
        );
        Ok(group)
    }
}
