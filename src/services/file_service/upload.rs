use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use super::{
    FileService,
    types::{CommittedBatch, StagedFile},
};

impl FileService {
    /// Writes a staged batch into `group_name` (created on first use) as one
    /// transaction. Serial numbers continue from the group's current maximum
    /// in staging order; group totals move by the batch sums.
    pub async fn commit_batch(
        &self,
        owner_id: i64,
        group_name: &str,
        staged: &[StagedFile],
    ) -> Result<CommittedBatch, AppError> {
        let txn = self.db.begin().await?;

        // 1. Resolve or create the group
        let group = find_or_create_group(&txn, owner_id, group_name).await?;

        // 2. Next serial, read once for the whole batch
        let max_serial: Option<i32> = Files::find()
            .select_only()
            .column_as(files::Column::SerialNumber.max(), "max_serial")
            .filter(files::Column::GroupId.eq(group.id))
            .into_tuple::<Option<i32>>()
            .one(&txn)
            .await?
            .flatten();
        let mut next_serial = max_serial.unwrap_or(0) + 1;

        // 3. Insert rows
        let now = Utc::now();
        let mut inserted = Vec::with_capacity(staged.len());
        for item in staged {
            let row = files::ActiveModel {
                group_id: Set(group.id),
                serial_number: Set(next_serial),
                unique_id: Set(Uuid::new_v4().to_string()),
                file_name: Set(item.file_name.clone()),
                file_type: Set(item.kind),
                file_size: Set(item.file_size),
                storage_ref: Set(item.storage_ref.clone()),
                uploader_id: Set(owner_id),
                uploaded_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            inserted.push(row);
            next_serial += 1;
        }

        // 4. Totals
        let added_files = inserted.len() as i32;
        let added_size: i64 = inserted.iter().map(|f| f.file_size).sum();
        if added_files > 0 {
            FileGroups::update_many()
                .col_expr(
                    file_groups::Column::TotalFiles,
                    Expr::col(file_groups::Column::TotalFiles).add(added_files),
                )
                .col_expr(
                    file_groups::Column::TotalSize,
                    Expr::col(file_groups::Column::TotalSize).add(added_size),
                )
                .filter(file_groups::Column::Id.eq(group.id))
                .exec(&txn)
                .await?;
        }

        let group = FileGroups::find_by_id(group.id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::Internal("group vanished during commit".to_string()))?;

        txn.commit().await?;

        tracing::info!(
            "📦 Committed {} file(s) to group '{}' (owner {})",
            inserted.len(),
            group.name,
            owner_id
        );

        Ok(CommittedBatch {
            group,
            files: inserted,
        })
    }
}

async fn find_or_create_group<C: ConnectionTrait>(
    conn: &C,
    owner_id: i64,
    name: &str,
) -> Result<file_groups::Model, AppError> {
    let existing = FileGroups::find()
        .filter(file_groups::Column::Name.eq(name))
        .filter(file_groups::Column::OwnerId.eq(owner_id))
        .one(conn)
        .await?;

    if let Some(group) = existing {
        return Ok(group);
    }

    let group = file_groups::ActiveModel {
        name: Set(name.to_string()),
        owner_id: Set(owner_id),
        created_at: Set(Utc::now()),
        total_files: Set(0),
        total_size: Set(0),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    tracing::info!("🆕 Created group '{}' for owner {}", name, owner_id);
    Ok(group)
}
