use crate::api::error::AppError;
use crate::entities::{file_links::LinkKind, prelude::*, *};
use crate::utils::format::generate_link_code;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, SqlErr, TransactionTrait,
};

const MAX_CODE_ATTEMPTS: usize = 5;

/// What a link code points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    File(i32),
    Group(i32),
}

impl LinkTarget {
    pub fn kind(&self) -> LinkKind {
        match self {
            LinkTarget::File(_) => LinkKind::File,
            LinkTarget::Group(_) => LinkKind::Group,
        }
    }

    fn from_row(link: &file_links::Model) -> Option<Self> {
        match link.link_type {
            LinkKind::File => link.file_id.map(LinkTarget::File),
            LinkKind::Group => link.group_id.map(LinkTarget::Group),
        }
    }
}

/// Owner-facing view of a code. Requesters only ever see found / not found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Active(file_links::Model),
    Inactive(file_links::Model),
    NotFound,
}

#[derive(Clone)]
pub struct LinkService {
    db: DatabaseConnection,
}

impl LinkService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn share_url(bot_username: &str, link_code: &str) -> String {
        format!(
            "https://t.me/{}?start={}",
            bot_username.trim_start_matches('@'),
            link_code
        )
    }

    /// Looks up an active code and counts the click. Unknown and revoked
    /// codes are indistinguishable here.
    pub async fn resolve(&self, link_code: &str) -> Result<LinkTarget, AppError> {
        let not_found = || AppError::NotFound("Invalid or Expired Link".to_string());

        let txn = self.db.begin().await?;

        // The increment doubles as the activity check, so concurrent
        // resolutions each count exactly once.
        let updated = FileLinks::update_many()
            .col_expr(
                file_links::Column::Clicks,
                Expr::col(file_links::Column::Clicks).add(1),
            )
            .filter(file_links::Column::LinkCode.eq(link_code))
            .filter(file_links::Column::IsActive.eq(true))
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            return Err(not_found());
        }

        let link = FileLinks::find()
            .filter(file_links::Column::LinkCode.eq(link_code))
            .one(&txn)
            .await?
            .ok_or_else(not_found)?;

        txn.commit().await?;

        LinkTarget::from_row(&link).ok_or_else(not_found)
    }

    /// Existing active link for the target, else a freshly minted one.
    pub async fn get_or_create(
        &self,
        owner_id: i64,
        target: LinkTarget,
    ) -> Result<String, AppError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let txn = self.db.begin().await?;

            if let Some(existing) = Self::find_active(&txn, owner_id, target).await? {
                txn.commit().await?;
                return Ok(existing.link_code);
            }

            let code = generate_link_code();
            let (file_id, group_id) = match target {
                LinkTarget::File(id) => (Some(id), None),
                LinkTarget::Group(id) => (None, Some(id)),
            };

            let inserted = file_links::ActiveModel {
                link_code: Set(code.clone()),
                link_type: Set(target.kind()),
                file_id: Set(file_id),
                group_id: Set(group_id),
                owner_id: Set(owner_id),
                created_at: Set(Utc::now()),
                clicks: Set(0),
                is_active: Set(true),
                ..Default::default()
            }
            .insert(&txn)
            .await;

            match inserted {
                Ok(_) => {
                    txn.commit().await?;
                    tracing::info!("🔗 Created {:?} link {} for owner {}", target, code, owner_id);
                    return Ok(code);
                }
                Err(err) if is_unique_violation(&err) => {
                    // Rolled back on drop. Either another writer won the race
                    // for this target, or the random code itself collided.
                    drop(txn);
                    if let Some(winner) = Self::find_active(&self.db, owner_id, target).await? {
                        return Ok(winner.link_code);
                    }
                    tracing::warn!(
                        "Link code collision on attempt {}/{}, regenerating",
                        attempt,
                        MAX_CODE_ATTEMPTS
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AppError::Internal(
            "could not allocate a unique link code".to_string(),
        ))
    }

    /// Deactivates the link if `owner_id` owns it. Already inactive, unknown
    /// and foreign codes all return false.
    pub async fn revoke(&self, link_code: &str, owner_id: i64) -> Result<bool, AppError> {
        let result = FileLinks::update_many()
            .col_expr(file_links::Column::IsActive, Expr::value(false))
            .filter(file_links::Column::LinkCode.eq(link_code))
            .filter(file_links::Column::OwnerId.eq(owner_id))
            .filter(file_links::Column::IsActive.eq(true))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            tracing::info!("🚫 Link {} revoked by owner {}", link_code, owner_id);
        }
        Ok(result.rows_affected > 0)
    }

    pub async fn link_status(&self, link_code: &str, owner_id: i64) -> Result<LinkStatus, AppError> {
        let link = FileLinks::find()
            .filter(file_links::Column::LinkCode.eq(link_code))
            .filter(file_links::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await?;

        Ok(match link {
            Some(link) if link.is_active => LinkStatus::Active(link),
            Some(link) => LinkStatus::Inactive(link),
            None => LinkStatus::NotFound,
        })
    }

    pub async fn active_link(
        &self,
        owner_id: i64,
        target: LinkTarget,
    ) -> Result<Option<file_links::Model>, AppError> {
        Self::find_active(&self.db, owner_id, target).await
    }

    async fn find_active<C: ConnectionTrait>(
        conn: &C,
        owner_id: i64,
        target: LinkTarget,
    ) -> Result<Option<file_links::Model>, AppError> {
        let query = FileLinks::find()
            .filter(file_links::Column::OwnerId.eq(owner_id))
            .filter(file_links::Column::LinkType.eq(target.kind()))
            .filter(file_links::Column::IsActive.eq(true));

        let query = match target {
            LinkTarget::File(id) => query.filter(file_links::Column::FileId.eq(id)),
            LinkTarget::Group(id) => query.filter(file_links::Column::GroupId.eq(id)),
        };

        Ok(query.one(conn).await?)
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_url_strips_at_sign() {
        assert_eq!(
            LinkService::share_url("@my_store_bot", "abcDEF123_-x"),
            "https://t.me/my_store_bot?start=abcDEF123_-x"
        );
        assert_eq!(
            LinkService::share_url("my_store_bot", "code"),
            "https://t.me/my_store_bot?start=code"
        );
    }

    #[test]
    fn test_target_kind() {
        assert_eq!(LinkTarget::File(1).kind(), LinkKind::File);
        assert_eq!(LinkTarget::Group(1).kind(), LinkKind::Group);
    }
}
