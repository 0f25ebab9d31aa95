use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    admin_ids: Vec<i64>,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, admin_ids: Vec<i64>) -> Self {
        Self { db, admin_ids }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Admins, plus anyone with an active row. A failed lookup denies.
    pub async fn is_authorized(&self, user_id: i64) -> bool {
        if self.is_admin(user_id) {
            return true;
        }

        match AuthorizedUsers::find()
            .filter(authorized_users::Column::UserId.eq(user_id))
            .filter(authorized_users::Column::IsActive.eq(true))
            .one(&self.db)
            .await
        {
            Ok(row) => row.is_some(),
            Err(e) => {
                tracing::error!("Authorization lookup failed for {}: {}", user_id, e);
                false
            }
        }
    }

    /// Grants access, reactivating a previously removed user.
    pub async fn add_user(
        &self,
        user_id: i64,
        username: Option<String>,
        first_name: Option<String>,
        added_by: i64,
    ) -> Result<authorized_users::Model, AppError> {
        let existing = AuthorizedUsers::find()
            .filter(authorized_users::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        let user = match existing {
            Some(user) => {
                let mut active: authorized_users::ActiveModel = user.into();
                active.is_active = Set(true);
                active.added_by = Set(added_by);
                if username.is_some() {
                    active.username = Set(username);
                }
                if first_name.is_some() {
                    active.first_name = Set(first_name);
                }
                active.update(&self.db).await?
            }
            None => {
                authorized_users::ActiveModel {
                    user_id: Set(user_id),
                    username: Set(username),
                    first_name: Set(first_name),
                    added_by: Set(added_by),
                    added_at: Set(Utc::now()),
                    is_active: Set(true),
                    caption_disabled: Set(false),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?
            }
        };

        tracing::info!("👤 User {} authorized by {}", user_id, added_by);
        Ok(user)
    }

    /// Deactivates the user. Admins cannot be removed this way.
    pub async fn remove_user(&self, user_id: i64) -> Result<(), AppError> {
        if self.is_admin(user_id) {
            return Err(AppError::BadRequest("Cannot remove an admin".to_string()));
        }

        let user = AuthorizedUsers::find()
            .filter(authorized_users::Column::UserId.eq(user_id))
            .filter(authorized_users::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let mut active: authorized_users::ActiveModel = user.into();
        active.is_active = Set(false);
        active.update(&self.db).await?;

        tracing::info!("👤 User {} deactivated", user_id);
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<authorized_users::Model>, AppError> {
        let users = AuthorizedUsers::find()
            .order_by_desc(authorized_users::Column::AddedAt)
            .all(&self.db)
            .await?;
        Ok(users)
    }
}
