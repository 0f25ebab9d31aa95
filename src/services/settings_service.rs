use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// Global caption settings as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionSettings {
    pub enabled: bool,
    pub custom_text: String,
}

#[derive(Clone)]
pub struct SettingsService {
    db: DatabaseConnection,
    default_caption: String,
}

impl SettingsService {
    pub fn new(db: DatabaseConnection, default_caption: String) -> Self {
        Self {
            db,
            default_caption,
        }
    }

    pub fn defaults(&self) -> CaptionSettings {
        CaptionSettings {
            enabled: true,
            custom_text: self.default_caption.clone(),
        }
    }

    /// Missing keys fall back to defaults; a failed read is an error.
    pub async fn caption_settings(&self) -> Result<CaptionSettings, AppError> {
        let rows = BotSettings::find()
            .filter(
                bot_settings::Column::Key
                    .is_in([bot_settings::CAPTION_ENABLED, bot_settings::CUSTOM_CAPTION]),
            )
            .all(&self.db)
            .await?;

        let mut settings = self.defaults();
        for row in rows {
            match row.key.as_str() {
                bot_settings::CAPTION_ENABLED => settings.enabled = row.value == "1",
                bot_settings::CUSTOM_CAPTION => settings.custom_text = row.value,
                _ => {}
            }
        }
        Ok(settings)
    }

    pub async fn set_caption_enabled(&self, enabled: bool) -> Result<(), AppError> {
        let value = if enabled { "1" } else { "0" };
        self.put(bot_settings::CAPTION_ENABLED, value).await?;
        tracing::info!("⚙️ Global captions {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    pub async fn set_custom_caption(&self, text: &str) -> Result<(), AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("Caption text cannot be empty".to_string()));
        }
        self.put(bot_settings::CUSTOM_CAPTION, text).await?;
        tracing::info!("⚙️ Custom caption updated");
        Ok(())
    }

    /// Users without a row keep captions.
    pub async fn user_caption_disabled(&self, user_id: i64) -> Result<bool, AppError> {
        let user = AuthorizedUsers::find()
            .filter(authorized_users::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(user.map(|u| u.caption_disabled).unwrap_or(false))
    }

    pub async fn set_user_caption_disabled(
        &self,
        user_id: i64,
        disabled: bool,
    ) -> Result<(), AppError> {
        let result = AuthorizedUsers::update_many()
            .col_expr(authorized_users::Column::CaptionDisabled, Expr::value(disabled))
            .filter(authorized_users::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        let row = bot_settings::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(Utc::now()),
        };

        BotSettings::insert(row)
            .on_conflict(
                OnConflict::column(bot_settings::Column::Key)
                    .update_columns([bot_settings::Column::Value, bot_settings::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
