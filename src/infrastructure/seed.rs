use crate::config::BotConfig;
use crate::entities::{authorized_users, bot_settings, prelude::*};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

/// Default settings and admin rows. Existing values are left alone.
pub async fn seed_initial_data(db: &DatabaseConnection, config: &BotConfig) -> anyhow::Result<()> {
    info!("🌱 Seeding initial data...");

    // 1. Settings
    let defaults = [
        (bot_settings::CAPTION_ENABLED, "1"),
        (bot_settings::CUSTOM_CAPTION, config.custom_caption.as_str()),
    ];

    for (key, value) in defaults {
        let exists = BotSettings::find_by_id(key.to_string()).one(db).await?;

        if exists.is_none() {
            let model = bot_settings::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(Utc::now()),
            };
            model.insert(db).await?;
        }
    }

    // 2. Admins
    for admin_id in &config.admin_ids {
        let exists = AuthorizedUsers::find()
            .filter(authorized_users::Column::UserId.eq(*admin_id))
            .one(db)
            .await?;

        if exists.is_none() {
            let model = authorized_users::ActiveModel {
                user_id: Set(*admin_id),
                username: Set(None),
                first_name: Set(Some("Admin".to_string())),
                added_by: Set(*admin_id),
                added_at: Set(Utc::now()),
                is_active: Set(true),
                caption_disabled: Set(false),
                ..Default::default()
            };
            model.insert(db).await?;
        }
    }

    info!("✅ Seeded settings and {} admin(s)", config.admin_ids.len());
    Ok(())
}
