use crate::config::BotConfig;
use crate::entities::files;
use crate::services::settings_service::{CaptionSettings, SettingsService};
use crate::utils::format::serial_tag;

/// Text attached to a delivered file.
///
/// Captions are dropped entirely when globally disabled, or when the
/// uploader turned them off for their own files. Admins are not subject to
/// the per-user switch.
pub fn resolve_caption(
    settings: &CaptionSettings,
    user_caption_disabled: bool,
    is_admin: bool,
    file_name: &str,
    serial_number: Option<i32>,
) -> String {
    if (user_caption_disabled && !is_admin) || !settings.enabled {
        return file_name.to_string();
    }

    match serial_number {
        Some(serial) => format!(
            "{} {}\n\n{}",
            serial_tag(serial),
            file_name,
            settings.custom_text
        ),
        None => format!("{}\n\n{}", file_name, settings.custom_text),
    }
}

/// Reads the settings a caption depends on. Storage trouble never blocks a
/// delivery: it falls back to captions on with the default text.
#[derive(Clone)]
pub struct CaptionResolver {
    settings: SettingsService,
    config: BotConfig,
}

impl CaptionResolver {
    pub fn new(settings: SettingsService, config: BotConfig) -> Self {
        Self { settings, config }
    }

    pub async fn caption_for(&self, file: &files::Model, serial_number: Option<i32>) -> String {
        let is_admin = self.config.is_admin(file.uploader_id);

        let user_disabled = if is_admin {
            false
        } else {
            self.settings
                .user_caption_disabled(file.uploader_id)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("Caption preference lookup failed, keeping captions: {}", e);
                    false
                })
        };

        let settings = self.settings.caption_settings().await.unwrap_or_else(|e| {
            tracing::warn!("Caption settings unavailable, using defaults: {}", e);
            self.settings.defaults()
        });

        resolve_caption(
            &settings,
            user_disabled,
            is_admin,
            &file.file_name,
            serial_number,
        )
    }
}
