use std::env;
use std::time::Duration;

/// Runtime configuration for the bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot API token issued by BotFather
    pub bot_token: String,

    /// Public bot username, used to build share links
    pub bot_username: String,

    /// Static admin allow-list
    pub admin_ids: Vec<i64>,

    /// Contact shown to unauthorized users
    pub admin_contact: Option<String>,

    /// Caption appended to delivered files when no custom value is stored
    pub custom_caption: String,

    /// Health check HTTP port (default: 8000)
    pub health_check_port: u16,

    /// Maximum accepted upload size in bytes (default: 10 GB)
    pub max_file_size: i64,

    /// Delay before delivered messages are removed (default: 600s)
    pub auto_delete_secs: u64,

    /// Pause between sends during group delivery (default: 100ms)
    pub group_send_delay_ms: u64,

    /// Long-poll timeout for getUpdates (default: 30s)
    pub poll_timeout_secs: u64,

    /// Bot API base URL
    pub telegram_api_url: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            bot_username: String::new(),
            admin_ids: Vec::new(),
            admin_contact: None,
            custom_caption: "t.me/movieandwebserieshub".to_string(),
            health_check_port: 8000,
            max_file_size: 10 * 1024 * 1024 * 1024, // 10 GB
            auto_delete_secs: 600,
            group_send_delay_ms: 100,
            poll_timeout_secs: 30,
            telegram_api_url: "https://api.telegram.org".to_string(),
        }
    }
}

pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::error!("Invalid admin ID {:?}, skipping", s);
                None
            }
        })
        .collect()
}

impl BotConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            bot_token: env::var("BOT_TOKEN").unwrap_or(default.bot_token),

            bot_username: env::var("BOT_USERNAME").unwrap_or(default.bot_username),

            admin_ids: env::var("ADMIN_IDS")
                .map(|v| parse_admin_ids(&v))
                .unwrap_or(default.admin_ids),

            admin_contact: env::var("ADMIN_CONTACT").ok().filter(|v| !v.is_empty()),

            custom_caption: env::var("CUSTOM_CAPTION").unwrap_or(default.custom_caption),

            health_check_port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.health_check_port),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            auto_delete_secs: env::var("AUTO_DELETE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.auto_delete_secs),

            group_send_delay_ms: env::var("GROUP_SEND_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.group_send_delay_ms),

            poll_timeout_secs: env::var("POLL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.poll_timeout_secs),

            telegram_api_url: env::var("TELEGRAM_API_URL").unwrap_or(default.telegram_api_url),
        }
    }

    /// Config for local runs and tests: short timers, placeholder credentials
    pub fn development() -> Self {
        Self {
            bot_token: "1000000:development".to_string(),
            bot_username: "filestore_dev_bot".to_string(),
            admin_ids: vec![1],
            admin_contact: Some("@admin".to_string()),
            auto_delete_secs: 5,
            group_send_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Check the settings the bot cannot start without
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bot_token.is_empty() {
            anyhow::bail!("BOT_TOKEN environment variable not set!");
        }
        if !self.bot_token.contains(':') {
            anyhow::bail!("Invalid BOT_TOKEN format!");
        }
        if self.bot_username.is_empty() {
            anyhow::bail!("BOT_USERNAME environment variable not set!");
        }
        if self.admin_ids.is_empty() {
            tracing::warn!("ADMIN_IDS not set or empty. No admins configured!");
        }
        if self.admin_contact.is_none() {
            tracing::warn!("ADMIN_CONTACT not set. Admin contact information will be missing.");
        }
        Ok(())
    }

    pub fn auto_delete_after(&self) -> Duration {
        Duration::from_secs(self.auto_delete_secs)
    }

    pub fn group_send_delay(&self) -> Duration {
        Duration::from_millis(self.group_send_delay_ms)
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BotConfig::default();
        assert_eq!(config.max_file_size, 10 * 1024 * 1024 * 1024);
        assert_eq!(config.auto_delete_secs, 600);
        assert_eq!(config.group_send_delay(), Duration::from_millis(100));
        assert_eq!(config.health_check_port, 8000);
    }

    #[test]
    fn test_development_config_validates() {
        let config = BotConfig::development();
        assert!(config.validate().is_ok());
        assert!(config.is_admin(1));
        assert!(!config.is_admin(2));
    }

    #[test]
    fn test_validate_rejects_missing_token() {
        let config = BotConfig {
            bot_username: "bot".to_string(),
            ..BotConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_admin_ids_skips_garbage() {
        assert_eq!(parse_admin_ids("12, 34,,abc, 56"), vec![12, 34, 56]);
        assert!(parse_admin_ids("").is_empty());
    }
}
