use crate::config::BotConfig;
use crate::services::transport::TelegramTransport;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub fn setup_transport(config: &BotConfig) -> anyhow::Result<Arc<TelegramTransport>> {
    // Long polls hold the request open for the poll timeout.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.poll_timeout_secs + 30))
        .build()?;

    info!("📡 Bot API endpoint: {}", config.telegram_api_url);

    Ok(Arc::new(TelegramTransport::new(
        client,
        config.telegram_api_url.clone(),
        config.bot_token.clone(),
    )))
}
