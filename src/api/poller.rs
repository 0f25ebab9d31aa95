use crate::AppState;
use crate::api::dispatcher::handle_update;
use crate::services::transport::UpdateSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Long-polls the Bot API and hands each update to its own task.
pub struct UpdatePoller {
    source: Arc<dyn UpdateSource>,
    state: AppState,
    shutdown: watch::Receiver<bool>,
}

impl UpdatePoller {
    pub fn new(
        source: Arc<dyn UpdateSource>,
        state: AppState,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            state,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("🤖 Update poller started");
        let timeout = self.state.config.poll_timeout_secs;
        let mut offset: i64 = 0;

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    tracing::info!("Update poller received shutdown signal");
                    break;
                }
                result = self.source.get_updates(offset, timeout) => match result {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            let state = self.state.clone();
                            tokio::spawn(async move {
                                handle_update(&state, update).await;
                            });
                        }
                    }
                    Err(e) => {
                        tracing::error!("❌ Polling failed: {}. Retrying in {:?}", e, RETRY_DELAY);
                        tokio::select! {
                            _ = self.shutdown.changed() => break,
                            _ = tokio::time::sleep(RETRY_DELAY) => {}
                        }
                    }
                }
            }
        }

        tracing::info!("🤖 Update poller stopped");
    }
}
