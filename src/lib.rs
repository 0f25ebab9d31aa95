pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::BotConfig;
use crate::services::auth_service::AuthService;
use crate::services::bulk_session::BulkSessionManager;
use crate::services::caption::CaptionResolver;
use crate::services::delivery::DeliveryService;
use crate::services::file_service::FileService;
use crate::services::link_service::LinkService;
use crate::services::scheduler::AutoDeleteScheduler;
use crate::services::settings_service::SettingsService;
use crate::services::transport::Transport;
use crate::utils::keyed_mutex::KeyedMutex;
use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: BotConfig,
    pub transport: Arc<dyn Transport>,
    pub auth: AuthService,
    pub files: FileService,
    pub links: LinkService,
    pub settings: SettingsService,
    pub sessions: Arc<BulkSessionManager>,
    pub delivery: DeliveryService,
    /// Keeps one user's updates in arrival order
    pub user_lanes: Arc<KeyedMutex<i64>>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: BotConfig,
        transport: Arc<dyn Transport>,
        scheduler: AutoDeleteScheduler,
    ) -> Self {
        let files = FileService::new(db.clone());
        let links = LinkService::new(db.clone());
        let settings = SettingsService::new(db.clone(), config.custom_caption.clone());
        let captions = CaptionResolver::new(settings.clone(), config.clone());
        let delivery = DeliveryService::new(
            db.clone(),
            transport.clone(),
            links.clone(),
            captions,
            scheduler,
            config.clone(),
        );

        Self {
            auth: AuthService::new(db.clone(), config.admin_ids.clone()),
            sessions: Arc::new(BulkSessionManager::new(files.clone())),
            user_lanes: Arc::new(KeyedMutex::new()),
            db,
            config,
            transport,
            files,
            links,
            settings,
            delivery,
        }
    }
}

/// Liveness endpoint for the hosting platform. Shares nothing with the bot.
pub fn create_health_router() -> Router {
    Router::new().route("/healthz", get(api::handlers::health::healthz))
}
