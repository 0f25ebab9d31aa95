pub mod auth_service;
pub mod bulk_session;
pub mod caption;
pub mod delivery;
pub mod file_service;
pub mod link_service;
pub mod scheduler;
pub mod settings_service;
pub mod stats;
pub mod transport;
