pub mod admin;
pub mod general;
pub mod groups;
pub mod health;
pub mod links;
pub mod settings;
pub mod uploads;

use crate::api::error::AppError;

/// Reply text for a handled command; `None` when the handler already replied.
pub type CommandResult = Result<Option<String>, AppError>;

/// Who sent the update being handled.
#[derive(Debug, Clone)]
pub struct Sender {
    pub user_id: i64,
    pub chat_id: i64,
    pub message_id: i32,
    pub username: Option<String>,
    pub first_name: Option<String>,
}
