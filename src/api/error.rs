use crate::services::transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Session: {0}")]
    Session(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    /// Text shown to the chat user for this error. Persistence and internal
    /// failures are logged here and collapse into a generic retry message.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Something went wrong on our side. Please try again. 😔".to_string()
            }
            AppError::NotFound(msg) => format!("{} 🤷‍♂️", msg),
            AppError::Transport(e) => {
                tracing::error!("Transport error: {}", e);
                "Could not deliver the message. Please try again. 😔".to_string()
            }
            AppError::Session(msg) => format!("{} ℹ️", msg),
            AppError::Unauthorized(msg) => format!("{} 🚫", msg),
            AppError::BadRequest(msg) => format!("{} ❌", msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Something went wrong on our side. Please try again. 😔".to_string()
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}
