#![allow(dead_code)]

use async_trait::async_trait;
use rust_filestore_bot::AppState;
use rust_filestore_bot::config::BotConfig;
use rust_filestore_bot::entities::files::MediaKind;
use rust_filestore_bot::infrastructure::database;
use rust_filestore_bot::services::file_service::StagedFile;
use rust_filestore_bot::services::scheduler::AutoDeleteScheduler;
use rust_filestore_bot::services::transport::{ChatId, MessageId, Transport, TransportError};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use std::sync::atomic::{AtomicI32, Ordering};

pub async fn setup_test_db() -> DatabaseConnection {
    // One pooled connection: every extra connection would open its own
    // empty in-memory database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

/// Full application state over a mock transport. Keep the returned sender
/// alive for as long as the scheduler should run.
pub fn test_state(
    db: DatabaseConnection,
    transport: Arc<MockTransport>,
    config: BotConfig,
) -> (AppState, watch::Sender<bool>) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (scheduler, _handle) = AutoDeleteScheduler::spawn(transport.clone(), shutdown_rx);
    (AppState::new(db, config, transport, scheduler), shutdown_tx)
}

pub fn staged(name: &str, size: i64) -> StagedFile {
    StagedFile {
        kind: MediaKind::Document,
        file_name: name.to_string(),
        file_size: size,
        storage_ref: format!("ref-{}", name),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Media {
        chat_id: ChatId,
        message_id: MessageId,
        kind: MediaKind,
        storage_ref: String,
        caption: Option<String>,
    },
    Text {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
    },
}

/// Records every send and delete. Storage refs listed in `failing` make
/// `send_media` fail; message ids in `gone` make deletes report
/// `MessageNotFound`.
pub struct MockTransport {
    next_id: AtomicI32,
    pub sent: Mutex<Vec<Sent>>,
    pub deleted: Mutex<Vec<(ChatId, MessageId)>>,
    failing: Mutex<HashSet<String>>,
    gone: Mutex<HashSet<MessageId>>,
    fail_text: Mutex<bool>,
    delete_attempts: Mutex<HashMap<MessageId, usize>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(1000),
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            gone: Mutex::new(HashSet::new()),
            fail_text: Mutex::new(false),
            delete_attempts: Mutex::new(HashMap::new()),
        }
    }

    pub fn fail_ref(&self, storage_ref: &str) {
        self.failing.lock().unwrap().insert(storage_ref.to_string());
    }

    pub fn mark_gone(&self, message_id: MessageId) {
        self.gone.lock().unwrap().insert(message_id);
    }

    pub fn fail_text_sends(&self) {
        *self.fail_text.lock().unwrap() = true;
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn media(&self) -> Vec<(String, Option<String>)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Sent::Media {
                    storage_ref,
                    caption,
                    ..
                } => Some((storage_ref.clone(), caption.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn deleted_ids(&self) -> Vec<MessageId> {
        let mut ids: Vec<_> = self.deleted.lock().unwrap().iter().map(|(_, id)| *id).collect();
        ids.sort();
        ids
    }

    pub fn delete_attempts(&self, message_id: MessageId) -> usize {
        self.delete_attempts
            .lock()
            .unwrap()
            .get(&message_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_media(
        &self,
        chat_id: ChatId,
        kind: MediaKind,
        storage_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageId, TransportError> {
        if self.failing.lock().unwrap().contains(storage_ref) {
            return Err(TransportError::Api {
                code: 400,
                description: "Bad Request: wrong file identifier".to_string(),
            });
        }
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(Sent::Media {
            chat_id,
            message_id,
            kind,
            storage_ref: storage_ref.to_string(),
            caption: caption.map(str::to_string),
        });
        Ok(message_id)
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageId, TransportError> {
        if *self.fail_text.lock().unwrap() {
            return Err(TransportError::Api {
                code: 403,
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        Ok(message_id)
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TransportError> {
        *self
            .delete_attempts
            .lock()
            .unwrap()
            .entry(message_id)
            .or_insert(0) += 1;
        if self.gone.lock().unwrap().contains(&message_id) {
            return Err(TransportError::MessageNotFound);
        }
        self.deleted.lock().unwrap().push((chat_id, message_id));
        Ok(())
    }
}
