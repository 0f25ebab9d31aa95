use crate::entities::files::MediaKind;
use crate::models::{ApiResponse, SentMessage, Update};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;

pub type ChatId = i64;
pub type MessageId = i32;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("message not found")]
    MessageNotFound,

    #[error("api error {code}: {description}")]
    Api { code: i32, description: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("decode error: {0}")]
    Decode(String),
}

/// Messaging channel that doubles as the blob store: a storage reference
/// handed out on upload can be re-sent to any chat.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_media(
        &self,
        chat_id: ChatId,
        kind: MediaKind,
        storage_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageId, TransportError>;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageId, TransportError>;

    /// Fails with `MessageNotFound` when the message is already gone.
    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TransportError>;
}

#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError>;
}

pub struct TelegramTransport {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl TelegramTransport {
    pub fn new(client: reqwest::Client, api_url: String, token: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, TransportError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        if envelope.ok {
            return envelope
                .result
                .ok_or_else(|| TransportError::Decode(format!("{} returned no result", method)));
        }

        let description = envelope.description.unwrap_or_default();
        let code = envelope.error_code.unwrap_or(0);
        if code == 400 && is_missing_message(&description) {
            return Err(TransportError::MessageNotFound);
        }
        Err(TransportError::Api { code, description })
    }
}

fn is_missing_message(description: &str) -> bool {
    let lowered = description.to_lowercase();
    lowered.contains("message to delete not found") || lowered.contains("message can't be deleted")
}

/// Bot API method and payload field used to send each media kind.
pub fn send_method(kind: MediaKind) -> (&'static str, &'static str) {
    match kind {
        MediaKind::Photo => ("sendPhoto", "photo"),
        MediaKind::Video => ("sendVideo", "video"),
        MediaKind::Audio => ("sendAudio", "audio"),
        MediaKind::Voice => ("sendVoice", "voice"),
        MediaKind::VideoNote => ("sendVideoNote", "video_note"),
        MediaKind::Document => ("sendDocument", "document"),
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_media(
        &self,
        chat_id: ChatId,
        kind: MediaKind,
        storage_ref: &str,
        caption: Option<&str>,
    ) -> Result<MessageId, TransportError> {
        let (method, field) = send_method(kind);
        let mut body = json!({ "chat_id": chat_id });
        body[field] = json!(storage_ref);
        // Round videos reject captions outright.
        if let Some(caption) = caption.filter(|_| kind != MediaKind::VideoNote) {
            body["caption"] = json!(caption);
        }

        let sent: SentMessage = self.call(method, body).await?;
        Ok(sent.message_id)
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageId, TransportError> {
        let sent: SentMessage = self
            .call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(sent.message_id)
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "deleteMessage",
                json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for TelegramTransport {
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }
}
