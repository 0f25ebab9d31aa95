use crate::api::error::AppError;
use crate::config::BotConfig;
use crate::entities::{prelude::*, *};
use crate::services::caption::CaptionResolver;
use crate::services::file_service::FileService;
use crate::services::link_service::{LinkService, LinkTarget};
use crate::services::scheduler::AutoDeleteScheduler;
use crate::services::transport::{ChatId, MessageId, Transport};
use crate::utils::format::format_delay;
use sea_orm::{DatabaseConnection, EntityTrait};
use std::sync::Arc;

/// Failed names listed individually in a group summary.
const MAX_LISTED_FAILURES: usize = 5;

/// The incoming access request a delivery answers.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryRequest {
    pub chat_id: ChatId,
    pub request_message_id: MessageId,
}

/// Messages produced by one delivery, removed together later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryBatch {
    pub chat_id: ChatId,
    pub message_ids: Vec<MessageId>,
}

#[derive(Debug, Clone)]
pub struct GroupDeliveryReport {
    pub group_name: String,
    pub total: usize,
    pub delivered: usize,
    pub failed: Vec<String>,
    pub batch: DeliveryBatch,
}

#[derive(Debug, Clone)]
pub enum DeliveryOutcome {
    /// Unknown, revoked or dangling link.
    NotFound,
    /// Nothing was delivered; the requester got an error reply.
    Failed,
    Single(DeliveryBatch),
    Group(GroupDeliveryReport),
}

/// Final reply for a group delivery.
pub fn summarize(group_name: &str, total: usize, delivered: usize, failed: &[String]) -> String {
    if !failed.is_empty() {
        let mut text = format!(
            "Completed forwarding for group '{}', but encountered errors with some files: ❌\n",
            group_name
        );
        let listed: Vec<String> = failed
            .iter()
            .take(MAX_LISTED_FAILURES)
            .map(|name| format!("- {}", name))
            .collect();
        text.push_str(&listed.join("\n"));
        if failed.len() > MAX_LISTED_FAILURES {
            text.push_str(&format!(
                "\n...and {} more.",
                failed.len() - MAX_LISTED_FAILURES
            ));
        }
        text
    } else if delivered == 0 && total > 0 {
        format!(
            "No files could be forwarded from group '{}'. They might be unavailable or the bot lacks permissions. 😔",
            group_name
        )
    } else {
        format!(
            "All {} files from group '{}' forwarded successfully! ✅",
            delivered, group_name
        )
    }
}

/// Resolves link codes and sends the files behind them. Only ever reads
/// file and group rows; the click counter is the single write.
#[derive(Clone)]
pub struct DeliveryService {
    db: DatabaseConnection,
    transport: Arc<dyn Transport>,
    links: LinkService,
    captions: CaptionResolver,
    scheduler: AutoDeleteScheduler,
    config: BotConfig,
}

impl DeliveryService {
    pub fn new(
        db: DatabaseConnection,
        transport: Arc<dyn Transport>,
        links: LinkService,
        captions: CaptionResolver,
        scheduler: AutoDeleteScheduler,
        config: BotConfig,
    ) -> Self {
        Self {
            db,
            transport,
            links,
            captions,
            scheduler,
            config,
        }
    }

    /// Answers a deep-link request end to end, including the replies the
    /// requester sees. Never returns an error: every failure becomes a reply.
    pub async fn deliver(&self, request: DeliveryRequest, link_code: &str) -> DeliveryOutcome {
        let target = match self.links.resolve(link_code).await {
            Ok(target) => target,
            Err(e) if e.is_not_found() => {
                self.reply(request.chat_id, "Invalid or Expired Link 🚫").await;
                return DeliveryOutcome::NotFound;
            }
            Err(e) => {
                tracing::error!("Link access error for link code {}: {}", link_code, e);
                self.reply(request.chat_id, "Error accessing file. Please try again. 😔")
                    .await;
                return DeliveryOutcome::Failed;
            }
        };

        let outcome = match target {
            LinkTarget::File(file_id) => self.deliver_file(request, file_id).await,
            LinkTarget::Group(group_id) => self.deliver_group(request, group_id).await,
        };

        match outcome {
            Ok(outcome) => outcome,
            Err(e) if e.is_not_found() => {
                self.reply(request.chat_id, &format!("{} 🚫", not_found_text(&e)))
                    .await;
                DeliveryOutcome::NotFound
            }
            Err(e) => {
                tracing::error!("Delivery for link code {} failed: {}", link_code, e);
                self.reply(request.chat_id, "Error accessing file. Please try again. 😔")
                    .await;
                DeliveryOutcome::Failed
            }
        }
    }

    async fn deliver_file(
        &self,
        request: DeliveryRequest,
        file_id: i32,
    ) -> Result<DeliveryOutcome, AppError> {
        let file = Files::find_by_id(file_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let caption = self.captions.caption_for(&file, None).await;

        let sent = match self.send_file(request.chat_id, &file, &caption).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Error forwarding single file '{}': {}", file.file_name, e);
                self.reply(request.chat_id, "Error forwarding file. 😔").await;
                return Ok(DeliveryOutcome::Failed);
            }
        };

        let batch = DeliveryBatch {
            chat_id: request.chat_id,
            message_ids: vec![request.request_message_id, sent],
        };
        self.schedule(&batch);
        Ok(DeliveryOutcome::Single(batch))
    }

    async fn deliver_group(
        &self,
        request: DeliveryRequest,
        group_id: i32,
    ) -> Result<DeliveryOutcome, AppError> {
        let group = FileGroups::find_by_id(group_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        let members = FileService::group_files(&self.db, group.id).await?;
        // An empty group only leaves its status reply behind to clean up.
        let mut batch = DeliveryBatch {
            chat_id: request.chat_id,
            message_ids: if members.is_empty() {
                Vec::new()
            } else {
                vec![request.request_message_id]
            },
        };

        // 1. Status message; nothing else goes out if it cannot be sent
        let status_text = if members.is_empty() {
            format!(
                "Group '{}' is empty or files are unavailable. 🤷‍♂️",
                group.name
            )
        } else {
            format!(
                "Forwarding {} files from '{}' 📦\n\nAuto-delete in {}... ⏳",
                members.len(),
                group.name,
                format_delay(self.config.auto_delete_after())
            )
        };
        let status_id = self
            .transport
            .send_text(request.chat_id, &status_text)
            .await?;
        batch.message_ids.push(status_id);

        // 2. Files in serial order, one at a time
        let mut failed = Vec::new();
        let mut delivered = 0;
        for (index, file) in members.iter().enumerate() {
            if index > 0 && !self.config.group_send_delay().is_zero() {
                tokio::time::sleep(self.config.group_send_delay()).await;
            }

            let caption = self
                .captions
                .caption_for(file, Some(file.serial_number))
                .await;

            match self.send_file(request.chat_id, file, &caption).await {
                Ok(message_id) => {
                    batch.message_ids.push(message_id);
                    delivered += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Error forwarding file '{}' (#{}) in group '{}': {}",
                        file.file_name,
                        file.serial_number,
                        group.name,
                        e
                    );
                    failed.push(file.file_name.clone());
                }
            }
        }

        // 3. Summary
        if !members.is_empty() {
            let summary = summarize(&group.name, members.len(), delivered, &failed);
            self.reply(request.chat_id, &summary).await;
        }

        tracing::info!(
            "📤 Group '{}' delivered to chat {}: {}/{} sent",
            group.name,
            request.chat_id,
            delivered,
            members.len()
        );

        self.schedule(&batch);
        Ok(DeliveryOutcome::Group(GroupDeliveryReport {
            group_name: group.name,
            total: members.len(),
            delivered,
            failed,
            batch,
        }))
    }

    async fn send_file(
        &self,
        chat_id: ChatId,
        file: &files::Model,
        caption: &str,
    ) -> Result<MessageId, AppError> {
        let caption = match file.file_type {
            files::MediaKind::VideoNote => None,
            _ => Some(caption),
        };
        let id = self
            .transport
            .send_media(chat_id, file.file_type, &file.storage_ref, caption)
            .await?;
        Ok(id)
    }

    fn schedule(&self, batch: &DeliveryBatch) {
        self.scheduler.schedule(
            batch.chat_id,
            batch.message_ids.clone(),
            self.config.auto_delete_after(),
        );
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.transport.send_text(chat_id, text).await {
            tracing::warn!("Could not reply in chat {}: {}", chat_id, e);
        }
    }
}

fn not_found_text(err: &AppError) -> &str {
    match err {
        AppError::NotFound(msg) => msg,
        _ => "Not found",
    }
}
