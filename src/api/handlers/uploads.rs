use super::{CommandResult, Sender};
use crate::AppState;
use crate::api::error::AppError;
use crate::models::Message;
use crate::services::bulk_session::Accepted;
use crate::utils::format::{format_size, serial_tag};

pub async fn upload(state: &AppState, sender: &Sender, group: &str) -> CommandResult {
    state.sessions.start_single(sender.user_id, group).await;
    Ok(Some(format!(
        "Send the file to store in '{}'. 📤\nUse /cancel to stop.",
        group
    )))
}

pub async fn bulk_upload(state: &AppState, sender: &Sender, group: &str) -> CommandResult {
    state.sessions.start(sender.user_id, group).await;
    Ok(Some(format!(
        "Bulk upload to '{}' started. 📦\nSend your files, then /finish to save or /cancel to discard.",
        group
    )))
}

/// Bulk session bound to a group that must already exist.
pub async fn add_files(state: &AppState, sender: &Sender, group: &str) -> CommandResult {
    let group = state.files.find_group(sender.user_id, group).await?;
    state.sessions.start(sender.user_id, &group.name).await;
    Ok(Some(format!(
        "Adding files to '{}' (currently {} files). 📦\nSend your files, then /finish.",
        group.name, group.total_files
    )))
}

pub async fn finish(state: &AppState, sender: &Sender) -> CommandResult {
    let report = state.sessions.finish(sender.user_id).await?;
    if report.persisted == 0 {
        return Ok(Some(format!(
            "No files were sent for '{}'. Nothing saved. ℹ️",
            report.group_name
        )));
    }

    let (total_files, total_size) = report
        .committed
        .as_ref()
        .map(|c| (c.group.total_files, c.group.total_size))
        .unwrap_or_default();

    Ok(Some(format!(
        "✅ Saved {} file(s) to '{}'.\nGroup now has {} files ({}).\nUse /getgrouplink {} to share it.",
        report.persisted,
        report.group_name,
        total_files,
        format_size(total_size),
        report.group_name
    )))
}

pub async fn cancel(state: &AppState, sender: &Sender) -> CommandResult {
    let text = match state.sessions.cancel(sender.user_id).await {
        Some(session) => format!(
            "Upload to '{}' cancelled. {} staged file(s) discarded. 🛑",
            session.group_name,
            session.files.len()
        ),
        None => "No active upload to cancel. ℹ️".to_string(),
    };
    Ok(Some(text))
}

/// A file message from an authorized user.
pub async fn receive_file(state: &AppState, sender: &Sender, message: &Message) -> CommandResult {
    let Some(file) = message.extract_file() else {
        return Ok(None);
    };

    if file.file_size > state.config.max_file_size {
        return Err(AppError::BadRequest(format!(
            "File too large: {} (limit {})",
            format_size(file.file_size),
            format_size(state.config.max_file_size)
        )));
    }

    if state.sessions.session(sender.user_id).is_none() {
        return Err(AppError::Session(
            "Invalid action. Start with /upload <group> or /bulkupload <group> first".to_string(),
        ));
    }

    let text = match state.sessions.accept(sender.user_id, file).await? {
        Accepted::Staged { group_name, count } => {
            format!("Staged file {} for '{}'. Send more or /finish. 📥", count, group_name)
        }
        Accepted::Committed(report) => {
            let stored = report
                .committed
                .as_ref()
                .and_then(|c| c.files.first())
                .map(|f| format!("{} {}", serial_tag(f.serial_number), f.file_name))
                .unwrap_or_default();
            format!(
                "✅ Stored {} in '{}'.\nUse /getlink to share it.",
                stored, report.group_name
            )
        }
    };
    Ok(Some(text))
}
