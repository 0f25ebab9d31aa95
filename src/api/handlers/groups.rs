use super::{CommandResult, Sender};
use crate::AppState;
use crate::services::link_service::LinkService;
use crate::utils::format::{format_size, serial_tag};

pub async fn list(state: &AppState, sender: &Sender) -> CommandResult {
    let groups = state.files.list_groups(sender.user_id).await?;
    if groups.is_empty() {
        return Ok(Some(
            "You have no groups yet. Start with /upload or /bulkupload. 📂".to_string(),
        ));
    }

    let mut text = format!("📂 Your groups ({})\n", groups.len());
    for group in groups {
        text.push_str(&format!(
            "\n• {} - {} files, {}",
            group.name,
            group.total_files,
            format_size(group.total_size)
        ));
    }
    Ok(Some(text))
}

pub async fn details(state: &AppState, sender: &Sender, name: &str) -> CommandResult {
    let details = state.files.group_details(sender.user_id, name).await?;
    let group = &details.group;

    let mut text = format!(
        "📁 {}\nFiles: {}\nSize: {}\nCreated: {}\n",
        group.name,
        group.total_files,
        format_size(group.total_size),
        group.created_at.format("%Y-%m-%d %H:%M")
    );

    for file in &details.preview {
        text.push_str(&format!(
            "\n{} {} ({}, {})",
            serial_tag(file.serial_number),
            file.file_name,
            file.file_type.label(),
            format_size(file.file_size)
        ));
    }
    if group.total_files as usize > details.preview.len() {
        text.push_str(&format!(
            "\n...and {} more. Use /files {}",
            group.total_files as usize - details.preview.len(),
            group.name
        ));
    }

    match &details.link {
        Some(link) => text.push_str(&format!(
            "\n\n🔗 {} ({} clicks)",
            LinkService::share_url(&state.config.bot_username, &link.link_code),
            link.clicks
        )),
        None => text.push_str(&format!("\n\nNo group link yet. Use /getgrouplink {}", group.name)),
    }

    Ok(Some(text))
}

pub async fn files(state: &AppState, sender: &Sender, name: &str) -> CommandResult {
    let (group, files) = state.files.list_files(sender.user_id, name).await?;
    if files.is_empty() {
        return Ok(Some(format!("Group '{}' is empty. 🤷‍♂️", group.name)));
    }

    let mut text = format!("📄 Files in '{}'\n", group.name);
    for file in files {
        text.push_str(&format!(
            "\n{} {} ({})",
            serial_tag(file.serial_number),
            file.file_name,
            format_size(file.file_size)
        ));
    }
    Ok(Some(text))
}

pub async fn delete_file(
    state: &AppState,
    sender: &Sender,
    group: &str,
    serial: i32,
) -> CommandResult {
    let file = state.files.delete_file(sender.user_id, group, serial).await?;
    Ok(Some(format!(
        "Deleted {} {} from '{}'. 🗑️",
        serial_tag(file.serial_number),
        file.file_name,
        group
    )))
}

pub async fn delete_group(state: &AppState, sender: &Sender, name: &str) -> CommandResult {
    let group = state.files.delete_group(sender.user_id, name).await?;
    Ok(Some(format!(
        "Deleted group '{}' and its {} files. 🗑️",
        group.name, group.total_files
    )))
}
