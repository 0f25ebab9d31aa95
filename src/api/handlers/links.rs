use super::{CommandResult, Sender};
use crate::AppState;
use crate::services::link_service::{LinkService, LinkStatus, LinkTarget};

pub async fn get_file_link(
    state: &AppState,
    sender: &Sender,
    group: &str,
    serial: i32,
) -> CommandResult {
    let file = state.files.find_file(sender.user_id, group, serial).await?;
    let code = state
        .links
        .get_or_create(sender.user_id, LinkTarget::File(file.id))
        .await?;

    Ok(Some(format!(
        "🔗 Link for #{:03} {}\n\n{}",
        file.serial_number,
        file.file_name,
        LinkService::share_url(&state.config.bot_username, &code)
    )))
}

pub async fn get_group_link(state: &AppState, sender: &Sender, group: &str) -> CommandResult {
    let group = state.files.find_group(sender.user_id, group).await?;
    let code = state
        .links
        .get_or_create(sender.user_id, LinkTarget::Group(group.id))
        .await?;

    Ok(Some(format!(
        "🔗 Link for group '{}' ({} files)\n\n{}",
        group.name,
        group.total_files,
        LinkService::share_url(&state.config.bot_username, &code)
    )))
}

pub async fn revoke(state: &AppState, sender: &Sender, code: &str) -> CommandResult {
    if state.links.revoke(code, sender.user_id).await? {
        Ok(Some(format!("Link {} revoked. ✅", code)))
    } else {
        Ok(Some(format!(
            "Link {} is not active or does not belong to you. 🤷‍♂️",
            code
        )))
    }
}

pub async fn status(state: &AppState, sender: &Sender, code: &str) -> CommandResult {
    let text = match state.links.link_status(code, sender.user_id).await? {
        LinkStatus::Active(link) => format!(
            "Link {} is active ✅\nType: {:?}\nClicks: {}\nCreated: {}",
            link.link_code,
            link.link_type,
            link.clicks,
            link.created_at.format("%Y-%m-%d %H:%M")
        ),
        LinkStatus::Inactive(link) => format!(
            "Link {} was revoked 🚫\nClicks: {}",
            link.link_code, link.clicks
        ),
        LinkStatus::NotFound => format!("Link {} not found 🤷‍♂️", code),
    };
    Ok(Some(text))
}
