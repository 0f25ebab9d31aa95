use super::{CommandResult, Sender};
use crate::AppState;
use crate::services::stats::StatsService;
use crate::utils::format::format_size;

pub async fn add_user(state: &AppState, sender: &Sender, user_id: i64) -> CommandResult {
    let user = state
        .auth
        .add_user(user_id, None, None, sender.user_id)
        .await?;
    Ok(Some(format!("User {} can now use the bot. ✅", user.user_id)))
}

pub async fn remove_user(state: &AppState, user_id: i64) -> CommandResult {
    state.auth.remove_user(user_id).await?;
    Ok(Some(format!("User {} removed. 🚫", user_id)))
}

pub async fn list_users(state: &AppState) -> CommandResult {
    let users = state.auth.list_users().await?;
    if users.is_empty() {
        return Ok(Some("No authorized users. 🤷‍♂️".to_string()));
    }

    let mut text = format!("👥 Users ({})\n", users.len());
    for user in users {
        let name = user
            .username
            .as_deref()
            .map(|u| format!("@{}", u))
            .or(user.first_name.clone())
            .unwrap_or_else(|| "-".to_string());
        text.push_str(&format!(
            "\n{} {} | {} | {}",
            user.user_id,
            name,
            if user.is_active { "Active ✅" } else { "Inactive 🚫" },
            if user.caption_disabled {
                "No Caption 🚫"
            } else {
                "With Caption ✅"
            }
        ));
    }
    Ok(Some(text))
}

pub async fn stats(state: &AppState) -> CommandResult {
    let stats = StatsService::collect(&state.db).await?;
    Ok(Some(format!(
        "📊 Bot statistics\n\nUsers: {}\nGroups: {}\nFiles: {}\nActive links: {}\nTotal clicks: {}\nStored: {}\nOpen upload sessions: {}",
        stats.active_users,
        stats.groups,
        stats.files,
        stats.active_links,
        stats.total_clicks,
        format_size(stats.total_size),
        state.sessions.active_sessions()
    )))
}
