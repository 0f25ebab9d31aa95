use super::{CommandResult, Sender};
use crate::AppState;
use crate::services::delivery::DeliveryRequest;

/// `/start` with a code is a deep-link access and open to anyone.
pub async fn start(state: &AppState, sender: &Sender, code: Option<&str>) -> CommandResult {
    if let Some(code) = code {
        let request = DeliveryRequest {
            chat_id: sender.chat_id,
            request_message_id: sender.message_id,
        };
        state.delivery.deliver(request, code).await;
        return Ok(None);
    }

    if !state.auth.is_authorized(sender.user_id).await {
        return Ok(Some(unauthorized_text(state)));
    }

    let name = sender.first_name.as_deref().unwrap_or("there");
    Ok(Some(format!(
        "Welcome, {}! 👋\n\nStore files in groups and share them with a link.\nSend /help to see every command.",
        name
    )))
}

pub fn unauthorized_text(state: &AppState) -> String {
    match &state.config.admin_contact {
        Some(contact) => format!(
            "You are not authorized to use this bot. 🚫\nContact {} for access.",
            contact
        ),
        None => "You are not authorized to use this bot. 🚫".to_string(),
    }
}

pub fn help(state: &AppState, sender: &Sender) -> CommandResult {
    let mut text = String::from(
        "📚 Commands\n\n\
         Uploading\n\
         /upload <group> - store the next file you send\n\
         /bulkupload <group> - collect files until /finish\n\
         /addfiles <group> - add files to an existing group\n\
         /finish - save the collected files\n\
         /cancel - drop the current upload\n\n\
         Groups\n\
         /groups - list your groups\n\
         /group <group> - group details\n\
         /files <group> - every file in a group\n\
         /deletefile <group> <n> - delete file number n\n\
         /deletegroup <group> - delete a group and its files\n\n\
         Links\n\
         /getlink <group> <n> - share one file\n\
         /getgrouplink <group> - share a whole group\n\
         /revokelink <code> - disable a link\n\
         /linkstatus <code> - check a link\n\n\
         /mycaption on|off - captions on your files",
    );

    if state.auth.is_admin(sender.user_id) {
        text.push_str(
            "\n\n🛠 Admin\n\
             /caption on|off - global captions\n\
             /setcaption <text> - caption text\n\
             /adduser <id> - authorize a user\n\
             /removeuser <id> - revoke a user\n\
             /listusers - authorized users\n\
             /botstats - usage statistics",
        );
    }

    Ok(Some(text))
}
