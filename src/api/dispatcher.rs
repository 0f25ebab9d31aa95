use crate::AppState;
use crate::api::commands::{Command, ParseError};
use crate::api::error::AppError;
use crate::api::handlers::{
    CommandResult, Sender, admin, general, groups, links, settings, uploads,
};
use crate::models::{Message, Update};

/// Handles one update. Every failure ends up as a reply; nothing propagates.
pub async fn handle_update(state: &AppState, update: Update) {
    let Some(message) = update.message else {
        return;
    };
    let (Some(user_id), Some(chat_id)) = (message.sender_id(), message.chat_id()) else {
        return;
    };

    let sender = Sender {
        user_id,
        chat_id,
        message_id: message.message_id,
        username: message.from.as_ref().and_then(|u| u.username.clone()),
        first_name: message.from.as_ref().and_then(|u| u.first_name.clone()),
    };

    // One user's updates are handled in arrival order.
    state
        .user_lanes
        .scoped(&user_id, respond(state, &sender, &message))
        .await;
}

async fn respond(state: &AppState, sender: &Sender, message: &Message) {
    let chat_id = sender.chat_id;
    let result = route(state, sender, message).await;
    let reply = match result {
        Ok(Some(text)) => text,
        Ok(None) => return,
        Err(e) => e.user_message(),
    };

    if let Err(e) = state.transport.send_text(chat_id, &reply).await {
        tracing::warn!("Reply to chat {} failed: {}", chat_id, e);
    }
}

async fn route(state: &AppState, sender: &Sender, message: &Message) -> CommandResult {
    if let Some(text) = message.text.as_deref() {
        return match Command::parse(text, &state.config.bot_username) {
            Ok(command) => run_command(state, sender, command).await,
            Err(ParseError::NotACommand) | Err(ParseError::OtherBot) => Ok(None),
            Err(ParseError::Unknown(_)) => Err(AppError::BadRequest(
                "Unknown command. Send /help for the list".to_string(),
            )),
            Err(e @ ParseError::Usage(_)) => Err(AppError::BadRequest(e.to_string())),
        };
    }

    if message.extract_file().is_some() {
        if !state.auth.is_authorized(sender.user_id).await {
            return Ok(Some(general::unauthorized_text(state)));
        }
        return uploads::receive_file(state, sender, message).await;
    }

    Ok(None)
}

async fn run_command(state: &AppState, sender: &Sender, command: Command) -> CommandResult {
    // Deep links and the welcome screen check access themselves
    if let Command::Start(code) = &command {
        return general::start(state, sender, code.as_deref()).await;
    }

    if !state.auth.is_authorized(sender.user_id).await {
        return Ok(Some(general::unauthorized_text(state)));
    }
    if command.is_admin_only() && !state.auth.is_admin(sender.user_id) {
        return Err(AppError::Unauthorized(
            "This command is for admins only".to_string(),
        ));
    }

    tracing::debug!("Command {:?} from user {}", command, sender.user_id);

    match command {
        Command::Start(_) => Ok(None),
        Command::Help => general::help(state, sender),
        Command::Upload(group) => uploads::upload(state, sender, &group).await,
        Command::BulkUpload(group) => uploads::bulk_upload(state, sender, &group).await,
        Command::AddFiles(group) => uploads::add_files(state, sender, &group).await,
        Command::Finish => uploads::finish(state, sender).await,
        Command::Cancel => uploads::cancel(state, sender).await,
        Command::Groups => groups::list(state, sender).await,
        Command::Group(name) => groups::details(state, sender, &name).await,
        Command::Files(name) => groups::files(state, sender, &name).await,
        Command::GetLink { group, serial } => {
            links::get_file_link(state, sender, &group, serial).await
        }
        Command::GetGroupLink(group) => links::get_group_link(state, sender, &group).await,
        Command::RevokeLink(code) => links::revoke(state, sender, &code).await,
        Command::LinkStatus(code) => links::status(state, sender, &code).await,
        Command::DeleteFile { group, serial } => {
            groups::delete_file(state, sender, &group, serial).await
        }
        Command::DeleteGroup(name) => groups::delete_group(state, sender, &name).await,
        Command::MyCaption(enabled) => settings::my_caption(state, sender, enabled).await,
        Command::Caption(enabled) => settings::global_caption(state, enabled).await,
        Command::SetCaption(text) => settings::set_caption(state, &text).await,
        Command::AddUser(id) => admin::add_user(state, sender, id).await,
        Command::RemoveUser(id) => admin::remove_user(state, id).await,
        Command::ListUsers => admin::list_users(state).await,
        Command::BotStats => admin::stats(state).await,
    }
}
