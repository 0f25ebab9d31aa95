use super::{CommandResult, Sender};
use crate::AppState;

pub async fn my_caption(state: &AppState, sender: &Sender, enabled: bool) -> CommandResult {
    state
        .settings
        .set_user_caption_disabled(sender.user_id, !enabled)
        .await?;
    Ok(Some(if enabled {
        "Captions on your files are enabled. ✅".to_string()
    } else {
        "Captions on your files are disabled. 🚫".to_string()
    }))
}

pub async fn global_caption(state: &AppState, enabled: bool) -> CommandResult {
    state.settings.set_caption_enabled(enabled).await?;
    Ok(Some(if enabled {
        "Captions enabled for all files. ✅".to_string()
    } else {
        "Captions disabled for all files. 🚫".to_string()
    }))
}

pub async fn set_caption(state: &AppState, text: &str) -> CommandResult {
    state.settings.set_custom_caption(text).await?;
    Ok(Some(format!("Caption text set to:\n{}", text.trim())))
}
