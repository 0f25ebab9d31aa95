use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(Option<String>),
    Help,
    Upload(String),
    BulkUpload(String),
    AddFiles(String),
    Finish,
    Cancel,
    Groups,
    Group(String),
    Files(String),
    GetLink { group: String, serial: i32 },
    GetGroupLink(String),
    RevokeLink(String),
    LinkStatus(String),
    DeleteFile { group: String, serial: i32 },
    DeleteGroup(String),
    MyCaption(bool),
    Caption(bool),
    SetCaption(String),
    AddUser(i64),
    RemoveUser(i64),
    ListUsers,
    BotStats,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("not a command")]
    NotACommand,

    /// Addressed to a different bot in a group chat.
    #[error("command for another bot")]
    OtherBot,

    #[error("unknown command /{0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

impl Command {
    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Command::Caption(_)
                | Command::SetCaption(_)
                | Command::AddUser(_)
                | Command::RemoveUser(_)
                | Command::ListUsers
                | Command::BotStats
        )
    }

    /// Parses `/name[@bot] args`. Arguments are whitespace separated except
    /// group names, which may contain spaces.
    pub fn parse(text: &str, bot_username: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        let Some(body) = text.strip_prefix('/') else {
            return Err(ParseError::NotACommand);
        };

        let (head, args) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };

        let name = match head.split_once('@') {
            Some((name, target)) => {
                if !target.eq_ignore_ascii_case(bot_username.trim_start_matches('@')) {
                    return Err(ParseError::OtherBot);
                }
                name
            }
            None => head,
        };

        let command = match name.to_lowercase().as_str() {
            "start" => Command::Start(optional(args)),
            "help" => Command::Help,
            "upload" => Command::Upload(required(args, "/upload <group name>")?),
            "bulkupload" => Command::BulkUpload(required(args, "/bulkupload <group name>")?),
            "addfiles" => Command::AddFiles(required(args, "/addfiles <group name>")?),
            "finish" => Command::Finish,
            "cancel" => Command::Cancel,
            "groups" => Command::Groups,
            "group" => Command::Group(required(args, "/group <group name>")?),
            "files" => Command::Files(required(args, "/files <group name>")?),
            "getlink" => {
                let (group, serial) = group_and_serial(args, "/getlink <group name> <file number>")?;
                Command::GetLink { group, serial }
            }
            "getgrouplink" => Command::GetGroupLink(required(args, "/getgrouplink <group name>")?),
            "revokelink" => Command::RevokeLink(single(args, "/revokelink <link code>")?),
            "linkstatus" => Command::LinkStatus(single(args, "/linkstatus <link code>")?),
            "deletefile" => {
                let (group, serial) =
                    group_and_serial(args, "/deletefile <group name> <file number>")?;
                Command::DeleteFile { group, serial }
            }
            "deletegroup" => Command::DeleteGroup(required(args, "/deletegroup <group name>")?),
            "mycaption" => Command::MyCaption(switch(args, "/mycaption on|off")?),
            "caption" => Command::Caption(switch(args, "/caption on|off")?),
            "setcaption" => Command::SetCaption(required(args, "/setcaption <text>")?),
            "adduser" => Command::AddUser(user_id(args, "/adduser <user id>")?),
            "removeuser" => Command::RemoveUser(user_id(args, "/removeuser <user id>")?),
            "listusers" => Command::ListUsers,
            "botstats" | "stats" => Command::BotStats,
            other => return Err(ParseError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

fn optional(args: &str) -> Option<String> {
    args.split_whitespace().next().map(str::to_string)
}

fn required(args: &str, usage: &'static str) -> Result<String, ParseError> {
    if args.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    Ok(args.to_string())
}

fn single(args: &str, usage: &'static str) -> Result<String, ParseError> {
    let mut parts = args.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(value), None) => Ok(value.to_string()),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn group_and_serial(args: &str, usage: &'static str) -> Result<(String, i32), ParseError> {
    let (group, serial) = args.rsplit_once(char::is_whitespace).ok_or(ParseError::Usage(usage))?;
    let serial = serial
        .trim_start_matches('#')
        .parse::<i32>()
        .map_err(|_| ParseError::Usage(usage))?;
    let group = group.trim();
    if group.is_empty() || serial < 1 {
        return Err(ParseError::Usage(usage));
    }
    Ok((group.to_string(), serial))
}

fn switch(args: &str, usage: &'static str) -> Result<bool, ParseError> {
    match args.to_lowercase().as_str() {
        "on" | "enable" | "1" => Ok(true),
        "off" | "disable" | "0" => Ok(false),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn user_id(args: &str, usage: &'static str) -> Result<i64, ParseError> {
    single(args, usage)?
        .parse()
        .map_err(|_| ParseError::Usage(usage))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: &str = "filestore_bot";

    #[test]
    fn test_start_with_and_without_code() {
        assert_eq!(Command::parse("/start", BOT), Ok(Command::Start(None)));
        assert_eq!(
            Command::parse("/start AbC123_-xyz0", BOT),
            Ok(Command::Start(Some("AbC123_-xyz0".to_string())))
        );
    }

    #[test]
    fn test_bot_suffix() {
        assert_eq!(Command::parse("/help@filestore_bot", BOT), Ok(Command::Help));
        assert_eq!(Command::parse("/help@Filestore_Bot", BOT), Ok(Command::Help));
        assert_eq!(
            Command::parse("/help@someone_else_bot", BOT),
            Err(ParseError::OtherBot)
        );
    }

    #[test]
    fn test_group_names_keep_spaces() {
        assert_eq!(
            Command::parse("/bulkupload  Season 1 Episodes ", BOT),
            Ok(Command::BulkUpload("Season 1 Episodes".to_string()))
        );
        assert_eq!(
            Command::parse("/getlink Season 1 #3", BOT),
            Ok(Command::GetLink {
                group: "Season 1".to_string(),
                serial: 3
            })
        );
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(
            Command::parse("/upload", BOT),
            Err(ParseError::Usage("/upload <group name>"))
        );
        assert!(matches!(
            Command::parse("/deletefile Docs zero", BOT),
            Err(ParseError::Usage(_))
        ));
        assert!(matches!(
            Command::parse("/deletefile 3", BOT),
            Err(ParseError::Usage(_))
        ));
        assert!(matches!(
            Command::parse("/adduser abc", BOT),
            Err(ParseError::Usage(_))
        ));
    }

    #[test]
    fn test_switches_and_admin_flag() {
        assert_eq!(Command::parse("/caption OFF", BOT), Ok(Command::Caption(false)));
        assert_eq!(Command::parse("/mycaption on", BOT), Ok(Command::MyCaption(true)));
        assert!(Command::Caption(true).is_admin_only());
        assert!(!Command::MyCaption(true).is_admin_only());
        assert!(!Command::Start(None).is_admin_only());
    }

    #[test]
    fn test_not_a_command_and_unknown() {
        assert_eq!(Command::parse("hello", BOT), Err(ParseError::NotACommand));
        assert_eq!(
            Command::parse("/frobnicate", BOT),
            Err(ParseError::Unknown("frobnicate".to_string()))
        );
    }
}
