pub use super::authorized_users::Entity as AuthorizedUsers;
pub use super::bot_settings::Entity as BotSettings;
pub use super::file_groups::Entity as FileGroups;
pub use super::file_links::Entity as FileLinks;
pub use super::files::Entity as Files;
