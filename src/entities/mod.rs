pub mod prelude;

pub mod authorized_users;
pub mod bot_settings;
pub mod file_groups;
pub mod file_links;
pub mod files;
