pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod poller;
