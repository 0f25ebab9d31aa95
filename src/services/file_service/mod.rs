use sea_orm::DatabaseConnection;

pub mod delete;
pub mod query;
pub mod types;
pub mod upload;

pub use types::{CommittedBatch, GroupDetails, StagedFile};

/// Number of files shown in a group overview.
pub const GROUP_PREVIEW_LIMIT: u64 = 10;

#[derive(Clone)]
pub struct FileService {
    db: DatabaseConnection,
}

impl FileService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}
