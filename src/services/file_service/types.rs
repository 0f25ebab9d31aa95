use crate::entities::{file_groups, file_links, files, files::MediaKind};

/// A file received from a user but not yet written to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub kind: MediaKind,
    pub file_name: String,
    pub file_size: i64,
    // Opaque reference the transport can re-send from
    pub storage_ref: String,
}

/// Outcome of one committed batch.
#[derive(Debug, Clone)]
pub struct CommittedBatch {
    pub group: file_groups::Model,
    pub files: Vec<files::Model>,
}

impl CommittedBatch {
    pub fn serial_numbers(&self) -> Vec<i32> {
        self.files.iter().map(|f| f.serial_number).collect()
    }
}

#[derive(Debug, Clone)]
pub struct GroupDetails {
    pub group: file_groups::Model,
    pub preview: Vec<files::Model>,
    pub link: Option<file_links::Model>,
}
