use crate::api::error::AppError;
use crate::services::file_service::{CommittedBatch, FileService, StagedFile};
use crate::utils::format::generate_session_id;
use crate::utils::keyed_mutex::KeyedMutex;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Collects files until finished or cancelled.
    Bulk,
    /// Commits the first file received, then ends.
    Single,
}

/// In-progress upload for one user. Lives in memory only.
#[derive(Debug, Clone)]
pub struct BulkSession {
    pub session_id: String,
    pub group_name: String,
    pub files: Vec<StagedFile>,
    pub started_at: DateTime<Utc>,
    pub mode: SessionMode,
}

#[derive(Debug, Clone)]
pub struct FinishReport {
    pub group_name: String,
    pub persisted: usize,
    pub committed: Option<CommittedBatch>,
}

#[derive(Debug, Clone)]
pub enum Accepted {
    Staged { group_name: String, count: usize },
    Committed(FinishReport),
}

fn no_session() -> AppError {
    AppError::Session("No active upload session. Nothing to do".to_string())
}

/// Owns every user's upload session. All mutations for one user run under
/// that user's lock, so they never interleave; different users never wait
/// on each other.
pub struct BulkSessionManager {
    sessions: DashMap<i64, BulkSession>,
    locks: KeyedMutex<i64>,
    files: FileService,
}

impl BulkSessionManager {
    pub fn new(files: FileService) -> Self {
        Self {
            sessions: DashMap::new(),
            locks: KeyedMutex::new(),
            files,
        }
    }

    /// Opens a bulk session, silently replacing any existing one.
    pub async fn start(&self, user_id: i64, group_name: &str) -> BulkSession {
        self.open(user_id, group_name, SessionMode::Bulk).await
    }

    /// Opens a session that commits the next file on arrival.
    pub async fn start_single(&self, user_id: i64, group_name: &str) -> BulkSession {
        self.open(user_id, group_name, SessionMode::Single).await
    }

    async fn open(&self, user_id: i64, group_name: &str, mode: SessionMode) -> BulkSession {
        self.locks
            .scoped(&user_id, async { self.replace(user_id, group_name, mode) })
            .await
    }

    fn replace(&self, user_id: i64, group_name: &str, mode: SessionMode) -> BulkSession {
        let session = BulkSession {
            session_id: generate_session_id(),
            group_name: group_name.to_string(),
            files: Vec::new(),
            started_at: Utc::now(),
            mode,
        };

        if let Some(old) = self.sessions.insert(user_id, session.clone()) {
            tracing::info!(
                "Session {} for user {} superseded ({} staged file(s) discarded)",
                old.session_id,
                user_id,
                old.files.len()
            );
        }
        tracing::info!(
            "📥 {:?} session {} started for user {} -> '{}'",
            mode,
            session.session_id,
            user_id,
            group_name
        );
        session
    }

    /// Appends a file to the user's session and returns the staged count.
    pub async fn stage(&self, user_id: i64, file: StagedFile) -> Result<usize, AppError> {
        self.locks
            .scoped(&user_id, async { self.push(user_id, file) })
            .await
    }

    fn push(&self, user_id: i64, file: StagedFile) -> Result<usize, AppError> {
        let mut session = self.sessions.get_mut(&user_id).ok_or_else(no_session)?;
        session.files.push(file);
        Ok(session.files.len())
    }

    /// Routes an incoming file: staged for bulk sessions, committed right
    /// away for single sessions.
    pub async fn accept(&self, user_id: i64, file: StagedFile) -> Result<Accepted, AppError> {
        self.locks
            .scoped(&user_id, self.accept_locked(user_id, file))
            .await
    }

    async fn accept_locked(&self, user_id: i64, file: StagedFile) -> Result<Accepted, AppError> {
        let (mode, group_name) = self
            .sessions
            .get(&user_id)
            .map(|s| (s.mode, s.group_name.clone()))
            .ok_or_else(no_session)?;

        match mode {
            SessionMode::Bulk => {
                let count = self.push(user_id, file)?;
                Ok(Accepted::Staged { group_name, count })
            }
            SessionMode::Single => {
                // On failure the session stays open for another attempt.
                let committed = self
                    .files
                    .commit_batch(user_id, &group_name, std::slice::from_ref(&file))
                    .await?;
                self.sessions.remove(&user_id);
                Ok(Accepted::Committed(FinishReport {
                    group_name,
                    persisted: committed.files.len(),
                    committed: Some(committed),
                }))
            }
        }
    }

    /// Persists every staged file in one transaction and ends the session.
    /// A failed commit leaves the session and its files in place.
    pub async fn finish(&self, user_id: i64) -> Result<FinishReport, AppError> {
        self.locks
            .scoped(&user_id, self.finish_locked(user_id))
            .await
    }

    async fn finish_locked(&self, user_id: i64) -> Result<FinishReport, AppError> {
        tracing::info!("🔒 Scoped lock acquired for upload finish (User: {})", user_id);

        // Snapshot so no map guard is held across the commit.
        let session = self
            .sessions
            .get(&user_id)
            .map(|s| s.value().clone())
            .ok_or_else(no_session)?;

        if session.files.is_empty() {
            self.sessions.remove(&user_id);
            return Ok(FinishReport {
                group_name: session.group_name,
                persisted: 0,
                committed: None,
            });
        }

        let committed = self
            .files
            .commit_batch(user_id, &session.group_name, &session.files)
            .await?;

        self.sessions.remove(&user_id);
        tracing::info!(
            "✅ Session {} finished: {} file(s) into '{}'",
            session.session_id,
            committed.files.len(),
            session.group_name
        );

        Ok(FinishReport {
            group_name: session.group_name,
            persisted: committed.files.len(),
            committed: Some(committed),
        })
    }

    /// Drops the session if there is one.
    pub async fn cancel(&self, user_id: i64) -> Option<BulkSession> {
        self.locks
            .scoped(&user_id, async { self.remove(user_id) })
            .await
    }

    fn remove(&self, user_id: i64) -> Option<BulkSession> {
        let removed = self.sessions.remove(&user_id).map(|(_, s)| s);
        if let Some(session) = &removed {
            tracing::info!(
                "🛑 Session {} cancelled by user {} ({} staged file(s) dropped)",
                session.session_id,
                user_id,
                session.files.len()
            );
        }
        removed
    }

    pub fn session(&self, user_id: i64) -> Option<BulkSession> {
        self.sessions.get(&user_id).map(|s| s.value().clone())
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Users with a live lock entry. Zero once every call has returned.
    pub fn locked_users(&self) -> usize {
        self.locks.len()
    }
}
