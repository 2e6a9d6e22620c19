//! Durable keyed storage for progress snapshots.
//!
//! The engine only needs point lookup by `(learner, course)`. Stores hand
//! back the raw stored text; parsing and validation belong to the engine so
//! that an unreadable record degrades to a fresh start instead of an error.

pub mod file;
pub mod memory;

pub use file::JsonFileProgressStore;
pub use memory::InMemoryProgressStore;

use async_trait::async_trait;
use std::fmt;

use curriculum::CourseId;

use crate::snapshot::{ProgressSnapshot, SnapshotError};

/// Error types for progress store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backing storage cannot be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage key: one learner in one course.
///
/// Rendered as `"{learner}:{course}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    learner_id: String,
    course_id: CourseId,
}

impl StoreKey {
    pub fn new(learner_id: impl Into<String>, course_id: impl Into<CourseId>) -> Self {
        Self {
            learner_id: learner_id.into(),
            course_id: course_id.into(),
        }
    }

    pub fn learner_id(&self) -> &str {
        &self.learner_id
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.learner_id, self.course_id)
    }
}

/// Snapshot text as it was found in a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot(String);

impl StoredSnapshot {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a snapshot.
    pub fn parse(&self) -> Result<ProgressSnapshot, SnapshotError> {
        ProgressSnapshot::from_json(&self.0)
    }
}

/// Trait for progress snapshot storage.
///
/// Implementations may be a browser-backed bridge, a database, a local file
/// tree or plain memory. `save` is last-writer-wins; no merge is attempted.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Store identifier for logs.
    fn id(&self) -> &str;

    /// Fetch the stored snapshot for a key, if any.
    async fn load(&self, key: &StoreKey) -> Result<Option<StoredSnapshot>, StoreError>;

    /// Replace the stored snapshot for a key.
    async fn save(&self, key: &StoreKey, snapshot: &ProgressSnapshot) -> Result<(), StoreError>;
}
