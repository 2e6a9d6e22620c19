//! Course progression and gating for Keystone Piano
//!
//! Tracks one learner's advancement through one course curriculum:
//!
//! - **Gating**: a section can only be marked complete once its
//!   subsections and required scales / chord families are all complete
//! - **Completion percentage**: share of completed sections, capped at 45%
//! - **Persistence**: every effective mutation is saved through an injected
//!   [`ProgressStore`], fire-and-forget, with failures surfaced as warnings
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           ProgressionEngine             │
//! │  (queries, gated mutations, navigation) │
//! └────────────────┬────────────────────────┘
//!                  │ latest snapshot
//!                  ▼
//!          ┌───────────────┐       ┌───────────────┐
//!          │SnapshotWriter │──────▶│ ProgressStore │
//!          │ (watch task)  │       │ (memory/file) │
//!          └───────────────┘       └───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use progression::{InMemoryProgressStore, ProgressionEngine, StoreKey};
//! use curriculum::{CourseProvider, PianoFundamentals};
//!
//! let curriculum = Arc::new(PianoFundamentals.definition()?);
//! let store = Arc::new(InMemoryProgressStore::new());
//! let mut engine =
//!     ProgressionEngine::open(curriculum, store, StoreKey::new("ada", "piano-fundamentals")).await?;
//!
//! engine.mark_subsection_complete(&"keyboardIntro".into());
//! engine.mark_subsection_complete(&"fingerNumbers".into());
//! engine.mark_section_complete(&"introduction".into())?;
//! assert_eq!(engine.completion_percentage(), 13);
//! ```

pub mod config;
pub mod engine;
pub mod entitlement;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod writer;

// Re-export main types
pub use config::EngineConfig;
pub use engine::ProgressionEngine;
pub use entitlement::{EntitlementCheck, StaticEntitlements};
pub use snapshot::{ProgressSnapshot, SnapshotError, SCHEMA_VERSION};
pub use store::{
    InMemoryProgressStore, JsonFileProgressStore, ProgressStore, StoreError, StoreKey,
    StoredSnapshot,
};
pub use types::*;
