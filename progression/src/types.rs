//! Core types for the progression crate.

use serde::Serialize;
use std::fmt;

use curriculum::{CourseId, CurriculumError, FamilyName, ScaleName, SectionId, SubsectionId};

use crate::store::{StoreError, StoreKey};

/// Upper bound on [`completion_percentage`](crate::ProgressionEngine::completion_percentage).
///
/// Guided completion only ever accounts for a minority of mastery; the rest
/// of the range belongs to self-directed practice the engine does not track.
pub const COMPLETION_CAP: u8 = 45;

/// The prerequisites of a section that are still incomplete, in curriculum order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmetPrerequisites {
    pub subsections: Vec<SubsectionId>,
    pub scales: Vec<ScaleName>,
    pub families: Vec<FamilyName>,
}

impl UnmetPrerequisites {
    pub fn is_empty(&self) -> bool {
        self.subsections.is_empty() && self.scales.is_empty() && self.families.is_empty()
    }

    /// Total number of unmet items.
    pub fn len(&self) -> usize {
        self.subsections.len() + self.scales.len() + self.families.len()
    }
}

impl fmt::Display for UnmetPrerequisites {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn group<T: fmt::Display>(label: &str, items: &[T]) -> Option<String> {
            if items.is_empty() {
                return None;
            }
            let names: Vec<String> = items.iter().map(ToString::to_string).collect();
            Some(format!("{label}: {}", names.join(", ")))
        }

        let groups: Vec<String> = [
            group("subsections", &self.subsections),
            group("scales", &self.scales),
            group("chord families", &self.families),
        ]
        .into_iter()
        .flatten()
        .collect();

        if groups.is_empty() {
            f.write_str("nothing outstanding")
        } else {
            f.write_str(&groups.join("; "))
        }
    }
}

/// Returned when a section is marked complete before its gate opens.
///
/// Recoverable: the caller should show the learner what is still missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Section {section} is not ready to complete ({unmet})")]
pub struct GateNotSatisfied {
    pub section: SectionId,
    pub unmet: UnmetPrerequisites,
}

/// How a section should be presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SectionStatus {
    /// Marked complete
    Complete,
    /// Not complete, gate open
    Ready,
    /// Not complete, gate closed
    Blocked { unmet: UnmetPrerequisites },
}

/// Status of one section within a [`ProgressReport`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionReport {
    pub section: SectionId,
    pub title: String,
    pub status: SectionStatus,
}

/// Summary of a learner's progress through a course.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub learner_id: String,
    pub course_id: CourseId,
    pub sections: Vec<SectionReport>,
    pub completed_sections: usize,
    pub total_sections: usize,
    pub completed_scales: usize,
    pub completed_families: usize,
    pub completion_percentage: u8,
}

/// Result of forward navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Section to show next, `None` at the end of the course
    pub next: Option<SectionId>,
    /// Whether the section being left is complete afterwards
    pub left_complete: bool,
}

/// Which store call a [`PersistenceWarning`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceOp {
    Load,
    Save,
}

/// Non-fatal persistence failure.
///
/// The in-memory snapshot stays authoritative; only durability is affected.
#[derive(Debug, Clone)]
pub struct PersistenceWarning {
    pub key: StoreKey,
    pub op: PersistenceOp,
    /// Snapshot revision the failure applies to (0 for load)
    pub revision: u64,
    pub message: String,
    pub at: chrono::DateTime<chrono::Utc>,
}

impl PersistenceWarning {
    pub(crate) fn new(key: StoreKey, op: PersistenceOp, revision: u64, message: impl Into<String>) -> Self {
        Self {
            key,
            op,
            revision,
            message: message.into(),
            at: chrono::Utc::now(),
        }
    }
}

impl fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            PersistenceOp::Load => "load",
            PersistenceOp::Save => "save",
        };
        write!(f, "{op} of {} failed (revision {}): {}", self.key, self.revision, self.message)
    }
}

/// Error types for the progression crate.
#[derive(Debug, thiserror::Error)]
pub enum ProgressionError {
    /// Section gate closed
    #[error(transparent)]
    Gate(#[from] GateNotSatisfied),

    /// Progress store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Curriculum construction or lookup failure
    #[error("Curriculum error: {0}")]
    Curriculum(#[from] CurriculumError),

    /// Learner has not purchased the course
    #[error("Learner {learner} holds no entitlement for course {course}")]
    NotEntitled { learner: String, course: CourseId },

    /// Store key and curriculum disagree about the course
    #[error("Store key is for course {key_course} but curriculum is {curriculum_course}")]
    CourseMismatch {
        key_course: CourseId,
        curriculum_course: CourseId,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ProgressionError>;
