//! Persisted progress for one learner in one course.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use curriculum::{CourseId, CurriculumDefinition, FamilyName, ScaleName, SectionId, SubsectionId};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Current snapshot layout version.
pub const SCHEMA_VERSION: u32 = 1;

/// Why a stored snapshot could not be used.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Not valid snapshot JSON
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Written by a newer or older layout we do not read
    #[error("Unsupported snapshot schema version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// The complete progress state of one learner in one course.
///
/// Item sets may hold names whose owning section is not complete yet; items
/// are completed one by one before the section gate opens. The snapshot does
/// not itself enforce that complete sections have all their items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub(crate) schema_version: u32,
    /// Course the snapshot belongs to. Absent in records written before it
    /// was tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) course_id: Option<CourseId>,
    #[serde(default)]
    pub(crate) curriculum_fingerprint: String,
    #[serde(default)]
    pub(crate) section_complete: BTreeMap<SectionId, bool>,
    #[serde(default)]
    pub(crate) subsection_complete: BTreeMap<SubsectionId, bool>,
    #[serde(default)]
    pub(crate) completed_scales: BTreeSet<ScaleName>,
    #[serde(default)]
    pub(crate) completed_families: BTreeSet<FamilyName>,
    #[serde(default)]
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

/// What [`ProgressSnapshot::reconcile`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Entries for ids the curriculum no longer has
    pub dropped: usize,
    /// Curriculum ids the snapshot had no entry for
    pub added: usize,
}

impl ReconcileSummary {
    pub fn is_unchanged(&self) -> bool {
        self.dropped == 0 && self.added == 0
    }
}

impl ProgressSnapshot {
    /// A fresh snapshot: every section and subsection incomplete, no items.
    pub fn empty(curriculum: &CurriculumDefinition) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            course_id: Some(curriculum.course_id().clone()),
            curriculum_fingerprint: curriculum.fingerprint().to_string(),
            section_complete: curriculum
                .section_order()
                .map(|id| (id.clone(), false))
                .collect(),
            subsection_complete: curriculum
                .subsections()
                .map(|id| (id.clone(), false))
                .collect(),
            completed_scales: BTreeSet::new(),
            completed_families: BTreeSet::new(),
            updated_at: None,
        }
    }

    /// Parse stored JSON, rejecting layouts this build does not understand.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.schema_version != SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Align the flag maps with a (possibly changed) curriculum.
    ///
    /// Flags for ids the curriculum dropped are removed and new ids start
    /// incomplete. Item sets are left alone: catalogs are open.
    pub fn reconcile(&mut self, curriculum: &CurriculumDefinition) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        let before = self.section_complete.len();
        self.section_complete
            .retain(|id, _| curriculum.contains_section(id));
        summary.dropped += before - self.section_complete.len();

        let before = self.subsection_complete.len();
        self.subsection_complete
            .retain(|id, _| curriculum.contains_subsection(id));
        summary.dropped += before - self.subsection_complete.len();

        for id in curriculum.section_order() {
            if !self.section_complete.contains_key(id) {
                self.section_complete.insert(id.clone(), false);
                summary.added += 1;
            }
        }
        for id in curriculum.subsections() {
            if !self.subsection_complete.contains_key(id) {
                self.subsection_complete.insert(id.clone(), false);
                summary.added += 1;
            }
        }

        self.course_id = Some(curriculum.course_id().clone());
        self.curriculum_fingerprint = curriculum.fingerprint().to_string();
        summary
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Course recorded in the snapshot, if any.
    pub fn course_id(&self) -> Option<&CourseId> {
        self.course_id.as_ref()
    }

    /// True unless the snapshot names a different course.
    pub fn belongs_to(&self, course_id: &CourseId) -> bool {
        self.course_id.as_ref().map_or(true, |own| own == course_id)
    }

    /// Fingerprint of the curriculum this snapshot was last aligned with.
    pub fn curriculum_fingerprint(&self) -> &str {
        &self.curriculum_fingerprint
    }

    pub fn section_flags(&self) -> &BTreeMap<SectionId, bool> {
        &self.section_complete
    }

    pub fn subsection_flags(&self) -> &BTreeMap<SubsectionId, bool> {
        &self.subsection_complete
    }

    pub fn completed_scales(&self) -> &BTreeSet<ScaleName> {
        &self.completed_scales
    }

    pub fn completed_families(&self) -> &BTreeSet<FamilyName> {
        &self.completed_families
    }

    /// When the snapshot was last mutated, if ever.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn is_section_complete(&self, id: &SectionId) -> bool {
        self.section_complete.get(id).copied().unwrap_or(false)
    }

    pub fn is_subsection_complete(&self, id: &SubsectionId) -> bool {
        self.subsection_complete.get(id).copied().unwrap_or(false)
    }

    pub fn has_scale(&self, scale: &ScaleName) -> bool {
        self.completed_scales.contains(scale)
    }

    pub fn has_family(&self, family: &FamilyName) -> bool {
        self.completed_families.contains(family)
    }

    /// Number of sections flagged complete.
    pub fn completed_section_count(&self) -> usize {
        self.section_complete.values().filter(|done| **done).count()
    }

    /// Set a section flag. Returns false if it was already set.
    pub(crate) fn set_section_complete(&mut self, id: &SectionId) -> bool {
        !std::mem::replace(self.section_complete.entry(id.clone()).or_insert(false), true)
    }

    /// Set a subsection flag. Returns false if it was already set.
    pub(crate) fn set_subsection_complete(&mut self, id: &SubsectionId) -> bool {
        !std::mem::replace(self.subsection_complete.entry(id.clone()).or_insert(false), true)
    }

    /// Returns false if the scale was already present.
    pub(crate) fn insert_scale(&mut self, scale: &ScaleName) -> bool {
        self.completed_scales.insert(scale.clone())
    }

    /// Returns false if the family was already present.
    pub(crate) fn insert_family(&mut self, family: &FamilyName) -> bool {
        self.completed_families.insert(family.clone())
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}
