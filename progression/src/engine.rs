//! ProgressionEngine - one learner's progress through one course.
//!
//! Holds the snapshot in memory, answers gating queries for the UI, and
//! hands every effective mutation to the snapshot writer. Engine logic is
//! synchronous; only opening, flushing and closing touch the store.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use curriculum::{
    CourseProvider, CurriculumDefinition, FamilyName, ScaleName, SectionDefinition, SectionId,
    SubsectionId,
};

use crate::entitlement::EntitlementCheck;
use crate::snapshot::ProgressSnapshot;
use crate::store::{ProgressStore, StoreKey};
use crate::types::{
    Advance, GateNotSatisfied, PersistenceOp, PersistenceWarning, ProgressReport,
    ProgressionError, Result, SectionReport, SectionStatus, UnmetPrerequisites, COMPLETION_CAP,
};
use crate::writer::SnapshotWriter;

/// Progress tracker and gate keeper for one (learner, course) pair.
///
/// Identifiers that are not part of the curriculum are programming errors:
/// every query and mutation taking an id panics on an unknown one. Hosts
/// accepting ids from untrusted input should check them with the
/// curriculum's `try_*` lookups first.
pub struct ProgressionEngine {
    curriculum: Arc<CurriculumDefinition>,
    key: StoreKey,
    snapshot: ProgressSnapshot,
    /// Bumped on every effective mutation
    revision: u64,
    writer: SnapshotWriter,
    warnings: mpsc::UnboundedReceiver<PersistenceWarning>,
}

impl ProgressionEngine {
    /// Open the engine, restoring the learner's snapshot from the store.
    ///
    /// A missing, unreadable or unsupported snapshot starts fresh. A store
    /// that cannot be reached also starts fresh and leaves a warning.
    pub async fn open(
        curriculum: Arc<CurriculumDefinition>,
        store: Arc<dyn ProgressStore>,
        key: StoreKey,
    ) -> Result<Self> {
        if key.course_id() != curriculum.course_id() {
            return Err(ProgressionError::CourseMismatch {
                key_course: key.course_id().clone(),
                curriculum_course: curriculum.course_id().clone(),
            });
        }

        let (warnings_tx, warnings) = mpsc::unbounded_channel();

        let snapshot = match store.load(&key).await {
            Ok(Some(stored)) => match stored.parse() {
                Ok(snapshot) if !snapshot.belongs_to(key.course_id()) => {
                    warn!(
                        key = %key,
                        store = store.id(),
                        stored_course = ?snapshot.course_id(),
                        "Stored progress belongs to another course, starting fresh"
                    );
                    ProgressSnapshot::empty(&curriculum)
                }
                Ok(mut snapshot) => {
                    let drifted = snapshot.curriculum_fingerprint() != curriculum.fingerprint();
                    let summary = snapshot.reconcile(&curriculum);
                    if drifted || !summary.is_unchanged() {
                        info!(
                            key = %key,
                            drifted,
                            dropped = summary.dropped,
                            added = summary.added,
                            "Reconciled progress snapshot with curriculum"
                        );
                    }
                    info!(
                        key = %key,
                        store = store.id(),
                        completed_sections = snapshot.completed_section_count(),
                        "Restored progress snapshot"
                    );
                    snapshot
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "Stored progress snapshot unreadable, starting fresh");
                    ProgressSnapshot::empty(&curriculum)
                }
            },
            Ok(None) => {
                info!(key = %key, store = store.id(), "No stored progress, starting fresh");
                ProgressSnapshot::empty(&curriculum)
            }
            Err(err) => {
                warn!(key = %key, store = store.id(), error = %err, "Failed to load progress, starting fresh");
                let _ = warnings_tx.send(PersistenceWarning::new(
                    key.clone(),
                    PersistenceOp::Load,
                    0,
                    err.to_string(),
                ));
                ProgressSnapshot::empty(&curriculum)
            }
        };

        let writer = SnapshotWriter::spawn(store, key.clone(), warnings_tx);

        Ok(Self {
            curriculum,
            key,
            snapshot,
            revision: 0,
            writer,
            warnings,
        })
    }

    /// Open the engine for a course shipped as a [`CourseProvider`].
    pub async fn open_course(
        provider: &dyn CourseProvider,
        store: Arc<dyn ProgressStore>,
        learner_id: impl Into<String>,
    ) -> Result<Self> {
        let curriculum = provider.definition()?;
        let key = StoreKey::new(learner_id, provider.course_id());
        Self::open(Arc::new(curriculum), store, key).await
    }

    /// Open the engine only if the learner holds the course.
    pub async fn open_entitled(
        curriculum: Arc<CurriculumDefinition>,
        store: Arc<dyn ProgressStore>,
        entitlements: &dyn EntitlementCheck,
        key: StoreKey,
    ) -> Result<Self> {
        if !entitlements
            .has_entitlement(key.learner_id(), key.course_id())
            .await
        {
            return Err(ProgressionError::NotEntitled {
                learner: key.learner_id().to_string(),
                course: key.course_id().clone(),
            });
        }
        Self::open(curriculum, store, key).await
    }

    pub fn curriculum(&self) -> &CurriculumDefinition {
        &self.curriculum
    }

    pub fn key(&self) -> &StoreKey {
        &self.key
    }

    /// Current in-memory snapshot.
    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    /// Number of effective mutations since the engine was opened.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_section_complete(&self, section: &SectionId) -> bool {
        self.section_definition(section);
        self.snapshot.is_section_complete(section)
    }

    pub fn is_subsection_complete(&self, subsection: &SubsectionId) -> bool {
        self.expect_subsection(subsection);
        self.snapshot.is_subsection_complete(subsection)
    }

    pub fn is_scale_complete(&self, scale: &ScaleName) -> bool {
        self.expect_scale(scale);
        self.snapshot.has_scale(scale)
    }

    pub fn is_family_complete(&self, family: &FamilyName) -> bool {
        self.expect_family(family);
        self.snapshot.has_family(family)
    }

    /// True if every subsection of the section is complete (vacuously true
    /// for sections without subsections).
    pub fn all_subsections_complete(&self, section: &SectionId) -> bool {
        self.section_definition(section)
            .subsections
            .iter()
            .all(|s| self.snapshot.is_subsection_complete(s))
    }

    pub fn all_required_scales_complete(&self, section: &SectionId) -> bool {
        self.section_definition(section)
            .required_scales
            .iter()
            .all(|s| self.snapshot.has_scale(s))
    }

    pub fn all_required_families_complete(&self, section: &SectionId) -> bool {
        self.section_definition(section)
            .required_families
            .iter()
            .all(|f| self.snapshot.has_family(f))
    }

    /// The section gate: all subsections, scales and families complete.
    pub fn can_mark_section_complete(&self, section: &SectionId) -> bool {
        self.all_subsections_complete(section)
            && self.all_required_scales_complete(section)
            && self.all_required_families_complete(section)
    }

    /// What is still missing before the section gate opens.
    pub fn unmet_prerequisites(&self, section: &SectionId) -> UnmetPrerequisites {
        let definition = self.section_definition(section);
        UnmetPrerequisites {
            subsections: definition
                .subsections
                .iter()
                .filter(|s| !self.snapshot.is_subsection_complete(s))
                .cloned()
                .collect(),
            scales: definition
                .required_scales
                .iter()
                .filter(|s| !self.snapshot.has_scale(s))
                .cloned()
                .collect(),
            families: definition
                .required_families
                .iter()
                .filter(|f| !self.snapshot.has_family(f))
                .cloned()
                .collect(),
        }
    }

    pub fn section_status(&self, section: &SectionId) -> SectionStatus {
        if self.is_section_complete(section) {
            return SectionStatus::Complete;
        }
        let unmet = self.unmet_prerequisites(section);
        if unmet.is_empty() {
            SectionStatus::Ready
        } else {
            SectionStatus::Blocked { unmet }
        }
    }

    /// Completed share of sections, rounded half up, capped at
    /// [`COMPLETION_CAP`].
    pub fn completion_percentage(&self) -> u8 {
        let total = self.curriculum.section_count();
        if total == 0 {
            return 0;
        }
        let done = self
            .curriculum
            .section_order()
            .filter(|id| self.snapshot.is_section_complete(id))
            .count();

        let rounded = (200 * done + total) / (2 * total);
        rounded.min(COMPLETION_CAP as usize) as u8
    }

    /// Per-section status and totals.
    pub fn report(&self) -> ProgressReport {
        let sections: Vec<SectionReport> = self
            .curriculum
            .sections()
            .iter()
            .map(|definition| SectionReport {
                section: definition.id.clone(),
                title: definition.title.clone(),
                status: self.section_status(&definition.id),
            })
            .collect();

        let completed_sections = sections
            .iter()
            .filter(|s| s.status == SectionStatus::Complete)
            .count();

        ProgressReport {
            learner_id: self.key.learner_id().to_string(),
            course_id: self.curriculum.course_id().clone(),
            total_sections: sections.len(),
            completed_sections,
            sections,
            completed_scales: self.snapshot.completed_scales().len(),
            completed_families: self.snapshot.completed_families().len(),
            completion_percentage: self.completion_percentage(),
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Mark a section complete if its gate is open. Idempotent: a section
    /// that is already complete stays complete even if its gate has since
    /// closed.
    pub fn mark_section_complete(
        &mut self,
        section: &SectionId,
    ) -> std::result::Result<(), GateNotSatisfied> {
        self.section_definition(section);
        if self.snapshot.is_section_complete(section) {
            return Ok(());
        }

        let unmet = self.unmet_prerequisites(section);
        if !unmet.is_empty() {
            debug!(
                key = %self.key,
                section = %section,
                unmet = unmet.len(),
                "Section gate closed"
            );
            return Err(GateNotSatisfied {
                section: section.clone(),
                unmet,
            });
        }

        if self.snapshot.set_section_complete(section) {
            debug!(key = %self.key, section = %section, "Section complete");
            self.persist();
        }
        Ok(())
    }

    /// Mark a subsection complete. Idempotent.
    pub fn mark_subsection_complete(&mut self, subsection: &SubsectionId) {
        self.expect_subsection(subsection);
        if self.snapshot.set_subsection_complete(subsection) {
            debug!(key = %self.key, subsection = %subsection, "Subsection complete");
            self.persist();
        }
    }

    /// Record a completed scale. Repeats are ignored.
    pub fn add_completed_scale(&mut self, scale: &ScaleName) {
        self.expect_scale(scale);
        if self.snapshot.insert_scale(scale) {
            debug!(key = %self.key, scale = %scale, "Scale complete");
            self.persist();
        }
    }

    /// Record a completed chord family. Repeats are ignored.
    pub fn add_completed_family(&mut self, family: &FamilyName) {
        self.expect_family(family);
        if self.snapshot.insert_family(family) {
            debug!(key = %self.key, family = %family, "Chord family complete");
            self.persist();
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn next_section(&self, current: &SectionId) -> Option<&SectionId> {
        self.section_definition(current);
        self.curriculum.next_section(current)
    }

    pub fn previous_section(&self, current: &SectionId) -> Option<&SectionId> {
        self.section_definition(current);
        self.curriculum.previous_section(current)
    }

    /// Forward navigation: try to complete `current`, then move on.
    ///
    /// The gate is not consulted before the attempt. If it is closed the
    /// completion silently does nothing and navigation still advances; this
    /// differs from [`mark_section_complete`](Self::mark_section_complete),
    /// which reports the closed gate.
    pub fn advance_and_mark_unchecked(&mut self, current: &SectionId) -> Advance {
        if let Err(gate) = self.mark_section_complete(current) {
            debug!(
                key = %self.key,
                section = %current,
                unmet = %gate.unmet,
                "Advancing past incomplete section"
            );
        }

        Advance {
            next: self.curriculum.next_section(current).cloned(),
            left_complete: self.snapshot.is_section_complete(current),
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Wait until the latest mutation has been handed to the store.
    pub async fn flush(&self) {
        self.writer.flush(self.revision).await;
    }

    /// Drain persistence warnings collected so far.
    pub fn take_warnings(&mut self) -> Vec<PersistenceWarning> {
        let mut drained = Vec::new();
        while let Ok(warning) = self.warnings.try_recv() {
            drained.push(warning);
        }
        drained
    }

    /// Flush and stop the writer, returning any outstanding warnings.
    pub async fn close(mut self) -> Vec<PersistenceWarning> {
        let revision = self.revision;
        self.writer.flush(revision).await;
        let warnings = self.take_warnings();

        let Self { writer, .. } = self;
        writer.close(revision).await;

        info!(revision, "Closed progression engine");
        warnings
    }

    fn persist(&mut self) {
        self.snapshot.touch(chrono::Utc::now());
        self.revision += 1;
        self.writer.submit(self.revision, self.snapshot.clone());
    }

    // ------------------------------------------------------------------
    // Identifier checks
    // ------------------------------------------------------------------

    fn section_definition(&self, section: &SectionId) -> &SectionDefinition {
        match self.curriculum.try_section(section) {
            Ok(definition) => definition,
            Err(err) => panic!("{err}"),
        }
    }

    fn expect_subsection(&self, subsection: &SubsectionId) {
        if let Err(err) = self.curriculum.try_owner_of(subsection) {
            panic!("{err}");
        }
    }

    fn expect_scale(&self, scale: &ScaleName) {
        if let Err(err) = self.curriculum.try_scale(scale) {
            panic!("{err}");
        }
    }

    fn expect_family(&self, family: &FamilyName) {
        if let Err(err) = self.curriculum.try_family(family) {
            panic!("{err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlement::StaticEntitlements;
    use crate::store::InMemoryProgressStore;
    use curriculum::{CourseProvider, CurriculumBuilder, PianoFundamentals, SectionDefinition};

    fn piano() -> Arc<CurriculumDefinition> {
        Arc::new(PianoFundamentals.definition().unwrap())
    }

    fn key() -> StoreKey {
        StoreKey::new("ada", "piano-fundamentals")
    }

    async fn open(store: Arc<InMemoryProgressStore>) -> ProgressionEngine {
        ProgressionEngine::open(piano(), store, key()).await.unwrap()
    }

    #[tokio::test]
    async fn test_fresh_engine_is_empty() {
        let engine = open(Arc::new(InMemoryProgressStore::new())).await;

        assert!(!engine.is_section_complete(&"introduction".into()));
        assert_eq!(engine.completion_percentage(), 0);
        assert_eq!(engine.revision(), 0);
        assert!(engine.can_mark_section_complete(&"rhythmBasics".into()));
        assert!(!engine.can_mark_section_complete(&"introduction".into()));
    }

    #[tokio::test]
    async fn test_gate_reports_specific_unmet_items() {
        let mut engine = open(Arc::new(InMemoryProgressStore::new())).await;
        engine.mark_subsection_complete(&"keyboardIntro".into());

        let err = engine
            .mark_section_complete(&"introduction".into())
            .unwrap_err();

        assert_eq!(err.section.as_str(), "introduction");
        assert_eq!(err.unmet.subsections, vec![SubsectionId::from("fingerNumbers")]);
        assert!(!engine.is_section_complete(&"introduction".into()));
    }

    #[tokio::test]
    async fn test_noop_mutations_do_not_bump_revision() {
        let mut engine = open(Arc::new(InMemoryProgressStore::new())).await;

        engine.add_completed_scale(&"C Major".into());
        engine.add_completed_scale(&"C Major".into());
        engine.mark_section_complete(&"rhythmBasics".into()).unwrap();
        engine.mark_section_complete(&"rhythmBasics".into()).unwrap();

        assert_eq!(engine.revision(), 2);
        assert!(engine.snapshot().updated_at().is_some());
    }

    #[tokio::test]
    async fn test_section_status_and_report() {
        let mut engine = open(Arc::new(InMemoryProgressStore::new())).await;
        engine.mark_section_complete(&"rhythmBasics".into()).unwrap();
        engine.add_completed_family(&"Major".into());

        assert_eq!(engine.section_status(&"rhythmBasics".into()), SectionStatus::Complete);
        assert_eq!(engine.section_status(&"progressions".into()), SectionStatus::Ready);
        match engine.section_status(&"chordFamilies".into()) {
            SectionStatus::Blocked { unmet } => assert_eq!(unmet.families.len(), 4),
            other => panic!("unexpected status {other:?}"),
        }

        let report = engine.report();
        assert_eq!(report.total_sections, 8);
        assert_eq!(report.completed_sections, 1);
        assert_eq!(report.completed_families, 1);
        assert_eq!(report.completion_percentage, 13);
        assert_eq!(report.sections[0].title, "Introduction");
    }

    #[tokio::test]
    async fn test_percentage_is_capped() {
        let mut engine = open(Arc::new(InMemoryProgressStore::new())).await;

        for section in ["rhythmBasics", "progressions", "finalReview"] {
            engine.mark_section_complete(&section.into()).unwrap();
        }
        // 3/8 = 37.5 -> 38
        assert_eq!(engine.completion_percentage(), 38);

        for subsection in ["keyboardIntro", "fingerNumbers"] {
            engine.mark_subsection_complete(&subsection.into());
        }
        engine.mark_section_complete(&"introduction".into()).unwrap();
        // 4/8 = 50 -> capped
        assert_eq!(engine.completion_percentage(), COMPLETION_CAP);
    }

    #[tokio::test]
    async fn test_advance_unchecked_moves_on_without_completing_blocked_section() {
        let mut engine = open(Arc::new(InMemoryProgressStore::new())).await;

        let advance = engine.advance_and_mark_unchecked(&"introduction".into());
        assert_eq!(advance.next, Some(SectionId::from("rhythmBasics")));
        assert!(!advance.left_complete);
        assert_eq!(engine.revision(), 0);

        let advance = engine.advance_and_mark_unchecked(&"rhythmBasics".into());
        assert_eq!(advance.next, Some(SectionId::from("majorScales")));
        assert!(advance.left_complete);

        let advance = engine.advance_and_mark_unchecked(&"finalReview".into());
        assert_eq!(advance.next, None);
        assert!(advance.left_complete);

        assert_eq!(
            engine.previous_section(&"rhythmBasics".into()),
            Some(&SectionId::from("introduction"))
        );
    }

    #[tokio::test]
    #[should_panic(expected = "Unknown section")]
    async fn test_unknown_section_panics() {
        let engine = open(Arc::new(InMemoryProgressStore::new())).await;
        engine.is_section_complete(&"jazzImprov".into());
    }

    #[tokio::test]
    #[should_panic(expected = "Unknown scale")]
    async fn test_unknown_scale_panics() {
        let mut engine = open(Arc::new(InMemoryProgressStore::new())).await;
        engine.add_completed_scale(&"H Major".into());
    }

    #[tokio::test]
    #[should_panic(expected = "Unknown subsection")]
    async fn test_unknown_subsection_panics() {
        let mut engine = open(Arc::new(InMemoryProgressStore::new())).await;
        engine.mark_subsection_complete(&"pedalling".into());
    }

    #[tokio::test]
    #[should_panic(expected = "Unknown chord family")]
    async fn test_unknown_family_panics() {
        let mut engine = open(Arc::new(InMemoryProgressStore::new())).await;
        engine.add_completed_family(&"Suspended".into());
    }

    #[tokio::test]
    async fn test_course_mismatch_is_rejected() {
        let result = ProgressionEngine::open(
            piano(),
            Arc::new(InMemoryProgressStore::new()),
            StoreKey::new("ada", "jazz-improv"),
        )
        .await;

        assert!(matches!(result, Err(ProgressionError::CourseMismatch { .. })));
    }

    #[tokio::test]
    async fn test_open_entitled() {
        let entitlements = StaticEntitlements::new();
        let store = Arc::new(InMemoryProgressStore::new());

        let denied =
            ProgressionEngine::open_entitled(piano(), store.clone(), &entitlements, key()).await;
        assert!(matches!(denied, Err(ProgressionError::NotEntitled { .. })));

        entitlements.grant("ada", "piano-fundamentals").await;
        let engine = ProgressionEngine::open_entitled(piano(), store, &entitlements, key()).await;
        assert!(engine.is_ok());
    }

    #[tokio::test]
    async fn test_changed_curriculum_keeps_matching_progress() {
        let store = Arc::new(InMemoryProgressStore::new());
        let mut engine = open(store.clone()).await;
        engine.mark_section_complete(&"rhythmBasics".into()).unwrap();
        engine.close().await;

        let revised = CurriculumBuilder::new("piano-fundamentals", "Piano Fundamentals")
            .section(SectionDefinition::new("rhythmBasics"))
            .section(SectionDefinition::new("sightReading").with_subsections(["clefs"]))
            .build()
            .unwrap();

        let engine = ProgressionEngine::open(Arc::new(revised), store, key())
            .await
            .unwrap();

        assert!(engine.is_section_complete(&"rhythmBasics".into()));
        assert!(!engine.is_section_complete(&"sightReading".into()));
        assert!(!engine.is_subsection_complete(&"clefs".into()));
        assert_eq!(engine.snapshot().section_flags().len(), 2);
        assert_eq!(engine.completion_percentage(), 45);
    }

    #[tokio::test]
    async fn test_complete_section_stays_complete_after_gate_closes() {
        let store = Arc::new(InMemoryProgressStore::new());
        let key = StoreKey::new("ada", "drift");
        let before = CurriculumBuilder::new("drift", "Drift")
            .section(SectionDefinition::new("s"))
            .build()
            .unwrap();
        let mut engine = ProgressionEngine::open(Arc::new(before), store.clone(), key.clone())
            .await
            .unwrap();
        engine.mark_section_complete(&"s".into()).unwrap();
        engine.close().await;

        let after = CurriculumBuilder::new("drift", "Drift")
            .section(SectionDefinition::new("s").with_subsections(["x"]))
            .build()
            .unwrap();
        let mut engine = ProgressionEngine::open(Arc::new(after), store, key)
            .await
            .unwrap();

        assert_eq!(engine.section_status(&"s".into()), SectionStatus::Complete);
        assert!(!engine.can_mark_section_complete(&"s".into()));
        assert!(engine.mark_section_complete(&"s".into()).is_ok());
        assert!(engine.is_section_complete(&"s".into()));
        assert_eq!(engine.revision(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_from_other_course_is_ignored() {
        let other = CurriculumBuilder::new("jazz-improv", "Jazz Improvisation")
            .section(SectionDefinition::new("modes").with_required_scales(["C Major"]))
            .build()
            .unwrap();
        let mut foreign = ProgressSnapshot::empty(&other);
        foreign.insert_scale(&"C Major".into());

        let store = Arc::new(InMemoryProgressStore::new());
        store.insert_raw(&key(), foreign.to_json().unwrap());

        let engine = open(store).await;

        assert!(!engine.is_scale_complete(&"C Major".into()));
        assert_eq!(
            engine.snapshot().course_id().map(|id| id.as_str()),
            Some("piano-fundamentals")
        );
        assert!(engine.snapshot().completed_scales().is_empty());
    }

    #[tokio::test]
    async fn test_hand_edited_flags_are_aligned_on_open() {
        let store = Arc::new(InMemoryProgressStore::new());
        let mut edited = ProgressSnapshot::empty(&piano());
        edited.section_complete.insert("retired".into(), true);
        edited.section_complete.remove(&SectionId::from("finalReview"));
        edited.set_section_complete(&"rhythmBasics".into());
        store.save(&key(), &edited).await.unwrap();

        let engine = open(store).await;

        assert_eq!(engine.snapshot().section_flags().len(), 8);
        assert!(!engine.snapshot().section_flags().contains_key(&SectionId::from("retired")));
        assert!(!engine.is_section_complete(&"finalReview".into()));
        assert_eq!(engine.snapshot().completed_section_count(), 1);
        assert_eq!(engine.completion_percentage(), 13);
    }

    struct EmptyCourse;

    impl CourseProvider for EmptyCourse {
        fn course_id(&self) -> curriculum::CourseId {
            "empty".into()
        }

        fn definition(
            &self,
        ) -> std::result::Result<CurriculumDefinition, curriculum::CurriculumError> {
            CurriculumBuilder::new("empty", "Empty").build()
        }
    }

    #[tokio::test]
    async fn test_open_course_from_provider() {
        let store = Arc::new(InMemoryProgressStore::new());

        let engine = ProgressionEngine::open_course(&PianoFundamentals, store.clone(), "ada")
            .await
            .unwrap();
        assert_eq!(engine.key(), &key());

        let broken = ProgressionEngine::open_course(&EmptyCourse, store, "ada").await;
        assert!(matches!(broken, Err(ProgressionError::Curriculum(_))));
    }

    #[tokio::test]
    async fn test_load_failure_starts_fresh_with_warning() {
        let store = Arc::new(InMemoryProgressStore::new().with_failing_loads(true));
        let mut engine = open(store).await;

        let warnings = engine.take_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].op, PersistenceOp::Load);
        assert_eq!(engine.completion_percentage(), 0);
    }
}
