//! Curriculum definition, builder and validation.
//!
//! A curriculum is the fixed shape of one course: an ordered list of
//! sections, each with optional subsections and optional "all of" item
//! requirements drawn from the course's scale and chord-family catalogs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::ids::{CourseId, FamilyName, ScaleName, SectionId, SubsectionId};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Error types for curriculum construction and lookup.
#[derive(Debug, thiserror::Error)]
pub enum CurriculumError {
    /// No sections were declared
    #[error("Curriculum {0} has no sections")]
    Empty(CourseId),

    /// A section id appears more than once in the section order
    #[error("Section listed more than once: {0}")]
    DuplicateSection(SectionId),

    /// A subsection is claimed by two sections
    #[error("Subsection {subsection} belongs to both {first} and {second}")]
    DuplicateSubsection {
        subsection: SubsectionId,
        first: SectionId,
        second: SectionId,
    },

    /// An identifier is not part of this curriculum
    #[error("Unknown {kind} in course {course}: {id}")]
    UnknownIdentifier {
        course: CourseId,
        kind: IdentifierKind,
        id: String,
    },

    /// The curriculum document could not be parsed
    #[error("Invalid curriculum document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Which kind of identifier a lookup was about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Section,
    Subsection,
    Scale,
    Family,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Section => "section",
            Self::Subsection => "subsection",
            Self::Scale => "scale",
            Self::Family => "chord family",
        })
    }
}

/// One section of a course as declared by the course author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SectionDefinition {
    /// Section identifier
    pub id: SectionId,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Checkpoints inside the section, in display order
    #[serde(default)]
    pub subsections: Vec<SubsectionId>,
    /// Scales that must all be completed before the section can be marked
    #[serde(default)]
    pub required_scales: Vec<ScaleName>,
    /// Chord families that must all be completed before the section can be marked
    #[serde(default)]
    pub required_families: Vec<FamilyName>,
}

impl SectionDefinition {
    /// Create a section with no subsections and no item requirements.
    pub fn new(id: impl Into<SectionId>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            subsections: Vec::new(),
            required_scales: Vec::new(),
            required_families: Vec::new(),
        }
    }

    /// Builder: set display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: set subsections.
    pub fn with_subsections<I, S>(mut self, subsections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubsectionId>,
    {
        self.subsections = subsections.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set required scales.
    pub fn with_required_scales<I, S>(mut self, scales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ScaleName>,
    {
        self.required_scales = scales.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set required chord families.
    pub fn with_required_families<I, S>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FamilyName>,
    {
        self.required_families = families.into_iter().map(Into::into).collect();
        self
    }

    /// True if the section has no subsections and no item requirements.
    pub fn is_ungated(&self) -> bool {
        self.subsections.is_empty()
            && self.required_scales.is_empty()
            && self.required_families.is_empty()
    }

    /// Drop repeated entries while keeping first-seen order.
    fn dedup_items(&mut self) {
        dedup_in_order(&mut self.subsections);
        dedup_in_order(&mut self.required_scales);
        dedup_in_order(&mut self.required_families);
    }
}

fn dedup_in_order<T: Clone + Ord>(items: &mut Vec<T>) {
    let mut seen = BTreeSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

/// Serializable form of a curriculum, used for YAML course files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumDocument {
    pub course_id: CourseId,
    #[serde(default)]
    pub title: String,
    pub sections: Vec<SectionDefinition>,
    /// Scales practisable in this course beyond those any section requires
    #[serde(default)]
    pub scale_catalog: Vec<ScaleName>,
    /// Chord families practisable beyond those any section requires
    #[serde(default)]
    pub family_catalog: Vec<FamilyName>,
}

/// Builder for [`CurriculumDefinition`].
#[derive(Debug, Clone)]
pub struct CurriculumBuilder {
    document: CurriculumDocument,
}

impl CurriculumBuilder {
    /// Start a curriculum for a course.
    pub fn new(course_id: impl Into<CourseId>, title: impl Into<String>) -> Self {
        Self {
            document: CurriculumDocument {
                course_id: course_id.into(),
                title: title.into(),
                sections: Vec::new(),
                scale_catalog: Vec::new(),
                family_catalog: Vec::new(),
            },
        }
    }

    /// Append a section; order of calls is navigation order.
    pub fn section(mut self, section: SectionDefinition) -> Self {
        self.document.sections.push(section);
        self
    }

    /// Add scales to the open catalog without requiring them anywhere.
    pub fn catalog_scales<I, S>(mut self, scales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ScaleName>,
    {
        self.document
            .scale_catalog
            .extend(scales.into_iter().map(Into::into));
        self
    }

    /// Add chord families to the open catalog without requiring them anywhere.
    pub fn catalog_families<I, S>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FamilyName>,
    {
        self.document
            .family_catalog
            .extend(families.into_iter().map(Into::into));
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<CurriculumDefinition, CurriculumError> {
        CurriculumDefinition::from_document(self.document)
    }
}

/// The immutable shape of one course.
#[derive(Debug, Clone)]
pub struct CurriculumDefinition {
    course_id: CourseId,
    title: String,
    sections: Vec<SectionDefinition>,
    position: HashMap<SectionId, usize>,
    subsection_owner: HashMap<SubsectionId, SectionId>,
    scale_catalog: BTreeSet<ScaleName>,
    family_catalog: BTreeSet<FamilyName>,
    fingerprint: String,
}

impl CurriculumDefinition {
    /// Validate a document and build the definition.
    pub fn from_document(document: CurriculumDocument) -> Result<Self, CurriculumError> {
        let CurriculumDocument {
            course_id,
            title,
            mut sections,
            scale_catalog,
            family_catalog,
        } = document;

        if sections.is_empty() {
            return Err(CurriculumError::Empty(course_id));
        }

        let mut position = HashMap::with_capacity(sections.len());
        let mut subsection_owner = HashMap::new();
        let mut scales: BTreeSet<ScaleName> = scale_catalog.into_iter().collect();
        let mut families: BTreeSet<FamilyName> = family_catalog.into_iter().collect();

        for (index, section) in sections.iter_mut().enumerate() {
            section.dedup_items();

            if position.insert(section.id.clone(), index).is_some() {
                return Err(CurriculumError::DuplicateSection(section.id.clone()));
            }

            for subsection in &section.subsections {
                if let Some(first) = subsection_owner.insert(subsection.clone(), section.id.clone()) {
                    return Err(CurriculumError::DuplicateSubsection {
                        subsection: subsection.clone(),
                        first,
                        second: section.id.clone(),
                    });
                }
            }

            scales.extend(section.required_scales.iter().cloned());
            families.extend(section.required_families.iter().cloned());
        }

        let fingerprint = compute_fingerprint(&course_id, &sections);

        tracing::debug!(
            course = %course_id,
            sections = sections.len(),
            subsections = subsection_owner.len(),
            fingerprint = %fingerprint,
            "Built curriculum"
        );

        Ok(Self {
            course_id,
            title,
            sections,
            position,
            subsection_owner,
            scale_catalog: scales,
            family_catalog: families,
            fingerprint,
        })
    }

    /// Load a curriculum from a YAML course file.
    pub fn from_yaml(yaml: &str) -> Result<Self, CurriculumError> {
        let document: CurriculumDocument = serde_yaml::from_str(yaml)?;
        Self::from_document(document)
    }

    /// Serialize back to the YAML course-file form.
    pub fn to_yaml(&self) -> Result<String, CurriculumError> {
        Ok(serde_yaml::to_string(&self.to_document())?)
    }

    /// The document form of this curriculum.
    pub fn to_document(&self) -> CurriculumDocument {
        CurriculumDocument {
            course_id: self.course_id.clone(),
            title: self.title.clone(),
            sections: self.sections.clone(),
            scale_catalog: self.scale_catalog.iter().cloned().collect(),
            family_catalog: self.family_catalog.iter().cloned().collect(),
        }
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Sections in navigation order.
    pub fn sections(&self) -> &[SectionDefinition] {
        &self.sections
    }

    /// Section ids in navigation order.
    pub fn section_order(&self) -> impl Iterator<Item = &SectionId> + '_ {
        self.sections.iter().map(|s| &s.id)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Look up a section.
    pub fn section(&self, id: &SectionId) -> Option<&SectionDefinition> {
        self.position.get(id).map(|&index| &self.sections[index])
    }

    /// Look up a section, reporting unknown ids as an error.
    pub fn try_section(&self, id: &SectionId) -> Result<&SectionDefinition, CurriculumError> {
        self.section(id)
            .ok_or_else(|| self.unknown(IdentifierKind::Section, id.as_str()))
    }

    /// Every subsection id, grouped by section in navigation order.
    pub fn subsections(&self) -> impl Iterator<Item = &SubsectionId> + '_ {
        self.sections.iter().flat_map(|s| s.subsections.iter())
    }

    /// The section a subsection belongs to.
    pub fn owner_of(&self, subsection: &SubsectionId) -> Option<&SectionId> {
        self.subsection_owner.get(subsection)
    }

    /// Like [`owner_of`](Self::owner_of) but unknown ids are an error.
    pub fn try_owner_of(&self, subsection: &SubsectionId) -> Result<&SectionId, CurriculumError> {
        self.owner_of(subsection)
            .ok_or_else(|| self.unknown(IdentifierKind::Subsection, subsection.as_str()))
    }

    /// Validate a scale name against the catalog.
    pub fn try_scale(&self, scale: &ScaleName) -> Result<(), CurriculumError> {
        if self.knows_scale(scale) {
            Ok(())
        } else {
            Err(self.unknown(IdentifierKind::Scale, scale.as_str()))
        }
    }

    /// Validate a chord family name against the catalog.
    pub fn try_family(&self, family: &FamilyName) -> Result<(), CurriculumError> {
        if self.knows_family(family) {
            Ok(())
        } else {
            Err(self.unknown(IdentifierKind::Family, family.as_str()))
        }
    }

    pub fn contains_section(&self, id: &SectionId) -> bool {
        self.position.contains_key(id)
    }

    pub fn contains_subsection(&self, id: &SubsectionId) -> bool {
        self.subsection_owner.contains_key(id)
    }

    pub fn knows_scale(&self, scale: &ScaleName) -> bool {
        self.scale_catalog.contains(scale)
    }

    pub fn knows_family(&self, family: &FamilyName) -> bool {
        self.family_catalog.contains(family)
    }

    /// All scales the course knows about (required anywhere or cataloged).
    pub fn scale_catalog(&self) -> &BTreeSet<ScaleName> {
        &self.scale_catalog
    }

    /// All chord families the course knows about.
    pub fn family_catalog(&self) -> &BTreeSet<FamilyName> {
        &self.family_catalog
    }

    /// Hash of the curriculum structure, stored alongside snapshots so that
    /// curriculum changes can be detected on load.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn unknown(&self, kind: IdentifierKind, id: &str) -> CurriculumError {
        CurriculumError::UnknownIdentifier {
            course: self.course_id.clone(),
            kind,
            id: id.to_string(),
        }
    }
}

/// SHA256 over the structural content of a curriculum.
///
/// Titles are excluded: renaming a section does not invalidate progress.
fn compute_fingerprint(course_id: &CourseId, sections: &[SectionDefinition]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(course_id.as_str().as_bytes());

    for section in sections {
        hasher.update(b"\x1esection\x1f");
        hasher.update(section.id.as_str().as_bytes());
        for subsection in &section.subsections {
            hasher.update(b"\x1fsub\x1f");
            hasher.update(subsection.as_str().as_bytes());
        }
        for scale in &section.required_scales {
            hasher.update(b"\x1fscale\x1f");
            hasher.update(scale.as_str().as_bytes());
        }
        for family in &section.required_families {
            hasher.update(b"\x1ffamily\x1f");
            hasher.update(family.as_str().as_bytes());
        }
    }

    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CurriculumBuilder {
        CurriculumBuilder::new("demo", "Demo")
            .section(SectionDefinition::new("intro").with_subsections(["a", "b"]))
            .section(SectionDefinition::new("scales").with_required_scales(["C Major", "G Major"]))
    }

    #[test]
    fn test_build_indexes_sections_and_subsections() {
        let curriculum = small().build().unwrap();

        assert_eq!(curriculum.section_count(), 2);
        assert!(curriculum.contains_section(&"scales".into()));
        assert_eq!(
            curriculum.owner_of(&"b".into()),
            Some(&SectionId::from("intro"))
        );
        assert!(curriculum.knows_scale(&"G Major".into()));
        assert!(!curriculum.knows_scale(&"D Major".into()));
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        let empty = CurriculumBuilder::new("demo", "Demo").build();
        assert!(matches!(empty, Err(CurriculumError::Empty(_))));

        let duplicate = small().section(SectionDefinition::new("intro")).build();
        assert!(matches!(duplicate, Err(CurriculumError::DuplicateSection(id)) if id.as_str() == "intro"));

        let shared = small()
            .section(SectionDefinition::new("outro").with_subsections(["a"]))
            .build();
        assert!(matches!(shared, Err(CurriculumError::DuplicateSubsection { .. })));
    }

    #[test]
    fn test_repeated_items_collapse() {
        let curriculum = CurriculumBuilder::new("demo", "Demo")
            .section(SectionDefinition::new("scales").with_required_scales(["C Major", "C Major"]))
            .build()
            .unwrap();

        let section = curriculum.section(&"scales".into()).unwrap();
        assert_eq!(section.required_scales.len(), 1);
    }

    #[test]
    fn test_catalog_extends_beyond_requirements() {
        let curriculum = small()
            .catalog_scales(["D Major"])
            .catalog_families(["Suspended"])
            .build()
            .unwrap();

        assert!(curriculum.try_scale(&"D Major".into()).is_ok());
        assert!(curriculum.try_family(&"Suspended".into()).is_ok());
        assert!(curriculum.try_family(&"Major".into()).is_err());
    }

    #[test]
    fn test_fingerprint_tracks_structure_not_titles() {
        let a = small().build().unwrap();
        let b = CurriculumBuilder::new("demo", "Renamed")
            .section(SectionDefinition::new("intro").with_title("Welcome").with_subsections(["a", "b"]))
            .section(SectionDefinition::new("scales").with_required_scales(["C Major", "G Major"]))
            .build()
            .unwrap();
        let c = small()
            .section(SectionDefinition::new("extra"))
            .build()
            .unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let yaml = r#"
courseId: demo
title: Demo
sections:
  - id: intro
    subsections: [a, b]
  - id: scales
    requiredScales: ["C Major"]
familyCatalog: [Major]
"#;
        let curriculum = CurriculumDefinition::from_yaml(yaml).unwrap();
        assert_eq!(curriculum.section_count(), 2);
        assert!(curriculum.knows_family(&"Major".into()));

        let reparsed = CurriculumDefinition::from_yaml(&curriculum.to_yaml().unwrap()).unwrap();
        assert_eq!(reparsed.fingerprint(), curriculum.fingerprint());
    }

    #[test]
    fn test_unknown_lookup_names_kind() {
        let curriculum = small().build().unwrap();
        let err = curriculum.try_section(&"missing".into()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown section in course demo: missing");
    }
}
