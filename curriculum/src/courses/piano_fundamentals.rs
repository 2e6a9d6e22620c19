//! The flagship beginner course.
//!
//! Eight sections. Scale sections require every key in full; the chord
//! family section requires each family once.

use crate::courses::CourseProvider;
use crate::definition::{CurriculumBuilder, CurriculumDefinition, CurriculumError, SectionDefinition};
use crate::ids::CourseId;

pub const COURSE_ID: &str = "piano-fundamentals";

/// Naturals first, then sharps.
const KEYS: [&str; 12] = [
    "C", "D", "E", "F", "G", "A", "B", "C#", "D#", "F#", "G#", "A#",
];

const CHORD_FAMILIES: [&str; 5] = ["Major", "Minor", "Diminished", "Augmented", "Dominant 7th"];

/// Provider for the piano fundamentals course.
pub struct PianoFundamentals;

impl PianoFundamentals {
    pub fn major_scales() -> Vec<String> {
        KEYS.iter().map(|key| format!("{key} Major")).collect()
    }

    pub fn minor_scales() -> Vec<String> {
        KEYS.iter().map(|key| format!("{key} Minor")).collect()
    }

    pub fn chord_families() -> Vec<&'static str> {
        CHORD_FAMILIES.to_vec()
    }
}

impl CourseProvider for PianoFundamentals {
    fn course_id(&self) -> CourseId {
        CourseId::from(COURSE_ID)
    }

    fn definition(&self) -> Result<CurriculumDefinition, CurriculumError> {
        CurriculumBuilder::new(COURSE_ID, "Piano Fundamentals")
            .section(
                SectionDefinition::new("introduction")
                    .with_title("Introduction")
                    .with_subsections(["keyboardIntro", "fingerNumbers"]),
            )
            .section(SectionDefinition::new("rhythmBasics").with_title("Rhythm Basics"))
            .section(
                SectionDefinition::new("majorScales")
                    .with_title("Major Scales")
                    .with_required_scales(Self::major_scales()),
            )
            .section(
                SectionDefinition::new("minorScales")
                    .with_title("Minor Scales")
                    .with_required_scales(Self::minor_scales()),
            )
            .section(
                SectionDefinition::new("chordBasics")
                    .with_title("Chord Basics")
                    .with_subsections(["triads", "inversions"]),
            )
            .section(
                SectionDefinition::new("chordFamilies")
                    .with_title("Chord Families")
                    .with_required_families(Self::chord_families()),
            )
            .section(SectionDefinition::new("progressions").with_title("Chord Progressions"))
            .section(SectionDefinition::new("finalReview").with_title("Final Review"))
            .build()
    }
}
