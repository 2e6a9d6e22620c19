//! Course curricula for Keystone Piano
//!
//! A curriculum is the static shape of one course:
//!
//! - **Sections**: ordered top-level units; order drives navigation
//! - **Subsections**: finer checkpoints inside a section
//! - **Scale / chord-family items**: individually completable content a
//!   section may require in full before it can be marked complete
//!
//! # Key Components
//!
//! - [`CurriculumDefinition`]: validated, immutable course shape
//! - [`CurriculumBuilder`]: builds definitions in code
//! - [`CourseProvider`]: built-in courses such as [`PianoFundamentals`]
//!
//! # Example
//!
//! ```
//! use curriculum::{CurriculumBuilder, SectionDefinition};
//!
//! let curriculum = CurriculumBuilder::new("demo", "Demo")
//!     .section(SectionDefinition::new("introduction").with_subsections(["keyboardIntro"]))
//!     .section(SectionDefinition::new("majorScales").with_required_scales(["C Major"]))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     curriculum.next_section(&"introduction".into()).map(|s| s.as_str()),
//!     Some("majorScales")
//! );
//! ```

pub mod courses;
pub mod definition;
pub mod ids;
mod navigation;

// Re-export main types
pub use courses::{builtin_courses, find_builtin, CourseProvider, PianoFundamentals};
pub use definition::{
    CurriculumBuilder, CurriculumDefinition, CurriculumDocument, CurriculumError, IdentifierKind,
    SectionDefinition,
};
pub use ids::*;
