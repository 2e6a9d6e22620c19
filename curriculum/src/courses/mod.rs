//! Built-in course curricula.
//!
//! Each course provides its fixed curriculum in code so that the engine can
//! be constructed without a course file.

pub mod piano_fundamentals;

pub use piano_fundamentals::PianoFundamentals;

use crate::definition::{CurriculumDefinition, CurriculumError};
use crate::ids::CourseId;

/// Trait for courses that ship a built-in curriculum.
pub trait CourseProvider: Send + Sync {
    /// Identifier of the course this provider describes
    fn course_id(&self) -> CourseId;

    /// Build the course's curriculum
    fn definition(&self) -> Result<CurriculumDefinition, CurriculumError>;
}

/// All built-in courses.
pub fn builtin_courses() -> Vec<Box<dyn CourseProvider>> {
    vec![Box::new(PianoFundamentals)]
}

/// Find a built-in course by id.
pub fn find_builtin(course_id: &CourseId) -> Option<Box<dyn CourseProvider>> {
    builtin_courses()
        .into_iter()
        .find(|provider| &provider.course_id() == course_id)
}
