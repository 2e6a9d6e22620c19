//! Forward/backward navigation over the section order.

use crate::definition::CurriculumDefinition;
use crate::ids::SectionId;

impl CurriculumDefinition {
    /// Zero-based position of a section in navigation order.
    pub fn position_of(&self, section: &SectionId) -> Option<usize> {
        self.section_order().position(|id| id == section)
    }

    pub fn first_section(&self) -> Option<&SectionId> {
        self.section_order().next()
    }

    pub fn last_section(&self) -> Option<&SectionId> {
        self.section_order().last()
    }

    /// The section after `current`, or `None` at the end (or if `current`
    /// is not part of this curriculum).
    pub fn next_section(&self, current: &SectionId) -> Option<&SectionId> {
        let index = self.position_of(current)?;
        self.section_order().nth(index + 1)
    }

    /// The section before `current`, or `None` at the start.
    pub fn previous_section(&self, current: &SectionId) -> Option<&SectionId> {
        let index = self.position_of(current)?;
        index
            .checked_sub(1)
            .and_then(|previous| self.section_order().nth(previous))
    }
}

#[cfg(test)]
mod tests {
    use crate::definition::{CurriculumBuilder, SectionDefinition};
    use crate::ids::SectionId;

    #[test]
    fn test_next_and_previous_follow_declared_order() {
        let curriculum = CurriculumBuilder::new("demo", "Demo")
            .section(SectionDefinition::new("one"))
            .section(SectionDefinition::new("two"))
            .section(SectionDefinition::new("three"))
            .build()
            .unwrap();

        let one = SectionId::from("one");
        let two = SectionId::from("two");
        let three = SectionId::from("three");

        assert_eq!(curriculum.next_section(&one), Some(&two));
        assert_eq!(curriculum.next_section(&two), Some(&three));
        assert_eq!(curriculum.next_section(&three), None);

        assert_eq!(curriculum.previous_section(&three), Some(&two));
        assert_eq!(curriculum.previous_section(&one), None);

        assert_eq!(curriculum.first_section(), Some(&one));
        assert_eq!(curriculum.last_section(), Some(&three));
        assert_eq!(curriculum.next_section(&"missing".into()), None);
    }
}
