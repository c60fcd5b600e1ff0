use crate::model::{Lesson, LessonId, SectionId, SkillSection};

//
// ─── LESSON STATUS ─────────────────────────────────────────────────────────────
//

/// Availability of a lesson in the skill tree, derived on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonStatus {
    /// The lesson id appears in the user's completed list.
    Completed,
    /// Every prerequisite is completed (vacuously true with none).
    Available,
    /// At least one prerequisite is missing, or nobody is signed in.
    Locked,
}

/// Derives a lesson's status from a completed-lesson list.
///
/// `completed` is `None` when no user is signed in; everything is locked
/// then. Prerequisites only ever look at the completed list, so sections
/// stay independent of each other.
#[must_use]
pub fn lesson_status(lesson: &Lesson, completed: Option<&[LessonId]>) -> LessonStatus {
    let Some(completed) = completed else {
        return LessonStatus::Locked;
    };

    if completed.contains(lesson.id()) {
        return LessonStatus::Completed;
    }

    let unlocked = lesson
        .prerequisites()
        .iter()
        .all(|prerequisite| completed.contains(prerequisite));

    if unlocked {
        LessonStatus::Available
    } else {
        LessonStatus::Locked
    }
}

//
// ─── SECTION PROGRESS ──────────────────────────────────────────────────────────
//

/// Status of one lesson inside a section view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonProgress {
    pub lesson_id: LessonId,
    pub status: LessonStatus,
}

/// Aggregated view of one skill-tree section, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionProgress {
    pub section_id: SectionId,
    pub lessons: Vec<LessonProgress>,
    pub completed: usize,
    pub total: usize,
}

impl SectionProgress {
    /// Completed fraction in `[0, 1]`; zero for an empty section.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f32 / self.total as f32
    }
}

/// Evaluates every lesson in a section against a completed list.
///
/// Completion is counted per lesson, so duplicate entries in `completed`
/// cannot push the ratio past 1.
#[must_use]
pub fn evaluate_section(section: &SkillSection, completed: Option<&[LessonId]>) -> SectionProgress {
    let lessons: Vec<LessonProgress> = section
        .lessons()
        .iter()
        .map(|lesson| LessonProgress {
            lesson_id: lesson.id().clone(),
            status: lesson_status(lesson, completed),
        })
        .collect();

    let done = lessons
        .iter()
        .filter(|entry| entry.status == LessonStatus::Completed)
        .count();

    SectionProgress {
        section_id: section.id().clone(),
        completed: done,
        total: lessons.len(),
        lessons,
    }
}

/// Evaluates a whole catalog of sections.
#[must_use]
pub fn evaluate_catalog(
    sections: &[SkillSection],
    completed: Option<&[LessonId]>,
) -> Vec<SectionProgress> {
    sections
        .iter()
        .map(|section| evaluate_section(section, completed))
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    fn build_lesson(id: &str, prerequisites: &[&str]) -> Lesson {
        Lesson::new(
            LessonId::new(id),
            id,
            "",
            "Testing",
            Difficulty::Beginner,
            100,
            prerequisites.iter().map(|id| LessonId::new(*id)).collect(),
            "",
            Vec::new(),
        )
        .unwrap()
    }

    fn build_section() -> SkillSection {
        SkillSection::new(
            SectionId::new("fundamentals"),
            "Fundamentals",
            "",
            "📚",
            vec![
                build_lesson("variables-basics", &[]),
                build_lesson("data-types", &["variables-basics"]),
                build_lesson("conditionals", &["data-types"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn everything_locked_without_user() {
        let section = build_section();
        let progress = evaluate_section(&section, None);
        assert!(progress
            .lessons
            .iter()
            .all(|entry| entry.status == LessonStatus::Locked));
        assert_eq!(progress.completed, 0);
    }

    #[test]
    fn no_prerequisites_means_available() {
        let section = build_section();
        let progress = evaluate_section(&section, Some(&[]));
        assert_eq!(progress.lessons[0].status, LessonStatus::Available);
        assert_eq!(progress.lessons[1].status, LessonStatus::Locked);
    }

    #[test]
    fn completing_a_prerequisite_unlocks_the_next() {
        let section = build_section();
        let completed = vec![LessonId::new("variables-basics")];
        let progress = evaluate_section(&section, Some(&completed));

        assert_eq!(progress.lessons[0].status, LessonStatus::Completed);
        assert_eq!(progress.lessons[1].status, LessonStatus::Available);
        assert_eq!(progress.lessons[2].status, LessonStatus::Locked);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.total, 3);
    }

    #[test]
    fn duplicate_completions_do_not_inflate_ratio() {
        let section = build_section();
        let completed = vec![
            LessonId::new("variables-basics"),
            LessonId::new("variables-basics"),
            LessonId::new("variables-basics"),
        ];
        let progress = evaluate_section(&section, Some(&completed));
        assert_eq!(progress.completed, 1);
        assert!(progress.ratio() <= 1.0);
    }

    #[test]
    fn ratio_of_empty_section_is_zero() {
        let section = SkillSection::new(SectionId::new("empty"), "Empty", "", "", vec![]).unwrap();
        let progress = evaluate_section(&section, Some(&[]));
        assert!((progress.ratio() - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn evaluate_catalog_covers_all_sections() {
        let sections = vec![build_section(), build_section()];
        let all = evaluate_catalog(&sections, Some(&[]));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let section = build_section();
        let completed = vec![LessonId::new("variables-basics")];
        let first = evaluate_section(&section, Some(&completed));
        let second = evaluate_section(&section, Some(&completed));
        assert_eq!(first, second);
    }
}
