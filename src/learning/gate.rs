//! Unlock rules for subjects, lessons and quizzes.
//!
//! Everything here is a pure function of a progress snapshot. Nothing is
//! cached; callers build a [`ProgressionGate`] per request.

use std::collections::HashMap;

use uuid::Uuid;

use crate::model::entity::{Lesson, Quiz, Subject, UserProgress};

/// Lessons per subject assumed by the fixed quota.
pub const DEFAULT_LESSONS_PER_SUBJECT: usize = 5;

/// How many completed lessons a subject needs before the next one unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LessonQuota {
    /// The subject's own lesson count.
    #[default]
    Counted,
    /// The same number for every subject.
    Fixed(usize),
}

#[derive(Debug, Clone)]
pub struct ProgressionGate<'a> {
    subjects: &'a [Subject],
    lessons: &'a [Lesson],
    progress: &'a [UserProgress],
    quota: LessonQuota,
    lesson_counts: Option<HashMap<Uuid, usize>>,
}

impl<'a> ProgressionGate<'a> {
    pub fn new(
        subjects: &'a [Subject],
        lessons: &'a [Lesson],
        progress: &'a [UserProgress],
    ) -> Self {
        Self {
            subjects,
            lessons,
            progress,
            quota: LessonQuota::default(),
            lesson_counts: None,
        }
    }

    pub fn with_quota(mut self, quota: LessonQuota) -> Self {
        self.quota = quota;
        self
    }

    /// Lesson counts per subject, for callers that did not load every lesson.
    pub fn with_lesson_counts(mut self, counts: HashMap<Uuid, usize>) -> Self {
        self.lesson_counts = Some(counts);
        self
    }

    pub fn required_lessons(&self, subject_id: Uuid) -> usize {
        match self.quota {
            LessonQuota::Fixed(n) => n,
            LessonQuota::Counted => match &self.lesson_counts {
                Some(counts) => counts.get(&subject_id).copied().unwrap_or(0),
                None => self
                    .lessons
                    .iter()
                    .filter(|l| l.subject_id() == subject_id)
                    .count(),
            },
        }
    }

    pub fn completed_lessons(&self, subject_id: Uuid) -> usize {
        self.progress
            .iter()
            .filter(|p| p.subject_id() == subject_id && p.is_completed())
            .count()
    }

    pub fn is_lesson_completed(&self, lesson_id: Uuid) -> bool {
        self.progress
            .iter()
            .any(|p| p.lesson_id() == lesson_id && p.is_completed())
    }

    /// The first subject is always open; any other needs its predecessor's
    /// quota of completed lessons, exactly.
    pub fn is_subject_unlocked(&self, subject_order: i32) -> bool {
        if subject_order == 1 {
            return true;
        }

        let Some(prev) = self
            .subjects
            .iter()
            .find(|s| s.order_num() == subject_order - 1)
        else {
            return false;
        };

        let required = self.required_lessons(prev.id());
        required > 0 && self.completed_lessons(prev.id()) == required
    }

    pub fn is_lesson_unlocked(&self, subject_id: Uuid, lesson_order: i32) -> bool {
        if lesson_order == 1 {
            return true;
        }

        self.lessons
            .iter()
            .find(|l| l.subject_id() == subject_id && l.order_num() == lesson_order - 1)
            .is_some_and(|prev| self.is_lesson_completed(prev.id()))
    }

    /// A quiz opens once its own lesson is both reachable and completed.
    pub fn is_quiz_unlocked(&self, quiz: &Quiz) -> bool {
        self.lessons
            .iter()
            .find(|l| l.id() == quiz.lesson_id())
            .is_some_and(|lesson| {
                self.is_lesson_unlocked(lesson.subject_id(), lesson.order_num())
                    && self.is_lesson_completed(lesson.id())
            })
    }
}

/// Term label shown next to a quiz, keyed by its lesson's position.
pub fn quarter_label(lesson_order: i32) -> &'static str {
    match lesson_order {
        1 => "Quarter 1",
        2 => "Quarter 2",
        3 => "Quarter 3",
        4 => "Quarter 3.5",
        n if n >= 5 => "Quarter 4",
        _ => "Quarter 1",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::entity::{ProgressUpsert, QuizForm, QuizQuestion};

    struct Curriculum {
        user: Uuid,
        subjects: Vec<Subject>,
        lessons: Vec<Lesson>,
    }

    impl Curriculum {
        fn new(subject_count: i32, lessons_per_subject: i32) -> Self {
            let subjects: Vec<Subject> = (1..=subject_count)
                .map(|o| Subject::new(Uuid::new_v4(), format!("Subject {o}"), o))
                .collect();
            let lessons = subjects
                .iter()
                .flat_map(|s| {
                    (1..=lessons_per_subject).map(move |o| {
                        Lesson::new(
                            Uuid::new_v4(),
                            s.id(),
                            o,
                            format!("Lesson {o}"),
                            String::new(),
                        )
                    })
                })
                .collect();
            Self {
                user: Uuid::new_v4(),
                subjects,
                lessons,
            }
        }

        fn lesson(&self, subject_order: i32, lesson_order: i32) -> &Lesson {
            let subject = &self.subjects[(subject_order - 1) as usize];
            self.lessons
                .iter()
                .find(|l| l.subject_id() == subject.id() && l.order_num() == lesson_order)
                .unwrap()
        }

        fn done(&self, subject_order: i32, lesson_order: i32) -> UserProgress {
            let lesson = self.lesson(subject_order, lesson_order);
            UserProgress::new(
                Uuid::new_v4(),
                ProgressUpsert::lesson_completed(self.user, lesson.subject_id(), lesson.id()),
            )
        }

        fn quiz_for(&self, subject_order: i32, lesson_order: i32) -> Quiz {
            Quiz::new(
                Uuid::new_v4(),
                self.lesson(subject_order, lesson_order).id(),
                String::from("Quiz"),
                QuizForm::Single(QuizQuestion {
                    question: String::from("?"),
                    options: [(String::from("A"), String::from("a"))].into(),
                    correct_answer: String::from("A"),
                }),
            )
        }
    }

    #[test]
    fn first_subject_and_first_lesson_are_always_open() {
        let c = Curriculum::new(2, 5);
        let gate = ProgressionGate::new(&c.subjects, &c.lessons, &[]);

        assert!(gate.is_subject_unlocked(1));
        assert!(gate.is_lesson_unlocked(c.subjects[1].id(), 1));
        assert!(!gate.is_subject_unlocked(2));
    }

    #[test]
    fn missing_previous_subject_locks() {
        let c = Curriculum::new(1, 5);
        let gate = ProgressionGate::new(&c.subjects, &c.lessons, &[]);
        assert!(!gate.is_subject_unlocked(3));
    }

    #[test]
    fn completing_all_five_lessons_unlocks_next_subject() {
        let c = Curriculum::new(2, 5);
        let mut progress = Vec::new();

        for order in 1..=5 {
            let gate = ProgressionGate::new(&c.subjects, &c.lessons, &progress);
            assert!(!gate.is_subject_unlocked(2), "unlocked after {} lessons", order - 1);
            progress.push(c.done(1, order));
        }

        let gate = ProgressionGate::new(&c.subjects, &c.lessons, &progress);
        assert!(gate.is_subject_unlocked(2));

        let gate = gate.with_quota(LessonQuota::Fixed(DEFAULT_LESSONS_PER_SUBJECT));
        assert!(gate.is_subject_unlocked(2));
    }

    #[test]
    fn counted_quota_follows_the_real_lesson_count() {
        let c = Curriculum::new(2, 3);
        let progress: Vec<_> = (1..=3).map(|o| c.done(1, o)).collect();

        let counted = ProgressionGate::new(&c.subjects, &c.lessons, &progress);
        assert!(counted.is_subject_unlocked(2));

        // the fixed quota of five never opens a three-lesson subject
        let fixed = counted
            .clone()
            .with_quota(LessonQuota::Fixed(DEFAULT_LESSONS_PER_SUBJECT));
        assert!(!fixed.is_subject_unlocked(2));
    }

    #[test]
    fn explicit_lesson_counts_override_loaded_lessons() {
        let c = Curriculum::new(2, 2);
        let progress: Vec<_> = (1..=2).map(|o| c.done(1, o)).collect();
        let counts = HashMap::from([(c.subjects[0].id(), 2)]);

        let gate = ProgressionGate::new(&c.subjects, &[], &progress).with_lesson_counts(counts);
        assert!(gate.is_subject_unlocked(2));

        let gate = ProgressionGate::new(&c.subjects, &[], &progress)
            .with_lesson_counts(HashMap::new());
        assert!(!gate.is_subject_unlocked(2));
    }

    #[test]
    fn lesson_unlock_depends_only_on_the_previous_lesson() {
        let c = Curriculum::new(1, 4);
        let subject = c.subjects[0].id();

        let progress = vec![c.done(1, 1)];
        let gate = ProgressionGate::new(&c.subjects, &c.lessons, &progress);
        assert!(gate.is_lesson_unlocked(subject, 2));
        assert!(!gate.is_lesson_unlocked(subject, 3));

        // lesson 3 done while lesson 2 is not: lesson 4 opens, lesson 3 stays gated on 2
        let progress = vec![c.done(1, 1), c.done(1, 3)];
        let gate = ProgressionGate::new(&c.subjects, &c.lessons, &progress);
        assert!(gate.is_lesson_unlocked(subject, 4));
        assert!(!gate.is_lesson_unlocked(subject, 3));
    }

    #[test]
    fn incomplete_records_do_not_count() {
        let c = Curriculum::new(1, 2);
        let lesson = c.lesson(1, 1);
        let mut upsert = ProgressUpsert::lesson_completed(c.user, lesson.subject_id(), lesson.id());
        upsert.is_completed = false;
        let progress = vec![UserProgress::new(Uuid::new_v4(), upsert)];

        let gate = ProgressionGate::new(&c.subjects, &c.lessons, &progress);
        assert!(!gate.is_lesson_unlocked(c.subjects[0].id(), 2));
    }

    #[test]
    fn quiz_needs_its_lesson_completed() {
        let c = Curriculum::new(2, 5);
        let quiz = c.quiz_for(1, 1);

        let gate = ProgressionGate::new(&c.subjects, &c.lessons, &[]);
        assert!(!gate.is_quiz_unlocked(&quiz));

        let progress = vec![c.done(1, 1)];
        let gate = ProgressionGate::new(&c.subjects, &c.lessons, &progress);
        assert!(gate.is_quiz_unlocked(&quiz));
    }

    #[test]
    fn quiz_of_unreachable_lesson_stays_locked() {
        let c = Curriculum::new(2, 5);
        let quiz = c.quiz_for(1, 3);

        // lesson 3 is recorded done but lesson 2 never was
        let progress = vec![c.done(1, 1), c.done(1, 3)];
        let gate = ProgressionGate::new(&c.subjects, &c.lessons, &progress);
        assert!(!gate.is_quiz_unlocked(&quiz));
    }

    #[test]
    fn quiz_with_unknown_lesson_is_locked() {
        let c = Curriculum::new(1, 1);
        let other = Curriculum::new(1, 1);
        let quiz = other.quiz_for(1, 1);
        let progress = vec![other.done(1, 1)];

        let gate = ProgressionGate::new(&c.subjects, &c.lessons, &progress);
        assert!(!gate.is_quiz_unlocked(&quiz));
    }

    #[test]
    fn quarter_labels() {
        assert_eq!(quarter_label(1), "Quarter 1");
        assert_eq!(quarter_label(4), "Quarter 3.5");
        assert_eq!(quarter_label(9), "Quarter 4");
        assert_eq!(quarter_label(0), "Quarter 1");
    }
}
