use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    learning::{LessonQuota, ProgressionGate},
    model::{
        ResourceTyped,
        entity::{Lesson, Subject, UserProgress},
    },
    web::{AppState, WebError, WebResult},
};

/// What one user's unlock decisions are computed from, read fresh per request.
#[derive(Debug)]
pub struct Snapshot {
    pub subjects: Vec<Subject>,
    /// Lessons of the subject being looked at, if any.
    pub lessons: Vec<Lesson>,
    pub progress: Vec<UserProgress>,
    lesson_counts: HashMap<Uuid, usize>,
    quota: LessonQuota,
}

impl Snapshot {
    pub async fn load(state: &AppState, user_id: Uuid, subject_id: Option<Uuid>) -> WebResult<Self> {
        let mm = state.mm();

        let subjects = Subject::list(mm)
            .await
            .map_err(|e| WebError::resource_fetch_error(Subject::get_resource_type(), e))?;
        let lesson_counts = Lesson::counts_by_subject(mm)
            .await
            .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;
        let lessons = match subject_id {
            Some(id) => Lesson::all_by_subject(mm, id)
                .await
                .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?,
            None => Vec::new(),
        };
        let progress = UserProgress::all_by_user(mm, user_id)
            .await
            .map_err(|e| WebError::resource_fetch_error(UserProgress::get_resource_type(), e))?;

        Ok(Self {
            subjects,
            lessons,
            progress,
            lesson_counts,
            quota: state.config().progression().lesson_quota(),
        })
    }

    pub fn gate(&self) -> ProgressionGate<'_> {
        ProgressionGate::new(&self.subjects, &self.lessons, &self.progress)
            .with_quota(self.quota)
            .with_lesson_counts(self.lesson_counts.clone())
    }

    pub fn subject(&self, id: Uuid) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id() == id)
    }

    pub fn lesson_count(&self, subject_id: Uuid) -> usize {
        self.lesson_counts.get(&subject_id).copied().unwrap_or(0)
    }

    pub fn total_lessons(&self) -> usize {
        self.lesson_counts.values().sum()
    }
}
