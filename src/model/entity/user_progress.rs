use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ModelManager, ResourceType, ResourceTyped, error::DatabaseResult};

/// Completion record for one lesson of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserProgress {
    id: Uuid,
    user_id: Uuid,
    subject_id: Uuid,
    lesson_id: Uuid,
    quiz_id: Option<Uuid>,
    quiz_score: Option<i32>,
    is_completed: bool,
}

/// Write keyed by `(user_id, subject_id, lesson_id)`.
///
/// `None` quiz fields leave whatever is stored untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ProgressUpsert {
    pub user_id: Uuid,
    pub subject_id: Uuid,
    pub lesson_id: Uuid,
    pub quiz_id: Option<Uuid>,
    pub quiz_score: Option<i32>,
    pub is_completed: bool,
}

impl ProgressUpsert {
    pub fn lesson_completed(user_id: Uuid, subject_id: Uuid, lesson_id: Uuid) -> Self {
        Self {
            user_id,
            subject_id,
            lesson_id,
            quiz_id: None,
            quiz_score: None,
            is_completed: true,
        }
    }

    pub fn quiz_result(
        user_id: Uuid,
        subject_id: Uuid,
        lesson_id: Uuid,
        quiz_id: Uuid,
        score: i32,
    ) -> Self {
        Self {
            user_id,
            subject_id,
            lesson_id,
            quiz_id: Some(quiz_id),
            quiz_score: Some(score),
            is_completed: true,
        }
    }
}

impl ResourceTyped for UserProgress {
    fn get_resource_type() -> ResourceType {
        ResourceType::UserProgress
    }
}

impl UserProgress {
    pub fn new(id: Uuid, data: ProgressUpsert) -> Self {
        Self {
            id,
            user_id: data.user_id,
            subject_id: data.subject_id,
            lesson_id: data.lesson_id,
            quiz_id: data.quiz_id,
            quiz_score: data.quiz_score,
            is_completed: data.is_completed,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn quiz_id(&self) -> Option<Uuid> {
        self.quiz_id
    }

    pub fn quiz_score(&self) -> Option<i32> {
        self.quiz_score
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Apply an upsert to an existing record.
    pub fn merge(&mut self, data: &ProgressUpsert) {
        if data.quiz_id.is_some() {
            self.quiz_id = data.quiz_id;
        }
        if data.quiz_score.is_some() {
            self.quiz_score = data.quiz_score;
        }
        self.is_completed = data.is_completed;
    }

    pub async fn upsert(mm: &ModelManager, data: ProgressUpsert) -> DatabaseResult<Self> {
        mm.store().upsert_progress(data).await
    }

    /// Save a finished quiz together with the name shown on the leaderboard.
    pub async fn record_quiz(
        mm: &ModelManager,
        data: ProgressUpsert,
        user_name: &str,
    ) -> DatabaseResult<Self> {
        mm.store().record_quiz_completion(data, user_name).await
    }

    pub async fn all_by_user(mm: &ModelManager, user_id: Uuid) -> DatabaseResult<Vec<Self>> {
        mm.store().list_progress(user_id, None).await
    }

    pub async fn all_by_user_and_subject(
        mm: &ModelManager,
        user_id: Uuid,
        subject_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        mm.store().list_progress(user_id, Some(subject_id)).await
    }

    pub async fn all(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        mm.store().list_all_progress().await
    }
}
