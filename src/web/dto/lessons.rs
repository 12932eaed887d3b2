use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{learning::LessonOutline, model::entity::Lesson};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonSummary {
    pub id: Uuid,
    pub title: String,
    pub order_num: i32,
    pub unlocked: bool,
    pub completed: bool,
}

impl LessonSummary {
    pub fn new(lesson: &Lesson, unlocked: bool, completed: bool) -> Self {
        Self {
            id: lesson.id(),
            title: lesson.title().to_string(),
            order_num: lesson.order_num(),
            unlocked,
            completed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonResponse {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub title: String,
    pub order_num: i32,
    pub completed: bool,
    pub outline: LessonOutline,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonDoneResponse {
    /// Quiz to offer next, when the lesson has one.
    pub quiz_id: Option<Uuid>,
}
