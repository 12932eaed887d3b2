use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizSummary {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub quarter: String,
    pub question_count: usize,
    pub unlocked: bool,
    pub completed: bool,
    pub score: Option<i32>,
}
