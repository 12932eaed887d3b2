use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProgressSummary {
    pub name: String,
    pub points: i64,
    pub completed_lessons: usize,
    pub total_lessons: usize,
}
