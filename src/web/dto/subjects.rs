use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::Subject;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubjectResponse {
    pub id: Uuid,
    pub name: String,
    pub order_num: i32,
    pub unlocked: bool,
    pub completed_lessons: usize,
    pub total_lessons: usize,
}

impl SubjectResponse {
    pub fn new(subject: &Subject, unlocked: bool, completed_lessons: usize, total_lessons: usize) -> Self {
        Self {
            id: subject.id(),
            name: subject.name().to_string(),
            order_num: subject.order_num(),
            unlocked,
            completed_lessons,
            total_lessons,
        }
    }
}
