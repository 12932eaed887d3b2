//! Row store contract and its two implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{
    entity::{
        Lesson, LessonCreate, ProgressUpsert, Quiz, QuizCreate, Subject, SubjectCreate, User,
        UserCreate, UserProgress,
    },
    error::DatabaseResult,
};

mod memory;
pub use memory::MemoryStore;

mod postgres;
pub use postgres::PgStore;

/// Everything the application reads from or writes to persistent storage.
///
/// Nothing is ever deleted through this trait.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short name for logs.
    fn kind(&self) -> &'static str;

    /// Fails with `DatabaseError::Conflict` when the email is taken.
    async fn insert_user(&self, data: UserCreate) -> DatabaseResult<User>;
    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;
    async fn update_user_name(&self, id: Uuid, name: &str) -> DatabaseResult<()>;
    /// Ordered by id.
    async fn list_users(&self) -> DatabaseResult<Vec<User>>;

    /// Fails with `DatabaseError::Conflict` when `order_num` is taken.
    async fn insert_subject(&self, data: SubjectCreate) -> DatabaseResult<Subject>;
    async fn find_subject(&self, id: Uuid) -> DatabaseResult<Option<Subject>>;
    /// Ordered by `order_num`.
    async fn list_subjects(&self) -> DatabaseResult<Vec<Subject>>;

    /// Fails with `DatabaseError::Conflict` when the subject already has a
    /// lesson at `order_num`.
    async fn insert_lesson(&self, data: LessonCreate) -> DatabaseResult<Lesson>;
    async fn find_lesson(&self, id: Uuid) -> DatabaseResult<Option<Lesson>>;
    /// Lessons of one subject ordered by `order_num`.
    async fn list_lessons(&self, subject_id: Uuid) -> DatabaseResult<Vec<Lesson>>;
    /// Subjects without lessons are absent from the map.
    async fn lesson_counts(&self) -> DatabaseResult<HashMap<Uuid, usize>>;

    async fn insert_quiz(&self, data: QuizCreate) -> DatabaseResult<Quiz>;
    async fn find_quiz(&self, id: Uuid) -> DatabaseResult<Option<Quiz>>;
    async fn first_quiz_for_lesson(&self, lesson_id: Uuid) -> DatabaseResult<Option<Quiz>>;
    async fn list_quizzes(&self, lesson_ids: &[Uuid]) -> DatabaseResult<Vec<Quiz>>;

    async fn list_progress(
        &self,
        user_id: Uuid,
        subject_id: Option<Uuid>,
    ) -> DatabaseResult<Vec<UserProgress>>;
    async fn list_all_progress(&self) -> DatabaseResult<Vec<UserProgress>>;
    async fn upsert_progress(&self, data: ProgressUpsert) -> DatabaseResult<UserProgress>;
    /// Progress upsert plus user rename, applied together or not at all.
    async fn record_quiz_completion(
        &self,
        data: ProgressUpsert,
        user_name: &str,
    ) -> DatabaseResult<UserProgress>;
}
