use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use sqlx::{PgExecutor, prelude::FromRow, types::Json};
use uuid::Uuid;

use crate::model::{
    DbConnection,
    entity::{
        Lesson, LessonCreate, ProgressUpsert, Quiz, QuizCreate, QuizForm, QuizQuestion, Subject,
        SubjectCreate, User, UserCreate, UserProgress,
    },
    error::{DatabaseError, DatabaseResult},
    store::Store,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    db: DbConnection,
}

impl PgStore {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

/// Map constraint violations to their store-level meaning.
fn write_error(error: sqlx::Error, unique: &'static str, reference: &'static str) -> DatabaseError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            return DatabaseError::Conflict(unique);
        }
        if db.is_foreign_key_violation() {
            return DatabaseError::MissingReference(reference);
        }
    }
    DatabaseError::SqlxError(error)
}

#[derive(Debug, FromRow)]
struct QuizRow {
    id: Uuid,
    lesson_id: Uuid,
    title: String,
    question: Option<String>,
    options: Option<Json<BTreeMap<String, String>>>,
    correct_answer: Option<String>,
    questions: Option<Json<Vec<QuizQuestion>>>,
}

impl TryFrom<QuizRow> for Quiz {
    type Error = DatabaseError;

    fn try_from(row: QuizRow) -> Result<Self, Self::Error> {
        let form = match row {
            QuizRow {
                questions: Some(Json(questions)),
                ..
            } => QuizForm::Multi { questions },
            QuizRow {
                question: Some(question),
                options: Some(Json(options)),
                correct_answer: Some(correct_answer),
                ..
            } => QuizForm::Single(QuizQuestion {
                question,
                options,
                correct_answer,
            }),
            _ => return Err(DatabaseError::MalformedQuiz(row.id)),
        };
        Ok(Quiz::new(row.id, row.lesson_id, row.title, form))
    }
}

const QUIZ_COLUMNS: &str =
    "id, lesson_id, title, question, options, correct_answer, questions";

async fn upsert_progress_with<'e, E: PgExecutor<'e>>(
    executor: E,
    data: &ProgressUpsert,
) -> DatabaseResult<UserProgress> {
    let record = sqlx::query_as(
        r#"
        INSERT INTO user_progress
            (id, user_id, subject_id, lesson_id, quiz_id, quiz_score, is_completed)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id, subject_id, lesson_id) DO UPDATE SET
            quiz_id = COALESCE(EXCLUDED.quiz_id, user_progress.quiz_id),
            quiz_score = COALESCE(EXCLUDED.quiz_score, user_progress.quiz_score),
            is_completed = EXCLUDED.is_completed
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(data.user_id)
    .bind(data.subject_id)
    .bind(data.lesson_id)
    .bind(data.quiz_id)
    .bind(data.quiz_score)
    .bind(data.is_completed)
    .fetch_one(executor)
    .await
    .map_err(|e| write_error(e, "user_progress", "user, subject, lesson or quiz"))?;
    Ok(record)
}

#[async_trait]
impl Store for PgStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn insert_user(&self, data: UserCreate) -> DatabaseResult<User> {
        let user = sqlx::query_as(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1,$2,$3,$4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| write_error(e, "users.email", "user"))?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    async fn update_user_name(&self, id: Uuid, name: &str) -> DatabaseResult<()> {
        sqlx::query("UPDATE users SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn list_users(&self) -> DatabaseResult<Vec<User>> {
        let users = sqlx::query_as("SELECT * FROM users ORDER BY id")
            .fetch_all(self.db.pool())
            .await?;
        Ok(users)
    }

    async fn insert_subject(&self, data: SubjectCreate) -> DatabaseResult<Subject> {
        let subject = sqlx::query_as(
            "INSERT INTO subjects (id, name, order_num) VALUES ($1,$2,$3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(data.order_num)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| write_error(e, "subjects.order_num", "subject"))?;
        Ok(subject)
    }

    async fn find_subject(&self, id: Uuid) -> DatabaseResult<Option<Subject>> {
        let subject = sqlx::query_as("SELECT * FROM subjects WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(subject)
    }

    async fn list_subjects(&self) -> DatabaseResult<Vec<Subject>> {
        let subjects = sqlx::query_as("SELECT * FROM subjects ORDER BY order_num")
            .fetch_all(self.db.pool())
            .await?;
        Ok(subjects)
    }

    async fn insert_lesson(&self, data: LessonCreate) -> DatabaseResult<Lesson> {
        let lesson = sqlx::query_as(
            "INSERT INTO lessons (id, subject_id, order_num, title, content) VALUES ($1,$2,$3,$4,$5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.subject_id)
        .bind(data.order_num)
        .bind(&data.title)
        .bind(&data.content)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| write_error(e, "lessons.order_num", "subject"))?;
        Ok(lesson)
    }

    async fn find_lesson(&self, id: Uuid) -> DatabaseResult<Option<Lesson>> {
        let lesson = sqlx::query_as("SELECT * FROM lessons WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(lesson)
    }

    async fn list_lessons(&self, subject_id: Uuid) -> DatabaseResult<Vec<Lesson>> {
        let lessons = sqlx::query_as("SELECT * FROM lessons WHERE subject_id = $1 ORDER BY order_num")
            .bind(subject_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(lessons)
    }

    async fn lesson_counts(&self) -> DatabaseResult<HashMap<Uuid, usize>> {
        let rows: Vec<(Uuid, i64)> =
            sqlx::query_as("SELECT subject_id, COUNT(*) FROM lessons GROUP BY subject_id")
                .fetch_all(self.db.pool())
                .await?;
        Ok(rows
            .into_iter()
            .map(|(subject, count)| (subject, count as usize))
            .collect())
    }

    async fn insert_quiz(&self, data: QuizCreate) -> DatabaseResult<Quiz> {
        let (question, options, correct_answer, questions) = match &data.form {
            QuizForm::Multi { questions } => (None, None, None, Some(Json(questions))),
            QuizForm::Single(q) => (
                Some(&q.question),
                Some(Json(&q.options)),
                Some(&q.correct_answer),
                None,
            ),
        };

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO quizzes (id, lesson_id, title, question, options, correct_answer, questions) VALUES ($1,$2,$3,$4,$5,$6,$7)",
        )
        .bind(id)
        .bind(data.lesson_id)
        .bind(&data.title)
        .bind(question)
        .bind(options)
        .bind(correct_answer)
        .bind(questions)
        .execute(self.db.pool())
        .await
        .map_err(|e| write_error(e, "quizzes", "lesson"))?;

        Ok(Quiz::new(id, data.lesson_id, data.title, data.form))
    }

    async fn find_quiz(&self, id: Uuid) -> DatabaseResult<Option<Quiz>> {
        let row: Option<QuizRow> =
            sqlx::query_as(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.db.pool())
                .await?;
        row.map(Quiz::try_from).transpose()
    }

    async fn first_quiz_for_lesson(&self, lesson_id: Uuid) -> DatabaseResult<Option<Quiz>> {
        let row: Option<QuizRow> = sqlx::query_as(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE lesson_id = $1 ORDER BY created_at, id LIMIT 1"
        ))
        .bind(lesson_id)
        .fetch_optional(self.db.pool())
        .await?;
        row.map(Quiz::try_from).transpose()
    }

    async fn list_quizzes(&self, lesson_ids: &[Uuid]) -> DatabaseResult<Vec<Quiz>> {
        let rows: Vec<QuizRow> = sqlx::query_as(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE lesson_id = ANY($1) ORDER BY created_at, id"
        ))
        .bind(lesson_ids)
        .fetch_all(self.db.pool())
        .await?;
        rows.into_iter().map(Quiz::try_from).collect()
    }

    async fn list_progress(
        &self,
        user_id: Uuid,
        subject_id: Option<Uuid>,
    ) -> DatabaseResult<Vec<UserProgress>> {
        let progress = sqlx::query_as(
            "SELECT * FROM user_progress WHERE user_id = $1 AND ($2::uuid IS NULL OR subject_id = $2)",
        )
        .bind(user_id)
        .bind(subject_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(progress)
    }

    async fn list_all_progress(&self) -> DatabaseResult<Vec<UserProgress>> {
        let progress = sqlx::query_as("SELECT * FROM user_progress")
            .fetch_all(self.db.pool())
            .await?;
        Ok(progress)
    }

    async fn upsert_progress(&self, data: ProgressUpsert) -> DatabaseResult<UserProgress> {
        let record = upsert_progress_with(self.db.pool(), &data).await?;
        tracing::debug!(progress_id = %record.id(), "progress upserted");
        Ok(record)
    }

    async fn record_quiz_completion(
        &self,
        data: ProgressUpsert,
        user_name: &str,
    ) -> DatabaseResult<UserProgress> {
        let mut tx = self.db.pool().begin().await?;

        let record = upsert_progress_with(&mut *tx, &data).await?;
        sqlx::query("UPDATE users SET name = $1 WHERE id = $2")
            .bind(user_name)
            .bind(data.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(progress_id = %record.id(), "quiz completion recorded");
        Ok(record)
    }
}
