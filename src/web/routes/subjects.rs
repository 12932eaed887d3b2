use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    learning::quarter_label,
    model::{
        ResourceTyped,
        entity::{Quiz, Subject},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{lessons::LessonSummary, quizzes::QuizSummary, subjects::SubjectResponse},
        error::ErrorResponse,
        middlewares,
        snapshot::Snapshot,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(subjects_list_handler))
        .route("/{id}/lessons", get(subject_lessons_handler))
        .route("/{id}/quizzes", get(subject_quizzes_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// Load the snapshot for `subject_id` and refuse locked subjects.
async fn open_subject(state: &AppState, user_id: Uuid, subject_id: Uuid) -> WebResult<Snapshot> {
    let snapshot = Snapshot::load(state, user_id, Some(subject_id)).await?;

    let subject = snapshot
        .subject(subject_id)
        .ok_or(WebError::resource_not_found(Subject::get_resource_type()))?;

    if !snapshot.gate().is_subject_unlocked(subject.order_num()) {
        return Err(WebError::resource_locked(Subject::get_resource_type()));
    }
    Ok(snapshot)
}

#[utoipa::path(
    get,
    path = "/api/v1/subjects/",
    description = "List subjects in order with their unlock state",
    responses(
        (status = 200, description = "Subjects", body = Vec<SubjectResponse>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "subjects",
    security(
        ("cookie" = [])
    )
)]
async fn subjects_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let snapshot = Snapshot::load(&state, user.user_id(), None).await?;
    let gate = snapshot.gate();

    let subjects: Vec<SubjectResponse> = snapshot
        .subjects
        .iter()
        .map(|s| {
            SubjectResponse::new(
                s,
                gate.is_subject_unlocked(s.order_num()),
                gate.completed_lessons(s.id()),
                snapshot.lesson_count(s.id()),
            )
        })
        .collect();

    Ok((StatusCode::OK, Json(subjects)))
}

#[utoipa::path(
    get,
    path = "/api/v1/subjects/{subject_id}/lessons",
    description = "List the lessons of an unlocked subject",
    params(
        ("subject_id" = Uuid, Path, description = "ID of the subject")
    ),
    responses(
        (status = 200, description = "Lessons in order", body = Vec<LessonSummary>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Subject is still locked", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "subjects",
    security(
        ("cookie" = [])
    )
)]
async fn subject_lessons_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let snapshot = open_subject(&state, user.user_id(), id).await?;
    let gate = snapshot.gate();

    let lessons: Vec<LessonSummary> = snapshot
        .lessons
        .iter()
        .map(|l| {
            LessonSummary::new(
                l,
                gate.is_lesson_unlocked(id, l.order_num()),
                gate.is_lesson_completed(l.id()),
            )
        })
        .collect();

    Ok((StatusCode::OK, Json(lessons)))
}

#[utoipa::path(
    get,
    path = "/api/v1/subjects/{subject_id}/quizzes",
    description = "List the quizzes of an unlocked subject with scores",
    params(
        ("subject_id" = Uuid, Path, description = "ID of the subject")
    ),
    responses(
        (status = 200, description = "Quizzes in lesson order", body = Vec<QuizSummary>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Subject is still locked", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "subjects",
    security(
        ("cookie" = [])
    )
)]
async fn subject_quizzes_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let snapshot = open_subject(&state, user.user_id(), id).await?;
    let gate = snapshot.gate();

    let lesson_ids: Vec<Uuid> = snapshot.lessons.iter().map(|l| l.id()).collect();
    let quizzes = Quiz::all_for_lessons(state.mm(), &lesson_ids)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    // lessons are ordered, so walking them keeps quizzes in lesson order
    let mut summaries = Vec::with_capacity(quizzes.len());
    for lesson in &snapshot.lessons {
        for quiz in quizzes.iter().filter(|q| q.lesson_id() == lesson.id()) {
            let record = snapshot
                .progress
                .iter()
                .find(|p| p.quiz_id() == Some(quiz.id()) && p.is_completed());

            summaries.push(QuizSummary {
                id: quiz.id(),
                lesson_id: lesson.id(),
                title: quiz.title().to_string(),
                quarter: quarter_label(lesson.order_num()).to_string(),
                question_count: quiz.questions().len(),
                unlocked: gate.is_quiz_unlocked(quiz),
                completed: record.is_some(),
                score: record.and_then(|p| p.quiz_score()),
            });
        }
    }

    Ok((StatusCode::OK, Json(summaries)))
}
