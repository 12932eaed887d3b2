use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Router, extract::State, middleware, response::IntoResponse, routing::get};
use uuid::Uuid;

use crate::learning::segment_lesson;
use crate::model::ResourceTyped;
use crate::model::entity::{Lesson, ProgressUpsert, Quiz, UserProgress};
use crate::web::dto::lessons::{LessonDoneResponse, LessonResponse};
use crate::web::error::ErrorResponse;
use crate::web::snapshot::Snapshot;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}", get(lessons_get_handler))
        .route("/{id}/done", post(lessons_mark_done_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// Find the lesson and make sure the user may open it.
async fn open_lesson(state: &AppState, user_id: Uuid, id: Uuid) -> WebResult<(Lesson, Snapshot)> {
    let lesson = Lesson::find_by_id(state.mm(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;

    let snapshot = Snapshot::load(state, user_id, Some(lesson.subject_id())).await?;

    let unlocked = {
        let gate = snapshot.gate();
        snapshot
            .subject(lesson.subject_id())
            .is_some_and(|s| gate.is_subject_unlocked(s.order_num()))
            && gate.is_lesson_unlocked(lesson.subject_id(), lesson.order_num())
    };

    if !unlocked {
        return Err(WebError::resource_locked(Lesson::get_resource_type()));
    }
    Ok((lesson, snapshot))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Fetch a lesson with its content split into sections",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to get")
    ),
    responses(
        (status = 200, description = "Lesson found", body = LessonResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Lesson is still locked", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let (lesson, snapshot) = open_lesson(&state, user.user_id(), id).await?;

    let response = LessonResponse {
        id: lesson.id(),
        subject_id: lesson.subject_id(),
        title: lesson.title().to_string(),
        order_num: lesson.order_num(),
        completed: snapshot.gate().is_lesson_completed(lesson.id()),
        outline: segment_lesson(lesson.content()),
    };

    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/done",
    description = "Mark lesson as done and point at its quiz",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to mark")
    ),
    responses(
        (status = 200, description = "Lesson marked", body = LessonDoneResponse),
        (status = 401, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 403, description = "Lesson is still locked", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_mark_done_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let (lesson, _) = open_lesson(&state, user.user_id(), id).await?;

    UserProgress::upsert(
        state.mm(),
        ProgressUpsert::lesson_completed(user.user_id(), lesson.subject_id(), lesson.id()),
    )
    .await
    .map_err(|e| WebError::resource_write_error(UserProgress::get_resource_type(), e))?;

    let quiz = Quiz::first_for_lesson(state.mm(), lesson.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(LessonDoneResponse {
            quiz_id: quiz.map(|q| q.id()),
        }),
    ))
}
