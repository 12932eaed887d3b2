use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    learning::{Advance, QuizSession},
    model::{
        ResourceTyped,
        entity::{Lesson, ProgressUpsert, Quiz, UserProgress},
    },
    web::{
        ActiveQuiz, AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::quiz_session::{
            AdvanceResponse, QuizResult, QuizSessionView, SelectAnswerBody, StartQuizBody,
            SubmitResponse,
        },
        error::ErrorResponse,
        middlewares,
        snapshot::Snapshot,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/",
            post(quiz_start_handler)
                .get(quiz_get_handler)
                .delete(quiz_exit_handler),
        )
        .route("/select", post(quiz_select_handler))
        .route("/submit", post(quiz_submit_handler))
        .route("/advance", post(quiz_advance_handler))
        .route("/save", post(quiz_save_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn view(state: &AppState, active: &ActiveQuiz) -> QuizSessionView {
    QuizSessionView::new(active, state.config().quiz().feedback_hold_ms())
}

/// Persist a finished run. The run stays registered when the write fails.
async fn save_result(
    state: &AppState,
    user: &AuthenticatedUser,
    active: &ActiveQuiz,
) -> WebResult<QuizResult> {
    let score = active.session.ensure_finished()?;

    let upsert = ProgressUpsert::quiz_result(
        user.user_id(),
        active.subject_id,
        active.lesson_id,
        active.quiz_id,
        score,
    );
    UserProgress::record_quiz(state.mm(), upsert, user.name())
        .await
        .map_err(|e| WebError::resource_write_error(UserProgress::get_resource_type(), e))?;

    state
        .sessions()
        .remove_finished(user.user_id(), active.quiz_id)
        .await;
    tracing::info!(user_id = %user.user_id(), quiz_id = %active.quiz_id, score, "quiz result saved");

    Ok(QuizResult {
        quiz_id: active.quiz_id,
        score,
        correct_count: active.session.correct_count(),
        question_count: active.session.question_count(),
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/quiz-session/",
    request_body = StartQuizBody,
    description = "Start an unlocked quiz, replacing any quiz in progress",
    responses(
        (status = 200, description = "First question", body = QuizSessionView),
        (status = 400, description = "Quiz has no questions", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "Quiz is still locked", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_start_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<StartQuizBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let quiz = Quiz::find_by_id(state.mm(), payload.quiz_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Quiz::get_resource_type()))?;

    let lesson = Lesson::find_by_id(state.mm(), quiz.lesson_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;

    let snapshot = Snapshot::load(&state, user.user_id(), Some(lesson.subject_id())).await?;
    let unlocked = {
        let gate = snapshot.gate();
        snapshot
            .subject(lesson.subject_id())
            .is_some_and(|s| gate.is_subject_unlocked(s.order_num()))
            && gate.is_quiz_unlocked(&quiz)
    };
    if !unlocked {
        return Err(WebError::resource_locked(Quiz::get_resource_type()));
    }

    let session = QuizSession::start(quiz.questions(), &mut rand::rng())?;
    let active = ActiveQuiz {
        quiz_id: quiz.id(),
        title: quiz.title().to_string(),
        subject_id: lesson.subject_id(),
        lesson_id: lesson.id(),
        session,
    };
    let active = state.sessions().start(user.user_id(), active).await;
    tracing::debug!(user_id = %user.user_id(), quiz_id = %active.quiz_id, "quiz started");

    Ok((StatusCode::OK, Json(view(&state, &active))))
}

#[utoipa::path(
    get,
    path = "/api/v1/quiz-session/",
    description = "Current state of the quiz in progress",
    responses(
        (status = 200, description = "Quiz in progress", body = QuizSessionView),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "No quiz in progress", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let active = state
        .sessions()
        .get(user.user_id())
        .await
        .ok_or(WebError::session_not_found())?;

    Ok((StatusCode::OK, Json(view(&state, &active))))
}

#[utoipa::path(
    post,
    path = "/api/v1/quiz-session/select",
    request_body = SelectAnswerBody,
    description = "Pick an option for the current question; picking again replaces it",
    responses(
        (status = 200, description = "Answer selected", body = QuizSessionView),
        (status = 400, description = "Unknown option or wrong step", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "No quiz in progress", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_select_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<SelectAnswerBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let hold = state.config().quiz().feedback_hold_ms();

    let view = state
        .sessions()
        .update(user.user_id(), |active| {
            active
                .session
                .select(&payload.answer)
                .map(|_| QuizSessionView::new(active, hold))
        })
        .await
        .ok_or(WebError::session_not_found())??;

    Ok((StatusCode::OK, Json(view)))
}

#[utoipa::path(
    post,
    path = "/api/v1/quiz-session/submit",
    description = "Grade the selected answer",
    responses(
        (status = 200, description = "Feedback for the answer", body = SubmitResponse),
        (status = 400, description = "No answer selected or wrong step", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "No quiz in progress", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_submit_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let hold = state.config().quiz().feedback_hold_ms();

    let response = state
        .sessions()
        .update(user.user_id(), |active| {
            active.session.submit().map(|outcome| SubmitResponse {
                outcome,
                score: active.session.score(),
                feedback_hold_ms: hold,
            })
        })
        .await
        .ok_or(WebError::session_not_found())??;

    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/quiz-session/advance",
    description = "Leave the feedback step; finishing the last question stores the score",
    responses(
        (status = 200, description = "Next question or final result", body = AdvanceResponse),
        (status = 400, description = "Not showing feedback", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "No quiz in progress", body = ErrorResponse),
        (status = 500, description = "Result could not be stored, retry with save", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_advance_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let (step, active) = state
        .sessions()
        .update(user.user_id(), |active| {
            active.session.advance().map(|step| (step, active.clone()))
        })
        .await
        .ok_or(WebError::session_not_found())??;

    let result = match step {
        Advance::Next(_) => None,
        Advance::Finished { .. } => Some(save_result(&state, user, &active).await?),
    };

    Ok((
        StatusCode::OK,
        Json(AdvanceResponse {
            session: view(&state, &active),
            result,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/quiz-session/save",
    description = "Store the score of a finished quiz whose earlier save failed",
    responses(
        (status = 200, description = "Result stored", body = QuizResult),
        (status = 400, description = "Quiz is not finished", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "No quiz in progress", body = ErrorResponse),
        (status = 500, description = "Result could not be stored", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_save_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let active = state
        .sessions()
        .get(user.user_id())
        .await
        .ok_or(WebError::session_not_found())?;

    let result = save_result(&state, user, &active).await?;
    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/quiz-session/",
    description = "Leave the quiz without saving; not allowed while feedback is shown",
    responses(
        (status = 200, description = "Quiz discarded"),
        (status = 400, description = "Quiz cannot be left right now", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 404, description = "No quiz in progress", body = ErrorResponse),
    ),
    tag = "quiz",
    security(
        ("cookie" = [])
    )
)]
async fn quiz_exit_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let dropped = state
        .sessions()
        .cancel(user.user_id())
        .await
        .ok_or(WebError::session_not_found())??;
    tracing::debug!(user_id = %user.user_id(), quiz_id = %dropped.quiz_id, "quiz discarded");

    Ok(StatusCode::OK)
}
