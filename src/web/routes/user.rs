use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    auth::{hash_password, verify_password},
    model::{
        DatabaseError, ResourceTyped,
        entity::{User, UserCreate},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        error::ErrorResponse,
        middlewares::{self, clear_session_cookie, issue_session_cookie},
    },
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SigninBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RenameBody {
    pub name: String,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/verify", get(user_verify_handler))
        .route("/me", get(user_me_handler).put(user_rename_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/signup", post(user_signup_handler))
        .route("/signin", post(user_signin_handler))
        .route("/signout", post(user_signout_handler))
        .merge(protected)
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signup",
    request_body = SignupBody,
    description = "Creates a new user and signs it in",
    responses(
        (status = 200, description = "User created successfully", body = User),
        (status = 409, description = "Email is already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account"
)]
async fn user_signup_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SignupBody>,
) -> WebResult<impl IntoResponse> {
    let found = User::find_by_email(state.mm(), &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(User::get_resource_type(), e))?;

    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let payload = UserCreate {
        name: payload.name,
        email: payload.email,
        password_hash: hash,
    };

    let created = User::create(state.mm(), payload).await.map_err(|e| match e {
        DatabaseError::Conflict(_) => WebError::registration_conflict(),
        e => WebError::resource_write_error(User::get_resource_type(), e),
    })?;
    tracing::info!(user_id = %created.id(), "user signed up");

    issue_session_cookie(&cookies, state.config().app().jwt(), &created)?;
    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signin",
    description = "Signs a user in with email and password",
    request_body = SigninBody,
    responses(
        (status = 200, description = "User signed in", body = User),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
)]
async fn user_signin_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SigninBody>,
) -> WebResult<impl IntoResponse> {
    let found = User::find_by_email(state.mm(), &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(User::get_resource_type(), e))?
        .ok_or(WebError::auth_invalid_credentials())?;

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    issue_session_cookie(&cookies, state.config().app().jwt(), &found)?;
    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signout",
    description = "Drops the session cookie",
    responses(
        (status = 200, description = "Signed out"),
    ),
    tag = "account",
)]
async fn user_signout_handler(cookies: Cookies) -> impl IntoResponse {
    clear_session_cookie(&cookies);
    StatusCode::OK
}

async fn user_verify_handler(ctx: RequestContext) -> WebResult<impl IntoResponse> {
    let user = ctx.maybe_user();

    if user.is_none() {
        return Ok(StatusCode::UNAUTHORIZED);
    }

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/account/me",
    description = "Returns the signed-in user",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
async fn user_me_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = User::find_by_id(state.mm(), user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(User::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(User::get_resource_type()))?;

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    put,
    path = "/api/v1/account/me",
    request_body = RenameBody,
    description = "Changes the display name and reissues the session",
    responses(
        (status = 200, description = "User renamed", body = User),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
async fn user_rename_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<RenameBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = User::find_by_id(state.mm(), user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(User::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(User::get_resource_type()))?;

    let renamed = found
        .rename(state.mm(), payload.name)
        .await
        .map_err(|e| WebError::resource_write_error(User::get_resource_type(), e))?;

    issue_session_cookie(&cookies, state.config().app().jwt(), &renamed)?;
    Ok((StatusCode::OK, Json(renamed)))
}
