use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;

use crate::{
    auth::{self, UserClaims},
    model::{ResourceTyped, entity::User},
    web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError},
};

pub static AUTH_TOKEN: &str = "SID";

/// Sign a session for `user` and store it in the `SID` cookie.
pub fn issue_session_cookie(
    cookies: &Cookies,
    jwt_key: &str,
    user: &User,
) -> Result<(), WebError> {
    let claims = UserClaims::for_user(user.id(), user.name());
    let token = auth::generate_token(claims, jwt_key)
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
    Ok(())
}

pub fn clear_session_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::from(AUTH_TOKEN);
    cookie.set_path("/");
    cookies.remove(cookie);
}

pub async fn extract_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = match cookies.get(AUTH_TOKEN) {
        Some(token) => token,
        None => {
            req.extensions_mut().insert(RequestContext::new(None));
            return Ok(next.run(req).await);
        }
    };

    let claims = auth::process_token(token.value(), state.config().app().jwt())
        .map_err(|e| WebError::auth_cookie_invalid(AUTH_TOKEN, e))?
        .claims;

    let id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| WebError::auth_cookie_invalid(AUTH_TOKEN, ErrorKind::InvalidSubject.into()))?;

    let found = User::find_by_id(state.mm(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(User::get_resource_type(), e))?;

    let ctx = match found {
        Some(_) => RequestContext::new(Some(AuthenticatedUser::new(id, claims.name))),
        None => RequestContext::new(None),
    };
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}
