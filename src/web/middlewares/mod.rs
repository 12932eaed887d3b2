mod auth;
pub use auth::{AUTH_TOKEN, clear_session_cookie, extract_context_fn, issue_session_cookie};
