mod context;
pub use context::{AuthenticatedUser, RequestContext};

mod error;
pub use error::{ErrorResponse, WebError, WebResult};

pub mod middlewares;

mod sessions;
pub use sessions::{ActiveQuiz, QuizSessions};

mod snapshot;

mod state;
pub use state::AppState;

pub mod dto;

pub mod routes;

pub mod doc;
