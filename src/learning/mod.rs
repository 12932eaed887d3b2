//! Application logic that does not touch storage or HTTP.

pub mod content;
pub mod gate;
pub mod leaderboard;
pub mod session;

pub use content::{LessonOutline, segment_lesson};
pub use gate::{DEFAULT_LESSONS_PER_SUBJECT, LessonQuota, ProgressionGate, quarter_label};
pub use leaderboard::{Badge, LeaderboardEntry};
pub use session::{Advance, AnswerOutcome, QuizSession, QuizSessionError, SessionState};
