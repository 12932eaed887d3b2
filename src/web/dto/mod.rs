pub mod lessons;
pub mod progress;
pub mod quiz_session;
pub mod quizzes;
pub mod subjects;
