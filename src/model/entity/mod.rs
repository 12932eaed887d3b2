mod user;
pub use user::{User, UserCreate};

mod subject;
pub use subject::{Subject, SubjectCreate};

mod lesson;
pub use lesson::{Lesson, LessonCreate};

mod quiz;
pub use quiz::{Quiz, QuizCreate, QuizForm, QuizQuestion};

mod user_progress;
pub use user_progress::{ProgressUpsert, UserProgress};
