use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use learnpath::error::AppResult;
use learnpath::model::entity::{
    Lesson, LessonCreate, Quiz, QuizCreate, QuizForm, Subject, SubjectCreate, User, UserCreate,
};
use learnpath::model::{DatabaseError, DbConnection, ModelManager};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the learning DB", long_about = None)]
pub struct Cli {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply the schema migrations
    Migrate {
        #[arg(long, default_value = "./migrations")]
        dir: PathBuf,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage subjects
    Subject {
        #[command(subcommand)]
        action: SubjectCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Manage quizzes
    Quiz {
        #[command(subcommand)]
        action: QuizCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

/// Subject management
#[derive(Subcommand, Debug)]
pub enum SubjectCommands {
    Add {
        #[arg(long)]
        name: String,
        /// Position in the unlock chain, starting at 1
        #[arg(long)]
        order: i32,
    },
    List,
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        /// Order of the subject to attach the lesson to
        #[arg(long)]
        subject: i32,
        #[arg(long)]
        title: String,
        /// Path to a text file with lesson content
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        order: i32,
    },
}

/// Quiz management
#[derive(Subcommand, Debug)]
pub enum QuizCommands {
    Add {
        /// Order of the lesson's subject
        #[arg(long)]
        subject: i32,
        /// Order of the lesson inside the subject
        #[arg(long)]
        lesson: i32,
        #[arg(long)]
        title: String,
        /// JSON file with either `{"questions": [...]}` or a single question
        #[arg(long)]
        file: PathBuf,
    },
}

async fn subject_by_order(mm: &ModelManager, order: i32) -> AppResult<Subject> {
    let subject = Subject::list(mm)
        .await?
        .into_iter()
        .find(|s| s.order_num() == order)
        .ok_or(DatabaseError::MissingReference("subject"))?;
    Ok(subject)
}

async fn lesson_by_order(mm: &ModelManager, subject: i32, order: i32) -> AppResult<Lesson> {
    let subject = subject_by_order(mm, subject).await?;
    let lesson = Lesson::all_by_subject(mm, subject.id())
        .await?
        .into_iter()
        .find(|l| l.order_num() == order)
        .ok_or(DatabaseError::MissingReference("lesson"))?;
    Ok(lesson)
}

fn read_quiz_form(path: &Path) -> AppResult<QuizForm> {
    let raw = std::fs::read_to_string(path)?;
    let form = serde_json::from_str(&raw).map_err(DatabaseError::SerdeError)?;
    Ok(form)
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let db = DbConnection::connect(&args.database_url)?;

    if let Commands::Migrate { dir } = &args.command {
        db.migrate(dir).await?;
        println!("Migrations applied from {}", dir.display());
        return Ok(());
    }

    let mm = ModelManager::postgres(db);

    match args.command {
        Commands::Migrate { .. } => {}

        Commands::User { action } => match action {
            UserCommands::Add { name, email, password } => {
                let user = User::create(
                    &mm,
                    UserCreate {
                        name,
                        email,
                        password_hash: learnpath::auth::hash_password(&password)?,
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Subject { action } => match action {
            SubjectCommands::Add { name, order } => {
                let subject = Subject::create(&mm, SubjectCreate { name, order_num: order }).await?;
                println!("Subject created: {:?}", subject);
            }
            SubjectCommands::List => {
                for subject in Subject::list(&mm).await? {
                    println!("{:>3}  {}  {}", subject.order_num(), subject.id(), subject.name());
                }
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add { subject, title, file, order } => {
                let subject = subject_by_order(&mm, subject).await?;
                let content = std::fs::read_to_string(file)?;

                let lesson = Lesson::create(
                    &mm,
                    LessonCreate {
                        subject_id: subject.id(),
                        order_num: order,
                        title,
                        content,
                    },
                )
                .await?;
                println!("Lesson created: {} ({})", lesson.title(), lesson.id());
            }
        },

        Commands::Quiz { action } => match action {
            QuizCommands::Add { subject, lesson, title, file } => {
                let lesson = lesson_by_order(&mm, subject, lesson).await?;
                let form = read_quiz_form(&file)?;

                let quiz = Quiz::create(
                    &mm,
                    QuizCreate {
                        lesson_id: lesson.id(),
                        title,
                        form,
                    },
                )
                .await?;
                println!(
                    "Quiz created: {} ({}), {} question(s)",
                    quiz.title(),
                    quiz.id(),
                    quiz.questions().len()
                );
            }
        },
    }

    Ok(())
}
