use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::{
    entity::{
        Lesson, LessonCreate, ProgressUpsert, Quiz, QuizCreate, Subject, SubjectCreate, User,
        UserCreate, UserProgress,
    },
    error::{DatabaseError, DatabaseResult},
    store::Store,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<Uuid, User>,
    subjects: Vec<Subject>,
    lessons: Vec<Lesson>,
    quizzes: Vec<Quiz>,
    progress: Vec<UserProgress>,
}

impl Tables {
    fn upsert_progress(&mut self, data: ProgressUpsert) -> DatabaseResult<UserProgress> {
        if !self.users.contains_key(&data.user_id) {
            return Err(DatabaseError::MissingReference("user"));
        }
        if !self.subjects.iter().any(|s| s.id() == data.subject_id) {
            return Err(DatabaseError::MissingReference("subject"));
        }
        if !self.lessons.iter().any(|l| l.id() == data.lesson_id) {
            return Err(DatabaseError::MissingReference("lesson"));
        }

        let existing = self.progress.iter_mut().find(|p| {
            p.user_id() == data.user_id
                && p.subject_id() == data.subject_id
                && p.lesson_id() == data.lesson_id
        });

        let record = match existing {
            Some(record) => {
                record.merge(&data);
                record.clone()
            }
            None => {
                let record = UserProgress::new(Uuid::new_v4(), data);
                self.progress.push(record.clone());
                record
            }
        };
        Ok(record)
    }
}

/// Store kept entirely in process memory. Contents die with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(&self, data: UserCreate) -> DatabaseResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email() == data.email) {
            return Err(DatabaseError::Conflict("users.email"));
        }

        let user = User::new(Uuid::new_v4(), data.name, data.email, data.password_hash);
        tables.users.insert(user.id(), user.clone());
        tracing::debug!(user_id = %user.id(), "user inserted");
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email() == email).cloned())
    }

    async fn update_user_name(&self, id: Uuid, name: &str) -> DatabaseResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.get_mut(&id) {
            user.set_name(name.to_string());
        }
        Ok(())
    }

    async fn list_users(&self) -> DatabaseResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn insert_subject(&self, data: SubjectCreate) -> DatabaseResult<Subject> {
        let mut tables = self.tables.write().await;
        if tables.subjects.iter().any(|s| s.order_num() == data.order_num) {
            return Err(DatabaseError::Conflict("subjects.order_num"));
        }

        let subject = Subject::new(Uuid::new_v4(), data.name, data.order_num);
        tables.subjects.push(subject.clone());
        Ok(subject)
    }

    async fn find_subject(&self, id: Uuid) -> DatabaseResult<Option<Subject>> {
        let tables = self.tables.read().await;
        Ok(tables.subjects.iter().find(|s| s.id() == id).cloned())
    }

    async fn list_subjects(&self) -> DatabaseResult<Vec<Subject>> {
        let mut subjects = self.tables.read().await.subjects.clone();
        subjects.sort_by_key(|s| s.order_num());
        Ok(subjects)
    }

    async fn insert_lesson(&self, data: LessonCreate) -> DatabaseResult<Lesson> {
        let mut tables = self.tables.write().await;
        if !tables.subjects.iter().any(|s| s.id() == data.subject_id) {
            return Err(DatabaseError::MissingReference("subject"));
        }
        if tables
            .lessons
            .iter()
            .any(|l| l.subject_id() == data.subject_id && l.order_num() == data.order_num)
        {
            return Err(DatabaseError::Conflict("lessons.order_num"));
        }

        let lesson = Lesson::new(
            Uuid::new_v4(),
            data.subject_id,
            data.order_num,
            data.title,
            data.content,
        );
        tables.lessons.push(lesson.clone());
        Ok(lesson)
    }

    async fn find_lesson(&self, id: Uuid) -> DatabaseResult<Option<Lesson>> {
        let tables = self.tables.read().await;
        Ok(tables.lessons.iter().find(|l| l.id() == id).cloned())
    }

    async fn list_lessons(&self, subject_id: Uuid) -> DatabaseResult<Vec<Lesson>> {
        let tables = self.tables.read().await;
        let mut lessons: Vec<Lesson> = tables
            .lessons
            .iter()
            .filter(|l| l.subject_id() == subject_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.order_num());
        Ok(lessons)
    }

    async fn lesson_counts(&self) -> DatabaseResult<HashMap<Uuid, usize>> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for lesson in &tables.lessons {
            *counts.entry(lesson.subject_id()).or_default() += 1;
        }
        Ok(counts)
    }

    async fn insert_quiz(&self, data: QuizCreate) -> DatabaseResult<Quiz> {
        let mut tables = self.tables.write().await;
        if !tables.lessons.iter().any(|l| l.id() == data.lesson_id) {
            return Err(DatabaseError::MissingReference("lesson"));
        }

        let quiz = Quiz::new(Uuid::new_v4(), data.lesson_id, data.title, data.form);
        tables.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn find_quiz(&self, id: Uuid) -> DatabaseResult<Option<Quiz>> {
        let tables = self.tables.read().await;
        Ok(tables.quizzes.iter().find(|q| q.id() == id).cloned())
    }

    async fn first_quiz_for_lesson(&self, lesson_id: Uuid) -> DatabaseResult<Option<Quiz>> {
        let tables = self.tables.read().await;
        Ok(tables
            .quizzes
            .iter()
            .find(|q| q.lesson_id() == lesson_id)
            .cloned())
    }

    async fn list_quizzes(&self, lesson_ids: &[Uuid]) -> DatabaseResult<Vec<Quiz>> {
        let tables = self.tables.read().await;
        Ok(tables
            .quizzes
            .iter()
            .filter(|q| lesson_ids.contains(&q.lesson_id()))
            .cloned()
            .collect())
    }

    async fn list_progress(
        &self,
        user_id: Uuid,
        subject_id: Option<Uuid>,
    ) -> DatabaseResult<Vec<UserProgress>> {
        let tables = self.tables.read().await;
        Ok(tables
            .progress
            .iter()
            .filter(|p| p.user_id() == user_id)
            .filter(|p| subject_id.is_none_or(|s| p.subject_id() == s))
            .cloned()
            .collect())
    }

    async fn list_all_progress(&self) -> DatabaseResult<Vec<UserProgress>> {
        Ok(self.tables.read().await.progress.clone())
    }

    async fn upsert_progress(&self, data: ProgressUpsert) -> DatabaseResult<UserProgress> {
        let record = self.tables.write().await.upsert_progress(data)?;
        tracing::debug!(progress_id = %record.id(), "progress upserted");
        Ok(record)
    }

    async fn record_quiz_completion(
        &self,
        data: ProgressUpsert,
        user_name: &str,
    ) -> DatabaseResult<UserProgress> {
        let mut tables = self.tables.write().await;
        let record = tables.upsert_progress(data)?;
        if let Some(user) = tables.users.get_mut(&record.user_id()) {
            user.set_name(user_name.to_string());
        }
        tracing::debug!(progress_id = %record.id(), "quiz completion recorded");
        Ok(record)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::entity::{QuizForm, QuizQuestion};

    struct Seeded {
        store: MemoryStore,
        user: User,
        subject: Subject,
        lesson: Lesson,
    }

    async fn seeded() -> Seeded {
        let store = MemoryStore::new();
        let user = store
            .insert_user(UserCreate {
                name: String::from("Ana"),
                email: String::from("ana@example.com"),
                password_hash: String::new(),
            })
            .await
            .unwrap();
        let subject = store
            .insert_subject(SubjectCreate {
                name: String::from("ICT"),
                order_num: 1,
            })
            .await
            .unwrap();
        let lesson = store
            .insert_lesson(LessonCreate {
                subject_id: subject.id(),
                order_num: 1,
                title: String::from("Trends"),
                content: String::new(),
            })
            .await
            .unwrap();
        Seeded {
            store,
            user,
            subject,
            lesson,
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let s = seeded().await;
        let err = s
            .store
            .insert_user(UserCreate {
                name: String::from("Other"),
                email: String::from("ana@example.com"),
                password_hash: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn upsert_keeps_one_record_per_lesson() {
        let s = seeded().await;
        let (user, subject, lesson) = (s.user.id(), s.subject.id(), s.lesson.id());
        let quiz = Uuid::new_v4();

        s.store
            .upsert_progress(ProgressUpsert::quiz_result(user, subject, lesson, quiz, 67))
            .await
            .unwrap();
        s.store
            .upsert_progress(ProgressUpsert::lesson_completed(user, subject, lesson))
            .await
            .unwrap();

        let progress = s.store.list_progress(user, Some(subject)).await.unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].quiz_score(), Some(67));
        assert!(progress[0].is_completed());
    }

    #[tokio::test]
    async fn quiz_completion_renames_the_user() {
        let s = seeded().await;
        let upsert =
            ProgressUpsert::quiz_result(s.user.id(), s.subject.id(), s.lesson.id(), Uuid::new_v4(), 99);

        s.store.record_quiz_completion(upsert, "Ana B").await.unwrap();

        let user = s.store.find_user(s.user.id()).await.unwrap().unwrap();
        assert_eq!(user.name(), "Ana B");
    }

    #[tokio::test]
    async fn failed_completion_writes_nothing() {
        let s = seeded().await;
        let upsert = ProgressUpsert::quiz_result(
            s.user.id(),
            s.subject.id(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            99,
        );

        let err = s.store.record_quiz_completion(upsert, "Renamed").await.unwrap_err();
        assert!(matches!(err, DatabaseError::MissingReference("lesson")));

        let user = s.store.find_user(s.user.id()).await.unwrap().unwrap();
        assert_eq!(user.name(), "Ana");
        assert!(s.store.list_all_progress().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_order_numbers_conflict() {
        let s = seeded().await;
        let err = s
            .store
            .insert_subject(SubjectCreate {
                name: String::from("Also first"),
                order_num: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict("subjects.order_num")));

        let err = s
            .store
            .insert_lesson(LessonCreate {
                subject_id: s.subject.id(),
                order_num: 1,
                title: String::from("Also first"),
                content: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict("lessons.order_num")));

        // same position in another subject is fine
        let other = s
            .store
            .insert_subject(SubjectCreate {
                name: String::from("Second"),
                order_num: 2,
            })
            .await
            .unwrap();
        s.store
            .insert_lesson(LessonCreate {
                subject_id: other.id(),
                order_num: 1,
                title: String::from("First of second"),
                content: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(s.store.list_subjects().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn listings_are_ordered() {
        let s = seeded().await;
        s.store
            .insert_subject(SubjectCreate {
                name: String::from("Zero"),
                order_num: 0,
            })
            .await
            .unwrap();
        s.store
            .insert_lesson(LessonCreate {
                subject_id: s.subject.id(),
                order_num: 0,
                title: String::from("Intro"),
                content: String::new(),
            })
            .await
            .unwrap();

        let subjects = s.store.list_subjects().await.unwrap();
        assert_eq!(subjects[0].name(), "Zero");

        let lessons = s.store.list_lessons(s.subject.id()).await.unwrap();
        assert_eq!(lessons[0].title(), "Intro");

        let counts = s.store.lesson_counts().await.unwrap();
        assert_eq!(counts.get(&s.subject.id()), Some(&2));
    }

    #[tokio::test]
    async fn quizzes_by_lesson() {
        let s = seeded().await;
        let quiz = s
            .store
            .insert_quiz(QuizCreate {
                lesson_id: s.lesson.id(),
                title: String::from("Quiz"),
                form: QuizForm::Single(QuizQuestion {
                    question: String::from("?"),
                    options: [(String::from("A"), String::from("a"))].into(),
                    correct_answer: String::from("A"),
                }),
            })
            .await
            .unwrap();

        let first = s.store.first_quiz_for_lesson(s.lesson.id()).await.unwrap();
        assert_eq!(first.map(|q| q.id()), Some(quiz.id()));
        assert_eq!(s.store.list_quizzes(&[s.lesson.id()]).await.unwrap().len(), 1);
        assert!(s.store.list_quizzes(&[]).await.unwrap().is_empty());
    }
}
