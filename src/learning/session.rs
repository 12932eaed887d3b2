//! The question-by-question quiz flow.
//!
//! A [`QuizSession`] walks `Presenting -> AnswerSelected -> Feedback` for each
//! question and ends in `Finished`. Invalid transitions are rejected without
//! touching the session.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::model::entity::QuizQuestion;

pub const CORRECT_MESSAGE: &str = "Great job! That's correct! 🎉";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizSessionError {
    #[error("quiz has no questions")]
    EmptyQuiz,
    #[error("'{0}' is not an option of the current question")]
    UnknownOption(String),
    #[error("no answer selected")]
    NoAnswerSelected,
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

pub type SessionResult<T> = Result<T, QuizSessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub awarded: i32,
    pub correct_answer: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Presenting {
        index: usize,
    },
    AnswerSelected {
        index: usize,
        answer: String,
    },
    Feedback {
        index: usize,
        answer: String,
        outcome: AnswerOutcome,
    },
    Finished,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Presenting { .. } => "presenting",
            SessionState::AnswerSelected { .. } => "answer selected",
            SessionState::Feedback { .. } => "showing feedback",
            SessionState::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next(usize),
    Finished { score: i32 },
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    state: SessionState,
    points_per_question: i32,
    score: i32,
    correct: usize,
}

/// Points for one correct answer, so that a perfect run scores about 100.
pub fn points_for(question_count: usize) -> i32 {
    if question_count == 0 {
        return 0;
    }
    (100.0 / question_count as f64).round() as i32
}

/// In-place Fisher-Yates: walk from the end, swap with a uniform index at or
/// below the cursor.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

impl QuizSession {
    pub fn start<R: Rng + ?Sized>(
        mut questions: Vec<QuizQuestion>,
        rng: &mut R,
    ) -> SessionResult<Self> {
        if questions.is_empty() {
            return Err(QuizSessionError::EmptyQuiz);
        }
        shuffle(&mut questions, rng);

        Ok(Self {
            points_per_question: points_for(questions.len()),
            questions,
            state: SessionState::Presenting { index: 0 },
            score: 0,
            correct: 0,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn points_per_question(&self) -> i32 {
        self.points_per_question
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn correct_count(&self) -> usize {
        self.correct
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished)
    }

    /// The question on screen, `None` once finished.
    pub fn current_question(&self) -> Option<(usize, &QuizQuestion)> {
        let index = match &self.state {
            SessionState::Presenting { index }
            | SessionState::AnswerSelected { index, .. }
            | SessionState::Feedback { index, .. } => *index,
            SessionState::Finished => return None,
        };
        self.questions.get(index).map(|q| (index, q))
    }

    fn invalid(&self, action: &'static str) -> QuizSessionError {
        QuizSessionError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    pub fn select(&mut self, key: &str) -> SessionResult<()> {
        let index = match &self.state {
            SessionState::Presenting { index } | SessionState::AnswerSelected { index, .. } => {
                *index
            }
            _ => return Err(self.invalid("select an answer")),
        };

        if !self.questions[index].options.contains_key(key) {
            return Err(QuizSessionError::UnknownOption(key.to_string()));
        }

        self.state = SessionState::AnswerSelected {
            index,
            answer: key.to_string(),
        };
        Ok(())
    }

    pub fn submit(&mut self) -> SessionResult<AnswerOutcome> {
        let (index, answer) = match &self.state {
            SessionState::AnswerSelected { index, answer } if !answer.is_empty() => {
                (*index, answer.clone())
            }
            SessionState::Presenting { .. } => return Err(QuizSessionError::NoAnswerSelected),
            _ => return Err(self.invalid("submit")),
        };

        let question = &self.questions[index];
        let is_correct = answer == question.correct_answer;
        let awarded = if is_correct { self.points_per_question } else { 0 };
        let message = if is_correct {
            CORRECT_MESSAGE.to_string()
        } else {
            format!("Not quite! The correct answer was {}.", question.correct_answer)
        };

        let outcome = AnswerOutcome {
            is_correct,
            awarded,
            correct_answer: question.correct_answer.clone(),
            message,
        };

        self.score += awarded;
        if is_correct {
            self.correct += 1;
        }
        tracing::debug!(index, is_correct, score = self.score, "answer submitted");

        self.state = SessionState::Feedback {
            index,
            answer,
            outcome: outcome.clone(),
        };
        Ok(outcome)
    }

    pub fn advance(&mut self) -> SessionResult<Advance> {
        let SessionState::Feedback { index, .. } = self.state else {
            return Err(self.invalid("advance"));
        };

        let next = index + 1;
        if next < self.questions.len() {
            self.state = SessionState::Presenting { index: next };
            Ok(Advance::Next(next))
        } else {
            tracing::debug!(score = self.score, correct = self.correct, "quiz finished");
            self.state = SessionState::Finished;
            Ok(Advance::Finished { score: self.score })
        }
    }

    /// Exit is only possible while a question is waiting for an answer.
    pub fn ensure_cancellable(&self) -> SessionResult<()> {
        match self.state {
            SessionState::Presenting { .. } | SessionState::AnswerSelected { .. } => Ok(()),
            _ => Err(self.invalid("exit")),
        }
    }

    pub fn ensure_finished(&self) -> SessionResult<i32> {
        match self.state {
            SessionState::Finished => Ok(self.score),
            _ => Err(self.invalid("save")),
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn question(n: usize, correct: &str) -> QuizQuestion {
        let options: BTreeMap<String, String> = ["A", "B", "C", "D"]
            .into_iter()
            .map(|k| (k.to_string(), format!("option {k}")))
            .collect();
        QuizQuestion {
            question: format!("Question {n}"),
            options,
            correct_answer: correct.to_string(),
        }
    }

    fn questions(n: usize) -> Vec<QuizQuestion> {
        (0..n).map(|i| question(i, "A")).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn answer_current(session: &mut QuizSession, correct: bool) -> AnswerOutcome {
        let (_, q) = session.current_question().unwrap();
        let key = if correct {
            q.correct_answer.clone()
        } else {
            q.options.keys().find(|k| **k != q.correct_answer).unwrap().clone()
        };
        session.select(&key).unwrap();
        session.submit().unwrap()
    }

    #[test]
    fn empty_quiz_cannot_start() {
        let err = QuizSession::start(Vec::new(), &mut rng()).unwrap_err();
        assert_eq!(err, QuizSessionError::EmptyQuiz);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..50).collect();
        shuffle(&mut items, &mut rng());

        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_is_deterministic_for_a_seed() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        shuffle(&mut a, &mut StdRng::seed_from_u64(42));
        shuffle(&mut b, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn points_are_rounded() {
        assert_eq!(points_for(1), 100);
        assert_eq!(points_for(3), 33);
        assert_eq!(points_for(6), 17);
    }

    #[test]
    fn three_correct_answers_score_99() {
        let mut session = QuizSession::start(questions(3), &mut rng()).unwrap();

        for i in 0..3 {
            let outcome = answer_current(&mut session, true);
            assert!(outcome.is_correct);
            assert_eq!(outcome.awarded, 33);
            assert_eq!(outcome.message, CORRECT_MESSAGE);

            let step = session.advance().unwrap();
            if i < 2 {
                assert_eq!(step, Advance::Next(i + 1));
            } else {
                assert_eq!(step, Advance::Finished { score: 99 });
            }
        }

        assert!(session.is_finished());
        assert_eq!(session.score(), 99);
        assert_eq!(session.correct_count(), 3);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn wrong_answer_names_the_key() {
        let mut session = QuizSession::start(vec![question(0, "C")], &mut rng()).unwrap();
        let outcome = answer_current(&mut session, false);

        assert!(!outcome.is_correct);
        assert_eq!(outcome.awarded, 0);
        assert_eq!(outcome.correct_answer, "C");
        assert_eq!(outcome.message, "Not quite! The correct answer was C.");
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn reselection_overwrites_the_pending_answer() {
        let mut session = QuizSession::start(vec![question(0, "B")], &mut rng()).unwrap();
        session.select("A").unwrap();
        session.select("B").unwrap();

        assert_eq!(
            session.state(),
            &SessionState::AnswerSelected {
                index: 0,
                answer: String::from("B")
            }
        );
        assert!(session.submit().unwrap().is_correct);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut session = QuizSession::start(questions(1), &mut rng()).unwrap();
        let err = session.select("Z").unwrap_err();
        assert_eq!(err, QuizSessionError::UnknownOption(String::from("Z")));
        assert_eq!(session.state(), &SessionState::Presenting { index: 0 });
    }

    #[test]
    fn submit_without_answer_is_rejected() {
        let mut session = QuizSession::start(questions(1), &mut rng()).unwrap();
        assert_eq!(
            session.submit().unwrap_err(),
            QuizSessionError::NoAnswerSelected
        );
    }

    #[test]
    fn feedback_blocks_selection_submit_and_exit() {
        let mut session = QuizSession::start(questions(2), &mut rng()).unwrap();
        answer_current(&mut session, true);

        assert!(matches!(
            session.select("A"),
            Err(QuizSessionError::InvalidTransition { .. })
        ));
        assert!(matches!(
            session.submit(),
            Err(QuizSessionError::InvalidTransition { .. })
        ));
        assert!(session.ensure_cancellable().is_err());

        session.advance().unwrap();
        assert!(session.ensure_cancellable().is_ok());
    }

    #[test]
    fn advance_requires_feedback() {
        let mut session = QuizSession::start(questions(1), &mut rng()).unwrap();
        assert!(session.advance().is_err());

        answer_current(&mut session, false);
        assert!(session.ensure_finished().is_err());
        assert_eq!(session.advance().unwrap(), Advance::Finished { score: 0 });
        assert_eq!(session.ensure_finished(), Ok(0));
        assert!(session.advance().is_err());
        assert!(session.ensure_cancellable().is_err());
    }

    #[test]
    fn mixed_run_accumulates_only_correct_points() {
        let mut session = QuizSession::start(questions(4), &mut rng()).unwrap();
        for correct in [true, false, true, false] {
            answer_current(&mut session, correct);
            session.advance().unwrap();
        }
        assert_eq!(session.score(), 50);
        assert_eq!(session.correct_count(), 2);
    }
}
