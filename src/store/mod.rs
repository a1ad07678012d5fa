// src/store/mod.rs

//! Quiz record store: the persistence seam behind the builder, the player and
//! the HTTP handlers.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgQuizStore;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::dashboard::Dashboard;
use crate::models::quiz::{
    CreateQuizRequest, Question, Quiz, QuizAnalysis, QuizType, SubmittedAnswer,
};

/// The record-store operations consumed by the rest of the application.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Persist a new quiz. The store stamps `created_on`, starts `views` at
    /// zero and zeroes all counters regardless of what the payload carried.
    async fn create_quiz(&self, payload: CreateQuizRequest) -> Result<Quiz, AppError>;

    /// Replace the question list wholesale. Per-index counters are carried
    /// over from the stored record so analytics survive an edit.
    async fn update_quiz(&self, id: i64, questions: Vec<Question>) -> Result<Quiz, AppError>;

    /// Fetch a quiz for play, incrementing its view counter by exactly one.
    async fn get_quiz(&self, id: i64) -> Result<Quiz, AppError>;

    /// All quizzes owned by a user, oldest first.
    async fn quizzes_by_owner(&self, user_id: i64) -> Result<Vec<Quiz>, AppError>;

    async fn delete_quiz(&self, id: i64) -> Result<(), AppError>;

    /// Apply one selection event to a question's counters: attempted plus
    /// correct/incorrect for Q&A, the selected option's vote count for Poll.
    async fn record_answer(
        &self,
        quiz_id: i64,
        question_index: usize,
        selected_option: usize,
    ) -> Result<(), AppError>;

    /// Score a completed answer list against the stored answer key and return
    /// the number of correct answers.
    async fn submit_answers(
        &self,
        quiz_id: i64,
        answers: &[SubmittedAnswer],
    ) -> Result<i64, AppError>;

    /// Owner dashboard roll-up.
    async fn dashboard(&self, user_id: i64) -> Result<Dashboard, AppError>;

    /// Per-question counters for the analysis view. Does not touch `views`.
    async fn analysis(&self, quiz_id: i64) -> Result<QuizAnalysis, AppError>;
}

/// Counter update for one selection event. Shared by the store backends so
/// the semantics cannot drift apart.
pub(crate) fn apply_selection(
    quiz: &mut Quiz,
    question_index: usize,
    selected_option: usize,
) -> Result<(), AppError> {
    let quiz_type = quiz.quiz_type;
    let question = quiz
        .questions
        .get_mut(question_index)
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    if selected_option >= question.options.len() {
        return Err(AppError::Validation(
            "selectedOption is out of range".to_string(),
        ));
    }

    match quiz_type {
        QuizType::Qa => {
            question.attempted_count += 1;
            if question.correct_option == Some(selected_option) {
                question.correct_count += 1;
            } else {
                question.incorrect_count += 1;
            }
        }
        QuizType::Poll => {
            if question.option_counts.len() < question.options.len() {
                question.option_counts.resize(question.options.len(), 0);
            }
            question.option_counts[selected_option] += 1;
        }
    }
    Ok(())
}

/// Number of submitted answers matching the stored answer key. Entries with
/// no answer, unknown indexes or no stored correct option never match.
pub(crate) fn score_answers(quiz: &Quiz, answers: &[SubmittedAnswer]) -> i64 {
    answers
        .iter()
        .filter(|entry| {
            quiz.questions
                .get(entry.question)
                .is_some_and(|q| q.correct_option.is_some() && q.correct_option == entry.answer)
        })
        .count() as i64
}

/// Fold an owner's quizzes into dashboard totals.
pub(crate) fn roll_up(quizzes: Vec<Quiz>) -> Dashboard {
    let total_quizzes = quizzes.len() as i64;
    let total_questions = quizzes.iter().map(|q| q.questions.len() as i64).sum();
    let total_views = quizzes.iter().map(|q| q.views).sum();
    Dashboard {
        total_quizzes,
        total_questions,
        total_views,
        quizzes,
    }
}

/// Merge the stored per-question counters into an incoming question list, by
/// index. Keeps the counters monotone across the wholesale edit overwrite.
pub(crate) fn carry_counters(stored: &[Question], incoming: &mut [Question]) {
    for (index, question) in incoming.iter_mut().enumerate() {
        if let Some(existing) = stored.get(index) {
            question.attempted_count = existing.attempted_count;
            question.correct_count = existing.correct_count;
            question.incorrect_count = existing.incorrect_count;
            question.option_counts = existing.option_counts.clone();
        }
        question.normalize();
    }
}
