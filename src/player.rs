// src/player.rs

//! Public quiz-taking flow.
//!
//! A `PlaySession` walks a fetched quiz one question at a time. Statistics
//! updates fire on every selection and the final answer list is submitted on
//! completion; both are best-effort writes that never block progression.
//! The countdown, when a question has one, is driven by a once-per-second
//! `tick` and is re-armed from the next question's setting on every advance,
//! so a tick can never fire for a question that is no longer showing.

use crate::error::AppError;
use crate::models::quiz::{Question, Quiz, QuizType, SubmittedAnswer};
use crate::store::QuizStore;

/// What the completion screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Q&A: final score out of the question count.
    Score { correct: usize, total: usize },
    /// Poll: participation acknowledgment.
    ThankYou,
}

/// State of one public play-through of a quiz.
#[derive(Debug)]
pub struct PlaySession {
    quiz: Quiz,
    current: usize,
    selected: Option<usize>,
    answers: Vec<SubmittedAnswer>,
    score: usize,
    remaining_seconds: Option<u32>,
    outcome: Option<PlayOutcome>,
}

impl PlaySession {
    /// Fetch the quiz and present its first question. The fetch counts one
    /// impression. Fails terminally when the quiz cannot be loaded or has no
    /// questions to show.
    pub async fn begin(store: &dyn QuizStore, quiz_id: i64) -> Result<Self, AppError> {
        let quiz = store.get_quiz(quiz_id).await?;
        if quiz.questions.is_empty() {
            return Err(AppError::NotFound("No quiz data available".to_string()));
        }
        let remaining_seconds = quiz.questions[0].timer.seconds();
        Ok(Self {
            quiz,
            current: 0,
            selected: None,
            answers: Vec::new(),
            score: 0,
            remaining_seconds,
            outcome: None,
        })
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.quiz.questions[self.current]
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Seconds left on the current question's countdown, if it has one.
    pub fn timer_remaining(&self) -> Option<u32> {
        self.remaining_seconds
    }

    pub fn is_completed(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&PlayOutcome> {
        self.outcome.as_ref()
    }

    /// Record a selection for the current question and immediately push the
    /// statistics update. Selecting again fires another update rather than
    /// replacing the first, matching the recorded behavior of the original
    /// flow. The push is best-effort: a failure is logged and play goes on.
    /// Selecting does not stop the countdown.
    pub async fn select(&mut self, store: &dyn QuizStore, option_index: usize) {
        if self.is_completed() || option_index >= self.current_question().options.len() {
            return;
        }
        self.selected = Some(option_index);

        if let Err(err) = store
            .record_answer(self.quiz.id, self.current, option_index)
            .await
        {
            tracing::warn!(
                "failed to update statistics for quiz {} question {}: {}",
                self.quiz.id,
                self.current,
                err
            );
        }
    }

    /// Move to the next question, or complete the session when the current
    /// question is the last. The current selection (possibly none) is folded
    /// into the answer list; a correct Q&A selection bumps the running score,
    /// capped at the question count.
    pub async fn advance(&mut self, store: &dyn QuizStore) {
        if self.is_completed() {
            return;
        }

        let question = &self.quiz.questions[self.current];
        if self.quiz.quiz_type == QuizType::Qa
            && self.selected.is_some()
            && self.selected == question.correct_option
        {
            self.score = (self.score + 1).min(self.quiz.questions.len());
        }
        self.answers.push(SubmittedAnswer {
            question: self.current,
            answer: self.selected,
        });

        if self.current + 1 < self.quiz.questions.len() {
            self.current += 1;
            self.selected = None;
            self.remaining_seconds = self.quiz.questions[self.current].timer.seconds();
        } else {
            self.remaining_seconds = None;
            self.submit(store).await;
            self.outcome = Some(match self.quiz.quiz_type {
                QuizType::Qa => PlayOutcome::Score {
                    correct: self.score,
                    total: self.quiz.questions.len(),
                },
                QuizType::Poll => PlayOutcome::ThankYou,
            });
        }
    }

    /// One second of countdown. Reaching zero advances exactly as if "next"
    /// were pressed, with whatever selection is currently recorded.
    pub async fn tick(&mut self, store: &dyn QuizStore) {
        if self.is_completed() {
            return;
        }
        if let Some(remaining) = self.remaining_seconds {
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                self.advance(store).await;
            } else {
                self.remaining_seconds = Some(remaining);
            }
        }
    }

    async fn submit(&self, store: &dyn QuizStore) {
        if let Err(err) = store.submit_answers(self.quiz.id, &self.answers).await {
            tracing::warn!("failed to submit answers for quiz {}: {}", self.quiz.id, err);
        }
    }
}
