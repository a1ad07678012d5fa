// src/store/memory.rs

//! In-memory record store for driving the builder, the player and the HTTP
//! API without a database.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::AppError;
use crate::models::dashboard::Dashboard;
use crate::models::quiz::{CreateQuizRequest, Question, Quiz, QuizAnalysis, SubmittedAnswer};
use crate::store::{self, QuizStore};

/// A `QuizStore` holding everything in a map. Same observable semantics as
/// the Postgres store, minus durability.
#[derive(Default)]
pub struct MemoryStore {
    quizzes: RwLock<HashMap<i64, Quiz>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn require(quizzes: &HashMap<i64, Quiz>, id: i64) -> Result<&Quiz, AppError> {
        quizzes
            .get(&id)
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn create_quiz(&self, mut payload: CreateQuizRequest) -> Result<Quiz, AppError> {
        payload.normalize();

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let quiz = Quiz {
            id,
            quiz_name: payload.quiz_name,
            quiz_type: payload.quiz_type,
            user_id: payload.user_id,
            questions: payload.questions,
            created_on: Utc::now(),
            views: 0,
        };

        self.quizzes.write().unwrap().insert(id, quiz.clone());
        Ok(quiz)
    }

    async fn update_quiz(&self, id: i64, mut questions: Vec<Question>) -> Result<Quiz, AppError> {
        let mut quizzes = self.quizzes.write().unwrap();
        let quiz = quizzes
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        store::carry_counters(&quiz.questions, &mut questions);
        quiz.questions = questions;
        Ok(quiz.clone())
    }

    async fn get_quiz(&self, id: i64) -> Result<Quiz, AppError> {
        let mut quizzes = self.quizzes.write().unwrap();
        let quiz = quizzes
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        quiz.views += 1;
        Ok(quiz.clone())
    }

    async fn quizzes_by_owner(&self, user_id: i64) -> Result<Vec<Quiz>, AppError> {
        let quizzes = self.quizzes.read().unwrap();
        let mut owned: Vec<Quiz> = quizzes
            .values()
            .filter(|q| q.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by_key(|q| (q.created_on, q.id));
        Ok(owned)
    }

    async fn delete_quiz(&self, id: i64) -> Result<(), AppError> {
        self.quizzes
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))
    }

    async fn record_answer(
        &self,
        quiz_id: i64,
        question_index: usize,
        selected_option: usize,
    ) -> Result<(), AppError> {
        let mut quizzes = self.quizzes.write().unwrap();
        let quiz = quizzes
            .get_mut(&quiz_id)
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        store::apply_selection(quiz, question_index, selected_option)
    }

    async fn submit_answers(
        &self,
        quiz_id: i64,
        answers: &[SubmittedAnswer],
    ) -> Result<i64, AppError> {
        let quizzes = self.quizzes.read().unwrap();
        let quiz = Self::require(&quizzes, quiz_id)?;
        Ok(store::score_answers(quiz, answers))
    }

    async fn dashboard(&self, user_id: i64) -> Result<Dashboard, AppError> {
        let quizzes = self.quizzes_by_owner(user_id).await?;
        Ok(store::roll_up(quizzes))
    }

    async fn analysis(&self, quiz_id: i64) -> Result<QuizAnalysis, AppError> {
        let quizzes = self.quizzes.read().unwrap();
        let quiz = Self::require(&quizzes, quiz_id)?;
        Ok(QuizAnalysis {
            quiz_name: quiz.quiz_name.clone(),
            quiz_type: quiz.quiz_type,
            created_on: quiz.created_on,
            views: quiz.views,
            questions: quiz.questions.clone(),
        })
    }
}
