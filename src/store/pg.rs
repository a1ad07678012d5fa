// src/store/pg.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::error::AppError;
use crate::models::dashboard::Dashboard;
use crate::models::quiz::{
    CreateQuizRequest, Question, Quiz, QuizAnalysis, QuizType, SubmittedAnswer,
};
use crate::store::{self, QuizStore};

const QUIZ_COLUMNS: &str = "id, quiz_name, quiz_type, user_id, questions, created_on, views";

/// Postgres-backed record store. Quizzes persist as one row each, with the
/// question list (counters included) in a JSONB column, matching the
/// embedded-document shape of the records this store serves.
#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_quiz(&self, id: i64) -> Result<Quiz, AppError> {
        let row = sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        row.try_into()
    }
}

/// Row mapping for the 'quizzes' table.
#[derive(sqlx::FromRow)]
struct QuizRow {
    id: i64,
    quiz_name: String,
    quiz_type: String,
    user_id: i64,
    questions: Json<Vec<Question>>,
    created_on: DateTime<Utc>,
    views: i64,
}

impl TryFrom<QuizRow> for Quiz {
    type Error = AppError;

    fn try_from(row: QuizRow) -> Result<Self, Self::Error> {
        let quiz_type = QuizType::parse(&row.quiz_type)
            .ok_or_else(|| AppError::Storage(format!("unknown quiz type '{}'", row.quiz_type)))?;
        Ok(Quiz {
            id: row.id,
            quiz_name: row.quiz_name,
            quiz_type,
            user_id: row.user_id,
            questions: row.questions.0,
            created_on: row.created_on,
            views: row.views,
        })
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn create_quiz(&self, mut payload: CreateQuizRequest) -> Result<Quiz, AppError> {
        payload.normalize();

        let row = sqlx::query_as::<_, QuizRow>(&format!(
            r#"
            INSERT INTO quizzes (quiz_name, quiz_type, user_id, questions)
            VALUES ($1, $2, $3, $4)
            RETURNING {QUIZ_COLUMNS}
            "#
        ))
        .bind(&payload.quiz_name)
        .bind(payload.quiz_type.as_str())
        .bind(payload.user_id)
        .bind(Json(&payload.questions))
        .fetch_one(&self.pool)
        .await?;

        let quiz: Quiz = row.try_into()?;
        tracing::info!("quiz {} created for user {}", quiz.id, quiz.user_id);
        Ok(quiz)
    }

    async fn update_quiz(&self, id: i64, mut questions: Vec<Question>) -> Result<Quiz, AppError> {
        let stored = self.fetch_quiz(id).await?;
        store::carry_counters(&stored.questions, &mut questions);

        let row = sqlx::query_as::<_, QuizRow>(&format!(
            "UPDATE quizzes SET questions = $2 WHERE id = $1 RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(id)
        .bind(Json(&questions))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get_quiz(&self, id: i64) -> Result<Quiz, AppError> {
        let row = sqlx::query_as::<_, QuizRow>(&format!(
            "UPDATE quizzes SET views = views + 1 WHERE id = $1 RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        row.try_into()
    }

    async fn quizzes_by_owner(&self, user_id: i64) -> Result<Vec<Quiz>, AppError> {
        let rows = sqlx::query_as::<_, QuizRow>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE user_id = $1 ORDER BY created_on ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Quiz::try_from).collect()
    }

    async fn delete_quiz(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Quiz not found".to_string()));
        }
        Ok(())
    }

    async fn record_answer(
        &self,
        quiz_id: i64,
        question_index: usize,
        selected_option: usize,
    ) -> Result<(), AppError> {
        // Read-modify-write without row locking: concurrent play sessions may
        // lose an increment. The counters are best-effort analytics.
        let mut quiz = self.fetch_quiz(quiz_id).await?;
        store::apply_selection(&mut quiz, question_index, selected_option)?;

        sqlx::query("UPDATE quizzes SET questions = $2 WHERE id = $1")
            .bind(quiz_id)
            .bind(Json(&quiz.questions))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn submit_answers(
        &self,
        quiz_id: i64,
        answers: &[SubmittedAnswer],
    ) -> Result<i64, AppError> {
        let quiz = self.fetch_quiz(quiz_id).await?;
        Ok(store::score_answers(&quiz, answers))
    }

    async fn dashboard(&self, user_id: i64) -> Result<Dashboard, AppError> {
        let quizzes = self.quizzes_by_owner(user_id).await?;
        Ok(store::roll_up(quizzes))
    }

    async fn analysis(&self, quiz_id: i64) -> Result<QuizAnalysis, AppError> {
        let quiz = self.fetch_quiz(quiz_id).await?;
        Ok(QuizAnalysis {
            quiz_name: quiz.quiz_name,
            quiz_type: quiz.quiz_type,
            created_on: quiz.created_on,
            views: quiz.views,
            questions: quiz.questions,
        })
    }
}
