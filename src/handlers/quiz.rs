// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz::{
        CreateQuizRequest, PrepareQuizRequest, RecordAnswerRequest, SubmitAnswersRequest,
        UpdateQuizRequest,
    },
    store::QuizStore,
};

/// Validates the metadata step of the quiz form (name, type, owner) before
/// the question editor opens. Persists nothing.
pub async fn prepare_quiz(
    Json(payload): Json<PrepareQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Quiz metadata saved",
            "quizName": payload.quiz_name,
            "quizType": payload.quiz_type,
            "userId": payload.user_id,
        })),
    ))
}

/// Creates a quiz from the full form payload.
pub async fn create_quiz(
    State(store): State<Arc<dyn QuizStore>>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let quiz = store.create_quiz(payload).await?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Overwrites a quiz's question list (the edit flow saves the whole list).
pub async fn update_quiz(
    State(store): State<Arc<dyn QuizStore>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let quiz = store.update_quiz(id, payload.questions).await?;

    Ok(Json(json!({
        "message": "Quiz updated successfully",
        "quiz": quiz,
    })))
}

/// Fetches a quiz for play. Each fetch counts one impression.
pub async fn get_quiz(
    State(store): State<Arc<dyn QuizStore>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = store.get_quiz(id).await?;
    Ok(Json(quiz))
}

/// Lists a user's quizzes, oldest first.
pub async fn list_quizzes(
    State(store): State<Arc<dyn QuizStore>>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = store.quizzes_by_owner(user_id).await?;
    Ok(Json(quizzes))
}

pub async fn delete_quiz(
    State(store): State<Arc<dyn QuizStore>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    store.delete_quiz(id).await?;
    Ok(Json(json!({ "message": "Quiz deleted successfully" })))
}

/// Applies one selection event to a question's statistics.
pub async fn record_answer(
    State(store): State<Arc<dyn QuizStore>>,
    Path((id, question_index)): Path<(i64, usize)>,
    Json(payload): Json<RecordAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    store
        .record_answer(id, question_index, payload.selected_option)
        .await?;

    Ok(Json(json!({ "message": "Question statistics updated" })))
}

/// Scores a completed play session. Statistics were already updated per
/// selection, so this only computes the final count.
pub async fn submit_quiz(
    State(store): State<Arc<dyn QuizStore>>,
    Path(id): Path<i64>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let correct_count = store.submit_answers(id, &payload.answers).await?;

    Ok(Json(json!({ "correctCount": correct_count })))
}

/// Per-question counters for the owner's analysis view.
pub async fn quiz_analysis(
    State(store): State<Arc<dyn QuizStore>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let analysis = store.analysis(id).await?;
    Ok(Json(analysis))
}
