// src/handlers/dashboard.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{error::AppError, store::QuizStore};

/// Owner dashboard: quiz/question/view totals plus the quiz list itself.
pub async fn get_dashboard(
    State(store): State<Arc<dyn QuizStore>>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = store.dashboard(user_id).await?;
    Ok(Json(dashboard))
}
