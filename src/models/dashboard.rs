// src/models/dashboard.rs

use serde::{Deserialize, Serialize};

use crate::models::quiz::Quiz;

/// Aggregated owner dashboard: totals over all owned quizzes plus the quizzes
/// themselves, in retrieval order.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_quizzes: i64,
    pub total_questions: i64,
    pub total_views: i64,
    pub quizzes: Vec<Quiz>,
}
