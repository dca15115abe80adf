//! Answer domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerInfo {
    pub answer_id: i64,
    /// Author; `None` once the authoring user has been deleted.
    pub user_id: Option<i64>,
    pub question_id: i64,
    pub content: String,
    pub create_time: DateTime<Utc>,
    pub modify_time: DateTime<Utc>,
}

/// Data for creating a new answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub user_id: i64,
    pub question_id: i64,
    pub content: String,
}
