//! Question domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TagCategory;

/// A persisted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionInfo {
    pub question_id: i64,
    /// Owner; `None` once the owning user has been deleted.
    pub user_id: Option<i64>,
    pub title: String,
    pub remarks: String,
    pub best_answer: Option<i64>,
    pub create_time: DateTime<Utc>,
    pub modify_time: DateTime<Utc>,
    pub hot_value: i64,
    pub hot_fresh_time: DateTime<Utc>,
}

/// Data for creating a new question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub user_id: i64,
    pub title: String,
    pub remarks: String,
    /// Tag ids attached with weight 1. Duplicates are ignored.
    pub tags: Vec<i64>,
}

/// Partial question update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionUpdate {
    pub title: Option<String>,
    pub remarks: Option<String>,
    /// Use `Some(Some(aid))` to set, `Some(None)` to clear, `None` to leave unchanged.
    pub best_answer: Option<Option<i64>>,
    /// Replaces the tag set. Weights of tags kept across the update are preserved.
    pub tags: Option<Vec<i64>>,
}

impl QuestionUpdate {
    /// True when no field is supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.remarks.is_none()
            && self.best_answer.is_none()
            && self.tags.is_none()
    }
}

/// A tag attached to a question, with its association weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionTag {
    pub tag_id: i64,
    pub name: String,
    pub category: TagCategory,
    pub weight: i64,
}
