use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{QuestionUpdate, TagCategory};

/// A question as presented to a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInformation {
    pub title: String,
    pub remarks: String,
    pub creator: Option<i64>,
    pub like: Option<bool>,
    pub like_num: i64,
    pub collected: Option<bool>,
    pub collect_num: i64,
    pub best_answer: Option<i64>,
    pub hot_value: i64,
    pub hot_fresh_time: DateTime<Utc>,
    pub create_time: DateTime<Utc>,
    pub modify_time: DateTime<Utc>,
    /// Tag name to tag id.
    pub tags: BTreeMap<String, i64>,
    pub answers: Vec<i64>,
}

/// An answer as presented to a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInformation {
    pub content: String,
    pub creator: Option<i64>,
    pub question_id: i64,
    pub like: Option<bool>,
    pub like_num: i64,
    pub collected: Option<bool>,
    pub collect_num: i64,
    pub create_time: DateTime<Utc>,
    pub modify_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInformation {
    pub category: TagCategory,
    pub name: String,
    pub desc: String,
}

/// Requested question modification. Absent fields stay unchanged.
///
/// A best answer can be set here but not cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionModifyItems {
    pub title: Option<String>,
    pub remarks: Option<String>,
    pub best_answer: Option<i64>,
    pub tags: Option<Vec<i64>>,
}

impl From<QuestionModifyItems> for QuestionUpdate {
    fn from(items: QuestionModifyItems) -> Self {
        Self {
            title: items.title,
            remarks: items.remarks,
            best_answer: items.best_answer.map(Some),
            tags: items.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_items_accept_partial_json() {
        let items: QuestionModifyItems =
            serde_json::from_str(r#"{"title":"new","bestAnswer":7}"#).unwrap();
        assert_eq!(items.title.as_deref(), Some("new"));
        assert_eq!(items.best_answer, Some(7));
        assert!(items.remarks.is_none());
        assert!(items.tags.is_none());

        let update = QuestionUpdate::from(items);
        assert_eq!(update.best_answer, Some(Some(7)));
        assert!(update.tags.is_none());
    }

    #[test]
    fn information_serializes_camel_case() {
        let now = Utc::now();
        let info = AnswerInformation {
            content: "use a mutex".to_string(),
            creator: Some(1),
            question_id: 2,
            like: None,
            like_num: 3,
            collected: Some(false),
            collect_num: 0,
            create_time: now,
            modify_time: now,
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["questionId"], 2);
        assert_eq!(value["likeNum"], 3);
        assert!(value["like"].is_null());
        assert_eq!(value["collected"], false);
    }

    #[test]
    fn tag_category_serializes_lowercase() {
        let tag = TagInformation {
            category: TagCategory::Library,
            name: "tokio".to_string(),
            desc: String::new(),
        };
        let value = serde_json::to_value(&tag).unwrap();
        assert_eq!(value["category"], "library");
    }
}
