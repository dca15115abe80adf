//! Row types and mapping helpers for `SQLite` queries.

use chrono::{DateTime, Utc};

use aibot_core::{
    AnswerInfo, AuthLevel, FavoriteInfo, QuestionInfo, QuestionTag, RepositoryError, TagCategory,
    TagInfo, User,
};

/// Shared SELECT column lists.
pub const USER_SELECT_COLUMNS: &str = "user_id, email, bcrypt, name, auth, profile_photo";
pub const QUESTION_SELECT_COLUMNS: &str = "question_id, user_id, title, remarks, best_answer, create_time, modify_time, hot_value, hot_fresh_time";
pub const ANSWER_SELECT_COLUMNS: &str =
    "answer_id, user_id, question_id, content, create_time, modify_time";
pub const TAG_SELECT_COLUMNS: &str = "tag_id, category, name, description";
pub const FAVORITE_SELECT_COLUMNS: &str = "favorite_id, user_id, name, create_time";

#[derive(sqlx::FromRow)]
pub struct UserRow {
    user_id: i64,
    email: String,
    bcrypt: String,
    name: String,
    auth: i64,
    profile_photo: i64,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let auth = AuthLevel::from_i64(row.auth).ok_or_else(|| {
            RepositoryError::Storage(format!("invalid auth level {} stored", row.auth))
        })?;
        Ok(Self {
            user_id: row.user_id,
            email: row.email,
            bcrypt: row.bcrypt,
            name: row.name,
            auth,
            profile_photo: row.profile_photo,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct QuestionRow {
    question_id: i64,
    user_id: Option<i64>,
    title: String,
    remarks: String,
    best_answer: Option<i64>,
    create_time: DateTime<Utc>,
    modify_time: DateTime<Utc>,
    hot_value: i64,
    hot_fresh_time: DateTime<Utc>,
}

impl From<QuestionRow> for QuestionInfo {
    fn from(row: QuestionRow) -> Self {
        Self {
            question_id: row.question_id,
            user_id: row.user_id,
            title: row.title,
            remarks: row.remarks,
            best_answer: row.best_answer,
            create_time: row.create_time,
            modify_time: row.modify_time,
            hot_value: row.hot_value,
            hot_fresh_time: row.hot_fresh_time,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct AnswerRow {
    answer_id: i64,
    user_id: Option<i64>,
    question_id: i64,
    content: String,
    create_time: DateTime<Utc>,
    modify_time: DateTime<Utc>,
}

impl From<AnswerRow> for AnswerInfo {
    fn from(row: AnswerRow) -> Self {
        Self {
            answer_id: row.answer_id,
            user_id: row.user_id,
            question_id: row.question_id,
            content: row.content,
            create_time: row.create_time,
            modify_time: row.modify_time,
        }
    }
}

fn category(value: i64) -> Result<TagCategory, RepositoryError> {
    TagCategory::from_i64(value)
        .ok_or_else(|| RepositoryError::Storage(format!("invalid tag category {value} stored")))
}

#[derive(sqlx::FromRow)]
pub struct TagRow {
    tag_id: i64,
    category: i64,
    name: String,
    description: String,
}

impl TryFrom<TagRow> for TagInfo {
    type Error = RepositoryError;

    fn try_from(row: TagRow) -> Result<Self, Self::Error> {
        Ok(Self {
            tag_id: row.tag_id,
            category: category(row.category)?,
            name: row.name,
            desc: row.description,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct QuestionTagRow {
    tag_id: i64,
    name: String,
    category: i64,
    weight: i64,
}

impl TryFrom<QuestionTagRow> for QuestionTag {
    type Error = RepositoryError;

    fn try_from(row: QuestionTagRow) -> Result<Self, Self::Error> {
        Ok(Self {
            tag_id: row.tag_id,
            name: row.name,
            category: category(row.category)?,
            weight: row.weight,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct FavoriteRow {
    favorite_id: i64,
    user_id: i64,
    name: String,
    create_time: DateTime<Utc>,
}

impl From<FavoriteRow> for FavoriteInfo {
    fn from(row: FavoriteRow) -> Self {
        Self {
            favorite_id: row.favorite_id,
            user_id: row.user_id,
            name: row.name,
            create_time: row.create_time,
        }
    }
}
