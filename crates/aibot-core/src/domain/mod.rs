//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (database, cache, etc.).
//!
//! # Structure
//!
//! - `user` - users, authorization levels and the answer-id pair
//! - `question` - questions and their tag associations
//! - `answer` - answers
//! - `tag` - tags and tag categories
//! - `favorite` - favorite folders (collect targets live in the collect port)
//!
//! Write-side records (`New*`, `*Update`) use `Option` to mean
//! "not supplied" / "unchanged".

mod answer;
mod favorite;
mod question;
mod tag;
mod user;

pub use answer::{AnswerInfo, NewAnswer};
pub use favorite::{FavoriteInfo, NewFavorite};
pub use question::{NewQuestion, QuestionInfo, QuestionTag, QuestionUpdate};
pub use tag::{NewTag, TagCategory, TagInfo, TagUpdate};
pub use user::{AnswerIdInfo, AuthLevel, NewUser, User, UserUpdate};

use serde::{Deserialize, Serialize};

/// Ordering applied to id-list reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOrder {
    /// Storage order; callers must not rely on it.
    #[default]
    Unspecified,
    /// Most recently modified first.
    ///
    /// Favorites have no modify time and are ordered newest-created first.
    ModifyTimeDesc,
    /// Oldest created first.
    CreateTimeAsc,
}
