//! Favorite folder types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's favorite folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteInfo {
    pub favorite_id: i64,
    pub user_id: i64,
    pub name: String,
    pub create_time: DateTime<Utc>,
}

/// Data for creating a new favorite folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFavorite {
    pub user_id: i64,
    pub name: String,
}
