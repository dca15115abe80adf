//! Tag domain types.

use serde::{Deserialize, Serialize};

/// Category a tag belongs to. Tag names are unique within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    Language,
    Environment,
    Library,
    Other,
}

impl TagCategory {
    /// Integer representation used by storage.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Language => 0,
            Self::Environment => 1,
            Self::Library => 2,
            Self::Other => 3,
        }
    }

    /// Inverse of [`TagCategory::as_i64`].
    #[must_use]
    pub const fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Language),
            1 => Some(Self::Environment),
            2 => Some(Self::Library),
            3 => Some(Self::Other),
            _ => None,
        }
    }

    /// Parse a category from its lowercase name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "language" => Some(Self::Language),
            "environment" => Some(Self::Environment),
            "library" => Some(Self::Library),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::Environment => "environment",
            Self::Library => "library",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for TagCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    pub tag_id: i64,
    pub category: TagCategory,
    pub name: String,
    pub desc: String,
}

/// Data for creating a new tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub category: TagCategory,
    pub name: String,
    pub desc: String,
}

/// Partial tag update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagUpdate {
    pub category: Option<TagCategory>,
    pub name: Option<String>,
    pub desc: Option<String>,
}

impl TagUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none() && self.name.is_none() && self.desc.is_none()
    }
}
