//! Wire and domain types for the blogging API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A user-authored feed item as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Raw category text. Values outside [`Category`] are kept but never match a filter.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<serde_json::Value>,
    /// Creation time. Missing or null on the wire leaves the rest of the post usable.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    /// The category if it is one of the fixed set.
    #[must_use]
    pub fn known_category(&self) -> Option<Category> {
        self.category.as_deref().and_then(|c| c.parse().ok())
    }

    #[must_use]
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    #[must_use]
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// First media URL, used as the post's thumbnail.
    #[must_use]
    pub fn primary_media(&self) -> Option<&str> {
        self.media.first().map(String::as_str)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of posts from `GET /api/posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

/// The fixed set of post categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Innovation,
    Design,
    Development,
    Tutorial,
    Business,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Innovation,
        Self::Design,
        Self::Development,
        Self::Tutorial,
        Self::Business,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Innovation => "Innovation",
            Self::Design => "Design",
            Self::Development => "Development",
            Self::Tutorial => "Tutorial",
            Self::Business => "Business",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Parses the canonical name. Matching is exact, like the server's.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// The category filter applied to the loaded page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    #[must_use]
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => post.category.as_deref() == Some(category.as_str()),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "All" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// In-progress form state for a new post. All fields are free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPost {
    pub title: String,
    pub category: String,
    pub content: String,
    /// Single media URL as typed; the server turns it into the post's media list.
    pub media: String,
}

/// Editable fields of a [`DraftPost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Category,
    Content,
    Media,
}

impl DraftPost {
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let slot = match field {
            DraftField::Title => &mut self.title,
            DraftField::Category => &mut self.category,
            DraftField::Content => &mut self.content,
            DraftField::Media => &mut self.media,
        };
        *slot = value.into();
    }
}

impl FromStr for DraftField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "category" => Ok(Self::Category),
            "content" => Ok(Self::Content),
            "media" => Ok(Self::Media),
            _ => Err(format!("unknown field '{s}'")),
        }
    }
}

/// Body of `POST /api/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
