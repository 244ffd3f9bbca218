use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uniform wrapper the platform API puts around every payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "fullName", alias = "username")]
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Author {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "anonymous"
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forum {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "postsCount")]
    pub post_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub forum_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Author,
    #[serde(default, alias = "likeCount", alias = "likesCount")]
    pub likes: u64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default, alias = "viewCount")]
    pub views: u64,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, alias = "commentsCount")]
    pub comment_count: Option<u64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "likeCount", alias = "likesCount")]
    pub likes: u64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    /// Present when the backend pre-nests replies under their parent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}
