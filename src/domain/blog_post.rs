use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Block, Comment};

#[derive(Debug, Clone)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub likes: i64,
    pub read_count: i64,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated creation payload.
///
/// Invariant: when `blocks` is non-empty, `content` is the empty string; the
/// blocks are the sole body representation. When `blocks` is empty, `content`
/// is non-empty.
#[derive(Debug, Clone)]
pub struct NewBlogPost {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub blocks: Vec<Block>,
}

/// A partial update. `None` fields are left untouched.
///
/// A non-empty `blocks` replaces the post's whole block set and forces
/// `content` to the empty string. An empty `blocks` means "no block change" -
/// in that case a provided `content` is applied directly, with no
/// body-representation rule. The asymmetry with creation is deliberate.
#[derive(Debug, Clone, Default)]
pub struct BlogPostUpdate {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub blocks: Vec<Block>,
}

impl BlogPostUpdate {
    pub fn replaces_blocks(&self) -> bool {
        !self.blocks.is_empty()
    }
}
