use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reader remark embedded in a blog post.
///
/// Comments are append-only: they are never updated or deleted through the
/// API. The same shape is used for storage (JSONB) and for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(new_comment: NewComment) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new_comment.name,
            text: new_comment.text,
            created_at: Utc::now(),
        }
    }
}

/// A validated comment submission.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub name: String,
    pub text: String,
}

impl NewComment {
    const ANONYMOUS: &'static str = "Anonymous";

    /// Returns an instance of `NewComment` if the submitted text is non-empty
    /// after trimming, an error message otherwise. A blank or absent name
    /// defaults to "Anonymous".
    pub fn parse(name: Option<String>, text: Option<String>) -> Result<Self, String> {
        let text = text.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err("Comment text is required".to_string());
        }
        let name = name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(Self::ANONYMOUS);
        Ok(Self {
            name: name.to_string(),
            text: text.to_string(),
        })
    }
}
