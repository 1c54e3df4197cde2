use serde::{Deserialize, Serialize};

/// The rendering flavor of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Richtext,
    Html,
}

impl BlockKind {
    pub fn as_str(&self) -> &str {
        match self {
            BlockKind::Richtext => "richtext",
            BlockKind::Html => "html",
        }
    }

    /// Any value other than "html" falls back to richtext.
    pub fn coerce(raw: &str) -> Self {
        if raw == "html" {
            BlockKind::Html
        } else {
            BlockKind::Richtext
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ordered unit of a post's structured body. The zero-based position is
/// assigned at write time from the block's place in the submitted sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub content: String,
}
