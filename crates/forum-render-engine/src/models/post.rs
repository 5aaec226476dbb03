use serde::{Deserialize, Serialize};

use super::Span;

/// Identifies a reply within a topic.
///
/// A `post_id` of `"0"` is the topic's opening floor rather than a specific reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId {
    pub topic_id: String,
    pub post_id: String,
}

impl PostId {
    pub const FLOOR_ZERO: &'static str = "0";

    pub fn new(topic_id: impl Into<String>, post_id: impl Into<String>) -> Self {
        Self {
            topic_id: topic_id.into(),
            post_id: post_id.into(),
        }
    }

    /// The topic itself, as referenced by a `[tid]` tag.
    pub fn topic(topic_id: impl Into<String>) -> Self {
        Self::new(topic_id, Self::FLOOR_ZERO)
    }

    pub fn is_floor_zero(&self) -> bool {
        self.post_id == Self::FLOOR_ZERO
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.topic_id, self.post_id)
    }
}

/// Parsed body of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default)]
    pub raw: String,
    /// Parser diagnostic. Advisory only: the spans are still rendered.
    #[serde(default)]
    pub error: Option<String>,
}

impl PostContent {
    pub fn from_spans(spans: Vec<Span>) -> Self {
        Self {
            spans,
            ..Default::default()
        }
    }

    /// The parser diagnostic, if it is non-empty.
    pub fn warning(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub content: PostContent,
}

impl Post {
    pub fn new(id: PostId, content: PostContent) -> Self {
        Self {
            id,
            author_id: String::new(),
            content,
        }
    }
}
