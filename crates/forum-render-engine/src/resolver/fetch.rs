use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::models::{Post, PostId};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Server returned {code}: {message}")]
    Status { code: u16, message: String },
}

/// Which backend API the network layer should prefer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    #[default]
    Auto,
    WebOnly,
    AppOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub topic_id: String,
    pub post_id: String,
    pub strategy: FetchStrategy,
}

impl FetchRequest {
    pub fn for_post(id: &PostId, strategy: FetchStrategy) -> Self {
        Self {
            topic_id: id.topic_id.clone(),
            post_id: id.post_id.clone(),
            strategy,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    pub replies: Vec<Post>,
}

impl FetchResponse {
    /// The reply answering a request for `id`.
    ///
    /// A floor-zero request matches any post of the same topic, since the
    /// topic's opening post may carry its own id.
    pub fn into_match(self, id: &PostId) -> Option<Post> {
        self.replies.into_iter().find(|post| {
            post.id == *id || (id.is_floor_zero() && post.id.topic_id == id.topic_id)
        })
    }
}

pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FetchResponse, FetchError>> + Send + 'a>>;

/// Network boundary used to load quoted posts on demand.
pub trait PostFetcher: Send + Sync {
    fn fetch(&self, request: FetchRequest) -> FetchFuture<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostContent;

    fn post(topic: &str, id: &str) -> Post {
        Post::new(PostId::new(topic, id), PostContent::default())
    }

    #[test]
    fn test_match_by_structural_id() {
        let response = FetchResponse {
            replies: vec![post("1", "5"), post("1", "6")],
        };
        let found = response.into_match(&PostId::new("1", "6")).unwrap();
        assert_eq!(found.id, PostId::new("1", "6"));
    }

    #[test]
    fn test_non_matching_reply_is_not_a_match() {
        let response = FetchResponse {
            replies: vec![post("1", "5")],
        };
        assert_eq!(response.into_match(&PostId::new("1", "6")), None);
        assert_eq!(FetchResponse::default().into_match(&PostId::topic("1")), None);
    }

    #[test]
    fn test_floor_zero_matches_opening_post() {
        let response = FetchResponse {
            replies: vec![post("9", "123")],
        };
        assert!(response.into_match(&PostId::topic("9")).is_some());
    }
}
