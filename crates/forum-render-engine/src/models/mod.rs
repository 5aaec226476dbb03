pub mod post;
pub mod span;

pub use post::{Post, PostContent, PostId};
pub use span::{Span, Tagged, metadata_prefix_len};
