pub mod models;
pub mod render;
pub mod resolver;
pub mod scan;

// Re-export key types for easier usage
pub use models::*;
pub use render::{Block, RenderContext, RenderOptions, RenderedPost, Renderer};
pub use resolver::{QuoteStatus, QuotedPostResolver};
pub use scan::{reply_target, scan};
