//! A page of posts as delivered by the parser, rendered and indexed end to end.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use forum_render_engine::render::{ActionSink, RegionKind};
use forum_render_engine::resolver::{
    FetchError, FetchFuture, FetchRequest, FetchResponse, PostFetcher,
};
use forum_render_engine::{
    Block, Post, PostId, QuoteStatus, QuotedPostResolver, RenderContext, RenderOptions, Renderer,
    reply_target,
};
use pretty_assertions::assert_eq;

const PAGE: &str = r#"[
  {
    "id": { "topic_id": "10", "post_id": "100" },
    "author_id": "1",
    "content": {
      "raw": "First!",
      "spans": [{ "kind": "plain_text", "text": "First!" }]
    }
  },
  {
    "id": { "topic_id": "10", "post_id": "101" },
    "author_id": "2",
    "content": {
      "raw": "[quote][pid=100,10,1]Reply[/pid] [uid=1]alice[/uid]\nFirst![/quote]\nagreed",
      "spans": [
        {
          "kind": "tagged",
          "tag": "quote",
          "spans": [
            { "kind": "tagged", "tag": "pid", "attributes": ["100", "10", "1"],
              "spans": [{ "kind": "plain_text", "text": "Reply" }] },
            { "kind": "plain_text", "text": " " },
            { "kind": "tagged", "tag": "uid", "attributes": ["1"],
              "spans": [{ "kind": "plain_text", "text": "alice" }] },
            { "kind": "break_line" },
            { "kind": "plain_text", "text": "First!" }
          ]
        },
        { "kind": "break_line" },
        { "kind": "plain_text", "text": "agreed" }
      ]
    }
  },
  {
    "id": { "topic_id": "10", "post_id": "102" },
    "author_id": "3",
    "content": {
      "raw": "[quote][pid=7,10,1]Reply[/pid] [uid=4]dave[/uid]\nold[/quote]",
      "error": "unterminated tag at 42",
      "spans": [
        {
          "kind": "tagged",
          "tag": "quote",
          "spans": [
            { "kind": "tagged", "tag": "pid", "attributes": ["7", "10", "1"] },
            { "kind": "tagged", "tag": "uid", "attributes": ["4"],
              "spans": [{ "kind": "plain_text", "text": "dave" }] },
            { "kind": "break_line" },
            { "kind": "plain_text", "text": "old" }
          ]
        }
      ]
    }
  }
]"#;

#[derive(Default)]
struct ReplyIndex {
    edges: RefCell<HashMap<PostId, PostId>>,
}

impl ActionSink for ReplyIndex {
    fn record_reply(&self, from: &PostId, to: &PostId) {
        self.edges.borrow_mut().insert(from.clone(), to.clone());
    }
}

struct Unreachable;

impl PostFetcher for Unreachable {
    fn fetch(&self, _request: FetchRequest) -> FetchFuture<'_> {
        Box::pin(async { Ok::<_, FetchError>(FetchResponse::default()) })
    }
}

fn page() -> Vec<Post> {
    serde_json::from_str(PAGE).unwrap()
}

/// Target of the first quote header found in `blocks`.
fn quoted_post(blocks: &[Block]) -> Option<PostId> {
    blocks.iter().filter_map(Block::as_region).find_map(|region| match &region.kind {
        RegionKind::QuoteHeader { reply_to, .. } => reply_to.clone(),
        _ => quoted_post(&region.children),
    })
}

#[test]
fn test_render_page_records_same_edges_as_scan() {
    let options = RenderOptions::default();
    let index = ReplyIndex::default();
    let renderer = Renderer::new(&options, &index);

    for post in page() {
        let context = RenderContext::for_post(&options, post.id.clone());
        renderer.render_post(&post.content, &context);

        assert_eq!(
            index.edges.borrow().get(&post.id).cloned(),
            reply_target(&post.content),
            "post {}",
            post.id
        );
    }

    assert_eq!(index.edges.borrow().len(), 2);
}

#[test]
fn test_render_page_keeps_parser_warning() {
    let options = RenderOptions::default();
    let sink = ReplyIndex::default();
    let renderer = Renderer::new(&options, &sink);
    let posts = page();

    let last = renderer.render_post(
        &posts[2].content,
        &RenderContext::for_post(&options, posts[2].id.clone()),
    );
    assert_eq!(last.warning.as_deref(), Some("unterminated tag at 42"));
    assert!(matches!(
        last.blocks[0].as_region().map(|r| &r.kind),
        Some(RegionKind::Quote { .. })
    ));

    let first = renderer.render_post(
        &posts[0].content,
        &RenderContext::for_post(&options, posts[0].id.clone()),
    );
    assert_eq!(first.warning, None);
    assert_eq!(
        first.blocks.iter().map(Block::plain_text).collect::<Vec<_>>(),
        vec!["First!"]
    );
}

#[tokio::test]
async fn test_quoted_posts_resolve_from_page_then_fail_offline() {
    let posts = page();
    let resolver = QuotedPostResolver::new(Arc::new(Unreachable));
    resolver.seed(posts.iter().cloned());

    let on_page = reply_target(&posts[1].content).unwrap();
    let off_page = reply_target(&posts[2].content).unwrap();

    resolver.load(on_page.clone()).await;
    resolver.load(off_page.clone()).await;

    assert_eq!(resolver.status(&on_page), QuoteStatus::Resolved(posts[0].clone()));
    assert_eq!(resolver.status(&off_page), QuoteStatus::Failed);
}

#[tokio::test]
async fn test_quote_header_target_previews_through_resolver() {
    let options = RenderOptions::default();
    let index = ReplyIndex::default();
    let renderer = Renderer::new(&options, &index);
    let posts = page();
    let resolver = QuotedPostResolver::new(Arc::new(Unreachable));
    resolver.seed(posts.iter().cloned());

    let reply = renderer.render_post(
        &posts[1].content,
        &RenderContext::for_post(&options, posts[1].id.clone()),
    );
    let target = quoted_post(&reply.blocks).expect("quote header target");
    assert_eq!(target, posts[0].id);

    resolver.load(target.clone()).await;
    let QuoteStatus::Resolved(quoted) = resolver.status(&target) else {
        panic!("quoted post did not resolve");
    };
    index.edges.borrow_mut().clear();

    let preview = renderer.render_post(
        &quoted.content,
        &RenderContext::inline_quote(&options, Some(posts[1].id.clone())),
    );
    assert_eq!(
        preview.blocks.iter().map(Block::plain_text).collect::<Vec<_>>(),
        vec!["First!"]
    );
    assert!(index.edges.borrow().is_empty());
}
