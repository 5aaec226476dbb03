use anyhow::{Context, Result};
use forum_render_config::Config;
use forum_render_engine::render::{ActionSink, StickerSet};
use forum_render_engine::resolver::{
    FetchError, FetchFuture, FetchRequest, FetchResponse, PostFetcher, QuoteStatus,
    QuotedPostResolver,
};
use forum_render_engine::{Block, Post, PostId, RenderContext, Renderer, reply_target};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{env, process};

/// Collects the reply edges reported while rendering.
#[derive(Default)]
struct EdgeLog {
    edges: RefCell<Vec<(PostId, PostId)>>,
}

impl ActionSink for EdgeLog {
    fn record_reply(&self, from: &PostId, to: &PostId) {
        log::debug!("Reply edge {from} -> {to}");
        self.edges.borrow_mut().push((from.clone(), to.clone()));
    }
}

/// The CLI only knows the page it was given.
struct Offline;

impl PostFetcher for Offline {
    fn fetch(&self, request: FetchRequest) -> FetchFuture<'_> {
        Box::pin(async move {
            Err::<FetchResponse, _>(FetchError::Transport(format!(
                "no network access for {}#{}",
                request.topic_id, request.post_id
            )))
        })
    }
}

/// Reads a page of posts: either a single post object or an array of them.
fn load_page(path: &Path) -> Result<Vec<Post>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let posts = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(posts)
}

/// Sticker names are the file stems of the configured sticker directory.
fn load_stickers(dir: Option<&Path>) -> Result<StickerSet> {
    let Some(dir) = dir else {
        return Ok(StickerSet::default());
    };
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read sticker directory {}", dir.display()))?
    {
        let path = entry?.path();
        if let Some(stem) = path.file_stem() {
            names.push(stem.to_string_lossy().into_owned());
        }
    }
    log::info!("Loaded {} stickers from {}", names.len(), dir.display());
    Ok(StickerSet::new(names))
}

fn status_label(status: &QuoteStatus) -> &'static str {
    match status {
        QuoteStatus::Resolved(_) => "resolved",
        QuoteStatus::Failed => "not found",
        QuoteStatus::Pending => "pending",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <posts.json>", args[0]);
        process::exit(1);
    }
    let page_path = PathBuf::from(&args[1]);

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            log::info!(
                "No config file at {}, using defaults",
                Config::config_path().display()
            );
            Config::default()
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let options = config.render_options();
    let stickers = load_stickers(config.sticker_dir.as_deref())?;
    let posts = load_page(&page_path)?;

    let resolver = QuotedPostResolver::new(Arc::new(Offline)).with_strategy(config.fetch_strategy);
    resolver.seed(posts.iter().cloned());

    let edges = EdgeLog::default();
    let renderer = Renderer::new(&options, &edges).with_stickers(&stickers);

    for post in &posts {
        let context = RenderContext::for_post(&options, post.id.clone());
        let rendered = renderer.render_post(&post.content, &context);

        println!("== Post {} ==", post.id);
        if let Some(warning) = &rendered.warning {
            println!("warning: {warning}");
        }
        println!("{}", serde_json::to_string_pretty(&rendered.blocks)?);

        if let Some(target) = reply_target(&post.content) {
            resolver.load(target.clone()).await;
            let status = resolver.status(&target);
            println!("replies to: {target} ({})", status_label(&status));
            if let QuoteStatus::Resolved(quoted) = status {
                let preview = renderer.render_post(
                    &quoted.content,
                    &RenderContext::inline_quote(&options, Some(post.id.clone())),
                );
                let text: Vec<String> = preview.blocks.iter().map(Block::plain_text).collect();
                println!("quoted: {}", text.join("\n"));
            }
        }
    }

    let edges = edges.edges.into_inner();
    println!("== Reply edges ({}) ==", edges.len());
    for (from, to) in edges {
        println!("{from} -> {to}");
    }

    Ok(())
}
