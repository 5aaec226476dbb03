//! # Markup Renderer
//!
//! Turns a post's span tree into an ordered list of [`Block`]s.
//!
//! Spans are visited left to right. Plain text, stickers and break lines are
//! appended to the current [`Output`]; tagged spans are dispatched by name
//! through a [`TagRegistry`]. Most handlers open a child [`Scope`] with a style
//! modifier, render their children into it and append the folded result.
//!
//! Rendering is synchronous and infallible. Unknown markup is echoed back as
//! text. The only side effects are reply edges, reported to the
//! [`ActionSink`] when a quote names the post it replies to.
//!
//! ## Modules
//!
//! - **`scope`**: inherited style/metadata chain
//! - **`block`**: output model and the text-coalescing fold
//! - **`registry`** / **`handlers`** / **`quote`**: per-tag behaviour
//! - **`action`**: controls in the output and link classification
//! - **`style`**, **`options`**, **`sticker`**: supporting types

pub mod action;
pub mod block;
mod handlers;
pub mod options;
mod quote;
pub mod registry;
pub mod scope;
pub mod sticker;
pub mod style;


pub use action::{Action, ActionSink, ForumId, Navigation, NoopSink, UserRef};
pub use block::{
    Block, Icon, Inline, Layout, LayoutKind, Output, Region, RegionKind, StickerImage, StyledText,
    TextRun,
};
pub use options::{Labels, RenderOptions};
pub use registry::{TagHandler, TagRegistry};
pub use scope::{MetaValue, Metadata, Modifiers, Scope, keys};
pub use sticker::{StickerAssets, StickerSet};
pub use style::{Alignment, Color, Font, TextStyles};

use crate::models::{PostContent, PostId, Span};

const BULLET_MARKER: &str = "[*]";
const BULLET: &str = "→ ";
const STICKER_FALLBACK_MARKER: &str = "🐶";

/// Per-post inputs to [`Renderer::render_post`].
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Id of the post being rendered; reply edges are recorded from it.
    pub post_id: Option<PostId>,
    pub font: Font,
    pub color: Color,
    /// Rendering a quoted post inline: nested reply quotes are skipped and
    /// stacks are truncated.
    pub inline_reply_quote: bool,
}

impl RenderContext {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            post_id: None,
            font: Font::of_size(options.base_font_size),
            color: Color::Primary,
            inline_reply_quote: false,
        }
    }

    pub fn for_post(options: &RenderOptions, post_id: PostId) -> Self {
        Self {
            post_id: Some(post_id),
            ..Self::new(options)
        }
    }

    /// Context for previewing a quoted post inside the post at `source`.
    pub fn inline_quote(options: &RenderOptions, source: Option<PostId>) -> Self {
        Self {
            post_id: source,
            font: Font::of_size(options.quote_font_size(options.base_font_size)),
            color: Color::Quoted,
            inline_reply_quote: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPost {
    pub blocks: Vec<Block>,
    /// Parser diagnostic to show alongside the blocks.
    pub warning: Option<String>,
}

struct NoStickers;

impl StickerAssets for NoStickers {
    fn lookup(&self, _name: &str) -> Option<StickerImage> {
        None
    }
}

#[derive(Clone, Copy)]
pub struct Renderer<'a> {
    options: &'a RenderOptions,
    sink: &'a dyn ActionSink,
    stickers: &'a dyn StickerAssets,
    registry: &'a TagRegistry,
}

impl<'a> Renderer<'a> {
    pub fn new(options: &'a RenderOptions, sink: &'a dyn ActionSink) -> Self {
        Self {
            options,
            sink,
            stickers: &NoStickers,
            registry: TagRegistry::standard(),
        }
    }

    pub fn with_stickers(self, stickers: &'a dyn StickerAssets) -> Self {
        Self { stickers, ..self }
    }

    pub fn with_registry(self, registry: &'a TagRegistry) -> Self {
        Self { registry, ..self }
    }

    pub fn options(&self) -> &RenderOptions {
        self.options
    }

    pub fn sink(&self) -> &dyn ActionSink {
        self.sink
    }

    /// Renders `spans` under a fresh root scope seeded with `initial` metadata.
    pub fn render(
        &self,
        spans: &[Span],
        default_font: Font,
        default_color: Color,
        initial: Metadata,
    ) -> Vec<Block> {
        let scope = Scope::root(default_font, default_color);
        scope.extend_local(initial);

        let mut out = Output::new();
        self.visit_spans(&scope, spans, &mut out);
        match out.build(self.layout(&scope)) {
            Some(Block::Region(Region {
                kind: RegionKind::Stack { .. },
                children,
                ..
            })) => children,
            Some(block) => vec![block],
            None => Vec::new(),
        }
    }

    pub fn render_post(&self, content: &PostContent, context: &RenderContext) -> RenderedPost {
        let mut metadata = Metadata::new();
        if let Some(id) = &context.post_id {
            metadata.insert(keys::SELF_ID.to_string(), MetaValue::Post(id.clone()));
        }
        if context.inline_reply_quote {
            metadata.insert(
                keys::IN_INLINE_REPLY_QUOTE.to_string(),
                MetaValue::Flag(true),
            );
        }

        RenderedPost {
            blocks: self.render(&content.spans, context.font, context.color, metadata),
            warning: content.warning().map(str::to_string),
        }
    }

    pub fn visit_spans(&self, scope: &Scope, spans: &[Span], out: &mut Output) {
        for span in spans {
            self.visit(scope, span, out);
        }
    }

    fn visit(&self, scope: &Scope, span: &Span, out: &mut Output) {
        match span {
            Span::PlainText { text } => {
                out.push_text(self.styled(scope, text.replace(BULLET_MARKER, BULLET)));
            }
            Span::BreakLine => out.push_break(),
            Span::Sticker { name } => self.visit_sticker(scope, name, out),
            Span::Tagged(tagged) => {
                let handler = self.registry.handler(&tagged.tag);
                handler(self, scope, tagged, out);
            }
        }
    }

    fn visit_sticker(&self, scope: &Scope, name: &str, out: &mut Output) {
        match self.stickers.lookup(&sticker::asset_name(name)) {
            Some(image) => out.push_inline(Inline::Sticker(image)),
            None => {
                let dimmed = scope.child(Modifiers::new().color(|_| Color::Secondary));
                out.push_text(self.styled(
                    &dimmed,
                    format!("[{STICKER_FALLBACK_MARKER}{name}]"),
                ));
            }
        }
    }

    /// Text styled with the scope's resolved font, colour and extra styles.
    pub fn styled(&self, scope: &Scope, text: impl Into<String>) -> StyledText {
        StyledText {
            text: text.into(),
            font: scope.font(),
            color: scope.color(),
            styles: scope.styles(),
        }
    }

    /// Vertical layout for a scope's output.
    pub fn layout(&self, scope: &Scope) -> Layout {
        Layout {
            kind: LayoutKind::Stack {
                in_quote: scope.in_quote(),
            },
            alignment: scope.alignment(),
            limit: scope
                .in_inline_reply_quote()
                .then_some(self.options.inline_quote_max_blocks),
        }
    }

    /// Renders `spans` directly into `scope` and folds the result.
    pub fn render_in(&self, scope: &Scope, spans: &[Span]) -> Option<Block> {
        let mut out = Output::new();
        self.visit_spans(scope, spans, &mut out);
        out.build(self.layout(scope))
    }

    /// Renders `spans` into a child of `scope` with the given modifiers.
    pub fn render_child(
        &self,
        scope: &Scope,
        modifiers: Modifiers,
        spans: &[Span],
    ) -> Option<Block> {
        self.render_in(&scope.child(modifiers), spans)
    }

    /// A copy of this renderer whose side effects go nowhere.
    fn silent(&self) -> Renderer<'a> {
        Self {
            sink: &NoopSink,
            ..*self
        }
    }
}
