//! Quote blocks and the reply edges they encode.
//!
//! A quote's leading spans, up to the first break line, name the quoted author
//! (`[uid]`) and usually the quoted post (`[pid]` or `[tid]`). That prefix is
//! evaluated in a detached scope for its metadata only. With an author the
//! quote gets a header and, when the target is known, a reply edge; without
//! one the whole quote is rendered verbatim.

use crate::models::{PostId, Span, Tagged, metadata_prefix_len};

use super::block::{Block, Output, RegionKind};
use super::scope::{MetaValue, Metadata, Modifiers, Scope, keys};
use super::style::{Color, Font};
use super::{Action, Renderer};

/// What the metadata prefix of a quote declared.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QuoteMeta {
    pub uid: String,
    pub username: Option<String>,
    pub reply_to: Option<PostId>,
    /// Everything the prefix wrote, inherited by the quote body.
    pub metadata: Metadata,
}

/// Evaluates `spans` without output or side effects and collects quote metadata.
///
/// Returns `None` unless an author id was found.
pub(crate) fn quote_meta(r: &Renderer<'_>, spans: &[Span]) -> Option<QuoteMeta> {
    let scope = Scope::detached();
    scope.set_local(keys::IN_QUOTE, MetaValue::Flag(true));
    r.silent().visit_spans(&scope, spans, &mut Output::new());

    Some(QuoteMeta {
        uid: scope.uid()?,
        username: scope.username(),
        reply_to: scope.reply_to(),
        metadata: scope.local_metadata(),
    })
}

pub(crate) fn quote(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    render_quote(r, scope, &tag.spans, out);
}

pub(crate) fn render_quote(r: &Renderer<'_>, scope: &Scope, spans: &[Span], out: &mut Output) {
    let options = r.options().clone();
    let reply_line_limit = options.quote_line_limit;
    let inner = scope.child(
        Modifiers::new()
            .font(move |f| Font {
                size: options.quote_font_size(f.size),
                ..f
            })
            .color(|_| Color::Quoted),
    );
    inner.set_local(keys::IN_QUOTE, MetaValue::Flag(true));

    let prefix_len = metadata_prefix_len(spans);
    let mut body = Output::new();
    let mut line_limit = None;

    match quote_meta(r, &spans[..prefix_len]) {
        Some(meta) => {
            if meta.reply_to.is_some() && scope.in_inline_reply_quote() {
                // Previews of a quoted post leave out that post's own reply quote.
                return;
            }

            let mut action = None;
            if let (Some(to), Some(from)) = (&meta.reply_to, scope.self_id()) {
                r.sink().record_reply(&from, to);
                action = Some(Action::ShowReplyChain { from });
                line_limit = Some(reply_line_limit);
            }

            body.push_block(Block::leaf(RegionKind::QuoteHeader {
                uid: meta.uid,
                username: meta.username,
                reply_to: meta.reply_to,
                action,
            }));
            inner.extend_local(meta.metadata);
            r.visit_spans(&inner, &spans[prefix_len..], &mut body);
        }
        None => r.visit_spans(&inner, spans, &mut body),
    }

    let content = body.build(r.layout(&inner));
    out.push_block(Block::region(
        RegionKind::Quote { line_limit },
        scope.alignment(),
        content.into_iter().collect(),
    ));
}
