use std::sync::OnceLock;

use regex::Regex;

use crate::models::{PostId, Span, Tagged};

use super::block::{Block, Icon, Layout, LayoutKind, Output, RegionKind};
use super::quote;
use super::scope::{MetaValue, Modifiers, Scope, keys};
use super::style::{Alignment, Color, Font, TextStyles, palette_color};
use super::{Action, Renderer};

const REPLY_TO_PREFIX: &str = "Reply to";

pub(crate) fn bold(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    // Some clients encode the quote header as `[b]Reply to [uid]..[/uid] ...[/b]`.
    if tag
        .first_plain()
        .is_some_and(|text| text.starts_with(REPLY_TO_PREFIX))
    {
        quote::render_quote(r, scope, &tag.spans[1..], out);
        return;
    }
    out.append(r.render_child(scope, Modifiers::new().font(Font::bold), &tag.spans));
}

pub(crate) fn italic(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    out.append(r.render_child(scope, Modifiers::new().font(Font::italic), &tag.spans));
}

pub(crate) fn underline(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let modifiers = Modifiers::new().styles(|s| s.union(TextStyles::UNDERLINE));
    out.append(r.render_child(scope, modifiers, &tag.spans));
}

pub(crate) fn strikethrough(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let modifiers = Modifiers::new().styles(|s| s.union(TextStyles::STRIKETHROUGH));
    out.append(r.render_child(scope, modifiers, &tag.spans));
}

pub(crate) fn code(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    out.append(r.render_child(scope, monospaced(r), &tag.spans));
}

fn monospaced(r: &Renderer<'_>) -> Modifiers {
    let size = r.options().footnote_font_size();
    Modifiers::new().font(move |_| Font::of_size(size).monospaced())
}

pub(crate) fn color(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let color = tag.first_attribute().and_then(palette_color);
    let modifiers = Modifiers::new().color(move |inherited| color.unwrap_or(inherited));
    out.append(r.render_child(scope, modifiers, &tag.spans));
}

/// Percentage of an `[size=...]` attribute, 100 when absent or unparsable.
pub(crate) fn size_percent(attribute: Option<&str>) -> f32 {
    attribute
        .map(|a| a.trim().trim_matches('%'))
        .and_then(|a| a.parse::<f32>().ok())
        .filter(|p| p.is_finite())
        .unwrap_or(100.0)
}

pub(crate) fn size(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let factor = size_percent(tag.first_attribute()) / 100.0;
    let modifiers = Modifiers::new().font(move |f| f.scaled(factor));
    out.append(r.render_child(scope, modifiers, &tag.spans));
}

pub(crate) fn align(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let alignment = tag.first_attribute().and_then(Alignment::from_attribute);
    let inner = r.render_child(scope, Modifiers::new().alignment(alignment), &tag.spans);

    let Some(alignment) = alignment else {
        out.append(inner);
        return;
    };
    let spacer = || Block::leaf(RegionKind::Spacer);
    let mut children = Vec::new();
    if alignment != Alignment::Leading {
        children.push(spacer());
    }
    children.extend(inner);
    if alignment != Alignment::Trailing {
        children.push(spacer());
    }
    out.push_block(Block::region(RegionKind::Row, alignment, children));
}

pub(crate) fn collapse(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let title = tag
        .first_attribute()
        .unwrap_or(r.options().labels.collapsed_content.as_str());
    let body = r.render_child(scope, Modifiers::new(), &tag.spans);
    out.push_block(Block::region(
        RegionKind::Collapse {
            label: format!("{title}..."),
            collapsed: true,
        },
        scope.alignment(),
        body.into_iter().collect(),
    ));
}

fn link_scope(r: &Renderer<'_>, scope: &Scope) -> Scope {
    let size = r.options().footnote_font_size();
    scope.child(
        Modifiers::new()
            .font(move |f| Font { size, ..f })
            .color(|_| Color::Accent),
    )
}

/// A button whose title is a single label.
fn labelled_button(
    r: &Renderer<'_>,
    scope: &Scope,
    icon: Icon,
    label: &str,
    action: Option<Action>,
) -> Block {
    let title = Block::text(r.styled(&link_scope(r, scope), label));
    Block::region(
        RegionKind::Button {
            icon,
            action,
            in_quote: scope.in_quote(),
        },
        scope.alignment(),
        vec![title],
    )
}

pub(crate) fn url(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    link(r, scope, tag, None, Icon::Link, out);
}

/// Renders a link button. The href is the first attribute, else the first
/// plain child. `default_title` is shown when the tag has no children.
fn link(
    r: &Renderer<'_>,
    scope: &Scope,
    tag: &Tagged,
    default_title: Option<&str>,
    icon: Icon,
    out: &mut Output,
) {
    let inner = link_scope(r, scope);
    let title = if tag.spans.is_empty() {
        default_title.map(|title| Block::text(r.styled(&inner, title)))
    } else {
        r.render_in(&inner, &tag.spans)
    };
    let href = tag
        .first_attribute()
        .or_else(|| tag.first_plain())
        .map(|href| href.trim().to_string());

    out.push_block(Block::region(
        RegionKind::Button {
            icon,
            action: href.map(|href| Action::OpenLink { href }),
            in_quote: scope.in_quote(),
        },
        scope.alignment(),
        title.into_iter().collect(),
    ));
}

pub(crate) fn image(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let Some(url) = tag
        .first_plain()
        .and_then(|path| r.options().resolve_attachment(path))
    else {
        return echo(r, scope, tag, out);
    };
    if url.path().ends_with(".mp4") {
        return video(r, scope, tag, out);
    }

    let url = url.to_string();
    if scope.in_quote() && scope.reply_to().is_some() {
        let label = &r.options().labels.view_image;
        out.push_block(labelled_button(
            r,
            scope,
            Icon::Photo,
            label,
            Some(Action::ViewImage { url }),
        ));
    } else {
        out.push_block(Block::leaf(RegionKind::Image { url }));
    }
}

pub(crate) fn album(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let images: Vec<&Span> = tag
        .spans
        .iter()
        .filter(|span| span.plain_text().is_some())
        .collect();
    let name = tag.first_attribute().unwrap_or(r.options().labels.album.as_str());

    divider_with(r, scope, &[Span::plain(format!("{name} ({})", images.len()))], out);
    for span in images {
        let single = Tagged {
            tag: "img".to_string(),
            spans: vec![span.clone()],
            ..Default::default()
        };
        image(r, scope, &single, out);
    }
}

pub(crate) fn attachment(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let Some(url) = tag
        .first_plain()
        .and_then(|path| r.options().resolve_attachment(path))
    else {
        return echo(r, scope, tag, out);
    };
    let label = &r.options().labels.view_attachment;
    out.push_block(labelled_button(
        r,
        scope,
        Icon::Paperclip,
        label,
        Some(Action::OpenMedia {
            url: url.to_string(),
        }),
    ));
}

pub(crate) fn flash(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    match tag.first_attribute() {
        Some("audio") => audio(r, scope, tag, out),
        _ => video(r, scope, tag, out),
    }
}

fn video(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let Some(url) = tag
        .first_plain()
        .and_then(|path| r.options().resolve_attachment(path))
    else {
        return echo(r, scope, tag, out);
    };
    let label = &r.options().labels.view_video;
    out.push_block(labelled_button(
        r,
        scope,
        Icon::Film,
        label,
        Some(Action::OpenMedia {
            url: url.to_string(),
        }),
    ));
}

/// `duration=<digits>` from the query segments of an audio path.
pub(crate) fn audio_duration<'t>(segments: impl Iterator<Item = &'t str>) -> Option<&'t str> {
    static DURATION_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = DURATION_REGEX
        .get_or_init(|| Regex::new(r"(?:^|&)duration=(\d+)").expect("Invalid duration regex"));

    segments
        .filter_map(|segment| regex.captures(segment))
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str())
        .last()
}

fn audio(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let Some(text) = tag.first_plain() else {
        return echo(r, scope, tag, out);
    };
    let mut segments = text.split('?');
    let Some(url) = segments
        .next()
        .and_then(|path| r.options().resolve_attachment(path))
    else {
        return echo(r, scope, tag, out);
    };
    let label = audio_duration(segments).unwrap_or(r.options().labels.audio.as_str());

    out.push_block(labelled_button(
        r,
        scope,
        Icon::Waveform,
        label,
        Some(Action::OpenMedia {
            url: url.to_string(),
        }),
    ));
}

pub(crate) fn uid(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let inner = scope.child(Modifiers::new().color(|_| Color::Accent));
    let rendered = r.render_in(&inner, &tag.spans);

    let name = tag.first_plain().filter(|name| !name.is_empty());
    if let Some(name) = name {
        scope.set_at_root(keys::USERNAME, MetaValue::Text(name.to_string()));
    }
    // Anonymous authors only carry a display name; it doubles as the id.
    if let Some(id) = tag.first_attribute().or(name) {
        scope.set_at_root(keys::UID, MetaValue::Text(id.to_string()));
    }

    out.append(rendered);
}

pub(crate) fn pid(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let inner = scope.child(Modifiers::new().font(Font::bold));
    let mut label = Output::new();
    label.push_text(r.styled(&inner, "Post"));

    if let [post_id, topic_id, _, ..] = tag.attributes.as_slice() {
        label.push_text(r.styled(&inner, format!(" #{post_id}")));
        scope.set_local(
            keys::REPLY_TO,
            MetaValue::Post(PostId::new(topic_id.as_str(), post_id.as_str())),
        );
    }

    out.append(label.build(r.layout(&inner)));
}

pub(crate) fn tid(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let Some(id) = tag.first_attribute() else {
        return echo(r, scope, tag, out);
    };
    scope.set_local(keys::REPLY_TO, MetaValue::Post(PostId::topic(id)));

    let topic_link = Tagged {
        tag: "url".to_string(),
        attributes: vec![format!("/read.php?tid={id}")],
        complex_attributes: Vec::new(),
        spans: tag.spans.clone(),
    };
    link(r, scope, &topic_link, Some(&format!("Topic {id}")), Icon::Link, out);
}

pub(crate) fn mention(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let Some(user) = tag.first_attribute() else {
        return echo(r, scope, tag, out);
    };
    let query = if user.chars().all(|c| c.is_ascii_digit()) {
        "uid"
    } else {
        "username"
    };
    let profile_link = Tagged {
        tag: "url".to_string(),
        attributes: vec![format!("/nuke.php?func=ucp&{query}={user}")],
        complex_attributes: Vec::new(),
        spans: vec![Span::plain(user)],
    };
    link(r, scope, &profile_link, Some(user), Icon::Person, out);
}

pub(crate) fn divider(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    divider_with(r, scope, &tag.spans, out);
}

fn divider_with(r: &Renderer<'_>, scope: &Scope, spans: &[Span], out: &mut Output) {
    let size = r.options().base_font_size;
    let inner = scope.child(
        Modifiers::new()
            .font(move |_| Font::of_size(size).bold())
            .color(|_| Color::Accent),
    );

    let mut body = Output::new();
    if !spans.is_empty() {
        body.push_block(Block::leaf(RegionKind::Gap { height: 6.0 }));
        r.visit_spans(&inner, spans, &mut body);
    }
    body.push_block(Block::leaf(RegionKind::Divider));
    out.append(body.build(r.layout(&inner)));
}

pub(crate) fn table(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    grid(r, scope, tag, LayoutKind::Table, out);
}

pub(crate) fn table_row(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    grid(r, scope, tag, LayoutKind::TableRow, out);
}

fn grid(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, kind: LayoutKind, out: &mut Output) {
    let inner = scope.child(Modifiers::new());
    let mut body = Output::new();
    r.visit_spans(&inner, &tag.spans, &mut body);
    out.append(body.build(Layout {
        kind,
        ..r.layout(&inner)
    }));
}

pub(crate) fn table_cell(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    let colspan = tag
        .complex_attribute("colspan")
        .and_then(|n| n.parse().ok())
        .unwrap_or(1);
    let content = r.render_child(scope, Modifiers::new(), &tag.spans);
    // Always a region, so neighbouring cells never merge their text.
    out.push_block(Block::region(
        RegionKind::TableCell { colspan },
        scope.alignment(),
        content.into_iter().collect(),
    ));
}

pub(crate) fn transparent(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    r.visit_spans(scope, &tag.spans, out);
}

/// Echoes unsupported markup as `[tag=attrs]children[/tag]`.
pub(crate) fn echo(r: &Renderer<'_>, scope: &Scope, tag: &Tagged, out: &mut Output) {
    log::trace!("Echoing [{}] markup", tag.tag);

    let inner = scope.child(Modifiers::new());
    let marker = inner.child(monospaced(r));

    let mut open = tag.tag.clone();
    if !tag.attributes.is_empty() {
        open.push('=');
        open.push_str(&tag.attributes.join(","));
    }
    if !tag.complex_attributes.is_empty() {
        open.push(' ');
        open.push_str(&tag.complex_attributes.join(" "));
    }

    let mut body = Output::new();
    body.push_text(r.styled(&marker, format!("[{open}]")));
    r.visit_spans(&inner, &tag.spans, &mut body);
    body.push_text(r.styled(&marker, format!("[/{}]", tag.tag)));
    out.append(body.build(r.layout(&inner)));
}
