use serde::Serialize;

use super::action::Action;
use crate::models::PostId;
use super::style::{Alignment, Color, Font, TextStyles};

/// Renderer output unit.
///
/// Text is coalesced into [`TextRun`]s; anything else (quotes, images, buttons,
/// layout) is a [`Region`] whose children are laid out by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    TextRun(TextRun),
    Region(Region),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextRun {
    pub segments: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "inline", rename_all = "snake_case")]
pub enum Inline {
    Text(StyledText),
    Sticker(StickerImage),
    LineBreak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledText {
    pub text: String,
    pub font: Font,
    pub color: Color,
    pub styles: TextStyles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StickerImage {
    pub name: String,
    /// Template images are tinted with the surrounding text colour.
    pub template: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub kind: RegionKind,
    pub alignment: Alignment,
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Link,
    Film,
    Waveform,
    Paperclip,
    Photo,
    Person,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "region", rename_all = "snake_case")]
pub enum RegionKind {
    /// Vertical list of children.
    Stack { spacing: f32 },
    /// Horizontal list, used with flexible spacers for alignment.
    Row,
    /// Flexible empty space inside a row.
    Spacer,
    /// Fixed vertical gap.
    Gap { height: f32 },
    Quote { line_limit: Option<usize> },
    QuoteHeader {
        uid: String,
        username: Option<String>,
        /// Post being quoted, for hosts that preview it through the resolver.
        reply_to: Option<PostId>,
        action: Option<Action>,
    },
    /// Disclosure control; children are the gated body.
    Collapse { label: String, collapsed: bool },
    Divider,
    Image { url: String },
    /// Tappable control; children are its title.
    Button {
        icon: Icon,
        action: Option<Action>,
        in_quote: bool,
    },
    Table,
    TableRow,
    TableCell { colspan: usize },
}

impl Block {
    pub fn text(text: StyledText) -> Self {
        Block::TextRun(TextRun {
            segments: vec![Inline::Text(text)],
        })
    }

    pub fn region(kind: RegionKind, alignment: Alignment, children: Vec<Block>) -> Self {
        Block::Region(Region {
            kind,
            alignment,
            children,
        })
    }

    /// A region without children.
    pub fn leaf(kind: RegionKind) -> Self {
        Self::region(kind, Alignment::default(), Vec::new())
    }

    pub fn as_region(&self) -> Option<&Region> {
        match self {
            Block::Region(region) => Some(region),
            Block::TextRun(_) => None,
        }
    }

    pub fn as_text_run(&self) -> Option<&TextRun> {
        match self {
            Block::TextRun(run) => Some(run),
            Block::Region(_) => None,
        }
    }

    /// Concatenated plain text of this block and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Block::TextRun(run) => out.push_str(&run.plain_text()),
            Block::Region(region) => {
                for child in &region.children {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    child.collect_text(out);
                }
            }
        }
    }
}

impl TextRun {
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Inline::Text(styled) => styled.text.as_str(),
                Inline::Sticker(sticker) => sticker.name.as_str(),
                Inline::LineBreak => "\n",
            })
            .collect()
    }
}

/// How an [`Output`] lays out its items once they stop being pure text.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub kind: LayoutKind,
    pub alignment: Alignment,
    /// Maximum number of children kept in a vertical stack.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Stack { in_quote: bool },
    Table,
    TableRow,
}

enum Item {
    Inline(Inline),
    Break,
    Block(Block),
}

/// Items collected by one scope, folded into a block by [`Output::build`].
#[derive(Default)]
pub struct Output {
    items: Vec<Item>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push_inline(&mut self, inline: Inline) {
        self.items.push(Item::Inline(inline));
    }

    pub fn push_text(&mut self, text: StyledText) {
        self.push_inline(Inline::Text(text));
    }

    pub fn push_break(&mut self) {
        self.items.push(Item::Break);
    }

    pub fn push_block(&mut self, block: Block) {
        self.items.push(Item::Block(block));
    }

    /// Appends a child's built output. Text runs merge into the surrounding text.
    pub fn append(&mut self, block: Option<Block>) {
        match block {
            Some(Block::TextRun(run)) => {
                for segment in run.segments {
                    self.push_inline(segment);
                }
            }
            Some(region) => self.push_block(region),
            None => {}
        }
    }

    /// Folds the collected items.
    ///
    /// Break lines inside text become line breaks; breaks with no text on one
    /// side are dropped. Pure text yields a single [`TextRun`]; any non-text
    /// item turns the result into a [`Region`] laid out per `layout`.
    pub fn build(self, layout: Layout) -> Option<Block> {
        let mut results = Vec::new();
        let mut buffer: Vec<Inline> = Vec::new();
        let mut pending_breaks = 0;

        fn flush(buffer: &mut Vec<Inline>, results: &mut Vec<Block>) {
            if !buffer.is_empty() {
                results.push(Block::TextRun(TextRun {
                    segments: std::mem::take(buffer),
                }));
            }
        }

        for item in self.items {
            match item {
                Item::Inline(inline) => {
                    if !buffer.is_empty() {
                        buffer.extend(std::iter::repeat_n(Inline::LineBreak, pending_breaks));
                    }
                    pending_breaks = 0;
                    buffer.push(inline);
                }
                Item::Break => {
                    if !buffer.is_empty() {
                        pending_breaks += 1;
                    }
                }
                Item::Block(block) => {
                    flush(&mut buffer, &mut results);
                    pending_breaks = 0;
                    results.push(block);
                }
            }
        }

        if results.is_empty() {
            return (!buffer.is_empty()).then(|| Block::TextRun(TextRun { segments: buffer }));
        }
        flush(&mut buffer, &mut results);

        let kind = match layout.kind {
            LayoutKind::Stack { in_quote } => {
                if let Some(limit) = layout.limit {
                    results.truncate(limit);
                }
                RegionKind::Stack {
                    spacing: if in_quote { 8.0 } else { 12.0 },
                }
            }
            LayoutKind::Table => RegionKind::Table,
            LayoutKind::TableRow => RegionKind::TableRow,
        };
        Some(Block::region(kind, layout.alignment, results))
    }
}
