//! Inherited style and metadata context for the renderer.
//!
//! A [`Scope`] is a node in a parent chain. Style modifiers are stored as
//! functions of the parent's resolved value and only evaluated when a leaf is
//! rendered, so nesting order is what decides the final style.
//!
//! Metadata lookups walk toward the root. Writes come in two flavours:
//! [`Scope::set_local`] is visible to the node and its descendants only, while
//! [`Scope::set_at_root`] lands on the ultimate ancestor. The root cell is
//! captured once when a node is created, so root writes do not walk the chain.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::models::PostId;

use super::style::{Alignment, Color, Font, TextStyles};

pub type Modifier<T> = Rc<dyn Fn(T) -> T>;

/// Well-known metadata keys.
pub mod keys {
    pub const IN_QUOTE: &str = "inQuote";
    pub const IN_INLINE_REPLY_QUOTE: &str = "inInlineReplyQuote";
    pub const REPLY_TO: &str = "replyTo";
    pub const UID: &str = "uid";
    pub const USERNAME: &str = "username";
    /// Id of the post being rendered.
    pub const SELF_ID: &str = "id";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Flag(bool),
    Text(String),
    Post(PostId),
}

pub type Metadata = HashMap<String, MetaValue>;

/// Style overrides for a child scope. Unset fields inherit unchanged.
#[derive(Clone, Default)]
pub struct Modifiers {
    font: Option<Modifier<Font>>,
    color: Option<Modifier<Color>>,
    styles: Option<Modifier<TextStyles>>,
    alignment: Option<Alignment>,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font(mut self, f: impl Fn(Font) -> Font + 'static) -> Self {
        self.font = Some(Rc::new(f));
        self
    }

    pub fn color(mut self, f: impl Fn(Color) -> Color + 'static) -> Self {
        self.color = Some(Rc::new(f));
        self
    }

    pub fn styles(mut self, f: impl Fn(TextStyles) -> TextStyles + 'static) -> Self {
        self.styles = Some(Rc::new(f));
        self
    }

    pub fn alignment(mut self, alignment: Option<Alignment>) -> Self {
        self.alignment = alignment;
        self
    }
}

#[derive(Clone)]
pub struct Scope(Rc<Node>);

struct Node {
    parent: Option<Scope>,
    modifiers: Modifiers,
    alignment: Alignment,
    metadata: Rc<RefCell<Metadata>>,
    root: Rc<RefCell<Metadata>>,
}

impl Scope {
    /// Top-level scope of a render invocation.
    pub fn root(default_font: Font, default_color: Color) -> Self {
        Self::parentless(
            Modifiers::new()
                .font(move |_| default_font)
                .color(move |_| default_color),
        )
    }

    /// A parent-less scope with default styles, used for metadata-only evaluation.
    pub fn detached() -> Self {
        Self::parentless(Modifiers::new())
    }

    fn parentless(modifiers: Modifiers) -> Self {
        let metadata = Rc::new(RefCell::new(Metadata::new()));
        Scope(Rc::new(Node {
            parent: None,
            alignment: modifiers.alignment.unwrap_or_default(),
            modifiers,
            root: Rc::clone(&metadata),
            metadata,
        }))
    }

    pub fn child(&self, modifiers: Modifiers) -> Self {
        Scope(Rc::new(Node {
            parent: Some(self.clone()),
            alignment: modifiers.alignment.unwrap_or(self.0.alignment),
            modifiers,
            metadata: Rc::new(RefCell::new(Metadata::new())),
            root: Rc::clone(&self.0.root),
        }))
    }

    pub fn font(&self) -> Font {
        let inherited = self.0.parent.as_ref().map(Scope::font).unwrap_or_default();
        match &self.0.modifiers.font {
            Some(f) => f(inherited),
            None => inherited,
        }
    }

    pub fn color(&self) -> Color {
        let inherited = self.0.parent.as_ref().map(Scope::color).unwrap_or_default();
        match &self.0.modifiers.color {
            Some(f) => f(inherited),
            None => inherited,
        }
    }

    pub fn styles(&self) -> TextStyles {
        let inherited = self
            .0
            .parent
            .as_ref()
            .map(Scope::styles)
            .unwrap_or_default();
        match &self.0.modifiers.styles {
            Some(f) => f(inherited),
            None => inherited,
        }
    }

    pub fn alignment(&self) -> Alignment {
        self.0.alignment
    }

    /// Nearest value for `key`, searching from this node toward the root.
    pub fn get(&self, key: &str) -> Option<MetaValue> {
        let mut node = Some(self);
        while let Some(scope) = node {
            if let Some(value) = scope.0.metadata.borrow().get(key) {
                return Some(value.clone());
            }
            node = scope.0.parent.as_ref();
        }
        None
    }

    pub fn set_local(&self, key: &str, value: MetaValue) {
        self.0.metadata.borrow_mut().insert(key.to_string(), value);
    }

    pub fn set_at_root(&self, key: &str, value: MetaValue) {
        self.0.root.borrow_mut().insert(key.to_string(), value);
    }

    /// Copies entries into this node's local metadata.
    pub fn extend_local(&self, entries: Metadata) {
        self.0.metadata.borrow_mut().extend(entries);
    }

    /// Snapshot of the metadata held by this node itself.
    pub fn local_metadata(&self) -> Metadata {
        self.0.metadata.borrow().clone()
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(MetaValue::Flag(true)))
    }

    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(MetaValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn post_id(&self, key: &str) -> Option<PostId> {
        match self.get(key) {
            Some(MetaValue::Post(id)) => Some(id),
            _ => None,
        }
    }

    pub fn in_quote(&self) -> bool {
        self.flag(keys::IN_QUOTE)
    }

    pub fn in_inline_reply_quote(&self) -> bool {
        self.flag(keys::IN_INLINE_REPLY_QUOTE)
    }

    pub fn reply_to(&self) -> Option<PostId> {
        self.post_id(keys::REPLY_TO)
    }

    pub fn self_id(&self) -> Option<PostId> {
        self.post_id(keys::SELF_ID)
    }

    pub fn uid(&self) -> Option<String> {
        self.text(keys::UID)
    }

    pub fn username(&self) -> Option<String> {
        self.text(keys::USERNAME)
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("font", &self.font())
            .field("color", &self.color())
            .field("styles", &self.styles())
            .field("alignment", &self.alignment())
            .field("metadata", &self.0.metadata.borrow())
            .finish()
    }
}
