use std::collections::HashMap;
use std::sync::OnceLock;

use crate::models::Tagged;

use super::{Output, Renderer, Scope, handlers, quote};

/// Renders one tagged span into `out`.
pub type TagHandler = fn(&Renderer<'_>, &Scope, &Tagged, &mut Output);

/// Tag name to handler table.
///
/// Lookup tries exact names, then prefixes in registration order, then the
/// fallback handler.
#[derive(Clone)]
pub struct TagRegistry {
    exact: HashMap<String, TagHandler>,
    prefixes: Vec<(String, TagHandler)>,
    fallback: TagHandler,
}

impl TagRegistry {
    /// A registry where every tag is echoed back verbatim.
    pub fn empty() -> Self {
        Self {
            exact: HashMap::new(),
            prefixes: Vec::new(),
            fallback: handlers::echo,
        }
    }

    /// The built-in handler set, built once.
    pub fn standard() -> &'static TagRegistry {
        static STANDARD: OnceLock<TagRegistry> = OnceLock::new();
        STANDARD.get_or_init(TagRegistry::default)
    }

    pub fn register(&mut self, tag: &str, handler: TagHandler) -> &mut Self {
        self.exact.insert(tag.to_string(), handler);
        self
    }

    pub fn register_prefix(&mut self, prefix: &str, handler: TagHandler) -> &mut Self {
        self.prefixes.push((prefix.to_string(), handler));
        self
    }

    pub fn set_fallback(&mut self, handler: TagHandler) -> &mut Self {
        self.fallback = handler;
        self
    }

    pub fn handler(&self, tag: &str) -> TagHandler {
        if let Some(handler) = self.exact.get(tag) {
            return *handler;
        }
        self.prefixes
            .iter()
            .find(|(prefix, _)| tag.starts_with(prefix.as_str()))
            .map(|(_, handler)| *handler)
            .unwrap_or(self.fallback)
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.exact.contains_key(tag)
            || self.prefixes.iter().any(|(p, _)| tag.starts_with(p.as_str()))
    }

    /// Exact tag names followed by prefixes, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.exact
            .keys()
            .chain(self.prefixes.iter().map(|(prefix, _)| prefix))
            .map(String::as_str)
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("b", handlers::bold)
            .register("i", handlers::italic)
            .register("u", handlers::underline)
            .register("del", handlers::strikethrough)
            .register("code", handlers::code)
            .register("color", handlers::color)
            .register("size", handlers::size)
            .register("align", handlers::align)
            .register("collapse", handlers::collapse)
            .register("url", handlers::url)
            .register("img", handlers::image)
            .register("album", handlers::album)
            .register("attach", handlers::attachment)
            .register("flash", handlers::flash)
            .register("quote", quote::quote)
            .register("uid", handlers::uid)
            .register("pid", handlers::pid)
            .register("tid", handlers::tid)
            .register("at", handlers::mention)
            .register("_divider", handlers::divider)
            .register("h", handlers::divider)
            .register("table", handlers::table)
            .register("tr", handlers::table_row)
            .register("list", handlers::transparent)
            .register("font", handlers::transparent)
            .register_prefix("td", handlers::table_cell);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_lookup_for_table_cells() {
        let registry = TagRegistry::default();
        assert!(registry.is_registered("td"));
        assert!(registry.is_registered("td30"));
        assert!(!registry.is_registered("marquee"));
    }

    #[test]
    fn test_exact_registration_overrides() {
        let mut registry = TagRegistry::empty();
        assert!(!registry.is_registered("b"));
        registry.register("b", handlers::transparent);
        assert!(registry.is_registered("b"));
    }
}
