use serde::{Deserialize, Serialize};

/// One node of a parsed post body.
///
/// The tree is produced by an external markup parser; this crate only walks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Span {
    PlainText { text: String },
    BreakLine,
    Sticker { name: String },
    Tagged(Tagged),
}

/// A `[tag=attr,attr k=v]...[/tag]` container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagged {
    pub tag: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Space-separated `key=value` attributes, e.g. `colspan=2` on a table cell.
    #[serde(default)]
    pub complex_attributes: Vec<String>,
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Span::PlainText { text: text.into() }
    }

    pub fn sticker(name: impl Into<String>) -> Self {
        Span::Sticker { name: name.into() }
    }

    pub fn tagged(tag: impl Into<String>, attributes: &[&str], spans: Vec<Span>) -> Self {
        Span::Tagged(Tagged {
            tag: tag.into(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            complex_attributes: Vec::new(),
            spans,
        })
    }

    /// Text of a `PlainText` span, `None` for every other kind.
    pub fn plain_text(&self) -> Option<&str> {
        match self {
            Span::PlainText { text } => Some(text),
            _ => None,
        }
    }

    pub fn is_break_line(&self) -> bool {
        matches!(self, Span::BreakLine)
    }
}

impl Tagged {
    /// Text of the first child when it is plain text.
    pub fn first_plain(&self) -> Option<&str> {
        self.spans.first().and_then(Span::plain_text)
    }

    pub fn first_attribute(&self) -> Option<&str> {
        self.attributes.first().map(String::as_str)
    }

    /// Value of a `key=value` complex attribute.
    pub fn complex_attribute(&self, key: &str) -> Option<&str> {
        self.complex_attributes.iter().find_map(|attr| {
            attr.strip_prefix(key).and_then(|rest| rest.strip_prefix('='))
        })
    }
}

/// Length of the leading run of spans before the first break line.
///
/// Quote blocks carry the quoted author and target in this prefix.
pub fn metadata_prefix_len(spans: &[Span]) -> usize {
    spans
        .iter()
        .position(Span::is_break_line)
        .unwrap_or(spans.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_prefix_stops_at_first_break() {
        let spans = vec![
            Span::tagged("uid", &["1"], vec![Span::plain("a")]),
            Span::plain(" said"),
            Span::BreakLine,
            Span::plain("body"),
            Span::BreakLine,
        ];
        assert_eq!(metadata_prefix_len(&spans), 2);
    }

    #[test]
    fn test_metadata_prefix_without_break_covers_everything() {
        let spans = vec![Span::plain("a"), Span::plain("b")];
        assert_eq!(metadata_prefix_len(&spans), 2);
        assert_eq!(metadata_prefix_len(&[]), 0);
    }

    #[test]
    fn test_complex_attribute_lookup() {
        let cell = Tagged {
            tag: "td".to_string(),
            complex_attributes: vec!["rowspan=2".to_string(), "colspan=3".to_string()],
            ..Default::default()
        };
        assert_eq!(cell.complex_attribute("colspan"), Some("3"));
        assert_eq!(cell.complex_attribute("col"), None);
    }

    #[test]
    fn test_span_json_shape() {
        let json = r#"{"kind":"tagged","tag":"b","spans":[{"kind":"plain_text","text":"hi"},{"kind":"break_line"}]}"#;
        let span: Span = serde_json::from_str(json).unwrap();
        assert_eq!(
            span,
            Span::tagged("b", &[], vec![Span::plain("hi"), Span::BreakLine])
        );
    }
}
