//! Reply-target scanning without rendering.
//!
//! Used to index which post a reply quotes. A post carries at most one
//! meaningful reply relation, so when the markup holds several quotes the
//! last one in document order wins, nested ones included.

use crate::models::{PostContent, PostId, Span, Tagged, metadata_prefix_len};

const REPLY_TO_PREFIX: &str = "Reply to";

pub fn reply_target(content: &PostContent) -> Option<PostId> {
    scan(&content.spans)
}

/// Target of the last reply quote in `spans`, if any.
pub fn scan(spans: &[Span]) -> Option<PostId> {
    let mut latest = None;

    for span in spans {
        let Span::Tagged(tagged) = span else {
            continue;
        };

        match tagged.tag.as_str() {
            "quote" => {
                let prefix_len = metadata_prefix_len(&tagged.spans);
                let nested = match extract_meta(&tagged.spans[..prefix_len]) {
                    Some(target) => {
                        latest = Some(target);
                        scan(&tagged.spans[prefix_len..])
                    }
                    None => scan(&tagged.spans),
                };
                if nested.is_some() {
                    latest = nested;
                }
            }
            "b" if is_reply_header(tagged) => {
                if let Some(target) = extract_meta(&tagged.spans[1..]) {
                    latest = Some(target);
                } else if let Some(nested) = scan(&tagged.spans) {
                    latest = Some(nested);
                }
            }
            _ => {
                if let Some(nested) = scan(&tagged.spans) {
                    latest = Some(nested);
                }
            }
        }
    }

    latest
}

fn is_reply_header(tagged: &Tagged) -> bool {
    tagged
        .first_plain()
        .is_some_and(|text| text.starts_with(REPLY_TO_PREFIX))
}

/// Target named by quote metadata. Only counts when an author is named too.
fn extract_meta(spans: &[Span]) -> Option<PostId> {
    let mut extractor = MetaExtractor::default();
    extractor.visit_spans(spans);
    extractor.uid?;
    extractor.reply_to
}

#[derive(Default)]
struct MetaExtractor {
    uid: Option<String>,
    reply_to: Option<PostId>,
}

impl MetaExtractor {
    fn visit_spans(&mut self, spans: &[Span]) {
        for span in spans {
            if let Span::Tagged(tagged) = span {
                self.visit(tagged);
            }
        }
    }

    fn visit(&mut self, tagged: &Tagged) {
        match tagged.tag.as_str() {
            "uid" => {
                if let Some(id) = tagged.first_attribute() {
                    self.uid = Some(id.to_string());
                } else if let Some(name) = tagged.first_plain().filter(|n| !n.is_empty()) {
                    self.uid = Some(name.to_string());
                }
            }
            "pid" => {
                if let [post_id, topic_id, _, ..] = tagged.attributes.as_slice() {
                    self.reply_to = Some(PostId::new(topic_id.as_str(), post_id.as_str()));
                }
            }
            "tid" => {
                if let Some(topic_id) = tagged.first_attribute() {
                    self.reply_to = Some(PostId::topic(topic_id));
                }
            }
            _ => {}
        }
        self.visit_spans(&tagged.spans);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reply_quote(uid: &str, pid: &str, tid: &str, body: &str) -> Span {
        Span::tagged(
            "quote",
            &[],
            vec![
                Span::tagged("pid", &[pid, tid, "1"], vec![Span::plain("Reply")]),
                Span::tagged("uid", &[uid], vec![Span::plain("someone")]),
                Span::BreakLine,
                Span::plain(body),
            ],
        )
    }

    #[test]
    fn test_single_quote() {
        let spans = vec![reply_quote("1", "100", "10", "hello"), Span::plain("reply")];
        assert_eq!(scan(&spans), Some(PostId::new("10", "100")));
    }

    #[test]
    fn test_last_quote_wins() {
        let spans = vec![
            reply_quote("1", "100", "10", "first"),
            Span::BreakLine,
            reply_quote("2", "200", "10", "second"),
        ];
        assert_eq!(scan(&spans), Some(PostId::new("10", "200")));
    }

    #[test]
    fn test_nested_quote_inside_body_wins() {
        let mut outer = reply_quote("1", "100", "10", "outer");
        if let Span::Tagged(tagged) = &mut outer {
            tagged.spans.push(reply_quote("2", "50", "10", "inner"));
        }
        assert_eq!(scan(&[outer]), Some(PostId::new("10", "50")));
    }

    #[test]
    fn test_quote_without_uid_is_searched_as_plain_content() {
        let quote = Span::tagged(
            "quote",
            &[],
            vec![
                Span::tagged("pid", &["7", "8", "1"], vec![]),
                Span::BreakLine,
                Span::tagged("collapse", &[], vec![reply_quote("3", "9", "8", "x")]),
            ],
        );
        assert_eq!(scan(&[quote]), Some(PostId::new("8", "9")));
    }

    #[test]
    fn test_quote_without_uid_drops_prefix_target() {
        let quote = Span::tagged(
            "quote",
            &[],
            vec![
                Span::tagged("pid", &["7", "8", "1"], vec![]),
                Span::BreakLine,
                Span::plain("body"),
            ],
        );
        assert_eq!(scan(&[quote]), None);
    }

    #[test]
    fn test_reply_to_bold_header() {
        let spans = vec![Span::tagged(
            "b",
            &[],
            vec![
                Span::plain("Reply to "),
                Span::tagged("tid", &["555"], vec![Span::plain("Topic")]),
                Span::plain(" Post by "),
                Span::tagged("uid", &["9"], vec![Span::plain("Bob")]),
            ],
        )];
        assert_eq!(scan(&spans), Some(PostId::topic("555")));
    }

    #[test]
    fn test_author_without_target_keeps_earlier_target() {
        let spans = vec![
            reply_quote("1", "100", "10", "first"),
            Span::tagged(
                "quote",
                &[],
                vec![
                    Span::tagged("uid", &["2"], vec![Span::plain("b")]),
                    Span::BreakLine,
                    Span::plain("plain quote"),
                ],
            ),
        ];
        assert_eq!(scan(&spans), Some(PostId::new("10", "100")));
    }

    #[test]
    fn test_reply_content_from_post() {
        let content = PostContent::from_spans(vec![reply_quote("1", "3", "4", "x")]);
        assert_eq!(reply_target(&content), Some(PostId::new("4", "3")));
    }
}
