// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use forum_render_engine::Span;

#[allow(dead_code)]
pub fn generate_post_spans(paragraphs: usize) -> Vec<Span> {
    let mut spans = Vec::new();
    for n in 0..paragraphs {
        spans.push(Span::plain(format!("Paragraph {n} with some ")));
        spans.push(Span::tagged("b", &[], vec![Span::plain("bold")]));
        spans.push(Span::plain(" and "));
        spans.push(Span::tagged(
            "color",
            &["red"],
            vec![Span::tagged("i", &[], vec![Span::plain("coloured italic")])],
        ));
        spans.push(Span::plain(" text. "));
        spans.push(Span::sticker("ac:blink"));
        spans.push(Span::BreakLine);
        spans.push(Span::tagged(
            "url",
            &[],
            vec![Span::plain(format!("https://nga.178.com/read.php?tid={n}"))],
        ));
        spans.push(Span::BreakLine);
    }
    spans
}

/// A chain of `depth` reply quotes, each nested in the previous one's body.
#[allow(dead_code)]
pub fn generate_nested_quotes(depth: usize) -> Vec<Span> {
    let mut body = vec![Span::plain("innermost")];
    for level in 0..depth {
        let pid = (level + 1).to_string();
        let uid = (100 + level).to_string();
        let mut spans = vec![
            Span::tagged("pid", &[pid.as_str(), "10", "1"], vec![Span::plain("Reply")]),
            Span::plain(" "),
            Span::tagged("uid", &[uid.as_str()], vec![Span::plain(format!("user{level}"))]),
            Span::BreakLine,
        ];
        spans.extend(body);
        spans.push(Span::BreakLine);
        spans.push(Span::plain(format!("level {level}")));
        body = vec![Span::tagged("quote", &[], spans)];
    }
    body
}
