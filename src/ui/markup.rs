//! Markup to plain text.
//!
//! Modal content arrives as HTML-ish markup. The terminal has no layout
//! engine, so tags are dropped, block tags become line breaks, list items get
//! a bullet, and the common character entities are decoded. Whitespace
//! collapses the way a browser collapses it.

use std::borrow::Cow;

/// Longest entity looked at, `;` excluded.
const MAX_ENTITY_LEN: usize = 32;

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "section",
];

/// Flatten `markup` to display text.
pub fn to_text(markup: &str) -> String {
    let mut out = String::new();
    let mut rest = markup;

    while let Some(c) = rest.chars().next() {
        match c {
            '<' => match rest.find('>') {
                Some(end) => {
                    apply_tag(&rest[1..end], &mut out);
                    rest = &rest[end + 1..];
                }
                None => {
                    out.push('<');
                    rest = &rest[1..];
                }
            },
            '&' => {
                let (decoded, consumed) = decode_entity(rest);
                out.push_str(&decoded);
                rest = &rest[consumed..];
            }
            c if c.is_whitespace() => {
                if !out.is_empty() && !out.ends_with([' ', '\n']) {
                    out.push(' ');
                }
                rest = &rest[c.len_utf8()..];
            }
            c => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    out.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

fn apply_tag(tag: &str, out: &mut String) {
    let closing = tag.starts_with('/');
    let name = tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if name == "br" {
        push_newline(out);
    } else if BLOCK_TAGS.contains(&name.as_str()) {
        start_line(out);
        if name == "li" && !closing {
            out.push_str("• ");
        }
    }
}

fn push_newline(out: &mut String) {
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
    out.push('\n');
}

fn start_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        push_newline(out);
    }
}

/// Decode the entity at the start of `s`. Returns the text and the number
/// of bytes consumed. Unknown entities decode to a literal `&`.
fn decode_entity(s: &str) -> (Cow<'_, str>, usize) {
    let Some(end) = s[1..].find(';').map(|i| i + 1).filter(|end| *end <= MAX_ENTITY_LEN) else {
        return (Cow::Borrowed("&"), 1);
    };

    let entity = &s[..=end];
    let decoded = html_escape::decode_html_entities(entity);
    if decoded == entity {
        (Cow::Borrowed("&"), 1)
    } else {
        (decoded, end + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_become_lines() {
        assert_eq!(to_text("<p>Hi</p>"), "Hi");
        assert_eq!(to_text("<p>One</p><p>Two</p>"), "One\nTwo");
        assert_eq!(to_text("<div><p>Nested</p></div>after"), "Nested\nafter");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(to_text("a<br>b<br/>c<br />d"), "a\nb\nc\nd");
    }

    #[test]
    fn test_inline_tags_are_dropped() {
        assert_eq!(to_text("<b>bold</b> and <em class=\"x\">em</em>"), "bold and em");
    }

    #[test]
    fn test_list_items_get_bullets() {
        assert_eq!(to_text("<ul><li>a</li><li> b</li></ul>"), "• a\n• b");
    }

    #[test]
    fn test_entities() {
        assert_eq!(to_text("&times;"), "×");
        assert_eq!(to_text("1 &lt; 2 &amp;&amp; 3 &gt; 2"), "1 < 2 && 3 > 2");
        assert_eq!(to_text("&#65;&#x42;"), "AB");
        assert_eq!(to_text("&foo; x"), "&foo; x");
        assert_eq!(to_text("wait&hellip;"), "wait…");
        assert_eq!(to_text("fish & chips"), "fish & chips");
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(to_text("  a \n\t b  "), "a b");
        assert_eq!(to_text("<p>\n  Hello\n  world\n</p>"), "Hello world");
    }

    #[test]
    fn test_unterminated_tag_is_literal() {
        assert_eq!(to_text("a < b"), "a < b");
    }
}
