//! Repair of LLM-produced HTML for Telegram.
//!
//! Telegram rejects a whole message when its HTML is unbalanced or uses an
//! unsupported tag, so model output is normalised before sending.

use std::sync::LazyLock;

use regex::Regex;

/// Tags Telegram's HTML parse mode accepts.
const ALLOWED_TAGS: &[&str] = &["b", "i", "a", "code", "pre", "s", "u"];

/// Tags whose attributes are meaningful to Telegram (`href`, `class`).
const TAGS_WITH_ATTRIBUTES: &[&str] = &["a", "code"];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)(\s[^<>]*|/)?>").expect("tag regex is valid")
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:([a-zA-Z][a-zA-Z0-9]*)|#[0-9]+|#[xX][0-9a-fA-F]+);")
        .expect("entity regex is valid")
});

/// Named entities Telegram's HTML parse mode accepts as-is.
const TELEGRAM_ENTITIES: &[&str] = &["lt", "gt", "amp", "quot"];

/// Named entities Telegram rejects, replaced by their character.
const DECODED_ENTITIES: &[(&str, char)] = &[
    ("nbsp", '\u{a0}'),
    ("apos", '\''),
    ("copy", '©'),
    ("reg", '®'),
    ("trade", '™'),
    ("hellip", '…'),
    ("mdash", '\u{2014}'),
    ("ndash", '\u{2013}'),
    ("laquo", '«'),
    ("raquo", '»'),
    ("ldquo", '\u{201c}'),
    ("rdquo", '\u{201d}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("bull", '•'),
    ("middot", '·'),
    ("deg", '°'),
    ("times", '×'),
    ("euro", '€'),
    ("rarr", '→'),
    ("larr", '←'),
];

/// Balance and sanitise HTML for Telegram.
///
/// - tags outside the allowed set are unwrapped (markup dropped, content kept)
/// - closing tags without a matching open tag are dropped
/// - a closing tag also closes any tags opened inside it
/// - tags still open at the end are closed
/// - bare `<`, `>` and `&` in text are escaped
/// - `&lt;`, `&gt;`, `&amp;`, `&quot;` and numeric entities are kept; other
///   common named entities are decoded and unknown ones escaped
///
/// ```
/// use concisely_core::fix_html;
///
/// assert_eq!(fix_html("<b>bold <i>both</b>"), "<b>bold <i>both</i></b>");
/// assert_eq!(fix_html("<ul><li>item</li></ul>"), "item");
/// ```
pub fn fix_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut open: Vec<String> = Vec::new();
    let mut cursor = 0;

    for caps in TAG_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_escaped(&mut out, &text[cursor..whole.start()]);
        cursor = whole.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        let attrs = caps.get(3).map_or("", |m| m.as_str());

        if !ALLOWED_TAGS.contains(&name.as_str()) {
            continue;
        }

        if closing {
            if let Some(pos) = open.iter().rposition(|t| *t == name) {
                for tag in open.drain(pos..).rev() {
                    out.push_str(&format!("</{tag}>"));
                }
            }
            continue;
        }

        // Self-closing formatting tags carry no content.
        if attrs.trim_end().ends_with('/') {
            continue;
        }

        if TAGS_WITH_ATTRIBUTES.contains(&name.as_str()) && !attrs.trim().is_empty() {
            out.push_str(&format!("<{name} {}>", attrs.trim()));
        } else {
            out.push_str(&format!("<{name}>"));
        }
        open.push(name);
    }

    push_escaped(&mut out, &text[cursor..]);

    for tag in open.iter().rev() {
        out.push_str(&format!("</{tag}>"));
    }

    out
}

fn push_escaped(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        let mut consumed = ch.len_utf8();
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => match ENTITY_RE.captures(rest) {
                Some(caps) => {
                    let entity = &caps[0];
                    let name = caps.get(1).map(|m| m.as_str());
                    let decoded = name.and_then(|name| {
                        DECODED_ENTITIES
                            .iter()
                            .find(|(n, _)| *n == name)
                            .map(|(_, c)| *c)
                    });

                    if name.is_none_or(|name| TELEGRAM_ENTITIES.contains(&name)) {
                        out.push_str(entity);
                        consumed = entity.len();
                    } else if let Some(c) = decoded {
                        out.push(c);
                        consumed = entity.len();
                    } else {
                        out.push_str("&amp;");
                    }
                }
                None => out.push_str("&amp;"),
            },
            _ => out.push(ch),
        }
        rest = &rest[consumed..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_input_is_unchanged() {
        let html = r#"<b>Итоги</b>: <i>всё</i> <a href="https://t.me/x">тут</a>"#;
        assert_eq!(fix_html(html), html);
    }

    #[test]
    fn test_closes_unclosed_tags_at_end() {
        assert_eq!(fix_html("<b>bold <i>italic"), "<b>bold <i>italic</i></b>");
    }

    #[test]
    fn test_drops_stray_closing_tag() {
        assert_eq!(fix_html("text</b> more"), "text more");
    }

    #[test]
    fn test_unwraps_unsupported_tags() {
        assert_eq!(
            fix_html("<p>Hello <span class=\"x\">there</span></p><br/>"),
            "Hello there"
        );
    }

    #[test]
    fn test_escapes_bare_angle_brackets_and_ampersands() {
        assert_eq!(fix_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
    }

    #[test]
    fn test_keeps_existing_entities() {
        assert_eq!(fix_html("Tom &amp; Jerry &#8212; &lt;3"), "Tom &amp; Jerry &#8212; &lt;3");
    }

    #[test]
    fn test_named_entities_telegram_rejects_are_decoded() {
        let out = fix_html("a&nbsp;b &copy; c &hellip;");
        assert_eq!(out, "a\u{a0}b © c …");
        assert!(!out.contains("&nbsp;"));
    }

    #[test]
    fn test_unknown_named_entity_is_escaped() {
        assert_eq!(fix_html("&foo; &quot;x&quot;"), "&amp;foo; &quot;x&quot;");
    }

    #[test]
    fn test_numeric_entities_are_kept() {
        assert_eq!(fix_html("&#x41;&#169;"), "&#x41;&#169;");
    }

    #[test]
    fn test_truncated_tag_is_escaped() {
        assert_eq!(fix_html("<b>end</b> <a hr"), "<b>end</b> &lt;a hr");
    }

    #[test]
    fn test_uppercase_tags_are_normalised() {
        assert_eq!(fix_html("<B>loud</B>"), "<b>loud</b>");
    }

    #[test]
    fn test_strips_attributes_from_plain_formatting_tags() {
        assert_eq!(fix_html("<b style=\"x\">x</b>"), "<b>x</b>");
    }
}
