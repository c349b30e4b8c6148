// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sanitization of untrusted form text.
//!
//! Every field goes through [`sanitize`]: markup is stripped, surrounding
//! whitespace trimmed and the remaining text HTML-escaped. Existing
//! character references are left alone so that sanitizing twice is a no-op.

/// Strip tags, trim and HTML-escape `input`.
pub fn sanitize(input: &str) -> String {
    escape_html(strip_tags(input).trim())
}

/// Remove HTML tags and comments.
///
/// A `<` only opens a tag when followed by a letter, `/`, `!` or `?`; any
/// other `<` is kept as text and escaped later. An unterminated tag
/// swallows the rest of the input.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        if !opens_tag(tail) {
            out.push('<');
            rest = &tail[1..];
            continue;
        }

        let end = if tail.starts_with("<!--") {
            tail.find("-->").map(|i| i + 3)
        } else {
            tag_end(tail)
        };

        match end {
            Some(end) => rest = &tail[end..],
            None => return out,
        }
    }

    out.push_str(rest);
    out
}

fn opens_tag(tail: &str) -> bool {
    matches!(tail.as_bytes().get(1), Some(b) if b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
}

/// Byte offset just past the `>` closing the tag at the start of `tail`,
/// skipping over quoted attribute values.
fn tag_end(tail: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in tail.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Escape `& < > " '`, keeping well-formed character references intact.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, c) in input.char_indices() {
        match c {
            '&' if is_char_reference(&input[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// Whether `s` (starting at `&`) begins with `&name;`, `&#123;` or `&#x1F;`.
fn is_char_reference(s: &str) -> bool {
    let body = &s[1..];
    let Some(semi) = body.find(';') else {
        return false;
    };
    let name = &body[..semi];

    if let Some(num) = name.strip_prefix('#') {
        if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            !hex.is_empty() && hex.len() <= 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
        } else {
            !num.is_empty() && num.len() <= 7 && num.chars().all(|c| c.is_ascii_digit())
        }
    } else {
        let mut chars = name.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
            && name.len() <= 32
            && chars.all(|c| c.is_ascii_alphanumeric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_trimmed() {
        assert_eq!(sanitize("  Huy  "), "Huy");
    }

    #[test]
    fn test_tags_are_stripped() {
        assert_eq!(sanitize("<b>bold</b> text"), "bold text");
        assert_eq!(sanitize("<script>alert(1)</script>"), "alert(1)");
        assert_eq!(sanitize(r#"<a href="x>y">link</a>"#), "link");
        assert_eq!(sanitize("before<!-- note -->after"), "beforeafter");
    }

    #[test]
    fn test_unterminated_tag_drops_remainder() {
        assert_eq!(sanitize("hello <img src=x onerror=alert(1)"), "hello");
    }

    #[test]
    fn test_literal_less_than_is_kept() {
        assert_eq!(sanitize("x < y and y > z"), "x &lt; y and y &gt; z");
        assert_eq!(
            sanitize("I am < 10 years old and want to say hi"),
            "I am &lt; 10 years old and want to say hi"
        );
        assert_eq!(sanitize("a<3 b <= c"), "a&lt;3 b &lt;= c");
        assert_eq!(sanitize("trailing <"), "trailing &lt;");
        assert_eq!(sanitize("<<b>x</b>"), "&lt;x");
    }

    #[test]
    fn test_special_characters_are_escaped() {
        assert_eq!(sanitize(r#"Tom & "Jerry" 's > 1"#), "Tom &amp; &quot;Jerry&quot; &#039;s &gt; 1");
    }

    #[test]
    fn test_existing_references_are_kept() {
        assert_eq!(escape_html("a &amp; b &#39; &#x27; &copy;"), "a &amp; b &#39; &#x27; &copy;");
        assert_eq!(escape_html("AT&T; & co"), "AT&T; &amp; co");
        assert_eq!(escape_html("&;"), "&amp;;");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "",
            "   ",
            "plain",
            "  <p> padded </p>  ",
            "<b></b>  leading",
            "5 < 6 && 7 > 3",
            r#"quote " and ' apostrophe"#,
            "&amp;lt;already&gt;",
            "Nguyễn Vũ Quang Huy",
            "dangling <",
            "Budget is < 500 USD",
            "<<script>x",
            "x & y &",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
            assert!(!once.contains('<'), "raw markup left in {once:?}");
        }
    }
}
