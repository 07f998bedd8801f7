//! JavaScript string-literal escaping for data embedded in `<script>`.

use std::borrow::Cow;

/// Whether `c` must be escaped inside a quoted JS string embedded in HTML.
#[inline]
fn needs_js_escape(c: char) -> bool {
    matches!(
        c,
        '\\' | '\'' | '"' | '<' | '>' | '&' | '=' | '\u{2028}' | '\u{2029}'
    ) || c.is_control()
}

/// Escape a string for use inside a single- or double-quoted JavaScript
/// string literal within an HTML `<script>` element.
///
/// Quotes and backslashes get a backslash; `<`, `>`, `&` and `=` become
/// `\u003C`-style escapes so the text can never close the script element;
/// control characters and the JS line terminators U+2028/U+2029 become
/// `\uXXXX`.
///
/// # Example
/// ```ignore
/// assert_eq!(js_string(r#"say "hi""#), r#"say \"hi\""#);
/// assert_eq!(js_string("</script>"), r"\u003C/script\u003E");
/// ```
pub fn js_string(s: &str) -> Cow<'_, str> {
    if !s.chars().any(needs_js_escape) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '\\' => result.push_str(r"\\"),
            '\'' => result.push_str(r"\'"),
            '"' => result.push_str(r#"\""#),
            c if needs_js_escape(c) => {
                // BMP only: every escaped char is ASCII, C1 control or U+2028/9
                result.push_str(&format!(r"\u{:04X}", c as u32));
            }
            c => result.push(c),
        }
    }
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_plain_borrows() {
        assert!(matches!(js_string("/usr/bin:/bin"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_js_quotes_and_backslash() {
        assert_eq!(js_string(r#"a"b"#), r#"a\"b"#);
        assert_eq!(js_string("it's"), r"it\'s");
        assert_eq!(js_string(r"C:\go"), r"C:\\go");
    }

    #[test]
    fn test_js_html_sensitive() {
        assert_eq!(js_string("</script>"), r"\u003C/script\u003E");
        assert_eq!(js_string("a&b=c"), r"a\u0026b\u003Dc");
    }

    #[test]
    fn test_js_control_chars() {
        assert_eq!(js_string("a\nb"), r"a\u000Ab");
        assert_eq!(js_string("\t"), r"\u0009");
        assert_eq!(js_string("\u{7f}"), r"\u007F");
        assert_eq!(js_string("\u{2028}"), r"\u2028");
    }

    #[test]
    fn test_js_non_ascii_kept() {
        assert_eq!(js_string("héllo 世界"), "héllo 世界");
    }

    #[test]
    fn test_js_no_raw_quote_survives() {
        let escaped = js_string(r#""; alert(1); ""#);
        // every quote is preceded by a backslash
        let bytes = escaped.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'"' {
                assert!(i > 0 && bytes[i - 1] == b'\\');
            }
        }
    }
}
