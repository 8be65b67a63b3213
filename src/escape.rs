use html_escape::encode_quoted_attribute;

/// Neutralize `&`, `<`, `>`, `"` and `'` so text can be placed into markup.
///
/// Absent input yields an empty string. Text without any of the five
/// characters is returned unchanged.
pub fn escape(text: Option<&str>) -> String {
    match text {
        Some(text) => encode_quoted_attribute(text).into_owned(),
        None => String::new(),
    }
}

/// Escape multi-line text, then turn each newline into a `<br>`.
pub fn escape_lines(text: &str) -> String {
    escape(Some(text)).replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_none() {
        assert_eq!(escape(None), "");
    }

    #[test]
    fn test_escape_reserved_characters() {
        let escaped = escape(Some(r#"<b class="x">Tom & Jerry's</b>"#));
        assert!(escaped.contains("&lt;b"));
        assert!(escaped.contains("&gt;"));
        assert!(escaped.contains("&quot;x&quot;"));
        assert!(escaped.contains("Tom &amp; Jerry"));
        for reserved in ['<', '>', '"', '\''] {
            assert!(!escaped.contains(reserved), "{} survived", reserved);
        }
    }

    #[test]
    fn test_ampersand_not_double_escaped() {
        assert_eq!(escape(Some("&lt;")), "&amp;lt;");
        assert_eq!(escape(Some("a & b")), "a &amp; b");
    }

    #[test]
    fn test_plain_text_untouched() {
        let text = "Simmer for 10 minutes, stirring (gently) / often.";
        assert_eq!(escape(Some(text)), text);
    }

    #[test]
    fn test_escape_lines_after_escaping() {
        assert_eq!(escape_lines("Mix <well>\nBake"), "Mix &lt;well&gt;<br>Bake");
    }
}
