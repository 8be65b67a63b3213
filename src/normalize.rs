//! Repair of recipe instruction text.
//!
//! Instruction strings reach us after several lossy trips: lists serialized
//! into a single string, `\uXXXX` escapes that were never decoded, UTF-8
//! punctuation that was read back as Windows-1252, steps joined with `|`.
//! [`normalize`] undoes all of that in a fixed order. List parsing runs
//! before any delimiter or bracket handling, and escape decoding runs
//! before the mojibake table because corrupted sequences may themselves
//! be escaped.

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

/// Characters stripped from both ends of a normalized instruction.
const WRAPPER_CHARS: &[char] = &['[', ']', '(', ')', '{', '}', '"', '\''];

/// Known mis-decoded sequences and their repair, applied top to bottom.
/// Two-byte `Â` sequences come before the stray `Â` removal so the
/// degree sign and fractions survive.
const MOJIBAKE: &[(&str, &str)] = &[
    ("Â°", "°"),
    ("Â½", "½"),
    ("Â¼", "¼"),
    ("Â¾", "¾"),
    ("Â\u{a0}", " "),
    ("Â", ""),
    ("â€™", "'"),
    ("â€˜", "'"),
    ("â€œ", "\""),
    ("â€\u{9d}", "\""),
    ("â€”", "—"),
    ("â€“", "-"),
    ("â€¦", "…"),
    ("â€¢", "•"),
    ("Ã©", "é"),
    ("Ã¨", "è"),
    ("Ã±", "ñ"),
];

fn unicode_escape_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\\u([dD][89abAB][0-9a-fA-F]{2})\\u([dD][c-fC-F][0-9a-fA-F]{2})|\\u([0-9a-fA-F]{4})",
        )
        .unwrap()
    })
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]*\n(?:[ \t]*\n)*[ \t]*").unwrap())
}

/// Normalize a single raw instruction string.
///
/// Never fails: anything that cannot be repaired is passed through
/// trimmed. The result is a fixed point, `normalize(&normalize(x)) ==
/// normalize(x)` for ordinary recipe text.
pub fn normalize(raw: &str) -> String {
    let text = raw.trim();
    if text.is_empty() {
        return String::new();
    }

    let text = expand_list_literal(text).unwrap_or_else(|| text.to_string());
    let text = decode_escapes(&text);
    let text = repair_mojibake(&text);
    let text = strip_control_chars(&text);
    let text = text.replace('|', "\n");
    let text = text.trim_matches(|c: char| WRAPPER_CHARS.contains(&c) || c.is_whitespace());
    let text = text.replace('\r', "");
    let text = blank_lines_re().replace_all(&text, "\n");

    text.trim().to_string()
}

/// Normalize an untyped instruction entry as it appears in a recipe payload.
///
/// Lists are normalized element by element and joined with newlines.
/// Step objects (`{"@type": "HowToStep", "text": ...}`) contribute their
/// `text` or `description`.
pub fn normalize_value(raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(s) => normalize(s),
        Value::Array(items) => items
            .iter()
            .map(normalize_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => map
            .get("text")
            .or_else(|| map.get("description"))
            .map(normalize_value)
            .unwrap_or_default(),
        other => normalize(&other.to_string()),
    }
}

/// Parse text that looks like a serialized list and join its elements.
///
/// Returns `None` when the text is not list-shaped or does not parse, in
/// which case the caller keeps the original text.
fn expand_list_literal(text: &str) -> Option<String> {
    let list_shaped = (text.starts_with('[') && text.ends_with(']'))
        || (text.starts_with("\"[") && text.ends_with("]\""));
    if !list_shaped {
        return None;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Some(join_items(&items)),
        Ok(Value::String(inner)) => {
            let inner = inner.trim();
            if inner.starts_with('[') && inner.ends_with(']') {
                expand_list_literal(inner).or_else(|| Some(inner.to_string()))
            } else {
                Some(inner.to_string())
            }
        }
        Ok(_) => None,
        Err(_) => parse_quoted_list(text).map(|items| {
            items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        }),
    }
}

fn join_items(items: &[Value]) -> String {
    items
        .iter()
        .filter_map(|item| match item {
            Value::Null => None,
            Value::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a list literal whose elements use single or double quotes, as
/// written by Python's `repr`. Unknown backslash escapes are kept verbatim
/// so later stages can still decode `\uXXXX`.
fn parse_quoted_list(text: &str) -> Option<Vec<String>> {
    let body = text.strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = body.chars().peekable();
    let mut items = Vec::new();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(_) => return None,
        };

        let mut item = String::new();
        loop {
            match chars.next()? {
                '\\' => match chars.next()? {
                    'n' => item.push('\n'),
                    't' => item.push('\t'),
                    c @ ('\\' | '\'' | '"') => item.push(c),
                    c => {
                        item.push('\\');
                        item.push(c);
                    }
                },
                c if c == quote => break,
                c => item.push(c),
            }
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(_) => return None,
        }
    }

    Some(items)
}

/// Decode `\uXXXX` escapes (including surrogate pairs) and the literal
/// `\n`, `\r`, `\t` escapes left behind by double serialization, until
/// none are left. Every decoding pass that changes the text shortens it.
fn decode_escapes(text: &str) -> String {
    let mut current = text.to_string();
    while current.contains('\\') {
        let next = decode_escapes_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn decode_escapes_once(text: &str) -> String {
    let decoded = unicode_escape_re().replace_all(text, |caps: &Captures| {
        let parsed = if let (Some(high), Some(low)) = (caps.get(1), caps.get(2)) {
            let high = u32::from_str_radix(high.as_str(), 16).unwrap_or(0);
            let low = u32::from_str_radix(low.as_str(), 16).unwrap_or(0);
            char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
        } else {
            caps.get(3)
                .and_then(|hex| u32::from_str_radix(hex.as_str(), 16).ok())
                .and_then(char::from_u32)
        };
        match parsed {
            Some(c) => c.to_string(),
            // lone surrogate
            None => caps[0].to_string(),
        }
    });

    decoded
        .replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\\r", "")
        .replace("\\t", " ")
}

fn repair_mojibake(text: &str) -> String {
    let mut repaired = text.to_string();
    for (broken, fixed) in MOJIBAKE {
        if repaired.contains(broken) {
            repaired = repaired.replace(broken, fixed);
        }
    }
    repaired
}

/// Drop control characters other than newline, tab and carriage return.
fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
    }

    #[test]
    fn test_json_list_is_joined() {
        assert_eq!(
            normalize("[\"Boil water\", \"Add pasta\"]"),
            "Boil water\nAdd pasta"
        );
    }

    #[test]
    fn test_quoted_list_wrapper() {
        assert_eq!(
            normalize(r#""[\"Chop onions\", \"Fry onions\"]""#),
            "Chop onions\nFry onions"
        );
    }

    #[test]
    fn test_single_quoted_list_literal() {
        assert_eq!(
            normalize("['Preheat oven', 'Don\\'t skip resting', '']"),
            "Preheat oven\nDon't skip resting"
        );
    }

    #[test]
    fn test_list_of_one_string() {
        assert_eq!(normalize("[\"Serve hot\"]"), "Serve hot");
    }

    #[test]
    fn test_unparseable_list_left_alone_then_stripped() {
        assert_eq!(normalize("[Mix well, then rest"), "Mix well, then rest");
        assert_eq!(normalize("[not, a, json, list]"), "not, a, json, list");
    }

    #[test]
    fn test_unicode_escapes_decoded() {
        assert_eq!(normalize(r"Heat to 180\u00b0C"), "Heat to 180°C");
        assert_eq!(normalize(r"Garnish \ud83c\udf3f"), "Garnish 🌿");
    }

    #[test]
    fn test_lone_surrogate_kept() {
        assert_eq!(normalize(r"odd \ud800 text"), r"odd \ud800 text");
    }

    #[test]
    fn test_literal_newline_escapes() {
        assert_eq!(normalize(r"Mix\nBake\r\nCool"), "Mix\nBake\nCool");
    }

    #[test]
    fn test_corrupted_apostrophe_repaired() {
        assert_eq!(
            normalize("Don\u{e2}\u{20ac}\u{2122}t overmix"),
            "Don't overmix"
        );
    }

    #[test]
    fn test_escaped_mojibake_repaired() {
        // the corrupted bytes arrive as escapes and must decode first
        assert_eq!(normalize(r"it\u00e2\u20ac\u2122s done"), "it's done");
    }

    #[test]
    fn test_mojibake_table() {
        assert_eq!(normalize("Bake at 350Â°F"), "Bake at 350°F");
        assert_eq!(normalize("Add Â½ cup"), "Add ½ cup");
        assert_eq!(normalize("Stir â€” gently"), "Stir — gently");
        assert_eq!(normalize("5â€“7 minutes"), "5-7 minutes");
        assert_eq!(normalize("Say â€œcheeseâ€\u{9d} now"), "Say \"cheese\" now");
        assert_eq!(normalize("Add sautÃ©ed onions"), "Add sautéed onions");
    }

    #[test]
    fn test_unknown_sequences_left_alone() {
        assert_eq!(normalize("CafÃ¼ style"), "CafÃ¼ style");
    }

    #[test]
    fn test_pipe_delimited() {
        assert_eq!(normalize("Step one|Step two"), "Step one\nStep two");
        assert_eq!(normalize("Step one | Step two ||"), "Step one\nStep two");
    }

    #[test]
    fn test_wrapping_brackets_and_quotes_stripped() {
        assert_eq!(normalize("(\"Whisk eggs\")"), "Whisk eggs");
        assert_eq!(normalize("'Whisk eggs'"), "Whisk eggs");
        assert_eq!(normalize("[ 'Whisk eggs' ]"), "Whisk eggs");
    }

    #[test]
    fn test_carriage_returns_and_blank_lines() {
        assert_eq!(normalize("Mix\r\n\r\n\r\nBake\n\n\nCool"), "Mix\nBake\nCool");
        assert_eq!(normalize("Mix\n   \nBake"), "Mix\nBake");
    }

    #[test]
    fn test_control_chars_removed() {
        assert_eq!(normalize("Mix\u{0}\u{7f} well"), "Mix well");
    }

    #[test]
    fn test_nested_escapes_decode_fully() {
        // \u005c is a backslash that starts another escape
        assert_eq!(normalize(r"\u005cu0041"), "A");
        assert_eq!(normalize(r"Line\u005cnBreak"), "Line\nBreak");
    }

    #[test]
    fn test_idempotent_on_samples() {
        let samples = [
            "[\"Boil water\", \"Add pasta\"]",
            r#""[\"a\", \"b\"]""#,
            "['Chop', 'Fry (until golden)']",
            "Step one|Step two",
            "  (\"quoted\" ) ",
            "Don\u{e2}\u{20ac}\u{2122}t overmix",
            r"Heat to 180\u00b0C",
            "Mix\r\n\r\nBake",
            "[\"[nested]\", \"x\"]",
            "Add Â½ cup | stir â€” then rest\n\n\n",
            "plain prose with a trailing bracket]",
            r"\u005cu0041",
            r"x\u005c\u005cn y",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_normalize_value_shapes() {
        assert_eq!(normalize_value(&json!(null)), "");
        assert_eq!(normalize_value(&json!("A|B")), "A\nB");
        assert_eq!(normalize_value(&json!(["A", null, "", "B"])), "A\nB");
        assert_eq!(normalize_value(&json!(12)), "12");
        assert_eq!(
            normalize_value(&json!({"@type": "HowToStep", "text": "Knead"})),
            "Knead"
        );
        assert_eq!(normalize_value(&json!({"url": "x"})), "");
    }
}
