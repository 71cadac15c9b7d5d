//! Pulls a JSON object out of free-form model output.
//!
//! Models asked for JSON often wrap it in a fenced code block or surround it with prose, so the
//! output is searched for the first candidate that actually parses as a JSON object.

/// Returns the first well-formed JSON object in `text`.
///
/// Fenced code blocks are tried first, in order, then every balanced `{...}` span in the text.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    fenced_blocks(text)
        .chain(balanced_objects(text))
        .find(|candidate| is_json_object(candidate))
}

fn is_json_object(candidate: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(candidate),
        Ok(serde_json::Value::Object(_))
    )
}

/// The trimmed contents of each ```` ``` ```` fenced block. The info string after the opening
/// fence (e.g. `json`) is skipped.
fn fenced_blocks(text: &str) -> impl Iterator<Item = &str> + '_ {
    let mut rest = text;
    std::iter::from_fn(move || {
        let start = rest.find("```")?;
        let after_fence = &rest[start + 3..];
        let body_start = after_fence.find('\n').map(|nl| nl + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        let end = body.find("```")?;
        rest = &body[end + 3..];
        Some(body[..end].trim())
    })
}

/// Every span that starts at a `{` and ends at its matching `}`, ignoring braces inside strings.
fn balanced_objects(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .filter_map(move |(start, _)| matching_brace(text, start).map(|end| &text[start..=end]))
}

fn matching_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    for (i, ch) in text[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if ch == '\\' && in_string {
            escape = true;
            continue;
        }
        if ch == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object() {
        let text = r#"{"a": 1}"#;
        assert_eq!(extract_json_object(text), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn test_json_fence() {
        let text = "Here you go:\n```json\n{\"location\": \"Busan\"}\n```\nThanks";
        assert_eq!(extract_json_object(text), Some(r#"{"location": "Busan"}"#));
    }

    #[test]
    fn test_bare_fence() {
        let text = "```\n{\"a\": {\"b\": 2}}\n```";
        assert_eq!(extract_json_object(text), Some(r#"{"a": {"b": 2}}"#));
    }

    #[test]
    fn test_fence_without_object_falls_back_to_prose() {
        let text = "```text\nnot json\n```\nresult: {\"ok\": true} done";
        assert_eq!(extract_json_object(text), Some(r#"{"ok": true}"#));
    }

    #[test]
    fn test_embedded_in_prose() {
        let text = r#"Sure! {"foo": "bar"} and more text {"second": 1}"#;
        assert_eq!(extract_json_object(text), Some(r#"{"foo": "bar"}"#));
    }

    #[test]
    fn test_skips_malformed_candidate() {
        let text = r#"{not: json} then {"good": "value"}"#;
        assert_eq!(extract_json_object(text), Some(r#"{"good": "value"}"#));
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"{"comment": "use } and { freely", "n": 1}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_escaped_quotes() {
        let text = r#"x {"text": "value with \"quotes\" inside"} y"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"text": "value with \"quotes\" inside"}"#)
        );
    }

    #[test]
    fn test_no_json() {
        assert_eq!(extract_json_object("No JSON here at all"), None);
        assert_eq!(extract_json_object("{ unterminated"), None);
        assert_eq!(extract_json_object(""), None);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "날씨 정보입니다 {\"comment\": \"우산을 챙기세요\"} 끝";
        assert_eq!(
            extract_json_object(text),
            Some("{\"comment\": \"우산을 챙기세요\"}")
        );
    }
}
